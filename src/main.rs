fn main() {
    if let Err(err) = csv_dump::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
