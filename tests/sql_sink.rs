mod common;

use common::TestWorkspace;
use csv_dump::classify::classify_source;
use csv_dump::error::SinkError;
use csv_dump::loader;
use csv_dump::schema::{ColumnMeta, ColumnType, Schema};
use csv_dump::sink::{Sink, SqlTableSink};
use csv_dump::source::DelimitedSource;
use encoding_rs::UTF_8;
use sqlx::{Connection, SqliteConnection};

fn query_rows<T>(url: &str, sql: &str) -> Vec<T>
where
    T: for<'r> sqlx::FromRow<'r, sqlx::sqlite::SqliteRow> + Send + Unpin,
{
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("runtime");
    runtime
        .block_on(async {
            let mut connection = SqliteConnection::connect(url).await?;
            sqlx::query_as::<_, T>(sql).fetch_all(&mut connection).await
        })
        .expect("query sqlite")
}

#[test]
fn create_schema_twice_against_existing_table_succeeds() {
    let workspace = TestWorkspace::new();
    let url = workspace.sqlite_url("idempotent.db");
    let schema = Schema::new(vec![
        ColumnMeta::new("id", ColumnType::Integer),
        ColumnMeta::new("name", ColumnType::Text),
    ]);
    for _ in 0..2 {
        let mut sink = Sink::schema_first(SqlTableSink::connect(&url).expect("connect sqlite"));
        sink.create_schema("people", &schema).expect("create table");
        sink.finish().expect("close sqlite");
    }

    let columns: Vec<(String, String)> = query_rows(
        &url,
        "SELECT name, type FROM pragma_table_info('people') ORDER BY cid",
    );
    assert_eq!(
        columns,
        vec![
            ("id".to_string(), "INTEGER".to_string()),
            ("name".to_string(), "TEXT".to_string()),
        ]
    );
}

#[test]
fn loaded_rows_carry_coerced_values() {
    let workspace = TestWorkspace::new();
    let url = workspace.sqlite_url("orders.db");
    let path = workspace.write("orders.csv", "id,amount,name\n1,10.5,a\n2,20,b\n");
    let source = DelimitedSource::new(path, b',', UTF_8);
    let schema = classify_source(&source, 0).expect("classify").into_schema();

    let mut sink = Sink::schema_first(SqlTableSink::connect(&url).expect("connect sqlite"));
    sink.create_schema("orders", &schema).expect("create table");
    let stats = loader::load(&source, &schema, &mut sink).expect("load rows");
    assert_eq!(stats.rows_committed, 2);
    assert_eq!(stats.rows_failed, 0);

    let rows: Vec<(i64, f64, String)> =
        query_rows(&url, "SELECT id, amount, name FROM \"orders\" ORDER BY id");
    assert_eq!(
        rows,
        vec![(1, 10.5, "a".to_string()), (2, 20.0, "b".to_string())]
    );
}

#[test]
fn rerunning_a_load_appends_to_the_existing_table() {
    let workspace = TestWorkspace::new();
    let url = workspace.sqlite_url("rerun.db");
    let path = workspace.write("ids.csv", "id\n1\n2\n");
    let source = DelimitedSource::new(path, b',', UTF_8);
    let schema = classify_source(&source, 0).expect("classify").into_schema();

    for _ in 0..2 {
        let mut sink = Sink::schema_first(SqlTableSink::connect(&url).expect("connect sqlite"));
        sink.create_schema("ids", &schema).expect("create table");
        loader::load(&source, &schema, &mut sink).expect("load rows");
    }

    let count: Vec<(i64,)> = query_rows(&url, "SELECT COUNT(*) FROM ids");
    assert_eq!(count, vec![(4,)]);
}

#[test]
fn unsupported_url_is_refused_before_connecting() {
    let err = SqlTableSink::connect("mysql://localhost/db")
        .err()
        .expect("mysql is not supported");
    assert!(matches!(err, SinkError::UnsupportedUrl(_)));
}
