//! First pass: classify every cell and accumulate per-column tag sets.
//!
//! Each column keeps a fixed-size [`TagSet`] no matter how many rows are
//! scanned. The [`Classifier`] owns those sets for the duration of the pass
//! and hands them to the resolver through [`Classifier::into_schema`].

use anyhow::{Context, Result};
use log::{debug, info};

use crate::{
    schema::{ColumnMeta, ColumnType, Schema, resolve_column_type},
    source::DelimitedSource,
};

/// Tags a single cell as integer, float, or text.
///
/// Integers are an optional sign followed by ASCII digits, with no width
/// limit. Floats are any other finite decimal number. Everything else,
/// including the empty string, is text.
pub fn classify_cell(value: &str) -> ColumnType {
    let trimmed = value.trim();
    if is_whole_number(trimmed) {
        ColumnType::Integer
    } else if is_decimal_number(trimmed) {
        ColumnType::Float
    } else {
        ColumnType::Text
    }
}

pub(crate) fn is_whole_number(value: &str) -> bool {
    let digits = value.strip_prefix(['+', '-']).unwrap_or(value);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

fn is_decimal_number(value: &str) -> bool {
    // `f64::from_str` also accepts "inf" and "NaN", which are not numbers
    // anyone wants in a numeric column.
    value.bytes().any(|b| b.is_ascii_digit())
        && value.parse::<f64>().is_ok_and(|parsed| parsed.is_finite())
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TagSet {
    integer: bool,
    float: bool,
    text: bool,
}

impl TagSet {
    pub fn observe(&mut self, tag: ColumnType) {
        match tag {
            ColumnType::Integer => self.integer = true,
            ColumnType::Float => self.float = true,
            ColumnType::Text => self.text = true,
        }
    }

    pub fn contains(&self, tag: ColumnType) -> bool {
        match tag {
            ColumnType::Integer => self.integer,
            ColumnType::Float => self.float,
            ColumnType::Text => self.text,
        }
    }

    pub fn is_empty(&self) -> bool {
        !(self.integer || self.float || self.text)
    }

    pub fn tags(&self) -> Vec<ColumnType> {
        [ColumnType::Integer, ColumnType::Float, ColumnType::Text]
            .into_iter()
            .filter(|tag| self.contains(*tag))
            .collect()
    }
}

#[derive(Debug, Clone)]
pub struct ColumnProfile {
    pub name: String,
    pub ordinal: usize,
    pub tags: TagSet,
}

impl ColumnProfile {
    fn new(name: &str, ordinal: usize) -> Self {
        Self {
            name: name.to_string(),
            ordinal,
            tags: TagSet::default(),
        }
    }

    pub fn resolved_type(&self) -> ColumnType {
        resolve_column_type(self.tags)
    }
}

#[derive(Debug, Clone)]
pub struct Classifier {
    columns: Vec<ColumnProfile>,
    rows: usize,
}

impl Classifier {
    pub fn new(headers: &[String]) -> Self {
        let columns = headers
            .iter()
            .enumerate()
            .map(|(ordinal, name)| ColumnProfile::new(name, ordinal))
            .collect();
        Self { columns, rows: 0 }
    }

    /// Records one data row. Cells beyond the header width are ignored.
    pub fn observe_row<S: AsRef<str>>(&mut self, row: &[S]) {
        for (column, cell) in self.columns.iter_mut().zip(row) {
            column.tags.observe(classify_cell(cell.as_ref()));
        }
        self.rows += 1;
    }

    pub fn rows_observed(&self) -> usize {
        self.rows
    }

    pub fn columns(&self) -> &[ColumnProfile] {
        &self.columns
    }

    pub fn into_schema(self) -> Schema {
        let columns = self
            .columns
            .into_iter()
            .map(|column| {
                let datatype = column.resolved_type();
                ColumnMeta {
                    name: column.name,
                    datatype,
                }
            })
            .collect();
        Schema::new(columns)
    }
}

/// Runs the classification pass over `source`.
///
/// `sample_rows` of zero scans the whole file. Any unreadable or malformed
/// row aborts the pass.
pub fn classify_source(source: &DelimitedSource, sample_rows: usize) -> Result<Classifier> {
    let stream = source
        .open()
        .with_context(|| format!("Opening {:?} for classification", source.path()))?;
    let mut classifier = Classifier::new(stream.headers());
    for record in stream {
        if sample_rows > 0 && classifier.rows_observed() >= sample_rows {
            debug!("Stopping classification after {sample_rows} sampled row(s)");
            break;
        }
        let row = record.with_context(|| format!("Classifying {:?}", source.path()))?;
        classifier.observe_row(&row);
    }
    info!(
        "Classified {} column(s) from {} row(s)",
        classifier.columns().len(),
        classifier.rows_observed()
    );
    Ok(classifier)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn classify_cell_distinguishes_whole_and_decimal_numbers() {
        assert_eq!(classify_cell("42"), ColumnType::Integer);
        assert_eq!(classify_cell("-7"), ColumnType::Integer);
        assert_eq!(classify_cell(" 12 "), ColumnType::Integer);
        assert_eq!(classify_cell("1.0"), ColumnType::Float);
        assert_eq!(classify_cell("10.5"), ColumnType::Float);
        assert_eq!(classify_cell(".5"), ColumnType::Float);
        assert_eq!(classify_cell("1e3"), ColumnType::Float);
    }

    #[test]
    fn classify_cell_treats_everything_else_as_text() {
        assert_eq!(classify_cell(""), ColumnType::Text);
        assert_eq!(classify_cell("N/A"), ColumnType::Text);
        assert_eq!(classify_cell("NaN"), ColumnType::Text);
        assert_eq!(classify_cell("inf"), ColumnType::Text);
        assert_eq!(classify_cell("1,000"), ColumnType::Text);
        assert_eq!(classify_cell("X1"), ColumnType::Text);
    }

    #[test]
    fn classify_cell_accepts_integers_wider_than_i64() {
        assert_eq!(
            classify_cell("123456789012345678901234567890"),
            ColumnType::Integer
        );
    }

    #[test]
    fn integer_tag_does_not_block_later_float() {
        let mut classifier = Classifier::new(&headers(&["amount"]));
        classifier.observe_row(&["20"]);
        classifier.observe_row(&["10.5"]);
        let tags = classifier.columns()[0].tags;
        assert!(tags.contains(ColumnType::Integer));
        assert!(tags.contains(ColumnType::Float));
        assert_eq!(tags.tags(), vec![ColumnType::Integer, ColumnType::Float]);
    }

    #[test]
    fn float_cell_adds_only_float() {
        let mut classifier = Classifier::new(&headers(&["amount"]));
        classifier.observe_row(&["3.0"]);
        assert_eq!(classifier.columns()[0].tags.tags(), vec![ColumnType::Float]);
    }

    #[test]
    fn mixed_rows_resolve_per_column() {
        let mut classifier = Classifier::new(&headers(&["id", "amount", "name"]));
        classifier.observe_row(&["1", "10.5", "a"]);
        classifier.observe_row(&["2", "20", "b"]);
        assert_eq!(classifier.rows_observed(), 2);
        let schema = classifier.into_schema();
        assert_eq!(schema.column_type("id"), Some(ColumnType::Integer));
        assert_eq!(schema.column_type("amount"), Some(ColumnType::Float));
        assert_eq!(schema.column_type("name"), Some(ColumnType::Text));
    }

    #[test]
    fn late_text_value_turns_column_into_text() {
        let mut classifier = Classifier::new(&headers(&["code"]));
        for i in 0..1000 {
            classifier.observe_row(&[i.to_string()]);
        }
        classifier.observe_row(&["n/a"]);
        assert_eq!(
            classifier.into_schema().column_type("code"),
            Some(ColumnType::Text)
        );
    }

    #[test]
    fn header_only_input_leaves_tag_sets_empty() {
        let classifier = Classifier::new(&headers(&["id", "name"]));
        assert!(classifier.columns().iter().all(|c| c.tags.is_empty()));
        assert_eq!(classifier.columns()[1].ordinal, 1);
        let schema = classifier.into_schema();
        assert!(
            schema
                .columns
                .iter()
                .all(|c| c.datatype == ColumnType::Text)
        );
    }
}
