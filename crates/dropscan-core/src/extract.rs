//! Field extraction from the intermediate report.
//!
//! Maps region names to invoice fields through a fixed table. Parsing is
//! deliberately forgiving: unknown regions are skipped, headerless blocks
//! contribute nothing, and an unreadable report yields an all-null record
//! rather than an error - a failed extraction must never fail the request.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::error;

use crate::ocr::REPORT_DELIMITER;

/// Fixed region-name to field-name table.
const AREA_FIELDS: [(&str, Field); 4] = [
    ("area_1", Field::InvoiceNumber),
    ("area_2", Field::Date),
    ("area_3", Field::SecondProductAmount),
    ("area_4", Field::TotalAmount),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    InvoiceNumber,
    Date,
    SecondProductAmount,
    TotalAmount,
}

/// The fixed four-field output of the extraction pipeline.
///
/// Fields with no mapped region, or whose region produced no text, stay
/// `None` and serialize as JSON null.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldRecord {
    pub invoice_number: Option<String>,
    pub date: Option<String>,
    pub second_product_amount: Option<String>,
    pub total_amount: Option<String>,
}

impl FieldRecord {
    fn set(&mut self, field: Field, value: String) {
        let slot = match field {
            Field::InvoiceNumber => &mut self.invoice_number,
            Field::Date => &mut self.date,
            Field::SecondProductAmount => &mut self.second_product_amount,
            Field::TotalAmount => &mut self.total_amount,
        };
        *slot = Some(value);
    }
}

/// Parse report text into a [`FieldRecord`].
///
/// Each block's first line has the form `Text in <region_name>: <value>`;
/// the value is everything after the first `": "`, so values may contain
/// colons themselves. Idempotent: re-parsing the same text yields the
/// same record.
pub fn parse_report(content: &str) -> FieldRecord {
    let mut record = FieldRecord::default();

    for block in content.split(REPORT_DELIMITER) {
        // The header keeps its trailing whitespace: an empty-text region
        // is written as `Text in area_N: ` and must still parse, with an
        // empty value.
        let Some(header) = block.lines().find(|line| !line.trim().is_empty()) else {
            continue;
        };

        let Some(rest) = header.strip_prefix("Text in ") else {
            continue;
        };

        let Some((region_name, value)) = rest.split_once(": ") else {
            continue;
        };

        let Some((_, field)) = AREA_FIELDS.iter().find(|(name, _)| *name == region_name)
        else {
            // Regions outside the fixed table are ignored.
            continue;
        };

        record.set(*field, value.trim().to_string());
    }

    record
}

/// Parse the report file at `path`.
///
/// An unreadable file is logged and yields an all-null record; partial
/// and empty results are valid output.
pub fn parse_report_file(path: &Path) -> FieldRecord {
    match std::fs::read_to_string(path) {
        Ok(content) => parse_report(&content),
        Err(e) => {
            error!("Error parsing detected text {}: {}", path.display(), e);
            FieldRecord::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn block(name: &str, value: &str) -> String {
        format!("Text in {name}: {value}\n{REPORT_DELIMITER}\n")
    }

    #[test]
    fn test_single_date_block_roundtrip() {
        let report = block("area_2", "2024-01-01");
        let record = parse_report(&report);

        assert_eq!(record.date.as_deref(), Some("2024-01-01"));
        assert_eq!(record.invoice_number, None);
        assert_eq!(record.second_product_amount, None);
        assert_eq!(record.total_amount, None);
    }

    #[test]
    fn test_all_four_fields() {
        let report = format!(
            "{}{}{}{}",
            block("area_1", "INV-100"),
            block("area_2", "2024-03-01"),
            block("area_3", "12.50"),
            block("area_4", "99.00"),
        );
        let record = parse_report(&report);

        assert_eq!(record.invoice_number.as_deref(), Some("INV-100"));
        assert_eq!(record.date.as_deref(), Some("2024-03-01"));
        assert_eq!(record.second_product_amount.as_deref(), Some("12.50"));
        assert_eq!(record.total_amount.as_deref(), Some("99.00"));
    }

    #[test]
    fn test_empty_value_parses_to_empty_string() {
        // A region with no recognized text still maps its field, to an
        // empty string rather than null.
        let report = block("area_1", "");
        let record = parse_report(&report);
        assert_eq!(record.invoice_number.as_deref(), Some(""));
        assert_eq!(record.date, None);
    }

    #[test]
    fn test_values_may_contain_colons() {
        let report = block("area_2", "date: 2024-01-01");
        let record = parse_report(&report);
        assert_eq!(record.date.as_deref(), Some("date: 2024-01-01"));
    }

    #[test]
    fn test_unknown_region_is_ignored() {
        let report = block("area_9", "foo");
        assert_eq!(parse_report(&report), FieldRecord::default());
    }

    #[test]
    fn test_headerless_block_contributes_nothing() {
        let report = format!("garbage line\n{REPORT_DELIMITER}\n");
        assert_eq!(parse_report(&report), FieldRecord::default());
    }

    #[test]
    fn test_parse_is_idempotent() {
        let report = block("area_1", "INV-42") + &block("area_4", "100.00");
        let first = parse_report(&report);
        let second = parse_report(&report);
        assert_eq!(first, second);
    }

    #[test]
    fn test_unreadable_file_yields_all_null() {
        let record = parse_report_file(Path::new("/nonexistent/detected_text.txt"));
        assert_eq!(record, FieldRecord::default());
    }

    #[test]
    fn test_serializes_nulls() {
        let record = FieldRecord {
            date: Some("2024-01-01".to_string()),
            ..Default::default()
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["date"], "2024-01-01");
        assert!(json["invoice_number"].is_null());
    }
}
