//! CSV export of the normalized table
//!
//! Layout: a header row `Metric, Unit, <date>...` followed by one row per
//! metric. Every field is quoted; embedded quotes are doubled.

use csv::{QuoteStyle, ReaderBuilder, Terminator, WriterBuilder};
use serde::{Deserialize, Serialize};

use crate::errors::ExportError;
use crate::normalize::MetricRow;

/// Suggested download name
pub const EXPORT_FILENAME: &str = "withings-data.csv";

const METRIC_HEADER: &str = "Metric";
const UNIT_HEADER: &str = "Unit";

/// A table read back from an export
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedExport {
    pub dates: Vec<String>,
    pub rows: Vec<ExportRow>,
}

/// One metric row of an export
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportRow {
    pub label: String,
    pub unit: String,
    pub values: Vec<String>,
}

impl From<&MetricRow> for ExportRow {
    fn from(row: &MetricRow) -> Self {
        Self {
            label: row.label.clone(),
            unit: row.unit.clone(),
            values: row.values.clone(),
        }
    }
}

/// Build the CSV text for a table
pub fn build_csv(dates: &[String], rows: &[MetricRow]) -> Result<String, ExportError> {
    let mut wtr = WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .terminator(Terminator::Any(b'\n'))
        .flexible(true)
        .from_writer(vec![]);

    let header = [METRIC_HEADER, UNIT_HEADER]
        .into_iter()
        .chain(dates.iter().map(String::as_str));
    wtr.write_record(header)?;

    for row in rows {
        let record = [row.label.as_str(), row.unit.as_str()]
            .into_iter()
            .chain(row.values.iter().map(String::as_str));
        wtr.write_record(record)?;
    }

    let bytes = wtr.into_inner().map_err(|e| ExportError::Flush(e.to_string()))?;
    Ok(String::from_utf8(bytes)?)
}

/// Parse CSV text produced by [`build_csv`]
pub fn parse_csv(input: &str) -> Result<ParsedExport, ExportError> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(input.as_bytes());

    let mut records = rdr.records();
    let header = records
        .next()
        .transpose()?
        .ok_or_else(|| ExportError::Malformed("missing header row".to_string()))?;
    if header.len() < 2 {
        return Err(ExportError::Malformed("header needs metric and unit columns".to_string()));
    }
    let dates: Vec<String> = header.iter().skip(2).map(str::to_string).collect();

    let mut rows = Vec::new();
    for record in records {
        let record = record?;
        if record.len() < 2 {
            return Err(ExportError::Malformed(format!(
                "row {} has {} fields",
                rows.len() + 1,
                record.len()
            )));
        }
        rows.push(ExportRow {
            label: record[0].to_string(),
            unit: record[1].to_string(),
            values: record.iter().skip(2).map(str::to_string).collect(),
        });
    }

    Ok(ParsedExport { dates, rows })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::MetricType;

    fn sample_rows() -> Vec<MetricRow> {
        vec![
            MetricRow {
                metric_type: MetricType::Weight.code(),
                label: "Weight".to_string(),
                unit: "kg".to_string(),
                decimals: 2,
                values: vec!["112.60".to_string(), "".to_string()],
            },
            MetricRow {
                metric_type: MetricType::FatRatio.code(),
                label: "Body \"fat\", %".to_string(),
                unit: "%".to_string(),
                decimals: 1,
                values: vec!["33.4".to_string(), "0.0".to_string()],
            },
        ]
    }

    #[test]
    fn test_every_field_is_quoted() {
        let dates = vec!["15. 8. 2025 8:12:00".to_string(), "14. 8. 2025 8:09:00".to_string()];
        let csv = build_csv(&dates, &sample_rows()).unwrap();
        let mut lines = csv.lines();
        assert_eq!(
            lines.next().unwrap(),
            r#""Metric","Unit","15. 8. 2025 8:12:00","14. 8. 2025 8:09:00""#
        );
        assert_eq!(lines.next().unwrap(), r#""Weight","kg","112.60","""#);
        assert_eq!(lines.next().unwrap(), r#""Body ""fat"", %","%","33.4","0.0""#);
    }

    #[test]
    fn test_export_parses_back_to_same_table() {
        let dates = vec!["a \"quoted\" date".to_string(), "b".to_string()];
        let rows = sample_rows();
        let csv = build_csv(&dates, &rows).unwrap();
        let parsed = parse_csv(&csv).unwrap();

        assert_eq!(parsed.dates, dates);
        let expected: Vec<ExportRow> = rows.iter().map(ExportRow::from).collect();
        assert_eq!(parsed.rows, expected);
    }

    #[test]
    fn test_empty_table_exports_header_only_columns() {
        let rows: Vec<MetricRow> = sample_rows()
            .into_iter()
            .map(|mut r| {
                r.values.clear();
                r
            })
            .collect();
        let csv = build_csv(&[], &rows).unwrap();
        let parsed = parse_csv(&csv).unwrap();
        assert!(parsed.dates.is_empty());
        assert_eq!(parsed.rows.len(), 2);
        assert!(parsed.rows.iter().all(|r| r.values.is_empty()));
    }

    #[test]
    fn test_parse_rejects_empty_input() {
        assert!(matches!(parse_csv(""), Err(ExportError::Malformed(_))));
    }
}
