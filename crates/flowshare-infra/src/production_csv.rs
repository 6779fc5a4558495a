//! CSV loader for production measurements
//!
//! Field exports are usually UTF-8, sometimes with a BOM. Spreadsheets saved
//! on older Windows machines come out as Windows-1252, which is used as the
//! fallback when the bytes are not valid UTF-8.

use std::borrow::Cow;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use encoding_rs::{Encoding, WINDOWS_1252};
use thiserror::Error;
use tracing::{debug, warn};

use flowshare_domain::model::{NumericInput, ProductionEntryDraft, ProductionRecord};
use flowshare_domain::service::parse_measurement_date;

#[derive(Error, Debug)]
pub enum CsvLoaderError {
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse CSV: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Invalid date format in row {row}: {value}")]
    InvalidDate { row: usize, value: String },

    #[error("Invalid number format in row {row}, column {column}: {value}")]
    InvalidNumber {
        row: usize,
        column: String,
        value: String,
    },

    #[error("Missing value in row {row}, column {column}")]
    MissingValue { row: usize, column: String },

    #[error("Missing required column: {0}")]
    MissingColumn(String),
}

impl From<CsvLoaderError> for flowshare_types::Error {
    fn from(err: CsvLoaderError) -> Self {
        match err {
            CsvLoaderError::IoError(e) => flowshare_types::Error::Io(e),
            CsvLoaderError::CsvError(e) => flowshare_types::Error::Csv(e),
            other => flowshare_types::Error::InvalidMeasurement(other.to_string()),
        }
    }
}

pub const REQUIRED_COLUMNS: [&str; 6] = [
    "partner_id",
    "measurement_date",
    "gross_volume",
    "bsw_percent",
    "temperature",
    "api_gravity",
];

/// One parsed CSV row. `row` is the 1-based line number in the file.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductionCsvRow {
    pub row: usize,
    pub partner_id: String,
    pub measurement_date: DateTime<Utc>,
    pub gross_volume: f64,
    pub bsw_percent: f64,
    pub temperature: f64,
    pub api_gravity: f64,
    pub pressure: Option<f64>,
    pub meter_factor: f64,
}

impl ProductionCsvRow {
    pub fn into_draft(self, tenant_id: &str, submitted_by: &str) -> ProductionEntryDraft {
        ProductionEntryDraft {
            tenant_id: tenant_id.to_string(),
            partner_id: self.partner_id,
            submitted_by: submitted_by.to_string(),
            measurement_date: self.measurement_date,
            gross_volume: self.gross_volume,
            bsw_percent: self.bsw_percent,
            temperature: self.temperature,
            api_gravity: self.api_gravity,
            pressure: self.pressure,
            meter_factor: self.meter_factor,
        }
    }
}

/// Decode file bytes: BOM-declared encoding, then UTF-8, then Windows-1252
pub fn decode_csv_bytes(bytes: &[u8]) -> Cow<'_, str> {
    if let Some((encoding, bom_len)) = Encoding::for_bom(bytes) {
        let (text, _) = encoding.decode_without_bom_handling(&bytes[bom_len..]);
        return text;
    }
    match std::str::from_utf8(bytes) {
        Ok(text) => Cow::Borrowed(text),
        Err(_) => {
            debug!("input is not UTF-8, decoding as Windows-1252");
            let (text, _, had_errors) = WINDOWS_1252.decode(bytes);
            if had_errors {
                warn!("some characters could not be decoded from Windows-1252");
            }
            text
        }
    }
}

/// Header name (lowercased) to column index
struct ColumnIndex(HashMap<String, usize>);

impl ColumnIndex {
    fn new(headers: &csv::StringRecord) -> Self {
        Self(
            headers
                .iter()
                .enumerate()
                .map(|(i, h)| (h.trim().to_lowercase(), i))
                .collect(),
        )
    }

    fn require(&self, columns: &[&str]) -> Result<(), CsvLoaderError> {
        for col in columns {
            if !self.0.contains_key(*col) {
                return Err(CsvLoaderError::MissingColumn(col.to_string()));
            }
        }
        Ok(())
    }

    fn get<'r>(&self, record: &'r csv::StringRecord, column: &str) -> Option<&'r str> {
        self.0
            .get(column)
            .and_then(|i| record.get(*i))
            .filter(|s| !s.is_empty())
    }
}

fn csv_reader(text: &str) -> csv::Reader<&[u8]> {
    csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes())
}

/// Load and strictly parse production rows from a CSV file
pub fn load_production_csv<P: AsRef<Path>>(
    path: P,
) -> Result<Vec<ProductionCsvRow>, CsvLoaderError> {
    let bytes = fs::read(path)?;
    parse_production_csv(&decode_csv_bytes(&bytes))
}

/// Parse production rows; the first malformed row aborts with its row number
pub fn parse_production_csv(text: &str) -> Result<Vec<ProductionCsvRow>, CsvLoaderError> {
    let mut reader = csv_reader(text);
    let columns = ColumnIndex::new(reader.headers()?);
    columns.require(&REQUIRED_COLUMNS)?;

    let mut rows = Vec::new();
    for (row_idx, result) in reader.records().enumerate() {
        let record = result?;
        // blank lines and multi-line quoted fields make the index drift
        let row = record
            .position()
            .map(|p| p.line() as usize)
            .unwrap_or(row_idx + 2);
        if record.iter().all(|field| field.is_empty()) {
            continue;
        }
        rows.push(parse_record(&record, &columns, row)?);
    }

    debug!(rows = rows.len(), "production CSV parsed");
    Ok(rows)
}

fn parse_record(
    record: &csv::StringRecord,
    columns: &ColumnIndex,
    row: usize,
) -> Result<ProductionCsvRow, CsvLoaderError> {
    let partner_id = required(record, columns, row, "partner_id")?.to_string();

    let date_str = required(record, columns, row, "measurement_date")?;
    let measurement_date =
        parse_measurement_date(date_str).ok_or_else(|| CsvLoaderError::InvalidDate {
            row,
            value: date_str.to_string(),
        })?;

    let gross_volume = parse_f64(required(record, columns, row, "gross_volume")?, row, "gross_volume")?;
    let bsw_percent = parse_f64(required(record, columns, row, "bsw_percent")?, row, "bsw_percent")?;
    let temperature = parse_f64(required(record, columns, row, "temperature")?, row, "temperature")?;
    let api_gravity = parse_f64(required(record, columns, row, "api_gravity")?, row, "api_gravity")?;

    let pressure = columns
        .get(record, "pressure")
        .map(|s| parse_f64(s, row, "pressure"))
        .transpose()?;
    let meter_factor = columns
        .get(record, "meter_factor")
        .map(|s| parse_f64(s, row, "meter_factor"))
        .transpose()?
        .unwrap_or(1.0);

    Ok(ProductionCsvRow {
        row,
        partner_id,
        measurement_date,
        gross_volume,
        bsw_percent,
        temperature,
        api_gravity,
        pressure,
        meter_factor,
    })
}

fn required<'r>(
    record: &'r csv::StringRecord,
    columns: &ColumnIndex,
    row: usize,
    column: &str,
) -> Result<&'r str, CsvLoaderError> {
    columns
        .get(record, column)
        .ok_or_else(|| CsvLoaderError::MissingValue {
            row,
            column: column.to_string(),
        })
}

fn parse_f64(s: &str, row: usize, column: &str) -> Result<f64, CsvLoaderError> {
    let cleaned = s.trim().replace(',', "");
    cleaned
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| CsvLoaderError::InvalidNumber {
            row,
            column: column.to_string(),
            value: s.to_string(),
        })
}

/// Load rows leniently for charting: every value is kept as text and
/// coerced later, so bad cells only blank out their own field
pub fn load_production_records<P: AsRef<Path>>(
    path: P,
) -> Result<Vec<ProductionRecord>, CsvLoaderError> {
    let bytes = fs::read(path)?;
    parse_production_records(&decode_csv_bytes(&bytes))
}

pub fn parse_production_records(text: &str) -> Result<Vec<ProductionRecord>, CsvLoaderError> {
    let mut reader = csv_reader(text);
    let columns = ColumnIndex::new(reader.headers()?);
    columns.require(&["measurement_date"])?;

    let text_field = |record: &csv::StringRecord, column: &str| {
        columns
            .get(record, column)
            .map(|s| NumericInput::Text(s.to_string()))
    };

    let mut records = Vec::new();
    for result in reader.records() {
        let record = result?;
        records.push(ProductionRecord {
            measurement_date: columns.get(&record, "measurement_date").map(str::to_string),
            gross_volume: text_field(&record, "gross_volume"),
            bsw_percent: text_field(&record, "bsw_percent"),
            meter_factor: text_field(&record, "meter_factor"),
            temperature: text_field(&record, "temperature"),
        });
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = "\
partner_id,measurement_date,gross_volume,bsw_percent,temperature,api_gravity,pressure,meter_factor
p-1,2025-08-01,\"1,250.5\",2.5,85,35.2,,
p-2,2025-08-01T06:00:00Z,980,1.0,78.5,41,14.7,1.002
";

    #[test]
    fn test_parse_sample() {
        let rows = parse_production_csv(SAMPLE).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].row, 2);
        assert_eq!(rows[0].gross_volume, 1250.5);
        assert_eq!(rows[0].pressure, None);
        assert_eq!(rows[0].meter_factor, 1.0);
        assert_eq!(rows[1].pressure, Some(14.7));
        assert_eq!(rows[1].meter_factor, 1.002);
    }

    #[test]
    fn test_optional_columns_may_be_absent() {
        let text = "partner_id,measurement_date,gross_volume,bsw_percent,temperature,api_gravity\n\
                    p-1,2025-08-01,100,0,60,30\n";
        let rows = parse_production_csv(text).unwrap();
        assert_eq!(rows[0].meter_factor, 1.0);
        let draft = rows[0].clone().into_draft("t", "u");
        assert_eq!(draft.tenant_id, "t");
        assert_eq!(draft.partner_id, "p-1");
    }

    #[test]
    fn test_missing_column() {
        let text = "partner_id,measurement_date,gross_volume\np,2025-08-01,1\n";
        match parse_production_csv(text) {
            Err(CsvLoaderError::MissingColumn(col)) => assert_eq!(col, "bsw_percent"),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_bad_cells_report_row_and_column() {
        let text = "partner_id,measurement_date,gross_volume,bsw_percent,temperature,api_gravity\n\
                    p,2025-08-01,100,0,60,30\n\
                    p,2025-08-02,abc,0,60,30\n";
        match parse_production_csv(text) {
            Err(CsvLoaderError::InvalidNumber { row, column, .. }) => {
                assert_eq!(row, 3);
                assert_eq!(column, "gross_volume");
            }
            other => panic!("unexpected: {:?}", other),
        }

        let text = "partner_id,measurement_date,gross_volume,bsw_percent,temperature,api_gravity\n\
                    p,not-a-date,100,0,60,30\n";
        assert!(matches!(
            parse_production_csv(text),
            Err(CsvLoaderError::InvalidDate { row: 2, .. })
        ));

        let text = "partner_id,measurement_date,gross_volume,bsw_percent,temperature,api_gravity\n\
                    p,2025-08-01,100,,60,30\n";
        assert!(matches!(
            parse_production_csv(text),
            Err(CsvLoaderError::MissingValue { row: 2, .. })
        ));
    }

    #[test]
    fn test_row_is_file_line_after_blank_lines() {
        let text = "\
partner_id,measurement_date,gross_volume,bsw_percent,temperature,api_gravity
p1,2025-08-01,100,2,80,35

p2,2025-08-02,abc,2,80,35
";
        match parse_production_csv(text) {
            Err(CsvLoaderError::InvalidNumber { row, column, .. }) => {
                assert_eq!(row, 4);
                assert_eq!(column, "gross_volume");
            }
            other => panic!("unexpected: {:?}", other),
        }

        let quoted = "\
partner_id,measurement_date,gross_volume,bsw_percent,temperature,api_gravity
\"p\n1\",2025-08-01,100,2,80,35
p2,2025-08-02,200,2,80,35
";
        let rows = parse_production_csv(quoted).unwrap();
        assert_eq!(rows[0].row, 2);
        assert_eq!(rows[1].row, 4);
    }

    #[test]
    fn test_decode_bom_and_windows_1252() {
        let mut bom = vec![0xEF, 0xBB, 0xBF];
        bom.extend_from_slice(b"partner_id");
        assert_eq!(decode_csv_bytes(&bom), "partner_id");

        // "Café" in Windows-1252
        let latin = [0x43, 0x61, 0x66, 0xE9];
        assert_eq!(decode_csv_bytes(&latin), "Café");
    }

    #[test]
    fn test_load_from_file_with_bom() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&[0xEF, 0xBB, 0xBF]).unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();
        let rows = load_production_csv(file.path()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].partner_id, "p-1");
    }

    #[test]
    fn test_lenient_records_keep_bad_cells() {
        let text = "measurement_date,gross_volume,bsw_percent\n2025-08-02,abc,2\n2025-08-01,100,\n";
        let records = parse_production_records(text).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].gross_volume, Some(NumericInput::Text("abc".to_string())));
        assert!(records[1].bsw_percent.is_none());
    }

    #[test]
    fn test_error_converts_to_crate_error() {
        let err: flowshare_types::Error = CsvLoaderError::MissingColumn("x".to_string()).into();
        assert!(matches!(err, flowshare_types::Error::InvalidMeasurement(_)));
    }
}
