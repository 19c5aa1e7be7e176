//! Local CSV price history.
//!
//! Accepts the shape most exports already have: one date column and one price
//! column, header names matched case-insensitively.
//!
//! - date: `date` / `timestamp` / `time` (`YYYY-MM-DD`, RFC 3339, or unix seconds)
//! - price: `price` / `close` / `value`
//!
//! Empty price cells are skipped; anything else that fails to parse is an error
//! with the offending line number.

use std::collections::HashMap;
use std::fs::File;
use std::path::PathBuf;

use chrono::NaiveDate;
use csv::StringRecord;

use crate::data::{PriceSource, date_from_unix};
use crate::domain::PriceSample;
use crate::error::AppError;

const DATE_COLUMNS: &[&str] = &["date", "timestamp", "time"];
const PRICE_COLUMNS: &[&str] = &["price", "close", "value"];

pub struct CsvFileSource {
    path: PathBuf,
    name: String,
}

impl CsvFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = format!("csv:{}", path.display());
        Self { path, name }
    }
}

impl PriceSource for CsvFileSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn fetch(&self) -> Result<Vec<PriceSample>, AppError> {
        let file = File::open(&self.path).map_err(|e| {
            AppError::new(2, format!("Failed to open CSV '{}': {e}", self.path.display()))
        })?;
        read_samples(file)
    }
}

fn read_samples<R: std::io::Read>(reader: R) -> Result<Vec<PriceSample>, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| AppError::new(2, format!("Failed to read CSV header: {e}")))?
        .clone();
    let header_map = build_header_map(&headers);

    let date_idx = find_column(&header_map, DATE_COLUMNS)
        .ok_or_else(|| AppError::new(2, format!("CSV is missing a date column (one of {DATE_COLUMNS:?}).")))?;
    let price_idx = find_column(&header_map, PRICE_COLUMNS)
        .ok_or_else(|| AppError::new(2, format!("CSV is missing a price column (one of {PRICE_COLUMNS:?}).")))?;

    let mut out = Vec::new();
    for (row, record) in reader.records().enumerate() {
        // Header is line 1.
        let line = row + 2;
        let record = record.map_err(|e| AppError::new(2, format!("CSV line {line}: {e}")))?;

        let raw_price = record.get(price_idx).unwrap_or("");
        if raw_price.is_empty() {
            continue;
        }
        let price = raw_price
            .replace(',', "")
            .parse::<f64>()
            .map_err(|_| AppError::new(2, format!("CSV line {line}: invalid price '{raw_price}'.")))?;

        let raw_date = record.get(date_idx).unwrap_or("");
        let date = parse_date(raw_date)
            .ok_or_else(|| AppError::new(2, format!("CSV line {line}: invalid date '{raw_date}'.")))?;

        out.push(PriceSample { date, price });
    }

    if out.is_empty() {
        return Err(AppError::new(2, "CSV contains no price rows."));
    }
    Ok(out)
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (name.trim().to_ascii_lowercase(), idx))
        .collect()
}

fn find_column(header_map: &HashMap<String, usize>, names: &[&str]) -> Option<usize> {
    names.iter().find_map(|n| header_map.get(*n).copied())
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(d);
    }
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc().date());
    }
    s.parse::<i64>().ok().and_then(date_from_unix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_date_and_price_columns() {
        let csv = "Date,Open,Close\n2020-01-01,7194.89,7200.17\n2020-01-02,7202.55,\n2020-01-03,6984.43,\"7,344.88\"\n";
        let samples = read_samples(csv.as_bytes()).unwrap();
        assert_eq!(samples.len(), 2);
        assert_eq!(samples[0].date, NaiveDate::from_ymd_opt(2020, 1, 1).unwrap());
        assert_eq!(samples[0].price, 7200.17);
        assert_eq!(samples[1].price, 7344.88);
    }

    #[test]
    fn accepts_unix_and_rfc3339_dates() {
        let csv = "timestamp,price\n1279411200,0.0858\n2021-11-10T00:00:00Z,68789.63\n";
        let samples = read_samples(csv.as_bytes()).unwrap();
        assert_eq!(samples[0].date, NaiveDate::from_ymd_opt(2010, 7, 18).unwrap());
        assert_eq!(samples[1].date, NaiveDate::from_ymd_opt(2021, 11, 10).unwrap());
    }

    #[test]
    fn reports_bad_rows_with_line_numbers() {
        let csv = "date,price\n2020-01-01,100\n2020-13-01,101\n";
        let err = read_samples(csv.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("line 3"), "{err}");
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn missing_columns_are_rejected() {
        assert!(read_samples("day,price\n1,2\n".as_bytes()).is_err());
        assert!(read_samples("date,volume\n2020-01-01,2\n".as_bytes()).is_err());
    }

    #[test]
    fn fetch_reads_from_disk() {
        let path = std::env::temp_dir().join(format!("pl_csv_source_{}.csv", std::process::id()));
        std::fs::write(&path, "date,price\n2015-01-01,314.25\n").unwrap();

        let source = CsvFileSource::new(&path);
        let samples = source.fetch().unwrap();
        assert_eq!(samples.len(), 1);
        assert!(source.name().starts_with("csv:"));

        std::fs::remove_file(&path).ok();
    }
}
