//! Per-year cost report extract loading.
//!
//! Each supported year ships as one wide CSV
//! (`<year>/CostReporthha_Final_<yy>.csv`, one row per Provider CCN). The
//! extracts carry far more columns than the tables need; identity fields
//! are picked out by header name and the numeric columns are parsed into
//! the positional metric layout of [`crate::columns::METRIC_COLUMNS`].

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::columns::{METRIC_COLUMNS, SUPPORTED_YEARS};
use crate::error::TableError;
use crate::normalize::parse_amount;

/// Identity, location, and fiscal passthrough fields of one extract row.
/// Values are carried into `providers_annual.csv` unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProviderIdentity {
    #[serde(default, rename = "rpt_rec_num")]
    pub rpt_rec_num: String,
    #[serde(default, rename = "Provider CCN")]
    pub ccn: String,
    #[serde(default, rename = "HHA Name")]
    pub name: String,
    #[serde(default, rename = "Street Address")]
    pub street_address: String,
    #[serde(default, rename = "City")]
    pub city: String,
    #[serde(default, rename = "State Code")]
    pub state_code: String,
    #[serde(default, rename = "Zip Code")]
    pub zip_code: String,
    #[serde(default, rename = "Type of Control")]
    pub type_of_control: String,
    #[serde(default, rename = "Fiscal Year Begin Date")]
    pub fiscal_year_begin: String,
    #[serde(default, rename = "Fiscal Year End Date")]
    pub fiscal_year_end: String,
    #[serde(default, rename = "HHA-based Hospice Provider CCN")]
    pub hospice_ccn: String,
}

/// One parsed extract row, tagged with its reporting year.
///
/// `metrics` is positionally aligned with
/// [`crate::columns::METRIC_COLUMNS`]; `None` means not reported.
#[derive(Debug, Clone)]
pub struct CostReportRow {
    pub year: i32,
    pub identity: ProviderIdentity,
    pub metrics: Vec<Option<f64>>,
}

/// Conventional location of one year's extract under the input directory.
pub fn year_file_path(input_dir: &Path, year: i32) -> PathBuf {
    input_dir
        .join(year.to_string())
        .join(format!("CostReporthha_Final_{:02}.csv", year % 100))
}

/// Load one year's extract.
///
/// Structural problems are fatal: an unsupported year, a missing required
/// column, or a blank Provider CCN (silently dropping such a row would
/// corrupt the distinct-CCN counts downstream). Metric columns absent from
/// the file load as not-reported for every row.
pub fn load_year(path: &Path, year: i32) -> Result<Vec<CostReportRow>> {
    if !SUPPORTED_YEARS.contains(&year) {
        return Err(TableError::MalformedInput(format!(
            "unsupported cost report year {year} (supported: {SUPPORTED_YEARS:?})"
        ))
        .into());
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .with_context(|| format!("Failed opening cost report extract {}", path.display()))?;
    let headers = reader
        .headers()
        .with_context(|| format!("Failed reading headers from {}", path.display()))?
        .clone();

    for required in ["Provider CCN", "HHA Name"] {
        if !headers.iter().any(|h| h.trim() == required) {
            return Err(TableError::MalformedInput(format!(
                "{}: missing required column {required:?}",
                path.display()
            ))
            .into());
        }
    }

    // One index per metric column; a column the extract lacks stays None
    // and yields a not-reported metric on every row.
    let metric_indexes: Vec<Option<usize>> = METRIC_COLUMNS
        .iter()
        .map(|name| headers.iter().position(|h| h.trim() == *name))
        .collect();

    let mut rows = Vec::new();
    for result in reader.records() {
        let record =
            result.with_context(|| format!("Failed reading record from {}", path.display()))?;
        let line = record.position().map(|p| p.line()).unwrap_or_default();

        let identity: ProviderIdentity = record
            .deserialize(Some(&headers))
            .with_context(|| format!("{}:{line}: failed decoding row", path.display()))?;
        if identity.ccn.trim().is_empty() {
            return Err(TableError::MalformedInput(format!(
                "{}:{line}: blank Provider CCN",
                path.display()
            ))
            .into());
        }

        let metrics = metric_indexes
            .iter()
            .map(|idx| idx.and_then(|i| record.get(i)).and_then(parse_amount))
            .collect();

        rows.push(CostReportRow {
            year,
            identity,
            metrics,
        });
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;

    fn write_extract(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn loads_identity_and_metrics_ignoring_unknown_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_extract(
            dir.path(),
            "extract.csv",
            "rpt_rec_num,Provider CCN,HHA Name,State Code,Unrelated Column,Total Cost,\"Total, Total Visits\"\n\
             7,017000,Acme Home Health,FL,whatever,\"1,500.25\",12\n\
             8,027000,,GA,x,,\n",
        );

        let rows = load_year(&path, 2021).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].year, 2021);
        assert_eq!(rows[0].identity.ccn, "017000");
        assert_eq!(rows[0].identity.name, "Acme Home Health");
        assert_eq!(rows[0].identity.state_code, "FL");

        let cost = METRIC_COLUMNS.iter().position(|m| *m == "Total Cost").unwrap();
        let visits = METRIC_COLUMNS
            .iter()
            .position(|m| *m == "Total, Total Visits")
            .unwrap();
        assert_eq!(rows[0].metrics[cost], Some(1500.25));
        assert_eq!(rows[0].metrics[visits], Some(12.0));
        assert_eq!(rows[1].metrics[cost], None);

        // Metric columns missing from the file are not-reported, not errors.
        let assets = METRIC_COLUMNS
            .iter()
            .position(|m| *m == "Total Assets")
            .unwrap();
        assert_eq!(rows[0].metrics[assets], None);

        // Empty name is valid input; it just never joins an operator.
        assert_eq!(rows[1].identity.name, "");
    }

    #[test]
    fn blank_ccn_is_fatal_with_location_context() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_extract(
            dir.path(),
            "extract.csv",
            "Provider CCN,HHA Name\n017000,Acme\n  ,Nameless\n",
        );

        let err = load_year(&path, 2020).unwrap_err();
        let table_err = err.downcast_ref::<TableError>().unwrap();
        assert!(matches!(table_err, TableError::MalformedInput(_)));
        assert!(table_err.to_string().contains("blank Provider CCN"));
        assert!(table_err.to_string().contains(":3:"));
    }

    #[test]
    fn unsupported_year_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_extract(dir.path(), "extract.csv", "Provider CCN,HHA Name\n");

        let err = load_year(&path, 2019).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<TableError>(),
            Some(TableError::MalformedInput(_))
        ));
    }

    #[test]
    fn missing_required_column_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_extract(dir.path(), "extract.csv", "Provider CCN,State Code\n1,FL\n");

        let err = load_year(&path, 2022).unwrap_err();
        assert!(err.to_string().contains("HHA Name"));
    }

    #[test]
    fn year_file_path_follows_the_extract_convention() {
        let path = year_file_path(Path::new("data/raw"), 2023);
        assert_eq!(
            path,
            Path::new("data/raw/2023/CostReporthha_Final_23.csv")
        );
    }
}
