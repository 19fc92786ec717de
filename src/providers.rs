//! Provider-year fact table.
//!
//! Row-preserving: one output row per extract row, in input order, all
//! reported fields copied through unchanged, with the reporting year and
//! the resolved operator id attached.

use anyhow::{Context, Result};
use csv::Writer;
use std::collections::HashMap;
use std::path::Path;

use crate::columns::{IDENTITY_COLUMNS, METRIC_COLUMNS};
use crate::error::{TableError, TableResult};
use crate::load::CostReportRow;
use crate::normalize::normalize_operator_name;
use crate::registry::OperatorRegistry;

/// One row of `providers_annual.csv`.
#[derive(Debug, Clone)]
pub struct ProviderRow {
    /// `None` iff the normalized name is empty.
    pub operator_id: Option<u32>,
    pub normalized_name: String,
    pub report: CostReportRow,
}

/// Register every name across all years as one logical batch, so an
/// operator spanning years gets a single id no matter which year it is
/// first seen in. Must complete before any row building or aggregation.
pub fn register_names(rows: &[CostReportRow], registry: &mut OperatorRegistry) {
    for row in rows {
        registry.assign(&normalize_operator_name(&row.identity.name));
    }
}

/// Attach year and operator id to every extract row, preserving input
/// order. The registry is read-only here; a non-empty name it has never
/// seen means [`register_names`] was skipped, which is a defect, not data.
pub fn build_provider_rows(
    rows: Vec<CostReportRow>,
    registry: &OperatorRegistry,
) -> TableResult<Vec<ProviderRow>> {
    rows.into_iter()
        .map(|report| {
            let normalized_name = normalize_operator_name(&report.identity.name);
            let operator_id = if normalized_name.is_empty() {
                None
            } else {
                Some(registry.get(&normalized_name).ok_or_else(|| {
                    TableError::InconsistentAggregation(format!(
                        "name {normalized_name:?} was never registered"
                    ))
                })?)
            };
            Ok(ProviderRow {
                operator_id,
                normalized_name,
                report,
            })
        })
        .collect()
}

/// Re-check the identity invariants over the built table before anything
/// is written: each normalized name maps to exactly one operator id, and
/// an id is present iff the normalized name is non-empty.
pub fn verify_consistent_assignment(rows: &[ProviderRow]) -> TableResult<()> {
    let mut seen: HashMap<&str, u32> = HashMap::new();
    for row in rows {
        match (row.normalized_name.is_empty(), row.operator_id) {
            (true, Some(id)) => {
                return Err(TableError::InconsistentAggregation(format!(
                    "CCN {} has operator id {id} despite an empty name",
                    row.report.identity.ccn
                )));
            }
            (true, None) => {}
            (false, None) => {
                return Err(TableError::InconsistentAggregation(format!(
                    "name {:?} has no operator id",
                    row.normalized_name
                )));
            }
            (false, Some(id)) => {
                let prior = seen.entry(row.normalized_name.as_str()).or_insert(id);
                if *prior != id {
                    return Err(TableError::InconsistentAggregation(format!(
                        "name {:?} resolved to operator ids {prior} and {id}",
                        row.normalized_name
                    )));
                }
            }
        }
    }
    Ok(())
}

/// Write `providers_annual.csv`. Column names are an externally visible
/// contract; unreported metrics render as empty fields.
pub fn write_providers_csv(path: &Path, rows: &[ProviderRow]) -> Result<()> {
    let mut writer = Writer::from_path(path)
        .with_context(|| format!("Failed creating provider table {}", path.display()))?;

    let mut header = vec!["year", "operator_id", "HHA Name"];
    header.extend_from_slice(IDENTITY_COLUMNS);
    header.extend_from_slice(METRIC_COLUMNS);
    writer
        .write_record(&header)
        .context("Failed writing provider table header")?;

    for row in rows {
        let identity = &row.report.identity;
        let mut record = vec![
            row.report.year.to_string(),
            row.operator_id.map(|id| id.to_string()).unwrap_or_default(),
            identity.name.clone(),
            identity.rpt_rec_num.clone(),
            identity.ccn.clone(),
            identity.street_address.clone(),
            identity.city.clone(),
            identity.state_code.clone(),
            identity.zip_code.clone(),
            identity.type_of_control.clone(),
            identity.fiscal_year_begin.clone(),
            identity.fiscal_year_end.clone(),
            identity.hospice_ccn.clone(),
        ];
        for metric in &row.report.metrics {
            record.push(metric.map(|v| v.to_string()).unwrap_or_default());
        }
        writer
            .write_record(&record)
            .context("Failed writing provider table row")?;
    }
    writer.flush().context("Failed flushing provider table")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::load::ProviderIdentity;
    use pretty_assertions::assert_eq;

    fn report(year: i32, ccn: &str, name: &str) -> CostReportRow {
        CostReportRow {
            year,
            identity: ProviderIdentity {
                ccn: ccn.to_string(),
                name: name.to_string(),
                ..ProviderIdentity::default()
            },
            metrics: vec![None; METRIC_COLUMNS.len()],
        }
    }

    fn build(rows: Vec<CostReportRow>) -> Vec<ProviderRow> {
        let mut registry = OperatorRegistry::new();
        register_names(&rows, &mut registry);
        build_provider_rows(rows, &registry).unwrap()
    }

    #[test]
    fn equal_normalized_names_share_one_id_across_years() {
        let rows = build(vec![
            report(2020, "A", "  acme home health "),
            report(2021, "B", "ACME HOME HEALTH"),
            report(2021, "C", "Bayada"),
        ]);
        assert_eq!(rows.len(), 3);
        assert!(rows[0].operator_id.is_some());
        assert_eq!(rows[0].operator_id, rows[1].operator_id);
        assert_ne!(rows[0].operator_id, rows[2].operator_id);
    }

    #[test]
    fn empty_name_gets_no_operator_id() {
        let rows = build(vec![report(2020, "A", ""), report(2020, "B", "   ")]);
        assert_eq!(rows[0].operator_id, None);
        assert_eq!(rows[1].operator_id, None);
    }

    #[test]
    fn rows_pass_through_in_input_order() {
        let rows = build(vec![
            report(2021, "C", "Zeta"),
            report(2020, "A", "Alpha"),
            report(2021, "B", "Zeta"),
        ]);
        let ccns: Vec<&str> = rows.iter().map(|r| r.report.identity.ccn.as_str()).collect();
        assert_eq!(ccns, ["C", "A", "B"]);
    }

    #[test]
    fn unregistered_name_is_an_internal_defect() {
        let registry = OperatorRegistry::new();
        let err = build_provider_rows(vec![report(2020, "A", "Acme")], &registry).unwrap_err();
        assert!(matches!(err, TableError::InconsistentAggregation(_)));
    }

    #[test]
    fn verification_accepts_a_consistent_table() {
        let rows = build(vec![
            report(2020, "A", "Acme"),
            report(2021, "B", "acme"),
            report(2021, "C", ""),
        ]);
        verify_consistent_assignment(&rows).unwrap();
    }

    #[test]
    fn verification_rejects_a_name_with_two_ids() {
        let mut rows = build(vec![report(2020, "A", "Acme"), report(2021, "B", "Acme")]);
        rows[1].operator_id = rows[1].operator_id.map(|id| id + 1);
        let err = verify_consistent_assignment(&rows).unwrap_err();
        assert!(matches!(err, TableError::InconsistentAggregation(_)));
    }

    #[test]
    fn verification_rejects_an_id_on_an_empty_name() {
        let mut rows = build(vec![report(2020, "A", "")]);
        rows[0].operator_id = Some(7);
        assert!(verify_consistent_assignment(&rows).is_err());
    }
}
