//! Operator-year rollup table.
//!
//! Groups provider rows by (year, operator_id), skipping rows with no
//! operator id. Grouping is a pure function of normalized-name equality
//! already baked into the ids, so accumulation order never changes what
//! ends up grouped together; the output is sorted by key for reproducible
//! files.

use anyhow::{Context, Result};
use csv::Writer;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::Path;

use crate::columns::{ROLLUP_COLUMNS, STATE_CODES_DELIMITER, rollup_metric_indexes};
use crate::error::{TableError, TableResult};
use crate::providers::ProviderRow;

/// One row of `operators_annual.csv`.
///
/// `sums` is positionally aligned with [`crate::columns::ROLLUP_COLUMNS`].
/// A metric nobody in the group reported sums to 0.0, not absent.
#[derive(Debug, Clone)]
pub struct OperatorRow {
    pub year: i32,
    pub operator_id: u32,
    pub operator_name: String,
    pub n_ccns: usize,
    pub n_states: usize,
    pub state_codes: String,
    pub sums: Vec<f64>,
}

#[derive(Debug, Default)]
struct GroupAccumulator {
    name_counts: HashMap<String, usize>,
    ccns: HashSet<String>,
    states: BTreeSet<String>,
    sums: Vec<f64>,
}

/// Roll provider rows up into one record per (operator_id, year).
///
/// Missing metric values sum as zero; distinct counts only ever see
/// present values. Rows without an operator id contribute to nothing.
pub fn build_operator_rows(rows: &[ProviderRow]) -> TableResult<Vec<OperatorRow>> {
    let metric_indexes = rollup_metric_indexes();
    let mut groups: HashMap<(i32, u32), GroupAccumulator> = HashMap::new();

    for row in rows {
        let Some(operator_id) = row.operator_id else {
            continue;
        };
        let group = groups
            .entry((row.report.year, operator_id))
            .or_insert_with(|| GroupAccumulator {
                sums: vec![0.0; metric_indexes.len()],
                ..GroupAccumulator::default()
            });

        let name = row.report.identity.name.trim();
        *group.name_counts.entry(name.to_string()).or_insert(0) += 1;
        group.ccns.insert(row.report.identity.ccn.trim().to_string());

        let state = row.report.identity.state_code.trim();
        if !state.is_empty() {
            if state.contains(STATE_CODES_DELIMITER) {
                return Err(TableError::MalformedInput(format!(
                    "state code {state:?} contains the reserved {STATE_CODES_DELIMITER:?} delimiter"
                )));
            }
            group.states.insert(state.to_string());
        }

        for (pos, metric_index) in metric_indexes.iter().enumerate() {
            if let Some(value) = row.report.metrics.get(*metric_index).copied().flatten() {
                group.sums[pos] += value;
            }
        }
    }

    let mut records: Vec<OperatorRow> = groups
        .into_iter()
        .map(|((year, operator_id), group)| OperatorRow {
            year,
            operator_id,
            operator_name: canonical_name(&group.name_counts),
            n_ccns: group.ccns.len(),
            n_states: group.states.len(),
            state_codes: group
                .states
                .iter()
                .cloned()
                .collect::<Vec<_>>()
                .join(&STATE_CODES_DELIMITER.to_string()),
            sums: group.sums,
        })
        .collect();
    records.sort_by_key(|r| (r.year, r.operator_id));
    Ok(records)
}

/// Most frequent raw name in the group; frequency ties break to the
/// lexicographically smallest name so the display name is reproducible
/// even when differently-cased spellings occur equally often.
fn canonical_name(name_counts: &HashMap<String, usize>) -> String {
    name_counts
        .iter()
        .max_by(|a, b| a.1.cmp(b.1).then_with(|| b.0.cmp(a.0)))
        .map(|(name, _)| name.clone())
        .unwrap_or_default()
}

/// Write `operators_annual.csv`. Column names are an externally visible
/// contract.
pub fn write_operators_csv(path: &Path, rows: &[OperatorRow]) -> Result<()> {
    let mut writer = Writer::from_path(path)
        .with_context(|| format!("Failed creating operator table {}", path.display()))?;

    let mut header = vec![
        "year",
        "operator_id",
        "operator_name",
        "n_ccns",
        "n_states",
        "state_codes",
    ];
    header.extend_from_slice(ROLLUP_COLUMNS);
    writer
        .write_record(&header)
        .context("Failed writing operator table header")?;

    for row in rows {
        let mut record = vec![
            row.year.to_string(),
            row.operator_id.to_string(),
            row.operator_name.clone(),
            row.n_ccns.to_string(),
            row.n_states.to_string(),
            row.state_codes.clone(),
        ];
        for sum in &row.sums {
            record.push(sum.to_string());
        }
        writer
            .write_record(&record)
            .context("Failed writing operator table row")?;
    }
    writer.flush().context("Failed flushing operator table")?;
    Ok(())
}
