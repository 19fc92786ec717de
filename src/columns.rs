//! Column-name contract for the generated tables.
//!
//! The header strings below are consumed verbatim by downstream tooling
//! (dashboards read both tables by column name), so they must match the
//! CMS HHA cost report extract headers exactly, punctuation included.

/// Cost report years covered by the published extracts.
pub const SUPPORTED_YEARS: [i32; 4] = [2020, 2021, 2022, 2023];

/// Delimiter for the rendered `state_codes` list in the operator table.
pub const STATE_CODES_DELIMITER: char = '|';

/// Numeric cost report columns carried into `providers_annual.csv`,
/// in output order. A provider row holds one `Option<f64>` per entry,
/// positionally aligned with this list.
pub const METRIC_COLUMNS: &[&str] = &[
    "Total, Medicare Title XVIII Visits",
    "Total, Medicaid Title XIX Visits",
    "Total, Other Visits",
    "Total, Total Visits",
    "Total Episodes-Total Visits",
    "Total Episodes-Total Charges",
    "Total Cost",
    "Total HHA Medicare Program Visits",
    "Total HHA Medicare Program Cost",
    "Gross Patient Revenues Title XVIII Medicare",
    "Gross Patient Revenues Title XIX Medicaid",
    "Gross Patient Revenues Other",
    "Gross Patient Revenues Total",
    "Less: Allowances and discounts on patients' accounts Title XVIII Medicare",
    "Less: Allowances and discounts on patients' accounts Title XIX Medicaid",
    "Less: Allowances and discounts on patients' accounts Other",
    "Less: Allowances and discounts on patients' accounts Total",
    "Net Patient Revenues (line 1 minus line 2) XVIII Medicare",
    "Net Patient Revenues (line 1 minus line 2) XIX Medicaid",
    "Net Patient Revenues (line 1 minus line 2) Other",
    "Net Patient Revenues (line 1 minus line 2) Total",
    "Less Total Operating Expenses (sum of lines 4 through 16)",
    "Net Income from service to patients (line 3 minus line 17)",
    "Total Other Income (sum of lines 19 through 31)",
    "Net Income or Loss for the period (line 18 plus line 32)",
    "Total PPS Payment - full episodes/periods without outliers",
    "Total PPS Payment - full episodes/periods with outliers",
    "Total PPS Payment - LUPA episodes/periods",
    "Total PPS Payment - PEP episodes/periods",
    "Total PPS Outlier Payment - full episodes/periods with outliers",
    "Total PPS Outlier Payment - PEP episodes/periods",
    "Allowable Bad Debts",
    "Adjusted Reimbursable Bad Debts",
    "Total Current Assets",
    "Total Fixed Assets",
    "Total Assets",
    "Total Current Liabilities",
    "Total Long Term Liabilities",
    "Total Liabilities",
    "Fund Balance",
    "Total Liabilities and Fund Balances",
    "Total Hospice Days Title XVIII Medicare",
    "Total Hospice Days Title XIX Medicaid",
    "Total Hospice Days Title Other",
    "Total Hospice Days Total",
    "Total Hospice Expenses",
];

/// Metric columns rolled up per (operator_id, year) into
/// `operators_annual.csv`, in output order. Every entry must also appear
/// in [`METRIC_COLUMNS`].
pub const ROLLUP_COLUMNS: &[&str] = &[
    "Gross Patient Revenues Title XVIII Medicare",
    "Gross Patient Revenues Title XIX Medicaid",
    "Gross Patient Revenues Other",
    "Gross Patient Revenues Total",
    "Net Patient Revenues (line 1 minus line 2) XVIII Medicare",
    "Net Patient Revenues (line 1 minus line 2) XIX Medicaid",
    "Net Patient Revenues (line 1 minus line 2) Other",
    "Net Patient Revenues (line 1 minus line 2) Total",
    "Total Cost",
    "Total HHA Medicare Program Cost",
    "Total, Total Visits",
    "Total Episodes-Total Visits",
    "Total Episodes-Total Charges",
    "Less Total Operating Expenses (sum of lines 4 through 16)",
    "Net Income from service to patients (line 3 minus line 17)",
    "Net Income or Loss for the period (line 18 plus line 32)",
    "Total Assets",
    "Total Liabilities",
    "Fund Balance",
    "Total PPS Payment - full episodes/periods without outliers",
    "Total PPS Payment - full episodes/periods with outliers",
    "Total PPS Payment - LUPA episodes/periods",
    "Total PPS Payment - PEP episodes/periods",
    "Total Hospice Days Total",
    "Total Hospice Expenses",
];

/// Identity and location passthrough columns of `providers_annual.csv`,
/// in output order, following `year`, `operator_id`, and `HHA Name`.
pub const IDENTITY_COLUMNS: &[&str] = &[
    "rpt_rec_num",
    "Provider CCN",
    "Street Address",
    "City",
    "State Code",
    "Zip Code",
    "Type of Control",
    "Fiscal Year Begin Date",
    "Fiscal Year End Date",
    "HHA-based Hospice Provider CCN",
];

/// Index into [`METRIC_COLUMNS`] for each rollup column, in rollup output
/// order. Panics only if the two static tables above disagree, which the
/// unit tests rule out.
pub fn rollup_metric_indexes() -> Vec<usize> {
    ROLLUP_COLUMNS
        .iter()
        .map(|name| {
            METRIC_COLUMNS
                .iter()
                .position(|m| m == name)
                .unwrap_or_else(|| panic!("rollup column {name:?} missing from METRIC_COLUMNS"))
        })
        .collect()
}
