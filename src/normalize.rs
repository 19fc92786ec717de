/// Normalize an HHA name for grouping into operators (multi-site chains
/// report the same name across many CCNs with inconsistent casing and
/// spacing).
///
/// Uppercases, collapses runs of whitespace to single spaces, and trims.
/// Empty or all-whitespace input yields an empty string. Two raw names
/// belong to the same operator iff their normalized forms are identical;
/// there is deliberately no punctuation stripping or similarity scoring,
/// trading recall for deterministic, exact grouping.
pub fn normalize_operator_name(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_uppercase()
}

/// Parse a reported dollar/volume cell into a number.
///
/// Extracts use comma thousands separators and leave unreported cells
/// blank. Blank or unparseable cells are `None` (not reported), never an
/// error.
pub fn parse_amount(raw: &str) -> Option<f64> {
    let cleaned = raw.replace(',', "");
    let trimmed = cleaned.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok()
}
