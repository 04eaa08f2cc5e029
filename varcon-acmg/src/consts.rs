/// Canonical tier label (`Likely Pathogenic`), not the source spelling.
pub const CATEGORY_COLUMN: &str = "category";
/// `RULE=value` pairs joined by `, `. Together with [CATEGORY_COLUMN] this
/// does not rebuild the source string; the composite column is kept in the
/// row for that.
pub const RULE_EVIDENCE_COLUMN: &str = "rule_evidence";
pub const VUS_SUBTIER_COLUMN: &str = "vus_subtier";
pub const VUS_REASON_COLUMN: &str = "vus_subtier_reason";

/// Columns of the VUS summary table, kept when present in the input.
pub const VUS_SUMMARY_COLUMNS: [&str; 7] = [
    "Ref.Gene",
    "ANN[0].HGVS_C",
    "ANN[0].HGVS_P",
    CATEGORY_COLUMN,
    RULE_EVIDENCE_COLUMN,
    VUS_SUBTIER_COLUMN,
    VUS_REASON_COLUMN,
];
