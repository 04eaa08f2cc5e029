/// INFO keys carrying a record's original-input coordinates.
pub const AVINPUT_CHR: &str = "AVINPUTCHR";
pub const AVINPUT_START: &str = "AVINPUTSTART";
pub const AVINPUT_END: &str = "AVINPUTEND";
pub const AVINPUT_REF: &str = "AVINPUTREF";
pub const AVINPUT_ALT: &str = "AVINPUTALT";

/// The original-coordinate INFO keys, in key order.
pub const AVINPUT_FIELDS: [(&str, &str); 5] = [
    (AVINPUT_CHR, "Original input chromosome"),
    (AVINPUT_START, "Original input start position"),
    (AVINPUT_END, "Original input end position"),
    (AVINPUT_REF, "Original input reference allele"),
    (AVINPUT_ALT, "Original input alternate allele"),
];

/// Leading key columns of a projected table.
pub const PROJECTED_KEY_HEADER: [&str; 5] = ["Chr", "Start", "End", "Ref", "Alt"];

/// Requested fields that the leading key replaces in projected output.
pub const REPLACED_BY_KEY: [&str; 4] = ["CHROM", "POS", "REF", "ALT"];

/// Number of leading avinput columns: chr, start, end, ref, alt.
pub const AVINPUT_WIDTH: usize = 5;

pub const DEFAULT_FIELDS: [&str; 24] = [
    "CHROM",
    "POS",
    "REF",
    "ALT",
    "ANN[0].GENE",
    "ANN[0].FEATUREID",
    "ANN[0].HGVS_P",
    "ANN[0].HGVS_C",
    "ANN[0].EFFECT",
    "ANN[0].IMPACT",
    "ANN[0].RANK",
    "DP",
    "AF",
    "GEN[0].AD",
    "CLNHGVS",
    "CLNSIGCONF",
    "ALLELEID",
    "FILTER",
    "RS",
    AVINPUT_CHR,
    AVINPUT_START,
    AVINPUT_END,
    AVINPUT_REF,
    AVINPUT_ALT,
];
