//! Field requests in the SnpSift `extractFields` naming convention.

use std::fmt::Write as _;

use varcon_core::errors::{Result, VarconError};

use crate::vcf::{FIXED_COLUMNS, InfoValue, VcfHeader, VcfRecord};

const STAGE: &str = "project";

/// SnpEff `ANN` sub-fields, in the order they appear inside one annotation.
const ANN_SUBFIELDS: [&str; 16] = [
    "ALLELE", "EFFECT", "IMPACT", "GENE", "GENEID", "FEATURE", "FEATUREID", "BIOTYPE", "RANK",
    "HGVS_C", "HGVS_P", "CDNA_POS", "CDS_POS", "AA_POS", "DISTANCE", "ERRORS",
];

///
/// Selects one element or all elements of a repeated value.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selector {
    At(usize),
    All,
}

///
/// Part of a `pos/length` annotation sub-field.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Part {
    Whole,
    Position,
    Length,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldRequest {
    Fixed(usize),
    Info { key: String, flag: bool },
    Ann { selector: Selector, subfield: usize, part: Part },
    Gen { selector: Selector, key: String },
}

fn parse_indexed(name: &str, prefix: &str) -> Option<(Selector, String)> {
    let rest = name.strip_prefix(prefix)?.strip_prefix('[')?;
    let (index, rest) = rest.split_once(']')?;
    let sub = rest.strip_prefix('.')?;
    let selector = match index.trim() {
        "*" => Selector::All,
        i => Selector::At(i.parse().ok()?),
    };
    Some((selector, sub.to_string()))
}

fn ann_subfield(name: &str) -> Option<(usize, Part)> {
    let upper = name.to_ascii_uppercase();
    if let Some(i) = ANN_SUBFIELDS.iter().position(|s| *s == upper) {
        let part = if upper.ends_with("_POS") {
            Part::Position
        } else {
            Part::Whole
        };
        return Some((i, part));
    }
    // CDNA_LEN, CDS_LEN and AA_LEN read the length half of the matching _POS sub-field
    let stem = upper.strip_suffix("_LEN")?;
    let i = ANN_SUBFIELDS
        .iter()
        .position(|s| s.strip_suffix("_POS") == Some(stem))?;
    Some((i, Part::Length))
}

impl FieldRequest {
    ///
    /// Resolve a requested field name against a VCF header.
    ///
    /// Fails with a schema mismatch when the name does not refer to anything
    /// the header declares.
    ///
    /// # Arguments
    /// - name: the requested name, e.g. `DP`, `ANN[0].GENE`, `GEN[0].AD`
    /// - header: the header of the VCF the field is read from
    /// - input: source name, for the error message
    ///
    pub fn resolve(name: &str, header: &VcfHeader, input: &str) -> Result<Self> {
        let mismatch = || VarconError::SchemaMismatch {
            stage: STAGE,
            field: name.to_string(),
            input: input.to_string(),
        };

        if let Some(i) = FIXED_COLUMNS[..7].iter().position(|c| *c == name) {
            return Ok(FieldRequest::Fixed(i));
        }

        if let Some((selector, sub)) = parse_indexed(name, "ANN") {
            header.info("ANN").ok_or_else(mismatch)?;
            let (subfield, part) = ann_subfield(&sub).ok_or_else(mismatch)?;
            return Ok(FieldRequest::Ann {
                selector,
                subfield,
                part,
            });
        }

        if let Some((selector, key)) = parse_indexed(name, "GEN") {
            header.format(&key).ok_or_else(mismatch)?;
            if let Selector::At(i) = selector {
                // a header without sample columns still allows GEN[0] on sites-only input
                if !header.samples().is_empty() && i >= header.samples().len() {
                    return Err(mismatch());
                }
            }
            return Ok(FieldRequest::Gen { selector, key });
        }

        let decl = header.info(name).ok_or_else(mismatch)?;
        Ok(FieldRequest::Info {
            key: name.to_string(),
            flag: decl.is_flag(),
        })
    }

    ///
    /// Extract this field from a record. Absent values are the empty string.
    ///
    pub fn extract(&self, record: &VcfRecord) -> String {
        match self {
            FieldRequest::Fixed(i) => record.fixed(*i).to_string(),
            FieldRequest::Info { key, flag } => match (record.info(key), flag) {
                (Some(InfoValue::Flag), _) => "true".to_string(),
                (None, true) => "false".to_string(),
                (Some(InfoValue::Value(v)), _) => v.to_string(),
                (None, false) => String::new(),
            },
            FieldRequest::Ann {
                selector,
                subfield,
                part,
            } => {
                let ann = match record.info("ANN") {
                    Some(InfoValue::Value(v)) => v,
                    _ => return String::new(),
                };
                let pick = |annotation: &str| -> String {
                    let value = annotation.split('|').nth(*subfield).unwrap_or("");
                    match part {
                        Part::Whole => value.to_string(),
                        Part::Position => value.split('/').next().unwrap_or("").to_string(),
                        Part::Length => value.split('/').nth(1).unwrap_or("").to_string(),
                    }
                };
                match selector {
                    Selector::At(i) => ann.split(',').nth(*i).map(pick).unwrap_or_default(),
                    Selector::All => ann.split(',').map(pick).collect::<Vec<_>>().join(","),
                }
            }
            FieldRequest::Gen { selector, key } => match selector {
                Selector::At(i) => record.sample_value(*i, key).unwrap_or("").to_string(),
                Selector::All => {
                    let mut joined = String::new();
                    for i in 0..record.n_samples() {
                        if i > 0 {
                            joined.push(',');
                        }
                        let _ = write!(joined, "{}", record.sample_value(i, key).unwrap_or(""));
                    }
                    joined
                }
            },
        }
    }
}
