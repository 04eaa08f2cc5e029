use std::fmt::{self, Display};
use std::str::FromStr;

use serde::Serialize;

use varcon_core::errors::VarconError;
use varcon_core::models::{OriginalKey, Row};

/// Name of the column appended to both unmatched tables.
pub const UNMATCHED_REASON_COLUMN: &str = "unmatched_reason";

///
/// Why a row ended up in an unmatched table. None of these is an error: the
/// row is kept for audit and the batch continues.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UnmatchedReason {
    /// The key exists on this side only.
    NoMatch,
    /// The key exists on the other side more than once and no discriminator
    /// picked exactly one row.
    AmbiguousKey,
    /// The row has the wrong number of fields or an unparseable key.
    MalformedRow,
}

impl Display for UnmatchedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnmatchedReason::NoMatch => write!(f, "no_match"),
            UnmatchedReason::AmbiguousKey => write!(f, "ambiguous_key"),
            UnmatchedReason::MalformedRow => write!(f, "malformed_row"),
        }
    }
}

///
/// Secondary column pair used to pick one VCF row when several share a key
/// (e.g. an allele index carried on both sides).
///
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Discriminator {
    pub classifier_column: String,
    pub vcf_column: String,
}

impl FromStr for Discriminator {
    type Err = VarconError;

    /// Parse `CLASSIFIER_COL:VCF_COL`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once(':') {
            Some((c, v)) if !c.is_empty() && !v.is_empty() => Ok(Discriminator {
                classifier_column: c.to_string(),
                vcf_column: v.to_string(),
            }),
            _ => Err(VarconError::InvalidConfig(format!(
                "discriminator must look like CLASSIFIER_COL:VCF_COL, got '{}'",
                s
            ))),
        }
    }
}

///
/// Which source rows a merged record was built from (0-based data row indices).
///
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Provenance {
    pub classifier_row: usize,
    pub vcf_row: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedRecord {
    pub key: OriginalKey,
    pub row: Row,
    pub provenance: Provenance,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnmatchedRecord {
    pub row: Row,
    pub reason: UnmatchedReason,
}
