use std::borrow::Cow;
use std::fmt::{self, Display};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::{Result, VarconError};

/// Number of leading columns that make up an original-input key:
/// chromosome, start, end, reference, alternate.
pub const KEY_WIDTH: usize = 5;

///
/// Contig naming convention that both sides of a join are brought to.
///
/// Classifier output reports bare contigs (`1`, `X`, `MT`) while the VCF side
/// reports prefixed ones (`chr1`, `chrX`, `chrM`). Without normalization the
/// join silently misses every variant.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChromNaming {
    #[default]
    Prefixed,
    Bare,
}

impl ChromNaming {
    ///
    /// Bring a contig name to this convention.
    ///
    /// Only the primary assembly contigs (autosomes, sex chromosomes and the
    /// mitochondrion) are rewritten; alt/decoy/unplaced contigs pass through untouched.
    ///
    pub fn normalize<'a>(&self, chrom: &'a str) -> Cow<'a, str> {
        let bare = strip_chr_prefix(chrom);
        if !is_primary_contig(bare) {
            return Cow::Borrowed(chrom);
        }

        let mito = bare.eq_ignore_ascii_case("M") || bare.eq_ignore_ascii_case("MT");
        let upper = !bare.bytes().any(|b| b.is_ascii_lowercase());
        match self {
            ChromNaming::Prefixed => {
                if mito {
                    if chrom == "chrM" {
                        Cow::Borrowed(chrom)
                    } else {
                        Cow::Owned("chrM".to_string())
                    }
                } else if upper && chrom.len() > bare.len() && chrom.starts_with("chr") {
                    Cow::Borrowed(chrom)
                } else {
                    Cow::Owned(format!("chr{}", bare.to_ascii_uppercase()))
                }
            }
            ChromNaming::Bare => {
                if mito {
                    if chrom == "MT" {
                        Cow::Borrowed(chrom)
                    } else {
                        Cow::Owned("MT".to_string())
                    }
                } else if upper && bare.len() == chrom.len() {
                    Cow::Borrowed(chrom)
                } else {
                    Cow::Owned(bare.to_ascii_uppercase())
                }
            }
        }
    }
}

impl FromStr for ChromNaming {
    type Err = VarconError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "prefixed" | "chr" | "ucsc" => Ok(ChromNaming::Prefixed),
            "bare" | "ensembl" | "ncbi" => Ok(ChromNaming::Bare),
            other => Err(VarconError::InvalidConfig(format!(
                "Unknown chromosome naming convention '{}', expected 'prefixed' or 'bare'",
                other
            ))),
        }
    }
}

impl Display for ChromNaming {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChromNaming::Prefixed => write!(f, "prefixed"),
            ChromNaming::Bare => write!(f, "bare"),
        }
    }
}

fn strip_chr_prefix(chrom: &str) -> &str {
    match chrom.get(..3) {
        Some(prefix) if chrom.len() > 3 && prefix.eq_ignore_ascii_case("chr") => &chrom[3..],
        _ => chrom,
    }
}

fn is_primary_contig(bare: &str) -> bool {
    if !bare.is_empty() && bare.bytes().all(|b| b.is_ascii_digit()) {
        return true;
    }
    matches!(
        bare.to_ascii_uppercase().as_str(),
        "X" | "Y" | "M" | "MT"
    )
}

///
/// Variant identity as reported before any multi-allelic splitting or indel
/// realignment (ANNOVAR input coordinates).
///
/// Fields are private: once built, the key cannot be patched by a later stage.
/// The chromosome is normalized on construction.
///
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct OriginalKey {
    chrom: String,
    start: u64,
    end: u64,
    reference: String,
    alternate: String,
}

impl OriginalKey {
    pub fn new(
        chrom: &str,
        start: u64,
        end: u64,
        reference: &str,
        alternate: &str,
        naming: ChromNaming,
    ) -> Self {
        OriginalKey {
            chrom: naming.normalize(chrom).into_owned(),
            start,
            end,
            reference: reference.to_string(),
            alternate: alternate.to_string(),
        }
    }

    ///
    /// Build a key from the five leading key fields of a row.
    ///
    /// # Arguments
    /// - fields: at least [KEY_WIDTH] values: chr, start, end, ref, alt
    /// - naming: contig convention to normalize the chromosome to
    ///
    pub fn from_fields<S: AsRef<str>>(fields: &[S], naming: ChromNaming) -> Result<Self> {
        if fields.len() < KEY_WIDTH {
            return Err(VarconError::InvalidKey(format!(
                "expected {} key fields, found {}",
                KEY_WIDTH,
                fields.len()
            )));
        }

        let chrom = fields[0].as_ref().trim();
        if chrom.is_empty() {
            return Err(VarconError::InvalidKey("empty chromosome".to_string()));
        }

        let start = parse_coordinate(fields[1].as_ref(), "start")?;
        let end = parse_coordinate(fields[2].as_ref(), "end")?;

        Ok(OriginalKey::new(
            chrom,
            start,
            end,
            fields[3].as_ref().trim(),
            fields[4].as_ref().trim(),
            naming,
        ))
    }

    pub fn chrom(&self) -> &str {
        &self.chrom
    }

    pub fn start(&self) -> u64 {
        self.start
    }

    pub fn end(&self) -> u64 {
        self.end
    }

    pub fn reference(&self) -> &str {
        &self.reference
    }

    pub fn alternate(&self) -> &str {
        &self.alternate
    }

    ///
    /// Render the key back into its five table columns.
    ///
    pub fn to_fields(&self) -> [String; KEY_WIDTH] {
        [
            self.chrom.clone(),
            self.start.to_string(),
            self.end.to_string(),
            self.reference.clone(),
            self.alternate.clone(),
        ]
    }
}

impl Display for OriginalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}-{}:{}>{}",
            self.chrom, self.start, self.end, self.reference, self.alternate
        )
    }
}

fn parse_coordinate(value: &str, what: &str) -> Result<u64> {
    value.trim().parse::<u64>().map_err(|_| {
        VarconError::InvalidKey(format!("{} coordinate '{}' is not an integer", what, value))
    })
}

///
/// Variant identity after a caller/normalizer split multi-allelic sites or
/// realigned indels: the VCF `CHROM POS REF ALT` of a single record.
///
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct VariantKey {
    pub chrom: String,
    pub pos: u64,
    pub reference: String,
    pub alternate: String,
}

impl Display for VariantKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}>{}",
            self.chrom, self.pos, self.reference, self.alternate
        )
    }
}

///
/// A tool-normalized variant together with the original key it came from.
///
/// The field projector builds one per record from the coordinates the
/// reconciler stored in INFO; later stages join on `original` only.
///
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrackedVariant {
    pub normalized: VariantKey,
    pub original: OriginalKey,
}

impl TrackedVariant {
    ///
    /// Whether a tool moved the variant away from its original coordinates
    /// (multi-allelic split, indel left-alignment, padding base added).
    ///
    pub fn is_renormalized(&self) -> bool {
        self.normalized.pos != self.original.start
            || self.normalized.reference != self.original.reference
            || self.normalized.alternate != self.original.alternate
    }
}
