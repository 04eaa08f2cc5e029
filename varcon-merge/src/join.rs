//! Merge/Join Engine.
//!
//! Joins the classifier table (a) against the projected VCF table (b) on the
//! original-input key. Output order depends only on input order: merged rows
//! follow (a), unmatched rows follow their own source.

use std::path::{Path, PathBuf};

use fxhash::{FxHashMap, FxHashSet};
use log::{debug, info, warn};
use serde::Serialize;

use varcon_core::errors::{Result, VarconError};
use varcon_core::models::{ChromNaming, KEY_WIDTH, OriginalKey, RaggedRows, Row, Schema, Table};
use varcon_io::publish_tsv;

use crate::models::{
    Discriminator, MergedRecord, Provenance, UNMATCHED_REASON_COLUMN, UnmatchedReason,
    UnmatchedRecord,
};

const STAGE: &str = "merge";

#[derive(Debug, Clone, Default)]
pub struct MergeOptions {
    pub naming: ChromNaming,
    pub discriminator: Option<Discriminator>,
}

///
/// Destinations of the three join artifacts.
///
#[derive(Debug, Clone)]
pub struct MergeOutputs {
    pub merged: PathBuf,
    pub unmatched_classifier: PathBuf,
    pub unmatched_vcf: PathBuf,
}

impl MergeOutputs {
    ///
    /// Audit tables named after the merged output:
    /// `x.tsv` -> `x.unmatched.classifier.tsv`, `x.unmatched.vcf.tsv`.
    ///
    pub fn beside(merged: &Path) -> Self {
        MergeOutputs {
            merged: merged.to_path_buf(),
            unmatched_classifier: varcon_core::utils::sibling_with_suffix(
                merged,
                "unmatched.classifier.tsv",
            ),
            unmatched_vcf: varcon_core::utils::sibling_with_suffix(merged, "unmatched.vcf.tsv"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MergeReport {
    pub classifier_rows: usize,
    pub vcf_rows: usize,
    pub matched: usize,
    pub unmatched_classifier: usize,
    pub unmatched_vcf: usize,
    pub ambiguous: usize,
    pub malformed: usize,
}

///
/// Result of a join, held in memory before it is published.
///
#[derive(Debug, Clone)]
pub struct JoinResult {
    pub schema: Schema,
    pub merged: Vec<MergedRecord>,
    pub classifier_schema: Schema,
    pub unmatched_classifier: Vec<UnmatchedRecord>,
    pub vcf_schema: Schema,
    pub unmatched_vcf: Vec<UnmatchedRecord>,
}

impl JoinResult {
    pub fn report(&self, classifier_rows: usize, vcf_rows: usize) -> MergeReport {
        let all = self
            .unmatched_classifier
            .iter()
            .chain(self.unmatched_vcf.iter());
        let count = |reason: UnmatchedReason| all.clone().filter(|u| u.reason == reason).count();

        MergeReport {
            classifier_rows,
            vcf_rows,
            matched: self.merged.len(),
            unmatched_classifier: self.unmatched_classifier.len(),
            unmatched_vcf: self.unmatched_vcf.len(),
            ambiguous: count(UnmatchedReason::AmbiguousKey),
            malformed: count(UnmatchedReason::MalformedRow),
        }
    }
}

fn require_key_columns(table: &Table) -> Result<()> {
    if table.schema.len() < KEY_WIDTH {
        let missing = ["Chr", "Start", "End", "Ref", "Alt"][table.schema.len()];
        return Err(VarconError::SchemaMismatch {
            stage: STAGE,
            field: missing.to_string(),
            input: table.source_name(),
        });
    }
    Ok(())
}

///
/// Key of a row, or `None` when the row cannot take part in the join.
///
fn row_key(table: &Table, row: &Row, naming: ChromNaming) -> Option<OriginalKey> {
    if row.len() != table.schema.len() {
        return None;
    }
    OriginalKey::from_fields(&row[..KEY_WIDTH], naming).ok()
}

///
/// Audit copy of a row, padded or cut to the schema width so the reason
/// column always lines up with its header.
///
fn audit_row(row: &Row, width: usize, reason: UnmatchedReason) -> UnmatchedRecord {
    let mut row = row.clone();
    row.resize(width, String::new());
    UnmatchedRecord { row, reason }
}

///
/// Join a classifier table against a projected VCF table.
///
/// # Arguments
/// - classifier: table (a), one row per original-input variant
/// - vcf: table (b), possibly several rows per original-input variant
/// - options: contig naming and optional discriminator
///
pub fn join(classifier: &Table, vcf: &Table, options: &MergeOptions) -> Result<JoinResult> {
    require_key_columns(classifier)?;
    require_key_columns(vcf)?;

    // merged columns: key once, then classifier fields, then vcf fields
    let classifier_fields = &classifier.schema.fields()[KEY_WIDTH..];
    let vcf_fields = &vcf.schema.fields()[KEY_WIDTH..];
    let seen: FxHashSet<&str> = classifier_fields.iter().map(String::as_str).collect();
    if let Some(dup) = vcf_fields.iter().find(|f| seen.contains(f.as_str())) {
        return Err(VarconError::FieldCollision(dup.clone()));
    }
    let mut merged_fields: Vec<String> = classifier.schema.fields().to_vec();
    merged_fields.extend(vcf_fields.iter().cloned());
    let schema = Schema::new(merged_fields);

    let discriminator = match &options.discriminator {
        Some(d) => Some((
            classifier.require(&d.classifier_column, STAGE)?,
            vcf.require(&d.vcf_column, STAGE)?,
        )),
        None => None,
    };

    // index (b); row indices per key stay in source order
    let mut index: FxHashMap<OriginalKey, Vec<usize>> = FxHashMap::default();
    let mut vcf_state: Vec<Option<UnmatchedReason>> = Vec::with_capacity(vcf.len());
    for (i, row) in vcf.rows.iter().enumerate() {
        match row_key(vcf, row, options.naming) {
            Some(key) => {
                index.entry(key).or_default().push(i);
                vcf_state.push(Some(UnmatchedReason::NoMatch));
            }
            None => vcf_state.push(Some(UnmatchedReason::MalformedRow)),
        }
    }

    let mut merged = Vec::new();
    let mut unmatched_classifier = Vec::new();
    let width = classifier.schema.len();

    for (i, row) in classifier.rows.iter().enumerate() {
        let Some(key) = row_key(classifier, row, options.naming) else {
            unmatched_classifier.push(audit_row(row, width, UnmatchedReason::MalformedRow));
            continue;
        };

        let candidates = match index.get(&key) {
            Some(c) => c,
            None => {
                unmatched_classifier.push(audit_row(row, width, UnmatchedReason::NoMatch));
                continue;
            }
        };

        let chosen = match (candidates.as_slice(), discriminator) {
            ([only], _) => Some(*only),
            (many, Some((c_col, v_col))) => {
                let wanted = classifier.value(row, c_col);
                let mut hits = many
                    .iter()
                    .filter(|&&j| vcf.value(&vcf.rows[j], v_col) == wanted);
                match (hits.next(), hits.next()) {
                    (Some(&j), None) => Some(j),
                    _ => None,
                }
            }
            (_, None) => None,
        };

        // a vcf row is consumed at most once; a repeated classifier key loses
        let chosen = chosen.filter(|&j| vcf_state[j].is_some());

        match chosen {
            Some(j) => {
                vcf_state[j] = None;
                let mut out: Row = key.to_fields().into_iter().collect();
                out.extend(row[KEY_WIDTH..].iter().cloned());
                out.extend(vcf.rows[j][KEY_WIDTH..].iter().cloned());
                merged.push(MergedRecord {
                    key,
                    row: out,
                    provenance: Provenance {
                        classifier_row: i,
                        vcf_row: j,
                    },
                });
            }
            None => {
                debug!("{} vcf rows share key {}, routing to unmatched", candidates.len(), key);
                for &j in candidates {
                    if vcf_state[j] == Some(UnmatchedReason::NoMatch) {
                        vcf_state[j] = Some(UnmatchedReason::AmbiguousKey);
                    }
                }
                unmatched_classifier.push(audit_row(row, width, UnmatchedReason::AmbiguousKey));
            }
        }
    }

    let vcf_width = vcf.schema.len();
    let unmatched_vcf: Vec<UnmatchedRecord> = vcf
        .rows
        .iter()
        .zip(vcf_state.iter())
        .filter_map(|(row, state)| state.map(|reason| audit_row(row, vcf_width, reason)))
        .collect();

    Ok(JoinResult {
        schema,
        merged,
        classifier_schema: classifier.schema.clone(),
        unmatched_classifier,
        vcf_schema: vcf.schema.clone(),
        unmatched_vcf,
    })
}

fn percent(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64 * 100.0
    }
}

///
/// Read both tables, join them and publish the merged table and both
/// unmatched audit tables.
///
/// # Arguments
/// - classifier: path to the classifier table (a)
/// - vcf_table: path to the projected VCF table (b)
/// - outputs: destinations of the three artifacts
/// - options: contig naming and optional discriminator
///
pub fn merge(
    classifier: &Path,
    vcf_table: &Path,
    outputs: &MergeOutputs,
    options: &MergeOptions,
) -> Result<MergeReport> {
    let a = Table::read(classifier, RaggedRows::Keep)?;
    let b = Table::read(vcf_table, RaggedRows::Keep)?;

    let result = join(&a, &b, options)?;
    let report = result.report(a.len(), b.len());

    publish_tsv(
        &outputs.merged,
        &result.schema,
        result.merged.iter().map(|m| &m.row),
    )?;
    write_unmatched(
        &outputs.unmatched_classifier,
        &result.classifier_schema,
        &result.unmatched_classifier,
    )?;
    write_unmatched(&outputs.unmatched_vcf, &result.vcf_schema, &result.unmatched_vcf)?;

    let total = report.matched + report.unmatched_classifier;
    info!("Total classifier variants processed: {}", total);
    info!(
        "Matched variants: {} ({:.2}%)",
        report.matched,
        percent(report.matched, total)
    );
    info!(
        "Unmatched classifier variants: {} ({:.2}%)",
        report.unmatched_classifier,
        percent(report.unmatched_classifier, total)
    );
    info!("Unmatched vcf variants: {}", report.unmatched_vcf);
    if report.ambiguous > 0 || report.malformed > 0 {
        warn!(
            "{} rows with ambiguous keys and {} malformed rows routed to unmatched",
            report.ambiguous, report.malformed
        );
    }

    Ok(report)
}

fn write_unmatched(path: &Path, schema: &Schema, records: &[UnmatchedRecord]) -> Result<()> {
    let rows: Vec<Row> = records
        .iter()
        .map(|u| {
            let mut row = u.row.clone();
            row.push(u.reason.to_string());
            row
        })
        .collect();
    publish_tsv(path, &schema.extended(&[UNMATCHED_REASON_COLUMN]), &rows)?;
    Ok(())
}
