//! Field Projector.
//!
//! Flattens an annotated VCF into one tab-delimited row per record, keyed by
//! the record's original-input coordinates instead of its own CHROM/POS/REF/ALT.

use std::path::Path;

use log::{debug, info};
use rayon::prelude::*;
use serde::Serialize;

use varcon_core::errors::{Result, VarconError};
use varcon_core::models::{ChromNaming, OriginalKey, Row, Schema, Table, TrackedVariant};
use varcon_io::TableWrite;

use crate::consts::{AVINPUT_FIELDS, DEFAULT_FIELDS, PROJECTED_KEY_HEADER, REPLACED_BY_KEY};
use crate::encoding::decode_info_value;
use crate::fields::FieldRequest;
use crate::vcf::{VcfFile, VcfRecord};

#[derive(Debug, Clone)]
pub struct ProjectOptions {
    /// Requested field names, in output order.
    pub fields: Vec<String>,
    pub naming: ChromNaming,
}

impl Default for ProjectOptions {
    fn default() -> Self {
        ProjectOptions {
            fields: DEFAULT_FIELDS.iter().map(|s| s.to_string()).collect(),
            naming: ChromNaming::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProjectReport {
    pub input: String,
    pub output: String,
    pub records: usize,
    pub columns: usize,
}

fn is_key_field(name: &str) -> bool {
    REPLACED_BY_KEY.contains(&name) || AVINPUT_FIELDS.iter().any(|(k, _)| *k == name)
}

///
/// Requested fields resolved against a header, plus the five
/// original-coordinate fields that make up the leading key.
///
#[derive(Debug, Clone)]
pub struct Projection {
    key: Vec<FieldRequest>,
    names: Vec<String>,
    requests: Vec<FieldRequest>,
    naming: ChromNaming,
}

impl Projection {
    ///
    /// Resolve every requested name before any row is produced.
    ///
    pub fn new(vcf: &VcfFile, options: &ProjectOptions, input: &str) -> Result<Self> {
        let key = AVINPUT_FIELDS
            .iter()
            .map(|(k, _)| FieldRequest::resolve(k, &vcf.header, input))
            .collect::<Result<Vec<_>>>()?;

        let mut names = Vec::new();
        let mut requests = Vec::new();
        for name in &options.fields {
            // resolve key fields too, so a typo there is still reported
            let request = FieldRequest::resolve(name, &vcf.header, input)?;
            if is_key_field(name) {
                continue;
            }
            names.push(name.clone());
            requests.push(request);
        }

        Ok(Projection {
            key,
            names,
            requests,
            naming: options.naming,
        })
    }

    pub fn schema(&self) -> Schema {
        let mut fields: Vec<String> = PROJECTED_KEY_HEADER.iter().map(|s| s.to_string()).collect();
        fields.extend(self.names.iter().cloned());
        Schema::new(fields)
    }

    ///
    /// Pair a record's own coordinates with the original key stored in its
    /// AVINPUT INFO keys.
    ///
    pub fn track(&self, record: &VcfRecord, input: &str) -> Result<TrackedVariant> {
        let values: Vec<String> = self
            .key
            .iter()
            .map(|r| decode_info_value(&r.extract(record)).into_owned())
            .collect();

        if values.iter().any(|v| v.is_empty()) {
            return Err(VarconError::MalformedRow {
                input: input.to_string(),
                line: record.line(),
                reason: "record carries no original-input coordinates".to_string(),
            });
        }

        let original =
            OriginalKey::from_fields(&values, self.naming).map_err(|e| VarconError::MalformedRow {
                input: input.to_string(),
                line: record.line(),
                reason: e.to_string(),
            })?;

        Ok(TrackedVariant {
            normalized: record.variant_key(),
            original,
        })
    }

    ///
    /// Output row of a record: the original key, then the requested fields.
    ///
    pub fn row(&self, tracked: &TrackedVariant, record: &VcfRecord) -> Row {
        let mut row: Row = tracked.original.to_fields().into_iter().collect();
        row.extend(self.requests.iter().map(|r| r.extract(record)));
        row
    }
}

///
/// Project every record of an annotated VCF into a table.
///
/// # Arguments
/// - vcf: the annotated VCF, carrying the reconciler's AVINPUT keys
/// - options: requested fields and contig naming
/// - input: source name, for error messages
///
pub fn project_vcf(vcf: &VcfFile, options: &ProjectOptions, input: &str) -> Result<Table> {
    let projection = Projection::new(vcf, options, input)?;

    let projected = vcf
        .records
        .par_iter()
        .map(|record| -> Result<(Row, bool)> {
            let tracked = projection.track(record, input)?;
            Ok((projection.row(&tracked, record), tracked.is_renormalized()))
        })
        .collect::<Result<Vec<_>>>()?;

    let renormalized = projected.iter().filter(|(_, moved)| *moved).count();
    debug!(
        "{} of {} records in {} moved away from their original coordinates",
        renormalized,
        projected.len(),
        input
    );

    let rows = projected.into_iter().map(|(row, _)| row).collect();
    Ok(Table::new(projection.schema(), rows))
}

///
/// Read an annotated VCF, project it and publish the table.
///
pub fn project(input: &Path, output: &Path, options: &ProjectOptions) -> Result<ProjectReport> {
    let source = input.display().to_string();
    let vcf = VcfFile::read(input)?;

    let table = project_vcf(&vcf, options, &source)?;
    table.write_tsv(output)?;

    info!(
        "Projected {} records x {} fields from {} into {}",
        table.len(),
        table.schema.len(),
        source,
        output.display()
    );

    Ok(ProjectReport {
        input: source,
        output: output.display().to_string(),
        records: table.len(),
        columns: table.schema.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::fs;

    use pretty_assertions::assert_eq;
    use rstest::*;

    const HEADER: &str = "##fileformat=VCFv4.2
##INFO=<ID=DP,Number=1,Type=Integer,Description=\"Depth\">
##INFO=<ID=ANN,Number=.,Type=String,Description=\"SnpEff\">
##INFO=<ID=AVINPUTCHR,Number=1,Type=String,Description=\"c\">
##INFO=<ID=AVINPUTSTART,Number=1,Type=String,Description=\"s\">
##INFO=<ID=AVINPUTEND,Number=1,Type=String,Description=\"e\">
##INFO=<ID=AVINPUTREF,Number=1,Type=String,Description=\"r\">
##INFO=<ID=AVINPUTALT,Number=1,Type=String,Description=\"a\">
#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO
";

    fn write_vcf(dir: &Path, records: &[&str]) -> std::path::PathBuf {
        let path = dir.join("in.vcf");
        let mut content = HEADER.to_string();
        for r in records {
            content.push_str(r);
            content.push('\n');
        }
        fs::write(&path, content).unwrap();
        path
    }

    fn options(fields: &[&str]) -> ProjectOptions {
        ProjectOptions {
            fields: fields.iter().map(|s| s.to_string()).collect(),
            naming: ChromNaming::Prefixed,
        }
    }

    #[rstest]
    fn test_projection_leads_with_original_key() {
        let dir = tempfile::tempdir().unwrap();
        // a split multi-allelic record: POS/REF/ALT differ from the original input
        let path = write_vcf(
            dir.path(),
            &["chr1\t12344\t.\tTA\tT\t.\tPASS\tDP=12;ANN=T|frameshift_variant|HIGH|GENE1|||||||||||;AVINPUTCHR=1;AVINPUTSTART=12345;AVINPUTEND=12345;AVINPUTREF=A;AVINPUTALT=-"],
        );
        let vcf = VcfFile::read(&path).unwrap();

        let table = project_vcf(
            &vcf,
            &options(&["CHROM", "POS", "ANN[0].GENE", "ANN[0].IMPACT", "DP", "AVINPUTSTART"]),
            "in.vcf",
        )
        .unwrap();

        assert_eq!(
            table.schema.fields(),
            &["Chr", "Start", "End", "Ref", "Alt", "ANN[0].GENE", "ANN[0].IMPACT", "DP"]
        );
        assert_eq!(
            table.rows[0],
            vec!["chr1", "12345", "12345", "A", "-", "GENE1", "HIGH", "12"]
        );
    }

    #[rstest]
    fn test_track_pairs_normalized_and_original_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_vcf(
            dir.path(),
            &[
                "chr1\t12344\t.\tTA\tT\t.\tPASS\tAVINPUTCHR=1;AVINPUTSTART=12345;AVINPUTEND=12345;AVINPUTREF=A;AVINPUTALT=-",
                "chr2\t7\t.\tC\tT\t.\tPASS\tAVINPUTCHR=2;AVINPUTSTART=7;AVINPUTEND=7;AVINPUTREF=C;AVINPUTALT=T",
            ],
        );
        let vcf = VcfFile::read(&path).unwrap();
        let projection = Projection::new(&vcf, &options(&["DP"]), "in.vcf").unwrap();

        let split = projection.track(&vcf.records[0], "in.vcf").unwrap();
        assert_eq!(split.normalized.to_string(), "chr1:12344:TA>T");
        assert_eq!(split.original.to_string(), "chr1:12345-12345:A>-");
        assert!(split.is_renormalized());

        let untouched = projection.track(&vcf.records[1], "in.vcf").unwrap();
        assert!(!untouched.is_renormalized());
        assert_eq!(
            projection.row(&untouched, &vcf.records[1]),
            vec!["chr2", "7", "7", "C", "T", ""]
        );
    }

    #[rstest]
    fn test_rows_are_rectangular_and_in_input_order() {
        let dir = tempfile::tempdir().unwrap();
        let records: Vec<String> = (1..=20)
            .map(|i| {
                format!(
                    "chr2\t{i}\t.\tC\tT\t.\tPASS\t{}AVINPUTCHR=2;AVINPUTSTART={i};AVINPUTEND={i};AVINPUTREF=C;AVINPUTALT=T",
                    if i % 2 == 0 { "DP=5;" } else { "" }
                )
            })
            .collect();
        let refs: Vec<&str> = records.iter().map(String::as_str).collect();
        let path = write_vcf(dir.path(), &refs);
        let vcf = VcfFile::read(&path).unwrap();

        let table = project_vcf(&vcf, &options(&["DP", "ANN[0].GENE"]), "in.vcf").unwrap();

        assert_eq!(table.len(), 20);
        assert!(table.is_rectangular());
        let starts: Vec<&str> = table.rows.iter().map(|r| r[1].as_str()).collect();
        let expected: Vec<String> = (1..=20).map(|i| i.to_string()).collect();
        assert_eq!(starts, expected);
        assert_eq!(table.rows[0][5], "");
        assert_eq!(table.rows[1][5], "5");
    }

    #[rstest]
    fn test_unknown_field_fails_before_output() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_vcf(
            dir.path(),
            &["chr1\t1\t.\tA\tG\t.\tPASS\tAVINPUTCHR=1;AVINPUTSTART=1;AVINPUTEND=1;AVINPUTREF=A;AVINPUTALT=G"],
        );
        let output = dir.path().join("out.tsv");

        let result = project(&path, &output, &options(&["DP", "CLNSIG"]));

        assert!(matches!(result, Err(VarconError::SchemaMismatch { .. })));
        assert!(!output.exists());
    }

    #[rstest]
    fn test_missing_original_coordinates_is_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_vcf(dir.path(), &["chr1\t1\t.\tA\tG\t.\tPASS\tDP=3"]);
        let vcf = VcfFile::read(&path).unwrap();

        let result = project_vcf(&vcf, &options(&["DP"]), "in.vcf");
        assert!(matches!(result, Err(VarconError::MalformedRow { .. })));
    }
}
