//! Coordinate Reconciler.
//!
//! Input is an avinput table that still carries the VCF line each row was
//! converted from: `chr start end ref alt [extra...] CHROM POS ID REF ALT QUAL FILTER INFO [FORMAT SAMPLES...]`.
//! Output is that VCF block, with the leading avinput coordinates stored as
//! INFO keys so they survive any later splitting or realignment.

use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use log::{debug, info};
use serde::Serialize;

use varcon_core::errors::{Result, VarconError};
use varcon_core::utils::get_dynamic_reader;
use varcon_io::publish;

use crate::consts::{AVINPUT_FIELDS, AVINPUT_WIDTH};
use crate::encoding::encode_info_value;
use crate::vcf::{MANDATORY_WIDTH, VcfHeader, VcfRecord};

#[derive(Debug, Clone, Default)]
pub struct ReconcileOptions {
    /// Column where the VCF block starts; detected per row when absent.
    pub vcf_offset: Option<usize>,
    /// File providing the VCF meta header; a minimal header is emitted when absent.
    pub vcf_header: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconcileReport {
    pub input: String,
    pub output: String,
    pub records: usize,
}

fn is_allele(value: &str) -> bool {
    !value.is_empty()
        && value.bytes().all(|b| {
            matches!(
                b.to_ascii_uppercase(),
                b'A' | b'C' | b'G' | b'T' | b'N' | b'*' | b'.' | b','
            )
        })
}

fn is_symbolic_or_allele(value: &str) -> bool {
    is_allele(value)
        || (value.starts_with('<') && value.ends_with('>'))
        || value.contains(['[', ']'])
}

///
/// Find where the VCF block starts in an avinput row: the first column at or
/// after the avinput key whose POS is an integer, whose REF/ALT look like
/// alleles and which leaves room for the mandatory VCF columns.
///
pub fn detect_vcf_offset(fields: &[&str]) -> Option<usize> {
    (AVINPUT_WIDTH..fields.len())
        .take_while(|i| fields.len() - i >= MANDATORY_WIDTH)
        .find(|&i| {
            fields[i + 1].parse::<u64>().is_ok()
                && is_allele(fields[i + 3])
                && is_symbolic_or_allele(fields[i + 4])
        })
}

///
/// Turn one avinput row into its VCF record, with the original coordinates
/// attached as INFO keys.
///
/// # Arguments
/// - fields: the tab-split avinput row
/// - offset: explicit VCF block offset, detected when `None`
/// - line: 1-based source line, for error messages
/// - input: source name, for error messages
///
pub fn reconcile_row(
    fields: &[&str],
    offset: Option<usize>,
    line: usize,
    input: &str,
) -> Result<VcfRecord> {
    let malformed = |reason: String| VarconError::MalformedRow {
        input: input.to_string(),
        line,
        reason,
    };

    let offset = match offset {
        Some(o) if o >= AVINPUT_WIDTH && o < fields.len() => o,
        Some(o) => {
            return Err(malformed(format!(
                "VCF offset {} is outside the row's {} columns",
                o,
                fields.len()
            )));
        }
        None => detect_vcf_offset(fields)
            .ok_or_else(|| malformed("no VCF block found after the avinput columns".to_string()))?,
    };

    let vcf_fields: Vec<String> = fields[offset..].iter().map(|s| s.to_string()).collect();
    let mut record = VcfRecord::from_fields(vcf_fields, line, input)?;

    for (i, (key, _)) in AVINPUT_FIELDS.iter().enumerate() {
        record.set_info(key, &encode_info_value(fields[i].trim()));
    }

    Ok(record)
}

///
/// Run the reconciler over an avinput file and publish the augmented VCF.
///
/// # Arguments
/// - input: avinput-with-VCF-info table (plain or gzipped)
/// - output: destination VCF
/// - options: offset and header source
///
pub fn reconcile(input: &Path, output: &Path, options: &ReconcileOptions) -> Result<ReconcileReport> {
    let source = input.display().to_string();
    let reader = get_dynamic_reader(input)?;

    let mut records = Vec::new();
    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim_end_matches('\r');
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let fields: Vec<&str> = line.split('\t').collect();
        records.push(reconcile_row(&fields, options.vcf_offset, i + 1, &source)?);
    }

    if records.is_empty() {
        return Err(VarconError::EmptyInput(source));
    }

    let mut header = match &options.vcf_header {
        Some(path) => VcfHeader::read(path)?,
        None => {
            let n_samples = records.iter().map(VcfRecord::n_samples).max().unwrap_or(0);
            debug!("No VCF header supplied, emitting a minimal header with {} samples", n_samples);
            VcfHeader::minimal(n_samples)
        }
    };
    for (key, description) in AVINPUT_FIELDS {
        header.declare_info(key, description);
    }

    publish(output, |w| {
        for line in header.lines() {
            writeln!(w, "{}", line)?;
        }
        for record in &records {
            writeln!(w, "{}", record.to_line())?;
        }
        Ok(())
    })?;

    info!("Reconciled {} records from {} into {}", records.len(), source, output.display());

    Ok(ReconcileReport {
        input: source,
        output: output.display().to_string(),
        records: records.len(),
    })
}
