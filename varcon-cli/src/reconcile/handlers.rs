use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::ArgMatches;

use varcon::reconcile::{ReconcileOptions, reconcile};

use crate::report::log_report;

pub fn run_reconcile(matches: &ArgMatches) -> Result<()> {
    let avinput = matches
        .get_one::<String>("avinput")
        .context("--avinput is required")?;
    let output = matches
        .get_one::<String>("output")
        .context("--output is required")?;

    let options = ReconcileOptions {
        vcf_offset: matches.get_one::<usize>("vcf-offset").copied(),
        vcf_header: matches.get_one::<String>("vcf-header").map(PathBuf::from),
    };

    let report = reconcile(Path::new(avinput), Path::new(output), &options)
        .with_context(|| format!("Failed to reconcile {}", avinput))?;
    log_report(super::cli::RECONCILE_CMD, &report)
}
