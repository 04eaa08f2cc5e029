use std::path::Path;

use anyhow::{Context, Result};
use clap::ArgMatches;

use varcon::core::models::ChromNaming;
use varcon::reconcile::chrconv;

use crate::report::log_report;

pub fn run_chrconv(matches: &ArgMatches) -> Result<()> {
    let input = matches
        .get_one::<String>("input")
        .context("--input is required")?;
    let output = matches
        .get_one::<String>("output")
        .context("--output is required")?;
    let naming: ChromNaming = matches
        .get_one::<String>("naming")
        .map(|s| s.parse())
        .transpose()?
        .unwrap_or_default();

    let report = chrconv(Path::new(input), Path::new(output), naming)
        .with_context(|| format!("Failed to convert chromosome names in {}", input))?;
    log_report(super::cli::CHRCONV_CMD, &report)
}
