use std::path::Path;

use anyhow::{Context, Result};
use clap::ArgMatches;

use varcon::acmg::vus;

use crate::report::log_report;

pub fn run_vus(matches: &ArgMatches) -> Result<()> {
    let input = matches
        .get_one::<String>("input")
        .context("--input is required")?;
    let output = matches
        .get_one::<String>("output")
        .context("--output is required")?;

    let report = vus(Path::new(input), Path::new(output))
        .with_context(|| format!("Failed to sub-classify VUS records in {}", input))?;
    log_report(super::cli::VUS_CMD, &report)
}
