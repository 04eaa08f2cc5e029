use std::path::Path;

use anyhow::{Context, Result};
use clap::ArgMatches;

use varcon::acmg::{SplitOptions, split};

use crate::report::log_report;

pub fn run_acmg(matches: &ArgMatches) -> Result<()> {
    let input = matches
        .get_one::<String>("input")
        .context("--input is required")?;
    let output = matches
        .get_one::<String>("output")
        .context("--output is required")?;

    let options = SplitOptions {
        column: matches.get_one::<String>("column").cloned(),
    };

    let report = split(Path::new(input), Path::new(output), &options)
        .with_context(|| format!("Failed to split ACMG classifications in {}", input))?;
    log_report(super::cli::ACMG_CMD, &report)
}
