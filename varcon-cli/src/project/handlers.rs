use std::path::Path;

use anyhow::{Context, Result};
use clap::ArgMatches;

use varcon::core::models::ChromNaming;
use varcon::reconcile::{ProjectOptions, project};

use crate::report::log_report;

pub fn run_project(matches: &ArgMatches) -> Result<()> {
    let vcf = matches
        .get_one::<String>("vcf")
        .context("--vcf is required")?;
    let output = matches
        .get_one::<String>("output")
        .context("--output is required")?;

    let mut options = ProjectOptions::default();
    if let Some(fields) = matches.get_many::<String>("fields") {
        options.fields = fields.cloned().collect();
    }
    if let Some(naming) = matches.get_one::<String>("naming") {
        options.naming = naming.parse::<ChromNaming>()?;
    }

    let report = project(Path::new(vcf), Path::new(output), &options)
        .with_context(|| format!("Failed to project fields from {}", vcf))?;
    log_report(super::cli::PROJECT_CMD, &report)
}
