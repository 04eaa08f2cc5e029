use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::ArgMatches;

use varcon::core::models::ChromNaming;
use varcon::merge::{Discriminator, MergeOptions, MergeOutputs, merge};

use crate::report::log_report;

pub fn run_merge(matches: &ArgMatches) -> Result<()> {
    let classifier = matches
        .get_one::<String>("classifier")
        .context("--classifier is required")?;
    let vcf_table = matches
        .get_one::<String>("vcf-table")
        .context("--vcf-table is required")?;
    let output = matches
        .get_one::<String>("output")
        .context("--output is required")?;

    let mut outputs = MergeOutputs::beside(Path::new(output));
    if let Some(path) = matches.get_one::<String>("unmatched-classifier") {
        outputs.unmatched_classifier = PathBuf::from(path);
    }
    if let Some(path) = matches.get_one::<String>("unmatched-vcf") {
        outputs.unmatched_vcf = PathBuf::from(path);
    }

    let options = MergeOptions {
        naming: match matches.get_one::<String>("naming") {
            Some(naming) => naming.parse::<ChromNaming>()?,
            None => ChromNaming::default(),
        },
        discriminator: matches
            .get_one::<String>("discriminator")
            .map(|d| d.parse::<Discriminator>())
            .transpose()?,
    };

    let report = merge(
        Path::new(classifier),
        Path::new(vcf_table),
        &outputs,
        &options,
    )
    .with_context(|| format!("Failed to merge {} with {}", classifier, vcf_table))?;
    log_report(super::cli::MERGE_CMD, &report)
}
