use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::ArgMatches;

use varcon::io::OutputFormat;
use varcon::prio::{PrioritizeConfig, prioritize};

use crate::report::log_report;

///
/// Build the ranker configuration: the TOML file if one is given, with
/// command line flags layered on top.
///
pub fn config_from_matches(matches: &ArgMatches) -> Result<PrioritizeConfig> {
    let mut config = match matches.get_one::<String>("config") {
        Some(path) => PrioritizeConfig::try_from(Path::new(path))
            .with_context(|| format!("Failed to load ranker config {}", path))?,
        None => PrioritizeConfig::default(),
    };

    if let Some(top) = matches.get_one::<usize>("top") {
        config.top_n = *top;
    }
    if let Some(format) = matches.get_one::<String>("format") {
        config.format = format.parse::<OutputFormat>()?;
    }
    if matches.get_flag("exclude-benign") {
        config.exclude_benign = true;
    }
    if let Some(af) = matches.get_one::<f64>("max-af") {
        config.max_population_af = Some(*af);
    }
    if let Some(score) = matches.get_one::<f64>("min-cadd") {
        config.min_cadd = Some(*score);
    }
    if let Some(genes) = matches.get_one::<String>("genes") {
        config.genes = Some(PathBuf::from(genes));
    }

    config.validate()?;
    Ok(config)
}

pub fn run_prioritize(matches: &ArgMatches) -> Result<()> {
    let input = matches
        .get_one::<String>("input")
        .context("--input is required")?;
    let output = matches
        .get_one::<String>("output")
        .context("--output is required")?;

    let config = config_from_matches(matches)?;

    let report = prioritize(Path::new(input), Path::new(output), &config)
        .with_context(|| format!("Failed to prioritize {}", input))?;
    log_report(super::cli::PRIORITIZE_CMD, &report)
}
