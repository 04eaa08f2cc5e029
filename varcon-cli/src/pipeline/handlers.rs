use std::path::Path;

use anyhow::{Context, Result, bail};
use clap::ArgMatches;
use indicatif::{ProgressBar, ProgressStyle};
use log::info;

use varcon::pipeline::{PipelineConfig, run_pipeline as run_samples};

pub fn run_pipeline(matches: &ArgMatches) -> Result<()> {
    let config_path = matches
        .get_one::<String>("config")
        .context("--config is required")?;

    let config = PipelineConfig::try_from(Path::new(config_path))
        .with_context(|| format!("Failed to load pipeline config {}", config_path))?;

    let pb = if matches.get_flag("quiet") {
        ProgressBar::hidden()
    } else {
        ProgressBar::new(config.samples.len() as u64)
    };
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")?,
    );
    pb.set_message("samples");

    let run = || {
        run_samples(&config, |outcome| {
            pb.set_message(outcome.sample.clone());
            pb.inc(1);
        })
    };

    let report = match matches.get_one::<usize>("threads") {
        Some(threads) => rayon_pool(*threads)?.install(run),
        None => run(),
    }
    .context("Pipeline run failed")?;
    pb.finish_and_clear();

    info!("Run report written to {}", report.report_path().display());
    if report.failed > 0 {
        let failed: Vec<&str> = report
            .samples
            .iter()
            .filter(|s| s.is_failed())
            .map(|s| s.sample.as_str())
            .collect();
        bail!(
            "{} of {} samples failed: {}",
            report.failed,
            report.samples.len(),
            failed.join(", ")
        );
    }

    Ok(())
}

fn rayon_pool(threads: usize) -> Result<rayon::ThreadPool> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build()
        .context("Failed to build the sample thread pool")
}
