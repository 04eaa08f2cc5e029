use clap::{Command, arg};

pub const PIPELINE_CMD: &str = "pipeline";

pub fn create_pipeline_cli() -> Command {
    Command::new(PIPELINE_CMD)
        .about("Run project, merge, acmg, prioritize and vus for every sample of a TOML run configuration.")
        .arg(
            arg!(--config <CONFIG>)
                .required(true)
                .help("Pipeline configuration (output_dir, chrom_naming, [prioritize], [[samples]])"),
        )
        .arg(
            arg!(--threads <THREADS>)
                .required(false)
                .value_parser(clap::value_parser!(usize))
                .help("Number of samples processed in parallel (default: all cores)"),
        )
}
