mod acmg;
mod chrconv;
mod merge;
mod pipeline;
mod prioritize;
mod project;
mod reconcile;
mod report;
mod vus;

use anyhow::Result;
use clap::{ArgMatches, Command, arg};

pub mod consts {
    pub const VERSION: &str = env!("CARGO_PKG_VERSION");
    pub const BIN_NAME: &str = "varcon";
    pub const AUTHORS: &str = env!("CARGO_PKG_AUTHORS");
}

fn build_parser() -> Command {
    Command::new(consts::BIN_NAME)
        .bin_name(consts::BIN_NAME)
        .version(consts::VERSION)
        .author(consts::AUTHORS)
        .about("Track variant identity across re-normalizing tools, merge classifier and VCF annotations, and prioritize the result.")
        .subcommand_required(true)
        .arg(
            arg!(-v --verbose "Log debug messages")
                .global(true)
                .conflicts_with("quiet"),
        )
        .arg(arg!(-q --quiet "Only log errors").global(true))
        .subcommand(reconcile::cli::create_reconcile_cli())
        .subcommand(chrconv::cli::create_chrconv_cli())
        .subcommand(project::cli::create_project_cli())
        .subcommand(merge::cli::create_merge_cli())
        .subcommand(acmg::cli::create_acmg_cli())
        .subcommand(prioritize::cli::create_prioritize_cli())
        .subcommand(vus::cli::create_vus_cli())
        .subcommand(pipeline::cli::create_pipeline_cli())
}

fn init_logging(matches: &ArgMatches) {
    let level = if matches.get_flag("verbose") {
        "debug"
    } else if matches.get_flag("quiet") {
        "error"
    } else {
        "info"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_module_path(false)
        .init();
}

fn main() -> Result<()> {
    let app = build_parser();
    let matches = app.get_matches();

    init_logging(&matches);

    match matches.subcommand() {
        //
        // COORDINATE RECONCILER
        //
        Some((reconcile::cli::RECONCILE_CMD, matches)) => {
            reconcile::handlers::run_reconcile(matches)?;
        }

        //
        // CHROMOSOME NAMING ADAPTER
        //
        Some((chrconv::cli::CHRCONV_CMD, matches)) => {
            chrconv::handlers::run_chrconv(matches)?;
        }

        //
        // FIELD PROJECTOR
        //
        Some((project::cli::PROJECT_CMD, matches)) => {
            project::handlers::run_project(matches)?;
        }

        //
        // MERGE/JOIN
        //
        Some((merge::cli::MERGE_CMD, matches)) => {
            merge::handlers::run_merge(matches)?;
        }

        //
        // ACMG SPLITTER
        //
        Some((acmg::cli::ACMG_CMD, matches)) => {
            acmg::handlers::run_acmg(matches)?;
        }

        //
        // PRIORITIZATION RANKER
        //
        Some((prioritize::cli::PRIORITIZE_CMD, matches)) => {
            prioritize::handlers::run_prioritize(matches)?;
        }

        //
        // VUS SUB-CLASSIFIER
        //
        Some((vus::cli::VUS_CMD, matches)) => {
            vus::handlers::run_vus(matches)?;
        }

        //
        // MULTI-SAMPLE PIPELINE
        //
        Some((pipeline::cli::PIPELINE_CMD, matches)) => {
            pipeline::handlers::run_pipeline(matches)?;
        }

        _ => unreachable!("Subcommand not found"),
    };

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parser_is_consistent() {
        build_parser().debug_assert();
    }

    #[test]
    fn test_author_comes_from_manifest() {
        assert_eq!(build_parser().get_author(), Some("The varcon developers"));
    }

    #[test]
    fn test_global_flags_reach_subcommands() {
        let matches = build_parser()
            .try_get_matches_from(["varcon", "vus", "--input", "a.tsv", "--output", "b.tsv", "-q"])
            .unwrap();
        let (_, sub) = matches.subcommand().unwrap();
        assert!(sub.get_flag("quiet"));
    }
}
