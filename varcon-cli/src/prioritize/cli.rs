use clap::{Arg, ArgAction, Command, arg};

pub const PRIORITIZE_CMD: &str = "prioritize";

pub fn create_prioritize_cli() -> Command {
    Command::new(PRIORITIZE_CMD)
        .about("Order merged records by ACMG severity and functional impact and keep the top N.")
        .arg(
            arg!(--input <INPUT>)
                .required(true)
                .help("Table written by `varcon acmg`"),
        )
        .arg(
            arg!(--output <OUTPUT>)
                .required(true)
                .help("Ranked output path; a <stem>.summary.txt is written next to it"),
        )
        .arg(
            arg!(-n --top <N>)
                .required(false)
                .value_parser(clap::value_parser!(usize))
                .help("Number of records to report; 0 reports all"),
        )
        .arg(
            arg!(--format <FORMAT>)
                .required(false)
                .help("Output format: tsv, json or yaml"),
        )
        .arg(
            arg!(--config <CONFIG>)
                .required(false)
                .help("TOML ranker configuration; command line flags take precedence"),
        )
        .arg(
            Arg::new("exclude-benign")
                .long("exclude-benign")
                .action(ArgAction::SetTrue)
                .help("Drop Benign records (Likely Benign records are kept)"),
        )
        .arg(
            Arg::new("max-af")
                .long("max-af")
                .required(false)
                .value_parser(clap::value_parser!(f64))
                .help("Drop records whose population allele frequency is above this value"),
        )
        .arg(
            Arg::new("min-cadd")
                .long("min-cadd")
                .required(false)
                .value_parser(clap::value_parser!(f64))
                .help("Drop records whose CADD phred score is below this value"),
        )
        .arg(
            arg!(-g --genes <GENES>)
                .required(false)
                .help("Gene list file, one symbol per line; only listed genes are kept"),
        )
}
