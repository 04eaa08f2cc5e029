use clap::{Command, arg};

pub const VUS_CMD: &str = "vus";

pub fn create_vus_cli() -> Command {
    Command::new(VUS_CMD)
        .about("Grade variants of uncertain significance into hot, middle and cold sub-tiers.")
        .arg(
            arg!(--input <INPUT>)
                .required(true)
                .help("Table with `category` and `rule_evidence` columns"),
        )
        .arg(
            arg!(--output <OUTPUT>)
                .required(true)
                .help("Output table path; a <stem>.vus_summary.tsv is written next to it"),
        )
}
