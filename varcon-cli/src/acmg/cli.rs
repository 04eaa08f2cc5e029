use clap::{Command, arg};

pub const ACMG_CMD: &str = "acmg";

pub fn create_acmg_cli() -> Command {
    Command::new(ACMG_CMD)
        .about("Split the ACMG classification column into `category` and `rule_evidence` columns.")
        .arg(
            arg!(--input <INPUT>)
                .required(true)
                .help("Merged table"),
        )
        .arg(
            arg!(--output <OUTPUT>)
                .required(true)
                .help("Output table path"),
        )
        .arg(
            arg!(--column <COLUMN>)
                .required(false)
                .help("Classification column (default: first column naming both InterVar and Evidence)"),
        )
}
