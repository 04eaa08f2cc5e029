use clap::{Command, arg};

pub const CHRCONV_CMD: &str = "chrconv";

pub fn create_chrconv_cli() -> Command {
    Command::new(CHRCONV_CMD)
        .about("Rewrite the chromosome column of a classifier table to one contig naming convention.")
        .arg(
            arg!(--input <INPUT>)
                .required(true)
                .help("Classifier table"),
        )
        .arg(
            arg!(--output <OUTPUT>)
                .required(true)
                .help("Output table path"),
        )
        .arg(
            arg!(--naming <NAMING>)
                .required(false)
                .default_value("prefixed")
                .help("Contig naming: prefixed (chr1, chrM) or bare (1, MT)"),
        )
}
