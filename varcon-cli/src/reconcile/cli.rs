use clap::{Arg, Command, arg};

pub const RECONCILE_CMD: &str = "reconcile";

pub fn create_reconcile_cli() -> Command {
    Command::new(RECONCILE_CMD)
        .about("Attach original-input coordinates to every record of an avinput table with included VCF lines, as AVINPUT* INFO keys.")
        .arg(
            arg!(--avinput <AVINPUT>)
                .required(true)
                .help("Path to the avinput table (plain or gzipped)"),
        )
        .arg(
            Arg::new("vcf-header")
                .long("vcf-header")
                .required(false)
                .help("VCF whose meta header and #CHROM line are reused; a minimal header is written when absent"),
        )
        .arg(
            Arg::new("vcf-offset")
                .long("vcf-offset")
                .required(false)
                .value_parser(clap::value_parser!(usize))
                .help("Column index where the VCF block starts; detected per row when absent"),
        )
        .arg(
            arg!(--output <OUTPUT>)
                .required(true)
                .help("Output VCF path; `.gz` output is gzip-compressed"),
        )
}
