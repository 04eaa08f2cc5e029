use clap::{Command, arg};

pub const PROJECT_CMD: &str = "project";

pub fn create_project_cli() -> Command {
    Command::new(PROJECT_CMD)
        .about("Flatten an annotated VCF into a table keyed by the original-input coordinates.")
        .arg(
            arg!(--vcf <VCF>)
                .required(true)
                .help("Annotated VCF carrying AVINPUT* INFO keys (plain or gzipped)"),
        )
        .arg(
            arg!(--output <OUTPUT>)
                .required(true)
                .help("Output table path"),
        )
        .arg(
            arg!(--fields <FIELDS>)
                .required(false)
                .value_delimiter(',')
                .help("Comma separated fields to extract, e.g. CHROM,POS,ANN[0].GENE,GEN[0].AD"),
        )
        .arg(
            arg!(--naming <NAMING>)
                .required(false)
                .default_value("prefixed")
                .help("Contig naming of the key column: prefixed or bare"),
        )
}
