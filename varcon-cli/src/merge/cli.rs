use clap::{Arg, Command, arg};

pub const MERGE_CMD: &str = "merge";

pub fn create_merge_cli() -> Command {
    Command::new(MERGE_CMD)
        .about("Join classifier output with projected VCF annotations on the original-input key.")
        .arg(
            arg!(--classifier <CLASSIFIER>)
                .required(true)
                .help("Classifier table (e.g. InterVar output)"),
        )
        .arg(
            Arg::new("vcf-table")
                .long("vcf-table")
                .required(true)
                .help("Table written by `varcon project`"),
        )
        .arg(
            arg!(--output <OUTPUT>)
                .required(true)
                .help("Merged table path"),
        )
        .arg(
            Arg::new("unmatched-classifier")
                .long("unmatched-classifier")
                .required(false)
                .help("Classifier rows without a match (default: <output stem>.unmatched.classifier.tsv)"),
        )
        .arg(
            Arg::new("unmatched-vcf")
                .long("unmatched-vcf")
                .required(false)
                .help("VCF rows without a match (default: <output stem>.unmatched.vcf.tsv)"),
        )
        .arg(
            arg!(--discriminator <PAIR>)
                .required(false)
                .help("CLASSIFIER_COL:VCF_COL pair picking one VCF row when several share a key"),
        )
        .arg(
            arg!(--naming <NAMING>)
                .required(false)
                .default_value("prefixed")
                .help("Contig naming both sides are normalized to before joining"),
        )
}
