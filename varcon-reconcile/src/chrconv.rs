use std::path::Path;

use log::info;
use serde::Serialize;

use varcon_core::errors::Result;
use varcon_core::models::{ChromNaming, RaggedRows, Table};
use varcon_io::TableWrite;

#[derive(Debug, Clone, Serialize)]
pub struct ChrConvReport {
    pub input: String,
    pub output: String,
    pub rows: usize,
    pub rewritten: usize,
}

///
/// Rewrite the chromosome column (the first column) of a classifier table to
/// the given naming convention. Returns the number of rewritten rows.
///
pub fn convert_chromosomes(table: &mut Table, naming: ChromNaming) -> usize {
    let mut rewritten = 0;
    for row in table.rows.iter_mut() {
        if let Some(chrom) = row.first_mut() {
            let normalized = naming.normalize(chrom).into_owned();
            if normalized != *chrom {
                *chrom = normalized;
                rewritten += 1;
            }
        }
    }
    rewritten
}

///
/// Convert a classifier table's contig names and publish the result. The
/// header line is kept as is; rows of any width pass through.
///
pub fn chrconv(input: &Path, output: &Path, naming: ChromNaming) -> Result<ChrConvReport> {
    let mut table = Table::read(input, RaggedRows::Keep)?;
    let rewritten = convert_chromosomes(&mut table, naming);
    table.write_tsv(output)?;

    info!(
        "Converted {} of {} chromosome names to {} naming: {} -> {}",
        rewritten,
        table.len(),
        naming,
        input.display(),
        output.display()
    );

    Ok(ChrConvReport {
        input: input.display().to_string(),
        output: output.display().to_string(),
        rows: table.len(),
        rewritten,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::fs;

    use pretty_assertions::assert_eq;
    use rstest::*;

    const INTERVAR: &str = "#Chr\tStart\tEnd\tRef\tAlt\tRef.Gene\n1\t100\t100\tA\tG\tGENE1\nchrX\t5\t5\tC\tT\tGENE2\nMT\t7\t7\tG\tA\tMT-CO1\nGL000220.1\t9\t9\tA\tC\t.\n";

    #[rstest]
    fn test_chrconv_to_prefixed() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("S1.intervar");
        fs::write(&input, INTERVAR).unwrap();
        let output = dir.path().join("S1.chr.intervar");

        let report = chrconv(&input, &output, ChromNaming::Prefixed).unwrap();
        assert_eq!(report.rows, 4);
        assert_eq!(report.rewritten, 2);

        let content = fs::read_to_string(&output).unwrap();
        let chroms: Vec<&str> = content
            .lines()
            .map(|l| l.split('\t').next().unwrap())
            .collect();
        assert_eq!(chroms, vec!["#Chr", "chr1", "chrX", "chrM", "GL000220.1"]);
    }

    #[rstest]
    fn test_chrconv_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.tsv");
        fs::write(&input, INTERVAR).unwrap();
        let once = dir.path().join("once.tsv");
        let twice = dir.path().join("twice.tsv");

        chrconv(&input, &once, ChromNaming::Prefixed).unwrap();
        let report = chrconv(&once, &twice, ChromNaming::Prefixed).unwrap();

        assert_eq!(report.rewritten, 0);
        assert_eq!(
            fs::read_to_string(&once).unwrap(),
            fs::read_to_string(&twice).unwrap()
        );
    }
}
