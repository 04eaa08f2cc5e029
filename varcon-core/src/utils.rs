use std::ffi::OsStr;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::{Path, PathBuf};

use flate2::read::MultiGzDecoder;

///
/// Get a reader for either a gzip'd or non-gzip'd file.
///
/// # Arguments
///
/// - path: path to the file to read
///
pub fn get_dynamic_reader(path: &Path) -> io::Result<BufReader<Box<dyn Read>>> {
    let is_gzipped = path.extension() == Some(OsStr::new("gz"))
        || path.extension() == Some(OsStr::new("bgz"));
    let file = File::open(path).map_err(|e| {
        io::Error::new(e.kind(), format!("Failed to open file {}: {}", path.display(), e))
    })?;
    let file: Box<dyn Read> = match is_gzipped {
        true => Box::new(MultiGzDecoder::new(file)),
        false => Box::new(file),
    };

    Ok(BufReader::with_capacity(256 * 1024, file))
}

///
/// Read a one-entry-per-line list file (gene symbols, sample names).
/// Blank lines and lines starting with `#` are skipped.
///
pub fn read_list_file<P: AsRef<Path>>(file_path: P) -> io::Result<Vec<String>> {
    let reader = get_dynamic_reader(file_path.as_ref())?;

    let mut entries = Vec::new();
    for line in reader.lines() {
        let line = line?;
        let entry = line.trim();
        if entry.is_empty() || entry.starts_with('#') {
            continue;
        }
        entries.push(entry.to_string());
    }

    Ok(entries)
}

///
/// File name with every extension removed: `S1.merged.tsv.gz` -> `S1`.
///
pub fn remove_all_extensions(path: &Path) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    match name.split_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem.to_string(),
        _ => name,
    }
}

///
/// Sibling path sharing the input's directory and last-extension-stripped stem.
///
/// `out/S1.prioritized.tsv` with suffix `summary.txt` -> `out/S1.prioritized.summary.txt`
///
pub fn sibling_with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    if path.extension() == Some(OsStr::new("gz")) {
        if let Some(inner) = Path::new(&stem).file_stem() {
            stem = inner.to_string_lossy().to_string();
        }
    }
    path.with_file_name(format!("{}.{}", stem, suffix))
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Write;

    use pretty_assertions::assert_eq;
    use rstest::*;

    #[rstest]
    #[case("S1.merged.tsv.gz", "S1")]
    #[case("/data/S1.tsv", "S1")]
    #[case("noext", "noext")]
    fn test_remove_all_extensions(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(remove_all_extensions(Path::new(input)), expected);
    }

    #[rstest]
    #[case("out/S1.prioritized.tsv", "out/S1.prioritized.summary.txt")]
    #[case("out/S1.prioritized.tsv.gz", "out/S1.prioritized.summary.txt")]
    #[case("S1.json", "S1.summary.txt")]
    fn test_sibling_with_suffix(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(
            sibling_with_suffix(Path::new(input), "summary.txt"),
            PathBuf::from(expected)
        );
    }

    #[rstest]
    fn test_read_list_file_skips_comments() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("genes.txt");
        let mut f = File::create(&path).unwrap();
        writeln!(f, "# panel v2").unwrap();
        writeln!(f, "BRCA1").unwrap();
        writeln!(f).unwrap();
        writeln!(f, "  TP53  ").unwrap();

        let genes = read_list_file(&path).unwrap();
        assert_eq!(genes, vec!["BRCA1", "TP53"]);
    }

    #[rstest]
    fn test_missing_file_reports_path() {
        let err = get_dynamic_reader(Path::new("/nonexistent/table.tsv")).err().unwrap();
        assert!(err.to_string().contains("/nonexistent/table.tsv"));
    }
}
