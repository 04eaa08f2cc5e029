use std::io::BufRead;
use std::path::{Path, PathBuf};

use crate::errors::{Result, VarconError};
use crate::models::schema::Schema;
use crate::utils::get_dynamic_reader;

/// One data line of a table, one value per schema field.
pub type Row = Vec<String>;

///
/// Whether rows whose width differs from the header are rejected while reading
/// or kept for the caller to route.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RaggedRows {
    Reject,
    Keep,
}

///
/// Table struct, the in-memory representation of one tab-delimited stage
/// artifact: a header line followed by data lines.
///
#[derive(Clone, Debug)]
pub struct Table {
    pub schema: Schema,
    pub rows: Vec<Row>,
    pub path: Option<PathBuf>,
}

impl Table {
    pub fn new(schema: Schema, rows: Vec<Row>) -> Self {
        Table {
            schema,
            rows,
            path: None,
        }
    }

    ///
    /// Read a table from disk (plain or gzipped).
    ///
    /// # Arguments
    /// - path: path to the table
    /// - ragged: policy for rows whose field count differs from the header
    ///
    pub fn read(path: &Path, ragged: RaggedRows) -> Result<Self> {
        let reader = get_dynamic_reader(path)?;

        let mut schema: Option<Schema> = None;
        let mut rows: Vec<Row> = Vec::new();

        for (i, line) in reader.lines().enumerate() {
            let line = line?;
            let line = line.trim_end_matches('\r');
            if line.is_empty() {
                continue;
            }

            let width = match schema.as_ref() {
                Some(header) => header.len(),
                None => {
                    schema = Some(Schema::from_header_line(line));
                    continue;
                }
            };

            let row: Row = line.split('\t').map(|s| s.to_string()).collect();
            if ragged == RaggedRows::Reject && row.len() != width {
                return Err(VarconError::MalformedRow {
                    input: path.display().to_string(),
                    line: i + 1,
                    reason: format!("expected {} fields, found {}", width, row.len()),
                });
            }
            rows.push(row);
        }

        let schema = schema.ok_or_else(|| VarconError::EmptyInput(path.display().to_string()))?;

        Ok(Table {
            schema,
            rows,
            path: Some(path.to_owned()),
        })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    ///
    /// Name of the input this table came from, for error messages and logs.
    ///
    pub fn source_name(&self) -> String {
        match &self.path {
            Some(p) => p.display().to_string(),
            None => "<memory>".to_string(),
        }
    }

    ///
    /// Look up a field this stage cannot run without.
    ///
    pub fn require(&self, name: &str, stage: &'static str) -> Result<usize> {
        self.schema.require(name, stage, &self.source_name())
    }

    ///
    /// Value of a column in a row, empty if the row is short.
    ///
    pub fn value<'a>(&self, row: &'a Row, column: usize) -> &'a str {
        row.get(column).map(String::as_str).unwrap_or("")
    }

    ///
    /// Check that every row has exactly one value per schema field.
    ///
    pub fn is_rectangular(&self) -> bool {
        self.rows.iter().all(|r| r.len() == self.schema.len())
    }
}

impl TryFrom<&Path> for Table {
    type Error = VarconError;

    ///
    /// Read a table, rejecting ragged rows.
    ///
    fn try_from(value: &Path) -> Result<Self> {
        Table::read(value, RaggedRows::Reject)
    }
}

impl TryFrom<&str> for Table {
    type Error = VarconError;

    fn try_from(value: &str) -> Result<Self> {
        Table::try_from(Path::new(value))
    }
}

impl TryFrom<PathBuf> for Table {
    type Error = VarconError;

    fn try_from(value: PathBuf) -> Result<Self> {
        Table::try_from(value.as_path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::fs::File;
    use std::io::Write;

    use flate2::Compression;
    use flate2::write::GzEncoder;
    use pretty_assertions::assert_eq;
    use rstest::*;

    fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        let mut file = File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[rstest]
    fn test_read_plain_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            dir.path(),
            "table.tsv",
            "#Chr\tStart\tEnd\tRef\tAlt\n1\t100\t100\tA\tG\n\n2\t200\t200\tC\tT\n",
        );

        let table = Table::try_from(path.as_path()).unwrap();
        assert_eq!(table.schema.len(), 5);
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows[1], vec!["2", "200", "200", "C", "T"]);
        assert!(table.is_rectangular());
    }

    #[rstest]
    fn test_read_gzipped_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("table.tsv.gz");
        let mut encoder = GzEncoder::new(File::create(&path).unwrap(), Compression::default());
        encoder.write_all(b"a\tb\n1\t2\n").unwrap();
        encoder.finish().unwrap();

        let table = Table::try_from(path.as_path()).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.rows[0], vec!["1", "2"]);
    }

    #[rstest]
    fn test_trailing_empty_fields_are_kept() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "t.tsv", "a\tb\tc\n1\t\t\n");
        let table = Table::try_from(path.as_path()).unwrap();
        assert_eq!(table.rows[0], vec!["1", "", ""]);
    }

    #[rstest]
    fn test_ragged_rows_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "t.tsv", "a\tb\tc\n1\t2\n");
        let result = Table::read(&path, RaggedRows::Reject);
        assert!(matches!(result, Err(VarconError::MalformedRow { line: 2, .. })));
    }

    #[rstest]
    fn test_ragged_rows_kept() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "t.tsv", "a\tb\tc\n1\t2\n");
        let table = Table::read(&path, RaggedRows::Keep).unwrap();
        assert_eq!(table.len(), 1);
        assert!(!table.is_rectangular());
    }

    #[rstest]
    fn test_empty_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "empty.tsv", "");
        assert!(matches!(
            Table::try_from(path.as_path()),
            Err(VarconError::EmptyInput(_))
        ));
    }
}
