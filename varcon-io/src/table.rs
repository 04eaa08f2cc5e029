use std::path::Path;

use serde::Serialize;
use serde::ser::{SerializeMap, SerializeSeq, Serializer};

use varcon_core::models::{Row, Schema, Table};

use crate::atomic::publish;
use crate::error::Result;

///
/// Publish a header plus rows as a tab-delimited table.
///
/// # Arguments
/// - path: destination, gzip-compressed when it ends in `.gz`
/// - schema: header fields
/// - rows: data rows, written in iteration order
///
pub fn publish_tsv<'a, P, I>(path: P, schema: &Schema, rows: I) -> Result<()>
where
    P: AsRef<Path>,
    I: IntoIterator<Item = &'a Row>,
{
    publish(path, |w| {
        writeln!(w, "{}", schema.header_line())?;
        for row in rows {
            writeln!(w, "{}", row.join("\t"))?;
        }
        Ok(())
    })
}

///
/// One row viewed as a `{column: value}` map, serialized in schema order.
///
/// Values of integer columns that parse as integers are written as numbers,
/// everything else as strings.
///
pub struct RecordView<'a> {
    pub schema: &'a Schema,
    pub row: &'a Row,
    pub integer_columns: &'a [usize],
}

impl Serialize for RecordView<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.schema.len()))?;
        for (i, name) in self.schema.fields().iter().enumerate() {
            let value = self.row.get(i).map(String::as_str).unwrap_or("");
            match value.parse::<i64>() {
                Ok(n) if self.integer_columns.contains(&i) => map.serialize_entry(name, &n)?,
                _ => map.serialize_entry(name, value)?,
            }
        }
        map.end()
    }
}

///
/// A sequence of rows sharing one schema, serialized as a list of records.
///
pub struct RecordsView<'a> {
    pub schema: &'a Schema,
    pub rows: &'a [Row],
    pub integer_columns: Vec<usize>,
}

impl<'a> RecordsView<'a> {
    pub fn new(schema: &'a Schema, rows: &'a [Row]) -> Self {
        RecordsView {
            schema,
            rows,
            integer_columns: Vec::new(),
        }
    }

    ///
    /// Serialize a column as integers. Unknown column names are ignored.
    ///
    pub fn with_integer_column(mut self, name: &str) -> Self {
        if let Some(i) = self.schema.position(name) {
            self.integer_columns.push(i);
        }
        self
    }
}

impl Serialize for RecordsView<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.rows.len()))?;
        for row in self.rows {
            seq.serialize_element(&RecordView {
                schema: self.schema,
                row,
                integer_columns: &self.integer_columns,
            })?;
        }
        seq.end()
    }
}

pub trait TableWrite {
    ///
    /// Write the table to disk as a tab-delimited file.
    ///
    /// # Arguments
    /// - path: the path to the file to dump to; `.gz` paths are compressed
    fn write_tsv<T: AsRef<Path>>(&self, path: T) -> Result<()>;
}

impl TableWrite for Table {
    fn write_tsv<T: AsRef<Path>>(&self, path: T) -> Result<()> {
        publish_tsv(path, &self.schema, &self.rows)
    }
}
