use fxhash::FxHashMap;

use crate::errors::{Result, VarconError};

///
/// Ordered list of named columns declared at a stage boundary.
///
/// Every stage looks fields up by name through its input schema, so a column
/// that moved or disappeared turns into a [VarconError::SchemaMismatch]
/// instead of a silently shifted value.
///
#[derive(Debug, Clone, Default)]
pub struct Schema {
    fields: Vec<String>,
    index: FxHashMap<String, usize>,
}

impl PartialEq for Schema {
    fn eq(&self, other: &Self) -> bool {
        self.fields == other.fields
    }
}

impl Eq for Schema {}

impl Schema {
    pub fn new<S: Into<String>>(fields: Vec<S>) -> Self {
        let fields: Vec<String> = fields.into_iter().map(Into::into).collect();
        let mut index = FxHashMap::default();
        for (i, name) in fields.iter().enumerate() {
            // first occurrence wins for lookups
            index.entry(name.clone()).or_insert(i);
        }
        Schema { fields, index }
    }

    ///
    /// Parse a tab-delimited header line.
    ///
    pub fn from_header_line(line: &str) -> Self {
        let line = line.trim_end_matches(['\n', '\r']);
        Schema::new(line.split('\t').collect())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn name(&self, position: usize) -> Option<&str> {
        self.fields.get(position).map(String::as_str)
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    ///
    /// Look up a field that the calling stage cannot run without.
    ///
    /// # Arguments
    /// - name: the field name
    /// - stage: name of the calling stage, for the error message
    /// - input: the input the schema was read from, for the error message
    ///
    pub fn require(&self, name: &str, stage: &'static str, input: &str) -> Result<usize> {
        self.position(name)
            .ok_or_else(|| VarconError::SchemaMismatch {
                stage,
                field: name.to_string(),
                input: input.to_string(),
            })
    }

    ///
    /// Position of the first field matching a predicate.
    ///
    pub fn find<F>(&self, predicate: F) -> Option<usize>
    where
        F: Fn(&str) -> bool,
    {
        self.fields.iter().position(|f| predicate(f))
    }

    ///
    /// A new schema with extra fields appended.
    ///
    pub fn extended(&self, extra: &[&str]) -> Schema {
        let mut fields = self.fields.clone();
        fields.extend(extra.iter().map(|s| s.to_string()));
        Schema::new(fields)
    }

    pub fn header_line(&self) -> String {
        self.fields.join("\t")
    }
}
