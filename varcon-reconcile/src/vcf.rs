//! Minimal VCF model: just enough of the header to know which INFO and
//! FORMAT keys exist, and just enough of a record to read and extend them.

use std::fmt::Write as _;
use std::io::BufRead;
use std::path::Path;

use fxhash::FxHashMap;

use varcon_core::errors::{Result, VarconError};
use varcon_core::models::VariantKey;
use varcon_core::utils::get_dynamic_reader;

pub const FIXED_COLUMNS: [&str; 8] = ["CHROM", "POS", "ID", "REF", "ALT", "QUAL", "FILTER", "INFO"];

/// Number of mandatory columns of a VCF data line.
pub const MANDATORY_WIDTH: usize = 8;

///
/// One `##INFO` or `##FORMAT` declaration.
///
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub id: String,
    pub number: String,
    pub kind: String,
    pub description: String,
}

impl Declaration {
    pub fn is_flag(&self) -> bool {
        self.kind.eq_ignore_ascii_case("Flag")
    }
}

///
/// Parse the `<ID=..,Number=..,...>` body of a structured meta line. Quoted
/// values may contain commas.
///
fn parse_structured(line: &str, prefix: &str) -> Option<Declaration> {
    let body = line.strip_prefix(prefix)?.strip_prefix('<')?;
    let body = body.strip_suffix('>')?;

    let mut pairs: FxHashMap<String, String> = FxHashMap::default();
    let mut key = String::new();
    let mut value = String::new();
    let mut in_value = false;
    let mut in_quotes = false;

    for c in body.chars() {
        match c {
            '"' => in_quotes = !in_quotes,
            '=' if !in_value => in_value = true,
            ',' if !in_quotes => {
                pairs.insert(std::mem::take(&mut key), std::mem::take(&mut value));
                in_value = false;
            }
            _ if in_value => value.push(c),
            _ => key.push(c),
        }
    }
    if !key.is_empty() {
        pairs.insert(key, value);
    }

    Some(Declaration {
        id: pairs.remove("ID")?,
        number: pairs.remove("Number").unwrap_or_else(|| ".".to_string()),
        kind: pairs.remove("Type").unwrap_or_else(|| "String".to_string()),
        description: pairs.remove("Description").unwrap_or_default(),
    })
}

///
/// VCF header: the `##` meta lines plus the sample names of the `#CHROM` line.
///
#[derive(Debug, Clone, Default)]
pub struct VcfHeader {
    meta: Vec<String>,
    samples: Vec<String>,
    has_format_column: bool,
    info: Vec<Declaration>,
    format: Vec<Declaration>,
}

impl VcfHeader {
    ///
    /// Build a header from its lines (`##` meta lines and the `#CHROM` line).
    ///
    pub fn from_lines<S: AsRef<str>>(lines: &[S]) -> Result<Self> {
        let mut header = VcfHeader::default();
        let mut saw_columns = false;

        for line in lines {
            let line = line.as_ref().trim_end_matches(['\n', '\r']);
            if line.starts_with("##") {
                header.push_meta(line.to_string());
            } else if line.starts_with("#CHROM") {
                let columns: Vec<&str> = line.split('\t').collect();
                if columns.len() < MANDATORY_WIDTH {
                    return Err(VarconError::MalformedRow {
                        input: "VCF header".to_string(),
                        line: header.meta.len() + 1,
                        reason: format!("#CHROM line has {} columns", columns.len()),
                    });
                }
                header.has_format_column = columns.len() > MANDATORY_WIDTH;
                header.samples = columns
                    .iter()
                    .skip(MANDATORY_WIDTH + 1)
                    .map(|s| s.to_string())
                    .collect();
                saw_columns = true;
            }
        }

        if !saw_columns {
            return Err(VarconError::EmptyInput("VCF header without #CHROM line".to_string()));
        }

        Ok(header)
    }

    ///
    /// Read just the header lines of a file. Reading stops at the first data line.
    ///
    pub fn read(path: &Path) -> Result<Self> {
        let reader = get_dynamic_reader(path)?;
        let mut lines = Vec::new();
        for line in reader.lines() {
            let line = line?;
            if !line.starts_with('#') {
                break;
            }
            lines.push(line);
        }
        if lines.is_empty() {
            return Err(VarconError::EmptyInput(path.display().to_string()));
        }
        VcfHeader::from_lines(&lines)
    }

    ///
    /// Header for a sites file with `n_samples` genotype columns, used when the
    /// caller has no header of its own to contribute.
    ///
    pub fn minimal(n_samples: usize) -> Self {
        VcfHeader {
            meta: vec!["##fileformat=VCFv4.2".to_string()],
            samples: (1..=n_samples).map(|i| format!("SAMPLE{}", i)).collect(),
            has_format_column: n_samples > 0,
            info: Vec::new(),
            format: Vec::new(),
        }
    }

    fn push_meta(&mut self, line: String) {
        if let Some(decl) = parse_structured(&line, "##INFO=") {
            self.info.retain(|d| d.id != decl.id);
            self.info.push(decl);
        } else if let Some(decl) = parse_structured(&line, "##FORMAT=") {
            self.format.retain(|d| d.id != decl.id);
            self.format.push(decl);
        }
        self.meta.push(line);
    }

    pub fn samples(&self) -> &[String] {
        &self.samples
    }

    pub fn info(&self, id: &str) -> Option<&Declaration> {
        self.info.iter().find(|d| d.id == id)
    }

    pub fn format(&self, id: &str) -> Option<&Declaration> {
        self.format.iter().find(|d| d.id == id)
    }

    ///
    /// Declare a String INFO key, unless it is declared already.
    ///
    pub fn declare_info(&mut self, id: &str, description: &str) {
        if self.info(id).is_some() {
            return;
        }
        let line = format!(
            "##INFO=<ID={},Number=1,Type=String,Description=\"{}\">",
            id, description
        );
        self.push_meta(line);
    }

    pub fn column_line(&self) -> String {
        let mut line = FIXED_COLUMNS.join("\t");
        line.insert(0, '#');
        if self.has_format_column {
            line.push_str("\tFORMAT");
            for sample in &self.samples {
                let _ = write!(line, "\t{}", sample);
            }
        }
        line
    }

    ///
    /// All header lines, meta lines first and the `#CHROM` line last.
    ///
    pub fn lines(&self) -> Vec<String> {
        let mut lines = self.meta.clone();
        lines.push(self.column_line());
        lines
    }
}

///
/// Value of an INFO key in one record.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InfoValue<'a> {
    Flag,
    Value(&'a str),
}

///
/// One VCF data line, split into its tab-delimited columns.
///
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VcfRecord {
    fields: Vec<String>,
    pos: u64,
    line: usize,
}

impl VcfRecord {
    ///
    /// Build a record from its columns.
    ///
    /// # Arguments
    /// - fields: CHROM through INFO, then optional FORMAT and sample columns
    /// - line: 1-based source line, kept for error messages
    /// - input: source name, for error messages
    ///
    pub fn from_fields(fields: Vec<String>, line: usize, input: &str) -> Result<Self> {
        if fields.len() < MANDATORY_WIDTH {
            return Err(VarconError::MalformedRow {
                input: input.to_string(),
                line,
                reason: format!(
                    "VCF record has {} columns, expected at least {}",
                    fields.len(),
                    MANDATORY_WIDTH
                ),
            });
        }
        let pos = fields[1]
            .parse::<u64>()
            .map_err(|_| VarconError::MalformedRow {
                input: input.to_string(),
                line,
                reason: format!("POS '{}' is not an integer", fields[1]),
            })?;
        Ok(VcfRecord { fields, pos, line })
    }

    pub fn from_line(line: &str, line_number: usize, input: &str) -> Result<Self> {
        let fields = line.split('\t').map(|s| s.to_string()).collect();
        VcfRecord::from_fields(fields, line_number, input)
    }

    pub fn line(&self) -> usize {
        self.line
    }

    ///
    /// One of the eight mandatory columns by position.
    ///
    pub fn fixed(&self, column: usize) -> &str {
        self.fields.get(column).map(String::as_str).unwrap_or("")
    }

    pub fn chrom(&self) -> &str {
        self.fixed(0)
    }

    pub fn reference(&self) -> &str {
        self.fixed(3)
    }

    pub fn alternate(&self) -> &str {
        self.fixed(4)
    }

    ///
    /// The record's own, tool-normalized identity.
    ///
    pub fn variant_key(&self) -> VariantKey {
        VariantKey {
            chrom: self.chrom().to_string(),
            pos: self.pos,
            reference: self.reference().to_string(),
            alternate: self.alternate().to_string(),
        }
    }

    pub fn n_samples(&self) -> usize {
        self.fields.len().saturating_sub(MANDATORY_WIDTH + 1)
    }

    pub fn info(&self, key: &str) -> Option<InfoValue<'_>> {
        let info = self.fixed(7);
        if info == "." {
            return None;
        }
        info.split(';').find_map(|entry| match entry.split_once('=') {
            Some((k, v)) if k == key => Some(InfoValue::Value(v)),
            None if entry == key => Some(InfoValue::Flag),
            _ => None,
        })
    }

    ///
    /// Set an INFO key, replacing an existing value for the same key.
    ///
    pub fn set_info(&mut self, key: &str, value: &str) {
        let entry = format!("{}={}", key, value);
        let current = &self.fields[7];
        let kept: Vec<&str> = if current == "." || current.is_empty() {
            Vec::new()
        } else {
            current
                .split(';')
                .filter(|e| e.split_once('=').map(|(k, _)| k).unwrap_or(*e) != key)
                .collect()
        };
        let updated = if kept.is_empty() {
            entry
        } else {
            format!("{};{}", kept.join(";"), entry)
        };
        self.fields[7] = updated;
    }

    ///
    /// Value of a FORMAT key for one sample.
    ///
    pub fn sample_value(&self, sample: usize, key: &str) -> Option<&str> {
        let format = self.fields.get(MANDATORY_WIDTH)?;
        let position = format.split(':').position(|k| k == key)?;
        let column = self.fields.get(MANDATORY_WIDTH + 1 + sample)?;
        column.split(':').nth(position)
    }

    pub fn to_line(&self) -> String {
        self.fields.join("\t")
    }
}

///
/// An annotated VCF loaded into memory: header plus records in file order.
///
#[derive(Debug, Clone)]
pub struct VcfFile {
    pub header: VcfHeader,
    pub records: Vec<VcfRecord>,
}

impl VcfFile {
    pub fn read(path: &Path) -> Result<Self> {
        let input = path.display().to_string();
        let reader = get_dynamic_reader(path)?;

        let mut header_lines = Vec::new();
        let mut records = Vec::new();

        for (i, line) in reader.lines().enumerate() {
            let line = line?;
            let line = line.trim_end_matches('\r');
            if line.is_empty() {
                continue;
            }
            if line.starts_with('#') {
                header_lines.push(line.to_string());
                continue;
            }
            records.push(VcfRecord::from_line(line, i + 1, &input)?);
        }

        if header_lines.is_empty() {
            return Err(VarconError::EmptyInput(input));
        }

        Ok(VcfFile {
            header: VcfHeader::from_lines(&header_lines)?,
            records,
        })
    }
}

impl TryFrom<&Path> for VcfFile {
    type Error = VarconError;

    fn try_from(value: &Path) -> Result<Self> {
        VcfFile::read(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;

    #[fixture]
    fn header() -> VcfHeader {
        VcfHeader::from_lines(&[
            "##fileformat=VCFv4.2",
            "##INFO=<ID=DP,Number=1,Type=Integer,Description=\"Total depth, all samples\">",
            "##INFO=<ID=DB,Number=0,Type=Flag,Description=\"dbSNP membership\">",
            "##FORMAT=<ID=AD,Number=R,Type=Integer,Description=\"Allelic depths\">",
            "#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\tFORMAT\tNA12878",
        ])
        .unwrap()
    }

    #[rstest]
    fn test_header_declarations(header: VcfHeader) {
        assert_eq!(header.samples(), &["NA12878".to_string()]);
        let dp = header.info("DP").unwrap();
        assert_eq!(dp.kind, "Integer");
        assert_eq!(dp.description, "Total depth, all samples");
        assert!(header.info("DB").unwrap().is_flag());
        assert!(header.format("AD").is_some());
        assert!(header.info("AD").is_none());
    }

    #[rstest]
    fn test_declare_info_is_idempotent(mut header: VcfHeader) {
        header.declare_info("AVINPUTCHR", "Original chromosome");
        header.declare_info("AVINPUTCHR", "Original chromosome");
        let lines = header.lines();
        assert_eq!(lines.iter().filter(|l| l.contains("AVINPUTCHR")).count(), 1);
        assert!(lines.last().unwrap().starts_with("#CHROM"));
    }

    #[rstest]
    fn test_minimal_header() {
        let header = VcfHeader::minimal(2);
        assert_eq!(
            header.column_line(),
            "#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\tFORMAT\tSAMPLE1\tSAMPLE2"
        );
        assert_eq!(
            VcfHeader::minimal(0).column_line(),
            "#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO"
        );
    }

    #[rstest]
    fn test_record_info_access() {
        let record = VcfRecord::from_line(
            "chr1\t100\t.\tA\tG\t50\tPASS\tDP=30;DB;AF=0.5\tGT:AD\t0/1:15,15",
            3,
            "test.vcf",
        )
        .unwrap();

        assert_eq!(record.info("DP"), Some(InfoValue::Value("30")));
        assert_eq!(record.info("DB"), Some(InfoValue::Flag));
        assert_eq!(record.info("D"), None);
        assert_eq!(record.sample_value(0, "AD"), Some("15,15"));
        assert_eq!(record.sample_value(1, "AD"), None);
        assert_eq!(record.variant_key().to_string(), "chr1:100:A>G");
    }

    #[rstest]
    fn test_set_info_replaces() {
        let mut record =
            VcfRecord::from_line("1\t5\t.\tC\tT\t.\t.\t.", 1, "test.vcf").unwrap();
        record.set_info("AVINPUTSTART", "5");
        record.set_info("AVINPUTSTART", "6");
        assert_eq!(record.fixed(7), "AVINPUTSTART=6");
    }

    #[rstest]
    fn test_short_record_is_malformed() {
        let result = VcfRecord::from_line("1\t5\t.\tC", 9, "test.vcf");
        assert!(matches!(result, Err(VarconError::MalformedRow { line: 9, .. })));
    }
}
