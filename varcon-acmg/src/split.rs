//! ACMG Column Splitter.
//!
//! The composite classification column stays in every row byte for byte;
//! `category` and `rule_evidence` are normalized views of it.

use std::collections::BTreeMap;
use std::path::Path;

use log::{info, warn};
use rayon::prelude::*;
use serde::Serialize;

use varcon_core::errors::{Result, VarconError};
use varcon_core::models::{Row, Schema, Table};
use varcon_io::TableWrite;

use crate::consts::{CATEGORY_COLUMN, RULE_EVIDENCE_COLUMN};
use crate::models::{AcmgCategory, decompose};

const STAGE: &str = "acmg";

#[derive(Debug, Clone, Default)]
pub struct SplitOptions {
    /// Name of the classification column; detected when absent.
    pub column: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SplitReport {
    pub input: String,
    pub output: String,
    pub records: usize,
    pub unparseable: usize,
    pub categories: BTreeMap<String, usize>,
}

///
/// Find the classifier's composite column: the first whose name mentions
/// both `InterVar` and `Evidence`.
///
pub fn find_classification_column(schema: &Schema) -> Option<usize> {
    schema.find(|name| name.contains("InterVar") && name.contains("Evidence"))
}

///
/// Append `category` and `rule_evidence` to every row of a table. The
/// composite column itself is kept.
///
pub fn split_table(table: &Table, options: &SplitOptions) -> Result<Table> {
    let column = match &options.column {
        Some(name) => table.require(name, STAGE)?,
        None => find_classification_column(&table.schema).ok_or_else(|| {
            VarconError::SchemaMismatch {
                stage: STAGE,
                field: "InterVar: InterVar and Evidence".to_string(),
                input: table.source_name(),
            }
        })?,
    };

    for name in [CATEGORY_COLUMN, RULE_EVIDENCE_COLUMN] {
        if table.schema.contains(name) {
            return Err(VarconError::FieldCollision(name.to_string()));
        }
    }

    let rows: Vec<Row> = table
        .rows
        .par_iter()
        .map(|row| {
            let (category, evidence) = decompose(table.value(row, column));
            let mut out = row.clone();
            out.push(category.label().to_string());
            out.push(evidence);
            out
        })
        .collect();

    let mut split = Table::new(
        table
            .schema
            .extended(&[CATEGORY_COLUMN, RULE_EVIDENCE_COLUMN]),
        rows,
    );
    split.path = table.path.clone();
    Ok(split)
}

///
/// Count records per category, keyed by category label.
///
pub fn category_distribution(table: &Table) -> Result<BTreeMap<String, usize>> {
    let column = table.require(CATEGORY_COLUMN, STAGE)?;
    let mut counts = BTreeMap::new();
    for row in &table.rows {
        let category: AcmgCategory = table
            .value(row, column)
            .parse()
            .unwrap_or(AcmgCategory::Unparseable);
        *counts.entry(category.label().to_string()).or_insert(0) += 1;
    }
    Ok(counts)
}

pub fn split(input: &Path, output: &Path, options: &SplitOptions) -> Result<SplitReport> {
    let table = Table::try_from(input)?;
    let split = split_table(&table, options)?;
    split.write_tsv(output)?;

    let categories = category_distribution(&split)?;
    let unparseable = categories
        .get(AcmgCategory::Unparseable.label())
        .copied()
        .unwrap_or(0);

    info!("ACMG classification distribution for {}:", input.display());
    for (label, count) in &categories {
        info!("  {}: {}", label, count);
    }
    if unparseable > 0 {
        warn!(
            "{} of {} classification strings could not be parsed",
            unparseable,
            split.len()
        );
    }

    Ok(SplitReport {
        input: input.display().to_string(),
        output: output.display().to_string(),
        records: split.len(),
        unparseable,
        categories,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::fs;

    use pretty_assertions::assert_eq;
    use rstest::*;

    use crate::models::ClassificationField;

    #[fixture]
    fn merged() -> Table {
        Table::new(
            Schema::new(vec![
                "#Chr",
                "Start",
                "End",
                "Ref",
                "Alt",
                "InterVar: InterVar and Evidence",
                "ANN[0].IMPACT",
            ]),
            vec![
                vec!["chr1", "12345", "12345", "A", "G", "Pathogenic: PS1=1 PM2=1", "HIGH"],
                vec!["chr2", "9", "9", "C", "T", "garbage", "LOW"],
                vec!["chr3", "7", "7", "G", "A", "", "LOW"],
            ]
            .into_iter()
            .map(|r| r.into_iter().map(String::from).collect())
            .collect(),
        )
    }

    #[rstest]
    fn test_split_appends_columns(merged: Table) {
        let split = split_table(&merged, &SplitOptions::default()).unwrap();

        assert_eq!(split.schema.len(), 9);
        assert_eq!(split.schema.name(7), Some("category"));
        assert_eq!(split.schema.name(8), Some("rule_evidence"));
        assert_eq!(split.rows[0][5], "Pathogenic: PS1=1 PM2=1");
        assert_eq!(split.rows[0][7], "Pathogenic");
        assert_eq!(split.rows[0][8], "PS1=1, PM2=1");
    }

    #[rstest]
    fn test_composite_column_rebuilds_the_split_columns() {
        let raw = "InterVar: Likely pathogenic PVS1=1 PM2=1";
        let table = Table::new(
            Schema::new(vec!["#Chr", "Start", "End", "Ref", "Alt", "InterVar: InterVar and Evidence"]),
            vec![
                ["chr1", "5", "5", "A", "G", raw]
                    .into_iter()
                    .map(String::from)
                    .collect(),
            ],
        );

        let split = split_table(&table, &SplitOptions::default()).unwrap();
        let row = &split.rows[0];

        assert_eq!(row[6], "Likely Pathogenic");
        assert_eq!(row[7], "PVS1=1, PM2=1");
        assert_eq!(row[5], raw);
        let field = ClassificationField::parse(&row[5]).unwrap();
        assert_eq!(field.render(), raw);
        assert_eq!(field.category.label(), row[6]);
        assert_eq!(field.evidence_column(), row[7]);
    }

    #[rstest]
    fn test_unparseable_rows_are_flagged_not_fatal(merged: Table) {
        let split = split_table(&merged, &SplitOptions::default()).unwrap();

        assert_eq!(split.len(), 3);
        assert_eq!(split.rows[1][7], "UNPARSEABLE");
        assert_eq!(split.rows[1][8], "garbage");
        assert_eq!(split.rows[2][7], "UNPARSEABLE");
        assert_eq!(split.rows[2][8], "");
    }

    #[rstest]
    fn test_missing_classification_column(merged: Table) {
        let options = SplitOptions {
            column: Some("Clinvar".to_string()),
        };
        assert!(matches!(
            split_table(&merged, &options),
            Err(VarconError::SchemaMismatch { .. })
        ));
    }

    #[rstest]
    fn test_split_twice_collides(merged: Table) {
        let once = split_table(&merged, &SplitOptions::default()).unwrap();
        assert!(matches!(
            split_table(&once, &SplitOptions::default()),
            Err(VarconError::FieldCollision(_))
        ));
    }

    #[rstest]
    fn test_split_file_reports_distribution(merged: Table) {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("merged.tsv");
        merged.write_tsv(&input).unwrap();
        let output = dir.path().join("acmg.tsv");

        let report = split(&input, &output, &SplitOptions::default()).unwrap();

        assert_eq!(report.records, 3);
        assert_eq!(report.unparseable, 2);
        assert_eq!(report.categories.get("Pathogenic"), Some(&1));
        assert!(fs::read_to_string(&output).unwrap().starts_with("#Chr\t"));
    }
}
