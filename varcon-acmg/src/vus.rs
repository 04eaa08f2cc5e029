//! VUS Sub-classifier.
//!
//! Variants of uncertain significance are graded hot, middle or cold from
//! how many pathogenic and benign rules of each strength they meet. Every
//! other record gets the `not-applicable` sub-tier.

use std::fmt::{self, Display};
use std::path::{Path, PathBuf};

use log::info;
use rayon::prelude::*;
use serde::Serialize;

use varcon_core::errors::{Result, VarconError};
use varcon_core::models::{Row, Schema, Table};
use varcon_core::utils::remove_all_extensions;
use varcon_io::{TableWrite, publish_tsv};

use crate::consts::{
    CATEGORY_COLUMN, RULE_EVIDENCE_COLUMN, VUS_REASON_COLUMN, VUS_SUBTIER_COLUMN,
    VUS_SUMMARY_COLUMNS,
};
use crate::models::{AcmgCategory, RuleEvidence};

const STAGE: &str = "vus";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum VusTier {
    Hot,
    Middle,
    Cold,
    NotApplicable,
}

impl Display for VusTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VusTier::Hot => write!(f, "hot"),
            VusTier::Middle => write!(f, "middle"),
            VusTier::Cold => write!(f, "cold"),
            VusTier::NotApplicable => write!(f, "not-applicable"),
        }
    }
}

///
/// Number of active rules per evidence strength. Stand-alone benign (BA)
/// evidence is not counted.
///
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EvidenceCounts {
    pub pvs: u32,
    pub ps: u32,
    pub pm: u32,
    pub pp: u32,
    pub bs: u32,
    pub bp: u32,
}

impl EvidenceCounts {
    pub fn from_evidence<'a, I>(evidence: I) -> Self
    where
        I: IntoIterator<Item = &'a RuleEvidence>,
    {
        let mut counts = EvidenceCounts::default();
        for e in evidence.into_iter().filter(|e| e.is_active()) {
            counts.count(&e.rule);
        }
        counts
    }

    ///
    /// Count a `rule_evidence` column value. Accepts `RULE=value` pairs and,
    /// for hand-curated tables, bare rule codes which count as active.
    ///
    pub fn from_column(value: &str) -> Self {
        let mut counts = EvidenceCounts::default();
        for token in value.split(',').map(str::trim).filter(|t| !t.is_empty()) {
            match token.split_once('=') {
                Some((rule, v)) => {
                    if RuleEvidence::new(rule, v).is_active() {
                        counts.count(rule);
                    }
                }
                None => counts.count(token),
            }
        }
        counts
    }

    fn count(&mut self, rule: &str) {
        if rule.starts_with("PVS") {
            self.pvs += 1;
        } else if rule.starts_with("PS") {
            self.ps += 1;
        } else if rule.starts_with("PM") {
            self.pm += 1;
        } else if rule.starts_with("PP") {
            self.pp += 1;
        } else if rule.starts_with("BS") {
            self.bs += 1;
        } else if rule.starts_with("BP") {
            self.bp += 1;
        }
    }
}

impl Display for EvidenceCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[PVS={} PS={} PM={} PP={} BS={} BP={}]",
            self.pvs, self.ps, self.pm, self.pp, self.bs, self.bp
        )
    }
}

///
/// Grade a VUS from its evidence counts. Rules are tried in order and the
/// first one that holds decides the tier.
///
/// Returns the tier and a description of the rule that fired.
///
pub fn classify(c: &EvidenceCounts) -> (VusTier, &'static str) {
    let no_strong = c.pvs == 0 && c.ps == 0;

    if c.pvs >= 1 {
        return (VusTier::Hot, "PVS evidence");
    }
    if c.ps >= 1 && !(c.pp == 0 && c.bp == 0 && c.bs >= 1) {
        return (VusTier::Hot, "PS with supporting evidence");
    }
    if c.pm >= 2 && c.pp >= 1 {
        return (VusTier::Hot, "two PM with PP");
    }
    if c.pp >= 4 && no_strong && c.pm == 0 {
        return (VusTier::Hot, "four or more PP");
    }
    if c.pp >= 3 && c.pm >= 1 && no_strong && (c.bp == 0 || c.bs == 0) {
        return (VusTier::Hot, "three PP with PM");
    }

    if c.bs >= 1 && (c.pvs >= 1 || c.ps >= 1) {
        return (VusTier::Middle, "BS against PVS or PS");
    }
    if c.pm >= 2 && c.pp == 0 && c.bp <= 1 {
        return (VusTier::Middle, "two PM without PP");
    }
    if c.pm == 1 && (c.pp == 1 || c.pp == 2) {
        return (VusTier::Middle, "one PM with one or two PP");
    }
    if c.pp >= 3 && no_strong && c.pm == 0 && c.bp <= 1 {
        return (VusTier::Middle, "three PP");
    }

    (VusTier::Cold, "no hot or middle combination")
}

///
/// Sub-tier and reason for one record.
///
pub fn subclassify(category: AcmgCategory, rule_evidence: &str) -> (VusTier, String) {
    if category != AcmgCategory::UncertainSignificance {
        return (VusTier::NotApplicable, String::new());
    }
    let counts = EvidenceCounts::from_column(rule_evidence);
    let (tier, rule) = classify(&counts);
    (tier, format!("{} {}", rule, counts))
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct VusReport {
    pub input: String,
    pub output: String,
    pub summary: String,
    pub records: usize,
    pub vus: usize,
    pub hot: usize,
    pub middle: usize,
    pub cold: usize,
}

///
/// Append `vus_subtier` and `vus_subtier_reason` to every row.
///
pub fn subclassify_table(table: &Table) -> Result<Table> {
    let category = table.require(CATEGORY_COLUMN, STAGE)?;
    let evidence = table.require(RULE_EVIDENCE_COLUMN, STAGE)?;
    for name in [VUS_SUBTIER_COLUMN, VUS_REASON_COLUMN] {
        if table.schema.contains(name) {
            return Err(VarconError::FieldCollision(name.to_string()));
        }
    }

    let rows: Vec<Row> = table
        .rows
        .par_iter()
        .map(|row| {
            let c = table
                .value(row, category)
                .parse()
                .unwrap_or(AcmgCategory::Unparseable);
            let (tier, reason) = subclassify(c, table.value(row, evidence));
            let mut out = row.clone();
            out.push(tier.to_string());
            out.push(reason);
            out
        })
        .collect();

    let mut graded = Table::new(
        table.schema.extended(&[VUS_SUBTIER_COLUMN, VUS_REASON_COLUMN]),
        rows,
    );
    graded.path = table.path.clone();
    Ok(graded)
}

///
/// The VUS rows of a graded table, restricted to the summary columns present.
///
pub fn vus_summary(graded: &Table) -> Result<Table> {
    let tier = graded.require(VUS_SUBTIER_COLUMN, STAGE)?;
    let columns: Vec<(usize, &str)> = VUS_SUMMARY_COLUMNS
        .iter()
        .filter_map(|name| graded.schema.position(name).map(|i| (i, *name)))
        .collect();

    let na = VusTier::NotApplicable.to_string();
    let rows: Vec<Row> = graded
        .rows
        .iter()
        .filter(|row| graded.value(row, tier) != na)
        .map(|row| {
            columns
                .iter()
                .map(|(i, _)| graded.value(row, *i).to_string())
                .collect()
        })
        .collect();

    Ok(Table::new(
        Schema::new(columns.iter().map(|(_, name)| *name).collect()),
        rows,
    ))
}

///
/// Location of the VUS summary: `<stem>.vus_summary.tsv` beside the output,
/// where `<stem>` is the output name up to its first dot.
///
pub fn summary_path(output: &Path) -> PathBuf {
    output.with_file_name(format!("{}.vus_summary.tsv", remove_all_extensions(output)))
}

pub fn vus(input: &Path, output: &Path) -> Result<VusReport> {
    let table = Table::try_from(input)?;
    let graded = subclassify_table(&table)?;
    let summary = vus_summary(&graded)?;

    let summary_out = summary_path(output);
    graded.write_tsv(output)?;
    publish_tsv(&summary_out, &summary.schema, &summary.rows)?;

    let tier = graded.require(VUS_SUBTIER_COLUMN, STAGE)?;
    let count = |t: VusTier| {
        let label = t.to_string();
        graded
            .rows
            .iter()
            .filter(|r| graded.value(r, tier) == label)
            .count()
    };
    let report = VusReport {
        input: input.display().to_string(),
        output: output.display().to_string(),
        summary: summary_out.display().to_string(),
        records: graded.len(),
        vus: summary.len(),
        hot: count(VusTier::Hot),
        middle: count(VusTier::Middle),
        cold: count(VusTier::Cold),
    };

    info!("VUS variants found: {} of {}", report.vus, report.records);
    info!("  hot (should be reported): {}", report.hot);
    info!("  middle (consider for reporting): {}", report.middle);
    info!("  cold (not reported): {}", report.cold);

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::fs;

    use pretty_assertions::assert_eq;
    use rstest::*;

    fn counts(pvs: u32, ps: u32, pm: u32, pp: u32, bs: u32, bp: u32) -> EvidenceCounts {
        EvidenceCounts {
            pvs,
            ps,
            pm,
            pp,
            bs,
            bp,
        }
    }

    #[rstest]
    #[case(counts(1, 0, 0, 0, 1, 1), VusTier::Hot)]
    #[case(counts(0, 1, 0, 0, 0, 0), VusTier::Hot)]
    #[case(counts(0, 1, 0, 1, 1, 0), VusTier::Hot)]
    #[case(counts(0, 1, 0, 0, 1, 0), VusTier::Middle)]
    #[case(counts(0, 0, 2, 1, 0, 0), VusTier::Hot)]
    #[case(counts(0, 0, 0, 4, 0, 1), VusTier::Hot)]
    #[case(counts(0, 0, 1, 3, 1, 1), VusTier::Cold)]
    #[case(counts(0, 0, 1, 3, 0, 1), VusTier::Hot)]
    #[case(counts(0, 0, 2, 0, 0, 1), VusTier::Middle)]
    #[case(counts(0, 0, 2, 0, 0, 2), VusTier::Cold)]
    #[case(counts(0, 0, 1, 2, 0, 0), VusTier::Middle)]
    #[case(counts(0, 0, 0, 3, 0, 0), VusTier::Middle)]
    #[case(counts(0, 0, 0, 3, 0, 2), VusTier::Cold)]
    #[case(counts(0, 0, 1, 0, 0, 0), VusTier::Cold)]
    #[case(counts(0, 0, 0, 0, 0, 0), VusTier::Cold)]
    fn test_classify(#[case] c: EvidenceCounts, #[case] expected: VusTier) {
        assert_eq!(classify(&c).0, expected);
    }

    #[rstest]
    fn test_counts_from_column() {
        let c = EvidenceCounts::from_column("PVS1=0, PS1=1, PM2=1, PM4=0, PP3=1, BA1=1, BP4=2");
        assert_eq!(c, counts(0, 1, 1, 1, 0, 1));

        // bare codes as written by hand-curated tables
        let c = EvidenceCounts::from_column("PS1, PP3");
        assert_eq!(c, counts(0, 1, 0, 1, 0, 0));
    }

    #[rstest]
    fn test_reason_string() {
        let (tier, reason) = subclassify(AcmgCategory::UncertainSignificance, "PS1=1, PP3=1");
        assert_eq!(tier, VusTier::Hot);
        assert_eq!(
            reason,
            "PS with supporting evidence [PVS=0 PS=1 PM=0 PP=1 BS=0 BP=0]"
        );
    }

    #[rstest]
    fn test_non_vus_is_not_applicable() {
        let (tier, reason) = subclassify(AcmgCategory::Pathogenic, "PVS1=1");
        assert_eq!(tier, VusTier::NotApplicable);
        assert_eq!(reason, "");
        assert_eq!(tier.to_string(), "not-applicable");
    }

    #[fixture]
    fn prioritized() -> Table {
        Table::new(
            Schema::new(vec![
                "#Chr",
                "Ref.Gene",
                "ANN[0].HGVS_C",
                "category",
                "rule_evidence",
                "priority_rank",
            ]),
            vec![
                vec!["chr1", "BRCA1", "c.1A>G", "Pathogenic", "PS1=1, PM2=1", "1"],
                vec!["chr2", "TP53", "c.5C>T", "Uncertain Significance", "PM1=1, PM2=1, PP3=1", "2"],
                vec!["chr3", "ATM", "c.9G>A", "Uncertain Significance", "PM2=1", "3"],
            ]
            .into_iter()
            .map(|r| r.into_iter().map(String::from).collect())
            .collect(),
        )
    }

    #[rstest]
    fn test_subclassify_table(prioritized: Table) {
        let graded = subclassify_table(&prioritized).unwrap();

        let tiers: Vec<&str> = graded.rows.iter().map(|r| r[6].as_str()).collect();
        assert_eq!(tiers, vec!["not-applicable", "hot", "cold"]);
        // everything else is untouched
        for (before, after) in prioritized.rows.iter().zip(graded.rows.iter()) {
            assert_eq!(&after[..6], before.as_slice());
        }
    }

    #[rstest]
    fn test_vus_writes_summary(prioritized: Table) {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("S1.prioritized.tsv");
        prioritized.write_tsv(&input).unwrap();
        let output = dir.path().join("S1.vus.tsv");

        let report = vus(&input, &output).unwrap();

        assert_eq!(report.vus, 2);
        assert_eq!(report.hot, 1);
        assert_eq!(report.cold, 1);

        let summary = Table::try_from(dir.path().join("S1.vus_summary.tsv")).unwrap();
        assert_eq!(
            summary.schema.fields(),
            &[
                "Ref.Gene",
                "ANN[0].HGVS_C",
                "category",
                "rule_evidence",
                "vus_subtier",
                "vus_subtier_reason"
            ]
        );
        assert_eq!(summary.len(), 2);
        assert_eq!(summary.rows[0][0], "TP53");
        assert!(fs::read_to_string(&output).unwrap().contains("\thot\t"));
    }
}
