//! Plain-text summary written next to the ranked output.

use std::fmt::{self, Display};
use std::sync::LazyLock;

use fxhash::FxHashMap;
use regex::Regex;
use serde::Serialize;

use varcon_acmg::AcmgCategory;
use varcon_core::models::Table;

use crate::config::PrioritizeConfig;
use crate::rank::{Ranking, impact_tier};

const TOP_GENES: usize = 10;

static SUBMISSION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([^(]+)\((\d+)\)$").expect("valid submission regex"));

///
/// Parse a ClinVar conflicting-interpretation value such as
/// `Pathogenic(2)|Uncertain_significance(1)` into lowercased names and
/// submission counts. Entries that do not match are skipped.
///
pub fn parse_clnsigconf(value: &str) -> Vec<(String, u32)> {
    value
        .split('|')
        .filter_map(|entry| {
            let caps = SUBMISSION_RE.captures(entry.trim())?;
            let count = caps[2].parse::<u32>().ok()?;
            Some((caps[1].trim().to_lowercase(), count))
        })
        .collect()
}

///
/// Records whose ClinVar conflicts include pathogenic or likely pathogenic
/// submissions.
///
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ConflictTally {
    pub pathogenic: usize,
    pub likely_pathogenic: usize,
}

impl ConflictTally {
    fn add(&mut self, value: &str) {
        let submissions = parse_clnsigconf(value);
        let mut pathogenic = false;
        let mut likely = false;
        for (name, count) in submissions {
            if count == 0 {
                continue;
            }
            if name.contains("likely_pathogenic") {
                likely = true;
            } else if name.contains("pathogenic") {
                pathogenic = true;
            }
        }
        self.pathogenic += pathogenic as usize;
        self.likely_pathogenic += likely as usize;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PrioritySummary {
    pub input: String,
    pub total: usize,
    pub after_filter: usize,
    pub reported: usize,
    pub categories: Vec<(String, usize)>,
    pub impacts: Vec<(String, usize)>,
    pub top_genes: Vec<(String, usize)>,
    pub conflicts: Option<ConflictTally>,
}

fn tally<'a, I: Iterator<Item = &'a str>>(values: I) -> Vec<(String, usize)> {
    let mut counts: FxHashMap<&str, usize> = FxHashMap::default();
    for v in values {
        *counts.entry(v).or_insert(0) += 1;
    }
    counts.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
}

impl PrioritySummary {
    ///
    /// Summarize the records that passed the prefilters.
    ///
    /// # Arguments
    /// - table: the table that was ranked
    /// - ranking: the ranking computed over it
    /// - config: ranker configuration, for column names
    ///
    pub fn new(table: &Table, ranking: &Ranking, config: &PrioritizeConfig) -> Self {
        let column_values = |name: &str| {
            let column = table.schema.position(name)?;
            Some(
                ranking
                    .ordered
                    .iter()
                    .map(|&i| table.value(&table.rows[i], column))
                    .collect::<Vec<&str>>(),
            )
        };

        let mut categories = column_values(&config.category_column)
            .map(|v| tally(v.into_iter()))
            .unwrap_or_default();
        categories.sort_by(|a, b| {
            let severity = |label: &str| {
                label
                    .parse::<AcmgCategory>()
                    .map(|c| c.severity())
                    .unwrap_or(u8::MAX)
            };
            severity(&a.0).cmp(&severity(&b.0)).then_with(|| a.0.cmp(&b.0))
        });

        let mut impacts = column_values(&config.impact_column)
            .map(|v| tally(v.into_iter()))
            .unwrap_or_default();
        impacts.sort_by(|a, b| {
            impact_tier(&a.0)
                .cmp(&impact_tier(&b.0))
                .then_with(|| a.0.cmp(&b.0))
        });

        let mut top_genes = column_values(&config.gene_column)
            .map(|v| tally(v.into_iter().filter(|g| !g.is_empty() && *g != ".")))
            .unwrap_or_default();
        top_genes.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        top_genes.truncate(TOP_GENES);

        let conflicts = column_values(&config.clnsigconf_column).map(|values| {
            let mut tally = ConflictTally::default();
            for v in values {
                tally.add(v);
            }
            tally
        });

        PrioritySummary {
            input: table.source_name(),
            total: ranking.total,
            after_filter: ranking.after_filter(),
            reported: ranking.reported(),
            categories,
            impacts,
            top_genes,
            conflicts,
        }
    }
}

impl Display for PrioritySummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Variant Prioritization Summary")?;
        writeln!(f, "==============================")?;
        writeln!(f)?;
        writeln!(f, "Input file: {}", self.input)?;
        writeln!(f)?;
        writeln!(f, "Variant Statistics:")?;
        writeln!(f, "------------------")?;
        writeln!(f, "Total variants processed: {}", self.total)?;
        writeln!(f, "Variants after filtering: {}", self.after_filter)?;
        writeln!(f, "Variants reported: {}", self.reported)?;

        let sections = [
            ("Classification Distribution:", &self.categories),
            ("Impact Distribution:", &self.impacts),
            ("Top Genes:", &self.top_genes),
        ];
        for (title, entries) in sections {
            if entries.is_empty() {
                continue;
            }
            writeln!(f)?;
            writeln!(f, "{}", title)?;
            for (name, count) in entries {
                let name = if name.is_empty() { "." } else { name.as_str() };
                writeln!(f, "  {}: {}", name, count)?;
            }
        }

        if let Some(conflicts) = &self.conflicts {
            writeln!(f)?;
            writeln!(f, "ClinVar Conflicting Interpretations:")?;
            writeln!(f, "  With pathogenic submissions: {}", conflicts.pathogenic)?;
            writeln!(
                f,
                "  With likely pathogenic submissions: {}",
                conflicts.likely_pathogenic
            )?;
        }
        Ok(())
    }
}
