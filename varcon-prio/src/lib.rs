//! # varcon-prio
//!
//! Clinical prioritization of merged variant records. Records are put in a
//! total order (ACMG severity, then functional impact, then input position),
//! optionally prefiltered, truncated to the top N and written as a table or
//! as a structured document, with a plain-text summary alongside.
//!
//! ```no_run
//! use std::path::Path;
//! use varcon_prio::{PrioritizeConfig, prioritize};
//!
//! let config = PrioritizeConfig { top_n: 50, ..Default::default() };
//! let report = prioritize(
//!     Path::new("S1.acmg.tsv"),
//!     Path::new("S1.prioritized.tsv"),
//!     &config,
//! )
//! .unwrap();
//! println!("{} variants reported", report.reported_variants);
//! ```
//!
pub mod config;
pub mod filter;
pub mod rank;
pub mod summary;

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use log::info;
use serde::Serialize;

use varcon_core::errors::Result;
use varcon_core::models::Table;
use varcon_core::utils::sibling_with_suffix;
use varcon_io::{OutputFormat, RecordsView, TableWrite, publish, publish_serialized};

pub use config::{ConfigError, PrioritizeConfig};
pub use filter::{FilterCounts, Prefilter};
pub use rank::{PRIORITY_RANK_COLUMN, PriorityKey, Ranking, impact_tier, rank_table};
pub use summary::{ConflictTally, PrioritySummary, parse_clnsigconf};

#[derive(Debug, Clone, Serialize)]
pub struct PrioritizeReport {
    pub input: String,
    pub output: String,
    pub summary: String,
    pub format: OutputFormat,
    pub total_variants: usize,
    pub after_filter: usize,
    pub reported_variants: usize,
    pub filtered: FilterCounts,
}

#[derive(Serialize)]
struct RankStats {
    after_filter: usize,
    filtered: FilterCounts,
    categories: BTreeMap<String, usize>,
}

#[derive(Serialize)]
struct Metadata<'a> {
    input: &'a str,
    total_variants: usize,
    reported_variants: usize,
    top_n: usize,
    stats: RankStats,
}

#[derive(Serialize)]
struct PrioritizedDocument<'a> {
    metadata: Metadata<'a>,
    variants: RecordsView<'a>,
}

///
/// Path of the summary written next to a ranked output.
///
pub fn summary_path(output: &Path) -> PathBuf {
    sibling_with_suffix(output, "summary.txt")
}

///
/// Rank a merged table and publish the top records plus a summary.
///
/// # Arguments
/// - input: split ACMG table (`category` column and impact annotations)
/// - output: ranked output path; its format follows `config.format`
/// - config: ranker configuration
///
pub fn prioritize(input: &Path, output: &Path, config: &PrioritizeConfig) -> Result<PrioritizeReport> {
    let table = Table::try_from(input)?;
    let ranking = rank_table(&table, config)?;
    let summary = PrioritySummary::new(&table, &ranking, config);

    match config.format {
        OutputFormat::Tsv => ranking.table.write_tsv(output)?,
        format => {
            let source = table.source_name();
            let document = PrioritizedDocument {
                metadata: Metadata {
                    input: &source,
                    total_variants: ranking.total,
                    reported_variants: ranking.reported(),
                    top_n: config.top_n,
                    stats: RankStats {
                        after_filter: ranking.after_filter(),
                        filtered: ranking.filtered,
                        categories: summary.categories.iter().cloned().collect(),
                    },
                },
                variants: RecordsView::new(&ranking.table.schema, &ranking.table.rows)
                    .with_integer_column(PRIORITY_RANK_COLUMN),
            };
            publish_serialized(output, &document, format)?;
        }
    }

    let summary_out = summary_path(output);
    publish(&summary_out, |w| write!(w, "{}", summary))?;

    info!(
        "Prioritized {} of {} variants ({} after filtering) -> {}",
        ranking.reported(),
        ranking.total,
        ranking.after_filter(),
        output.display()
    );

    Ok(PrioritizeReport {
        input: input.display().to_string(),
        output: output.display().to_string(),
        summary: summary_out.display().to_string(),
        format: config.format,
        total_variants: ranking.total,
        after_filter: ranking.after_filter(),
        reported_variants: ranking.reported(),
        filtered: ranking.filtered,
    })
}
