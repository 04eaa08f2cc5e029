use log::{debug, info};

use varcon_acmg::AcmgCategory;
use varcon_core::errors::{Result, VarconError};
use varcon_core::models::{Row, Table};

use crate::config::PrioritizeConfig;
use crate::filter::{FilterCounts, Prefilter};

pub const PRIORITY_RANK_COLUMN: &str = "priority_rank";

const STAGE: &str = "prioritize";

///
/// Functional impact tier, 0 being the most severe. Unknown or missing
/// impacts sort after MODIFIER.
///
pub fn impact_tier(impact: &str) -> u8 {
    match impact.trim().to_ascii_uppercase().as_str() {
        "HIGH" => 0,
        "MODERATE" => 1,
        "LOW" => 2,
        "MODIFIER" => 3,
        _ => 4,
    }
}

///
/// Sort key of one record: severity, then impact, then input position.
/// Input positions are unique so no two records ever compare equal.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct PriorityKey {
    pub severity: u8,
    pub impact: u8,
    pub position: usize,
}

impl PriorityKey {
    pub fn new(category: &str, impact: &str, position: usize) -> Self {
        let category = category.parse::<AcmgCategory>().unwrap_or(AcmgCategory::Unparseable);
        PriorityKey {
            severity: category.severity(),
            impact: impact_tier(impact),
            position,
        }
    }
}

///
/// Result of ranking one table.
///
#[derive(Debug)]
pub struct Ranking {
    /// Reported records in rank order, with `priority_rank` appended.
    pub table: Table,
    /// Positions of every record that passed the prefilters, in rank order.
    /// The reported records are a prefix of this list.
    pub ordered: Vec<usize>,
    pub total: usize,
    pub filtered: FilterCounts,
}

impl Ranking {
    pub fn after_filter(&self) -> usize {
        self.ordered.len()
    }

    pub fn reported(&self) -> usize {
        self.table.len()
    }
}

///
/// Order the records of a table by clinical priority and keep the first
/// `top_n` of them.
///
/// # Arguments
/// - table: merged records carrying category and impact columns
/// - config: ranker configuration; `top_n == 0` keeps every record
///
pub fn rank_table(table: &Table, config: &PrioritizeConfig) -> Result<Ranking> {
    let category = table.require(&config.category_column, STAGE)?;
    let impact = table.require(&config.impact_column, STAGE)?;
    if table.schema.contains(PRIORITY_RANK_COLUMN) {
        return Err(VarconError::FieldCollision(PRIORITY_RANK_COLUMN.to_string()));
    }

    let prefilter = Prefilter::new(table, config)?;
    let mut filtered = FilterCounts::default();

    let mut keys: Vec<PriorityKey> = table
        .rows
        .iter()
        .enumerate()
        .filter(|(_, row)| prefilter.keep(row, &mut filtered))
        .map(|(i, row)| PriorityKey::new(table.value(row, category), table.value(row, impact), i))
        .collect();

    // the whole set is ordered before anything is cut
    keys.sort_unstable();

    if prefilter.is_active() {
        info!(
            "Prefilters removed {} of {} records (benign: {}, population AF: {}, CADD: {}, gene list: {})",
            filtered.total(),
            table.len(),
            filtered.benign,
            filtered.population_af,
            filtered.cadd,
            filtered.gene
        );
    }

    let reported = match config.top_n {
        0 => keys.len(),
        n => n.min(keys.len()),
    };
    debug!("Reporting {} of {} ranked records", reported, keys.len());

    let rows: Vec<Row> = keys[..reported]
        .iter()
        .enumerate()
        .map(|(rank, key)| {
            let mut row = table.rows[key.position].clone();
            row.push((rank + 1).to_string());
            row
        })
        .collect();

    let schema = table.schema.extended(&[PRIORITY_RANK_COLUMN]);
    let mut ranked = Table::new(schema, rows);
    ranked.path = table.path.clone();

    Ok(Ranking {
        table: ranked,
        ordered: keys.iter().map(|k| k.position).collect(),
        total: table.len(),
        filtered,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;
    use varcon_core::models::Schema;

    fn table(rows: &[(&str, &str, &str)]) -> Table {
        let schema = Schema::new(vec!["id", "category", "ANN[0].IMPACT"]);
        Table::new(
            schema,
            rows.iter()
                .map(|(id, c, i)| vec![id.to_string(), c.to_string(), i.to_string()])
                .collect(),
        )
    }

    fn ids(ranking: &Ranking) -> Vec<String> {
        ranking.table.rows.iter().map(|r| r[0].clone()).collect()
    }

    #[fixture]
    fn ten_pathogenic_high() -> Table {
        let ids: Vec<String> = (1..=10).map(|i| format!("r{}", i)).collect();
        let rows: Vec<(&str, &str, &str)> = ids
            .iter()
            .map(|id| (id.as_str(), "Pathogenic", "HIGH"))
            .collect();
        table(&rows)
    }

    #[rstest]
    #[case(5, 5)]
    #[case(0, 10)]
    #[case(10, 10)]
    #[case(25, 10)]
    fn test_output_is_prefix_of_input_order(
        ten_pathogenic_high: Table,
        #[case] top_n: usize,
        #[case] expected: usize,
    ) {
        let config = PrioritizeConfig {
            top_n,
            ..Default::default()
        };
        let ranking = rank_table(&ten_pathogenic_high, &config).unwrap();
        let want: Vec<String> = (1..=expected).map(|i| format!("r{}", i)).collect();
        assert_eq!(ids(&ranking), want);
        assert_eq!(ranking.after_filter(), 10);
        assert_eq!(ranking.reported(), expected);
    }

    #[rstest]
    fn test_priority_rank_is_appended(ten_pathogenic_high: Table) {
        let config = PrioritizeConfig {
            top_n: 3,
            ..Default::default()
        };
        let ranking = rank_table(&ten_pathogenic_high, &config).unwrap();
        assert_eq!(ranking.table.schema.name(3), Some(PRIORITY_RANK_COLUMN));
        let ranks: Vec<&str> = ranking.table.rows.iter().map(|r| r[3].as_str()).collect();
        assert_eq!(ranks, vec!["1", "2", "3"]);
    }

    #[rstest]
    fn test_category_outranks_impact() {
        let input = table(&[
            ("vus_high", "Uncertain Significance", "HIGH"),
            ("benign", "Benign", "HIGH"),
            ("path_modifier", "Pathogenic", "MODIFIER"),
            ("junk", "UNPARSEABLE", "HIGH"),
            ("lp_low", "Likely Pathogenic", "LOW"),
            ("path_high", "Pathogenic", "high"),
        ]);
        let ranking = rank_table(&input, &PrioritizeConfig::default()).unwrap();
        assert_eq!(
            ids(&ranking),
            vec!["path_high", "path_modifier", "lp_low", "vus_high", "benign", "junk"]
        );
    }

    #[rstest]
    fn test_missing_impact_sorts_after_modifier() {
        let input = table(&[
            ("a", "Likely Benign", ""),
            ("b", "Likely Benign", "MODIFIER"),
            ("c", "Likely Benign", "."),
        ]);
        let ranking = rank_table(&input, &PrioritizeConfig::default()).unwrap();
        assert_eq!(ids(&ranking), vec!["b", "a", "c"]);
    }

    #[rstest]
    fn test_prefilter_runs_before_truncation() {
        let input = table(&[
            ("b1", "Benign", "HIGH"),
            ("p1", "Pathogenic", "LOW"),
            ("b2", "Benign", "HIGH"),
            ("v1", "Uncertain Significance", "HIGH"),
        ]);
        let config = PrioritizeConfig {
            top_n: 2,
            exclude_benign: true,
            ..Default::default()
        };
        let ranking = rank_table(&input, &config).unwrap();
        assert_eq!(ids(&ranking), vec!["p1", "v1"]);
        assert_eq!(ranking.total, 4);
        assert_eq!(ranking.filtered.benign, 2);
        assert_eq!(ranking.ordered, vec![1, 3]);
    }

    #[rstest]
    fn test_empty_table_ranks_to_empty() {
        let config = PrioritizeConfig {
            top_n: 5,
            ..Default::default()
        };
        let ranking = rank_table(&table(&[]), &config).unwrap();
        assert!(ranking.table.is_empty());
        assert_eq!(ranking.table.schema.len(), 4);
    }

    #[rstest]
    fn test_missing_category_column_is_schema_mismatch() {
        let input = Table::new(Schema::new(vec!["id", "ANN[0].IMPACT"]), vec![]);
        let result = rank_table(&input, &PrioritizeConfig::default());
        assert!(matches!(result, Err(VarconError::SchemaMismatch { .. })));
    }

    #[rstest]
    fn test_rank_column_collision() {
        let input = Table::new(
            Schema::new(vec!["category", "ANN[0].IMPACT", PRIORITY_RANK_COLUMN]),
            vec![],
        );
        let result = rank_table(&input, &PrioritizeConfig::default());
        assert!(matches!(result, Err(VarconError::FieldCollision(_))));
    }

    #[rstest]
    fn test_keys_tie_break_on_position() {
        let first = PriorityKey::new("Pathogenic", "HIGH", 0);
        let second = PriorityKey::new("pathogenic", "high", 1);
        assert!(first < second);
        assert!(PriorityKey::new("Likely Benign", "LOW", 9) < PriorityKey::new("Benign", "HIGH", 0));
    }
}
