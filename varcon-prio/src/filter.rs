//! Record prefilters applied before ranking. Each one is off unless
//! configured, and every record a filter drops is counted against it.

use fxhash::FxHashSet;
use serde::Serialize;

use varcon_acmg::AcmgCategory;
use varcon_core::errors::Result;
use varcon_core::models::{Row, Table};
use varcon_core::utils::read_list_file;

use crate::config::PrioritizeConfig;

const STAGE: &str = "prioritize";

///
/// Number of records each prefilter dropped.
///
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FilterCounts {
    pub benign: usize,
    pub population_af: usize,
    pub cadd: usize,
    pub gene: usize,
}

impl FilterCounts {
    pub fn total(&self) -> usize {
        self.benign + self.population_af + self.cadd + self.gene
    }
}

///
/// Prefilters resolved against one table's schema.
///
#[derive(Debug, Default)]
pub struct Prefilter {
    benign: Option<usize>,
    max_population_af: Option<(usize, f64)>,
    min_cadd: Option<(usize, f64)>,
    genes: Option<(usize, FxHashSet<String>)>,
}

impl Prefilter {
    ///
    /// Resolve the configured prefilters. Only columns of enabled filters are
    /// required to exist.
    ///
    /// # Arguments
    /// - table: the table to be filtered
    /// - config: ranker configuration
    ///
    pub fn new(table: &Table, config: &PrioritizeConfig) -> Result<Self> {
        let benign = if config.exclude_benign {
            Some(table.require(&config.category_column, STAGE)?)
        } else {
            None
        };

        let max_population_af = match config.max_population_af {
            Some(threshold) => Some((table.require(&config.population_af_column, STAGE)?, threshold)),
            None => None,
        };

        let min_cadd = match config.min_cadd {
            Some(threshold) => Some((table.require(&config.cadd_column, STAGE)?, threshold)),
            None => None,
        };

        let genes = match &config.genes {
            Some(path) => {
                let column = table.require(&config.gene_column, STAGE)?;
                let genes: FxHashSet<String> = read_list_file(path)?.into_iter().collect();
                Some((column, genes))
            }
            None => None,
        };

        Ok(Prefilter {
            benign,
            max_population_af,
            min_cadd,
            genes,
        })
    }

    pub fn is_active(&self) -> bool {
        self.benign.is_some()
            || self.max_population_af.is_some()
            || self.min_cadd.is_some()
            || self.genes.is_some()
    }

    ///
    /// Decide whether a record survives. The first filter that rejects it is
    /// charged in `counts`.
    ///
    pub fn keep(&self, row: &Row, counts: &mut FilterCounts) -> bool {
        let value = |column: usize| row.get(column).map(String::as_str).unwrap_or("");

        if let Some(column) = self.benign {
            let category = value(column).parse::<AcmgCategory>().unwrap_or(AcmgCategory::Unparseable);
            if category == AcmgCategory::Benign {
                counts.benign += 1;
                return false;
            }
        }

        if let Some((column, threshold)) = self.max_population_af {
            if parse_score(value(column)).is_some_and(|af| af > threshold) {
                counts.population_af += 1;
                return false;
            }
        }

        if let Some((column, threshold)) = self.min_cadd {
            if parse_score(value(column)).is_some_and(|score| score < threshold) {
                counts.cadd += 1;
                return false;
            }
        }

        if let Some((column, genes)) = &self.genes {
            if !genes.contains(value(*column)) {
                counts.gene += 1;
                return false;
            }
        }

        true
    }
}

/// Missing annotations (`.`, empty) never drop a record.
fn parse_score(value: &str) -> Option<f64> {
    match value.trim() {
        "" | "." => None,
        v => v.parse::<f64>().ok().filter(|x| !x.is_nan()),
    }
}
