//! # varcon-acmg
//!
//! ACMG classification handling: decomposing the classifier's composite
//! string into a category and its rule evidence, and grading variants of
//! uncertain significance into hot, middle and cold sub-tiers.
//!
pub mod consts;
pub mod models;
pub mod split;
pub mod vus;

pub use consts::*;
pub use models::{AcmgCategory, ClassificationField, Grammar, RuleEvidence, decompose};
pub use split::{SplitOptions, SplitReport, find_classification_column, split, split_table};
pub use vus::{EvidenceCounts, VusReport, VusTier, classify, subclassify, subclassify_table, vus};
