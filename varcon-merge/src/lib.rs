//! # varcon-merge
//!
//! Joins classifier output with projected VCF annotations on the
//! original-input key. Every input row ends up in exactly one of three
//! artifacts: the merged table, the classifier-side unmatched table or the
//! vcf-side unmatched table.
//!
pub mod join;
pub mod models;

pub use join::{JoinResult, MergeOptions, MergeOutputs, MergeReport, join, merge};
pub use models::{
    Discriminator, MergedRecord, Provenance, UNMATCHED_REASON_COLUMN, UnmatchedReason,
    UnmatchedRecord,
};
