//! # varcon-reconcile
//!
//! The two stages that sit directly on the VCF side of the pipeline:
//!
//! - the Coordinate [reconciler], which attaches each variant's original-input
//!   coordinates as `AVINPUT*` INFO keys before any tool re-normalizes it
//! - the Field [projector], which flattens the annotated VCF into a table whose
//!   leading key is that original coordinate
//!
//! plus [chrconv], the contig-naming adapter for classifier tables.
//!
pub mod chrconv;
pub mod consts;
pub mod encoding;
pub mod fields;
pub mod projector;
pub mod reconciler;
pub mod vcf;

pub use chrconv::{ChrConvReport, chrconv, convert_chromosomes};
pub use projector::{ProjectOptions, ProjectReport, Projection, project, project_vcf};
pub use reconciler::{ReconcileOptions, ReconcileReport, detect_vcf_offset, reconcile};
pub use vcf::{VcfFile, VcfHeader, VcfRecord};
