//! # varcon-core
//!
//! Shared data model for the variant reconciliation stages:
//!
//! - [`OriginalKey`](models::OriginalKey): the immutable original-input identity a variant
//!   keeps while other tools split and realign it
//! - [`ChromNaming`](models::ChromNaming): the contig naming adapter applied before every join
//! - [`Schema`](models::Schema) and [`Table`](models::Table): declared, named columns
//!   checked at each stage boundary
//!
pub mod errors;
pub mod models;
pub mod utils;

pub use errors::{Result, VarconError};
