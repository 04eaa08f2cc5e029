//! # Input/Output utilities for varcon tables.
//!
//! Every stage output goes through this crate. Files are first written to a
//! temporary sibling and only renamed into place once fully written, so a
//! failing stage never leaves a truncated artifact behind and a re-run can
//! safely replace its own previous output.
//!
pub mod atomic;
pub mod error;
pub mod format;
pub mod table;

// re-expose core functions
pub use atomic::*;
pub use error::*;
pub use format::*;
pub use table::*;
