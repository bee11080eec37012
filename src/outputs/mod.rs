//! Output generation.
//!
//! # Submodules
//!
//! - [`json`]: per-category, global and metrics JSON snapshots consumed by
//!   the static site build

pub mod json;
