//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the categorical dimensions (`Region`, `Product`)
//! - the immutable `SalesRow` record
//! - selectors for queries and charts (`Measure`, `GroupKey`, `Agg`, `ChartKind`)
//! - the resolved run configuration (`AnalysisConfig`)

pub mod types;

pub use types::*;
