//! Output helpers.
//!
//! - dataset export to CSV (`export`)
//! - report summary export to JSON (`summary`)

pub mod export;
pub mod summary;

pub use export::*;
pub use summary::*;
