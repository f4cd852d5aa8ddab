//! Dataset construction and the in-memory table.
//!
//! - synthetic row generation (`sample`)
//! - the queryable table structure (`table`)

pub mod sample;
pub mod table;

pub use sample::*;
pub use table::*;
