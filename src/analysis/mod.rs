//! Query and aggregation steps over a `SalesTable`.
//!
//! Each step is independent and read-only:
//!
//! - partition + aggregate (`group`)
//! - region x product cross-tabulation (`pivot`)
//! - monthly series, growth, cumulative and rolling views (`trend`)
//! - Pearson correlation between measures (`correlation`)

pub mod correlation;
pub mod group;
pub mod pivot;
pub mod trend;

pub use correlation::*;
pub use group::*;
pub use pivot::*;
pub use trend::*;
