//! # dimlog-core
//!
//! SCD2 derivation, merge, and projection engines.
//!
//! Three pure functions over immutable inputs:
//!
//! - [`derive`]: change log -> SCD2 rows with validity intervals, versions,
//!   and active flags
//! - [`merge`]: current dimension state + source batch -> new change
//!   records (insert/update-only upsert)
//! - [`project`]: SCD2 rows -> current dimension state (active subset)
//!
//! [`DimensionPipeline`] wires them to a change log store and a dimension
//! store for the batch round trip: merge, append, re-derive, project,
//! write back.

pub mod derive;
pub mod merge;
pub mod pipeline;
pub mod project;

pub use derive::derive;
pub use merge::merge;
pub use pipeline::{BatchOutcome, DimensionPipeline};
pub use project::project;
