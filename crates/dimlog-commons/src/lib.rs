//! # dimlog-commons
//!
//! Shared types, identifiers, and errors for dimlog.
//!
//! This crate provides the foundational data model used across the dimlog
//! crates (dimlog-core, dimlog-store). It has no dependency on the other
//! workspace members to prevent circular dependency issues.
//!
//! ## Type-Safe Wrappers
//!
//! - `EntityKey`: natural key of a dimension record
//! - `CommitSeq`: Snowflake-backed commit sequence with an open-interval sentinel
//! - `CommitSeqGenerator`: strictly increasing commit sequence source
//!
//! ## Change Feed Model
//!
//! - `ChangeRecord` / `ChangeType`: the immutable unit of the change log
//! - `Scd2Row`: a derived dimension version with validity interval
//! - `AttributeRow`: the dimension payload (field name -> JSON value)
//! - `SourceRow` / `DimensionState`: merge input and projected output

pub mod errors;
pub mod ids;
pub mod models;
pub mod storage_key;

pub use errors::{DimLogError, Result};
pub use ids::{CommitSeq, CommitSeqGenerator, EntityKey};
pub use models::{
    AttributeRow, AttributeValue, ChangeRecord, ChangeType, DimensionState, Scd2Row, SourceRow,
};
pub use storage_key::StorageKey;
