//! # dimlog-store
//!
//! Storage backends and collaborator stores for dimlog.
//!
//! The engines in dimlog-core operate on in-memory values; this crate
//! provides the two external collaborators they read from and write to:
//!
//! - [`ChangeLogStore`]: append-only, commit-ordered log of
//!   [`ChangeRecord`](dimlog_commons::ChangeRecord)s
//! - [`DimensionStore`]: point lookup and full-state swap of the current
//!   dimension rows
//!
//! Both ride on a pluggable [`StorageBackend`] key-value abstraction; an
//! [`InMemoryBackend`] is provided. [`FileChangeLog`] is a standalone
//! file-backed change log for durable replay across process restarts.

pub mod change_log;
pub mod dimension;
pub mod file_log;
pub mod memory;
pub mod storage_trait;

pub use change_log::{ChangeLog, ChangeLogStore};
pub use dimension::DimensionStore;
pub use file_log::FileChangeLog;
pub use memory::InMemoryBackend;
pub use storage_trait::{Operation, Partition, StorageBackend, StorageError};
