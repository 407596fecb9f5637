//! Omics Common Library
//!
//! Shared plumbing for the omics workspace members.
//!
//! # Overview
//!
//! - **Error Handling**: [`OmicsError`] and the [`Result`] alias
//! - **Logging**: `tracing` subscriber setup driven by [`logging::LogConfig`]
//! - **Resources**: logical file name to path/in-memory mapping with gzip support
//! - **Sources**: immutable per-database configurations and their registry
//!
//! # Example
//!
//! ```no_run
//! use omics_common::resources::FileResources;
//! use std::io::BufRead;
//!
//! fn count_lines() -> omics_common::Result<usize> {
//!     let mut resources = FileResources::new();
//!     resources.insert_path("go-basic.obo", "/data/go-basic.obo");
//!     let reader = resources.open("go-basic.obo")?;
//!     Ok(reader.lines().count())
//! }
//! ```

#![deny(clippy::unwrap_used, clippy::expect_used)]

pub mod error;
pub mod logging;
pub mod resources;
pub mod sources;

// Re-export commonly used types
pub use error::{OmicsError, Result};
pub use resources::{FileResources, Resource};
pub use sources::{SourceConfig, SourceRegistry};
