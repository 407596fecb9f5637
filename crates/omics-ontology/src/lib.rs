//! Omics Ontology Library
//!
//! Loads biological ontologies (Gene Ontology, Human Phenotype Ontology,
//! InterPro) into a typed term graph and answers structural questions about
//! them.
//!
//! # Overview
//!
//! - **Loader**: OBO and dash-indented tree files, normalised to child -> parent edges
//! - **Store**: [`Ontology`] owns the canonical graph, node list and annotation
//!   records, and memoises relation-filtered subgraphs
//! - **Traversal**: ancestor/descendant closures, roots, leaves, root-to-leaf
//!   paths with duplicate-prefix removal
//! - **Propagation**: extend annotation sets with ancestor terms
//! - **Splitting**: time-split GAF annotations into train/valid/test tables
//!
//! # Example
//!
//! ```no_run
//! use omics_common::{FileResources, SourceConfig};
//! use omics_ontology::{Ontology, RelationshipType};
//!
//! fn main() -> anyhow::Result<()> {
//!     let resources = FileResources::new()
//!         .with_path("go-basic.obo", "/data/go-basic.obo")
//!         .with_path("goa_human.gaf.gz", "/data/goa_human.gaf.gz");
//!     let ontology = Ontology::load(SourceConfig::gene_ontology("human"), &resources)?;
//!
//!     let ancestors = ontology.ancestors_of(["GO:0006915"], &[RelationshipType::IsA])?;
//!     println!("{} ancestors", ancestors.len());
//!     Ok(())
//! }
//! ```

#![deny(clippy::unwrap_used, clippy::expect_used)]

pub mod annotation;
pub mod config;
pub mod error;
pub mod graph;
pub mod loader;
pub mod models;
pub mod output;
pub mod parser;
pub mod split;
pub mod store;
pub mod traversal;

// Re-export commonly used types
pub use annotation::{add_ancestors, AnnotationSet, AnnotationTable, RemoteFetch};
pub use config::{Aggregation, AppConfig, SplitConfig, TestWindow};
pub use error::{OntologyError, Result};
pub use graph::TermGraph;
pub use loader::{load_network, HierarchyFormat};
pub use models::{AnnotationField, AnnotationRecord, EvidenceCode, RelationshipType, Term, TermId};
pub use split::{
    split_annotations, AnnotationSplits, SplitCounts, SplitRow, SplitTable, TermAggregator,
    UniqueTerms, WithAncestors,
};
pub use store::{AdjacencyMatrix, Ontology, OntologyInfo};
pub use traversal::PathTable;
