//! Hierarchy loading
//!
//! Picks the hierarchy file out of a [`FileResources`] set by name, parses it
//! and normalises edge orientation so the resulting graph always points
//! child -> parent.

use crate::error::{OntologyError, Result};
use crate::graph::TermGraph;
use crate::models::TermId;
use crate::parser::{EdgeOrientation, OboParser, ParsedHierarchy, TreeFileParser};
use omics_common::FileResources;
use tracing::{debug, info};

/// Hierarchy file formats recognised by resource name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HierarchyFormat {
    Obo,
    /// Dash-indented InterPro tree
    TreeFile,
}

impl HierarchyFormat {
    pub fn detect(resource_name: &str) -> Option<Self> {
        if resource_name.contains(".obo") {
            Some(HierarchyFormat::Obo)
        } else if resource_name.contains("ParentChildTreeFile") {
            Some(HierarchyFormat::TreeFile)
        } else {
            None
        }
    }
}

/// Load the term graph and its node list from the first hierarchy resource
pub fn load_network(resources: &FileResources) -> Result<(TermGraph, Vec<TermId>)> {
    let Some((name, format)) = resources
        .names()
        .find_map(|name| HierarchyFormat::detect(name).map(|format| (name, format)))
    else {
        let names: Vec<&str> = resources.names().collect();
        return Err(OntologyError::format(format!(
            "no hierarchy file (*.obo or ParentChildTreeFile) among resources: [{}]",
            names.join(", ")
        )));
    };

    info!(resource = name, format = ?format, "Loading hierarchy");
    let reader = resources.open(name)?;
    let parsed = match format {
        HierarchyFormat::Obo => OboParser::parse(reader)?,
        HierarchyFormat::TreeFile => TreeFileParser::parse(reader)?,
    };

    let graph = build_graph(parsed);
    let node_list: Vec<TermId> = graph.node_ids().map(str::to_string).collect();

    info!(
        terms = graph.len(),
        edges = graph.edge_count(),
        "Loaded term graph"
    );
    Ok((graph, node_list))
}

/// Build a child -> parent graph from parser output
pub fn build_graph(parsed: ParsedHierarchy) -> TermGraph {
    let mut graph = TermGraph::new();
    for term in parsed.terms {
        graph.add_term(term);
    }

    let mut dropped = 0usize;
    for edge in &parsed.edges {
        if !graph.add_edge(&edge.source, &edge.target, edge.relation.clone()) {
            debug!(
                source = %edge.source,
                target = %edge.target,
                relation = %edge.relation,
                "Dropping edge to unknown term"
            );
            dropped += 1;
        }
    }
    if dropped > 0 {
        debug!(dropped, "Edges dropped during load");
    }

    match parsed.orientation {
        EdgeOrientation::ChildToParent => graph,
        EdgeOrientation::ParentToChild => graph.reversed(),
    }
}
