//! Term graph: a directed multigraph of terms with labelled edges
//!
//! Edges point from the more specific term to the more general one
//! (child -> parent), so "ancestors" are found by following outgoing edges.
//! Several relation types may connect the same ordered pair.

use crate::models::{RelationshipType, Term};
use petgraph::graph::{DiGraph, EdgeIndex, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};

#[derive(Debug, Clone, Default)]
pub struct TermGraph {
    graph: DiGraph<Term, RelationshipType>,
    index: HashMap<String, NodeIndex>,
}

impl TermGraph {
    pub fn new() -> Self {
        Self::default()
    }

    fn from_graph(graph: DiGraph<Term, RelationshipType>) -> Self {
        let index = graph
            .node_indices()
            .map(|idx| (graph[idx].id.clone(), idx))
            .collect();
        TermGraph { graph, index }
    }

    /// Add a term; a term id already present keeps its first record
    pub fn add_term(&mut self, term: Term) -> NodeIndex {
        if let Some(&idx) = self.index.get(&term.id) {
            return idx;
        }
        let id = term.id.clone();
        let idx = self.graph.add_node(term);
        self.index.insert(id, idx);
        idx
    }

    /// Add an edge between two existing terms. Returns false if either is unknown.
    pub fn add_edge(&mut self, source: &str, target: &str, relation: RelationshipType) -> bool {
        match (self.index.get(source), self.index.get(target)) {
            (Some(&s), Some(&t)) => {
                self.graph.add_edge(s, t, relation);
                true
            },
            _ => false,
        }
    }

    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn term(&self, id: &str) -> Option<&Term> {
        self.index.get(id).map(|&idx| &self.graph[idx])
    }

    pub(crate) fn term_mut(&mut self, id: &str) -> Option<&mut Term> {
        let idx = *self.index.get(id)?;
        Some(&mut self.graph[idx])
    }

    /// Terms in insertion order
    pub fn terms(&self) -> impl Iterator<Item = &Term> {
        self.graph.node_indices().map(move |idx| &self.graph[idx])
    }

    /// Term ids in insertion order
    pub fn node_ids(&self) -> impl Iterator<Item = &str> {
        self.terms().map(|t| t.id.as_str())
    }

    /// Every edge as (source, target, relation), in insertion order
    pub fn edges(&self) -> impl Iterator<Item = (&str, &str, &RelationshipType)> {
        self.graph.edge_references().map(move |e| {
            (
                self.graph[e.source()].id.as_str(),
                self.graph[e.target()].id.as_str(),
                e.weight(),
            )
        })
    }

    /// Whether an edge labelled `relation` goes from `source` to `target`
    pub fn has_edge(&self, source: &str, target: &str, relation: &RelationshipType) -> bool {
        let (Some(&s), Some(&t)) = (self.index.get(source), self.index.get(target)) else {
            return false;
        };
        self.graph
            .edges_connecting(s, t)
            .any(|e| e.weight() == relation)
    }

    /// Number of edges per relation type
    pub fn relation_counts(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for edge in self.graph.edge_references() {
            *counts.entry(edge.weight().as_str().to_string()).or_insert(0) += 1;
        }
        counts
    }

    /// Distinct parents of `id` (targets of its outgoing edges)
    pub fn parents(&self, id: &str) -> Vec<&str> {
        self.neighbors(id, Direction::Outgoing)
    }

    /// Distinct children of `id` (sources of its incoming edges)
    pub fn children(&self, id: &str) -> Vec<&str> {
        self.neighbors(id, Direction::Incoming)
    }

    fn neighbors(&self, id: &str, direction: Direction) -> Vec<&str> {
        match self.index.get(id) {
            Some(&idx) => self
                .neighbor_indices(idx, direction)
                .into_iter()
                .map(|n| self.graph[n].id.as_str())
                .collect(),
            None => Vec::new(),
        }
    }

    /// Distinct neighbours in edge insertion order
    pub(crate) fn neighbor_indices(&self, idx: NodeIndex, direction: Direction) -> Vec<NodeIndex> {
        let mut edges: Vec<(EdgeIndex, NodeIndex)> = self
            .graph
            .edges_directed(idx, direction)
            .map(|e| {
                let other = match direction {
                    Direction::Outgoing => e.target(),
                    Direction::Incoming => e.source(),
                };
                (e.id(), other)
            })
            .collect();
        edges.sort_by_key(|(edge, _)| *edge);

        let mut seen = HashSet::new();
        edges
            .into_iter()
            .filter_map(|(_, n)| seen.insert(n).then_some(n))
            .collect()
    }

    pub(crate) fn index_of(&self, id: &str) -> Option<NodeIndex> {
        self.index.get(id).copied()
    }

    pub(crate) fn id_at(&self, idx: NodeIndex) -> &str {
        &self.graph[idx].id
    }

    /// Every term reachable from `id` through outgoing edges, nearest first.
    /// The term itself is never included.
    pub fn ancestors(&self, id: &str) -> Vec<&str> {
        self.closure(id, Direction::Outgoing)
    }

    /// Every term that reaches `id` through its outgoing edges, nearest first
    pub fn descendants(&self, id: &str) -> Vec<&str> {
        self.closure(id, Direction::Incoming)
    }

    fn closure(&self, id: &str, direction: Direction) -> Vec<&str> {
        let Some(start) = self.index_of(id) else {
            return Vec::new();
        };

        let mut visited = HashSet::from([start]);
        let mut queue = VecDeque::from([start]);
        let mut reached = Vec::new();

        while let Some(node) = queue.pop_front() {
            for next in self.neighbor_indices(node, direction) {
                if visited.insert(next) {
                    reached.push(self.graph[next].id.as_str());
                    queue.push_back(next);
                }
            }
        }

        reached
    }

    /// Subgraph holding only edges labelled with one of `relations`, plus their
    /// endpoints. Term order follows this graph.
    pub fn edge_subgraph(&self, relations: &[RelationshipType]) -> TermGraph {
        let endpoints: HashSet<NodeIndex> = self
            .graph
            .edge_references()
            .filter(|e| relations.contains(e.weight()))
            .flat_map(|e| [e.source(), e.target()])
            .collect();

        let graph = self.graph.filter_map(
            |idx, term| endpoints.contains(&idx).then(|| term.clone()),
            |_, relation| relations.contains(relation).then(|| relation.clone()),
        );
        Self::from_graph(graph)
    }

    /// Subgraph induced by the given term ids; unknown ids are ignored
    pub fn induced_subgraph<'a>(&self, ids: impl IntoIterator<Item = &'a str>) -> TermGraph {
        let keep: HashSet<NodeIndex> = ids
            .into_iter()
            .filter_map(|id| self.index_of(id))
            .collect();

        let graph = self.graph.filter_map(
            |idx, term| keep.contains(&idx).then(|| term.clone()),
            |_, relation| Some(relation.clone()),
        );
        Self::from_graph(graph)
    }

    /// Same terms with every edge flipped
    pub fn reversed(&self) -> TermGraph {
        let mut graph = self.graph.clone();
        graph.reverse();
        TermGraph {
            graph,
            index: self.index.clone(),
        }
    }
}
