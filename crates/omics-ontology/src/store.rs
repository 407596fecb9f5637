//! Graph store
//!
//! [`Ontology`] owns the canonical term graph of one source together with its
//! node list, annotation records and InterPro protein matches. Relation-filtered views of the graph are
//! memoised per relation set until [`Ontology::invalidate`] is called.

use crate::annotation::{self, AnnotationSet, AnnotationTable};
use crate::error::{OntologyError, Result};
use crate::graph::TermGraph;
use crate::loader::load_network;
use crate::models::{RelationshipType, Term, TermId};
use crate::parser::{GafParser, InterProMatch, InterProParser};
use omics_common::{FileResources, SourceConfig};
use serde::Serialize;
use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Cache key: sorted, deduplicated relation names
type SubgraphKey = Vec<String>;

#[derive(Debug)]
pub struct Ontology {
    source: SourceConfig,
    graph: Arc<TermGraph>,
    node_list: Vec<TermId>,
    subgraphs: RefCell<HashMap<SubgraphKey, Arc<TermGraph>>>,
    annotations: AnnotationTable,
    interpro_matches: Vec<InterProMatch>,
}

impl Ontology {
    /// Wrap an already built graph; the node list follows graph order
    pub fn new(source: SourceConfig, graph: TermGraph) -> Self {
        let node_list = graph.node_ids().map(str::to_string).collect();
        Ontology {
            source,
            graph: Arc::new(graph),
            node_list,
            subgraphs: RefCell::new(HashMap::new()),
            annotations: AnnotationTable::default(),
            interpro_matches: Vec::new(),
        }
    }

    /// Load the hierarchy and any annotation files found in `resources`
    pub fn load(source: SourceConfig, resources: &FileResources) -> Result<Self> {
        info!(source = %source.name, resources = resources.len(), "Loading ontology");

        let (mut graph, node_list) = load_network(resources)?;
        Self::attach_interpro_metadata(&mut graph, resources)?;

        let mut annotations = AnnotationTable::default();
        for name in resources.names().filter(|n| n.contains(".gaf")) {
            let file = GafParser::parse(resources.open(name)?)?;
            info!(
                resource = name,
                records = file.records.len(),
                skipped = file.skipped,
                "Loaded annotations"
            );
            annotations.extend(file.records);
        }

        let mut interpro_matches = Vec::new();
        for name in resources.names().filter(|n| n.contains("protein2ipr")) {
            let matches = InterProParser::parse_protein2ipr(resources.open(name)?)?;
            info!(resource = name, matches = matches.len(), "Loaded InterPro matches");
            interpro_matches.extend(matches);
        }

        Ok(Ontology {
            source,
            graph: Arc::new(graph),
            node_list,
            subgraphs: RefCell::new(HashMap::new()),
            annotations,
            interpro_matches,
        })
    }

    /// Entry types from `entry.list` and GO cross references from `interpro2go`
    fn attach_interpro_metadata(graph: &mut TermGraph, resources: &FileResources) -> Result<()> {
        if resources.contains("entry.list") {
            let entries = InterProParser::parse_entries(resources.open("entry.list")?)?;
            let mut matched = 0usize;
            for entry in &entries {
                if let Some(term) = graph.term_mut(&entry.accession) {
                    term.namespace = Some(entry.entry_type.clone());
                    if term.name.is_none() {
                        term.name = Some(entry.name.clone());
                    }
                    matched += 1;
                }
            }
            debug!(entries = entries.len(), matched, "Attached InterPro entry types");
        }

        if resources.contains("interpro2go") {
            let mappings = InterProParser::parse_interpro2go(resources.open("interpro2go")?)?;
            for mapping in mappings {
                if let Some(term) = graph.term_mut(&mapping.accession) {
                    if !term.xrefs.contains(&mapping.go_id) {
                        term.xrefs.push(mapping.go_id);
                    }
                }
            }
        }
        Ok(())
    }

    pub fn with_annotations(mut self, annotations: AnnotationTable) -> Self {
        self.annotations = annotations;
        self
    }

    pub fn with_interpro_matches(mut self, matches: Vec<InterProMatch>) -> Self {
        self.interpro_matches = matches;
        self
    }

    pub fn source(&self) -> &SourceConfig {
        &self.source
    }

    /// The canonical graph
    pub fn graph(&self) -> &Arc<TermGraph> {
        &self.graph
    }

    pub fn node_list(&self) -> &[TermId] {
        &self.node_list
    }

    pub fn term(&self, id: &str) -> Option<&Term> {
        self.graph.term(id)
    }

    pub fn terms(&self) -> impl Iterator<Item = &Term> {
        self.graph.terms()
    }

    pub fn len(&self) -> usize {
        self.node_list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.node_list.is_empty()
    }

    pub fn annotations(&self) -> &AnnotationTable {
        &self.annotations
    }

    pub fn interpro_matches(&self) -> &[InterProMatch] {
        &self.interpro_matches
    }

    /// Protein -> matched InterPro entries, each entry once in first-seen order.
    ///
    /// With `proteins`, rows follow that list and proteins without any match are
    /// absent cells; otherwise every matched protein in first-seen order.
    pub fn entry_annotations(&self, proteins: Option<&[String]>) -> AnnotationSet {
        let mut order: Vec<&str> = Vec::new();
        let mut entries: HashMap<&str, Vec<TermId>> = HashMap::new();
        let mut seen: HashSet<(&str, &str)> = HashSet::new();

        for m in &self.interpro_matches {
            if !seen.insert((m.protein.as_str(), m.accession.as_str())) {
                continue;
            }
            entries
                .entry(m.protein.as_str())
                .or_insert_with(|| {
                    order.push(m.protein.as_str());
                    Vec::new()
                })
                .push(m.accession.clone());
        }

        match proteins {
            Some(proteins) => proteins
                .iter()
                .map(|p| (p.as_str(), entries.get(p.as_str()).cloned()))
                .collect(),
            None => order
                .into_iter()
                .map(|p| (p, entries.remove(p)))
                .collect(),
        }
    }

    /// Edge-induced subgraph over `relations`. An empty slice returns the
    /// canonical graph.
    pub fn subgraph(&self, relations: &[RelationshipType]) -> Arc<TermGraph> {
        if relations.is_empty() {
            return Arc::clone(&self.graph);
        }

        let mut key: SubgraphKey = relations.iter().map(|r| r.as_str().to_string()).collect();
        key.sort();
        key.dedup();

        let mut cache = self.subgraphs.borrow_mut();
        if let Some(cached) = cache.get(&key) {
            return Arc::clone(cached);
        }

        let subgraph = Arc::new(self.graph.edge_subgraph(relations));
        debug!(
            relations = ?key,
            terms = subgraph.len(),
            edges = subgraph.edge_count(),
            "Built subgraph"
        );
        cache.insert(key, Arc::clone(&subgraph));
        subgraph
    }

    /// Number of memoised subgraphs
    pub fn cached_subgraphs(&self) -> usize {
        self.subgraphs.borrow().len()
    }

    pub fn invalidate(&self) {
        self.subgraphs.borrow_mut().clear();
    }

    /// Keep only terms of `namespace`. Cannot be undone without reloading.
    pub fn filter_to_namespace(&mut self, namespace: &str) {
        let keep: Vec<TermId> = self
            .node_list
            .iter()
            .filter(|id| self.graph.term(id).is_some_and(|t| t.in_namespace(namespace)))
            .cloned()
            .collect();

        if keep.is_empty() {
            warn!(namespace, "No terms in namespace; ontology is now empty");
        }
        info!(
            namespace,
            before = self.node_list.len(),
            after = keep.len(),
            "Filtered ontology to namespace"
        );

        self.graph = Arc::new(self.graph.induced_subgraph(keep.iter().map(String::as_str)));
        self.node_list = keep;
        self.invalidate();
    }

    /// Fail with `InconsistentNodeSet` unless every id is in the node list
    pub fn check_known<'a>(&self, ids: impl IntoIterator<Item = &'a str>) -> Result<()> {
        let missing: Vec<String> = ids
            .into_iter()
            .filter(|id| !self.graph.contains(id))
            .map(str::to_string)
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(OntologyError::InconsistentNodeSet { missing })
        }
    }

    /// Sparse child -> parent edge count matrix over `node_list`, or over the
    /// canonical node list
    pub fn adjacency(&self, node_list: Option<&[TermId]>) -> Result<AdjacencyMatrix> {
        let nodes = node_list.unwrap_or(&self.node_list);
        self.check_known(nodes.iter().map(String::as_str))?;

        let position: HashMap<&str, usize> = nodes
            .iter()
            .enumerate()
            .map(|(i, id)| (id.as_str(), i))
            .collect();

        let mut entries = BTreeMap::new();
        for (source, target, _) in self.graph.edges() {
            if let (Some(&row), Some(&col)) = (position.get(source), position.get(target)) {
                *entries.entry((row, col)).or_insert(0u32) += 1;
            }
        }

        Ok(AdjacencyMatrix {
            nodes: nodes.to_vec(),
            entries,
        })
    }

    /// Union each entity's terms with their ancestors over `relations`
    pub fn add_ancestors(&self, set: &AnnotationSet, relations: &[RelationshipType]) -> AnnotationSet {
        annotation::add_ancestors(set, &self.subgraph(relations))
    }

    /// Intersect every term list with the node list; absent cells become empty
    pub fn restrict_to_known_terms(&self, set: &AnnotationSet) -> AnnotationSet {
        set.map_terms(|terms| {
            terms
                .iter()
                .filter(|t| self.graph.contains(t))
                .cloned()
                .collect()
        })
    }

    pub fn info(&self) -> OntologyInfo {
        OntologyInfo {
            source: self.source.name.clone(),
            terms: self.graph.len(),
            edges: self.graph.edge_count(),
            relations: self.graph.relation_counts(),
            annotations: self.annotations.len(),
        }
    }
}

/// Summary counts of a loaded ontology
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OntologyInfo {
    pub source: String,
    pub terms: usize,
    pub edges: usize,
    pub relations: BTreeMap<String, usize>,
    pub annotations: usize,
}

impl fmt::Display for OntologyInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "source\t{}", self.source)?;
        writeln!(f, "terms\t{}", self.terms)?;
        writeln!(f, "edges\t{}", self.edges)?;
        for (relation, count) in &self.relations {
            writeln!(f, "  {}\t{}", relation, count)?;
        }
        write!(f, "annotations\t{}", self.annotations)
    }
}

/// Sparse square matrix in (row, col) -> count form. Rows are children,
/// columns are parents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdjacencyMatrix {
    nodes: Vec<TermId>,
    entries: BTreeMap<(usize, usize), u32>,
}

impl AdjacencyMatrix {
    pub fn nodes(&self) -> &[TermId] {
        &self.nodes
    }

    pub fn size(&self) -> usize {
        self.nodes.len()
    }

    /// Number of non-zero cells
    pub fn nnz(&self) -> usize {
        self.entries.len()
    }

    pub fn get(&self, row: usize, col: usize) -> u32 {
        self.entries.get(&(row, col)).copied().unwrap_or(0)
    }

    pub fn row_sums(&self) -> Vec<u32> {
        let mut sums = vec![0; self.nodes.len()];
        for (&(row, _), &count) in &self.entries {
            sums[row] += count;
        }
        sums
    }

    pub fn col_sums(&self) -> Vec<u32> {
        let mut sums = vec![0; self.nodes.len()];
        for (&(_, col), &count) in &self.entries {
            sums[col] += count;
        }
        sums
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    /// d -is_a-> b -is_a-> a, c -part_of-> a; a, b in "x", c, d in "y"
    fn ontology() -> Ontology {
        let mut g = TermGraph::new();
        g.add_term(Term::new("a").with_namespace("x"));
        g.add_term(Term::new("b").with_namespace("x"));
        g.add_term(Term::new("c").with_namespace("y"));
        g.add_term(Term::new("d").with_namespace("y"));
        g.add_edge("b", "a", RelationshipType::IsA);
        g.add_edge("d", "b", RelationshipType::IsA);
        g.add_edge("c", "a", RelationshipType::PartOf);
        Ontology::new(SourceConfig::new("test", "/tmp"), g)
    }

    #[test]
    fn test_subgraph_is_cached_per_normalised_key() {
        let ont = ontology();
        let first = ont.subgraph(&[RelationshipType::PartOf, RelationshipType::IsA]);
        let second = ont.subgraph(&[
            RelationshipType::IsA,
            RelationshipType::PartOf,
            RelationshipType::IsA,
        ]);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(ont.cached_subgraphs(), 1);

        ont.invalidate();
        assert_eq!(ont.cached_subgraphs(), 0);
        let third = ont.subgraph(&[RelationshipType::IsA, RelationshipType::PartOf]);
        assert!(!Arc::ptr_eq(&first, &third));
    }

    #[test]
    fn test_empty_relation_filter_returns_canonical_graph() {
        let ont = ontology();
        assert!(Arc::ptr_eq(&ont.subgraph(&[]), ont.graph()));
        assert_eq!(ont.cached_subgraphs(), 0);
    }

    #[test]
    fn test_filter_to_namespace() {
        let mut ont = ontology();
        ont.subgraph(&[RelationshipType::IsA]);
        ont.filter_to_namespace("x");

        assert_eq!(ont.node_list(), &["a".to_string(), "b".to_string()]);
        assert_eq!(ont.graph().edge_count(), 1);
        assert_eq!(ont.cached_subgraphs(), 0);
        assert!(ont.term("d").is_none());
    }

    #[test]
    fn test_adjacency_sums() {
        let ont = ontology();
        let adj = ont.adjacency(None).unwrap();
        assert_eq!(adj.size(), 4);
        assert_eq!(adj.nnz(), 3);
        assert_eq!(adj.get(1, 0), 1);
        // rows: outgoing (parents), cols: incoming (children)
        assert_eq!(adj.row_sums(), vec![0, 1, 1, 1]);
        assert_eq!(adj.col_sums(), vec![2, 1, 0, 0]);
    }

    #[test]
    fn test_adjacency_rejects_unknown_nodes() {
        let ont = ontology();
        let nodes = vec!["a".to_string(), "nope".to_string()];
        let err = ont.adjacency(Some(&nodes)).unwrap_err();
        assert!(matches!(
            err,
            OntologyError::InconsistentNodeSet { ref missing } if missing == &["nope".to_string()]
        ));

        let sub = vec!["a".to_string(), "b".to_string()];
        assert_eq!(ont.adjacency(Some(&sub)).unwrap().nnz(), 1);
    }

    #[test]
    fn test_restrict_to_known_terms() {
        let ont = ontology();
        let set: AnnotationSet = vec![
            ("g1", Some(vec!["a".to_string(), "zzz".to_string()])),
            ("g2", None),
        ]
        .into_iter()
        .collect();
        let out = ont.restrict_to_known_terms(&set);
        assert_eq!(out.get("g1"), Some(&Some(vec!["a".to_string()])));
        assert_eq!(out.get("g2"), Some(&Some(Vec::new())));
    }

    #[test]
    fn test_load_interpro_resources() {
        let resources = FileResources::new()
            .with_inline("ParentChildTreeFile.txt", "IPR1::Root::\n--IPR2::Child::\n")
            .with_inline(
                "entry.list",
                "ENTRY_AC\tENTRY_TYPE\tENTRY_NAME\nIPR1\tFamily\tRoot\nIPR2\tDomain\tChild\n",
            )
            .with_inline("interpro2go", "InterPro:IPR2 Child > GO:DNA binding ; GO:0003677\n");

        let ont = Ontology::load(SourceConfig::interpro(), &resources).unwrap();
        assert_eq!(ont.len(), 2);
        assert!(ont.term("IPR2").unwrap().in_namespace("Domain"));
        assert_eq!(ont.term("IPR2").unwrap().xrefs, vec!["GO:0003677"]);
        assert_eq!(ont.info().relations.get("is_a"), Some(&1));
        assert!(ont.interpro_matches().is_empty());
    }

    #[test]
    fn test_load_protein2ipr_matches() {
        let resources = FileResources::new()
            .with_inline("ParentChildTreeFile.txt", "IPR1::Root::\n--IPR2::Child::\n")
            .with_inline(
                "protein2ipr.dat",
                "P1\tIPR2\tChild\tPF1\t1\t50\n\
P1\tIPR2\tChild\tPS2\t3\t48\n\
P1\tIPR1\tRoot\tPF9\t60\t90\n\
P2\tIPR9\tOther\tPF3\t5\t20\n",
            );

        let ont = Ontology::load(SourceConfig::interpro(), &resources).unwrap();
        assert_eq!(ont.interpro_matches().len(), 4);

        let all = ont.entry_annotations(None);
        assert_eq!(all.len(), 2);
        assert_eq!(
            all.get("P1"),
            Some(&Some(vec!["IPR2".to_string(), "IPR1".to_string()]))
        );

        let proteins = vec!["P2".to_string(), "P3".to_string()];
        let picked = ont.entry_annotations(Some(&proteins));
        assert_eq!(picked.get("P2"), Some(&Some(vec!["IPR9".to_string()])));
        assert_eq!(picked.get("P3"), Some(&None));

        let known = ont.restrict_to_known_terms(&picked);
        assert_eq!(known.get("P2"), Some(&Some(Vec::new())));
    }
}
