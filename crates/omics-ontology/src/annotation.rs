//! Annotation sets and the annotation table
//!
//! An [`AnnotationSet`] maps each entity to an optional list of term ids.
//! An absent cell (`None`) is read as "no terms".

use crate::error::Result;
use crate::graph::TermGraph;
use crate::models::{AnnotationField, AnnotationRecord, TermId};
use regex::Regex;
use std::collections::HashSet;
use std::fmt;
use tracing::warn;

/// Entity -> optional term list, in insertion order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnnotationSet {
    entries: Vec<(String, Option<Vec<TermId>>)>,
}

impl AnnotationSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entity: impl Into<String>, terms: Option<Vec<TermId>>) {
        self.entries.push((entity.into(), terms));
    }

    /// Build from raw cells holding '|' or ';' separated term ids
    pub fn from_delimited<'a, I>(cells: I) -> Result<Self>
    where
        I: IntoIterator<Item = (&'a str, Option<&'a str>)>,
    {
        let delimiter = Regex::new(r"[|;]")?;
        let entries = cells
            .into_iter()
            .map(|(entity, cell)| {
                let terms = cell.map(|raw| {
                    delimiter
                        .split(raw)
                        .map(str::trim)
                        .filter(|t| !t.is_empty())
                        .map(str::to_string)
                        .collect()
                });
                (entity.to_string(), terms)
            })
            .collect();
        Ok(AnnotationSet { entries })
    }

    /// Group records' term ids by `entity_field`, first-seen order, no duplicates
    pub fn from_records(records: &[AnnotationRecord], entity_field: AnnotationField) -> Self {
        let mut set = AnnotationSet::new();
        let mut positions = std::collections::HashMap::new();

        for record in records {
            let entity = entity_field.value(record);
            let pos = *positions.entry(entity.clone()).or_insert_with(|| {
                set.push(entity, Some(Vec::new()));
                set.entries.len() - 1
            });
            if let Some(terms) = &mut set.entries[pos].1 {
                if !terms.contains(&record.term_id) {
                    terms.push(record.term_id.clone());
                }
            }
        }
        set
    }

    pub fn get(&self, entity: &str) -> Option<&Option<Vec<TermId>>> {
        self.entries.iter().find(|(e, _)| e == entity).map(|(_, t)| t)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&[TermId]>)> {
        self.entries
            .iter()
            .map(|(e, t)| (e.as_str(), t.as_deref()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Apply `f` to every term list; absent cells are handed over as empty
    pub(crate) fn map_terms(&self, mut f: impl FnMut(&[TermId]) -> Vec<TermId>) -> AnnotationSet {
        let entries = self
            .entries
            .iter()
            .map(|(entity, terms)| (entity.clone(), Some(f(terms.as_deref().unwrap_or(&[])))))
            .collect();
        AnnotationSet { entries }
    }

    pub(crate) fn absent_count(&self) -> usize {
        self.entries.iter().filter(|(_, t)| t.is_none()).count()
    }
}

impl<E: Into<String>> FromIterator<(E, Option<Vec<TermId>>)> for AnnotationSet {
    fn from_iter<I: IntoIterator<Item = (E, Option<Vec<TermId>>)>>(iter: I) -> Self {
        AnnotationSet {
            entries: iter.into_iter().map(|(e, t)| (e.into(), t)).collect(),
        }
    }
}

/// `terms` followed by their ancestors in `graph`, first-seen order, no duplicates.
/// Terms missing from `graph` are kept and contribute nothing.
pub fn with_ancestors(terms: &[TermId], graph: &TermGraph) -> Vec<TermId> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut out = Vec::new();

    for term in terms {
        if seen.insert(term.as_str()) {
            out.push(term.clone());
        }
        for ancestor in graph.ancestors(term) {
            if seen.insert(ancestor) {
                out.push(ancestor.to_string());
            }
        }
    }
    out
}

/// Union every entity's terms with their ancestor closure in `graph`
pub fn add_ancestors(set: &AnnotationSet, graph: &TermGraph) -> AnnotationSet {
    let absent = set.absent_count();
    if absent > 0 {
        warn!(absent, "Annotation cells without terms treated as empty");
    }
    set.map_terms(|terms| with_ancestors(terms, graph))
}

// ============================================================================
// Annotation Table
// ============================================================================

/// Equality filters on record fields
pub type AnnotationFilters = [(AnnotationField, String)];

/// Source of annotation records held outside the local files
pub trait RemoteFetch {
    fn fetch(&self, filters: &AnnotationFilters) -> Result<Vec<AnnotationRecord>>;
}

/// Annotation records of a source, with an optional remote backend
#[derive(Default)]
pub struct AnnotationTable {
    records: Vec<AnnotationRecord>,
    remote: Option<Box<dyn RemoteFetch>>,
}

impl fmt::Debug for AnnotationTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnnotationTable")
            .field("records", &self.records.len())
            .field("remote", &self.remote.is_some())
            .finish()
    }
}

impl AnnotationTable {
    pub fn new(records: Vec<AnnotationRecord>) -> Self {
        AnnotationTable {
            records,
            remote: None,
        }
    }

    pub fn with_remote(mut self, remote: Box<dyn RemoteFetch>) -> Self {
        self.remote = Some(remote);
        self
    }

    pub fn extend(&mut self, records: impl IntoIterator<Item = AnnotationRecord>) {
        self.records.extend(records);
    }

    pub fn records(&self) -> &[AnnotationRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn has_remote(&self) -> bool {
        self.remote.is_some()
    }

    /// Local records matching every filter, followed by the remote ones
    pub fn query(&self, filters: &AnnotationFilters) -> Result<Vec<AnnotationRecord>> {
        let mut rows: Vec<AnnotationRecord> = self
            .records
            .iter()
            .filter(|r| filters.iter().all(|(field, value)| field.value(r) == *value))
            .cloned()
            .collect();

        if let Some(remote) = &self.remote {
            rows.extend(remote.fetch(filters)?);
        }
        Ok(rows)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::models::{EvidenceCode, RelationshipType, Term};

    fn chain() -> TermGraph {
        // c -> b -> a
        let mut g = TermGraph::new();
        for id in ["a", "b", "c"] {
            g.add_term(Term::new(id));
        }
        g.add_edge("b", "a", RelationshipType::IsA);
        g.add_edge("c", "b", RelationshipType::IsA);
        g
    }

    fn record(symbol: &str, term: &str) -> AnnotationRecord {
        AnnotationRecord {
            db: "UniProtKB".to_string(),
            entity_id: format!("ID-{symbol}"),
            entity_symbol: symbol.to_string(),
            qualifier: Vec::new(),
            term_id: term.to_string(),
            evidence: EvidenceCode::new("IDA"),
            aspect: "F".to_string(),
            entity_name: None,
            entity_type: None,
            taxon_ids: Vec::new(),
            date: None,
            assigned_by: None,
        }
    }

    #[test]
    fn test_from_delimited() {
        let set = AnnotationSet::from_delimited([
            ("g1", Some("GO:1|GO:2;GO:3")),
            ("g2", None),
            ("g3", Some("")),
        ])
        .unwrap();
        assert_eq!(
            set.get("g1"),
            Some(&Some(vec!["GO:1".to_string(), "GO:2".to_string(), "GO:3".to_string()]))
        );
        assert_eq!(set.get("g2"), Some(&None));
        assert_eq!(set.get("g3"), Some(&Some(Vec::new())));
    }

    #[test]
    fn test_with_ancestors_keeps_order_and_unknown_terms() {
        let g = chain();
        let terms = vec!["c".to_string(), "zzz".to_string(), "b".to_string()];
        assert_eq!(with_ancestors(&terms, &g), vec!["c", "b", "a", "zzz"]);
    }

    #[test]
    fn test_add_ancestors_fills_absent_cells() {
        let g = chain();
        let set: AnnotationSet = vec![("g1", Some(vec!["b".to_string()])), ("g2", None)]
            .into_iter()
            .collect();
        let out = add_ancestors(&set, &g);
        assert_eq!(out.get("g1"), Some(&Some(vec!["b".to_string(), "a".to_string()])));
        assert_eq!(out.get("g2"), Some(&Some(Vec::new())));
        assert_eq!(add_ancestors(&out, &g), out);
    }

    #[test]
    fn test_from_records_groups_by_entity() {
        let records = vec![record("TP53", "GO:1"), record("BRCA1", "GO:2"), record("TP53", "GO:1")];
        let set = AnnotationSet::from_records(&records, AnnotationField::EntitySymbol);
        assert_eq!(set.len(), 2);
        assert_eq!(set.get("TP53"), Some(&Some(vec!["GO:1".to_string()])));
    }

    struct FixedRemote;

    impl RemoteFetch for FixedRemote {
        fn fetch(&self, filters: &AnnotationFilters) -> Result<Vec<AnnotationRecord>> {
            assert_eq!(filters.len(), 1);
            Ok(vec![record("REMOTE", "GO:9")])
        }
    }

    #[test]
    fn test_query_combines_local_and_remote() {
        let table = AnnotationTable::new(vec![record("TP53", "GO:1"), record("BRCA1", "GO:2")]);
        let filters = [(AnnotationField::EntitySymbol, "TP53".to_string())];
        assert_eq!(table.query(&filters).unwrap().len(), 1);

        let table = table.with_remote(Box::new(FixedRemote));
        let rows = table.query(&filters).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].entity_symbol, "REMOTE");
    }
}
