//! Traversal over the graph store: closures, roots and leaves, root-to-leaf
//! paths and the taxonomy listing

use crate::error::Result;
use crate::graph::TermGraph;
use crate::models::{RelationshipType, TermId};
use crate::store::Ontology;
use petgraph::graph::NodeIndex;
use petgraph::Direction;
use std::collections::{BTreeSet, HashSet, VecDeque};
use std::io::Write;
use tracing::{debug, warn};

impl Ontology {
    /// Every ancestor of every term in `terms` over `relations`. Not reflexive.
    ///
    /// Terms outside the node list are an error. Known terms missing from the
    /// subgraph contribute nothing.
    pub fn ancestors_of<'a>(
        &self,
        terms: impl IntoIterator<Item = &'a str>,
        relations: &[RelationshipType],
    ) -> Result<BTreeSet<TermId>> {
        self.closure_of(terms, relations, Direction::Outgoing)
    }

    /// Every descendant of every term in `terms` over `relations`
    pub fn descendants_of<'a>(
        &self,
        terms: impl IntoIterator<Item = &'a str>,
        relations: &[RelationshipType],
    ) -> Result<BTreeSet<TermId>> {
        self.closure_of(terms, relations, Direction::Incoming)
    }

    fn closure_of<'a>(
        &self,
        terms: impl IntoIterator<Item = &'a str>,
        relations: &[RelationshipType],
        direction: Direction,
    ) -> Result<BTreeSet<TermId>> {
        let terms: Vec<&str> = terms.into_iter().collect();
        self.check_known(terms.iter().copied())?;

        let graph = self.subgraph(relations);
        let mut out = BTreeSet::new();
        for term in terms {
            let reached = match direction {
                Direction::Outgoing => graph.ancestors(term),
                Direction::Incoming => graph.descendants(term),
            };
            out.extend(reached.into_iter().map(str::to_string));
        }
        Ok(out)
    }

    /// Terms without a parent: zero row sums of the child -> parent matrix
    pub fn roots(&self) -> Result<Vec<TermId>> {
        let adjacency = self.adjacency(None)?;
        Ok(zero_positions(adjacency.nodes(), &adjacency.row_sums()))
    }

    /// Terms without a child: zero column sums
    pub fn leaves(&self) -> Result<Vec<TermId>> {
        let adjacency = self.adjacency(None)?;
        Ok(zero_positions(adjacency.nodes(), &adjacency.col_sums()))
    }

    /// All root-to-leaf paths, depth first along child edges from each root
    pub fn enumerate_paths(&self, roots: &[TermId], dedup: bool) -> Result<PathTable> {
        self.check_known(roots.iter().map(String::as_str))?;

        let graph = self.graph();
        let mut rows = Vec::new();
        for root in roots {
            if let Some(idx) = graph.index_of(root) {
                dfs_paths(graph, idx, &mut rows);
            }
        }
        debug!(roots = roots.len(), paths = rows.len(), "Enumerated paths");

        let table = PathTable { rows };
        Ok(if dedup { table.dedup() } else { table })
    }

    /// Write `Root\t<roots>` followed by one `node\tchild...` line per node in
    /// breadth-first order from each root. Nodes without children get no line.
    pub fn write_taxonomy<W: Write>(&self, writer: &mut W, roots: &[TermId]) -> Result<()> {
        self.check_known(roots.iter().map(String::as_str))?;
        writeln!(writer, "Root\t{}", roots.join("\t"))?;

        let graph = self.graph();
        for root in roots {
            let Some(start) = graph.index_of(root) else {
                continue;
            };
            let mut visited = HashSet::from([start]);
            let mut queue = VecDeque::from([start]);

            while let Some(node) = queue.pop_front() {
                let children: Vec<NodeIndex> = graph
                    .neighbor_indices(node, Direction::Incoming)
                    .into_iter()
                    .filter(|c| visited.insert(*c))
                    .collect();
                if children.is_empty() {
                    continue;
                }

                let names: Vec<&str> = children.iter().map(|&c| graph.id_at(c)).collect();
                writeln!(writer, "{}\t{}", graph.id_at(node), names.join("\t"))?;
                queue.extend(children);
            }
        }
        Ok(())
    }
}

fn zero_positions(nodes: &[TermId], sums: &[u32]) -> Vec<TermId> {
    nodes
        .iter()
        .zip(sums)
        .filter(|(_, sum)| **sum == 0)
        .map(|(id, _)| id.clone())
        .collect()
}

struct Frame {
    children: Vec<NodeIndex>,
    next: usize,
    /// Whether any child was descended into
    descended: bool,
}

impl Frame {
    fn new(graph: &TermGraph, node: NodeIndex) -> Self {
        Frame {
            children: graph.neighbor_indices(node, Direction::Incoming),
            next: 0,
            descended: false,
        }
    }
}

/// Iterative DFS from `root`. A child already on the current path is skipped,
/// and a node whose children were all skipped ends its branch.
fn dfs_paths(graph: &TermGraph, root: NodeIndex, rows: &mut Vec<Vec<TermId>>) {
    let mut path = vec![root];
    let mut on_path = HashSet::from([root]);
    let mut frames = vec![Frame::new(graph, root)];

    while let Some(frame) = frames.last_mut() {
        if frame.next < frame.children.len() {
            let child = frame.children[frame.next];
            frame.next += 1;

            if on_path.contains(&child) {
                warn!(
                    term = graph.id_at(child),
                    "Cycle detected; skipping term already on the current path"
                );
                continue;
            }

            frame.descended = true;
            path.push(child);
            on_path.insert(child);
            frames.push(Frame::new(graph, child));
        } else {
            if !frame.descended {
                rows.push(path.iter().map(|&n| graph.id_at(n).to_string()).collect());
            }
            frames.pop();
            if let Some(node) = path.pop() {
                on_path.remove(&node);
            }
        }
    }
}

/// Root-to-leaf paths, one row per path and one column per depth.
/// Shorter rows read as padded with nulls.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathTable {
    rows: Vec<Vec<TermId>>,
}

impl PathTable {
    pub fn new(rows: Vec<Vec<TermId>>) -> Self {
        PathTable { rows }
    }

    pub fn rows(&self) -> &[Vec<TermId>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of columns: the longest row
    pub fn width(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    pub fn get(&self, row: usize, col: usize) -> Option<&str> {
        self.rows.get(row)?.get(col).map(String::as_str)
    }

    /// Remove exact duplicate rows, then rows that stop before the last column
    /// at a value another row also holds in that column, where the other row
    /// comes earlier or extends this one.
    pub fn dedup(&self) -> PathTable {
        let mut seen = HashSet::new();
        let unique: Vec<&Vec<TermId>> = self.rows.iter().filter(|r| seen.insert(*r)).collect();

        let width = unique.iter().map(|r| r.len()).max().unwrap_or(0);
        let rows = unique
            .iter()
            .enumerate()
            .filter(|&(i, row)| {
                let Some(last) = row.len().checked_sub(1) else {
                    return true;
                };
                if last + 1 >= width {
                    return true;
                }
                !unique.iter().enumerate().any(|(j, other)| {
                    j != i
                        && other.get(last) == row.get(last)
                        && (j < i || (other.len() > row.len() && other.starts_with(row.as_slice())))
                })
            })
            .map(|(_, row)| (*row).clone())
            .collect();

        PathTable { rows }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::error::OntologyError;
    use crate::models::Term;
    use omics_common::SourceConfig;

    fn ids(v: &[&str]) -> Vec<TermId> {
        v.iter().map(|s| s.to_string()).collect()
    }

    /// b, c are_a a; d is_a b; d part_of c; e is_a c
    fn ontology() -> Ontology {
        let mut g = TermGraph::new();
        for id in ["a", "b", "c", "d", "e"] {
            g.add_term(Term::new(id));
        }
        g.add_edge("b", "a", RelationshipType::IsA);
        g.add_edge("c", "a", RelationshipType::IsA);
        g.add_edge("d", "b", RelationshipType::IsA);
        g.add_edge("d", "c", RelationshipType::PartOf);
        g.add_edge("e", "c", RelationshipType::IsA);
        Ontology::new(SourceConfig::new("test", "/tmp"), g)
    }

    #[test]
    fn test_ancestors_of_respects_relations() {
        let ont = ontology();
        let all = ont.ancestors_of(["d"], &[]).unwrap();
        assert_eq!(all, ids(&["a", "b", "c"]).into_iter().collect::<BTreeSet<_>>());

        let is_a = ont.ancestors_of(["d"], &[RelationshipType::IsA]).unwrap();
        assert_eq!(is_a.into_iter().collect::<Vec<_>>(), ids(&["a", "b"]));

        assert!(ont.ancestors_of(["a"], &[]).unwrap().is_empty());
    }

    #[test]
    fn test_ancestors_of_unknown_term() {
        let ont = ontology();
        let err = ont.ancestors_of(["d", "zzz"], &[]).unwrap_err();
        assert!(matches!(err, OntologyError::InconsistentNodeSet { .. }));
    }

    #[test]
    fn test_known_term_absent_from_subgraph_has_no_ancestors() {
        let ont = ontology();
        let part_of = ont.ancestors_of(["e"], &[RelationshipType::PartOf]).unwrap();
        assert!(part_of.is_empty());
    }

    #[test]
    fn test_descendants_of() {
        let ont = ontology();
        let desc = ont.descendants_of(["c"], &[]).unwrap();
        assert_eq!(desc.into_iter().collect::<Vec<_>>(), ids(&["d", "e"]));
    }

    #[test]
    fn test_roots_and_leaves() {
        let ont = ontology();
        assert_eq!(ont.roots().unwrap(), ids(&["a"]));
        assert_eq!(ont.leaves().unwrap(), ids(&["d", "e"]));
    }

    #[test]
    fn test_enumerate_paths() {
        let ont = ontology();
        let table = ont.enumerate_paths(&ids(&["a"]), false).unwrap();
        assert_eq!(
            table.rows(),
            &[
                ids(&["a", "b", "d"]),
                ids(&["a", "c", "d"]),
                ids(&["a", "c", "e"]),
            ]
        );
        assert_eq!(table.width(), 3);
        assert_eq!(table.get(1, 1), Some("c"));
        assert_eq!(table.get(1, 5), None);
    }

    #[test]
    fn test_enumerate_paths_terminates_on_cycle() {
        let mut g = TermGraph::new();
        for id in ["a", "b", "c"] {
            g.add_term(Term::new(id));
        }
        g.add_edge("b", "a", RelationshipType::IsA);
        g.add_edge("c", "b", RelationshipType::IsA);
        g.add_edge("a", "c", RelationshipType::IsA);
        let ont = Ontology::new(SourceConfig::new("cyclic", "/tmp"), g);

        let table = ont.enumerate_paths(&ids(&["a"]), false).unwrap();
        assert_eq!(table.rows(), &[ids(&["a", "b", "c"])]);
    }

    #[test]
    fn test_enumerate_paths_unknown_root() {
        let ont = ontology();
        assert!(ont.enumerate_paths(&ids(&["nope"]), false).is_err());
    }

    #[test]
    fn test_dedup_collapses_prefix_into_longer_path() {
        let table = PathTable::new(vec![ids(&["A", "B", "C"]), ids(&["A", "B"])]);
        assert_eq!(table.dedup().rows(), &[ids(&["A", "B", "C"])]);

        let reversed = PathTable::new(vec![ids(&["A", "B"]), ids(&["A", "B", "C"])]);
        assert_eq!(reversed.dedup().rows(), &[ids(&["A", "B", "C"])]);
    }

    #[test]
    fn test_dedup_keeps_later_longer_row_that_only_shares_a_column() {
        let table = PathTable::new(vec![ids(&["R", "A"]), ids(&["Q", "A", "C"])]);
        assert_eq!(
            table.dedup().rows(),
            &[ids(&["R", "A"]), ids(&["Q", "A", "C"])]
        );
    }

    #[test]
    fn test_dedup_removes_exact_duplicates_keeping_first() {
        let table = PathTable::new(vec![
            ids(&["A", "B", "C"]),
            ids(&["A", "X"]),
            ids(&["A", "B", "C"]),
        ]);
        assert_eq!(
            table.dedup().rows(),
            &[ids(&["A", "B", "C"]), ids(&["A", "X"])]
        );
    }

    #[test]
    fn test_write_taxonomy() {
        let ont = ontology();
        let mut out = Vec::new();
        ont.write_taxonomy(&mut out, &ids(&["a"])).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "Root\ta\na\tb\tc\nb\td\nc\te\n");
    }
}
