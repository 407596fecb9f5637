// Indentation tree parser (InterPro ParentChildTreeFile.txt)
//
//   IPR000008::C2 domain::
//   --IPR002420::Phosphatidylinositol 3-kinase, C2 domain::
//   ----IPR041129::...

use super::{line_read_error, EdgeOrientation, HierarchyEdge, ParsedHierarchy};
use crate::error::{OntologyError, Result};
use crate::models::{RelationshipType, Term, TermId};
use std::io::BufRead;
use tracing::info;

const SEPARATOR: &str = "::";

pub struct TreeFileParser;

impl TreeFileParser {
    /// Parse a dash-indented tree. Edges are reported parent -> child.
    pub fn parse<R: BufRead>(reader: R) -> Result<ParsedHierarchy> {
        let mut terms = Vec::new();
        let mut edges = Vec::new();
        // (depth, id) of the open ancestors of the current line
        let mut stack: Vec<(usize, TermId)> = Vec::new();

        for (line_no, line) in reader.lines().enumerate() {
            let line = line.map_err(|e| line_read_error(e, line_no + 1))?;
            let line = line.trim_end();
            if line.is_empty() {
                continue;
            }

            let depth = line.chars().take_while(|&c| c == '-').count();
            let (id, name) = Self::parse_entry(&line[depth..], line_no + 1)?;

            let mut term = Term::new(id.clone());
            term.name = name;

            if depth == 0 {
                stack.clear();
            } else {
                while stack.last().is_some_and(|(d, _)| *d >= depth) {
                    stack.pop();
                }
                let Some((_, parent)) = stack.last() else {
                    return Err(OntologyError::format(format!(
                        "line {}: indented entry '{}' has no root above it",
                        line_no + 1,
                        id
                    )));
                };
                edges.push(HierarchyEdge::new(parent.clone(), id.clone(), RelationshipType::IsA));
                term.parent = Some(parent.clone());
            }

            stack.push((depth, id));
            terms.push(term);
        }

        info!(terms = terms.len(), edges = edges.len(), "Parsed tree file");

        Ok(ParsedHierarchy {
            terms,
            edges,
            orientation: EdgeOrientation::ParentToChild,
        })
    }

    fn parse_entry(entry: &str, line_no: usize) -> Result<(TermId, Option<String>)> {
        let Some((id, rest)) = entry.split_once(SEPARATOR) else {
            return Err(OntologyError::format(format!(
                "line {}: missing '{}' separator",
                line_no, SEPARATOR
            )));
        };

        let id = id.trim();
        if id.is_empty() {
            return Err(OntologyError::format(format!("line {}: empty term id", line_no)));
        }

        let name = rest.split(SEPARATOR).next().map(str::trim).unwrap_or_default();
        let name = (!name.is_empty()).then(|| name.to_string());

        Ok((id.to_string(), name))
    }
}
