// OBO 1.2/1.4 parser: [Term] stanzas and their is_a / relationship edges

use super::{line_read_error, EdgeOrientation, HierarchyEdge, ParsedHierarchy};
use crate::error::{OntologyError, Result};
use crate::models::{RelationshipType, Synonym, SynonymScope, Term};
use std::io::BufRead;
use tracing::{debug, info, warn};

pub struct OboParser;

/// Fields collected while inside one [Term] stanza
#[derive(Default)]
struct TermStanza {
    id: Option<String>,
    name: Option<String>,
    namespace: Option<String>,
    definition: Option<String>,
    is_obsolete: bool,
    synonyms: Vec<Synonym>,
    xrefs: Vec<String>,
    alt_ids: Vec<String>,
    /// (relation, parent id)
    parents: Vec<(RelationshipType, String)>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Section {
    Header,
    Term,
    /// [Typedef], [Instance] and anything else we skip
    Other,
}

impl OboParser {
    /// Parse an OBO document.
    ///
    /// Edges are declared on the child term, so they are reported child -> parent.
    /// Obsolete terms are left out along with their edges.
    pub fn parse<R: BufRead>(reader: R) -> Result<ParsedHierarchy> {
        let mut terms = Vec::new();
        let mut edges = Vec::new();
        let mut section = Section::Header;
        let mut stanza = TermStanza::default();
        let mut skipped = 0usize;

        for (line_no, line) in reader.lines().enumerate() {
            let line = line.map_err(|e| line_read_error(e, line_no + 1))?;
            let line = line.trim();

            if line.starts_with('[') {
                if section == Section::Term {
                    skipped += Self::flush(std::mem::take(&mut stanza), &mut terms, &mut edges);
                }
                section = if line == "[Term]" {
                    Section::Term
                } else {
                    Section::Other
                };
                continue;
            }

            if section != Section::Term || line.is_empty() || line.starts_with('!') {
                continue;
            }

            if let Some((key, value)) = line.split_once(':') {
                Self::parse_tag(&mut stanza, key.trim(), strip_comment(value.trim()));
            }
        }

        if section == Section::Term {
            skipped += Self::flush(stanza, &mut terms, &mut edges);
        }

        if terms.is_empty() {
            return Err(OntologyError::format("OBO document contains no [Term] stanzas"));
        }

        info!(
            terms = terms.len(),
            edges = edges.len(),
            skipped,
            "Parsed OBO document"
        );

        Ok(ParsedHierarchy {
            terms,
            edges,
            orientation: EdgeOrientation::ChildToParent,
        })
    }

    fn parse_tag(stanza: &mut TermStanza, key: &str, value: &str) {
        match key {
            "id" => stanza.id = Some(value.to_string()),
            "name" => stanza.name = Some(value.to_string()),
            "namespace" => stanza.namespace = Some(value.to_string()),
            "def" => stanza.definition = Some(extract_quoted_text(value)),
            "is_obsolete" => stanza.is_obsolete = value == "true",
            "xref" => stanza.xrefs.push(value.to_string()),
            "alt_id" => stanza.alt_ids.push(value.to_string()),
            "synonym" => match parse_synonym(value) {
                Some(synonym) => stanza.synonyms.push(synonym),
                None => debug!(value, "Skipping malformed synonym"),
            },
            "is_a" => {
                // "GO:0008150 ! biological_process"
                if let Some(parent) = value.split_whitespace().next() {
                    stanza.parents.push((RelationshipType::IsA, parent.to_string()));
                }
            },
            "relationship" => {
                // "part_of GO:0008150 ! biological_process"
                let mut parts = value.split_whitespace();
                if let (Some(relation), Some(parent)) = (parts.next(), parts.next()) {
                    stanza
                        .parents
                        .push((RelationshipType::parse(relation), parent.to_string()));
                }
            },
            _ => {},
        }
    }

    /// Move a finished stanza into the output. Returns 1 if it was skipped.
    fn flush(stanza: TermStanza, terms: &mut Vec<Term>, edges: &mut Vec<HierarchyEdge>) -> usize {
        let Some(id) = stanza.id else {
            warn!("Skipping [Term] stanza without id");
            return 1;
        };

        if stanza.is_obsolete {
            debug!(term = %id, "Skipping obsolete term");
            return 1;
        }

        for (relation, parent) in stanza.parents {
            edges.push(HierarchyEdge::new(id.clone(), parent, relation));
        }

        terms.push(Term {
            id,
            name: stanza.name,
            namespace: stanza.namespace,
            definition: stanza.definition,
            is_obsolete: false,
            synonyms: stanza.synonyms,
            xrefs: stanza.xrefs,
            alt_ids: stanza.alt_ids,
            parent: None,
        });
        0
    }
}

/// Drop a trailing "! comment" unless the '!' sits inside quotes
fn strip_comment(value: &str) -> &str {
    let mut in_quotes = false;
    let mut escaped = false;
    for (pos, c) in value.char_indices() {
        match c {
            '\\' if !escaped => {
                escaped = true;
                continue;
            },
            '"' if !escaped => in_quotes = !in_quotes,
            '!' if !in_quotes => return value[..pos].trim_end(),
            _ => {},
        }
        escaped = false;
    }
    value
}

/// "\"biological_process\" [GO:curators]" -> "biological_process"
fn extract_quoted_text(text: &str) -> String {
    if let Some(start) = text.find('"') {
        if let Some(end) = text[start + 1..].find('"') {
            return text[start + 1..start + 1 + end].to_string();
        }
    }
    text.to_string()
}

/// "\"cell division\" EXACT []"
fn parse_synonym(text: &str) -> Option<Synonym> {
    let parts: Vec<&str> = text.split('"').collect();
    if parts.len() < 3 {
        return None;
    }

    let scope = parts[2]
        .split_whitespace()
        .next()
        .and_then(SynonymScope::parse)
        .unwrap_or(SynonymScope::Related);

    Some(Synonym {
        scope,
        text: parts[1].to_string(),
    })
}

// ============================================================================
// Tests
// ============================================================================
