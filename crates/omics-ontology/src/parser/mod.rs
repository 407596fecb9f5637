// Parsers for hierarchy files (OBO, InterPro tree) and annotation files (GAF, InterPro)

pub mod gaf;
pub mod interpro;
pub mod obo;
pub mod treefile;

pub use gaf::{GafFile, GafParser, GafVersion};
pub use interpro::{InterProEntry, InterProGoMapping, InterProMatch, InterProParser};
pub use obo::OboParser;
pub use treefile::TreeFileParser;

use crate::error::OntologyError;
use crate::models::{RelationshipType, Term, TermId};

/// Direction in which a parser discovered its edges
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeOrientation {
    ChildToParent,
    ParentToChild,
}

/// Edge as written in the source file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HierarchyEdge {
    pub source: TermId,
    pub target: TermId,
    pub relation: RelationshipType,
}

impl HierarchyEdge {
    pub fn new(source: impl Into<TermId>, target: impl Into<TermId>, relation: RelationshipType) -> Self {
        HierarchyEdge {
            source: source.into(),
            target: target.into(),
            relation,
        }
    }
}

/// Terms and edges of a hierarchy file, before orientation is normalised
#[derive(Debug, Clone)]
pub struct ParsedHierarchy {
    pub terms: Vec<Term>,
    pub edges: Vec<HierarchyEdge>,
    pub orientation: EdgeOrientation,
}

/// Maps a failed line read; undecodable text is a format error, the rest stays I/O
pub(crate) fn line_read_error(err: std::io::Error, line_no: usize) -> OntologyError {
    if err.kind() == std::io::ErrorKind::InvalidData {
        OntologyError::format(format!("line {}: {}", line_no, err))
    } else {
        OntologyError::Io(err)
    }
}
