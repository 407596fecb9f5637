// Ontology data models

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Ontology term identifier, e.g. "GO:0008150" or "IPR000001"
pub type TermId = String;

// ============================================================================
// Term
// ============================================================================

/// A node of the term graph together with its record attributes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Term {
    pub id: TermId,

    /// Display name
    pub name: Option<String>,

    /// Namespace or category, e.g. "biological_process" or "Domain"
    pub namespace: Option<String>,

    /// Quoted text of the definition
    pub definition: Option<String>,

    pub is_obsolete: bool,

    pub synonyms: Vec<Synonym>,

    /// Cross-references to other databases
    pub xrefs: Vec<String>,

    pub alt_ids: Vec<String>,

    /// Parent as written on the line of an indentation tree file
    pub parent: Option<TermId>,
}

impl Term {
    pub fn new(id: impl Into<TermId>) -> Self {
        Term {
            id: id.into(),
            name: None,
            namespace: None,
            definition: None,
            is_obsolete: false,
            synonyms: Vec::new(),
            xrefs: Vec::new(),
            alt_ids: Vec::new(),
            parent: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    pub fn in_namespace(&self, namespace: &str) -> bool {
        self.namespace.as_deref() == Some(namespace)
    }
}

// ============================================================================
// Synonym
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Synonym {
    pub scope: SynonymScope,
    pub text: String,
}

/// Synonym scope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SynonymScope {
    Exact,
    Broad,
    Narrow,
    Related,
}

impl SynonymScope {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "EXACT" => Some(SynonymScope::Exact),
            "BROAD" => Some(SynonymScope::Broad),
            "NARROW" => Some(SynonymScope::Narrow),
            "RELATED" => Some(SynonymScope::Related),
            _ => None,
        }
    }
}

// ============================================================================
// Relationship Type
// ============================================================================

/// Label carried by a term graph edge
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipType {
    IsA,
    PartOf,
    Regulates,
    PositivelyRegulates,
    NegativelyRegulates,
    HasPart,
    OccursIn,
    /// Any relation name without a dedicated variant
    Other(String),
}

impl RelationshipType {
    pub fn parse(s: &str) -> Self {
        match s {
            "is_a" => RelationshipType::IsA,
            "part_of" => RelationshipType::PartOf,
            "regulates" => RelationshipType::Regulates,
            "positively_regulates" => RelationshipType::PositivelyRegulates,
            "negatively_regulates" => RelationshipType::NegativelyRegulates,
            "has_part" => RelationshipType::HasPart,
            "occurs_in" => RelationshipType::OccursIn,
            other => RelationshipType::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            RelationshipType::IsA => "is_a",
            RelationshipType::PartOf => "part_of",
            RelationshipType::Regulates => "regulates",
            RelationshipType::PositivelyRegulates => "positively_regulates",
            RelationshipType::NegativelyRegulates => "negatively_regulates",
            RelationshipType::HasPart => "has_part",
            RelationshipType::OccursIn => "occurs_in",
            RelationshipType::Other(name) => name,
        }
    }
}

impl std::fmt::Display for RelationshipType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for RelationshipType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(RelationshipType::parse(s))
    }
}

// ============================================================================
// Evidence Code
// ============================================================================

/// GO evidence code
/// See: http://geneontology.org/docs/guide-go-evidence-codes/
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EvidenceCode(pub String);

impl EvidenceCode {
    pub const EXP: &'static str = "EXP"; // Inferred from Experiment
    pub const IDA: &'static str = "IDA"; // Inferred from Direct Assay
    pub const IPI: &'static str = "IPI"; // Inferred from Physical Interaction
    pub const IMP: &'static str = "IMP"; // Inferred from Mutant Phenotype
    pub const IGI: &'static str = "IGI"; // Inferred from Genetic Interaction
    pub const IEP: &'static str = "IEP"; // Inferred from Expression Pattern
    pub const TAS: &'static str = "TAS"; // Traceable Author Statement
    pub const IC: &'static str = "IC"; // Inferred by Curator
    pub const IEA: &'static str = "IEA"; // Inferred from Electronic Annotation

    /// Codes kept by default when splitting annotations for training
    pub const CURATED: [&'static str; 8] = [
        Self::EXP,
        Self::IDA,
        Self::IPI,
        Self::IMP,
        Self::IGI,
        Self::IEP,
        Self::TAS,
        Self::IC,
    ];

    pub fn new(code: impl Into<String>) -> Self {
        EvidenceCode(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_experimental(&self) -> bool {
        matches!(
            self.0.as_str(),
            Self::EXP | Self::IDA | Self::IPI | Self::IMP | Self::IGI | Self::IEP
        )
    }

    pub fn is_electronic(&self) -> bool {
        self.0 == Self::IEA
    }
}

impl std::fmt::Display for EvidenceCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Annotation Record
// ============================================================================

/// Qualifier token marking an explicit non-association
pub const NEGATION: &str = "NOT";

/// One gene association line: an entity linked to a term
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotationRecord {
    /// Source database, e.g. "UniProtKB"
    pub db: String,

    /// DB_Object_ID, e.g. "P04637"
    pub entity_id: String,

    /// DB_Object_Symbol, e.g. "TP53"
    pub entity_symbol: String,

    /// Qualifier tokens, e.g. ["NOT", "enables"]
    pub qualifier: Vec<String>,

    pub term_id: TermId,

    pub evidence: EvidenceCode,

    /// P, F or C
    pub aspect: String,

    pub entity_name: Option<String>,

    pub entity_type: Option<String>,

    /// NCBI taxon ids without the "taxon:" prefix
    pub taxon_ids: Vec<String>,

    pub date: Option<NaiveDate>,

    pub assigned_by: Option<String>,
}

impl AnnotationRecord {
    pub fn is_negated(&self) -> bool {
        self.qualifier.iter().any(|q| q == NEGATION)
    }

    /// Qualifier with the negation token removed, tokens joined by '|'
    pub fn clean_qualifier(&self) -> String {
        self.qualifier
            .iter()
            .filter(|q| *q != NEGATION && !q.is_empty())
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join("|")
    }
}

/// Column of an annotation record usable as a grouping key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnnotationField {
    #[serde(alias = "DB")]
    Db,
    #[serde(alias = "DB_Object_ID", alias = "gene_id", alias = "protein_id")]
    EntityId,
    #[serde(alias = "DB_Object_Symbol", alias = "gene_name")]
    EntitySymbol,
    #[serde(alias = "Qualifier")]
    Qualifier,
    #[serde(alias = "GO_ID", alias = "go_id")]
    TermId,
    #[serde(alias = "Evidence")]
    Evidence,
    #[serde(alias = "Aspect")]
    Aspect,
    #[serde(alias = "Taxon_ID", alias = "species_id")]
    Taxon,
    #[serde(alias = "Assigned_By")]
    AssignedBy,
}

impl AnnotationField {
    /// Column name as written in GAF documentation
    pub fn column_name(&self) -> &'static str {
        match self {
            AnnotationField::Db => "DB",
            AnnotationField::EntityId => "DB_Object_ID",
            AnnotationField::EntitySymbol => "DB_Object_Symbol",
            AnnotationField::Qualifier => "Qualifier",
            AnnotationField::TermId => "GO_ID",
            AnnotationField::Evidence => "Evidence",
            AnnotationField::Aspect => "Aspect",
            AnnotationField::Taxon => "Taxon_ID",
            AnnotationField::AssignedBy => "Assigned_By",
        }
    }

    /// Field value of `record`; multi-valued fields are joined by '|'
    pub fn value(&self, record: &AnnotationRecord) -> String {
        match self {
            AnnotationField::Db => record.db.clone(),
            AnnotationField::EntityId => record.entity_id.clone(),
            AnnotationField::EntitySymbol => record.entity_symbol.clone(),
            AnnotationField::Qualifier => record.qualifier.join("|"),
            AnnotationField::TermId => record.term_id.clone(),
            AnnotationField::Evidence => record.evidence.0.clone(),
            AnnotationField::Aspect => record.aspect.clone(),
            AnnotationField::Taxon => record.taxon_ids.join("|"),
            AnnotationField::AssignedBy => record.assigned_by.clone().unwrap_or_default(),
        }
    }
}

impl std::str::FromStr for AnnotationField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "db" | "DB" => Ok(AnnotationField::Db),
            "entity_id" | "DB_Object_ID" | "gene_id" | "protein_id" => Ok(AnnotationField::EntityId),
            "entity_symbol" | "DB_Object_Symbol" | "gene_name" => Ok(AnnotationField::EntitySymbol),
            "qualifier" | "Qualifier" => Ok(AnnotationField::Qualifier),
            "term_id" | "GO_ID" | "go_id" => Ok(AnnotationField::TermId),
            "evidence" | "Evidence" => Ok(AnnotationField::Evidence),
            "aspect" | "Aspect" => Ok(AnnotationField::Aspect),
            "taxon" | "Taxon_ID" | "species_id" => Ok(AnnotationField::Taxon),
            "assigned_by" | "Assigned_By" => Ok(AnnotationField::AssignedBy),
            _ => Err(format!("Unknown annotation field: {}", s)),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn record(qualifier: &[&str]) -> AnnotationRecord {
        AnnotationRecord {
            db: "UniProtKB".to_string(),
            entity_id: "P04637".to_string(),
            entity_symbol: "TP53".to_string(),
            qualifier: qualifier.iter().map(|s| s.to_string()).collect(),
            term_id: "GO:0003700".to_string(),
            evidence: EvidenceCode::new("IDA"),
            aspect: "F".to_string(),
            entity_name: None,
            entity_type: Some("protein".to_string()),
            taxon_ids: vec!["9606".to_string()],
            date: NaiveDate::from_ymd_opt(2016, 3, 1),
            assigned_by: Some("UniProt".to_string()),
        }
    }

    #[test]
    fn test_relationship_type_parse() {
        assert_eq!(RelationshipType::parse("is_a"), RelationshipType::IsA);
        assert_eq!(RelationshipType::parse("part_of"), RelationshipType::PartOf);
        assert_eq!(
            RelationshipType::parse("happens_during"),
            RelationshipType::Other("happens_during".to_string())
        );
        assert_eq!(RelationshipType::parse("happens_during").as_str(), "happens_during");
        assert_eq!(RelationshipType::IsA.to_string(), "is_a");
    }

    #[test]
    fn test_synonym_scope_parse() {
        assert_eq!(SynonymScope::parse("exact"), Some(SynonymScope::Exact));
        assert_eq!(SynonymScope::parse("NARROW"), Some(SynonymScope::Narrow));
        assert_eq!(SynonymScope::parse("vague"), None);
    }

    #[test]
    fn test_evidence_code_classification() {
        assert!(EvidenceCode::new("IDA").is_experimental());
        assert!(!EvidenceCode::new("TAS").is_experimental());
        assert!(EvidenceCode::new("IEA").is_electronic());
        assert!(EvidenceCode::CURATED.contains(&"IC"));
        assert!(!EvidenceCode::CURATED.contains(&EvidenceCode::IEA));
    }

    #[test]
    fn test_negated_qualifier() {
        let negated = record(&["NOT", "enables"]);
        assert!(negated.is_negated());
        assert_eq!(negated.clean_qualifier(), "enables");

        let plain = record(&["contributes_to"]);
        assert!(!plain.is_negated());
        assert_eq!(plain.clean_qualifier(), "contributes_to");

        assert_eq!(record(&[]).clean_qualifier(), "");
    }

    #[test]
    fn test_annotation_field_values() {
        let r = record(&["NOT", "enables"]);
        assert_eq!(AnnotationField::EntitySymbol.value(&r), "TP53");
        assert_eq!(AnnotationField::Qualifier.value(&r), "NOT|enables");
        assert_eq!(AnnotationField::Taxon.value(&r), "9606");
        assert_eq!(
            "gene_name".parse::<AnnotationField>().unwrap(),
            AnnotationField::EntitySymbol
        );
        assert!("Date".parse::<AnnotationField>().is_err());
    }
}
