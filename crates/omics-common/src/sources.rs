//! Named source configurations
//!
//! Every supported database is described by an immutable [`SourceConfig`]:
//! where its files live upstream, which logical files it expects and how its
//! columns are renamed. Loaders receive a config value rather than being
//! specialised per database.

use crate::error::{OmicsError, Result};
use std::collections::BTreeMap;

/// Configuration of one reference database
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceConfig {
    /// Registry name, e.g. "gene_ontology"
    pub name: String,

    /// Upstream base location
    pub default_path: String,

    /// Logical file name -> upstream location, relative to `default_path`
    /// unless absolute
    pub file_resources: BTreeMap<String, String>,

    /// Source column name -> output column name
    pub column_rename: BTreeMap<String, String>,
}

impl SourceConfig {
    pub fn new(name: impl Into<String>, default_path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            default_path: default_path.into(),
            file_resources: BTreeMap::new(),
            column_rename: BTreeMap::new(),
        }
    }

    pub fn with_file(mut self, name: impl Into<String>, location: impl Into<String>) -> Self {
        self.file_resources.insert(name.into(), location.into());
        self
    }

    pub fn with_rename(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.column_rename.insert(from.into(), to.into());
        self
    }

    /// Output name for `column`, falling back to the column itself
    pub fn rename<'a>(&'a self, column: &'a str) -> &'a str {
        self.column_rename
            .get(column)
            .map(String::as_str)
            .unwrap_or(column)
    }

    /// Full upstream location of a logical file
    pub fn location(&self, file: &str) -> Option<String> {
        let location = self.file_resources.get(file)?;
        if location.contains("://") {
            Some(location.clone())
        } else {
            Some(format!("{}/{}", self.default_path.trim_end_matches('/'), location))
        }
    }

    /// Gene Ontology terms plus the GOA gene association files for `species`
    pub fn gene_ontology(species: &str) -> Self {
        let species = species.to_lowercase();
        Self::new("gene_ontology", "http://geneontology.org/gene-associations/")
            .with_file("go-basic.obo", "http://purl.obolibrary.org/obo/go/go-basic.obo")
            .with_file(format!("goa_{species}.gaf.gz"), format!("goa_{species}.gaf.gz"))
            .with_file(format!("goa_{species}_rna.gaf.gz"), format!("goa_{species}_rna.gaf.gz"))
            .with_file(
                format!("goa_{species}_isoform.gaf.gz"),
                format!("goa_{species}_isoform.gaf.gz"),
            )
            .with_rename("DB_Object_Symbol", "gene_name")
            .with_rename("DB_Object_ID", "gene_id")
            .with_rename("GO_ID", "go_id")
            .with_rename("Taxon_ID", "species_id")
    }

    /// UniProt GOA. `None` selects the all-species release.
    pub fn uniprot_goa(species: Option<&str>) -> Self {
        let (dir, substr) = match species {
            Some(s) => (s.to_uppercase(), s.to_lowercase()),
            None => ("UNIPROT".to_string(), "uniprot_all".to_string()),
        };
        Self::new("uniprot_goa", "ftp://ftp.ebi.ac.uk/pub/databases/GO/goa/")
            .with_file("go.obo", "http://current.geneontology.org/ontology/go.obo")
            .with_file(
                format!("goa_{}.gaf.gz", dir.to_lowercase()),
                format!("{dir}/goa_{substr}.gaf.gz"),
            )
            .with_rename("DB_Object_ID", "protein_id")
            .with_rename("DB_Object_Symbol", "gene_name")
            .with_rename("GO_ID", "go_id")
            .with_rename("Taxon_ID", "species_id")
    }

    pub fn human_phenotype() -> Self {
        Self::new("human_phenotype", "https://hpo.jax.org/")
            .with_file("hp.obo", "http://purl.obolibrary.org/obo/hp.obo")
    }

    pub fn interpro() -> Self {
        Self::new(
            "interpro",
            "https://ftp.ebi.ac.uk/pub/databases/interpro/current_release/",
        )
        .with_file("entry.list", "entry.list")
        .with_file("protein2ipr.dat.gz", "protein2ipr.dat.gz")
        .with_file("interpro2go", "interpro2go")
        .with_file("ParentChildTreeFile.txt", "ParentChildTreeFile.txt")
    }
}

/// Lookup table of named source configurations
#[derive(Debug, Clone, Default)]
pub struct SourceRegistry {
    sources: BTreeMap<String, SourceConfig>,
}

impl SourceRegistry {
    /// Registry with every built-in source, GO sources for human
    pub fn builtin() -> Self {
        let mut registry = Self::default();
        registry.register(SourceConfig::gene_ontology("human"));
        registry.register(SourceConfig::uniprot_goa(Some("human")));
        registry.register(SourceConfig::human_phenotype());
        registry.register(SourceConfig::interpro());
        registry
    }

    /// Add or replace a configuration under its own name
    pub fn register(&mut self, config: SourceConfig) {
        self.sources.insert(config.name.clone(), config);
    }

    pub fn get(&self, name: &str) -> Result<&SourceConfig> {
        self.sources
            .get(name)
            .ok_or_else(|| OmicsError::UnknownSource(name.to_string()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.sources.keys().map(String::as_str)
    }
}
