// Split and application configuration

use crate::error::{OntologyError, Result};
use crate::models::{AnnotationField, EvidenceCode, TermId};
use chrono::NaiveDate;
use omics_common::logging::LogConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Protein binding: too unspecific to stand alone as a training label
pub const TRIVIAL_TERM: &str = "GO:0005515";

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
}

/// Upper bound of the test window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestWindow {
    /// (valid_cutoff, date]
    Until(NaiveDate),
    /// Everything after valid_cutoff
    Open,
    /// Test rows are the validation rows
    ReuseValid,
}

impl Default for TestWindow {
    fn default() -> Self {
        TestWindow::Until(date(2021, 12, 31))
    }
}

/// How the terms of one group are combined
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Aggregation {
    /// First-seen unique terms
    #[default]
    Unique,
    /// Unique terms plus their is_a ancestors
    AddAncestors,
}

impl std::str::FromStr for Aggregation {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "unique" => Ok(Aggregation::Unique),
            "add-ancestors" | "add_ancestors" => Ok(Aggregation::AddAncestors),
            _ => Err(format!("Invalid aggregation: {}", s)),
        }
    }
}

/// Configuration of the temporal annotation split
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SplitConfig {
    /// Field identifying the annotated entity
    pub entity_field: AnnotationField,

    /// Extra grouping fields; the qualifier is always added
    pub group_fields: Vec<AnnotationField>,

    /// Last day of the training window
    pub train_cutoff: NaiveDate,

    /// Last day of the validation window
    pub valid_cutoff: NaiveDate,

    pub test_window: TestWindow,

    /// Evidence codes kept before splitting
    pub evidence_codes: Vec<String>,

    /// Keep only these terms (None = all)
    pub term_filter: Option<Vec<TermId>>,

    /// Positive lists holding only this term are dropped (None = keep all)
    pub trivial_term: Option<TermId>,

    pub aggregation: Aggregation,
}

impl Default for SplitConfig {
    fn default() -> Self {
        SplitConfig {
            entity_field: AnnotationField::EntitySymbol,
            group_fields: vec![AnnotationField::Qualifier],
            train_cutoff: date(2017, 6, 15),
            valid_cutoff: date(2017, 11, 15),
            test_window: TestWindow::default(),
            evidence_codes: EvidenceCode::CURATED.iter().map(|c| c.to_string()).collect(),
            term_filter: None,
            trivial_term: Some(TRIVIAL_TERM.to_string()),
            aggregation: Aggregation::Unique,
        }
    }
}

impl SplitConfig {
    pub fn builder() -> SplitConfigBuilder {
        SplitConfigBuilder::default()
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: SplitConfig = toml::from_str(content)
            .map_err(|e| OntologyError::config(format!("Invalid split config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Grouping columns after the entity: configured fields with the qualifier
    /// appended when missing
    pub fn effective_group_fields(&self) -> Vec<AnnotationField> {
        let mut fields: Vec<AnnotationField> = Vec::new();
        for field in &self.group_fields {
            if *field != self.entity_field && !fields.contains(field) {
                fields.push(*field);
            }
        }
        if !fields.contains(&AnnotationField::Qualifier) {
            fields.push(AnnotationField::Qualifier);
        }
        fields
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.train_cutoff >= self.valid_cutoff {
            return Err(OntologyError::config(format!(
                "train_cutoff ({}) must be before valid_cutoff ({})",
                self.train_cutoff, self.valid_cutoff
            )));
        }

        if let TestWindow::Until(test_cutoff) = self.test_window {
            if test_cutoff <= self.valid_cutoff {
                return Err(OntologyError::config(format!(
                    "test cutoff ({}) must be after valid_cutoff ({})",
                    test_cutoff, self.valid_cutoff
                )));
            }
        }

        if self.evidence_codes.is_empty() {
            return Err(OntologyError::config("evidence_codes cannot be empty"));
        }

        if self.entity_field == AnnotationField::TermId {
            return Err(OntologyError::config("entity_field cannot be the term column"));
        }

        Ok(())
    }
}

/// Builder for SplitConfig
#[derive(Debug, Default)]
pub struct SplitConfigBuilder {
    entity_field: Option<AnnotationField>,
    group_fields: Option<Vec<AnnotationField>>,
    train_cutoff: Option<NaiveDate>,
    valid_cutoff: Option<NaiveDate>,
    test_window: Option<TestWindow>,
    evidence_codes: Option<Vec<String>>,
    term_filter: Option<Vec<TermId>>,
    trivial_term: Option<Option<TermId>>,
    aggregation: Option<Aggregation>,
}

impl SplitConfigBuilder {
    pub fn entity_field(mut self, field: AnnotationField) -> Self {
        self.entity_field = Some(field);
        self
    }

    pub fn group_fields(mut self, fields: Vec<AnnotationField>) -> Self {
        self.group_fields = Some(fields);
        self
    }

    pub fn train_cutoff(mut self, date: NaiveDate) -> Self {
        self.train_cutoff = Some(date);
        self
    }

    pub fn valid_cutoff(mut self, date: NaiveDate) -> Self {
        self.valid_cutoff = Some(date);
        self
    }

    pub fn test_window(mut self, window: TestWindow) -> Self {
        self.test_window = Some(window);
        self
    }

    pub fn evidence_codes(mut self, codes: Vec<String>) -> Self {
        self.evidence_codes = Some(codes);
        self
    }

    pub fn term_filter(mut self, terms: Vec<TermId>) -> Self {
        self.term_filter = Some(terms);
        self
    }

    pub fn trivial_term(mut self, term: Option<TermId>) -> Self {
        self.trivial_term = Some(term);
        self
    }

    pub fn aggregation(mut self, aggregation: Aggregation) -> Self {
        self.aggregation = Some(aggregation);
        self
    }

    pub fn build(self) -> SplitConfig {
        let default = SplitConfig::default();

        SplitConfig {
            entity_field: self.entity_field.unwrap_or(default.entity_field),
            group_fields: self.group_fields.unwrap_or(default.group_fields),
            train_cutoff: self.train_cutoff.unwrap_or(default.train_cutoff),
            valid_cutoff: self.valid_cutoff.unwrap_or(default.valid_cutoff),
            test_window: self.test_window.unwrap_or(default.test_window),
            evidence_codes: self.evidence_codes.unwrap_or(default.evidence_codes),
            term_filter: self.term_filter.or(default.term_filter),
            trivial_term: self.trivial_term.unwrap_or(default.trivial_term),
            aggregation: self.aggregation.unwrap_or(default.aggregation),
        }
    }
}

/// Top-level TOML file for the command line tool
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub logging: LogConfig,
    pub split: SplitConfig,
}

impl AppConfig {
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&content)
            .map_err(|e| OntologyError::config(format!("Invalid config file: {}", e)))?;
        config.split.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = SplitConfig::default();
        assert_eq!(config.train_cutoff, date(2017, 6, 15));
        assert_eq!(config.valid_cutoff, date(2017, 11, 15));
        assert_eq!(config.test_window, TestWindow::Until(date(2021, 12, 31)));
        assert_eq!(config.evidence_codes.len(), 8);
        assert_eq!(config.trivial_term.as_deref(), Some(TRIVIAL_TERM));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let config = SplitConfig::builder()
            .entity_field(AnnotationField::EntityId)
            .test_window(TestWindow::Open)
            .trivial_term(None)
            .build();
        assert_eq!(config.entity_field, AnnotationField::EntityId);
        assert_eq!(config.test_window, TestWindow::Open);
        assert_eq!(config.trivial_term, None);
        assert_eq!(config.train_cutoff, date(2017, 6, 15));
    }

    #[test]
    fn test_validate_rejects_unordered_cutoffs() {
        let config = SplitConfig::builder()
            .train_cutoff(date(2018, 1, 1))
            .valid_cutoff(date(2017, 1, 1))
            .build();
        assert!(matches!(config.validate(), Err(OntologyError::Config(_))));

        let config = SplitConfig::builder()
            .test_window(TestWindow::Until(date(2017, 11, 15)))
            .build();
        assert!(config.validate().is_err());

        let config = SplitConfig::builder().evidence_codes(vec![]).build();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_effective_group_fields_always_has_qualifier() {
        let config = SplitConfig::builder()
            .group_fields(vec![AnnotationField::Aspect, AnnotationField::EntitySymbol])
            .build();
        assert_eq!(
            config.effective_group_fields(),
            vec![AnnotationField::Aspect, AnnotationField::Qualifier]
        );
    }

    #[test]
    fn test_from_toml() {
        let config = SplitConfig::from_toml_str(
            r#"
entity_field = "gene_id"
group_fields = ["Qualifier", "aspect"]
train_cutoff = "2016-01-01"
test_window = "open"
aggregation = "add-ancestors"
"#,
        )
        .unwrap();
        assert_eq!(config.entity_field, AnnotationField::EntityId);
        assert_eq!(config.train_cutoff, date(2016, 1, 1));
        assert_eq!(config.valid_cutoff, date(2017, 11, 15));
        assert_eq!(config.test_window, TestWindow::Open);
        assert_eq!(config.aggregation, Aggregation::AddAncestors);

        let until = SplitConfig::from_toml_str("test_window = { until = \"2020-01-01\" }").unwrap();
        assert_eq!(until.test_window, TestWindow::Until(date(2020, 1, 1)));

        assert!(SplitConfig::from_toml_str("train_cutoff = 3").is_err());
    }

    #[test]
    fn test_app_config_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[logging]\nlevel = \"debug\"\n\n[split]\ntest_window = \"reuse_valid\"").unwrap();

        let config = AppConfig::from_toml_file(file.path()).unwrap();
        assert_eq!(config.split.test_window, TestWindow::ReuseValid);
        assert_eq!(config.logging.log_file_prefix, "omics");
    }
}
