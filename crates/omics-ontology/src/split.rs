//! Temporal annotation splitter
//!
//! Turns dated annotation records into train / validation / test tables of
//! positive and negative term lists per entity, for time-split evaluation of
//! function predictors.

use crate::annotation::with_ancestors;
use crate::config::{Aggregation, SplitConfig, TestWindow};
use crate::error::Result;
use crate::graph::TermGraph;
use crate::models::{AnnotationField, AnnotationRecord, RelationshipType, TermId};
use crate::store::Ontology;
use chrono::NaiveDate;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info, warn};

// ============================================================================
// Aggregators
// ============================================================================

/// Combines the raw term column of one group into a term list
pub trait TermAggregator {
    fn aggregate(&self, terms: &[TermId]) -> Vec<TermId>;
}

/// First-seen unique terms
#[derive(Debug, Clone, Copy, Default)]
pub struct UniqueTerms;

impl TermAggregator for UniqueTerms {
    fn aggregate(&self, terms: &[TermId]) -> Vec<TermId> {
        let mut seen = HashSet::new();
        terms
            .iter()
            .filter(|t| seen.insert(t.as_str()))
            .cloned()
            .collect()
    }
}

/// Unique terms followed by their ancestors in a shared read-only graph
#[derive(Debug, Clone)]
pub struct WithAncestors {
    graph: Arc<TermGraph>,
}

impl WithAncestors {
    pub fn new(graph: Arc<TermGraph>) -> Self {
        WithAncestors { graph }
    }

    /// Ancestors over the is_a subgraph of `ontology`
    pub fn is_a(ontology: &Ontology) -> Self {
        Self::new(ontology.subgraph(&[RelationshipType::IsA]))
    }
}

impl TermAggregator for WithAncestors {
    fn aggregate(&self, terms: &[TermId]) -> Vec<TermId> {
        with_ancestors(terms, &self.graph)
    }
}

// ============================================================================
// Output tables
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitRow {
    pub entity: String,
    /// Values of the group fields, in table order
    pub group: Vec<String>,
    pub positive: Option<Vec<TermId>>,
    pub negative: Option<Vec<TermId>>,
}

/// One window's rows, in first-seen group order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitTable {
    pub entity_field: AnnotationField,
    pub group_fields: Vec<AnnotationField>,
    pub rows: Vec<SplitRow>,
}

impl SplitTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, entity: &str) -> Option<&SplitRow> {
        self.rows.iter().find(|r| r.entity == entity)
    }
}

/// Record counts seen while splitting
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SplitCounts {
    /// Records passing the evidence and term filters
    pub filtered: usize,
    /// Filtered records without a date
    pub undated: usize,
    pub train: usize,
    pub valid: usize,
    pub test: usize,
    /// Dated records after the test window
    pub beyond_test: usize,
}

#[derive(Debug, Clone)]
pub struct AnnotationSplits {
    pub train: SplitTable,
    pub valid: SplitTable,
    pub test: SplitTable,
    pub counts: SplitCounts,
}

// ============================================================================
// Splitting
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Window {
    Train,
    Valid,
    Test,
    Beyond,
}

fn window_of(date: NaiveDate, config: &SplitConfig) -> Window {
    if date <= config.train_cutoff {
        Window::Train
    } else if date <= config.valid_cutoff {
        Window::Valid
    } else {
        match config.test_window {
            TestWindow::Until(cutoff) if date <= cutoff => Window::Test,
            TestWindow::Open => Window::Test,
            _ => Window::Beyond,
        }
    }
}

/// Split `records` into train, validation and test tables
pub fn split_annotations(
    records: &[AnnotationRecord],
    config: &SplitConfig,
    aggregator: &dyn TermAggregator,
) -> Result<AnnotationSplits> {
    config.validate()?;

    let term_filter: Option<HashSet<&str>> = config
        .term_filter
        .as_ref()
        .map(|terms| terms.iter().map(String::as_str).collect());

    let mut counts = SplitCounts::default();
    let mut windows: [Vec<&AnnotationRecord>; 3] = Default::default();

    for record in records {
        if !config.evidence_codes.iter().any(|c| c == record.evidence.as_str()) {
            continue;
        }
        if let Some(filter) = &term_filter {
            if !filter.contains(record.term_id.as_str()) {
                continue;
            }
        }
        counts.filtered += 1;

        let Some(date) = record.date else {
            counts.undated += 1;
            continue;
        };

        match window_of(date, config) {
            Window::Train => windows[0].push(record),
            Window::Valid => windows[1].push(record),
            Window::Test => windows[2].push(record),
            Window::Beyond => counts.beyond_test += 1,
        }
    }

    if counts.undated > 0 {
        warn!(undated = counts.undated, "Dropped annotation records without a date");
    }

    if config.test_window == TestWindow::ReuseValid {
        windows[2] = windows[1].clone();
    }
    counts.train = windows[0].len();
    counts.valid = windows[1].len();
    counts.test = windows[2].len();

    let [train, valid, test] = windows;
    let splits = AnnotationSplits {
        train: build_table(&train, config, aggregator),
        valid: build_table(&valid, config, aggregator),
        test: build_table(&test, config, aggregator),
        counts,
    };

    info!(
        filtered = counts.filtered,
        train_records = counts.train,
        valid_records = counts.valid,
        test_records = counts.test,
        train_rows = splits.train.len(),
        valid_rows = splits.valid.len(),
        test_rows = splits.test.len(),
        "Split annotations"
    );
    Ok(splits)
}

#[derive(Default)]
struct Group {
    positive: Vec<TermId>,
    negative: Vec<TermId>,
}

fn build_table(
    records: &[&AnnotationRecord],
    config: &SplitConfig,
    aggregator: &dyn TermAggregator,
) -> SplitTable {
    let group_fields = config.effective_group_fields();

    let mut keys: Vec<(String, Vec<String>)> = Vec::new();
    let mut groups: HashMap<(String, Vec<String>), Group> = HashMap::new();

    for record in records {
        let entity = config.entity_field.value(record);
        let group_values = group_fields
            .iter()
            .map(|field| match field {
                AnnotationField::Qualifier => record.clean_qualifier(),
                other => other.value(record),
            })
            .collect();

        let key = (entity, group_values);
        let group = groups.entry(key.clone()).or_insert_with(|| {
            keys.push(key);
            Group::default()
        });

        if record.is_negated() {
            group.negative.push(record.term_id.clone());
        } else {
            group.positive.push(record.term_id.clone());
        }
    }

    let mut rows = Vec::with_capacity(keys.len());
    let mut suppressed = 0usize;
    for key in keys {
        let Some(group) = groups.remove(&key) else {
            continue;
        };
        let (entity, group_values) = key;

        let positive = non_empty(aggregator.aggregate(&group.positive));
        let mut negative = non_empty(aggregator.aggregate(&group.negative));

        // No term may be both positive and negative
        if let (Some(pos), Some(neg)) = (&positive, &mut negative) {
            let pos: HashSet<&str> = pos.iter().map(String::as_str).collect();
            neg.retain(|t| !pos.contains(t.as_str()));
        }
        let negative = negative.and_then(non_empty);

        let positive = match (positive, &config.trivial_term) {
            (Some(pos), Some(trivial)) if pos.len() == 1 && pos[0] == *trivial => {
                suppressed += 1;
                None
            },
            (positive, _) => positive,
        };

        if entity.is_empty() || (positive.is_none() && negative.is_none()) {
            continue;
        }

        rows.push(SplitRow {
            entity,
            group: group_values,
            positive,
            negative,
        });
    }

    if suppressed > 0 {
        debug!(suppressed, "Suppressed positive lists holding only the trivial term");
    }

    SplitTable {
        entity_field: config.entity_field,
        group_fields,
        rows,
    }
}

fn non_empty(terms: Vec<TermId>) -> Option<Vec<TermId>> {
    (!terms.is_empty()).then_some(terms)
}

impl Ontology {
    /// Split this ontology's annotation records with the aggregation named
    /// in `config`
    pub fn split_annotations(&self, config: &SplitConfig) -> Result<AnnotationSplits> {
        let records = self.annotations().records();
        match config.aggregation {
            Aggregation::Unique => split_annotations(records, config, &UniqueTerms),
            Aggregation::AddAncestors => {
                split_annotations(records, config, &WithAncestors::is_a(self))
            },
        }
    }
}
