// TSV output for path tables, annotation sets and split tables

use crate::annotation::AnnotationSet;
use crate::error::Result;
use crate::models::{AnnotationField, TermId};
use crate::split::SplitTable;
use crate::traversal::PathTable;
use omics_common::SourceConfig;
use std::io::Write;

const LIST_SEPARATOR: &str = "|";

fn tsv_writer<W: Write>(writer: W) -> csv::Writer<W> {
    csv::WriterBuilder::new()
        .delimiter(b'\t')
        .flexible(false)
        .from_writer(writer)
}

fn join_terms(terms: Option<&[TermId]>) -> String {
    terms.map(|t| t.join(LIST_SEPARATOR)).unwrap_or_default()
}

/// Columns `0..width`; short rows are padded with empty cells
pub fn write_path_table<W: Write>(table: &PathTable, writer: W) -> Result<()> {
    let width = table.width();
    if width == 0 {
        return Ok(());
    }
    let mut out = tsv_writer(writer);

    out.write_record((0..width).map(|c| c.to_string()))?;
    for row in table.rows() {
        out.write_record((0..width).map(|c| row.get(c).map(String::as_str).unwrap_or("")))?;
    }
    out.flush()?;
    Ok(())
}

/// `entity<TAB>terms` with terms joined by '|'
pub fn write_annotation_set<W: Write>(set: &AnnotationSet, entity_column: &str, writer: W) -> Result<()> {
    let mut out = tsv_writer(writer);

    out.write_record([entity_column, "terms"])?;
    for (entity, terms) in set.iter() {
        out.write_record([entity, join_terms(terms).as_str()])?;
    }
    out.flush()?;
    Ok(())
}

/// Header names of a split table under `source`'s column renames
pub fn split_table_header(table: &SplitTable, source: &SourceConfig) -> Vec<String> {
    let term_column = source.rename(AnnotationField::TermId.column_name());

    let mut header = vec![source.rename(table.entity_field.column_name()).to_string()];
    header.extend(
        table
            .group_fields
            .iter()
            .map(|f| source.rename(f.column_name()).to_string()),
    );
    header.push(term_column.to_string());
    header.push(format!("neg_{}", term_column));
    header
}

pub fn write_split_table<W: Write>(table: &SplitTable, source: &SourceConfig, writer: W) -> Result<()> {
    let mut out = tsv_writer(writer);

    out.write_record(split_table_header(table, source))?;
    for row in &table.rows {
        let mut record = Vec::with_capacity(row.group.len() + 3);
        record.push(row.entity.clone());
        record.extend(row.group.iter().cloned());
        record.push(join_terms(row.positive.as_deref()));
        record.push(join_terms(row.negative.as_deref()));
        out.write_record(&record)?;
    }
    out.flush()?;
    Ok(())
}
