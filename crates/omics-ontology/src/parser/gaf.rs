// GAF (Gene Association File) parser, versions 1.0 through 2.2

use crate::error::{OntologyError, Result};
use crate::models::{AnnotationRecord, EvidenceCode};
use chrono::NaiveDate;
use std::io::BufRead;
use tracing::{debug, info};

/// GAF format version announced by the `!gaf-version:` header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GafVersion {
    V1_0,
    #[default]
    V2_0,
    V2_1,
    V2_2,
}

impl GafVersion {
    fn from_header(line: &str) -> Option<Self> {
        let version = line.strip_prefix("!gaf-version:")?.trim();
        match version {
            "1.0" => Some(GafVersion::V1_0),
            "2.1" => Some(GafVersion::V2_1),
            "2.2" => Some(GafVersion::V2_2),
            v if v.starts_with('2') => Some(GafVersion::V2_0),
            _ => None,
        }
    }
}

/// Records of one GAF file
#[derive(Debug, Clone, Default)]
pub struct GafFile {
    /// Header version, V2_0 when the header is missing
    pub version: GafVersion,
    pub records: Vec<AnnotationRecord>,
    /// Data lines that could not be parsed
    pub skipped: usize,
}

pub struct GafParser;

impl GafParser {
    /// Parse a GAF file
    ///
    /// GAF format: Tab-delimited, 15 to 17 columns
    /// Column 1: DB (e.g., "UniProtKB")
    /// Column 2: DB Object ID (e.g., "P01308")
    /// Column 3: DB Object Symbol
    /// Column 4: Qualifier
    /// Column 5: GO ID
    /// Column 6: DB:Reference
    /// Column 7: Evidence Code
    /// Column 8: With (or) From
    /// Column 9: Aspect (P/F/C)
    /// Column 10: DB Object Name
    /// Column 11: DB Object Synonym
    /// Column 12: DB Object Type
    /// Column 13: Taxon
    /// Column 14: Date
    /// Column 15: Assigned By
    pub fn parse<R: BufRead>(reader: R) -> Result<GafFile> {
        Self::parse_limited(reader, None)
    }

    /// Parse at most `limit` records
    pub fn parse_limited<R: BufRead>(mut reader: R, limit: Option<usize>) -> Result<GafFile> {
        let mut file = GafFile::default();
        let mut lines_processed = 0usize;
        let mut buf = Vec::new();

        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf)? == 0 {
                break;
            }

            let line = match std::str::from_utf8(&buf) {
                Ok(line) => line.trim_end_matches(&['\r', '\n'][..]),
                Err(e) => {
                    debug!("Skipping GAF line with invalid UTF-8: {}", e);
                    lines_processed += 1;
                    file.skipped += 1;
                    continue;
                },
            };

            if line.starts_with('!') {
                if let Some(version) = GafVersion::from_header(line) {
                    file.version = version;
                }
                continue;
            }
            if line.trim().is_empty() {
                continue;
            }

            if let Some(max_records) = limit {
                if file.records.len() >= max_records {
                    info!("Reached parse limit of {} records", max_records);
                    break;
                }
            }

            lines_processed += 1;
            match Self::parse_line(line) {
                Ok(record) => file.records.push(record),
                Err(e) => {
                    debug!("Failed to parse GAF line: {}", e);
                    file.skipped += 1;
                },
            }

            if lines_processed % 1_000_000 == 0 {
                info!(
                    "Processed {} lines, {} records, {} skipped",
                    lines_processed,
                    file.records.len(),
                    file.skipped
                );
            }
        }

        info!(
            version = ?file.version,
            "Parsed {} records from {} lines ({} skipped)",
            file.records.len(),
            lines_processed,
            file.skipped
        );

        Ok(file)
    }

    fn parse_line(line: &str) -> Result<AnnotationRecord> {
        let columns: Vec<&str> = line.split('\t').map(str::trim).collect();

        if columns.len() < 15 {
            return Err(OntologyError::format(format!(
                "Invalid GAF line: expected 15+ columns, got {}",
                columns.len()
            )));
        }

        let term_id = columns[4];
        if term_id.is_empty() {
            return Err(OntologyError::format("Invalid GAF line: empty term id"));
        }

        Ok(AnnotationRecord {
            db: columns[0].to_string(),
            entity_id: columns[1].to_string(),
            entity_symbol: columns[2].to_string(),
            qualifier: split_pipe(columns[3]),
            term_id: term_id.to_string(),
            evidence: EvidenceCode::new(columns[6]),
            aspect: columns[8].to_string(),
            entity_name: non_empty(columns[9]),
            entity_type: non_empty(columns[11]),
            taxon_ids: Self::parse_taxon_ids(columns[12]),
            date: Self::parse_date(columns[13]),
            assigned_by: non_empty(columns[14]),
        })
    }

    /// "taxon:9606|taxon:10090" -> ["9606", "10090"]
    fn parse_taxon_ids(taxon_str: &str) -> Vec<String> {
        taxon_str
            .split('|')
            .map(|s| s.trim().strip_prefix("taxon:").unwrap_or(s.trim()))
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Parse date from "YYYYMMDD" format
    fn parse_date(date_str: &str) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(date_str, "%Y%m%d").ok()
    }
}

fn split_pipe(s: &str) -> Vec<String> {
    s.split('|')
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

fn non_empty(s: &str) -> Option<String> {
    (!s.is_empty()).then(|| s.to_string())
}
