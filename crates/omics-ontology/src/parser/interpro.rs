// InterPro entry list, interpro2go and protein2ipr parsers

use crate::error::Result;
use crate::models::{Term, TermId};
use serde::Deserialize;
use std::io::{BufRead, Read};
use tracing::{debug, info, warn};

/// Row of `entry.list`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct InterProEntry {
    #[serde(rename = "ENTRY_AC")]
    pub accession: String,

    /// Family, Domain, Homologous_superfamily, ...
    #[serde(rename = "ENTRY_TYPE")]
    pub entry_type: String,

    #[serde(rename = "ENTRY_NAME")]
    pub name: String,
}

impl InterProEntry {
    pub fn to_term(&self) -> Term {
        Term::new(self.accession.clone())
            .with_name(self.name.clone())
            .with_namespace(self.entry_type.clone())
    }
}

/// One line of `interpro2go`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterProGoMapping {
    pub accession: String,
    pub go_id: TermId,
    pub go_name: String,
}

/// One line of `protein2ipr.dat`: an InterPro entry matched on a protein
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterProMatch {
    /// UniProtKB accession
    pub protein: String,
    pub accession: TermId,
    /// Member database signature behind the match
    pub signature: String,
    pub start: u32,
    pub stop: u32,
}

/// Column order of `protein2ipr.dat`, which has no header row
#[derive(Debug, Deserialize)]
struct Protein2IprRow(String, String, String, String, u32, u32);

pub struct InterProParser;

impl InterProParser {
    /// Parse the tab-separated entry list (with header row)
    pub fn parse_entries<R: Read>(reader: R) -> Result<Vec<InterProEntry>> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .flexible(true)
            .from_reader(reader);

        let entries = csv_reader
            .deserialize()
            .collect::<std::result::Result<Vec<InterProEntry>, _>>()?;

        info!(entries = entries.len(), "Parsed InterPro entry list");
        Ok(entries)
    }

    /// Parse interpro2go lines:
    /// `InterPro:IPR000003 Retinoid X receptor/HNF4 > GO:DNA binding ; GO:0003677`
    pub fn parse_interpro2go<R: BufRead>(reader: R) -> Result<Vec<InterProGoMapping>> {
        let mut mappings = Vec::new();

        for line in reader.lines() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() || line.starts_with('!') {
                continue;
            }

            match Self::parse_mapping(line) {
                Some(mapping) => mappings.push(mapping),
                None => debug!(line, "Skipping malformed interpro2go line"),
            }
        }

        if mappings.is_empty() {
            warn!("interpro2go contains no mappings");
            return Ok(mappings);
        }

        info!(mappings = mappings.len(), "Parsed interpro2go");
        Ok(mappings)
    }

    /// Parse tab-separated `protein2ipr` lines:
    /// `UniProtKB-AC  ENTRY_AC  ENTRY_NAME  signature  start  stop`.
    /// Lines that do not fit the columns are skipped; read failures are errors.
    pub fn parse_protein2ipr<R: Read>(reader: R) -> Result<Vec<InterProMatch>> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(false)
            .flexible(true)
            .quoting(false)
            .from_reader(reader);

        let mut matches = Vec::new();
        let mut skipped = 0usize;
        for row in csv_reader.deserialize::<Protein2IprRow>() {
            match row {
                Ok(Protein2IprRow(protein, accession, _name, signature, start, stop)) => {
                    matches.push(InterProMatch {
                        protein,
                        accession,
                        signature,
                        start,
                        stop,
                    });
                },
                Err(e) if e.is_io_error() => return Err(e.into()),
                Err(e) => {
                    debug!("Skipping malformed protein2ipr line: {}", e);
                    skipped += 1;
                },
            }
        }

        info!(matches = matches.len(), skipped, "Parsed protein2ipr");
        Ok(matches)
    }

    fn parse_mapping(line: &str) -> Option<InterProGoMapping> {
        let (interpro, go) = line.split_once(" > ")?;
        let accession = interpro.split_whitespace().next()?;
        let accession = accession.strip_prefix("InterPro:").unwrap_or(accession);

        let (go_name, go_id) = go.rsplit_once(';')?;
        let go_name = go_name.trim();
        let go_name = go_name.strip_prefix("GO:").unwrap_or(go_name);

        Some(InterProGoMapping {
            accession: accession.to_string(),
            go_id: go_id.trim().to_string(),
            go_name: go_name.to_string(),
        })
    }
}
