//! omics-ontology - Ontology inspection and annotation splitting tool

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use omics_common::logging::{init_logging, LogLevel};
use omics_common::resources::parse_resource_arg;
use omics_common::{FileResources, SourceConfig, SourceRegistry};
use omics_ontology::output::{write_annotation_set, write_path_table, write_split_table};
use omics_ontology::{
    Aggregation, AnnotationField, AnnotationSet, AppConfig, Ontology, RelationshipType,
};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "omics-ontology")]
#[command(author, version, about = "Ontology inspection and annotation splitting tool")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Registered source name (gene_ontology, uniprot_goa, human_phenotype, interpro)
    #[arg(long, global = true, default_value = "gene_ontology", env = "OMICS_SOURCE")]
    source: String,

    /// Species for the GO annotation sources
    #[arg(long, global = true, default_value = "human")]
    species: String,

    /// Resource as NAME=PATH (repeatable)
    #[arg(long = "file", value_name = "NAME=PATH", global = true)]
    files: Vec<String>,

    /// Directory holding the source's files under their logical names
    #[arg(long, global = true, env = "OMICS_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Keep only terms of this namespace
    #[arg(long, global = true)]
    namespace: Option<String>,

    /// TOML configuration file ([logging] and [split] tables)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print term, edge and annotation counts
    Info {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// List terms without parents
    Roots,

    /// List terms without children
    Leaves,

    /// List the ancestors of the given terms
    Ancestors {
        #[arg(required = true)]
        terms: Vec<String>,

        /// Relation types to follow (default: all)
        #[arg(long = "relation")]
        relations: Vec<String>,
    },

    /// Enumerate root-to-leaf paths as a TSV table
    Paths {
        #[arg(long = "root", required = true)]
        roots: Vec<String>,

        /// Remove duplicate and shorter prefix paths
        #[arg(long)]
        dedup: bool,
    },

    /// Write the breadth-first taxonomy listing
    Taxonomy {
        #[arg(long = "root", required = true)]
        roots: Vec<String>,
    },

    /// Add ancestor terms to an `entity<TAB>terms` TSV file
    Propagate {
        /// Input TSV with a header row; terms separated by '|' or ';'
        input: PathBuf,

        /// Relation types to follow
        #[arg(long = "relation", default_value = "is_a")]
        relations: Vec<String>,

        /// Drop terms that are not in the ontology
        #[arg(long)]
        known_only: bool,
    },

    /// Write protein -> InterPro entry annotations from a protein2ipr resource
    Entries {
        /// Proteins to report, in output order (default: every matched protein)
        #[arg(long = "protein")]
        proteins: Vec<String>,

        /// Drop entries that are not in the loaded hierarchy
        #[arg(long)]
        known_only: bool,
    },

    /// Time-split the loaded annotations into train/valid/test tables
    Split {
        /// Output directory
        #[arg(short, long, default_value = "./splits")]
        out_dir: PathBuf,

        /// unique or add-ancestors (overrides the config file)
        #[arg(long)]
        aggregate: Option<Aggregation>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let app_config = match &cli.config {
        Some(path) => AppConfig::from_toml_file(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?,
        None => AppConfig::default(),
    };

    let mut log_config = app_config.logging.clone();
    log_config.log_file_prefix = "omics-ontology".to_string();
    if cli.verbose {
        log_config.level = LogLevel::Debug;
    }
    // Environment variables take precedence
    let log_config = log_config.merge_env()?;
    let _guard = init_logging(&log_config)?;

    let source = resolve_source(&cli.source, &cli.species)?;
    let resources = collect_resources(&source, &cli.files, cli.data_dir.as_deref())?;

    let mut ontology = Ontology::load(source, &resources)
        .with_context(|| format!("Failed to load source '{}'", cli.source))?;
    if let Some(namespace) = &cli.namespace {
        ontology.filter_to_namespace(namespace);
    }

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    match cli.command {
        Command::Info { json } => {
            let info = ontology.info();
            if json {
                writeln!(out, "{}", serde_json::to_string_pretty(&info)?)?;
            } else {
                writeln!(out, "{}", info)?;
            }
        },
        Command::Roots => {
            for root in ontology.roots()? {
                writeln!(out, "{}", root)?;
            }
        },
        Command::Leaves => {
            for leaf in ontology.leaves()? {
                writeln!(out, "{}", leaf)?;
            }
        },
        Command::Ancestors { terms, relations } => {
            let relations = parse_relations(&relations);
            let ancestors = ontology.ancestors_of(terms.iter().map(String::as_str), &relations)?;
            for term in ancestors {
                writeln!(out, "{}", term)?;
            }
        },
        Command::Paths { roots, dedup } => {
            let table = ontology.enumerate_paths(&roots, dedup)?;
            info!(paths = table.len(), width = table.width(), "Enumerated paths");
            write_path_table(&table, &mut out)?;
        },
        Command::Taxonomy { roots } => {
            ontology.write_taxonomy(&mut out, &roots)?;
        },
        Command::Propagate {
            input,
            relations,
            known_only,
        } => {
            let (entity_column, set) = read_annotation_tsv(&input)?;
            let mut set = ontology.add_ancestors(&set, &parse_relations(&relations));
            if known_only {
                set = ontology.restrict_to_known_terms(&set);
            }
            write_annotation_set(&set, &entity_column, &mut out)?;
        },
        Command::Entries { proteins, known_only } => {
            if ontology.interpro_matches().is_empty() {
                warn!("No InterPro matches loaded; pass protein2ipr.dat.gz with --file");
            }
            let proteins = (!proteins.is_empty()).then_some(proteins.as_slice());
            let mut set = ontology.entry_annotations(proteins);
            if known_only {
                set = ontology.restrict_to_known_terms(&set);
            }
            write_annotation_set(&set, "UniProtKB-AC", &mut out)?;
        },
        Command::Split { out_dir, aggregate } => {
            let mut config = app_config.split.clone();
            if let Some(aggregation) = aggregate {
                config.aggregation = aggregation;
            }
            if ontology.annotations().is_empty() {
                warn!("No annotation records loaded; pass a .gaf resource with --file");
            }

            let splits = ontology.split_annotations(&config)?;
            std::fs::create_dir_all(&out_dir)
                .with_context(|| format!("Failed to create {}", out_dir.display()))?;

            for (name, table) in [
                ("train", &splits.train),
                ("valid", &splits.valid),
                ("test", &splits.test),
            ] {
                let path = out_dir.join(format!("{}.tsv", name));
                let file = File::create(&path)
                    .with_context(|| format!("Failed to create {}", path.display()))?;
                write_split_table(table, ontology.source(), BufWriter::new(file))?;
                info!(rows = table.len(), path = %path.display(), "Wrote split table");
            }
        },
    }

    out.flush()?;
    Ok(())
}

fn resolve_source(name: &str, species: &str) -> Result<SourceConfig> {
    let mut registry = SourceRegistry::builtin();
    registry.register(SourceConfig::gene_ontology(species));
    registry.register(SourceConfig::uniprot_goa(Some(species)));
    Ok(registry.get(name)?.clone())
}

/// Explicit `--file` pairs first, then any of the source's files found in `data_dir`
fn collect_resources(
    source: &SourceConfig,
    files: &[String],
    data_dir: Option<&Path>,
) -> Result<FileResources> {
    let mut resources = FileResources::new();
    for arg in files {
        let (name, path) = parse_resource_arg(arg)?;
        resources.insert_path(name, path);
    }

    if let Some(dir) = data_dir {
        for name in source.file_resources.keys() {
            let path = dir.join(name);
            if !resources.contains(name) && path.exists() {
                resources.insert_path(name.clone(), path);
            }
        }
    }

    if resources.is_empty() {
        bail!(
            "No input files for source '{}'; use --file NAME=PATH or --data-dir",
            source.name
        );
    }
    Ok(resources)
}

fn parse_relations(names: &[String]) -> Vec<RelationshipType> {
    names.iter().map(|n| RelationshipType::parse(n)).collect()
}

/// Read an `entity<TAB>terms` file; returns the entity column name and the set
fn read_annotation_tsv(path: &Path) -> Result<(String, AnnotationSet)> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;

    let entity_column = reader
        .headers()?
        .get(0)
        .map(str::to_string)
        .unwrap_or_else(|| AnnotationField::EntitySymbol.column_name().to_string());

    let rows: Vec<(String, Option<String>)> = reader
        .records()
        .map(|r| {
            r.map(|record| {
                let entity = record.get(0).unwrap_or_default().to_string();
                let terms = record.get(1).filter(|t| !t.is_empty()).map(str::to_string);
                (entity, terms)
            })
        })
        .collect::<std::result::Result<_, _>>()?;

    let set = AnnotationSet::from_delimited(
        rows.iter()
            .map(|(entity, terms)| (entity.as_str(), terms.as_deref())),
    )?;
    Ok((entity_column, set))
}
