// Loading and traversal tests against the fixture files

use flate2::write::GzEncoder;
use flate2::Compression;
use omics_common::{FileResources, SourceConfig};
use omics_ontology::{Ontology, OntologyError, RelationshipType};
use std::collections::BTreeSet;
use std::io::Write;
use std::path::PathBuf;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

fn load_go() -> Ontology {
    let resources = FileResources::new()
        .with_path("go-basic.obo", fixture("mini_go.obo"))
        .with_path("goa_human.gaf", fixture("mini_goa.gaf"));
    Ontology::load(SourceConfig::gene_ontology("human"), &resources).expect("Failed to load GO fixture")
}

fn set(ids: &[&str]) -> BTreeSet<String> {
    ids.iter().map(|s| s.to_string()).collect()
}

#[test]
fn test_load_obo_fixture() {
    let ontology = load_go();

    // Obsolete term is not loaded
    assert_eq!(ontology.len(), 10);
    assert!(ontology.term("GO:0000005").is_none());

    let info = ontology.info();
    assert_eq!(info.edges, 9);
    assert_eq!(info.relations.get("is_a"), Some(&7));
    assert_eq!(info.relations.get("part_of"), Some(&1));
    assert_eq!(info.relations.get("has_part"), Some(&1));
    assert_eq!(info.annotations, 10);

    let json = serde_json::to_value(&info).unwrap();
    assert_eq!(json["terms"], 10);
    assert_eq!(json["relations"]["is_a"], 7);

    let binding = ontology.term("GO:0005515").expect("protein binding");
    assert_eq!(binding.name.as_deref(), Some("protein binding"));
    assert_eq!(binding.synonyms.len(), 1);
    assert!(ontology
        .term("GO:0003674")
        .and_then(|t| t.definition.as_deref())
        .is_some_and(|d| d.starts_with("A molecular process")));
}

#[test]
fn test_roots_and_leaves_of_fixture() {
    let ontology = load_go();
    assert_eq!(ontology.roots().unwrap(), vec!["GO:0003674", "GO:0008150"]);
    assert_eq!(
        ontology.leaves().unwrap(),
        vec!["GO:0005515", "GO:0003700", "GO:0097190"]
    );
}

#[test]
fn test_ancestors_by_relation() {
    let ontology = load_go();

    let all = ontology.ancestors_of(["GO:0097190"], &[]).unwrap();
    assert_eq!(
        all,
        set(&["GO:0006915", "GO:0012501", "GO:0008219", "GO:0008150"])
    );

    // The apoptotic signaling pathway only reaches its parent through part_of
    let is_a = ontology
        .ancestors_of(["GO:0097190"], &[RelationshipType::IsA])
        .unwrap();
    assert!(is_a.is_empty());

    let both = ontology
        .ancestors_of(
            ["GO:0097190", "GO:0003700"],
            &[RelationshipType::IsA, RelationshipType::PartOf],
        )
        .unwrap();
    assert!(both.contains("GO:0008150"));
    assert!(both.contains("GO:0003674"));
    assert!(!both.contains("GO:0003677"));
}

#[test]
fn test_namespace_filter() {
    let mut ontology = load_go();
    ontology.filter_to_namespace("biological_process");

    assert_eq!(ontology.len(), 5);
    assert_eq!(ontology.roots().unwrap(), vec!["GO:0008150"]);
    assert!(matches!(
        ontology.ancestors_of(["GO:0003700"], &[]),
        Err(OntologyError::InconsistentNodeSet { .. })
    ));
}

#[test]
fn test_paths_from_fixture_roots() {
    let ontology = load_go();
    let roots = vec!["GO:0008150".to_string()];
    let table = ontology.enumerate_paths(&roots, true).unwrap();

    assert_eq!(table.len(), 1);
    assert_eq!(
        table.rows()[0],
        vec!["GO:0008150", "GO:0008219", "GO:0012501", "GO:0006915", "GO:0097190"]
    );
}

#[test]
fn test_indentation_tree_example() {
    let resources = FileResources::new().with_path("ParentChildTreeFile.txt", fixture("ParentChildTreeFile.txt"));
    let ontology = Ontology::load(SourceConfig::interpro(), &resources).unwrap();

    let graph = ontology.graph();
    assert_eq!(graph.edge_count(), 2);
    assert!(graph.has_edge("IPR000002", "IPR000001", &RelationshipType::IsA));
    assert!(graph.has_edge("IPR000003", "IPR000001", &RelationshipType::IsA));

    assert_eq!(ontology.roots().unwrap(), vec!["IPR000001"]);
    assert_eq!(ontology.leaves().unwrap(), vec!["IPR000002", "IPR000003"]);
    assert_eq!(
        ontology.term("IPR000003").and_then(|t| t.parent.as_deref()),
        Some("IPR000001")
    );
}

#[test]
fn test_gzipped_resources_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let obo = std::fs::read(fixture("mini_go.obo")).unwrap();

    let path = dir.path().join("go-basic.obo.gz");
    let mut encoder = GzEncoder::new(std::fs::File::create(&path).unwrap(), Compression::default());
    encoder.write_all(&obo).unwrap();
    encoder.finish().unwrap();

    let resources = FileResources::new().with_path("go-basic.obo.gz", &path);
    let ontology = Ontology::load(SourceConfig::gene_ontology("human"), &resources).unwrap();
    assert_eq!(ontology.len(), 10);
    assert!(ontology.annotations().is_empty());
}

#[test]
fn test_missing_hierarchy_is_format_error() {
    let resources = FileResources::new().with_path("goa_human.gaf", fixture("mini_goa.gaf"));
    let result = Ontology::load(SourceConfig::gene_ontology("human"), &resources);
    assert!(matches!(result, Err(OntologyError::Format(_))));
}

#[test]
fn test_taxonomy_listing() {
    let ontology = load_go();
    let mut out = Vec::new();
    ontology
        .write_taxonomy(&mut out, &["GO:0003674".to_string()])
        .unwrap();

    let text = String::from_utf8(out).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "Root\tGO:0003674");
    assert_eq!(lines[1], "GO:0003674\tGO:0005488\tGO:0003700");
    assert_eq!(lines[2], "GO:0005488\tGO:0005515\tGO:0003677");
    assert_eq!(lines.len(), 3);
}
