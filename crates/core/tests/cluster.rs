use symhound_core::db::{IndexConfig, IndexDb, SourceMeta, SourceReceipt, StoreError};
use symhound_core::model::{Instruction, ListingDocument, Platform, SymbolListing};
use symhound_core::services::{clusters_for_source, ClusterOptions};
use tempfile::tempdir;

fn ops(range: std::ops::Range<usize>) -> Vec<Instruction> {
    range.map(|i| Instruction::new(format!("op{i}"))).collect()
}

fn symbol(name: &str, idx: i64, instructions: Vec<Instruction>) -> SymbolListing {
    SymbolListing::new(name, idx).with_instructions(instructions)
}

fn open_db() -> IndexDb {
    let dir = tempdir().expect("tempdir");
    let config = IndexConfig { blob_root: dir.path().join("blobs"), ..IndexConfig::default() };
    IndexDb::open_in_memory(config).expect("open index")
}

fn ingest(
    db: &mut IndexDb,
    project_id: i64,
    name: &str,
    symbols: Vec<SymbolListing>,
) -> SourceReceipt {
    let bytes =
        serde_json::to_vec(&ListingDocument::new(symbols.clone())).expect("serialize listing");
    let meta = SourceMeta {
        name: name.to_string(),
        project_id,
        version_id: None,
        platform: Platform::N64.to_i32(),
        source_link: None,
    };
    db.insert_source(&meta, &bytes, &symbols).expect("ingest")
}

#[test]
fn exact_duplicates_cluster_largest_first() {
    let mut db = open_db();
    let project_id = db.create_project("proj", None).expect("create project");
    let receipt = ingest(
        &mut db,
        project_id,
        "main",
        vec![
            symbol("triple_a", 0, ops(0..10)),
            symbol("triple_b", 1, ops(0..10)),
            symbol("triple_c", 2, ops(0..10)),
            symbol("pair_a", 3, ops(20..30)),
            symbol("pair_b", 4, ops(20..30)),
            symbol("loner", 5, ops(40..50)),
        ],
    );

    let clusters = clusters_for_source(&db, receipt.source_id, &ClusterOptions::default())
        .expect("clusters");

    assert_eq!(clusters.len(), 2);
    assert_eq!(clusters[0].size(), 3);
    assert_eq!(clusters[1].size(), 2);
    let triple: Vec<&str> = clusters[0].symbols.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(triple, vec!["triple_a", "triple_b", "triple_c"]);
}

#[test]
fn min_size_filters_small_clusters() {
    let mut db = open_db();
    let project_id = db.create_project("proj", None).expect("create project");
    let receipt = ingest(
        &mut db,
        project_id,
        "main",
        vec![
            symbol("triple_a", 0, ops(0..10)),
            symbol("triple_b", 1, ops(0..10)),
            symbol("triple_c", 2, ops(0..10)),
            symbol("pair_a", 3, ops(20..30)),
            symbol("pair_b", 4, ops(20..30)),
        ],
    );

    let options = ClusterOptions { min_size: 3, ..ClusterOptions::default() };
    let clusters = clusters_for_source(&db, receipt.source_id, &options).expect("clusters");
    assert_eq!(clusters.len(), 1);
    assert_eq!(clusters[0].size(), 3);
}

#[test]
fn project_wide_scope_sees_across_sources() {
    let mut db = open_db();
    let project_id = db.create_project("proj", None).expect("create project");
    let first = ingest(
        &mut db,
        project_id,
        "v1",
        vec![symbol("shared", 0, ops(0..10)), symbol("only_v1", 1, ops(20..30))],
    );
    ingest(
        &mut db,
        project_id,
        "v2",
        vec![symbol("shared", 0, ops(0..10)), symbol("only_v2", 1, ops(40..50))],
    );

    // Within one source the shared function is a singleton.
    let scoped = clusters_for_source(&db, first.source_id, &ClusterOptions::default())
        .expect("clusters");
    assert!(scoped.is_empty());

    // Project-wide it pairs up with its copy in the other version.
    let options = ClusterOptions { project_wide: true, ..ClusterOptions::default() };
    let wide = clusters_for_source(&db, first.source_id, &options).expect("clusters");
    assert_eq!(wide.len(), 1);
    assert_eq!(wide[0].size(), 2);
    assert!(wide[0].symbols.iter().all(|s| s.name == "shared"));
}

#[test]
fn unknown_sources_are_not_found() {
    let db = open_db();
    let err = clusters_for_source(&db, 42, &ClusterOptions::default()).unwrap_err();
    assert!(matches!(err, StoreError::NotFound(_)));
}
