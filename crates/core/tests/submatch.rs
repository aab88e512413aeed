use symhound_core::db::{IndexConfig, IndexDb, SourceMeta, StoreError, SymbolFull};
use symhound_core::model::{Instruction, ListingDocument, Platform, SymbolListing};
use symhound_core::services::{
    CancelToken, MatchService, SortDirection, SubmatchOrder, SubmatchQuery,
};
use tempfile::tempdir;

fn op(i: usize) -> Instruction {
    Instruction::new(format!("op{i}"))
}

fn ops(range: std::ops::Range<usize>) -> Vec<Instruction> {
    range.map(op).collect()
}

fn symbol(name: &str, idx: i64, instructions: Vec<Instruction>) -> SymbolListing {
    SymbolListing::new(name, idx).with_instructions(instructions)
}

/// Ingest all symbols as one source and hand back the open index.
fn setup(symbols: Vec<SymbolListing>) -> IndexDb {
    let dir = tempdir().expect("tempdir");
    let config = IndexConfig { blob_root: dir.path().join("blobs"), ..IndexConfig::default() };
    let mut db = IndexDb::open_in_memory(config).expect("open index");
    let project_id = db.create_project("proj", None).expect("create project");
    let bytes =
        serde_json::to_vec(&ListingDocument::new(symbols.clone())).expect("serialize listing");
    let meta = SourceMeta {
        name: "main".to_string(),
        project_id,
        version_id: None,
        platform: Platform::N64.to_i32(),
        source_link: None,
    };
    db.insert_source(&meta, &bytes, &symbols).expect("ingest");
    db
}

fn by_name(db: &IndexDb, name: &str) -> SymbolFull {
    let metas = db.find_by_name(name).expect("search");
    let meta = metas.iter().find(|m| m.name == name).expect("symbol present");
    db.get_symbol(&meta.slug).expect("symbol")
}

#[test]
fn exact_duplicates_share_one_full_length_run() {
    let db = setup(vec![symbol("a", 0, ops(0..20)), symbol("b", 1, ops(0..20))]);
    let a = by_name(&db, "a");

    let service = MatchService::new(&db);
    let page = service
        .find_submatches(&SubmatchQuery::new(a.id, 8), &CancelToken::new())
        .expect("submatch");

    assert_eq!(page.total_count, 1);
    let row = &page.rows[0];
    assert_eq!(row.symbol.name, "b");
    assert_eq!((row.query_start, row.match_start, row.len), (0, 0, 20));
}

#[test]
fn immediate_divergence_still_matches_full_span() {
    // Same shape, every immediate bumped by one: the equivalence stream is
    // identical, so the whole symbol is one shared run.
    let with_imms = |bump: usize| -> Vec<Instruction> {
        (0..20)
            .map(|i| {
                Instruction::new(format!("op{i}"))
                    .with_arguments([format!("0x{:x}", 0x100 + i + bump)])
            })
            .collect()
    };
    let db = setup(vec![symbol("a", 0, with_imms(0)), symbol("b", 1, with_imms(1))]);
    let a = by_name(&db, "a");
    let b = by_name(&db, "b");
    assert_ne!(a.exact_hash, b.exact_hash);
    assert_eq!(a.equiv_hash, b.equiv_hash);

    let service = MatchService::new(&db);
    let page = service
        .find_submatches(&SubmatchQuery::new(a.id, 8), &CancelToken::new())
        .expect("submatch");

    assert_eq!(page.total_count, 1);
    let row = &page.rows[0];
    assert_eq!((row.query_start, row.match_start, row.len), (0, 0, 20));
}

#[test]
fn partial_overlap_reconstructs_the_shared_middle() {
    // a carries 40 instructions; b shares only a[10..30] in its middle.
    let a_stream = ops(0..40);
    let mut b_stream = ops(100..110);
    b_stream.extend(ops(10..30));
    b_stream.extend(ops(130..140));

    let db = setup(vec![symbol("a", 0, a_stream), symbol("b", 1, b_stream)]);
    let a = by_name(&db, "a");

    let service = MatchService::new(&db);
    let page = service
        .find_submatches(&SubmatchQuery::new(a.id, 10), &CancelToken::new())
        .expect("submatch");

    assert_eq!(page.total_count, 1);
    let row = &page.rows[0];
    assert_eq!(row.symbol.name, "b");
    assert_eq!((row.query_start, row.match_start, row.len), (10, 10, 20));
}

#[test]
fn repeated_blocks_report_one_row_per_diagonal() {
    // a contains the same 16-instruction block at 0 and at 30; b carries it
    // once at 5. Two diagonals, two rows.
    let block = ops(200..216);
    let mut a_stream = block.clone();
    a_stream.extend(ops(50..64));
    a_stream.extend(block.clone());

    let mut b_stream = ops(300..305);
    b_stream.extend(block);
    b_stream.extend(ops(320..325));

    let db = setup(vec![symbol("a", 0, a_stream), symbol("b", 1, b_stream)]);
    let a = by_name(&db, "a");

    let service = MatchService::new(&db);
    let page = service
        .find_submatches(&SubmatchQuery::new(a.id, 8), &CancelToken::new())
        .expect("submatch");

    assert_eq!(page.total_count, 2);
    // Equal lengths, so the tiebreak orders by query_start.
    let spans: Vec<(i64, i64, i64)> = page
        .rows
        .iter()
        .map(|r| (r.query_start, r.match_start, r.len))
        .collect();
    assert_eq!(spans, vec![(0, 5, 16), (30, 5, 16)]);

    // Role-swap symmetry: the same runs are visible from b.
    let b = by_name(&db, "b");
    let swapped = service
        .find_submatches(&SubmatchQuery::new(b.id, 8), &CancelToken::new())
        .expect("submatch from b");
    let spans: Vec<(i64, i64, i64)> = swapped
        .rows
        .iter()
        .map(|r| (r.query_start, r.match_start, r.len))
        .collect();
    assert_eq!(swapped.total_count, 2);
    assert_eq!(spans, vec![(5, 0, 16), (5, 30, 16)]);
}

#[test]
fn runs_below_the_length_floor_are_invisible() {
    // The shared block is 12 instructions; with min_len 16 nothing clears
    // the bar.
    let mut b_stream = ops(400..410);
    b_stream.extend(ops(9..21));
    let db = setup(vec![symbol("a", 0, ops(0..30)), symbol("b", 1, b_stream)]);
    let a = by_name(&db, "a");

    let service = MatchService::new(&db);
    let page = service
        .find_submatches(&SubmatchQuery::new(a.id, 16), &CancelToken::new())
        .expect("submatch");
    assert_eq!(page.total_count, 0);
    assert!(page.rows.is_empty());
}

#[test]
fn min_len_below_window_width_clamps_to_it() {
    let db = setup(vec![symbol("a", 0, ops(0..20)), symbol("b", 1, ops(0..20))]);
    let a = by_name(&db, "a");

    let service = MatchService::new(&db);
    let page = service
        .find_submatches(&SubmatchQuery::new(a.id, 3), &CancelToken::new())
        .expect("submatch");
    assert_eq!(page.total_count, 1);
    assert_eq!(page.rows[0].len, 20);
}

#[test]
fn symbols_shorter_than_a_window_yield_empty_results() {
    let db = setup(vec![symbol("a", 0, ops(0..5)), symbol("b", 1, ops(0..5))]);
    let a = by_name(&db, "a");

    let service = MatchService::new(&db);
    let page = service
        .find_submatches(&SubmatchQuery::new(a.id, 8), &CancelToken::new())
        .expect("submatch");
    assert_eq!(page.total_count, 0);
    assert!(page.rows.is_empty());
}

#[test]
fn range_restriction_narrows_and_truncates_runs() {
    let a_stream = ops(0..40);
    let mut b_stream = ops(100..110);
    b_stream.extend(ops(10..30));
    b_stream.extend(ops(130..140));
    let db = setup(vec![symbol("a", 0, a_stream), symbol("b", 1, b_stream)]);
    let a = by_name(&db, "a");
    let service = MatchService::new(&db);

    // The shared block starts at 10; a range ending before it sees nothing.
    let mut query = SubmatchQuery::new(a.id, 8);
    query.start = Some(0);
    query.end = Some(9);
    let page = service.find_submatches(&query, &CancelToken::new()).expect("submatch");
    assert_eq!(page.total_count, 0);

    // A range inside the block reports the run clipped to the range.
    let mut query = SubmatchQuery::new(a.id, 10);
    query.start = Some(12);
    query.end = Some(25);
    let page = service.find_submatches(&query, &CancelToken::new()).expect("submatch");
    assert_eq!(page.total_count, 1);
    let row = &page.rows[0];
    assert_eq!((row.query_start, row.match_start, row.len), (12, 12, 14));

    // An end past the last instruction clamps silently.
    let mut query = SubmatchQuery::new(a.id, 10);
    query.end = Some(10_000);
    let page = service.find_submatches(&query, &CancelToken::new()).expect("submatch");
    assert_eq!(page.total_count, 1);
}

#[test]
fn bad_parameters_are_rejected() {
    let db = setup(vec![symbol("a", 0, ops(0..20)), symbol("b", 1, ops(0..20))]);
    let a = by_name(&db, "a");
    let service = MatchService::new(&db);

    let mut query = SubmatchQuery::new(a.id, 8);
    query.start = Some(5);
    query.end = Some(2);
    assert!(matches!(
        service.find_submatches(&query, &CancelToken::new()),
        Err(StoreError::InvalidRange { start: 5, end: 2 })
    ));

    let mut query = SubmatchQuery::new(a.id, 8);
    query.start = Some(-3);
    assert!(matches!(
        service.find_submatches(&query, &CancelToken::new()),
        Err(StoreError::InvalidArgument(_))
    ));

    let mut query = SubmatchQuery::new(a.id, 8);
    query.page = -1;
    assert!(matches!(
        service.find_submatches(&query, &CancelToken::new()),
        Err(StoreError::InvalidArgument(_))
    ));

    let mut query = SubmatchQuery::new(a.id, 8);
    query.page_size = 0;
    assert!(matches!(
        service.find_submatches(&query, &CancelToken::new()),
        Err(StoreError::InvalidArgument(_))
    ));

    assert!(matches!(
        service.find_submatches(&SubmatchQuery::new(999_999, 8), &CancelToken::new()),
        Err(StoreError::NotFound(_))
    ));
}

#[test]
fn results_are_counted_globally_then_paginated() {
    // Three identical copies of the query symbol: three rows total.
    let db = setup(vec![
        symbol("a", 0, ops(0..20)),
        symbol("b1", 1, ops(0..20)),
        symbol("b2", 2, ops(0..20)),
        symbol("b3", 3, ops(0..20)),
    ]);
    let a = by_name(&db, "a");
    let service = MatchService::new(&db);

    let mut query = SubmatchQuery::new(a.id, 8);
    query.page_size = 2;
    let first = service.find_submatches(&query, &CancelToken::new()).expect("page 0");
    assert_eq!(first.total_count, 3);
    assert_eq!(first.rows.len(), 2);

    query.page = 1;
    let second = service.find_submatches(&query, &CancelToken::new()).expect("page 1");
    assert_eq!(second.total_count, 3);
    assert_eq!(second.rows.len(), 1);

    // Equal keys fall back to symbol id order, so pages never overlap.
    let names: Vec<String> = first
        .rows
        .iter()
        .chain(second.rows.iter())
        .map(|r| r.symbol.name.clone())
        .collect();
    assert_eq!(names, vec!["b1", "b2", "b3"]);

    query.page = 5;
    let far = service.find_submatches(&query, &CancelToken::new()).expect("page 5");
    assert_eq!(far.total_count, 3);
    assert!(far.rows.is_empty());
}

#[test]
fn sort_key_and_direction_are_honored() {
    // b shares two runs of different lengths at different query offsets.
    let mut a_stream = ops(0..12);
    a_stream.extend(ops(500..510));
    a_stream.extend(ops(20..40));
    let mut b_stream = ops(0..12);
    b_stream.extend(ops(600..610));
    b_stream.extend(ops(20..40));

    let db = setup(vec![symbol("a", 0, a_stream), symbol("b", 1, b_stream)]);
    let a = by_name(&db, "a");
    let service = MatchService::new(&db);

    // Default: length descending. The 20-run (query offset 22) comes first.
    let page = service
        .find_submatches(&SubmatchQuery::new(a.id, 8), &CancelToken::new())
        .expect("submatch");
    assert_eq!(page.total_count, 2);
    let spans: Vec<(i64, i64)> = page.rows.iter().map(|r| (r.query_start, r.len)).collect();
    assert_eq!(spans, vec![(22, 20), (0, 12)]);

    // query_start ascending flips the order.
    let mut query = SubmatchQuery::new(a.id, 8);
    query.sort_by = SubmatchOrder::QueryStart;
    query.sort_dir = SortDirection::Asc;
    let page = service.find_submatches(&query, &CancelToken::new()).expect("submatch");
    let spans: Vec<(i64, i64)> = page.rows.iter().map(|r| (r.query_start, r.len)).collect();
    assert_eq!(spans, vec![(0, 12), (22, 20)]);
}

#[test]
fn anchor_fan_out_is_capped() {
    let db = setup(vec![symbol("a", 0, ops(0..20)), symbol("b", 1, ops(0..20))]);
    let a = by_name(&db, "a");

    // The full-length duplicate produces 13 anchors; cap below that.
    let service = MatchService::new(&db).with_anchor_cap(5);
    let err = service
        .find_submatches(&SubmatchQuery::new(a.id, 8), &CancelToken::new())
        .unwrap_err();
    assert!(matches!(err, StoreError::ResourceExhausted { cap: 5, .. }), "got {err:?}");
}

#[test]
fn cancellation_yields_cancelled_not_partial_results() {
    let db = setup(vec![symbol("a", 0, ops(0..20)), symbol("b", 1, ops(0..20))]);
    let a = by_name(&db, "a");
    let service = MatchService::new(&db);

    let cancel = CancelToken::new();
    cancel.cancel();
    let err = service
        .find_submatches(&SubmatchQuery::new(a.id, 8), &cancel)
        .unwrap_err();
    assert!(matches!(err, StoreError::Cancelled));
}
