use std::fs;

use assert_cmd::cargo::cargo_bin_cmd;
use symhound_core::model::{Instruction, ListingDocument, SymbolListing};
use tempfile::tempdir;

#[test]
fn missing_descriptor_is_a_user_error() {
    let dir = tempdir().expect("tempdir");
    cargo_bin_cmd!("symhound")
        .arg("--db")
        .arg(dir.path().join("index.db"))
        .arg("--blobs")
        .arg(dir.path().join("blobs"))
        .arg("add-project")
        .arg("--descriptor")
        .arg(dir.path().join("nope.yaml"))
        .assert()
        .failure()
        .code(1);
}

#[test]
fn unknown_slug_is_a_user_error() {
    let dir = tempdir().expect("tempdir");
    cargo_bin_cmd!("symhound")
        .arg("--db")
        .arg(dir.path().join("index.db"))
        .arg("--blobs")
        .arg(dir.path().join("blobs"))
        .arg("show")
        .arg("zzzzz")
        .assert()
        .failure()
        .code(1);
}

#[test]
fn re_ingesting_the_same_source_identity_is_an_integrity_error() {
    let dir = tempdir().expect("tempdir");
    let listing = ListingDocument::new(vec![SymbolListing::new("f", 0).with_instructions(
        (0..10).map(|i| Instruction::new(format!("op{i}"))).collect(),
    )]);
    fs::write(
        dir.path().join("main.sym.json"),
        serde_json::to_vec(&listing).expect("serialize listing"),
    )
    .expect("write listing");
    fs::write(
        dir.path().join("symhound.yaml"),
        "name: dupe\nplatform: n64\nobjects:\n  - name: main\n    listing: main.sym.json\n",
    )
    .expect("write descriptor");

    let run = || {
        let mut cmd = cargo_bin_cmd!("symhound");
        cmd.arg("--db")
            .arg(dir.path().join("index.db"))
            .arg("--blobs")
            .arg(dir.path().join("blobs"))
            .arg("add-project")
            .arg("--descriptor")
            .arg(dir.path().join("symhound.yaml"));
        cmd
    };

    run().assert().success();
    // Same project, same object hash, same source name: Conflict, exit 2.
    run().assert().failure().code(2);
}

#[test]
fn unreachable_database_is_a_backing_store_error() {
    let dir = tempdir().expect("tempdir");
    // Pointing the database at a directory cannot work.
    cargo_bin_cmd!("symhound")
        .arg("--db")
        .arg(dir.path())
        .arg("--blobs")
        .arg(dir.path().join("blobs"))
        .arg("status")
        .assert()
        .failure()
        .code(3);
}
