//! End-to-end compilation against a real solc.
//!
//! These tests download solc through svm on first use and are ignored by
//! default. Run them with `cargo test -p referendum-build -- --ignored`.

use std::{fs, path::PathBuf};

use referendum_build::{build, resolve_solc, ArtifactStore, CompilerSettings};
use referendum_common::ProjectConfig;
use serial_test::serial;
use tempfile::TempDir;

fn referendum_source() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../contracts/Referendum.sol")
}

#[test]
#[serial]
#[ignore = "installs solc through svm"]
fn test_compile_referendum_contracts() {
    let temp_dir = TempDir::new().unwrap();
    let store = ArtifactStore::new(temp_dir.path().join("build"));
    let config = ProjectConfig::default();
    let solc = resolve_solc(&config).unwrap();
    let settings = CompilerSettings::from_config(&config).unwrap();

    let report = build(&solc, &referendum_source(), &store, &settings).unwrap();

    assert_eq!(store.contract_names().unwrap(), vec!["Referendum", "ReferendumFactory"]);
    assert_eq!(report.artifacts.len(), 2);

    let referendum = store.read("Referendum").unwrap();
    let abi = referendum.abi().unwrap();
    assert!(abi.functions.contains_key("vote"));
    assert!(abi.functions.contains_key("resolve"));
    assert!(referendum.is_deployable());
    assert!(referendum.function_hashes.contains_key("vote(bool)"));

    let factory = store.read("ReferendumFactory").unwrap();
    assert!(factory.abi().unwrap().functions.contains_key("createReferendum"));
}

#[test]
#[serial]
#[ignore = "installs solc through svm"]
fn test_recompile_is_byte_identical() {
    let temp_dir = TempDir::new().unwrap();
    let store = ArtifactStore::new(temp_dir.path().join("build"));
    let config = ProjectConfig::default();
    let solc = resolve_solc(&config).unwrap();
    let settings = CompilerSettings::from_config(&config).unwrap();

    let first = build(&solc, &referendum_source(), &store, &settings).unwrap();
    let before: Vec<Vec<u8>> = first.artifacts.iter().map(|p| fs::read(p).unwrap()).collect();

    let second = build(&solc, &referendum_source(), &store, &settings).unwrap();
    let after: Vec<Vec<u8>> = second.artifacts.iter().map(|p| fs::read(p).unwrap()).collect();

    assert_eq!(before, after);
}

#[test]
#[serial]
#[ignore = "installs solc through svm"]
fn test_syntax_error_is_reported() {
    let temp_dir = TempDir::new().unwrap();
    let source = temp_dir.path().join("Broken.sol");
    fs::write(&source, "pragma solidity ^0.8.0;\ncontract Broken { uint256 x }\n").unwrap();

    let store = ArtifactStore::new(temp_dir.path().join("build"));
    let config = ProjectConfig::default();
    let solc = resolve_solc(&config).unwrap();

    let err = build(&solc, &source, &store, &CompilerSettings::default()).unwrap_err();
    assert!(err.is_compilation());
    assert!(err.to_string().contains("Broken.sol"));
}
