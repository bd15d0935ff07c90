// Referendum - Solidity build and contract-handle toolkit
// Copyright (C) 2024 Zhuo Zhang and Wuqi Zhang
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Contract compilation
//!
//! This module compiles the single-file Solidity source into one
//! [`CompilationArtifact`] per contract and writes them to the build directory.
//!
//! # Workflow
//!
//! 1. Wipe and recreate the build directory
//! 2. Read the source file and wrap it in a standard-JSON compiler input
//! 3. Run the compiler with the optimizer settings from the project config
//! 4. Fail on any error diagnostic, log warnings
//! 5. Write one `<ContractName>.json` per compiled contract

use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};

use foundry_compilers::{
    artifacts::{
        output_selection::OutputSelection, CompilerOutput, EvmVersion, Settings, SolcInput,
        Source, Sources,
    },
    solc::{Solc, SolcLanguage},
};
use referendum_common::{ProjectConfig, ReferendumError, Result, DEFAULT_OPTIMIZER_RUNS};
use semver::Version;
use tracing::{debug, info, trace, warn};

use crate::{format_compiler_errors, unqualified_name, ArtifactStore, CompilationArtifact};

/// Source name used when the input path has no file name component.
const FALLBACK_SOURCE_NAME: &str = "Contract.sol";

/// The external compiler boundary.
///
/// Implemented for [`Solc`]. Anything that can turn a standard-JSON input into
/// standard-JSON output can stand in for it.
pub trait SolidityCompiler {
    /// Version of the underlying compiler, recorded in every artifact.
    fn solc_version(&self) -> &Version;

    /// Run the compiler on `input`.
    ///
    /// Diagnostics reported by the compiler are part of the returned output;
    /// `Err` is reserved for failures to run the compiler at all.
    fn compile_input(&self, input: &SolcInput) -> Result<CompilerOutput>;
}

impl SolidityCompiler for Solc {
    fn solc_version(&self) -> &Version {
        &self.version
    }

    fn compile_input(&self, input: &SolcInput) -> Result<CompilerOutput> {
        self.compile_exact(input).map_err(|e| {
            ReferendumError::Compilation(format!("failed to run solc {}: {e}", self.version))
        })
    }
}

/// Locate the compiler described by `config`.
///
/// An explicit `solc_path` wins. Otherwise the configured version is looked up
/// among installed compilers and installed through svm if missing.
pub fn resolve_solc(config: &ProjectConfig) -> Result<Solc> {
    if let Some(path) = &config.solc_path {
        debug!(path = %path.display(), "using explicit solc binary");
        return Solc::new(path).map_err(|e| {
            ReferendumError::Compilation(format!("cannot use solc at {}: {e}", path.display()))
        });
    }

    let version = Version::parse(&config.solc_version).map_err(|e| {
        ReferendumError::Config(format!("invalid solc version '{}': {e}", config.solc_version))
    })?;
    let solc = Solc::find_or_install(&version).map_err(|e| {
        ReferendumError::Compilation(format!("cannot find or install solc {version}: {e}"))
    })?;
    trace!(solc = ?solc, "using compiler");

    Ok(solc)
}

/// Settings passed to the compiler on every run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompilerSettings {
    /// Whether the optimizer is enabled
    pub optimizer: bool,
    /// Optimizer runs
    pub optimizer_runs: usize,
    /// Target EVM version
    pub evm_version: EvmVersion,
}

impl Default for CompilerSettings {
    fn default() -> Self {
        Self {
            optimizer: true,
            optimizer_runs: DEFAULT_OPTIMIZER_RUNS,
            evm_version: EvmVersion::Paris,
        }
    }
}

impl CompilerSettings {
    /// Derive settings from the project configuration.
    pub fn from_config(config: &ProjectConfig) -> Result<Self> {
        let evm_version = EvmVersion::from_str(&config.evm_version).map_err(|e| {
            ReferendumError::Config(format!("invalid evm version '{}': {e}", config.evm_version))
        })?;

        Ok(Self {
            optimizer: config.optimizer.enabled,
            optimizer_runs: config.optimizer.runs,
            evm_version,
        })
    }

    /// Standard-JSON settings for these options.
    pub fn to_solc_settings(&self) -> Settings {
        let mut settings = Settings::new(OutputSelection::complete_output_selection());
        settings.optimizer.enabled = Some(self.optimizer);
        settings.optimizer.runs = Some(self.optimizer_runs);
        settings.evm_version = Some(self.evm_version);
        settings
    }
}

/// Outcome of a successful build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildReport {
    /// Source file that was compiled
    pub source: PathBuf,
    /// Compiler version used
    pub compiler_version: Version,
    /// Artifact files written, in contract-name order
    pub artifacts: Vec<PathBuf>,
}

/// Compile the Solidity source at `source_path` into artifacts.
///
/// Nothing is written to disk; see [`build`] for the full step.
pub fn compile_source<C: SolidityCompiler + ?Sized>(
    compiler: &C,
    source_path: &Path,
    settings: &CompilerSettings,
) -> Result<Vec<CompilationArtifact>> {
    let content =
        fs::read_to_string(source_path).map_err(|e| ReferendumError::io(source_path, e))?;
    let source_name = source_path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| FALLBACK_SOURCE_NAME.to_string());

    compile_text(compiler, &source_name, &content, settings)
}

/// Compile in-memory Solidity `content` registered under `source_name`.
///
/// Returns the artifacts sorted by contract name.
pub fn compile_text<C: SolidityCompiler + ?Sized>(
    compiler: &C,
    source_name: &str,
    content: &str,
    settings: &CompilerSettings,
) -> Result<Vec<CompilationArtifact>> {
    let sources =
        Sources::from_iter([(PathBuf::from(source_name), Source::new(content.to_string()))]);
    let input = SolcInput::new(SolcLanguage::Solidity, sources, settings.to_solc_settings());

    info!(
        source = source_name,
        solc = %compiler.solc_version(),
        optimizer = settings.optimizer,
        runs = settings.optimizer_runs,
        "compiling"
    );
    let output = compiler.compile_input(&input)?;

    for diagnostic in output.errors.iter().filter(|e| !e.is_error()) {
        warn!(severity = ?diagnostic.severity, "{}", diagnostic.message.trim());
    }
    if output.errors.iter().any(|e| e.is_error()) {
        return Err(ReferendumError::Compilation(format_compiler_errors(
            &output.errors,
            source_name,
            content,
        )));
    }

    let mut artifacts: BTreeMap<String, CompilationArtifact> = BTreeMap::new();
    for (path, contracts) in &output.contracts {
        let unit = path.to_string_lossy();
        for (name, contract) in contracts {
            let qualified = format!("{unit}:{name}");
            let contract_name = unqualified_name(&qualified);

            let artifact = CompilationArtifact::from_contract(
                &unit,
                contract_name,
                contract,
                compiler.solc_version(),
            )?;
            if !artifact.is_deployable() {
                warn!(contract = %qualified, "contract has no bytecode (interface or abstract)");
            }

            if artifacts.insert(contract_name.to_string(), artifact).is_some() {
                return Err(ReferendumError::Compilation(format!(
                    "duplicate contract name '{contract_name}'"
                )));
            }
            debug!(contract = %qualified, "compiled");
        }
    }

    Ok(artifacts.into_values().collect())
}

/// Run the full build step: wipe the build directory, compile, write artifacts.
///
/// The directory is cleared before compiling, so a failed compile leaves it
/// empty rather than holding artifacts from an earlier source.
pub fn build<C: SolidityCompiler + ?Sized>(
    compiler: &C,
    source_path: &Path,
    store: &ArtifactStore,
    settings: &CompilerSettings,
) -> Result<BuildReport> {
    store.reset()?;
    compile_into(compiler, source_path, store, settings)
}

/// Build the project described by `config` into `store`.
///
/// The directory is cleared before the settings are validated and before solc
/// is resolved, so a bad compiler path, version or EVM target also leaves it
/// empty.
pub fn build_project(config: &ProjectConfig, store: &ArtifactStore) -> Result<BuildReport> {
    store.reset()?;

    let settings = CompilerSettings::from_config(config)?;
    let solc = resolve_solc(config)?;
    compile_into(&solc, &config.source, store, &settings)
}

/// Compile `source_path` and write its artifacts into an already reset `store`.
fn compile_into<C: SolidityCompiler + ?Sized>(
    compiler: &C,
    source_path: &Path,
    store: &ArtifactStore,
    settings: &CompilerSettings,
) -> Result<BuildReport> {
    let artifacts = compile_source(compiler, source_path, settings)?;

    let mut written = Vec::with_capacity(artifacts.len());
    for artifact in &artifacts {
        let path = store.write(artifact)?;
        info!(contract = %artifact.contract_name, path = %path.display(), "wrote artifact");
        written.push(path);
    }

    Ok(BuildReport {
        source: source_path.to_path_buf(),
        compiler_version: compiler.solc_version().clone(),
        artifacts: written,
    })
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use serde_json::{json, Value};
    use tempfile::TempDir;

    use super::*;

    /// Compiler double returning a fixed standard-JSON output.
    struct CannedCompiler {
        version: Version,
        output: Value,
        last_input: RefCell<Option<SolcInput>>,
    }

    impl CannedCompiler {
        fn new(output: Value) -> Self {
            Self { version: Version::new(0, 8, 19), output, last_input: RefCell::new(None) }
        }
    }

    impl SolidityCompiler for CannedCompiler {
        fn solc_version(&self) -> &Version {
            &self.version
        }

        fn compile_input(&self, input: &SolcInput) -> Result<CompilerOutput> {
            *self.last_input.borrow_mut() = Some(input.clone());
            Ok(serde_json::from_value(self.output.clone()).unwrap())
        }
    }

    fn contract_output(abi: Value, bytecode: &str, selectors: Value) -> Value {
        json!({
            "abi": abi,
            "evm": {
                "bytecode": { "object": bytecode, "linkReferences": {} },
                "deployedBytecode": { "object": bytecode, "linkReferences": {} },
                "methodIdentifiers": selectors,
            }
        })
    }

    fn referendum_output() -> Value {
        json!({
            "errors": [],
            "sources": {},
            "contracts": {
                "Referendum.sol": {
                    "Referendum": contract_output(
                        json!([{
                            "type": "function",
                            "name": "vote",
                            "inputs": [{ "name": "support", "type": "bool", "internalType": "bool" }],
                            "outputs": [],
                            "stateMutability": "nonpayable"
                        }]),
                        "6080604052348015600f57600080fd5b50",
                        json!({ "vote(bool)": "4b9f5c98" }),
                    ),
                    "ReferendumFactory": contract_output(
                        json!([{
                            "type": "function",
                            "name": "deployedReferendums",
                            "inputs": [],
                            "outputs": [{ "name": "", "type": "address[]", "internalType": "address[]" }],
                            "stateMutability": "view"
                        }]),
                        "608060405234801561001057600080fd5b50",
                        json!({ "deployedReferendums()": "0c5cd7c5" }),
                    ),
                }
            }
        })
    }

    fn write_source(dir: &Path) -> PathBuf {
        let path = dir.join("Referendum.sol");
        fs::write(&path, "pragma solidity ^0.8.0;\ncontract Referendum {}\n").unwrap();
        path
    }

    #[test]
    fn test_settings_from_default_config() {
        let settings = CompilerSettings::from_config(&ProjectConfig::default()).unwrap();
        assert!(settings.optimizer);
        assert_eq!(settings.optimizer_runs, 200);
        assert_eq!(settings.evm_version, EvmVersion::Paris);

        let solc_settings = settings.to_solc_settings();
        assert_eq!(solc_settings.optimizer.enabled, Some(true));
        assert_eq!(solc_settings.optimizer.runs, Some(200));
        assert_eq!(solc_settings.evm_version, Some(EvmVersion::Paris));
    }

    #[test]
    fn test_settings_reject_unknown_evm_version() {
        let config = ProjectConfig { evm_version: "frontierX".to_string(), ..Default::default() };
        let err = CompilerSettings::from_config(&config).unwrap_err();
        assert!(matches!(err, ReferendumError::Config(_)));
    }

    #[test]
    fn test_resolve_solc_rejects_bad_version() {
        let config = ProjectConfig { solc_version: "latest".to_string(), ..Default::default() };
        let err = resolve_solc(&config).unwrap_err();
        assert!(matches!(err, ReferendumError::Config(_)));
    }

    #[test]
    fn test_compile_produces_one_artifact_per_contract() {
        let temp_dir = TempDir::new().unwrap();
        let source = write_source(temp_dir.path());
        let compiler = CannedCompiler::new(referendum_output());

        let artifacts = compile_source(&compiler, &source, &CompilerSettings::default()).unwrap();

        let names: Vec<_> = artifacts.iter().map(|a| a.contract_name.as_str()).collect();
        assert_eq!(names, vec!["Referendum", "ReferendumFactory"]);
        for artifact in &artifacts {
            assert!(!artifact.interface.is_empty());
            assert!(!artifact.bytecode.is_empty());
            assert_eq!(artifact.source_name, "Referendum.sol");
            assert_eq!(artifact.compiler, "0.8.19");
        }
        assert_eq!(artifacts[0].function_hashes["vote(bool)"], "4b9f5c98");
        assert_eq!(artifacts[0].abi().unwrap().functions.len(), 1);
    }

    #[test]
    fn test_compile_sends_source_and_optimizer() {
        let temp_dir = TempDir::new().unwrap();
        let source = write_source(temp_dir.path());
        let compiler = CannedCompiler::new(referendum_output());

        compile_source(&compiler, &source, &CompilerSettings::default()).unwrap();

        let input = compiler.last_input.borrow().clone().unwrap();
        assert_eq!(input.sources.len(), 1);
        let (name, content) = input.sources.iter().next().unwrap();
        assert_eq!(name, &PathBuf::from("Referendum.sol"));
        assert!(content.content.contains("contract Referendum"));
        assert_eq!(input.settings.optimizer.enabled, Some(true));
    }

    #[test]
    fn test_missing_source_is_io_error() {
        let temp_dir = TempDir::new().unwrap();
        let compiler = CannedCompiler::new(referendum_output());

        let err = compile_source(
            &compiler,
            &temp_dir.path().join("Missing.sol"),
            &CompilerSettings::default(),
        )
        .unwrap_err();

        assert!(matches!(err, ReferendumError::Io { .. }));
        assert!(compiler.last_input.borrow().is_none());
    }

    #[test]
    fn test_error_diagnostic_fails_compilation() {
        let compiler = CannedCompiler::new(json!({
            "errors": [{
                "sourceLocation": { "file": "Referendum.sol", "start": 24, "end": 32 },
                "secondarySourceLocations": [],
                "type": "ParserError",
                "component": "general",
                "severity": "error",
                "message": "Expected pragma, import directive or contract/interface/library/struct/enum/constant/function/error definition."
            }],
            "sources": {},
            "contracts": {}
        }));

        let err = compile_text(
            &compiler,
            "Referendum.sol",
            "pragma solidity ^0.8.0;\ncontrac Referendum {}\n",
            &CompilerSettings::default(),
        )
        .unwrap_err();

        assert!(err.is_compilation());
        let msg = err.to_string();
        assert!(msg.contains("Expected pragma"));
        assert!(msg.contains("contrac Referendum"));
    }

    #[test]
    fn test_warnings_do_not_fail_compilation() {
        let mut output = referendum_output();
        output["errors"] = json!([{
            "secondarySourceLocations": [],
            "type": "Warning",
            "component": "general",
            "severity": "warning",
            "message": "SPDX license identifier not provided in source file."
        }]);
        let compiler = CannedCompiler::new(output);

        let artifacts =
            compile_text(&compiler, "Referendum.sol", "", &CompilerSettings::default()).unwrap();
        assert_eq!(artifacts.len(), 2);
    }

    #[test]
    fn test_build_writes_artifacts_and_clears_stale_ones() {
        let temp_dir = TempDir::new().unwrap();
        let source = write_source(temp_dir.path());
        let store = ArtifactStore::new(temp_dir.path().join("build"));
        fs::create_dir_all(store.root()).unwrap();
        fs::write(store.artifact_path("RemovedContract"), "{}").unwrap();

        let compiler = CannedCompiler::new(referendum_output());
        let report = build(&compiler, &source, &store, &CompilerSettings::default()).unwrap();

        assert_eq!(
            report.artifacts,
            vec![store.artifact_path("Referendum"), store.artifact_path("ReferendumFactory")]
        );
        assert_eq!(report.compiler_version, Version::new(0, 8, 19));
        assert_eq!(store.contract_names().unwrap(), vec!["Referendum", "ReferendumFactory"]);
        assert!(!store.artifact_path("RemovedContract").exists());

        let json: Value =
            serde_json::from_str(&fs::read_to_string(&report.artifacts[1]).unwrap()).unwrap();
        assert!(!json["interface"].as_str().unwrap().is_empty());
        assert!(!json["bytecode"].as_str().unwrap().is_empty());
    }

    #[test]
    fn test_rebuild_is_byte_identical() {
        let temp_dir = TempDir::new().unwrap();
        let source = write_source(temp_dir.path());
        let store = ArtifactStore::new(temp_dir.path().join("build"));
        let compiler = CannedCompiler::new(referendum_output());

        let first = build(&compiler, &source, &store, &CompilerSettings::default()).unwrap();
        let before: Vec<Vec<u8>> = first.artifacts.iter().map(|p| fs::read(p).unwrap()).collect();

        let second = build(&compiler, &source, &store, &CompilerSettings::default()).unwrap();
        let after: Vec<Vec<u8>> = second.artifacts.iter().map(|p| fs::read(p).unwrap()).collect();

        assert_eq!(before, after);
    }

    #[test]
    fn test_failed_build_leaves_empty_directory() {
        let temp_dir = TempDir::new().unwrap();
        let store = ArtifactStore::new(temp_dir.path().join("build"));
        fs::create_dir_all(store.root()).unwrap();
        fs::write(store.artifact_path("Referendum"), "{}").unwrap();

        let compiler = CannedCompiler::new(referendum_output());
        let err = build(
            &compiler,
            &temp_dir.path().join("Missing.sol"),
            &store,
            &CompilerSettings::default(),
        )
        .unwrap_err();

        assert!(matches!(err, ReferendumError::Io { .. }));
        assert!(store.contract_names().unwrap().is_empty());
    }

    #[test]
    fn test_build_project_clears_before_resolving_solc() {
        let temp_dir = TempDir::new().unwrap();
        let store = ArtifactStore::new(temp_dir.path().join("build"));
        fs::create_dir_all(store.root()).unwrap();
        fs::write(store.artifact_path("Stale"), "{}").unwrap();

        let config = ProjectConfig {
            source: write_source(temp_dir.path()),
            solc_path: Some(temp_dir.path().join("no-such-solc")),
            ..Default::default()
        };
        let err = build_project(&config, &store).unwrap_err();

        assert!(err.is_compilation());
        assert!(store.root().is_dir());
        assert!(store.contract_names().unwrap().is_empty());
    }

    #[test]
    fn test_build_project_clears_before_validating_settings() {
        let temp_dir = TempDir::new().unwrap();
        let store = ArtifactStore::new(temp_dir.path().join("build"));
        fs::create_dir_all(store.root()).unwrap();
        fs::write(store.artifact_path("Stale"), "{}").unwrap();

        let config = ProjectConfig { evm_version: "frontierX".to_string(), ..Default::default() };
        let err = build_project(&config, &store).unwrap_err();

        assert!(matches!(err, ReferendumError::Config(_)));
        assert!(!store.artifact_path("Stale").exists());
    }
}
