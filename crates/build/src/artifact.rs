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

//! Compilation artifacts and their on-disk store.
//!
//! One artifact is written per compiled contract, as `<ContractName>.json` in the
//! build directory. The document keeps the legacy solc per-contract shape: the
//! ABI is stored as a JSON *string* under `interface`, and bytecode is plain hex
//! without a `0x` prefix.

use std::{
    collections::BTreeMap,
    fs, io,
    path::{Path, PathBuf},
};

use alloy_json_abi::JsonAbi;
use foundry_compilers::artifacts::{BytecodeObject, Contract};
use referendum_common::{ReferendumError, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// Extension used for artifact files.
pub const ARTIFACT_EXTENSION: &str = "json";

/// Compiled interface and bytecode of a single contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompilationArtifact {
    /// Unqualified contract name, also the artifact's file stem
    pub contract_name: String,
    /// Source unit the contract was declared in
    #[serde(default)]
    pub source_name: String,
    /// Version of the compiler that produced this artifact
    #[serde(default)]
    pub compiler: String,
    /// JSON-encoded ABI
    pub interface: String,
    /// Creation bytecode, hex without prefix
    pub bytecode: String,
    /// Deployed bytecode, hex without prefix
    #[serde(default)]
    pub runtime_bytecode: String,
    /// Function signature to selector
    #[serde(default)]
    pub function_hashes: BTreeMap<String, String>,
}

impl CompilationArtifact {
    /// Build an artifact from one entry of the compiler output.
    pub fn from_contract(
        source_name: &str,
        contract_name: &str,
        contract: &Contract,
        compiler: &semver::Version,
    ) -> Result<Self> {
        let interface = match &contract.abi {
            Some(abi) => serde_json::to_string(abi).map_err(|e| {
                ReferendumError::Compilation(format!(
                    "cannot encode ABI of {source_name}:{contract_name}: {e}"
                ))
            })?,
            None => "[]".to_string(),
        };

        let evm = contract.evm.as_ref();
        let bytecode = evm
            .and_then(|evm| evm.bytecode.as_ref())
            .map(|bytecode| encode_bytecode(&bytecode.object))
            .unwrap_or_default();
        let runtime_bytecode = evm
            .and_then(|evm| evm.deployed_bytecode.as_ref())
            .and_then(|deployed| deployed.bytecode.as_ref())
            .map(|bytecode| encode_bytecode(&bytecode.object))
            .unwrap_or_default();
        let function_hashes =
            evm.map(|evm| evm.method_identifiers.clone().into_iter().collect()).unwrap_or_default();

        Ok(Self {
            contract_name: contract_name.to_string(),
            source_name: source_name.to_string(),
            compiler: compiler.to_string(),
            interface,
            bytecode,
            runtime_bytecode,
            function_hashes,
        })
    }

    /// Parse the stored interface into a structured ABI.
    pub fn abi(&self) -> serde_json::Result<JsonAbi> {
        serde_json::from_str(&self.interface)
    }

    /// Whether the contract has creation bytecode at all.
    ///
    /// Interfaces and abstract contracts compile to an empty object.
    pub fn is_deployable(&self) -> bool {
        !self.bytecode.is_empty()
    }

    /// Whether the bytecode still contains library link placeholders.
    pub fn needs_linking(&self) -> bool {
        self.bytecode.contains("__")
    }

    /// Decode creation bytecode. Fails on unlinked bytecode.
    pub fn bytecode_bytes(&self) -> std::result::Result<Vec<u8>, hex::FromHexError> {
        hex::decode(&self.bytecode)
    }

    /// Canonical on-disk encoding: pretty JSON terminated by a newline.
    pub fn to_json(&self) -> serde_json::Result<String> {
        let mut json = serde_json::to_string_pretty(self)?;
        json.push('\n');
        Ok(json)
    }
}

fn encode_bytecode(object: &BytecodeObject) -> String {
    match object {
        BytecodeObject::Bytecode(bytes) => hex::encode(bytes),
        BytecodeObject::Unlinked(raw) => raw.trim_start_matches("0x").to_string(),
    }
}

/// Split `"<source>:<Contract>"` into the bare contract name.
///
/// Names without a qualifier are returned unchanged.
pub fn unqualified_name(qualified: &str) -> &str {
    qualified.rsplit(':').next().unwrap_or(qualified)
}

/// Directory of artifact files, one per contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    /// Store rooted at `root`. Nothing is touched on disk until a write or reset.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Build directory this store manages.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the artifact for `contract_name`.
    pub fn artifact_path(&self, contract_name: &str) -> PathBuf {
        self.root.join(format!("{contract_name}.{ARTIFACT_EXTENSION}"))
    }

    /// Delete the build directory and recreate it empty.
    pub fn reset(&self) -> Result<()> {
        match fs::remove_dir_all(&self.root) {
            Ok(()) => debug!(path = %self.root.display(), "removed build directory"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(ReferendumError::io(&self.root, e)),
        }
        fs::create_dir_all(&self.root).map_err(|e| ReferendumError::io(&self.root, e))
    }

    /// Write `artifact`, replacing any previous file of the same name.
    pub fn write(&self, artifact: &CompilationArtifact) -> Result<PathBuf> {
        let path = self.artifact_path(&artifact.contract_name);
        let json = artifact
            .to_json()
            .map_err(|source| ReferendumError::InvalidArtifact { path: path.clone(), source })?;

        fs::create_dir_all(&self.root).map_err(|e| ReferendumError::io(&self.root, e))?;
        fs::write(&path, json).map_err(|e| ReferendumError::io(&path, e))?;

        trace!(contract = %artifact.contract_name, path = %path.display(), "wrote artifact");
        Ok(path)
    }

    /// Read the artifact for `contract_name`.
    pub fn read(&self, contract_name: &str) -> Result<CompilationArtifact> {
        let path = self.artifact_path(contract_name);
        let content = fs::read_to_string(&path).map_err(|e| ReferendumError::io(&path, e))?;
        serde_json::from_str(&content)
            .map_err(|source| ReferendumError::InvalidArtifact { path, source })
    }

    /// Names of all artifacts currently in the store, sorted.
    pub fn contract_names(&self) -> Result<Vec<String>> {
        let entries = fs::read_dir(&self.root).map_err(|e| ReferendumError::io(&self.root, e))?;

        let mut names = Vec::new();
        for entry in entries {
            let path = entry.map_err(|e| ReferendumError::io(&self.root, e))?.path();
            if path.extension().is_some_and(|ext| ext == ARTIFACT_EXTENSION) {
                if let Some(stem) = path.file_stem() {
                    names.push(stem.to_string_lossy().into_owned());
                }
            }
        }
        names.sort();
        Ok(names)
    }
}
