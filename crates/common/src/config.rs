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

//! Project configuration
//!
//! Everything the build and handle steps need is read from an optional
//! `Referendum.toml` at the project root. Missing keys fall back to the
//! defaults below, and command-line flags override both.
//!
//! Factory deployments are named. Two factory addresses are known and neither is
//! authoritative, so the caller always has to pick one by name.

use std::{
    collections::BTreeMap,
    fmt, fs,
    path::{Path, PathBuf},
};

use alloy_primitives::{address, Address};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{ReferendumError, Result};

/// Config file looked up in the working directory when none is given.
pub const DEFAULT_CONFIG_FILE: &str = "Referendum.toml";

/// Default Solidity source compiled by the build step.
pub const DEFAULT_SOURCE: &str = "contracts/Referendum.sol";

/// Default artifact output directory.
pub const DEFAULT_BUILD_DIR: &str = "build";

/// Compiler version used when none is configured.
pub const DEFAULT_SOLC_VERSION: &str = "0.8.19";

/// EVM version used when none is configured.
pub const DEFAULT_EVM_VERSION: &str = "paris";

/// Optimizer runs used when none are configured.
pub const DEFAULT_OPTIMIZER_RUNS: usize = 200;

/// Factory address found in the factory handle module.
pub const PRIMARY_FACTORY_ADDRESS: Address =
    address!("0x6080a807192363646fE8110F681c890B436faD36");

/// Factory address found in the duplicate factory handle module.
pub const SECONDARY_FACTORY_ADDRESS: Address =
    address!("0x6cf8bD9Bf474b4ED775C642B87F963e2d28e4fC5");

/// Top-level project configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    /// Solidity source file to compile
    pub source: PathBuf,
    /// Directory artifacts are written to (wiped on every compile)
    pub build_dir: PathBuf,
    /// solc version to find or install
    pub solc_version: String,
    /// Explicit solc binary; takes precedence over `solc_version`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub solc_path: Option<PathBuf>,
    /// Target EVM version passed to solc
    pub evm_version: String,
    /// JSON-RPC endpoint handles are bound to, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rpc_url: Option<String>,
    /// Optimizer settings
    pub optimizer: OptimizerConfig,
    /// Named factory deployments
    pub deployments: BTreeMap<String, Address>,
}

/// Optimizer configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerConfig {
    /// Whether the optimizer runs at all
    pub enabled: bool,
    /// Expected number of contract runs to optimize for
    pub runs: usize,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self { enabled: true, runs: DEFAULT_OPTIMIZER_RUNS }
    }
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            source: PathBuf::from(DEFAULT_SOURCE),
            build_dir: PathBuf::from(DEFAULT_BUILD_DIR),
            solc_version: DEFAULT_SOLC_VERSION.to_string(),
            solc_path: None,
            evm_version: DEFAULT_EVM_VERSION.to_string(),
            rpc_url: None,
            optimizer: OptimizerConfig::default(),
            deployments: BTreeMap::from([
                ("primary".to_string(), PRIMARY_FACTORY_ADDRESS),
                ("secondary".to_string(), SECONDARY_FACTORY_ADDRESS),
            ]),
        }
    }
}

impl ProjectConfig {
    /// Load configuration from `path`, using defaults if the file doesn't exist.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            debug!(path = %path.display(), "config file not found, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| ReferendumError::io(path, e))?;
        let config = Self::from_toml(&content).map_err(|e| match e {
            ReferendumError::Config(msg) => {
                ReferendumError::Config(format!("{}: {msg}", path.display()))
            }
            other => other,
        })?;

        debug!(path = %path.display(), "loaded project configuration");
        Ok(config)
    }

    /// Parse configuration from a TOML document.
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| ReferendumError::Config(e.to_string()))
    }

    /// Serialize configuration to a TOML document.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| ReferendumError::Config(e.to_string()))
    }

    /// Look up a named deployment.
    pub fn deployment(&self, name: &str) -> Result<Deployment> {
        self.deployments
            .get(name)
            .map(|factory| Deployment::new(name, *factory))
            .ok_or_else(|| {
                let known = self.deployments.keys().cloned().collect::<Vec<_>>().join(", ");
                ReferendumError::Config(format!(
                    "unknown deployment '{name}' (configured: {})",
                    if known.is_empty() { "none" } else { known.as_str() }
                ))
            })
    }

    /// All configured deployments, ordered by name.
    pub fn deployments(&self) -> impl Iterator<Item = Deployment> + '_ {
        self.deployments.iter().map(|(name, factory)| Deployment::new(name, *factory))
    }
}

/// A named network target carrying the factory contract address.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Deployment {
    /// Deployment name as written in the configuration
    pub name: String,
    /// Address of the deployed ReferendumFactory
    pub factory: Address,
}

impl Deployment {
    /// Create a deployment.
    pub fn new(name: impl Into<String>, factory: Address) -> Self {
        Self { name: name.into(), factory }
    }
}

impl fmt::Display for Deployment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.factory)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = ProjectConfig::default();

        assert_eq!(config.source, PathBuf::from("contracts/Referendum.sol"));
        assert_eq!(config.build_dir, PathBuf::from("build"));
        assert_eq!(config.solc_version, "0.8.19");
        assert!(config.optimizer.enabled);
        assert_eq!(config.optimizer.runs, 200);
        assert_eq!(config.deployments.len(), 2);
    }

    #[test]
    fn test_known_deployments() {
        let config = ProjectConfig::default();

        let primary = config.deployment("primary").unwrap();
        assert_eq!(primary.factory, PRIMARY_FACTORY_ADDRESS);

        let secondary = config.deployment("secondary").unwrap();
        assert_eq!(
            secondary.factory,
            "0x6cf8bD9Bf474b4ED775C642B87F963e2d28e4fC5".parse::<Address>().unwrap()
        );
        assert_ne!(primary.factory, secondary.factory);
    }

    #[test]
    fn test_unknown_deployment() {
        let config = ProjectConfig::default();
        let err = config.deployment("mainnet").unwrap_err();

        assert!(matches!(err, ReferendumError::Config(_)));
        let msg = err.to_string();
        assert!(msg.contains("mainnet"));
        assert!(msg.contains("primary, secondary"));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = ProjectConfig::from_toml(
            r#"
build_dir = "out"

[optimizer]
runs = 1000
"#,
        )
        .unwrap();

        assert_eq!(config.build_dir, PathBuf::from("out"));
        assert_eq!(config.source, PathBuf::from(DEFAULT_SOURCE));
        assert!(config.optimizer.enabled);
        assert_eq!(config.optimizer.runs, 1000);
    }

    #[test]
    fn test_toml_deployments_replace_defaults() {
        let config = ProjectConfig::from_toml(
            r#"
[deployments]
local = "0x5FbDB2315678afecb367f032d93F642f64180aa3"
"#,
        )
        .unwrap();

        assert_eq!(config.deployments.len(), 1);
        assert!(config.deployment("local").is_ok());
        assert!(config.deployment("primary").is_err());
    }

    #[test]
    fn test_invalid_toml() {
        let err = ProjectConfig::from_toml("build_dir = [").unwrap_err();
        assert!(matches!(err, ReferendumError::Config(_)));
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config = ProjectConfig::load(temp_dir.path().join("Referendum.toml")).unwrap();
        assert_eq!(config, ProjectConfig::default());
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("Referendum.toml");

        let mut config = ProjectConfig::default();
        config.rpc_url = Some("http://localhost:8545".to_string());
        fs::write(&path, config.to_toml().unwrap()).unwrap();

        let loaded = ProjectConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_deployment_display() {
        let deployment = Deployment::new("primary", PRIMARY_FACTORY_ADDRESS);
        assert!(deployment.to_string().starts_with("primary (0x"));
    }
}
