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

//! Handles for the Referendum and ReferendumFactory contracts.
//!
//! `enact` binds the Referendum interface to the address of one referendum
//! instance. `factory` binds the ReferendumFactory interface to the factory of
//! an explicitly chosen [`Deployment`]; there is no process-wide factory handle.

use alloy_json_abi::JsonAbi;
use alloy_primitives::Address;
use referendum_build::{ArtifactStore, CompilationArtifact};
use referendum_common::{Deployment, ReferendumError, Result};
use tracing::debug;

use crate::{parse_address, ContractHandle};

/// Artifact name of a single referendum.
pub const REFERENDUM: &str = "Referendum";

/// Artifact name of the factory contract.
pub const REFERENDUM_FACTORY: &str = "ReferendumFactory";

/// Handle for the referendum deployed at `address`.
pub fn enact(artifact: &CompilationArtifact, address: &str) -> Result<ContractHandle> {
    ContractHandle::from_artifact(artifact, address)
}

/// Handle for the factory contract of `deployment`.
pub fn factory(artifact: &CompilationArtifact, deployment: &Deployment) -> Result<ContractHandle> {
    debug!(deployment = %deployment.name, address = %deployment.factory, "binding factory");
    ContractHandle::from_abi_json(&artifact.contract_name, &artifact.interface, deployment.factory)
}

/// Both Referendum interfaces, loaded once from the build directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferendumContracts {
    referendum: JsonAbi,
    factory: JsonAbi,
}

impl ReferendumContracts {
    /// Load `Referendum.json` and `ReferendumFactory.json` from `store`.
    pub fn load(store: &ArtifactStore) -> Result<Self> {
        Ok(Self {
            referendum: load_abi(store, REFERENDUM)?,
            factory: load_abi(store, REFERENDUM_FACTORY)?,
        })
    }

    /// Referendum interface.
    pub fn referendum_abi(&self) -> &JsonAbi {
        &self.referendum
    }

    /// Factory interface.
    pub fn factory_abi(&self) -> &JsonAbi {
        &self.factory
    }

    /// Fresh handle for the referendum at `address`.
    pub fn enact(&self, address: &str) -> Result<ContractHandle> {
        let address = parse_address(address)?;
        Ok(ContractHandle::new(REFERENDUM, self.referendum.clone(), address))
    }

    /// Fresh handle for the factory of `deployment`.
    pub fn factory(&self, deployment: &Deployment) -> ContractHandle {
        debug!(deployment = %deployment.name, address = %deployment.factory, "binding factory");
        self.factory_at(deployment.factory)
    }

    /// Fresh handle for a factory at an explicit address.
    pub fn factory_at(&self, address: Address) -> ContractHandle {
        ContractHandle::new(REFERENDUM_FACTORY, self.factory.clone(), address)
    }
}

fn load_abi(store: &ArtifactStore, contract_name: &str) -> Result<JsonAbi> {
    store.read(contract_name)?.abi().map_err(|e| {
        ReferendumError::InvalidHandle(format!("invalid ABI in {contract_name} artifact: {e}"))
    })
}
