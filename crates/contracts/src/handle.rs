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

//! Contract handles
//!
//! A [`ContractHandle`] pairs a parsed ABI with the address of a deployed
//! instance. Building one is purely local: no provider is involved and no
//! request is sent. On-chain calls start only after [`ContractHandle::bind`]
//! attaches a provider.

use std::fmt;

use alloy_contract::{ContractInstance, Interface};
use alloy_json_abi::JsonAbi;
use alloy_network::Network;
use alloy_primitives::Address;
use alloy_provider::Provider;
use referendum_build::CompilationArtifact;
use referendum_common::{ReferendumError, Result};
use serde::Serialize;
use tracing::trace;

/// A deployed contract's interface bound to its address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractHandle {
    name: String,
    abi: JsonAbi,
    address: Address,
}

impl ContractHandle {
    /// Create a handle from already parsed parts.
    pub fn new(name: impl Into<String>, abi: JsonAbi, address: Address) -> Self {
        Self { name: name.into(), abi, address }
    }

    /// Create a handle from the JSON-encoded ABI of an artifact.
    pub fn from_abi_json(
        name: impl Into<String>,
        abi_json: &str,
        address: Address,
    ) -> Result<Self> {
        let name = name.into();
        let abi = parse_abi(&name, abi_json)?;
        Ok(Self::new(name, abi, address))
    }

    /// Create a handle for `artifact` deployed at `address`.
    pub fn from_artifact(artifact: &CompilationArtifact, address: &str) -> Result<Self> {
        let address = parse_address(address)?;
        let handle = Self::from_abi_json(&artifact.contract_name, &artifact.interface, address)?;
        trace!(contract = %handle.name, address = %handle.address, "constructed handle");
        Ok(handle)
    }

    /// Contract name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parsed interface.
    pub fn abi(&self) -> &JsonAbi {
        &self.abi
    }

    /// Network address of the deployed instance.
    pub fn address(&self) -> Address {
        self.address
    }

    /// Attach a provider, yielding an instance that can issue on-chain calls.
    ///
    /// Binding itself performs no I/O.
    pub fn bind<P, N>(&self, provider: P) -> ContractInstance<P, N>
    where
        P: Provider<N>,
        N: Network,
    {
        ContractInstance::new(self.address, provider, Interface::new(self.abi.clone()))
    }

    /// Human and machine readable description of the handle.
    pub fn summary(&self) -> HandleSummary {
        HandleSummary {
            contract: self.name.clone(),
            address: self.address,
            functions: self.abi.functions().map(|f| f.signature()).collect(),
            events: self.abi.events().map(|e| e.signature()).collect(),
        }
    }
}

/// Parse an address, mapping failures to [`ReferendumError::InvalidHandle`].
pub fn parse_address(address: &str) -> Result<Address> {
    address
        .trim()
        .parse()
        .map_err(|e| ReferendumError::InvalidHandle(format!("invalid address '{address}': {e}")))
}

fn parse_abi(name: &str, abi_json: &str) -> Result<JsonAbi> {
    serde_json::from_str(abi_json)
        .map_err(|e| ReferendumError::InvalidHandle(format!("invalid ABI for {name}: {e}")))
}

/// Serializable overview of a [`ContractHandle`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HandleSummary {
    /// Contract name
    pub contract: String,
    /// Bound address
    pub address: Address,
    /// Function signatures, e.g. `vote(bool)`
    pub functions: Vec<String>,
    /// Event signatures
    pub events: Vec<String>,
}

impl fmt::Display for HandleSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} at {}", self.contract, self.address)?;
        for function in &self.functions {
            writeln!(f, "  function {function}")?;
        }
        for event in &self.events {
            writeln!(f, "  event {event}")?;
        }
        Ok(())
    }
}
