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

//! `enact` and `factory` commands
//!
//! Both load the artifacts from the build directory, build a handle and print
//! its summary. Only with `--check-code` is the handle bound to a provider and
//! the address checked for deployed code.

use alloy_network::Ethereum;
use alloy_provider::{Provider, ProviderBuilder};
use eyre::Result;
use referendum_build::ArtifactStore;
use referendum_common::ProjectConfig;
use referendum_contracts::{parse_address, ContractHandle, ReferendumContracts};

use crate::HandleArgs;

/// Which factory the `factory` command should point at
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FactoryTarget {
    /// A named deployment from the configuration
    Deployment(String),
    /// An explicit address
    Address(String),
}

/// Build and report a handle for the Referendum at `address`
pub async fn enact(address: &str, output: &HandleArgs, config: &ProjectConfig) -> Result<()> {
    let contracts = ReferendumContracts::load(&ArtifactStore::new(&config.build_dir))?;
    let handle = contracts.enact(address)?;
    report(&handle, output, config).await
}

/// Build and report a handle for the selected factory
pub async fn factory(
    target: FactoryTarget,
    output: &HandleArgs,
    config: &ProjectConfig,
) -> Result<()> {
    let contracts = ReferendumContracts::load(&ArtifactStore::new(&config.build_dir))?;

    let handle = match target {
        FactoryTarget::Deployment(name) => {
            let deployment = config.deployment(&name)?;
            tracing::info!(deployment = %deployment, "using deployment");
            contracts.factory(&deployment)
        }
        FactoryTarget::Address(address) => contracts.factory_at(parse_address(&address)?),
    };

    report(&handle, output, config).await
}

async fn report(
    handle: &ContractHandle,
    output: &HandleArgs,
    config: &ProjectConfig,
) -> Result<()> {
    let rpc_url = match (output.check_code, output.rpc_url.as_ref().or(config.rpc_url.as_ref())) {
        (false, _) => None,
        (true, Some(url)) => Some(url),
        (true, None) => {
            eyre::bail!("--check-code needs --rpc-url or `rpc_url` in the configuration")
        }
    };

    let summary = handle.summary();
    if output.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print!("{summary}");
    }

    if let Some(rpc_url) = rpc_url {
        check_deployed(handle, rpc_url).await?;
    }

    Ok(())
}

/// Bind `handle` to `rpc_url` and warn when no code lives at its address
async fn check_deployed(handle: &ContractHandle, rpc_url: &str) -> Result<()> {
    let provider = ProviderBuilder::new().connect_http(rpc_url.parse()?);
    let instance = handle.bind::<_, Ethereum>(provider);

    let code = instance.provider().get_code_at(*instance.address()).await?;
    if code.is_empty() {
        tracing::warn!(
            contract = %handle.name(),
            address = %handle.address(),
            "no code deployed at address"
        );
    } else {
        tracing::info!(
            contract = %handle.name(),
            address = %handle.address(),
            code_size = code.len(),
            "contract code found"
        );
    }

    Ok(())
}
