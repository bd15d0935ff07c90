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

//! Referendum - compile the Referendum contracts and build handles to them.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use eyre::Result;
use referendum_common::{logging, ProjectConfig, DEFAULT_CONFIG_FILE};

mod cmd;

/// Command-line interface for Referendum
#[derive(Debug, Parser)]
#[command(name = "referendum")]
#[command(about = "Referendum - compile the Referendum contracts and build handles to deployments")]
#[command(version)]
pub struct Cli {
    /// Project configuration file (optional; defaults apply when it is missing)
    #[arg(long, global = true, env = "REFERENDUM_CONFIG", default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Directory holding the compiled artifacts
    #[arg(long, global = true, env = "REFERENDUM_BUILD_DIR")]
    pub build_dir: Option<PathBuf>,

    /// Also write logs to a daily rotated file in the temp directory
    #[arg(long, global = true)]
    pub log_file: bool,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Compile the Solidity source into the build directory
    Compile(CompileArgs),
    /// Build a handle for the Referendum deployed at an address
    Enact {
        /// Address of the deployed Referendum
        address: String,

        #[command(flatten)]
        output: HandleArgs,
    },
    /// Build a handle for a deployed ReferendumFactory
    Factory {
        /// Named deployment whose factory to use
        #[arg(long, conflicts_with = "address", required_unless_present = "address")]
        deployment: Option<String>,

        /// Explicit factory address
        #[arg(long)]
        address: Option<String>,

        #[command(flatten)]
        output: HandleArgs,
    },
    /// List the configured deployments
    Deployments,
}

/// Options of the `compile` command
#[derive(Debug, Args)]
pub struct CompileArgs {
    /// Solidity source file
    #[arg(long)]
    pub source: Option<PathBuf>,

    /// solc version to find or install
    #[arg(long, conflicts_with = "solc_path")]
    pub solc_version: Option<String>,

    /// Use this solc binary instead of an svm-managed one
    #[arg(long)]
    pub solc_path: Option<PathBuf>,

    /// Disable the optimizer
    #[arg(long)]
    pub no_optimize: bool,

    /// Optimizer runs
    #[arg(long)]
    pub optimizer_runs: Option<usize>,
}

/// Output options shared by the handle commands
#[derive(Debug, Args)]
pub struct HandleArgs {
    /// Print the handle summary as JSON
    #[arg(long)]
    pub json: bool,

    /// Bind the handle to an RPC endpoint and check that code is deployed
    #[arg(long)]
    pub check_code: bool,

    /// RPC endpoint for `--check-code` (defaults to `rpc_url` in the config)
    #[arg(long, requires = "check_code")]
    pub rpc_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenv::dotenv().ok();

    // Parse CLI arguments
    let cli = Cli::parse();

    logging::init_logging("referendum", cli.log_file)?;

    let mut config = ProjectConfig::load(&cli.config)?;
    if let Some(build_dir) = &cli.build_dir {
        config.build_dir = build_dir.clone();
    }
    tracing::debug!(
        config = %cli.config.display(),
        build_dir = %config.build_dir.display(),
        "configuration loaded"
    );

    match cli.command {
        Commands::Compile(args) => cmd::compile(args, config)?,
        Commands::Enact { address, output } => cmd::enact(&address, &output, &config).await?,
        Commands::Factory { deployment, address, output } => {
            let target = match (deployment, address) {
                (Some(name), _) => cmd::FactoryTarget::Deployment(name),
                (None, Some(address)) => cmd::FactoryTarget::Address(address),
                (None, None) => eyre::bail!("either --deployment or --address is required"),
            };
            cmd::factory(target, &output, &config).await?
        }
        Commands::Deployments => cmd::list_deployments(&config),
    }

    Ok(())
}
