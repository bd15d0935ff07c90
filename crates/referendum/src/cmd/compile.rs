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

//! Compile command

use eyre::Result;
use referendum_build::{build_project, ArtifactStore};
use referendum_common::ProjectConfig;

use crate::CompileArgs;

/// Compile the configured source and print one line per artifact written
pub fn compile(args: CompileArgs, mut config: ProjectConfig) -> Result<()> {
    apply_overrides(args, &mut config);

    let store = ArtifactStore::new(&config.build_dir);
    let report = build_project(&config, &store)?;
    for path in &report.artifacts {
        println!("{}", path.display());
    }

    tracing::info!(
        artifacts = report.artifacts.len(),
        build_dir = %store.root().display(),
        "compilation finished"
    );
    Ok(())
}

fn apply_overrides(args: CompileArgs, config: &mut ProjectConfig) {
    if let Some(source) = args.source {
        config.source = source;
    }
    if let Some(version) = args.solc_version {
        config.solc_version = version;
        config.solc_path = None;
    }
    if let Some(path) = args.solc_path {
        config.solc_path = Some(path);
    }
    if args.no_optimize {
        config.optimizer.enabled = false;
    }
    if let Some(runs) = args.optimizer_runs {
        config.optimizer.runs = runs;
    }
}
