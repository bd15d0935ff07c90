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

//! Referendum Common - Shared functionality for Referendum components
//!
//! This crate provides the pieces used by both the build crate, the contract
//! handle crate and the `referendum` binary: the error taxonomy, project
//! configuration and logging setup.

/// Project configuration and named factory deployments
pub mod config;
/// Error types shared across the workspace
pub mod error;
/// Logging setup and utilities for consistent logging across components
pub mod logging;

pub use config::*;
pub use error::*;
