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

//! Referendum Build - compile Solidity into contract artifacts
//!
//! This crate drives solc (through `foundry-compilers`) over the Referendum
//! source file and maintains the build directory of per-contract JSON
//! artifacts that the handle crate later loads.
//!
//! - [`compiler`] - the compiler boundary and the build step
//! - [`artifact`] - the artifact document and the on-disk artifact store
//! - [`diagnostics`] - readable rendering of compiler errors

pub mod artifact;
pub use artifact::*;

pub mod compiler;
pub use compiler::*;

pub mod diagnostics;
pub use diagnostics::*;
