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

//! Error taxonomy shared by the build and contract crates.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Result alias defaulting to [`ReferendumError`].
pub type Result<T, E = ReferendumError> = std::result::Result<T, E>;

/// Errors that can occur while compiling contracts or constructing handles.
///
/// None of these are retried.
#[derive(Debug, Error)]
pub enum ReferendumError {
    /// A source file, artifact or directory could not be read or written
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        /// Path the operation was acting on
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The compiler could not be resolved or reported an error diagnostic
    #[error("compilation failed: {0}")]
    Compilation(String),

    /// Malformed ABI or address handed to the handle constructor
    #[error("invalid contract handle: {0}")]
    InvalidHandle(String),

    /// An artifact file exists but is not a valid artifact document
    #[error("malformed artifact {}: {source}", path.display())]
    InvalidArtifact {
        /// Path of the offending artifact
        path: PathBuf,
        /// Underlying JSON error
        #[source]
        source: serde_json::Error,
    },

    /// Project configuration is unreadable or refers to something unknown
    #[error("configuration error: {0}")]
    Config(String),
}

impl ReferendumError {
    /// Wrap an I/O error together with the path that caused it.
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io { path: path.as_ref().to_path_buf(), source }
    }

    /// Whether this error came from the compiler.
    pub fn is_compilation(&self) -> bool {
        matches!(self, Self::Compilation(_))
    }

    /// Whether this error came from handle construction.
    pub fn is_invalid_handle(&self) -> bool {
        matches!(self, Self::InvalidHandle(_))
    }
}
