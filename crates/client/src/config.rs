// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use serde::Deserialize;

/// Names of the engine exports the client drives.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EngineExports {
	pub open: String,
	pub exec: String,
	pub prepare: String,
	pub step: String,
	pub column_int: String,
	pub column_text: String,
	/// None releases statements on the host side only.
	pub finalize: Option<String>,
	/// None releases the database on the host side only.
	pub close: Option<String>,
}

impl Default for EngineExports {
	fn default() -> Self {
		Self {
			open: "sqlite3_open_v2".to_string(),
			exec: "sqlite3_exec".to_string(),
			prepare: "sqlite3_prepare_v2".to_string(),
			step: "sqlite3_step".to_string(),
			column_int: "sqlite3_column_int64".to_string(),
			column_text: "sqlite3_column_text".to_string(),
			finalize: Some("sqlite3_finalize".to_string()),
			close: Some("sqlite3_close".to_string()),
		}
	}
}

/// Configuration for a [`Connection`](crate::Connection).
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
	pub exports: EngineExports,
	/// VFS name passed to the open export. Empty selects the engine default.
	///
	/// Default: empty
	pub vfs: String,
}

impl ClientConfig {
	/// Create a new config with default values.
	pub fn new() -> Self {
		Self::default()
	}

	pub fn exports(mut self, exports: EngineExports) -> Self {
		self.exports = exports;
		self
	}

	pub fn vfs(mut self, vfs: impl Into<String>) -> Self {
		self.vfs = vfs.into();
		self
	}
}
