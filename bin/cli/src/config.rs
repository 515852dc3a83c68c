// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{fs, path::Path};

use serde::Deserialize;
use wasqlite_bridge::BridgeConfig;
use wasqlite_client::ClientConfig;

use crate::error::CliError;

/// Contents of the `--config` file. Every section and field is optional.
///
/// ```json
/// { "bridge": { "fuel_per_call": 10000000 }, "client": { "vfs": "" } }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CliConfig {
	pub bridge: BridgeConfig,
	pub client: ClientConfig,
}

impl CliConfig {
	pub fn load(path: &Path) -> Result<Self, CliError> {
		let text = fs::read_to_string(path).map_err(|source| CliError::Read {
			path: path.to_path_buf(),
			source,
		})?;
		serde_json::from_str(&text).map_err(|source| CliError::Config {
			path: path.to_path_buf(),
			source,
		})
	}
}
