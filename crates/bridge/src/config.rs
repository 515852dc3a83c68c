// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use serde::Deserialize;

/// Configuration for the runtime and the bridge protocol exports.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
	/// Guest allocator export, called as `(size, align) -> ptr`.
	///
	/// Default: `allocate`
	pub allocate_export: String,
	/// Export returning the base address of the result envelope.
	///
	/// Default: `get_result_ptr`
	pub result_ptr_export: String,
	/// Export returning the size of the last result.
	///
	/// Default: `get_result_size`
	pub result_size_export: String,
	/// Fuel granted to every call. None disables metering.
	///
	/// Default: None
	pub fuel_per_call: Option<u64>,
	/// Maximum native stack used by guest code, in bytes. None keeps the wasmtime default.
	///
	/// Default: None
	pub max_wasm_stack: Option<usize>,
	/// Let the guest write to the host's stdout/stderr through WASI.
	///
	/// Default: false
	pub inherit_stdio: bool,
}

impl Default for BridgeConfig {
	fn default() -> Self {
		Self {
			allocate_export: "allocate".to_string(),
			result_ptr_export: "get_result_ptr".to_string(),
			result_size_export: "get_result_size".to_string(),
			fuel_per_call: None,
			max_wasm_stack: None,
			inherit_stdio: false,
		}
	}
}

impl BridgeConfig {
	/// Create a new config with default values.
	pub fn new() -> Self {
		Self::default()
	}

	pub fn allocate_export(mut self, name: impl Into<String>) -> Self {
		self.allocate_export = name.into();
		self
	}

	pub fn result_ptr_export(mut self, name: impl Into<String>) -> Self {
		self.result_ptr_export = name.into();
		self
	}

	pub fn result_size_export(mut self, name: impl Into<String>) -> Self {
		self.result_size_export = name.into();
		self
	}

	/// Meter guest execution, refilling `fuel` before each call.
	pub fn fuel_per_call(mut self, fuel: u64) -> Self {
		self.fuel_per_call = Some(fuel);
		self
	}

	pub fn max_wasm_stack(mut self, bytes: usize) -> Self {
		self.max_wasm_stack = Some(bytes);
		self
	}

	pub fn inherit_stdio(mut self, inherit: bool) -> Self {
		self.inherit_stdio = inherit;
		self
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_defaults_match_engine_abi() {
		let config = BridgeConfig::default();
		assert_eq!(config.allocate_export, "allocate");
		assert_eq!(config.result_ptr_export, "get_result_ptr");
		assert_eq!(config.result_size_export, "get_result_size");
		assert_eq!(config.fuel_per_call, None);
	}

	#[test]
	fn test_builder_overrides() {
		let config = BridgeConfig::new().allocate_export("malloc").fuel_per_call(1_000).inherit_stdio(true);
		assert_eq!(config.allocate_export, "malloc");
		assert_eq!(config.fuel_per_call, Some(1_000));
		assert!(config.inherit_stdio);
	}
}
