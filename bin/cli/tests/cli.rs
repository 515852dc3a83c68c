// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{fs, path::Path};

use wasqlite_cli::{CliConfig, CliError, Options, run};
use wasqlite_testing::{engine_image, tempdir::temp_dir};

fn options(module: &Path, config: CliConfig) -> Options {
	Options {
		module: module.to_path_buf(),
		database: ":memory:".to_string(),
		config,
	}
}

#[test]
fn test_prints_users() {
	temp_dir(|dir| {
		let module = dir.join("sqlite.wasm");
		fs::write(&module, engine_image())?;

		let mut out = Vec::new();
		run(options(&module, CliConfig::default()), &mut out).unwrap();

		assert_eq!(
			String::from_utf8(out).unwrap(),
			"user: id=0, name='go'\nuser: id=1, name='zig'\nuser: id=2, name='whatever'\n"
		);
		Ok(())
	})
	.unwrap();
}

#[test]
fn test_config_file_is_applied() {
	temp_dir(|dir| {
		let module = dir.join("sqlite.wasm");
		fs::write(&module, engine_image())?;
		let config_path = dir.join("config.json");
		fs::write(
			&config_path,
			r#"{ "bridge": { "fuel_per_call": 1000000 }, "client": { "exports": { "finalize": null } } }"#,
		)?;

		let config = CliConfig::load(&config_path).unwrap();
		assert_eq!(config.bridge.fuel_per_call, Some(1_000_000));
		assert_eq!(config.client.exports.finalize, None);

		let mut out = Vec::new();
		run(options(&module, config), &mut out).unwrap();
		assert_eq!(String::from_utf8(out).unwrap().lines().count(), 3);
		Ok(())
	})
	.unwrap();
}

#[test]
fn test_missing_module() {
	temp_dir(|dir| {
		let err = run(options(&dir.join("absent.wasm"), CliConfig::default()), &mut Vec::new()).unwrap_err();
		assert!(matches!(err, CliError::Read { .. }));
		Ok(())
	})
	.unwrap();
}

#[test]
fn test_not_a_module() {
	temp_dir(|dir| {
		let module = dir.join("sqlite.wasm");
		fs::write(&module, b"definitely not wasm")?;

		let err = run(options(&module, CliConfig::default()), &mut Vec::new()).unwrap_err();
		assert!(matches!(err, CliError::Bridge(wasqlite_bridge::Error::Compile { .. })));
		Ok(())
	})
	.unwrap();
}

#[test]
fn test_invalid_config() {
	temp_dir(|dir| {
		let config_path = dir.join("config.json");
		fs::write(&config_path, "{ not json")?;

		let err = CliConfig::load(&config_path).unwrap_err();
		assert!(matches!(err, CliError::Config { .. }));
		Ok(())
	})
	.unwrap();
}

#[test]
fn test_engine_failure_is_reported() {
	temp_dir(|dir| {
		let module = dir.join("sqlite.wasm");
		fs::write(&module, engine_image())?;

		let mut options = options(&module, CliConfig::default());
		options.database = String::new();

		let err = run(options, &mut Vec::new()).unwrap_err();
		match err {
			CliError::Client(err) => assert_eq!(err.engine_status(), Some(14)),
			other => panic!("unexpected error: {other}"),
		}
		Ok(())
	})
	.unwrap();
}
