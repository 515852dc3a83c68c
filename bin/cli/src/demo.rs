// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{fs, io::Write, path::PathBuf};

use tracing::{debug, info};
use wasqlite_bridge::Bridge;
use wasqlite_client::{Connection, OpenFlags, User};

use crate::{config::CliConfig, error::CliError};

pub const CREATE_USERS: &str = "CREATE TABLE users (id int, name varchar(10))";
pub const INSERT_USERS: &str = "INSERT INTO users(id, name) VALUES(0, 'go'), (1, 'zig'), (2, 'whatever')";
pub const SELECT_USERS: &str = "SELECT id, name FROM users";

/// What to run: a module image on disk and the database to open inside it.
#[derive(Debug, Clone)]
pub struct Options {
	pub module: PathBuf,
	pub database: String,
	pub config: CliConfig,
}

/// Create and fill the users table, then read it back.
pub fn run_demo(conn: &mut Connection) -> Result<Vec<User>, CliError> {
	conn.execute(CREATE_USERS)?;
	conn.execute(INSERT_USERS)?;
	Ok(conn.users(SELECT_USERS)?)
}

/// Load the module, run the demo and print one line per user to `out`.
pub fn run(options: Options, out: &mut impl Write) -> Result<(), CliError> {
	let image = fs::read(&options.module).map_err(|source| CliError::Read {
		path: options.module.clone(),
		source,
	})?;
	debug!(path = %options.module.display(), size = image.len(), "module image read");

	let bridge = Bridge::load(&image, options.config.bridge)?;
	let mut conn = Connection::open_with(bridge, &options.database, OpenFlags::default(), options.config.client)?;

	let users = run_demo(&mut conn)?;
	info!(count = users.len(), "users selected");
	for user in &users {
		writeln!(out, "{user}").map_err(CliError::Output)?;
	}

	conn.close()?;
	Ok(())
}
