// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use tracing::{debug, instrument, warn};
use wasqlite_bridge::{Bridge, ensure_status_success};

use crate::{
	Error, Result,
	abi::{ExecOutput, OpenFlags, OpenOutput, PrepareOutput},
	config::ClientConfig,
	error::Operation,
	row::{FromRow, Rows, User},
	statement::{Statement, StatementHandle},
};

/// Opaque handle of an open database inside the guest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DatabaseHandle(pub(crate) u32);

impl DatabaseHandle {
	pub fn raw(&self) -> u32 {
		self.0
	}
}

/// An open database inside one module instance.
///
/// The connection owns its bridge. Statements borrow it mutably, so nothing
/// else can call into the guest between a step and its column reads.
pub struct Connection {
	bridge: Bridge,
	name: String,
	handle: DatabaseHandle,
	config: ClientConfig,
	live_statements: usize,
	closed: bool,
}

impl Connection {
	pub fn open(bridge: Bridge, name: &str, flags: OpenFlags) -> Result<Self> {
		Self::open_with(bridge, name, flags, ClientConfig::default())
	}

	/// Open `:memory:` for reading and writing, creating it.
	pub fn open_in_memory(bridge: Bridge) -> Result<Self> {
		Self::open(bridge, ":memory:", OpenFlags::default())
	}

	#[instrument(name = "client::connection::open", level = "debug", skip(bridge, config))]
	pub fn open_with(mut bridge: Bridge, name: &str, flags: OpenFlags, config: ClientConfig) -> Result<Self> {
		let name_arg = bridge.allocate_str(name).map_err(|e| Error::failed(Operation::Open, name, e))?;
		let vfs_arg = bridge.allocate_str(&config.vfs).map_err(|e| Error::failed(Operation::Open, name, e))?;

		let output: OpenOutput = bridge
			.call_then_decode(
				&config.exports.open,
				&[name_arg.pointer, name_arg.length, flags.bits() as u64, vfs_arg.pointer, vfs_arg.length],
			)
			.map_err(|e| Error::failed(Operation::Open, name, e))?;
		ensure_status_success(output.status, None).map_err(|e| Error::failed(Operation::Open, name, e))?;

		if output.db_handle == 0 {
			return Err(Error::MissingHandle {
				operation: Operation::Open,
				subject: name.to_string(),
			});
		}

		debug!(handle = output.db_handle, "database opened");
		Ok(Self {
			bridge,
			name: name.to_string(),
			handle: DatabaseHandle(output.db_handle),
			config,
			live_statements: 0,
			closed: false,
		})
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn handle(&self) -> DatabaseHandle {
		self.handle
	}

	pub fn config(&self) -> &ClientConfig {
		&self.config
	}

	/// Prepared statements not yet finalized.
	pub fn live_statements(&self) -> usize {
		self.live_statements
	}

	pub fn bridge(&self) -> &Bridge {
		&self.bridge
	}

	/// Direct guest access. Calls made here bypass statement bookkeeping.
	pub fn bridge_mut(&mut self) -> &mut Bridge {
		&mut self.bridge
	}

	/// Run a statement that produces no rows.
	#[instrument(name = "client::connection::execute", level = "debug", skip(self))]
	pub fn execute(&mut self, sql: &str) -> Result<()> {
		self.execute_inner(sql).map_err(|e| Error::failed(Operation::Execute, sql, e))
	}

	fn execute_inner(&mut self, sql: &str) -> wasqlite_bridge::Result<()> {
		let sql_arg = self.bridge.allocate_str(sql)?;
		let output: ExecOutput = self
			.bridge
			.call_then_decode(&self.config.exports.exec, &[self.handle.0 as u64, sql_arg.pointer, sql_arg.length, 0, 0])?;

		if output.status == 0 {
			return Ok(());
		}

		// The message range belongs to the envelope just decoded; read it before any other call.
		let message = if output.error_message_len != 0 {
			match self.bridge.read_bytes(output.error_message_ptr, output.error_message_len) {
				Ok(raw) => Some(String::from_utf8_lossy(&raw).into_owned()),
				Err(err) => {
					warn!(status = output.status, %err, "engine error message is unreadable");
					None
				}
			}
		} else {
			None
		};
		ensure_status_success(output.status, message)
	}

	/// Prepare a statement for stepping.
	#[instrument(name = "client::connection::prepare", level = "debug", skip(self))]
	pub fn prepare(&mut self, sql: &str) -> Result<Statement<'_>> {
		let output = self.prepare_inner(sql).map_err(|e| Error::failed(Operation::Prepare, sql, e))?;
		if output.stmt_handle == 0 {
			return Err(Error::MissingHandle {
				operation: Operation::Prepare,
				subject: sql.to_string(),
			});
		}

		self.live_statements += 1;
		Ok(Statement::new(self, StatementHandle(output.stmt_handle), sql))
	}

	fn prepare_inner(&mut self, sql: &str) -> wasqlite_bridge::Result<PrepareOutput> {
		let sql_arg = self.bridge.allocate_str(sql)?;
		let output: PrepareOutput = self
			.bridge
			.call_then_decode(&self.config.exports.prepare, &[self.handle.0 as u64, sql_arg.pointer, sql_arg.length])?;
		ensure_status_success(output.status, None)?;
		Ok(output)
	}

	/// Prepare `sql` and iterate its rows lazily.
	///
	/// The sequence is finite and cannot be restarted; query again to re-read.
	pub fn query<T: FromRow>(&mut self, sql: &str) -> Result<Rows<'_, T>> {
		Ok(Rows::new(self.prepare(sql)?))
	}

	/// Run `sql` and collect `(id, name)` rows.
	pub fn users(&mut self, sql: &str) -> Result<Vec<User>> {
		self.query::<User>(sql)?.collect()
	}

	pub(crate) fn release_statement(&mut self, handle: StatementHandle, sql: &str) -> Result<()> {
		self.live_statements = self.live_statements.saturating_sub(1);

		let Some(finalize) = self.config.exports.finalize.clone() else {
			return Ok(());
		};
		let status = self
			.bridge
			.call_for_int(&finalize, &[handle.0 as u64])
			.map_err(|e| Error::failed(Operation::Finalize, sql, e))?;
		ensure_status_success(status as u32, None).map_err(|e| Error::failed(Operation::Finalize, sql, e))
	}

	/// Close the database, surfacing any engine failure.
	pub fn close(mut self) -> Result<()> {
		self.close_inner()
	}

	fn close_inner(&mut self) -> Result<()> {
		if self.closed {
			return Ok(());
		}
		self.closed = true;

		let Some(close) = self.config.exports.close.clone() else {
			return Ok(());
		};
		let status = self
			.bridge
			.call_for_int(&close, &[self.handle.0 as u64])
			.map_err(|e| Error::failed(Operation::Close, &self.name, e))?;
		ensure_status_success(status as u32, None).map_err(|e| Error::failed(Operation::Close, &self.name, e))?;

		debug!(handle = self.handle.0, "database closed");
		Ok(())
	}
}

impl Drop for Connection {
	fn drop(&mut self) {
		if let Err(err) = self.close_inner() {
			warn!(%err, "failed to close database on drop");
		}
	}
}
