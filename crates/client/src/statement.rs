// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use tracing::{trace, warn};
use wasqlite_bridge::Error as BridgeError;

use crate::{
	Connection, Error, Result,
	abi::{SQLITE_DONE, SQLITE_ROW},
	error::Operation,
};

/// Opaque handle of a prepared statement inside the guest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatementHandle(pub(crate) u32);

impl StatementHandle {
	pub fn raw(&self) -> u32 {
		self.0
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
	/// A row is ready for column reads.
	Row,
	/// No more rows.
	Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Position {
	BeforeFirst,
	OnRow,
	Finished,
}

/// A prepared statement, finalized explicitly or when dropped.
pub struct Statement<'c> {
	conn: &'c mut Connection,
	handle: StatementHandle,
	sql: String,
	position: Position,
	released: bool,
}

impl<'c> Statement<'c> {
	pub(crate) fn new(conn: &'c mut Connection, handle: StatementHandle, sql: &str) -> Self {
		Self {
			conn,
			handle,
			sql: sql.to_string(),
			position: Position::BeforeFirst,
			released: false,
		}
	}

	pub fn handle(&self) -> StatementHandle {
		self.handle
	}

	pub fn sql(&self) -> &str {
		&self.sql
	}

	/// Advance the cursor.
	///
	/// Codes other than row and done are engine failures. Once done, the
	/// guest is not called again.
	pub fn step(&mut self) -> Result<Step> {
		if self.position == Position::Finished {
			return Ok(Step::Done);
		}

		let step = self.conn.config().exports.step.clone();
		let code = self
			.conn
			.bridge_mut()
			.call_for_int(&step, &[self.handle.0 as u64])
			.map_err(|e| Error::failed(Operation::Step, &self.sql, e))?;

		match code as u32 {
			SQLITE_ROW => {
				self.position = Position::OnRow;
				Ok(Step::Row)
			}
			SQLITE_DONE => {
				self.position = Position::Finished;
				Ok(Step::Done)
			}
			status => {
				self.position = Position::Finished;
				Err(Error::failed(
					Operation::Step,
					&self.sql,
					BridgeError::Engine {
						status,
						message: String::new(),
					},
				))
			}
		}
	}

	fn ensure_on_row(&self, column: u32) -> Result<()> {
		if self.position != Position::OnRow {
			return Err(Error::NotOnRow {
				column,
				subject: self.sql.clone(),
			});
		}
		Ok(())
	}

	/// Read an integer column. The export's return value is the integer itself,
	/// sign-extended when the export returns i32.
	pub fn column_int(&mut self, column: u32) -> Result<i64> {
		self.ensure_on_row(column)?;

		let export = self.conn.config().exports.column_int.clone();
		self.conn
			.bridge_mut()
			.call_for_signed_int(&export, &[self.handle.0 as u64, column as u64])
			.map_err(|e| Error::failed(Operation::ColumnInt, &self.sql, e))
	}

	/// Read a text column through the guest's result region.
	pub fn column_text(&mut self, column: u32) -> Result<String> {
		self.ensure_on_row(column)?;

		let export = self.conn.config().exports.column_text.clone();
		let bridge = self.conn.bridge_mut();
		let raw = bridge
			.call_function(&export, &[self.handle.0 as u64, column as u64])
			.and_then(|_| bridge.result_region())
			.and_then(|region| {
				if region.is_empty() {
					Ok(Vec::new())
				} else {
					bridge.read_bytes(region.pointer, region.size)
				}
			})
			.map_err(|e| Error::failed(Operation::ColumnText, &self.sql, e))?;

		trace!(column, size = raw.len(), "read text column");
		String::from_utf8(raw).map_err(|_| Error::Utf8 {
			column,
			subject: self.sql.clone(),
		})
	}

	/// Release the statement, surfacing any engine failure.
	pub fn finalize(mut self) -> Result<()> {
		self.release()
	}

	fn release(&mut self) -> Result<()> {
		if self.released {
			return Ok(());
		}
		self.released = true;
		self.position = Position::Finished;
		self.conn.release_statement(self.handle, &self.sql)
	}
}

impl Drop for Statement<'_> {
	fn drop(&mut self) {
		if let Err(err) = self.release() {
			warn!(%err, "failed to finalize statement on drop");
		}
	}
}
