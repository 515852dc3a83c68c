// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{
	fmt,
	fmt::{Display, Formatter},
	iter::FusedIterator,
	marker::PhantomData,
};

use crate::{
	Result,
	statement::{Statement, Step},
};

/// The current row of a statement, readable by column position.
pub struct Row<'s, 'c> {
	statement: &'s mut Statement<'c>,
}

impl Row<'_, '_> {
	pub fn int(&mut self, column: u32) -> Result<i64> {
		self.statement.column_int(column)
	}

	pub fn text(&mut self, column: u32) -> Result<String> {
		self.statement.column_text(column)
	}
}

/// Host value built from one row.
pub trait FromRow: Sized {
	fn from_row(row: &mut Row<'_, '_>) -> Result<Self>;
}

/// `SELECT id, name` rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
	pub id: i64,
	pub name: String,
}

impl User {
	pub fn new(id: i64, name: impl Into<String>) -> Self {
		Self {
			id,
			name: name.into(),
		}
	}
}

impl FromRow for User {
	fn from_row(row: &mut Row<'_, '_>) -> Result<Self> {
		Ok(Self {
			id: row.int(0)?,
			name: row.text(1)?,
		})
	}
}

impl Display for User {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		write!(f, "user: id={}, name='{}'", self.id, self.name)
	}
}

/// Lazy rows of one prepared statement.
///
/// Each item steps the guest cursor, so iteration cannot be restarted. The
/// first error ends the sequence.
pub struct Rows<'c, T> {
	statement: Statement<'c>,
	finished: bool,
	_marker: PhantomData<T>,
}

impl<'c, T: FromRow> Rows<'c, T> {
	pub(crate) fn new(statement: Statement<'c>) -> Self {
		Self {
			statement,
			finished: false,
			_marker: PhantomData,
		}
	}

	pub fn statement(&self) -> &Statement<'c> {
		&self.statement
	}

	/// Finalize the underlying statement now, surfacing any engine failure.
	pub fn finish(self) -> Result<()> {
		self.statement.finalize()
	}
}

impl<T: FromRow> Iterator for Rows<'_, T> {
	type Item = Result<T>;

	fn next(&mut self) -> Option<Self::Item> {
		if self.finished {
			return None;
		}

		let item = match self.statement.step() {
			Ok(Step::Row) => T::from_row(&mut Row {
				statement: &mut self.statement,
			}),
			Ok(Step::Done) => {
				self.finished = true;
				return None;
			}
			Err(err) => Err(err),
		};

		if item.is_err() {
			self.finished = true;
		}
		Some(item)
	}
}

impl<T: FromRow> FusedIterator for Rows<'_, T> {}
