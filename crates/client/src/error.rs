// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{
	fmt,
	fmt::{Display, Formatter},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
	Open,
	Execute,
	Prepare,
	Step,
	ColumnInt,
	ColumnText,
	Finalize,
	Close,
}

impl Display for Operation {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		match self {
			Operation::Open => f.write_str("open"),
			Operation::Execute => f.write_str("execute"),
			Operation::Prepare => f.write_str("prepare"),
			Operation::Step => f.write_str("step"),
			Operation::ColumnInt => f.write_str("integer column read"),
			Operation::ColumnText => f.write_str("text column read"),
			Operation::Finalize => f.write_str("finalize"),
			Operation::Close => f.write_str("close"),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
	#[error("{operation} `{subject}` failed: {source}")]
	Failed {
		operation: Operation,
		/// Statement text, or the database name for open and close.
		subject: String,
		#[source]
		source: wasqlite_bridge::Error,
	},

	#[error("{operation} `{subject}` succeeded but returned a null handle")]
	MissingHandle {
		operation: Operation,
		subject: String,
	},

	#[error("column {column} of `{subject}` read while the statement is not on a row")]
	NotOnRow {
		column: u32,
		subject: String,
	},

	#[error("column {column} of `{subject}` is not valid UTF-8")]
	Utf8 {
		column: u32,
		subject: String,
	},
}

impl Error {
	pub(crate) fn failed(operation: Operation, subject: &str, source: wasqlite_bridge::Error) -> Self {
		Error::Failed {
			operation,
			subject: subject.to_string(),
			source,
		}
	}

	/// The underlying bridge failure, when there is one.
	pub fn bridge(&self) -> Option<&wasqlite_bridge::Error> {
		match self {
			Error::Failed {
				source,
				..
			} => Some(source),
			_ => None,
		}
	}

	/// Status code reported by the engine.
	pub fn engine_status(&self) -> Option<u32> {
		self.bridge().and_then(wasqlite_bridge::Error::status)
	}

	/// Message the engine supplied alongside a non-zero status.
	pub fn engine_message(&self) -> Option<&str> {
		match self.bridge() {
			Some(wasqlite_bridge::Error::Engine {
				message,
				..
			}) => Some(message.as_str()),
			_ => None,
		}
	}
}

pub type Result<T> = std::result::Result<T, Error>;
