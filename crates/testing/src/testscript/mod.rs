// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Golden scripts.
//!
//! A script is a sequence of blocks. Each block lists commands, a `---`
//! separator and the output those commands produced, and ends at a blank
//! line. Lines starting with `#` are comments. A command prefixed with `!`
//! is expected to fail and its error becomes its output.
//!
//! ```text
//! execute CREATE TABLE users (id int, name varchar(10))
//! ---
//! ok
//!
//! !execute DROP TABLE users
//! ---
//! execute `DROP TABLE users` failed: engine returned status 1: unrecognized token
//! ```

mod parser;
mod runner;

pub use parser::{ParseError, parse};
pub use runner::{Runner, generate, run_path};

/// One command line of a block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
	pub name: String,
	/// Everything after the name, trimmed.
	pub args: String,
	/// Expect the command to fail.
	pub fail: bool,
	pub line_number: u32,
}

/// Commands sharing one output section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
	/// Comment and command lines exactly as written, up to the separator.
	pub literal: String,
	pub commands: Vec<Command>,
	pub line_number: u32,
}
