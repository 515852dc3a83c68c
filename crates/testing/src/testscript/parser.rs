// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::fmt::{self, Display, Formatter};

use super::{Block, Command};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
	pub line_number: u32,
	pub reason: String,
}

impl Display for ParseError {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		write!(f, "parse error at line {}: {}", self.line_number, self.reason)
	}
}

impl std::error::Error for ParseError {}

const SEPARATOR: &str = "---";

/// Split a script into blocks. Existing output sections are discarded, since
/// the runner regenerates them.
pub fn parse(input: &str) -> Result<Vec<Block>, ParseError> {
	let mut blocks = Vec::new();
	let mut literal = String::new();
	let mut commands = Vec::new();
	let mut block_line = 1;
	let mut in_output = false;

	for (index, raw) in input.split_inclusive('\n').enumerate() {
		let line_number = index as u32 + 1;
		let line = raw.trim_end_matches(['\n', '\r']);

		if in_output {
			if line.is_empty() {
				blocks.push(Block {
					literal: std::mem::take(&mut literal),
					commands: std::mem::take(&mut commands),
					line_number: block_line,
				});
				block_line = line_number + 1;
				in_output = false;
			}
			continue;
		}

		literal.push_str(raw);
		if line == SEPARATOR {
			if commands.is_empty() {
				return Err(ParseError {
					line_number,
					reason: "separator without commands".to_string(),
				});
			}
			// the separator is written back by the runner
			literal.truncate(literal.len() - raw.len());
			in_output = true;
			continue;
		}

		let trimmed = line.trim();
		if trimmed.is_empty() || trimmed.starts_with('#') {
			continue;
		}
		commands.push(parse_command(trimmed, line_number)?);
	}

	if in_output {
		blocks.push(Block {
			literal,
			commands,
			line_number: block_line,
		});
	} else if !commands.is_empty() {
		return Err(ParseError {
			line_number: block_line,
			reason: format!("block is missing its `{SEPARATOR}` separator"),
		});
	} else if !literal.is_empty() {
		blocks.push(Block {
			literal,
			commands,
			line_number: block_line,
		});
	}

	Ok(blocks)
}

fn parse_command(line: &str, line_number: u32) -> Result<Command, ParseError> {
	let (fail, line) = match line.strip_prefix('!') {
		Some(rest) => (true, rest.trim_start()),
		None => (false, line),
	};

	let (name, args) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
	if name.is_empty() {
		return Err(ParseError {
			line_number,
			reason: "missing command name".to_string(),
		});
	}

	Ok(Command {
		name: name.to_string(),
		args: args.trim().to_string(),
		fail,
		line_number,
	})
}
