// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{error::Error, fs, io, path::Path};

use super::{Command, parser::parse};

/// Runs script commands, returning their output.
pub trait Runner {
	/// Run one command. An `Err` is the command's failure, which is output
	/// for commands expected to fail and aborts the script otherwise.
	fn run(&mut self, command: &Command) -> Result<String, Box<dyn Error>>;

	/// Called once the whole script has run. Used for final state assertions.
	fn end_script(&mut self) -> Result<(), Box<dyn Error>> {
		Ok(())
	}
}

/// Run the script at `path` and compare its output with the file.
///
/// Panics on a mismatch. With `UPDATE_TESTFILES=1` the file is rewritten with
/// the new output instead.
pub fn run_path<R: Runner, P: AsRef<Path>>(runner: &mut R, path: P) -> io::Result<()> {
	let path = path.as_ref();
	let input = fs::read_to_string(path)?;
	let output = generate(runner, &input)?;

	if std::env::var("UPDATE_TESTFILES").as_deref() == Ok("1") {
		return fs::write(path, output);
	}

	assert_eq!(output, input, "output of {} differs from the script", path.display());
	Ok(())
}

/// Produce the script text with every output section regenerated.
pub fn generate<R: Runner>(runner: &mut R, input: &str) -> io::Result<String> {
	let blocks = parse(input).map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
	let mut output = String::with_capacity(input.len());

	for (i, block) in blocks.iter().enumerate() {
		if block.commands.is_empty() {
			output.push_str(&block.literal);
			continue;
		}

		let mut block_output = String::new();
		for command in &block.commands {
			let command_output = match runner.run(command) {
				Ok(out) if command.fail => {
					return Err(io::Error::other(format!(
						"expected command '{}' to fail at line {}, succeeded with: {out}",
						command.name, command.line_number
					)));
				}
				Ok(out) => out,
				Err(e) if command.fail => e.to_string(),
				Err(e) => {
					return Err(io::Error::other(format!(
						"command '{}' failed at line {}: {e}",
						command.name, command.line_number
					)));
				}
			};
			block_output.push_str(&ensure_eol(command_output));
		}

		if block_output.is_empty() {
			block_output.push_str("ok\n");
		}

		output.push_str(&block.literal);
		output.push_str("---\n");
		output.push_str(&block_output);
		if i < blocks.len() - 1 {
			output.push('\n');
		}
	}

	runner.end_script().map_err(|e| io::Error::other(format!("end_script failed: {e}")))?;
	Ok(output)
}

fn ensure_eol(mut s: String) -> String {
	if !s.is_empty() && !s.ends_with('\n') {
		s.push('\n');
	}
	s
}
