// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{error::Error, fmt::Write, path::Path};

use test_each_file::test_each_path;
use wasqlite_client::{Connection, User};
use wasqlite_testing::{engine_connection, finalized_count, testscript, testscript::Command};

pub struct Runner {
	conn: Connection,
}

impl Runner {
	pub fn new() -> Self {
		Self {
			conn: engine_connection(),
		}
	}
}

impl testscript::Runner for Runner {
	fn run(&mut self, command: &Command) -> Result<String, Box<dyn Error>> {
		let mut output = String::new();
		match command.name.as_str() {
			"execute" => {
				println!("execute: {}", command.args);
				self.conn.execute(&command.args)?;
			}
			"query" => {
				println!("query: {}", command.args);
				for user in self.conn.query::<User>(&command.args)? {
					writeln!(output, "{}", user?)?;
				}
			}
			"statements" => {
				writeln!(output, "live={}", self.conn.live_statements())?;
				writeln!(output, "finalized={}", finalized_count(&mut self.conn))?;
			}
			name => return Err(format!("invalid command {name}").into()),
		}

		Ok(output)
	}

	fn end_script(&mut self) -> Result<(), Box<dyn Error>> {
		if self.conn.live_statements() != 0 {
			return Err(format!("{} statements left unfinalized", self.conn.live_statements()).into());
		}
		Ok(())
	}
}

test_each_path! { in "testsuite/scenario/tests/scripts" as scenario => test_scenario }

fn test_scenario(path: &Path) {
	testscript::run_path(&mut Runner::new(), path).expect("test failed")
}
