// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{io, path::PathBuf, process::ExitCode};

use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;
use wasqlite_cli::{CliConfig, CliError, Options, run};

/// Run a small users workload against a SQLite module compiled to WebAssembly.
#[derive(Debug, Parser)]
#[command(name = "wasqlite", author, version, about, long_about = None)]
struct Args {
	/// Path to the SQLite WebAssembly module.
	module: PathBuf,

	/// Database name passed to the engine's open call.
	#[arg(short, long, default_value = ":memory:")]
	database: String,

	/// JSON file with `bridge` and `client` settings.
	#[arg(short, long)]
	config: Option<PathBuf>,

	/// Emit logs as JSON lines.
	#[arg(long)]
	json_logs: bool,
}

fn init_logging(json: bool) {
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
	let subscriber = tracing_subscriber::fmt().with_env_filter(filter).with_writer(io::stderr);
	if json {
		subscriber.json().init();
	} else {
		subscriber.init();
	}
}

fn main() -> ExitCode {
	let args = Args::parse();
	init_logging(args.json_logs);

	match execute(args) {
		Ok(()) => ExitCode::SUCCESS,
		Err(err) => {
			error!(%err, "wasqlite failed");
			ExitCode::FAILURE
		}
	}
}

fn execute(args: Args) -> Result<(), CliError> {
	let config = match &args.config {
		Some(path) => CliConfig::load(path)?,
		None => CliConfig::default(),
	};

	let options = Options {
		module: args.module,
		database: args.database,
		config,
	};
	run(options, &mut io::stdout().lock())
}
