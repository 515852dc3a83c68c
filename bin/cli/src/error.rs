// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{io, path::PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum CliError {
	#[error("cannot read `{}`: {source}", path.display())]
	Read {
		path: PathBuf,
		#[source]
		source: io::Error,
	},

	#[error("invalid config `{}`: {source}", path.display())]
	Config {
		path: PathBuf,
		#[source]
		source: serde_json::Error,
	},

	#[error(transparent)]
	Bridge(#[from] wasqlite_bridge::Error),

	#[error(transparent)]
	Client(#[from] wasqlite_client::Error),

	#[error("cannot write output: {0}")]
	Output(#[source] io::Error),
}
