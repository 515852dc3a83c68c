// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::fmt::{self, Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallErrorKind {
	/// The module has no function export with this name.
	MissingExport,
	/// The export exists but its signature cannot carry plain integers, or the argument count is wrong.
	Signature,
	/// Guest code trapped while running the call.
	Trap,
	/// An earlier call trapped; the instance state is no longer trusted.
	Poisoned,
}

impl Display for CallErrorKind {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		match self {
			CallErrorKind::MissingExport => f.write_str("missing export"),
			CallErrorKind::Signature => f.write_str("signature mismatch"),
			CallErrorKind::Trap => f.write_str("trap"),
			CallErrorKind::Poisoned => f.write_str("instance poisoned"),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
	#[error("failed to compile module: {reason}")]
	Compile {
		reason: String,
	},

	#[error("failed to instantiate module: {reason}")]
	Instantiate {
		reason: String,
	},

	#[error("call to `{function}` failed ({kind}): {reason}")]
	Call {
		function: String,
		kind: CallErrorKind,
		reason: String,
	},

	#[error("guest allocation of {size} bytes failed: {reason}")]
	Allocation {
		size: u64,
		reason: String,
	},

	#[error("guest memory access out of bounds: {length} bytes at {pointer} exceed memory size {memory_size}")]
	MemoryAccess {
		pointer: u64,
		length: u64,
		memory_size: u64,
	},

	#[error("engine returned status {status}{}", engine_detail(message))]
	Engine {
		status: u32,
		message: String,
	},
}

fn engine_detail(message: &str) -> String {
	if message.is_empty() {
		String::new()
	} else {
		format!(": {message}")
	}
}

impl Error {
	pub(crate) fn call(function: impl Into<String>, kind: CallErrorKind, reason: impl Into<String>) -> Self {
		Error::Call {
			function: function.into(),
			kind,
			reason: reason.into(),
		}
	}

	/// Status code reported by the engine, if this is an engine failure.
	pub fn status(&self) -> Option<u32> {
		match self {
			Error::Engine {
				status,
				..
			} => Some(*status),
			_ => None,
		}
	}

	/// True when the failure came from guest code trapping, directly or on an earlier call.
	pub fn is_trap(&self) -> bool {
		matches!(
			self,
			Error::Call {
				kind: CallErrorKind::Trap | CallErrorKind::Poisoned,
				..
			}
		)
	}
}

pub type Result<T> = std::result::Result<T, Error>;
