// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use crate::{
	Error, Result,
	layout::{Field, FieldReader, GuestStruct},
};

/// Owned snapshot of the result envelope the guest rewrites after every call.
///
/// The guest keeps exactly one envelope per instance, so a snapshot must be
/// taken before the next call. Interpretation of `aux_pointer` and
/// `aux_size` depends on the call that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResultEnvelope {
	pub base: u32,
	pub status: u32,
	pub aux_pointer: u32,
	pub aux_size: u32,
}

impl ResultEnvelope {
	pub const STATUS: Field = Field::u32("status", 0);
	pub const AUX_POINTER: Field = Field::u32("aux_pointer", 4);
	pub const AUX_SIZE: Field = Field::u32("aux_size", 8);

	pub fn is_success(&self) -> bool {
		self.status == 0
	}

	/// Fail with [`Error::Engine`] when the status is non-zero.
	pub fn ensure_success(&self, message: Option<String>) -> Result<()> {
		ensure_status_success(self.status, message)
	}

	/// The auxiliary byte range, for calls that use it as one.
	pub fn aux_region(&self) -> ResultRegion {
		ResultRegion {
			pointer: self.aux_pointer,
			size: self.aux_size,
		}
	}
}

impl GuestStruct for ResultEnvelope {
	const SIZE: u32 = Self::AUX_SIZE.end();

	fn decode(fields: &FieldReader<'_>) -> Self {
		Self {
			base: fields.base(),
			status: fields.u32(Self::STATUS),
			aux_pointer: fields.u32(Self::AUX_POINTER),
			aux_size: fields.u32(Self::AUX_SIZE),
		}
	}
}

/// Raw `(pointer, size)` pair reported by the result accessor exports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResultRegion {
	pub pointer: u32,
	pub size: u32,
}

impl ResultRegion {
	pub fn is_empty(&self) -> bool {
		self.size == 0
	}
}

/// Host bytes copied into guest memory, ready to pass as a `(ptr, len)` argument pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GuestSlice {
	pub pointer: u64,
	pub length: u64,
}

impl GuestSlice {
	pub fn args(&self) -> [u64; 2] {
		[self.pointer, self.length]
	}
}

/// Fail with [`Error::Engine`] when `status` is non-zero.
///
/// The message is the supplied context or empty; nothing is made up when the engine gave none.
pub fn ensure_status_success(status: u32, message: Option<String>) -> Result<()> {
	if status == 0 {
		return Ok(());
	}
	Err(Error::Engine {
		status,
		message: message.unwrap_or_default(),
	})
}
