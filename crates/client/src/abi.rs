// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! The engine's side of the calling convention: result codes, open flags
//! and the output structs its exports leave at the result envelope base.

use std::ops::BitOr;

use wasqlite_bridge::{Field, FieldReader, GuestStruct};

/// `sqlite3_step` produced a row.
pub const SQLITE_ROW: u32 = 100;
/// `sqlite3_step` finished executing the statement.
pub const SQLITE_DONE: u32 = 101;

/// Flags passed to `sqlite3_open_v2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenFlags(u32);

impl OpenFlags {
	pub const READ_ONLY: OpenFlags = OpenFlags(0x0000_0001);
	pub const READ_WRITE: OpenFlags = OpenFlags(0x0000_0002);
	pub const CREATE: OpenFlags = OpenFlags(0x0000_0004);
	pub const URI: OpenFlags = OpenFlags(0x0000_0040);
	pub const MEMORY: OpenFlags = OpenFlags(0x0000_0080);

	pub const fn from_bits(bits: u32) -> Self {
		OpenFlags(bits)
	}

	pub const fn bits(&self) -> u32 {
		self.0
	}

	pub const fn contains(&self, other: OpenFlags) -> bool {
		self.0 & other.0 == other.0
	}
}

impl Default for OpenFlags {
	fn default() -> Self {
		OpenFlags::READ_WRITE | OpenFlags::CREATE
	}
}

impl BitOr for OpenFlags {
	type Output = OpenFlags;

	fn bitor(self, rhs: OpenFlags) -> OpenFlags {
		OpenFlags(self.0 | rhs.0)
	}
}

/// Left by the open export: `{ status, db_handle }`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenOutput {
	pub status: u32,
	pub db_handle: u32,
}

impl OpenOutput {
	const STATUS: Field = Field::u32("status", 0);
	const DB_HANDLE: Field = Field::u32("db_handle", 4);
}

impl GuestStruct for OpenOutput {
	const SIZE: u32 = Self::DB_HANDLE.end();

	fn decode(fields: &FieldReader<'_>) -> Self {
		Self {
			status: fields.u32(Self::STATUS),
			db_handle: fields.u32(Self::DB_HANDLE),
		}
	}
}

/// Left by the exec export: `{ status, error_message_ptr, error_message_len }`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecOutput {
	pub status: u32,
	pub error_message_ptr: u32,
	pub error_message_len: u32,
}

impl ExecOutput {
	const STATUS: Field = Field::u32("status", 0);
	const ERROR_MESSAGE_PTR: Field = Field::u32("error_message_ptr", 4);
	const ERROR_MESSAGE_LEN: Field = Field::u32("error_message_len", 8);
}

impl GuestStruct for ExecOutput {
	const SIZE: u32 = Self::ERROR_MESSAGE_LEN.end();

	fn decode(fields: &FieldReader<'_>) -> Self {
		Self {
			status: fields.u32(Self::STATUS),
			error_message_ptr: fields.u32(Self::ERROR_MESSAGE_PTR),
			error_message_len: fields.u32(Self::ERROR_MESSAGE_LEN),
		}
	}
}

/// Left by the prepare export: `{ status, stmt_handle }`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrepareOutput {
	pub status: u32,
	pub stmt_handle: u32,
}

impl PrepareOutput {
	const STATUS: Field = Field::u32("status", 0);
	const STMT_HANDLE: Field = Field::u32("stmt_handle", 4);
}

impl GuestStruct for PrepareOutput {
	const SIZE: u32 = Self::STMT_HANDLE.end();

	fn decode(fields: &FieldReader<'_>) -> Self {
		Self {
			status: fields.u32(Self::STATUS),
			stmt_handle: fields.u32(Self::STMT_HANDLE),
		}
	}
}
