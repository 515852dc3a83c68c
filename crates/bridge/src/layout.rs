// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Named-field decoding of fixed-layout structs living in guest memory.
//!
//! Guest output structs are sequences of little-endian `u32` words. Each
//! layout names its fields once, as [`Field`] constants, instead of
//! scattering byte offsets across call sites.

/// A `u32` field at a fixed byte offset from the struct base.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
	pub name: &'static str,
	pub offset: u32,
}

impl Field {
	pub const fn u32(name: &'static str, offset: u32) -> Self {
		Self {
			name,
			offset,
		}
	}

	/// First byte past this field.
	pub const fn end(&self) -> u32 {
		self.offset + 4
	}
}

/// Little-endian view over the bytes of one guest struct.
pub struct FieldReader<'a> {
	base: u32,
	bytes: &'a [u8],
}

impl<'a> FieldReader<'a> {
	pub fn new(base: u32, bytes: &'a [u8]) -> Self {
		Self {
			base,
			bytes,
		}
	}

	/// Guest address the bytes were read from.
	pub fn base(&self) -> u32 {
		self.base
	}

	/// Read `field`. The layout's `SIZE` guarantees the field lies inside the read bytes.
	pub fn u32(&self, field: Field) -> u32 {
		debug_assert!(field.end() as usize <= self.bytes.len(), "field `{}` outside struct", field.name);
		let start = field.offset as usize;
		let mut word = [0u8; 4];
		word.copy_from_slice(&self.bytes[start..start + 4]);
		u32::from_le_bytes(word)
	}
}

/// A struct the guest writes into its own memory, decoded by the host.
pub trait GuestStruct: Sized {
	/// Number of bytes read from the guest; must cover every field.
	const SIZE: u32;

	fn decode(fields: &FieldReader<'_>) -> Self;
}

#[cfg(test)]
mod tests {
	use super::*;

	struct Pair {
		left: u32,
		right: u32,
	}

	impl Pair {
		const LEFT: Field = Field::u32("left", 0);
		const RIGHT: Field = Field::u32("right", 4);
	}

	impl GuestStruct for Pair {
		const SIZE: u32 = Self::RIGHT.end();

		fn decode(fields: &FieldReader<'_>) -> Self {
			Self {
				left: fields.u32(Self::LEFT),
				right: fields.u32(Self::RIGHT),
			}
		}
	}

	#[test]
	fn test_decode_little_endian_fields() {
		let bytes = [0x01, 0x00, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00];
		let pair = Pair::decode(&FieldReader::new(16, &bytes));
		assert_eq!(pair.left, 1);
		assert_eq!(pair.right, 256);
	}

	#[test]
	fn test_size_covers_last_field() {
		assert_eq!(Pair::SIZE, 8);
	}

	#[test]
	fn test_reader_keeps_base() {
		let bytes = [0u8; 4];
		assert_eq!(FieldReader::new(1024, &bytes).base(), 1024);
	}
}
