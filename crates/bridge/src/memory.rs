// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Bounds-checked access to an instance's linear memory.
//!
//! Every range is checked against the current memory size before touching
//! it. Out-of-range requests fail; they are never truncated or zero-filled.

use crate::{
	Error, Result,
	layout::{FieldReader, GuestStruct},
	runtime::ModuleInstance,
};

impl ModuleInstance {
	/// Current size of the linear memory in bytes.
	pub fn memory_size(&self) -> u64 {
		self.memory.data_size(&self.store) as u64
	}

	fn check_range(&self, pointer: u64, length: u64) -> Result<usize> {
		let memory_size = self.memory_size();
		match pointer.checked_add(length) {
			Some(end) if end <= memory_size => Ok(pointer as usize),
			_ => Err(Error::MemoryAccess {
				pointer,
				length,
				memory_size,
			}),
		}
	}

	pub fn read_bytes(&self, pointer: u32, length: u32) -> Result<Vec<u8>> {
		let offset = self.check_range(pointer as u64, length as u64)?;
		let mut buffer = vec![0u8; length as usize];
		self.memory.read(&self.store, offset, &mut buffer).map_err(|_| Error::MemoryAccess {
			pointer: pointer as u64,
			length: length as u64,
			memory_size: self.memory_size(),
		})?;
		Ok(buffer)
	}

	pub fn write_bytes(&mut self, pointer: u64, bytes: &[u8]) -> Result<()> {
		let offset = self.check_range(pointer, bytes.len() as u64)?;
		let memory_size = self.memory_size();
		self.memory.write(&mut self.store, offset, bytes).map_err(|_| Error::MemoryAccess {
			pointer,
			length: bytes.len() as u64,
			memory_size,
		})
	}

	/// Read a little-endian `u32`, independent of host endianness.
	pub fn read_u32_le(&self, pointer: u32) -> Result<u32> {
		let bytes = self.read_bytes(pointer, 4)?;
		let mut word = [0u8; 4];
		word.copy_from_slice(&bytes);
		Ok(u32::from_le_bytes(word))
	}

	/// Decode a guest struct whose first byte is at `base`.
	pub fn read_struct<T: GuestStruct>(&self, base: u32) -> Result<T> {
		let bytes = self.read_bytes(base, T::SIZE)?;
		Ok(T::decode(&FieldReader::new(base, &bytes)))
	}
}
