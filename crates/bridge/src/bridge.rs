// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use tracing::{debug, trace};

use crate::{
	BridgeConfig, CallErrorKind, Error, Result,
	envelope::{GuestSlice, ResultEnvelope, ResultRegion},
	layout::GuestStruct,
	runtime::{ModuleInstance, ModuleRuntime},
};

/// Calling-convention bridge over one module instance.
///
/// The guest functions only exchange integers. Strings travel through
/// memory obtained from the guest allocator, and rich results come back
/// through the result envelope, which must be decoded right after the call
/// that produced it.
pub struct Bridge {
	instance: ModuleInstance,
	config: BridgeConfig,
}

impl Bridge {
	pub fn new(instance: ModuleInstance, config: BridgeConfig) -> Self {
		Self {
			instance,
			config,
		}
	}

	/// Compile and instantiate `image` on a fresh runtime.
	pub fn load(image: &[u8], config: BridgeConfig) -> Result<Self> {
		let runtime = ModuleRuntime::new(config.clone())?;
		let module = runtime.compile(image)?;
		let instance = runtime.instantiate(&module)?;
		Ok(Self::new(instance, config))
	}

	pub fn config(&self) -> &BridgeConfig {
		&self.config
	}

	pub fn instance(&self) -> &ModuleInstance {
		&self.instance
	}

	pub fn instance_mut(&mut self) -> &mut ModuleInstance {
		&mut self.instance
	}

	pub fn call_function(&mut self, name: &str, args: &[u64]) -> Result<Vec<u64>> {
		self.instance.call_function(name, args)
	}

	/// Call an export that returns exactly one integer.
	pub fn call_for_int(&mut self, name: &str, args: &[u64]) -> Result<u64> {
		let results = self.call_function(name, args)?;
		single_result(name, &results)
	}

	/// Call an export that returns exactly one signed integer. An i32 result is sign-extended.
	pub fn call_for_signed_int(&mut self, name: &str, args: &[u64]) -> Result<i64> {
		let results = self.instance.call_function_signed(name, args)?;
		single_result(name, &results)
	}

	/// Copy `bytes` into memory freshly obtained from the guest allocator.
	pub fn allocate_and_write(&mut self, bytes: &[u8]) -> Result<GuestSlice> {
		let size = bytes.len() as u64;
		if size > u32::MAX as u64 {
			return Err(Error::Allocation {
				size,
				reason: "larger than the 32-bit guest address space".to_string(),
			});
		}

		let allocate = self.config.allocate_export.clone();
		let pointer = self.call_for_int(&allocate, &[size, 0])?;
		if pointer == 0 && size > 0 {
			return Err(Error::Allocation {
				size,
				reason: "allocator returned null".to_string(),
			});
		}

		if size > 0 {
			self.instance.write_bytes(pointer, bytes).map_err(|e| Error::Allocation {
				size,
				reason: format!("allocator returned unusable address: {e}"),
			})?;
		}

		trace!(pointer, size, "wrote host bytes into guest memory");
		Ok(GuestSlice {
			pointer,
			length: size,
		})
	}

	pub fn allocate_str(&mut self, value: &str) -> Result<GuestSlice> {
		self.allocate_and_write(value.as_bytes())
	}

	pub fn read_bytes(&self, pointer: u32, length: u32) -> Result<Vec<u8>> {
		self.instance.read_bytes(pointer, length)
	}

	pub fn read_u32_le(&self, pointer: u32) -> Result<u32> {
		self.instance.read_u32_le(pointer)
	}

	/// Ask the guest where its last result lives and how large it is.
	pub fn result_region(&mut self) -> Result<ResultRegion> {
		let ptr_export = self.config.result_ptr_export.clone();
		let size_export = self.config.result_size_export.clone();

		let pointer = self.call_for_int(&ptr_export, &[])?;
		let size = self.call_for_int(&size_export, &[])?;

		let region = ResultRegion {
			pointer: guest_u32(&ptr_export, pointer)?,
			size: guest_u32(&size_export, size)?,
		};
		trace!(?region, "read result region");
		Ok(region)
	}

	/// Snapshot the result envelope left by the most recent call.
	pub fn decode_envelope(&mut self) -> Result<ResultEnvelope> {
		self.read_result()
	}

	/// Decode the engine-specific struct at the result envelope's base.
	pub fn read_result<T: GuestStruct>(&mut self) -> Result<T> {
		let region = self.result_region()?;
		self.instance.read_struct(region.pointer)
	}

	/// Issue a call and decode its output struct with no other call in between.
	pub fn call_then_decode<T: GuestStruct>(&mut self, name: &str, args: &[u64]) -> Result<T> {
		self.call_function(name, args)?;
		let decoded = self.read_result()?;
		debug!(function = name, "decoded call result");
		Ok(decoded)
	}
}

fn single_result<T: Copy>(function: &str, results: &[T]) -> Result<T> {
	match results {
		[value] => Ok(*value),
		_ => Err(Error::call(
			function,
			CallErrorKind::Signature,
			format!("expected one result, got {}", results.len()),
		)),
	}
}

fn guest_u32(function: &str, value: u64) -> Result<u32> {
	u32::try_from(value).map_err(|_| {
		Error::call(function, CallErrorKind::Signature, format!("returned {value}, not a 32-bit address or size"))
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::ensure_status_success;

	const GUEST: &str = r#"
		(module
			(memory (export "memory") 1)
			(global $heap (mut i32) (i32.const 1024))
			(func (export "allocate") (param $size i32) (param $align i32) (result i32)
				(local $ptr i32)
				(local.set $ptr (global.get $heap))
				(global.set $heap (i32.add (global.get $heap) (local.get $size)))
				(local.get $ptr))
			(func (export "get_result_ptr") (result i32) (i32.const 16))
			(func (export "get_result_size") (result i32) (i32.const 12))
			(func (export "set_envelope") (param $status i32) (param $ptr i32) (param $size i32)
				(i32.store (i32.const 16) (local.get $status))
				(i32.store (i32.const 20) (local.get $ptr))
				(i32.store (i32.const 24) (local.get $size)))
			(func (export "add64") (param i64 i64) (result i64)
				(i64.add (local.get 0) (local.get 1)))
			(func (export "minus_one") (result i32) (i32.const -1))
			(func (export "nothing"))
			(func (export "boom") (unreachable))
			(func (export "float") (param f32))
			(func (export "spin") (loop $l (br $l)))
		)
	"#;

	fn bridge_with(wat: &str, config: BridgeConfig) -> Bridge {
		Bridge::load(&wat::parse_str(wat).unwrap(), config).unwrap()
	}

	fn bridge() -> Bridge {
		bridge_with(GUEST, BridgeConfig::default())
	}

	#[test]
	fn test_allocate_and_read_round_trip() {
		let mut bridge = bridge();
		for value in ["", "go", "SELECT id, name FROM users", "ünïcødé"] {
			let slice = bridge.allocate_str(value).unwrap();
			assert_eq!(slice.length, value.len() as u64);
			let bytes = bridge.read_bytes(slice.pointer as u32, slice.length as u32).unwrap();
			assert_eq!(bytes, value.as_bytes());
		}
	}

	#[test]
	fn test_allocations_do_not_overlap() {
		let mut bridge = bridge();
		let first = bridge.allocate_str("first").unwrap();
		let second = bridge.allocate_str("second").unwrap();
		assert!(second.pointer >= first.pointer + first.length);
		assert_eq!(bridge.read_bytes(first.pointer as u32, 5).unwrap(), b"first");
	}

	#[test]
	fn test_read_past_memory_end_fails() {
		let bridge = bridge();
		let size = bridge.instance().memory_size();
		assert_eq!(size, 65536);

		let err = bridge.read_bytes(65534, 4).unwrap_err();
		assert_eq!(
			err,
			Error::MemoryAccess {
				pointer: 65534,
				length: 4,
				memory_size: 65536,
			}
		);
		assert!(bridge.read_bytes(65532, 4).is_ok());
	}

	#[test]
	fn test_read_u32_little_endian() {
		let mut bridge = bridge();
		let slice = bridge.allocate_and_write(&[0x78, 0x56, 0x34, 0x12]).unwrap();
		assert_eq!(bridge.read_u32_le(slice.pointer as u32).unwrap(), 0x1234_5678);
	}

	#[test]
	fn test_decode_envelope_snapshot() {
		let mut bridge = bridge();
		bridge.call_function("set_envelope", &[1, 64, 20]).unwrap();
		let envelope = bridge.decode_envelope().unwrap();
		assert_eq!(
			envelope,
			ResultEnvelope {
				base: 16,
				status: 1,
				aux_pointer: 64,
				aux_size: 20,
			}
		);

		bridge.call_function("set_envelope", &[0, 0, 0]).unwrap();
		assert_eq!(envelope.status, 1);
		assert_eq!(bridge.decode_envelope().unwrap().status, 0);
	}

	#[test]
	fn test_call_then_decode() {
		let mut bridge = bridge();
		let envelope: ResultEnvelope = bridge.call_then_decode("set_envelope", &[0, 512, 0]).unwrap();
		assert!(envelope.is_success());
		assert_eq!(envelope.aux_pointer, 512);
	}

	#[test]
	fn test_result_region() {
		let mut bridge = bridge();
		assert_eq!(
			bridge.result_region().unwrap(),
			ResultRegion {
				pointer: 16,
				size: 12,
			}
		);
	}

	#[test]
	fn test_ensure_status_success() {
		assert!(ensure_status_success(0, None).is_ok());
		assert_eq!(ensure_status_success(1, None).unwrap_err().status(), Some(1));
	}

	#[test]
	fn test_signed_results_keep_their_sign() {
		let mut bridge = bridge();
		assert_eq!(bridge.call_for_signed_int("minus_one", &[]).unwrap(), -1);
		assert_eq!(bridge.call_for_signed_int("add64", &[u64::MAX, 0]).unwrap(), -1);
		assert_eq!(bridge.call_for_signed_int("add64", &[40, 2]).unwrap(), 42);

		let err = bridge.call_for_signed_int("nothing", &[]).unwrap_err();
		assert!(matches!(
			err,
			Error::Call {
				kind: CallErrorKind::Signature,
				..
			}
		));
	}

	#[test]
	fn test_integer_results_are_widened() {
		let mut bridge = bridge();
		assert_eq!(bridge.call_function("add64", &[40, 2]).unwrap(), vec![42]);
		assert_eq!(bridge.call_for_int("minus_one", &[]).unwrap(), 0xFFFF_FFFF);
		assert!(bridge.call_function("nothing", &[]).unwrap().is_empty());
	}

	#[test]
	fn test_missing_export() {
		let mut bridge = bridge();
		let err = bridge.call_function("sqlite3_open_v2", &[]).unwrap_err();
		assert!(matches!(
			err,
			Error::Call {
				kind: CallErrorKind::MissingExport,
				..
			}
		));
	}

	#[test]
	fn test_signature_mismatch() {
		let mut bridge = bridge();
		let err = bridge.call_function("add64", &[1]).unwrap_err();
		assert!(matches!(
			err,
			Error::Call {
				kind: CallErrorKind::Signature,
				..
			}
		));

		let err = bridge.call_function("float", &[1]).unwrap_err();
		assert!(matches!(
			err,
			Error::Call {
				kind: CallErrorKind::Signature,
				..
			}
		));

		let err = bridge.call_for_int("nothing", &[]).unwrap_err();
		assert!(matches!(
			err,
			Error::Call {
				kind: CallErrorKind::Signature,
				..
			}
		));
	}

	#[test]
	fn test_i32_argument_out_of_range() {
		let mut bridge = bridge();
		let err = bridge.call_function("set_envelope", &[u64::MAX, 0, 0]).unwrap_err();
		assert!(matches!(
			err,
			Error::Call {
				kind: CallErrorKind::Signature,
				..
			}
		));
	}

	#[test]
	fn test_trap_poisons_instance() {
		let mut bridge = bridge();
		let err = bridge.call_function("boom", &[]).unwrap_err();
		assert!(matches!(
			err,
			Error::Call {
				kind: CallErrorKind::Trap,
				..
			}
		));
		assert_eq!(bridge.instance().poisoned_by(), Some("boom"));

		let err = bridge.call_function("add64", &[1, 2]).unwrap_err();
		assert!(matches!(
			err,
			Error::Call {
				kind: CallErrorKind::Poisoned,
				..
			}
		));
		assert!(err.is_trap());
	}

	#[test]
	fn test_fuel_bounds_runaway_guest() {
		let mut bridge = bridge_with(GUEST, BridgeConfig::new().fuel_per_call(10_000));
		assert_eq!(bridge.call_function("add64", &[1, 2]).unwrap(), vec![3]);

		let err = bridge.call_function("spin", &[]).unwrap_err();
		assert!(err.is_trap());
	}

	#[test]
	fn test_fuel_is_refilled_per_call() {
		let mut bridge = bridge_with(GUEST, BridgeConfig::new().fuel_per_call(100));
		for _ in 0..50 {
			bridge.call_function("add64", &[1, 2]).unwrap();
		}
	}

	#[test]
	fn test_allocator_null_is_allocation_error() {
		let mut bridge = bridge_with(
			r#"
			(module
				(memory (export "memory") 1)
				(func (export "allocate") (param i32 i32) (result i32) (i32.const 0)))
			"#,
			BridgeConfig::default(),
		);
		let err = bridge.allocate_str("go").unwrap_err();
		assert!(matches!(
			err,
			Error::Allocation {
				size: 2,
				..
			}
		));
	}

	#[test]
	fn test_allocator_stale_address_is_allocation_error() {
		let mut bridge = bridge();
		let err = bridge.allocate_and_write(&vec![7u8; 70_000]).unwrap_err();
		assert!(matches!(
			err,
			Error::Allocation {
				size: 70_000,
				..
			}
		));
	}

	#[test]
	fn test_custom_export_names() {
		let mut bridge = bridge_with(
			r#"
			(module
				(memory (export "memory") 1)
				(func (export "malloc") (param i32 i32) (result i32) (i32.const 2048)))
			"#,
			BridgeConfig::new().allocate_export("malloc"),
		);
		let slice = bridge.allocate_str("zig").unwrap();
		assert_eq!(slice.pointer, 2048);
	}

	#[test]
	fn test_malformed_image_is_compile_error() {
		let err = Bridge::load(b"\0asm\x01\0\0\0garbage", BridgeConfig::default()).err().unwrap();
		assert!(matches!(err, Error::Compile { .. }));
	}

	#[test]
	fn test_module_without_memory_fails_instantiation() {
		let image = wat::parse_str(r#"(module (func (export "f")))"#).unwrap();
		let err = Bridge::load(&image, BridgeConfig::default()).err().unwrap();
		assert!(matches!(err, Error::Instantiate { .. }));
	}

	#[test]
	fn test_reactor_initializer_runs() {
		let mut bridge = bridge_with(
			r#"
			(module
				(memory (export "memory") 1)
				(global $ready (mut i32) (i32.const 0))
				(func (export "_initialize") (global.set $ready (i32.const 1)))
				(func (export "ready") (result i32) (global.get $ready)))
			"#,
			BridgeConfig::default(),
		);
		assert_eq!(bridge.call_for_int("ready", &[]).unwrap(), 1);
	}
}
