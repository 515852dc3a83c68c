// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! The sandboxed execution runtime: compiling module images and activating them.

use tracing::{debug, trace, warn};
use wasmtime::{Config, Engine, Instance, Linker, Memory, Module, Store, Trap, Val, ValType};
use wasmtime_wasi::{WasiCtxBuilder, p1, p1::WasiP1Ctx};

use crate::{BridgeConfig, CallErrorKind, Error, Result};

/// Store data of every instance. The guest only sees WASI preview1.
pub struct GuestState {
	wasi: WasiP1Ctx,
}

/// A compiled module image ready for instantiation.
pub struct CompiledModule {
	module: Module,
}

impl CompiledModule {
	pub fn module(&self) -> &Module {
		&self.module
	}
}

/// Owns the wasmtime engine and the linker shared by all instances it creates.
pub struct ModuleRuntime {
	engine: Engine,
	linker: Linker<GuestState>,
	config: BridgeConfig,
}

impl ModuleRuntime {
	pub fn new(config: BridgeConfig) -> Result<Self> {
		let mut wasm_config = Config::new();
		if config.fuel_per_call.is_some() {
			wasm_config.consume_fuel(true);
		}
		if let Some(bytes) = config.max_wasm_stack {
			wasm_config.max_wasm_stack(bytes);
		}

		let engine = Engine::new(&wasm_config).map_err(|e| Error::Instantiate {
			reason: e.to_string(),
		})?;

		let mut linker = Linker::new(&engine);
		p1::add_to_linker_sync(&mut linker, |state: &mut GuestState| &mut state.wasi).map_err(|e| {
			Error::Instantiate {
				reason: e.to_string(),
			}
		})?;

		Ok(Self {
			engine,
			linker,
			config,
		})
	}

	pub fn engine(&self) -> &Engine {
		&self.engine
	}

	pub fn config(&self) -> &BridgeConfig {
		&self.config
	}

	pub fn compile(&self, image: &[u8]) -> Result<CompiledModule> {
		debug!(size = image.len(), "compiling module image");
		let module = Module::new(&self.engine, image).map_err(|e| Error::Compile {
			reason: e.to_string(),
		})?;
		Ok(CompiledModule {
			module,
		})
	}

	pub fn instantiate(&self, module: &CompiledModule) -> Result<ModuleInstance> {
		let mut wasi = WasiCtxBuilder::new();
		if self.config.inherit_stdio {
			wasi.inherit_stdio();
		}

		let mut store = Store::new(
			&self.engine,
			GuestState {
				wasi: wasi.build_p1(),
			},
		);
		if let Some(fuel) = self.config.fuel_per_call {
			store.set_fuel(fuel).map_err(|e| Error::Instantiate {
				reason: e.to_string(),
			})?;
		}

		let instance = self.linker.instantiate(&mut store, module.module()).map_err(|e| Error::Instantiate {
			reason: e.to_string(),
		})?;

		let memory = instance.get_memory(&mut store, "memory").ok_or_else(|| Error::Instantiate {
			reason: "module does not export `memory`".to_string(),
		})?;

		let mut activated = ModuleInstance {
			store,
			instance,
			memory,
			fuel_per_call: self.config.fuel_per_call,
			poisoned_by: None,
		};

		// WASI reactors expect `_initialize` before any other export is used.
		if activated.has_function("_initialize") {
			debug!("running reactor initializer");
			activated.call_function("_initialize", &[]).map_err(|e| Error::Instantiate {
				reason: e.to_string(),
			})?;
		}

		debug!(memory_size = activated.memory_size(), "module instantiated");
		Ok(activated)
	}
}

/// An activated module: its store, exports and linear memory.
///
/// Calls are strictly sequential; `&mut self` on every call enforces a single caller.
pub struct ModuleInstance {
	pub(crate) store: Store<GuestState>,
	instance: Instance,
	pub(crate) memory: Memory,
	fuel_per_call: Option<u64>,
	poisoned_by: Option<String>,
}

impl ModuleInstance {
	pub fn has_function(&mut self, name: &str) -> bool {
		self.instance.get_func(&mut self.store, name).is_some()
	}

	/// Name of the export whose trap poisoned this instance, if any.
	pub fn poisoned_by(&self) -> Option<&str> {
		self.poisoned_by.as_deref()
	}

	/// Call an integer-only export with positional arguments and widen its results to `u64`.
	///
	/// i32 results are zero-extended, which suits addresses, sizes and status codes.
	pub fn call_function(&mut self, name: &str, args: &[u64]) -> Result<Vec<u64>> {
		let results = self.call_values(name, args)?;
		results.iter().map(|value| from_val(name, value)).collect()
	}

	/// Like [`ModuleInstance::call_function`], but i32 results are sign-extended.
	pub fn call_function_signed(&mut self, name: &str, args: &[u64]) -> Result<Vec<i64>> {
		let results = self.call_values(name, args)?;
		results.iter().map(|value| from_val_signed(name, value)).collect()
	}

	fn call_values(&mut self, name: &str, args: &[u64]) -> Result<Vec<Val>> {
		if let Some(cause) = &self.poisoned_by {
			return Err(Error::call(name, CallErrorKind::Poisoned, format!("earlier call to `{cause}` trapped")));
		}

		let func = self
			.instance
			.get_func(&mut self.store, name)
			.ok_or_else(|| Error::call(name, CallErrorKind::MissingExport, "no function export with this name"))?;

		let ty = func.ty(&self.store);
		if ty.params().len() != args.len() {
			return Err(Error::call(
				name,
				CallErrorKind::Signature,
				format!("expected {} arguments, got {}", ty.params().len(), args.len()),
			));
		}

		let params = ty.params().zip(args).map(|(param, arg)| to_val(name, &param, *arg)).collect::<Result<Vec<_>>>()?;

		let mut results = ty
			.results()
			.map(|result| {
				Val::default_for_ty(&result).ok_or_else(|| {
					Error::call(name, CallErrorKind::Signature, format!("unsupported result type {result:?}"))
				})
			})
			.collect::<Result<Vec<_>>>()?;

		if let Some(fuel) = self.fuel_per_call {
			self.store.set_fuel(fuel).map_err(|e| Error::call(name, CallErrorKind::Trap, e.to_string()))?;
		}

		trace!(function = name, ?args, "calling guest function");
		if let Err(err) = func.call(&mut self.store, &params, &mut results) {
			let reason = match err.downcast_ref::<Trap>() {
				Some(trap) => trap.to_string(),
				None => err.to_string(),
			};
			warn!(function = name, %reason, "guest function trapped");
			self.poisoned_by = Some(name.to_string());
			return Err(Error::call(name, CallErrorKind::Trap, reason));
		}

		Ok(results)
	}
}

fn to_val(function: &str, ty: &ValType, arg: u64) -> Result<Val> {
	match ty {
		ValType::I32 => {
			let value = u32::try_from(arg).map_err(|_| {
				Error::call(function, CallErrorKind::Signature, format!("argument {arg} does not fit in i32"))
			})?;
			Ok(Val::I32(value as i32))
		}
		ValType::I64 => Ok(Val::I64(arg as i64)),
		other => Err(Error::call(function, CallErrorKind::Signature, format!("non-integer parameter type {other:?}"))),
	}
}

fn from_val(function: &str, value: &Val) -> Result<u64> {
	match value {
		Val::I32(v) => Ok(*v as u32 as u64),
		Val::I64(v) => Ok(*v as u64),
		other => Err(Error::call(function, CallErrorKind::Signature, format!("non-integer result {other:?}"))),
	}
}

fn from_val_signed(function: &str, value: &Val) -> Result<i64> {
	match value {
		Val::I32(v) => Ok(*v as i64),
		Val::I64(v) => Ok(*v),
		other => Err(Error::call(function, CallErrorKind::Signature, format!("non-integer result {other:?}"))),
	}
}
