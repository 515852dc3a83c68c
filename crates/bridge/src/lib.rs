// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Host/guest calling-convention bridge for sandboxed WebAssembly modules.
//!
//! The guest exposes a flat byte-addressable memory and functions that only
//! accept and return integers. This crate layers a small protocol on top:
//!
//! - **Calls**: [`Bridge::call_function`] converts `u64` arguments to the
//!   export's declared integer types and widens the results back.
//! - **Strings in**: [`Bridge::allocate_and_write`] asks the guest allocator
//!   for scratch memory and copies host bytes into it.
//! - **Results out**: after a call, [`Bridge::decode_envelope`] reads the
//!   guest's single [`ResultEnvelope`] (status, aux pointer, aux size) into
//!   an owned snapshot. Engine-specific output structs are decoded with
//!   [`GuestStruct`] layouts via [`Bridge::read_result`].
//!
//! # Example
//!
//! ```ignore
//! use wasqlite_bridge::{Bridge, BridgeConfig};
//!
//! let mut bridge = Bridge::load(&image, BridgeConfig::default())?;
//! let sql = bridge.allocate_str("SELECT 1")?;
//! bridge.call_function("sqlite3_exec", &[db, sql.pointer, sql.length, 0, 0])?;
//! let envelope = bridge.decode_envelope()?;
//! envelope.ensure_success(None)?;
//! ```

pub mod bridge;
pub mod config;
pub mod envelope;
pub mod error;
pub mod layout;
mod memory;
pub mod runtime;

pub use bridge::Bridge;
pub use config::BridgeConfig;
pub use envelope::{GuestSlice, ResultEnvelope, ResultRegion, ensure_status_success};
pub use error::{CallErrorKind, Error, Result};
pub use layout::{Field, FieldReader, GuestStruct};
pub use runtime::{CompiledModule, GuestState, ModuleInstance, ModuleRuntime};
