// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use wasqlite_bridge::{Bridge, BridgeConfig};
use wasqlite_client::{ClientConfig, Connection, OpenFlags};

/// Text of the scripted engine module. See the header of `engine.wat` for the
/// statements it understands.
pub const ENGINE_WAT: &str = include_str!("engine.wat");

pub fn engine_image() -> Vec<u8> {
	wat::parse_str(ENGINE_WAT).expect("engine module must assemble")
}

pub fn engine_bridge() -> Bridge {
	engine_bridge_with(BridgeConfig::default())
}

pub fn engine_bridge_with(config: BridgeConfig) -> Bridge {
	Bridge::load(&engine_image(), config).expect("engine module must load")
}

pub fn engine_connection() -> Connection {
	Connection::open_in_memory(engine_bridge()).expect("engine database must open")
}

pub fn engine_connection_with(config: ClientConfig) -> Connection {
	Connection::open_with(engine_bridge(), ":memory:", OpenFlags::default(), config)
		.expect("engine database must open")
}

/// Statements the engine has finalized so far.
pub fn finalized_count(conn: &mut Connection) -> u64 {
	conn.bridge_mut().call_for_int("finalized_count", &[]).expect("engine exports finalized_count")
}
