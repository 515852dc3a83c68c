// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Test support: a scripted engine module, temporary directories and a
//! line-oriented script runner.

pub mod engine;
pub mod tempdir;
pub mod testscript;

pub use engine::{
	ENGINE_WAT, engine_bridge, engine_bridge_with, engine_connection, engine_connection_with,
	engine_image, finalized_count,
};
