// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Relational client for a SQLite engine compiled to WebAssembly.
//!
//! Sequences bridge primitives according to the engine's C calling
//! convention: open a database, execute statements without results, and
//! iterate query rows through a prepare → step → column-read cycle.
//!
//! # Example
//!
//! ```ignore
//! use wasqlite_bridge::{Bridge, BridgeConfig};
//! use wasqlite_client::{Connection, User};
//!
//! let bridge = Bridge::load(&image, BridgeConfig::default())?;
//! let mut conn = Connection::open_in_memory(bridge)?;
//! conn.execute("CREATE TABLE users (id int, name varchar(10))")?;
//! conn.execute("INSERT INTO users(id, name) VALUES(0, 'go')")?;
//! for user in conn.query::<User>("SELECT id, name FROM users")? {
//!     println!("{}", user?);
//! }
//! ```

pub mod abi;
pub mod config;
pub mod connection;
pub mod error;
pub mod row;
pub mod statement;

pub use abi::OpenFlags;
pub use config::{ClientConfig, EngineExports};
pub use connection::{Connection, DatabaseHandle};
pub use error::{Error, Operation, Result};
pub use row::{FromRow, Row, Rows, User};
pub use statement::{Statement, StatementHandle, Step};
