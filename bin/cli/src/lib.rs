// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

pub mod config;
pub mod demo;
pub mod error;

pub use config::CliConfig;
pub use demo::{Options, run, run_demo};
pub use error::CliError;
