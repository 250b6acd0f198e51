// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Command implementations for the BiasLens CLI

pub mod config;
pub mod models;
pub mod prompts;
pub mod query;
pub mod serve;

pub use self::config::ConfigCommand;
pub use self::prompts::PromptsCommand;
pub use self::query::QueryCommand;
pub use self::serve::ServeCommand;
