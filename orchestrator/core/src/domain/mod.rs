// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Domain
//!
//! Model catalog, query and result types, prompt catalog, bias indicators
//! and the service configuration manifest.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer

pub mod app_config;
pub mod bias;
pub mod llm;
pub mod model;
pub mod prompt;
pub mod query;
