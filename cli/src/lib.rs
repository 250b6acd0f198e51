// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! BiasLens CLI library - exposes testable components
//!
//! # Architecture
//!
//! - **Layer:** Interface / Presentation Layer
//! - **Purpose:** Command handlers, service wiring and the HTTP server entry point

pub mod commands;
pub mod embedded;
pub mod server;
