// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! BiasLens core
//!
//! Sends one prompt to several language models at once and collects the
//! answers side by side, one entry per requested model and in request order.
//!
//! # Architecture
//!
//! - **Layer:** Core System
//! - **Purpose:** Domain types, fan-out orchestration, provider adapters, HTTP surface

pub mod domain;
pub mod application;
pub mod infrastructure;
pub mod presentation;

pub use domain::*;
