// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Presentation Layer (`biaslens-core`)
//!
//! HTTP surface and export formats. **No business logic lives here**; every
//! query is delegated to [`crate::application::QueryOrchestrator`].
//!
//! | Module | Transport | Description |
//! |--------|-----------|-------------|
//! | [`api`] | HTTP (Axum) | REST endpoints, CORS, static front-end fallback |
//! | [`export`] | files / stdout | JSON and CSV renderings of a comparison |

pub mod api;
pub mod export;
