// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! `biaslens serve` - run the HTTP API (and optional front-end) in the foreground

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

use biaslens_core::domain::app_config::BiasLensConfigManifest;

use crate::embedded::EmbeddedServices;
use crate::server;

#[derive(Args)]
pub struct ServeCommand {
    /// Bind address (overrides spec.server.bind_address)
    #[arg(long)]
    host: Option<String>,

    /// HTTP port (overrides spec.server.port and BACKEND_PORT)
    #[arg(long)]
    port: Option<u16>,

    /// Static front-end directory served at /
    #[arg(long, value_name = "DIR")]
    frontend_dir: Option<PathBuf>,
}

pub async fn execute(cmd: ServeCommand, manifest: BiasLensConfigManifest) -> Result<()> {
    let mut services = EmbeddedServices::new(manifest)?;

    let server_config = &mut services.manifest.spec.server;
    if let Some(host) = cmd.host {
        server_config.bind_address = host;
    }
    if let Some(port) = cmd.port {
        server_config.port = port;
    }
    if let Some(dir) = cmd.frontend_dir {
        server_config.frontend_dir = Some(dir);
    }

    server::start_server(services).await
}
