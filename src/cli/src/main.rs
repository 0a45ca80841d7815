/*
   Unix Azure Entra ID implementation
   Copyright (C) David Mulder <dmulder@samba.org> 2024

   This program is free software; you can redistribute it and/or modify
   it under the terms of the GNU General Public License as published by
   the Free Software Foundation; either version 3 of the License, or
   (at your option) any later version.

   This program is distributed in the hope that it will be useful,
   but WITHOUT ANY WARRANTY; without even the implied warranty of
   MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
   GNU General Public License for more details.

   You should have received a copy of the GNU General Public License
   along with this program.  If not, see <http://www.gnu.org/licenses/>.
*/
#![deny(warnings)]
#![warn(unused_extern_crates)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::unreachable)]
#![deny(clippy::await_holding_lock)]
#![deny(clippy::needless_pass_by_value)]
#![deny(clippy::trivially_copy_pass_by_ref)]

#[macro_use]
extern crate tracing;

use std::process::ExitCode;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use entra_sync_common::actions::{runner_debug, set_failed, ActionInputs, GithubOutput};
use entra_sync_common::config::SyncConfig;
use entra_sync_common::mapping::PermissionLevel;
use entra_sync_common::pipeline::{self, RunSettings};
use graph::auth::TokenSource;
use graph::GraphClient;

include!("./opt/tool.rs");

impl EntraAppSyncParser {
    fn inputs(&self) -> ActionInputs {
        let mut inputs = ActionInputs::new(&self.enterprise_app_object_id, &self.app_role_id);
        for level in PermissionLevel::ALL {
            let raw = match level {
                PermissionLevel::Admin => &self.admin_groups,
                PermissionLevel::Maintain => &self.maintain_groups,
                PermissionLevel::Write => &self.write_groups,
                PermissionLevel::Triage => &self.triage_groups,
                PermissionLevel::Read => &self.read_groups,
            };
            inputs.set_groups(level, raw);
        }
        inputs
    }

    fn settings(&self, cfg: &SyncConfig) -> RunSettings {
        let mut sync = cfg.get_sync_settings();
        if let Some(timeout) = self.sync_timeout {
            sync.timeout = Duration::from_secs(timeout);
        }
        if let Some(interval) = self.sync_interval {
            sync.interval = Duration::from_secs(interval);
        }
        RunSettings {
            levels: cfg.get_permission_levels(),
            sync,
        }
    }
}

async fn graph_client(cfg: &SyncConfig) -> Result<GraphClient> {
    let graph_url = cfg.get_graph_url();
    let timeout = Duration::from_secs(cfg.get_connection_timeout());
    let token = TokenSource::from_env()
        .acquire_token(&cfg.get_authority_host(), &graph_url, timeout)
        .await
        .context("Failed to acquire a Microsoft Graph access token")?;
    GraphClient::new(&graph_url, &token, timeout).context("Failed to create the Graph client")
}

async fn run(opt: &EntraAppSyncParser, cfg: &SyncConfig) -> Result<()> {
    let inputs = opt.inputs();
    for level in PermissionLevel::ALL {
        debug!("{}: \"{}\"", level.input_name(), inputs.groups(level));
    }
    if inputs.enterprise_app_object_id.trim().is_empty() {
        return Err(anyhow!("enterprise_app_object_id must not be empty"));
    }
    if inputs.app_role_id.trim().is_empty() {
        return Err(anyhow!("app_role_id must not be empty"));
    }

    let settings = opt.settings(cfg);
    let graph = graph_client(cfg).await?;
    let mut outputs = GithubOutput::from_env();

    let summary = pipeline::run(&graph, &inputs, &settings, &mut outputs).await?;
    debug!(
        "Added {} group(s) to the application: {:?}",
        summary.added.len(),
        summary.added
    );
    Ok(())
}

/// Log a failed run and return the message for the workflow annotation.
fn report_failure(e: &anyhow::Error) -> String {
    let message = format!("{:#}", e);
    error!("{}", message);
    message
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let opt = EntraAppSyncParser::parse();

    let cfg = SyncConfig::new(opt.config.as_deref());
    let config_debug = cfg.as_ref().map(|cfg| cfg.get_debug()).unwrap_or(false);
    if opt.debug || config_debug || runner_debug() {
        std::env::set_var("RUST_LOG", "debug");
    }
    tracing_subscriber::fmt::init();

    let cfg = match cfg {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("{}", e);
            set_failed(&e);
            return ExitCode::FAILURE;
        }
    };
    debug!("Using configuration {}", cfg.filename());

    match run(&opt, &cfg).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            set_failed(&report_failure(&e));
            ExitCode::FAILURE
        }
    }
}
