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
use crate::actions::{ActionInputs, OutputSink};
use crate::error::SyncError;
use crate::mapping::{parse_group_mappings, unique_group_ids, PermissionLevel};
use crate::reconcile::{fetch_current_assignments, reconcile};
use crate::report::MappingReport;
use crate::resolver::resolve_group_names;
use crate::sync::{SyncOrchestrator, SyncOutcome, SyncSettings};
use graph::GraphApi;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSettings {
    pub levels: Vec<PermissionLevel>,
    pub sync: SyncSettings,
}

impl Default for RunSettings {
    fn default() -> Self {
        RunSettings {
            levels: PermissionLevel::ALL.to_vec(),
            sync: SyncSettings::default(),
        }
    }
}

#[derive(Debug)]
pub struct RunSummary {
    pub report: MappingReport,
    /// Groups newly assigned to the application.
    pub added: Vec<String>,
    /// Present only when a sync was started.
    pub sync: Option<SyncOutcome>,
}

/// One reconciliation pass: parse the inputs, resolve every group, report the
/// mappings, assign missing groups, and sync the application if anything
/// changed. Each step completes before the next begins.
pub async fn run(
    graph: &dyn GraphApi,
    inputs: &ActionInputs,
    settings: &RunSettings,
    outputs: &mut dyn OutputSink,
) -> Result<RunSummary, SyncError> {
    for level in PermissionLevel::ALL {
        if !settings.levels.contains(&level) && !inputs.groups(level).trim().is_empty() {
            warn!(
                "Ignoring {} since the {} permission level is not enabled",
                level.input_name(),
                level
            );
        }
    }

    let mut mappings = parse_group_mappings(
        settings
            .levels
            .iter()
            .map(|level| (*level, inputs.groups(*level))),
    );
    let group_ids = unique_group_ids(&mappings);

    resolve_group_names(graph, &group_ids, &mut mappings).await?;

    let report = MappingReport::build(&settings.levels, &mappings)?;
    report.emit(outputs)?;

    if group_ids.is_empty() {
        info!("No input AD groups detected. Exiting");
        return Ok(RunSummary {
            report,
            added: Vec::new(),
            sync: None,
        });
    }
    info!("Input AD groups detected: \"{}\".", group_ids.join(","));

    let mut current = fetch_current_assignments(
        graph,
        &inputs.enterprise_app_object_id,
        &inputs.app_role_id,
    )
    .await?;
    let outcome = reconcile(
        graph,
        &inputs.enterprise_app_object_id,
        &inputs.app_role_id,
        &group_ids,
        &mut current,
    )
    .await?;

    if !outcome.changed() {
        info!("No changes to app made, not syncing.");
        return Ok(RunSummary {
            report,
            added: outcome.added,
            sync: None,
        });
    }

    info!("Groups added, syncing app.");
    let mut orchestrator =
        SyncOrchestrator::new(graph, &inputs.enterprise_app_object_id, settings.sync);
    let sync = orchestrator.run().await?;
    debug!("Sync job {} finished waiting in state {}", sync.job_id, sync.status);
    info!("Sync complete.");

    Ok(RunSummary {
        report,
        added: outcome.added,
        sync: Some(sync),
    })
}
