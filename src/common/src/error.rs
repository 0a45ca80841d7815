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
use graph::{GraphError, SyncStatusCode};
use std::io;
use thiserror::Error;

/// Every failure aborts the run. Assignments made before the failure are
/// left in place; re-running is safe because additions are idempotent.
#[derive(Debug, Error)]
pub enum SyncError {
    /// A configured group does not exist or could not be read.
    #[error("Failed looking up group \"{group_id}\": {source}")]
    Lookup {
        group_id: String,
        source: GraphError,
    },

    #[error("Failed adding group {group_id} to application: {source}")]
    Assignment {
        group_id: String,
        source: GraphError,
    },

    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error("Service principal {0} has no synchronization job")]
    NoSyncJob(String),

    /// The provisioning service rejected the sync.
    #[error("Sync job in state \"{status}\". Exiting.")]
    Quarantine {
        job_id: String,
        status: SyncStatusCode,
    },

    #[error("Team \"{team}\" maps to group {group_id} which has no resolved name")]
    UnresolvedGroup { team: String, group_id: String },

    #[error("Failed writing output {name}: {source}")]
    Output { name: String, source: io::Error },
}
