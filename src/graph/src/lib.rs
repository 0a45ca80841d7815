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

use async_trait::async_trait;

pub mod approle;
pub mod auth;
pub mod client;
pub mod error;
pub mod group;
pub mod synchronization;

pub use approle::{AppRoleAssignment, NewAppRoleAssignment};
pub use client::GraphClient;
pub use error::GraphError;
pub use reqwest::StatusCode;
pub use synchronization::SyncStatusCode;

/// The directory calls the sync core depends on. `GraphClient` talks to
/// Microsoft Graph; tests substitute an in-memory directory.
#[async_trait]
pub trait GraphApi: Send + Sync {
    /// Display name of a group. Fails with `GraphError::NotFound` when the
    /// group does not exist.
    async fn group_display_name(&self, group_id: &str) -> Result<String, GraphError>;

    /// Every app role assignment on the service principal, all roles included.
    async fn app_role_assignments(
        &self,
        service_principal_id: &str,
    ) -> Result<Vec<AppRoleAssignment>, GraphError>;

    async fn assign_app_role(
        &self,
        service_principal_id: &str,
        assignment: &NewAppRoleAssignment,
    ) -> Result<AppRoleAssignment, GraphError>;

    async fn sync_job_ids(&self, service_principal_id: &str) -> Result<Vec<String>, GraphError>;

    async fn sync_job_status(
        &self,
        service_principal_id: &str,
        job_id: &str,
    ) -> Result<SyncStatusCode, GraphError>;

    /// Ask the provisioning service to run the job. Returns once the request
    /// is accepted, not when the job finishes.
    async fn start_sync_job(&self, service_principal_id: &str, job_id: &str)
        -> Result<(), GraphError>;
}
