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
use crate::client::{GraphClient, ODataPage};
use crate::error::GraphError;
use serde::Deserialize;
use std::fmt;
use urlencoding::encode;

/// Status code of a provisioning job. The service owns this enumeration and
/// may add to it, so unknown codes are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum SyncStatusCode {
    NotConfigured,
    NotRun,
    /// Scheduled to run periodically. This does not mean a cycle finished.
    Active,
    Paused,
    /// The provisioning service rejected further processing.
    Quarantine,
    Other(String),
}

impl From<String> for SyncStatusCode {
    fn from(code: String) -> Self {
        match code.as_str() {
            "NotConfigured" => SyncStatusCode::NotConfigured,
            "NotRun" => SyncStatusCode::NotRun,
            "Active" => SyncStatusCode::Active,
            "Paused" => SyncStatusCode::Paused,
            "Quarantine" => SyncStatusCode::Quarantine,
            _ => SyncStatusCode::Other(code),
        }
    }
}

impl From<&str> for SyncStatusCode {
    fn from(code: &str) -> Self {
        SyncStatusCode::from(code.to_string())
    }
}

impl fmt::Display for SyncStatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncStatusCode::NotConfigured => f.write_str("NotConfigured"),
            SyncStatusCode::NotRun => f.write_str("NotRun"),
            SyncStatusCode::Active => f.write_str("Active"),
            SyncStatusCode::Paused => f.write_str("Paused"),
            SyncStatusCode::Quarantine => f.write_str("Quarantine"),
            SyncStatusCode::Other(code) => f.write_str(code),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SyncJobStatus {
    pub code: SyncStatusCode,
}

#[derive(Debug, Deserialize)]
struct SyncJobRef {
    id: String,
}

#[derive(Debug, Deserialize)]
struct SyncJobStatusResp {
    status: SyncJobStatus,
}

fn jobs_path(service_principal_id: &str) -> String {
    format!(
        "/servicePrincipals/{}/synchronization/jobs/",
        encode(service_principal_id)
    )
}

impl GraphClient {
    pub async fn request_sync_job_ids(
        &self,
        service_principal_id: &str,
    ) -> Result<Vec<String>, GraphError> {
        let page: ODataPage<SyncJobRef> = self.get(&jobs_path(service_principal_id), "id").await?;
        Ok(page.value.into_iter().map(|job| job.id).collect())
    }

    pub async fn request_sync_job_status(
        &self,
        service_principal_id: &str,
        job_id: &str,
    ) -> Result<SyncJobStatus, GraphError> {
        let path = format!("{}{}/", jobs_path(service_principal_id), encode(job_id));
        let resp: SyncJobStatusResp = self.get(&path, "status").await?;
        Ok(resp.status)
    }

    pub async fn request_start_sync_job(
        &self,
        service_principal_id: &str,
        job_id: &str,
    ) -> Result<(), GraphError> {
        let path = format!(
            "{}{}/start",
            jobs_path(service_principal_id),
            encode(job_id)
        );
        self.post_empty(&path).await
    }
}
