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
//! In-memory directory used by the unit tests.
#![allow(clippy::unwrap_used)]

use async_trait::async_trait;
use graph::{
    AppRoleAssignment, GraphApi, GraphError, NewAppRoleAssignment, StatusCode, SyncStatusCode,
};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

#[allow(dead_code)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Call {
    GroupName(String),
    ListAssignments(String),
    Assign(String),
    ListJobs(String),
    Start(String),
    Status(String),
}

pub(crate) struct FakeDirectory {
    groups: HashMap<String, String>,
    assignments: Mutex<Vec<AppRoleAssignment>>,
    jobs: Vec<String>,
    status: SyncStatusCode,
    rejected: HashSet<String>,
    calls: Mutex<Vec<Call>>,
}

impl FakeDirectory {
    pub(crate) fn new() -> FakeDirectory {
        FakeDirectory {
            groups: HashMap::new(),
            assignments: Mutex::new(Vec::new()),
            jobs: vec!["job1".to_string()],
            status: SyncStatusCode::Active,
            rejected: HashSet::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn with_group(mut self, id: &str, name: &str) -> FakeDirectory {
        self.groups.insert(id.to_string(), name.to_string());
        self
    }

    pub(crate) fn with_assignment(self, principal_id: &str, app_role_id: &str) -> FakeDirectory {
        self.assignments.lock().unwrap().push(AppRoleAssignment {
            principal_id: principal_id.to_string(),
            principal_type: Some("Group".to_string()),
            principal_display_name: self.groups.get(principal_id).cloned(),
            app_role_id: app_role_id.to_string(),
        });
        self
    }

    pub(crate) fn with_jobs(mut self, jobs: &[&str]) -> FakeDirectory {
        self.jobs = jobs.iter().map(|j| j.to_string()).collect();
        self
    }

    pub(crate) fn with_status(mut self, status: &str) -> FakeDirectory {
        self.status = SyncStatusCode::from(status);
        self
    }

    /// Assignment requests for this group fail.
    pub(crate) fn rejecting(mut self, group_id: &str) -> FakeDirectory {
        self.rejected.insert(group_id.to_string());
        self
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls.lock().unwrap().iter().filter(|&c| pred(c)).count()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl GraphApi for FakeDirectory {
    async fn group_display_name(&self, group_id: &str) -> Result<String, GraphError> {
        self.record(Call::GroupName(group_id.to_string()));
        self.groups
            .get(group_id)
            .cloned()
            .ok_or_else(|| GraphError::NotFound {
                path: format!("/groups/{}", group_id),
            })
    }

    async fn app_role_assignments(
        &self,
        service_principal_id: &str,
    ) -> Result<Vec<AppRoleAssignment>, GraphError> {
        self.record(Call::ListAssignments(service_principal_id.to_string()));
        Ok(self.assignments.lock().unwrap().clone())
    }

    async fn assign_app_role(
        &self,
        service_principal_id: &str,
        assignment: &NewAppRoleAssignment,
    ) -> Result<AppRoleAssignment, GraphError> {
        self.record(Call::Assign(assignment.principal_id.clone()));
        if self.rejected.contains(&assignment.principal_id) {
            return Err(GraphError::Api {
                path: format!("/servicePrincipals/{}/appRoleAssignedTo", service_principal_id),
                status: StatusCode::FORBIDDEN,
                code: "Authorization_RequestDenied".to_string(),
                message: "Insufficient privileges to complete the operation.".to_string(),
            });
        }
        let created = AppRoleAssignment {
            principal_id: assignment.principal_id.clone(),
            principal_type: Some("Group".to_string()),
            principal_display_name: self.groups.get(&assignment.principal_id).cloned(),
            app_role_id: assignment.app_role_id.clone(),
        };
        self.assignments.lock().unwrap().push(created.clone());
        Ok(created)
    }

    async fn sync_job_ids(&self, service_principal_id: &str) -> Result<Vec<String>, GraphError> {
        self.record(Call::ListJobs(service_principal_id.to_string()));
        Ok(self.jobs.clone())
    }

    async fn sync_job_status(
        &self,
        _service_principal_id: &str,
        job_id: &str,
    ) -> Result<SyncStatusCode, GraphError> {
        self.record(Call::Status(job_id.to_string()));
        Ok(self.status.clone())
    }

    async fn start_sync_job(
        &self,
        _service_principal_id: &str,
        job_id: &str,
    ) -> Result<(), GraphError> {
        self.record(Call::Start(job_id.to_string()));
        Ok(())
    }
}
