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
use crate::client::GraphClient;
use crate::error::GraphError;
use serde::{Deserialize, Serialize};
use urlencoding::encode;

const ASSIGNMENT_SELECT: &str = "principalType,principalId,principalDisplayName,appRoleId";

/// A principal already granted a role on a service principal. Read-only; the
/// directory owns these.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct AppRoleAssignment {
    #[serde(rename = "principalId", default)]
    pub principal_id: String,
    #[serde(rename = "principalType", default)]
    pub principal_type: Option<String>,
    #[serde(rename = "principalDisplayName", default)]
    pub principal_display_name: Option<String>,
    #[serde(rename = "appRoleId", default)]
    pub app_role_id: String,
}

/// Body of an app role assignment request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewAppRoleAssignment {
    /// The group being granted the role.
    #[serde(rename = "principalId")]
    pub principal_id: String,
    /// The service principal the role belongs to.
    #[serde(rename = "resourceId")]
    pub resource_id: String,
    #[serde(rename = "appRoleId")]
    pub app_role_id: String,
}

fn assigned_to_path(service_principal_id: &str) -> String {
    format!(
        "/servicePrincipals/{}/appRoleAssignedTo",
        encode(service_principal_id)
    )
}

impl GraphClient {
    pub async fn request_app_role_assignments(
        &self,
        service_principal_id: &str,
    ) -> Result<Vec<AppRoleAssignment>, GraphError> {
        self.get_all(&assigned_to_path(service_principal_id), ASSIGNMENT_SELECT)
            .await
    }

    pub async fn create_app_role_assignment(
        &self,
        service_principal_id: &str,
        assignment: &NewAppRoleAssignment,
    ) -> Result<AppRoleAssignment, GraphError> {
        self.post(&assigned_to_path(service_principal_id), assignment)
            .await
    }
}
