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
use crate::error::SyncError;
use graph::{AppRoleAssignment, GraphApi, NewAppRoleAssignment};
use tracing::{debug, info};

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReconcileOutcome {
    /// Groups assigned to the application during this pass, in request order.
    pub added: Vec<String>,
}

impl ReconcileOutcome {
    /// Whether the application changed, and therefore needs a sync.
    pub fn changed(&self) -> bool {
        !self.added.is_empty()
    }
}

/// Groups that currently hold `app_role_id` on the service principal.
/// Assignments of other roles are dropped.
pub async fn fetch_current_assignments(
    graph: &dyn GraphApi,
    service_principal_id: &str,
    app_role_id: &str,
) -> Result<Vec<AppRoleAssignment>, SyncError> {
    info!("Getting groups assigned to application.");
    let assignments: Vec<AppRoleAssignment> = graph
        .app_role_assignments(service_principal_id)
        .await?
        .into_iter()
        .filter(|a| a.app_role_id == app_role_id)
        .collect();
    debug!("AppGroups: {:?}", assignments);
    Ok(assignments)
}

fn is_assigned(current: &[AppRoleAssignment], group_id: &str) -> bool {
    current.iter().any(|a| a.principal_id == group_id)
}

/// Assign every desired group that does not already hold the role. Existing
/// assignments are never modified or removed. Each assignment made is
/// appended to `current`, so a second pass over the same snapshot writes
/// nothing.
///
/// A failed assignment aborts the pass; earlier assignments stay in place.
pub async fn reconcile(
    graph: &dyn GraphApi,
    service_principal_id: &str,
    app_role_id: &str,
    desired: &[String],
    current: &mut Vec<AppRoleAssignment>,
) -> Result<ReconcileOutcome, SyncError> {
    info!("Checking if any input groups needs to be added to application.");
    let mut outcome = ReconcileOutcome::default();
    for group_id in desired {
        if is_assigned(current, group_id) {
            debug!("Group {} is already assigned", group_id);
            continue;
        }
        info!("\tAdding group {} to application.", group_id);
        let request = NewAppRoleAssignment {
            principal_id: group_id.clone(),
            resource_id: service_principal_id.to_string(),
            app_role_id: app_role_id.to_string(),
        };
        let created = graph
            .assign_app_role(service_principal_id, &request)
            .await
            .map_err(|source| SyncError::Assignment {
                group_id: group_id.clone(),
                source,
            })?;
        current.push(AppRoleAssignment {
            principal_id: group_id.clone(),
            principal_type: created.principal_type,
            principal_display_name: created.principal_display_name,
            app_role_id: app_role_id.to_string(),
        });
        outcome.added.push(group_id.clone());
    }
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Call, FakeDirectory};

    const SP: &str = "sp";
    const ROLE: &str = "user-role";

    fn ids(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|i| i.to_string()).collect()
    }

    fn writes(graph: &FakeDirectory) -> usize {
        graph.count(|c| matches!(c, Call::Assign(_)))
    }

    #[tokio::test]
    async fn test_fetch_filters_other_roles() {
        let graph = FakeDirectory::new()
            .with_assignment("g1", ROLE)
            .with_assignment("g2", "admin-role")
            .with_assignment("g3", ROLE);
        let current = fetch_current_assignments(&graph, SP, ROLE).await.unwrap();
        let principals: Vec<&str> = current.iter().map(|a| a.principal_id.as_str()).collect();
        assert_eq!(principals, vec!["g1", "g3"]);
    }

    #[tokio::test]
    async fn test_all_present_is_no_change() {
        let graph = FakeDirectory::new()
            .with_assignment("g1", ROLE)
            .with_assignment("g2", ROLE);
        let mut current = fetch_current_assignments(&graph, SP, ROLE).await.unwrap();

        let outcome = reconcile(&graph, SP, ROLE, &ids(&["g1", "g2"]), &mut current)
            .await
            .unwrap();
        assert!(!outcome.changed());
        assert_eq!(writes(&graph), 0);
    }

    #[tokio::test]
    async fn test_one_missing_of_three() {
        let graph = FakeDirectory::new()
            .with_assignment("g1", ROLE)
            .with_assignment("g3", ROLE);
        let mut current = fetch_current_assignments(&graph, SP, ROLE).await.unwrap();

        let outcome = reconcile(&graph, SP, ROLE, &ids(&["g1", "g2", "g3"]), &mut current)
            .await
            .unwrap();
        assert!(outcome.changed());
        assert_eq!(outcome.added, ids(&["g2"]));
        assert_eq!(writes(&graph), 1);
        assert!(graph.calls().contains(&Call::Assign("g2".to_string())));
    }

    #[tokio::test]
    async fn test_role_held_for_other_app_role_still_added() {
        let graph = FakeDirectory::new().with_assignment("g1", "admin-role");
        let mut current = fetch_current_assignments(&graph, SP, ROLE).await.unwrap();

        let outcome = reconcile(&graph, SP, ROLE, &ids(&["g1"]), &mut current)
            .await
            .unwrap();
        assert_eq!(outcome.added, ids(&["g1"]));
    }

    #[tokio::test]
    async fn test_second_pass_is_idempotent() {
        let graph = FakeDirectory::new();
        let desired = ids(&["g1", "g2"]);
        let mut current = fetch_current_assignments(&graph, SP, ROLE).await.unwrap();

        let first = reconcile(&graph, SP, ROLE, &desired, &mut current)
            .await
            .unwrap();
        assert!(first.changed());
        assert_eq!(writes(&graph), 2);

        let second = reconcile(&graph, SP, ROLE, &desired, &mut current)
            .await
            .unwrap();
        assert!(!second.changed());
        assert_eq!(writes(&graph), 2);

        // A fresh snapshot agrees.
        let mut refreshed = fetch_current_assignments(&graph, SP, ROLE).await.unwrap();
        let third = reconcile(&graph, SP, ROLE, &desired, &mut refreshed)
            .await
            .unwrap();
        assert!(!third.changed());
    }

    #[tokio::test]
    async fn test_failed_assignment_aborts() {
        let graph = FakeDirectory::new().rejecting("g2");
        let mut current = Vec::new();

        let err = reconcile(&graph, SP, ROLE, &ids(&["g1", "g2", "g3"]), &mut current)
            .await
            .unwrap_err();
        assert!(matches!(err, SyncError::Assignment { group_id, .. } if group_id == "g2"));
        // g1 stays assigned, g3 is never attempted.
        assert_eq!(current.len(), 1);
        assert_eq!(writes(&graph), 2);
    }
}
