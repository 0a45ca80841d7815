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
use crate::mapping::GroupMapping;
use graph::GraphApi;
use tracing::info;

/// Look up the display name of every group and attach it to the mappings
/// that reference it. Lookups run one at a time in `group_ids` order; the
/// first missing group fails the whole run before anything is assigned.
pub async fn resolve_group_names(
    graph: &dyn GraphApi,
    group_ids: &[String],
    mappings: &mut [GroupMapping],
) -> Result<(), SyncError> {
    info!("Checking that each input group exists in Entra ID.");
    for group_id in group_ids {
        info!("Getting group name for \"{}\"", group_id);
        let name = graph
            .group_display_name(group_id)
            .await
            .map_err(|source| SyncError::Lookup {
                group_id: group_id.clone(),
                source,
            })?;
        info!(
            "Mapping group id to group name: \"{}\" --> \"{}\"",
            group_id, name
        );
        for mapping in mappings
            .iter_mut()
            .filter(|m| m.idp_group_id == *group_id)
        {
            mapping.idp_group_name = Some(name.clone());
        }
    }
    Ok(())
}
