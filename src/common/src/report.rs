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
use crate::actions::OutputSink;
use crate::error::SyncError;
use crate::mapping::{GroupMapping, PermissionLevel};
use std::collections::BTreeMap;
use tracing::info;

/// The `team[:groupName]` strings reported for each permission level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingReport {
    levels: BTreeMap<PermissionLevel, Vec<String>>,
}

impl MappingReport {
    /// Build the report for `levels`. Every level gets an entry, even if
    /// nothing maps to it. Mappings for other levels are left out.
    pub fn build(
        levels: &[PermissionLevel],
        mappings: &[GroupMapping],
    ) -> Result<MappingReport, SyncError> {
        let mut report: BTreeMap<PermissionLevel, Vec<String>> =
            levels.iter().map(|level| (*level, Vec::new())).collect();
        for mapping in mappings {
            if mapping.has_group() && mapping.idp_group_name.is_none() {
                return Err(SyncError::UnresolvedGroup {
                    team: mapping.team_name.clone(),
                    group_id: mapping.idp_group_id.clone(),
                });
            }
            if let Some(values) = report.get_mut(&mapping.permission) {
                values.push(mapping.formatted());
            }
        }
        Ok(MappingReport { levels: report })
    }

    pub fn entries(&self, level: PermissionLevel) -> Option<&[String]> {
        self.levels.get(&level).map(|v| v.as_slice())
    }

    /// `(output name, comma joined value)` pairs in level order.
    pub fn outputs(&self) -> Vec<(String, String)> {
        self.levels
            .iter()
            .map(|(level, values)| (level.output_name(), values.join(",")))
            .collect()
    }

    pub fn emit(&self, sink: &mut dyn OutputSink) -> Result<(), SyncError> {
        info!("Outputting teams with idp group names");
        for (name, value) in self.outputs() {
            sink.set_output(&name, &value)
                .map_err(|source| SyncError::Output {
                    name: name.clone(),
                    source,
                })?;
        }
        Ok(())
    }
}
