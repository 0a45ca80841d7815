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
use crate::constants::{INPUT_SUFFIX, OUTPUT_SUFFIX};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Repository permission a team is granted downstream.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PermissionLevel {
    Admin,
    Maintain,
    Write,
    Triage,
    Read,
}

impl PermissionLevel {
    pub const ALL: [PermissionLevel; 5] = [
        PermissionLevel::Admin,
        PermissionLevel::Maintain,
        PermissionLevel::Write,
        PermissionLevel::Triage,
        PermissionLevel::Read,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PermissionLevel::Admin => "admin",
            PermissionLevel::Maintain => "maintain",
            PermissionLevel::Write => "write",
            PermissionLevel::Triage => "triage",
            PermissionLevel::Read => "read",
        }
    }

    /// Name of the input carrying this level's group list, e.g. `admin_groups`.
    pub fn input_name(self) -> String {
        format!("{}{}", self.as_str(), INPUT_SUFFIX)
    }

    /// Name of the output reporting this level, e.g. `admin_idp_mappings`.
    pub fn output_name(self) -> String {
        format!("{}{}", self.as_str(), OUTPUT_SUFFIX)
    }
}

impl fmt::Display for PermissionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PermissionLevel {
    type Err = String;

    // "pull" and "push" are the REST API names for read and write.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "admin" => Ok(PermissionLevel::Admin),
            "maintain" => Ok(PermissionLevel::Maintain),
            "write" | "push" => Ok(PermissionLevel::Write),
            "triage" => Ok(PermissionLevel::Triage),
            "read" | "pull" => Ok(PermissionLevel::Read),
            other => Err(format!("Unknown permission level '{}'", other)),
        }
    }
}

/// One `team[:group]` entry from a permission level's input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupMapping {
    pub permission: PermissionLevel,
    pub team_name: String,
    /// Empty when the entry named no group.
    pub idp_group_id: String,
    /// Filled in once the group has been looked up in the directory.
    pub idp_group_name: Option<String>,
}

impl GroupMapping {
    pub fn new(permission: PermissionLevel, team_name: &str, idp_group_id: &str) -> GroupMapping {
        GroupMapping {
            permission,
            team_name: team_name.to_string(),
            idp_group_id: idp_group_id.to_string(),
            idp_group_name: None,
        }
    }

    pub fn has_group(&self) -> bool {
        !self.idp_group_id.is_empty()
    }

    /// `team:groupName` when a name was resolved, otherwise just `team`.
    pub fn formatted(&self) -> String {
        match &self.idp_group_name {
            Some(name) if !name.is_empty() => format!("{}:{}", self.team_name, name),
            _ => self.team_name.clone(),
        }
    }
}

/// Parse a single level's comma separated `team[:group]` list.
///
/// The group is whatever follows the last colon, so team names may contain
/// colons themselves. An entry without a colon maps the team to no group.
/// An empty input yields nothing, but every piece of a non-empty input yields
/// a mapping, even a blank one.
pub fn parse_level(permission: PermissionLevel, raw: &str) -> Vec<GroupMapping> {
    let mut mappings = Vec::new();
    if raw.trim().is_empty() {
        return mappings;
    }
    for entry in raw.split(',') {
        let entry = entry.trim();
        debug!("Processing group map: {}", entry);
        let mut components: Vec<&str> = entry.split(':').collect();
        let idp_group = if components.len() > 1 {
            components.pop().unwrap_or_default()
        } else {
            ""
        };
        mappings.push(GroupMapping::new(
            permission,
            components.join(":").trim(),
            idp_group.trim(),
        ));
    }
    mappings
}

/// Parse every level's input, preserving level order then entry order.
pub fn parse_group_mappings<'a, I>(groups: I) -> Vec<GroupMapping>
where
    I: IntoIterator<Item = (PermissionLevel, &'a str)>,
{
    let mut mappings = Vec::new();
    for (permission, raw) in groups {
        debug!("Parsing group {} ({})", permission, raw);
        mappings.extend(parse_level(permission, raw));
    }
    mappings
}

/// Distinct non-empty group ids in first-seen order.
pub fn unique_group_ids(mappings: &[GroupMapping]) -> Vec<String> {
    let mut seen = HashSet::new();
    mappings
        .iter()
        .filter(|m| m.has_group())
        .filter(|m| seen.insert(m.idp_group_id.as_str()))
        .map(|m| m.idp_group_id.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_level_mixed_entries() {
        let mappings = parse_level(PermissionLevel::Admin, "team1:grp1,team2,team3:grp3");
        assert_eq!(
            mappings,
            vec![
                GroupMapping::new(PermissionLevel::Admin, "team1", "grp1"),
                GroupMapping::new(PermissionLevel::Admin, "team2", ""),
                GroupMapping::new(PermissionLevel::Admin, "team3", "grp3"),
            ]
        );
    }

    #[test]
    fn test_parse_level_colon_in_team() {
        let mappings = parse_level(PermissionLevel::Write, "org:team:grp");
        assert_eq!(mappings[0].team_name, "org:team");
        assert_eq!(mappings[0].idp_group_id, "grp");

        let mappings = parse_level(PermissionLevel::Write, "team:");
        assert_eq!(mappings[0].team_name, "team");
        assert!(!mappings[0].has_group());
    }

    #[test]
    fn test_parse_level_keeps_blank_entries() {
        assert!(parse_level(PermissionLevel::Read, "").is_empty());
        assert!(parse_level(PermissionLevel::Read, " \n").is_empty());

        let mappings = parse_level(PermissionLevel::Admin, "teamA:g1,,teamB");
        let teams: Vec<&str> = mappings.iter().map(|m| m.team_name.as_str()).collect();
        assert_eq!(teams, vec!["teamA", "", "teamB"]);
        assert!(!mappings[1].has_group());

        let mappings = parse_level(PermissionLevel::Admin, "teamA,");
        assert_eq!(mappings.len(), 2);
        assert_eq!(mappings[1], GroupMapping::new(PermissionLevel::Admin, "", ""));
        assert_eq!(parse_level(PermissionLevel::Read, " , ,").len(), 3);
    }

    #[test]
    fn test_parse_level_trims_whitespace() {
        let mappings = parse_level(PermissionLevel::Read, " teamA:g1 ,\n teamB ");
        assert_eq!(mappings.len(), 2);
        assert_eq!(mappings[0].team_name, "teamA");
        assert_eq!(mappings[0].idp_group_id, "g1");
        assert_eq!(mappings[1].team_name, "teamB");
    }

    #[test]
    fn test_parse_group_mappings_order() {
        let mappings = parse_group_mappings(vec![
            (PermissionLevel::Admin, "a:g1"),
            (PermissionLevel::Maintain, ""),
            (PermissionLevel::Read, "r1:g2,r2:g1"),
        ]);
        let levels: Vec<PermissionLevel> = mappings.iter().map(|m| m.permission).collect();
        assert_eq!(
            levels,
            vec![
                PermissionLevel::Admin,
                PermissionLevel::Read,
                PermissionLevel::Read
            ]
        );
    }

    #[test]
    fn test_unique_group_ids() {
        let mappings = parse_group_mappings(vec![
            (PermissionLevel::Admin, "a:g2,b,c:g1"),
            (PermissionLevel::Write, "d:g2,e:g3,f:g1"),
        ]);
        assert_eq!(unique_group_ids(&mappings), vec!["g2", "g1", "g3"]);
        assert!(unique_group_ids(&parse_level(PermissionLevel::Admin, "a,b")).is_empty());
    }

    #[test]
    fn test_unique_group_ids_across_all_levels() {
        let mappings = parse_group_mappings(vec![
            (PermissionLevel::Admin, "a:shared,a2:,a3:g1"),
            (PermissionLevel::Maintain, "m:shared,,m2"),
            (PermissionLevel::Write, "w:, w2:shared"),
            (PermissionLevel::Triage, "t:g2,t2:shared"),
            (PermissionLevel::Read, "r:shared,r2:g1,r3:"),
        ]);
        let ids = unique_group_ids(&mappings);
        assert_eq!(ids, vec!["shared", "g1", "g2"]);
        assert!(ids.iter().all(|id| !id.is_empty()));
        for mapping in mappings.iter().filter(|m| m.has_group()) {
            assert_eq!(
                ids.iter().filter(|id| **id == mapping.idp_group_id).count(),
                1
            );
        }
    }

    #[test]
    fn test_formatted() {
        let mut mapping = GroupMapping::new(PermissionLevel::Admin, "teamA", "g1");
        assert_eq!(mapping.formatted(), "teamA");
        mapping.idp_group_name = Some("Engineering".to_string());
        assert_eq!(mapping.formatted(), "teamA:Engineering");
    }

    #[test]
    fn test_permission_level_names() {
        assert_eq!(PermissionLevel::Triage.output_name(), "triage_idp_mappings");
        assert_eq!(PermissionLevel::Maintain.input_name(), "maintain_groups");
        assert_eq!("PUSH".parse::<PermissionLevel>(), Ok(PermissionLevel::Write));
        assert_eq!("pull".parse::<PermissionLevel>(), Ok(PermissionLevel::Read));
        assert!("owner".parse::<PermissionLevel>().is_err());
    }
}
