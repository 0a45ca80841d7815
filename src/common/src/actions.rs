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
use crate::mapping::PermissionLevel;
use std::collections::BTreeMap;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::PathBuf;
use tracing::debug;
use uuid::Uuid;

pub const ENV_GITHUB_OUTPUT: &str = "GITHUB_OUTPUT";
pub const ENV_RUNNER_DEBUG: &str = "RUNNER_DEBUG";

/// The values handed to this step by the workflow.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionInputs {
    groups: BTreeMap<PermissionLevel, String>,
    /// Object id of the enterprise application's service principal.
    pub enterprise_app_object_id: String,
    /// The app role granted to every group.
    pub app_role_id: String,
}

impl ActionInputs {
    pub fn new(enterprise_app_object_id: &str, app_role_id: &str) -> ActionInputs {
        ActionInputs {
            groups: BTreeMap::new(),
            enterprise_app_object_id: enterprise_app_object_id.to_string(),
            app_role_id: app_role_id.to_string(),
        }
    }

    pub fn with_groups(mut self, level: PermissionLevel, raw: &str) -> ActionInputs {
        self.set_groups(level, raw);
        self
    }

    pub fn set_groups(&mut self, level: PermissionLevel, raw: &str) {
        self.groups.insert(level, raw.to_string());
    }

    /// The raw `team[:group],...` string for a level, empty if unset.
    pub fn groups(&self, level: PermissionLevel) -> &str {
        self.groups.get(&level).map(|s| s.as_str()).unwrap_or("")
    }
}

/// Destination for step outputs.
pub trait OutputSink {
    fn set_output(&mut self, name: &str, value: &str) -> io::Result<()>;
}

impl OutputSink for BTreeMap<String, String> {
    fn set_output(&mut self, name: &str, value: &str) -> io::Result<()> {
        self.insert(name.to_string(), value.to_string());
        Ok(())
    }
}

/// Writes outputs to the runner's `GITHUB_OUTPUT` file, or as workflow
/// commands on stdout when running outside a runner.
pub struct GithubOutput {
    path: Option<PathBuf>,
}

impl GithubOutput {
    pub fn new(path: Option<PathBuf>) -> GithubOutput {
        GithubOutput { path }
    }

    pub fn from_env() -> GithubOutput {
        GithubOutput::new(
            std::env::var_os(ENV_GITHUB_OUTPUT)
                .filter(|p| !p.is_empty())
                .map(PathBuf::from),
        )
    }
}

/// Heredoc style record, safe for values containing newlines.
fn file_command(name: &str, value: &str, delimiter: &str) -> String {
    format!("{}<<{}\n{}\n{}\n", name, delimiter, value, delimiter)
}

impl OutputSink for GithubOutput {
    fn set_output(&mut self, name: &str, value: &str) -> io::Result<()> {
        debug!("Outputting: \"{}={}\"", name, value);
        match &self.path {
            Some(path) => {
                let delimiter = format!("ghadelimiter_{}", Uuid::new_v4());
                if name.contains(&delimiter) || value.contains(&delimiter) {
                    return Err(io::Error::new(
                        io::ErrorKind::InvalidInput,
                        "output contains the file command delimiter",
                    ));
                }
                let mut file = OpenOptions::new().append(true).create(true).open(path)?;
                file.write_all(file_command(name, value, &delimiter).as_bytes())
            }
            None => {
                println!(
                    "::set-output name={}::{}",
                    escape_property(name),
                    escape_data(value)
                );
                Ok(())
            }
        }
    }
}

fn escape_data(value: &str) -> String {
    value
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

fn escape_property(value: &str) -> String {
    escape_data(value).replace(':', "%3A").replace(',', "%2C")
}

/// Mark the step as failed in the workflow log. The caller still has to
/// exit with a failure code.
pub fn set_failed(message: &str) {
    println!("::error::{}", escape_data(message));
}

/// Whether the runner was started with step debug logging.
pub fn runner_debug() -> bool {
    std::env::var(ENV_RUNNER_DEBUG)
        .map(|v| v == "1")
        .unwrap_or(false)
}
