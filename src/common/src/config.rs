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
use configparser::ini::Ini;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, error, warn};

use crate::constants::{
    DEFAULT_AUTHORITY_HOST, DEFAULT_CONFIG_PATH, DEFAULT_CONN_TIMEOUT, DEFAULT_DEBUG,
    DEFAULT_GRAPH, DEFAULT_SYNC_INTERVAL, DEFAULT_SYNC_TIMEOUT,
};
use crate::mapping::PermissionLevel;
use crate::sync::SyncSettings;

#[derive(Clone)]
pub struct SyncConfig {
    config: Ini,
    filename: String,
}

fn match_bool(val: Option<String>, default: bool) -> bool {
    match val {
        Some(val) => match val.to_lowercase().as_str() {
            "true" => true,
            "false" => false,
            "1" => true,
            "0" => false,
            _ => {
                error!("Unrecognized response for bool '{}'", val);
                default
            }
        },
        None => default,
    }
}

fn match_u64(option: &str, val: Option<String>, default: u64) -> u64 {
    match val {
        Some(val) => match val.trim().parse::<u64>() {
            Ok(n) => n,
            Err(_) => {
                error!("Failed parsing {} value '{}'", option, val);
                default
            }
        },
        None => default,
    }
}

impl SyncConfig {
    /// Load the configuration. A missing file is not an error; every getter
    /// then returns its default.
    pub fn new(config_path: Option<&str>) -> Result<SyncConfig, String> {
        let mut sconfig = Ini::new();
        let filename = config_path.unwrap_or(DEFAULT_CONFIG_PATH).to_string();
        let cfg_path: PathBuf = PathBuf::from(filename.clone());
        if cfg_path.exists() {
            if let Err(e) = sconfig.load(filename.clone()) {
                return Err(format!(
                    "failed to read config from {} - cannot start up: {} Quitting.",
                    filename, e
                ));
            }
            debug!("Loaded configuration from {}", filename);
        }
        Ok(SyncConfig {
            config: sconfig,
            filename,
        })
    }

    pub fn get(&self, section: &str, option: &str) -> Option<String> {
        self.config.get(section, option)
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn get_debug(&self) -> bool {
        match_bool(self.config.get("global", "debug"), DEFAULT_DEBUG)
    }

    pub fn get_graph_url(&self) -> String {
        match self.config.get("global", "graph_url") {
            Some(val) => val.trim_end_matches('/').to_string(),
            None => DEFAULT_GRAPH.to_string(),
        }
    }

    pub fn get_authority_host(&self) -> String {
        match self.config.get("global", "authority_host") {
            Some(val) => val,
            None => DEFAULT_AUTHORITY_HOST.to_string(),
        }
    }

    pub fn get_connection_timeout(&self) -> u64 {
        match_u64(
            "connection_timeout",
            self.config.get("global", "connection_timeout"),
            DEFAULT_CONN_TIMEOUT,
        )
    }

    pub fn get_sync_timeout(&self) -> u64 {
        match_u64(
            "timeout",
            self.config.get("sync", "timeout"),
            DEFAULT_SYNC_TIMEOUT,
        )
    }

    pub fn get_sync_interval(&self) -> u64 {
        match_u64(
            "interval",
            self.config.get("sync", "interval"),
            DEFAULT_SYNC_INTERVAL,
        )
    }

    pub fn get_sync_settings(&self) -> SyncSettings {
        SyncSettings {
            timeout: Duration::from_secs(self.get_sync_timeout()),
            interval: Duration::from_secs(self.get_sync_interval()),
        }
    }

    /// Enabled permission levels, in canonical order. Unknown names are
    /// ignored; if nothing valid remains every level is enabled.
    pub fn get_permission_levels(&self) -> Vec<PermissionLevel> {
        let val = match self.config.get("mappings", "permission_levels") {
            Some(val) => val,
            None => return PermissionLevel::ALL.to_vec(),
        };
        let mut levels: Vec<PermissionLevel> = Vec::new();
        for name in val.split(',').filter(|n| !n.trim().is_empty()) {
            match name.parse::<PermissionLevel>() {
                Ok(level) => {
                    if !levels.contains(&level) {
                        levels.push(level);
                    }
                }
                Err(e) => warn!("{}", e),
            }
        }
        if levels.is_empty() {
            return PermissionLevel::ALL.to_vec();
        }
        levels.sort();
        levels
    }
}
