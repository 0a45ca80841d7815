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
use clap::Parser;

#[derive(Debug, Parser)]
#[clap(about = "Assign IdP groups to an Entra ID enterprise application and sync it")]
pub struct EntraAppSyncParser {
    #[clap(short, long)]
    pub debug: bool,
    /// Path to the configuration file.
    #[clap(short, long)]
    pub config: Option<String>,
    /// Comma separated `team[:groupId]` entries granted admin.
    #[clap(long = "admin-groups", env = "INPUT_ADMIN_GROUPS", default_value = "")]
    pub admin_groups: String,
    #[clap(long = "maintain-groups", env = "INPUT_MAINTAIN_GROUPS", default_value = "")]
    pub maintain_groups: String,
    #[clap(long = "write-groups", env = "INPUT_WRITE_GROUPS", default_value = "")]
    pub write_groups: String,
    #[clap(long = "triage-groups", env = "INPUT_TRIAGE_GROUPS", default_value = "")]
    pub triage_groups: String,
    #[clap(long = "read-groups", env = "INPUT_READ_GROUPS", default_value = "")]
    pub read_groups: String,
    /// Object id of the enterprise application's service principal.
    #[clap(long = "enterprise-app-object-id", env = "INPUT_ENTERPRISE_APP_OBJECT_ID")]
    pub enterprise_app_object_id: String,
    /// App role granted to each group.
    #[clap(long = "app-role-id", env = "INPUT_APP_ROLE_ID")]
    pub app_role_id: String,
    /// Seconds to wait for the sync job before checking its status.
    #[clap(long = "sync-timeout")]
    pub sync_timeout: Option<u64>,
    #[clap(long = "sync-interval")]
    pub sync_interval: Option<u64>,
}
