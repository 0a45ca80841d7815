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
pub const DEFAULT_CONFIG_PATH: &str = "/etc/entra-app-sync/entra-app-sync.conf";
pub const DEFAULT_GRAPH: &str = "https://graph.microsoft.com";
pub const DEFAULT_AUTHORITY_HOST: &str = "login.microsoftonline.com";
pub const DEFAULT_CONN_TIMEOUT: u64 = 30;
pub const DEFAULT_DEBUG: bool = false;
// Provisioning jobs report "Active" while scheduled, so the wait is blind.
pub const DEFAULT_SYNC_TIMEOUT: u64 = 60;
pub const DEFAULT_SYNC_INTERVAL: u64 = 5;
pub const OUTPUT_SUFFIX: &str = "_idp_mappings";
pub const INPUT_SUFFIX: &str = "_groups";
