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
use crate::error::GraphError;
use reqwest::Client;
use serde::Deserialize;
use std::fmt;
use std::time::Duration;
use tokio::process::Command;
use tracing::debug;

pub const ENV_ACCESS_TOKEN: &str = "GRAPH_ACCESS_TOKEN";
pub const ENV_TENANT_ID: &str = "AZURE_TENANT_ID";
pub const ENV_CLIENT_ID: &str = "AZURE_CLIENT_ID";
pub const ENV_CLIENT_SECRET: &str = "AZURE_CLIENT_SECRET";

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Where the Graph bearer token comes from.
pub enum TokenSource {
    /// A token issued by an earlier pipeline step.
    Static(String),
    /// OAuth2 client credentials grant.
    ClientSecret {
        tenant_id: String,
        client_id: String,
        client_secret: String,
    },
    /// The session left behind by `az login`.
    AzureCli,
}

impl fmt::Debug for TokenSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenSource::Static(_) => f.write_str("Static { .. }"),
            TokenSource::ClientSecret {
                tenant_id,
                client_id,
                ..
            } => write!(
                f,
                "ClientSecret {{ tenant_id: {}, client_id: {}, .. }}",
                tenant_id, client_id
            ),
            TokenSource::AzureCli => f.write_str("AzureCli"),
        }
    }
}

fn non_empty(val: Option<String>) -> Option<String> {
    val.filter(|v| !v.trim().is_empty())
}

impl TokenSource {
    /// Pick a token source from the environment. A pre-issued token wins, then
    /// a complete set of client credentials, then the Azure CLI.
    pub fn from_lookup<F>(lookup: F) -> TokenSource
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(token) = non_empty(lookup(ENV_ACCESS_TOKEN)) {
            return TokenSource::Static(token);
        }
        match (
            non_empty(lookup(ENV_TENANT_ID)),
            non_empty(lookup(ENV_CLIENT_ID)),
            non_empty(lookup(ENV_CLIENT_SECRET)),
        ) {
            (Some(tenant_id), Some(client_id), Some(client_secret)) => TokenSource::ClientSecret {
                tenant_id,
                client_id,
                client_secret,
            },
            _ => TokenSource::AzureCli,
        }
    }

    pub fn from_env() -> TokenSource {
        TokenSource::from_lookup(|key| std::env::var(key).ok())
    }

    pub async fn acquire_token(
        &self,
        authority_host: &str,
        graph_url: &str,
        timeout: Duration,
    ) -> Result<String, GraphError> {
        let scope = format!("{}/.default", graph_url.trim_end_matches('/'));
        match self {
            TokenSource::Static(token) => {
                debug!("Using access token from {}", ENV_ACCESS_TOKEN);
                Ok(token.clone())
            }
            TokenSource::ClientSecret {
                tenant_id,
                client_id,
                client_secret,
            } => {
                let authority = if authority_host.starts_with("http") {
                    authority_host.trim_end_matches('/').to_string()
                } else {
                    format!("https://{}", authority_host)
                };
                let url = format!("{}/{}/oauth2/v2.0/token", authority, tenant_id);
                debug!("Requesting client credentials token from {}", url);
                let client = Client::builder().timeout(timeout).build()?;
                let params = [
                    ("grant_type", "client_credentials"),
                    ("client_id", client_id.as_str()),
                    ("client_secret", client_secret.as_str()),
                    ("scope", scope.as_str()),
                ];
                let resp = client.post(url).form(&params).send().await?;
                if resp.status().is_success() {
                    let json_resp: TokenResponse = resp.json().await?;
                    Ok(json_resp.access_token)
                } else {
                    let status = resp.status();
                    let body = resp.text().await.unwrap_or_default();
                    Err(GraphError::Auth(format!(
                        "token request failed with {}: {}",
                        status, body
                    )))
                }
            }
            TokenSource::AzureCli => {
                debug!("Requesting access token from the Azure CLI");
                let output = Command::new("az")
                    .args([
                        "account",
                        "get-access-token",
                        "--resource",
                        graph_url.trim_end_matches('/'),
                        "--query",
                        "accessToken",
                        "--output",
                        "tsv",
                    ])
                    .output()
                    .await
                    .map_err(|e| GraphError::Auth(format!("failed to run az: {}", e)))?;
                if !output.status.success() {
                    return Err(GraphError::Auth(format!(
                        "az account get-access-token failed: {}",
                        String::from_utf8_lossy(&output.stderr).trim()
                    )));
                }
                let token = String::from_utf8_lossy(&output.stdout).trim().to_string();
                if token.is_empty() {
                    return Err(GraphError::Auth(
                        "az account get-access-token returned no token".to_string(),
                    ));
                }
                Ok(token)
            }
        }
    }
}
