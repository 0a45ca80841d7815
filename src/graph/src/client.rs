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
use crate::approle::{AppRoleAssignment, NewAppRoleAssignment};
use crate::error::GraphError;
use crate::synchronization::SyncStatusCode;
use crate::GraphApi;
use async_trait::async_trait;
use reqwest::{header, Client, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::to_string_pretty;
use std::time::Duration;
use tracing::debug;

/// A single page of a Graph collection.
#[derive(Debug, Deserialize)]
pub(crate) struct ODataPage<T> {
    pub(crate) value: Vec<T>,
    #[serde(rename = "@odata.nextLink")]
    pub(crate) next_link: Option<String>,
}

/// Whether `link` points at the same scheme, host and port as `base`.
fn same_origin(base: &str, link: &str) -> bool {
    match (Url::parse(base), Url::parse(link)) {
        (Ok(base), Ok(link)) => {
            base.scheme() == link.scheme()
                && base.host_str() == link.host_str()
                && base.port_or_known_default() == link.port_or_known_default()
        }
        _ => false,
    }
}

/// Authenticated Microsoft Graph client. Requests are issued one at a time
/// and are never retried.
pub struct GraphClient {
    client: Client,
    graph_url: String,
    access_token: String,
}

impl GraphClient {
    pub fn new(
        graph_url: &str,
        access_token: &str,
        timeout: Duration,
    ) -> Result<GraphClient, GraphError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(GraphClient {
            client,
            graph_url: graph_url.trim_end_matches('/').to_string(),
            access_token: access_token.to_string(),
        })
    }

    pub fn graph_url(&self) -> &str {
        &self.graph_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/v1.0{}", self.graph_url, path)
    }

    fn authorize(&self, req: RequestBuilder) -> RequestBuilder {
        req.header(header::AUTHORIZATION, format!("Bearer {}", self.access_token))
            .header(header::ACCEPT, "application/json")
    }

    async fn send<T: DeserializeOwned>(&self, path: &str, req: RequestBuilder) -> Result<T, GraphError> {
        let resp = self.authorize(req).send().await?;
        let status = resp.status();
        if status.is_success() {
            let body = resp.text().await?;
            Ok(serde_json::from_str(&body)?)
        } else {
            let body = resp.text().await.unwrap_or_default();
            Err(GraphError::from_response(path, status, &body))
        }
    }

    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        select: &str,
    ) -> Result<T, GraphError> {
        debug!("GET {} ($select={})", path, select);
        let req = self.client.get(self.url(path)).query(&[("$select", select)]);
        self.send(path, req).await
    }

    /// Fetch every page of a collection, following `@odata.nextLink`.
    pub(crate) async fn get_all<T: DeserializeOwned>(
        &self,
        path: &str,
        select: &str,
    ) -> Result<Vec<T>, GraphError> {
        let mut page: ODataPage<T> = self.get(path, select).await?;
        let mut items = std::mem::take(&mut page.value);
        while let Some(next_link) = page.next_link.take() {
            if !same_origin(&self.graph_url, &next_link) {
                return Err(GraphError::ForeignNextLink {
                    graph_url: self.graph_url.clone(),
                    next_link,
                });
            }
            debug!("GET {} (next page)", next_link);
            let req = self.client.get(&next_link);
            page = self.send(path, req).await?;
            items.append(&mut page.value);
        }
        Ok(items)
    }

    pub(crate) async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, GraphError> {
        if let Ok(pretty) = to_string_pretty(body) {
            debug!("POST {}: {}", path, pretty);
        }
        let req = self.client.post(self.url(path)).json(body);
        self.send(path, req).await
    }

    /// POST without a body, discarding whatever the service answers with.
    pub(crate) async fn post_empty(&self, path: &str) -> Result<(), GraphError> {
        debug!("POST {}", path);
        let req = self
            .client
            .post(self.url(path))
            .header(header::CONTENT_LENGTH, 0);
        let resp = self.authorize(req).send().await?;
        let status = resp.status();
        if status.is_success() {
            Ok(())
        } else {
            let body = resp.text().await.unwrap_or_default();
            Err(GraphError::from_response(path, status, &body))
        }
    }
}

#[async_trait]
impl GraphApi for GraphClient {
    async fn group_display_name(&self, group_id: &str) -> Result<String, GraphError> {
        Ok(self.request_group(group_id).await?.displayname)
    }

    async fn app_role_assignments(
        &self,
        service_principal_id: &str,
    ) -> Result<Vec<AppRoleAssignment>, GraphError> {
        self.request_app_role_assignments(service_principal_id)
            .await
    }

    async fn assign_app_role(
        &self,
        service_principal_id: &str,
        assignment: &NewAppRoleAssignment,
    ) -> Result<AppRoleAssignment, GraphError> {
        self.create_app_role_assignment(service_principal_id, assignment)
            .await
    }

    async fn sync_job_ids(&self, service_principal_id: &str) -> Result<Vec<String>, GraphError> {
        self.request_sync_job_ids(service_principal_id).await
    }

    async fn sync_job_status(
        &self,
        service_principal_id: &str,
        job_id: &str,
    ) -> Result<SyncStatusCode, GraphError> {
        Ok(self
            .request_sync_job_status(service_principal_id, job_id)
            .await?
            .code)
    }

    async fn start_sync_job(
        &self,
        service_principal_id: &str,
        job_id: &str,
    ) -> Result<(), GraphError> {
        self.request_start_sync_job(service_principal_id, job_id)
            .await
    }
}
