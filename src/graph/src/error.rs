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
use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

/// Errors returned by the Graph plumbing. None of these are retried; the
/// caller decides whether the run can continue.
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid JSON from Graph: {0}")]
    Json(#[from] serde_json::Error),

    /// The requested object does not exist (HTTP 404).
    #[error("Resource not found: {path}")]
    NotFound { path: String },

    #[error("Graph request to {path} failed with {status}: {code} - {message}")]
    Api {
        path: String,
        status: StatusCode,
        code: String,
        message: String,
    },

    /// A paged response pointed somewhere other than the configured Graph host.
    #[error("Refusing to follow next link outside of {graph_url}: {next_link}")]
    ForeignNextLink { graph_url: String, next_link: String },

    #[error("Failed acquiring an access token: {0}")]
    Auth(String),
}

#[derive(Debug, Deserialize)]
pub(crate) struct ODataError {
    pub(crate) error: ODataErrorBody,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ODataErrorBody {
    #[serde(default)]
    pub(crate) code: String,
    #[serde(default)]
    pub(crate) message: String,
}

impl GraphError {
    /// Build an error from a non-success response body.
    pub(crate) fn from_response(path: &str, status: StatusCode, body: &str) -> GraphError {
        if status == StatusCode::NOT_FOUND {
            return GraphError::NotFound {
                path: path.to_string(),
            };
        }
        match serde_json::from_str::<ODataError>(body) {
            Ok(odata) => GraphError::Api {
                path: path.to_string(),
                status,
                code: odata.error.code,
                message: odata.error.message,
            },
            Err(_) => GraphError::Api {
                path: path.to_string(),
                status,
                code: String::new(),
                message: body.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_ignores_body() {
        let err = GraphError::from_response("/groups/abc", StatusCode::NOT_FOUND, "{}");
        assert!(matches!(err, GraphError::NotFound { path } if path == "/groups/abc"));
    }

    #[test]
    fn test_odata_error_body() {
        let body = r#"{"error":{"code":"Authorization_RequestDenied","message":"Insufficient privileges"}}"#;
        match GraphError::from_response("/servicePrincipals/sp", StatusCode::FORBIDDEN, body) {
            GraphError::Api { code, message, .. } => {
                assert_eq!(code, "Authorization_RequestDenied");
                assert_eq!(message, "Insufficient privileges");
            }
            e => panic!("unexpected error {:?}", e),
        }
    }

    #[test]
    fn test_plain_error_body() {
        match GraphError::from_response("/x", StatusCode::BAD_GATEWAY, "upstream down") {
            GraphError::Api { code, message, .. } => {
                assert!(code.is_empty());
                assert_eq!(message, "upstream down");
            }
            e => panic!("unexpected error {:?}", e),
        }
    }
}
