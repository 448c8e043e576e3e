use std::time::Duration;

use futures::future::{BoxFuture, FutureExt};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::config::Config;
use crate::error::{GhQueryError, Result};
use crate::inputs::Variables;

const USER_AGENT: &str = concat!("ghq/", env!("CARGO_PKG_VERSION"));

/// Asynchronous GraphQL request capability consumed by the controller.
///
/// Implementations are shared across controllers behind an `Arc` and only
/// used through `&self`.
pub trait RequestClient: Send + Sync + 'static {
    /// Failure produced by a request. Stored verbatim in the query state.
    type Error: Send + Sync + 'static;

    fn request<'a>(
        &'a self,
        query: &'a str,
        variables: Option<&'a Variables>,
    ) -> BoxFuture<'a, std::result::Result<Value, Self::Error>>;
}

/// GraphQL client for the GitHub API (or any endpoint speaking the same
/// JSON-over-POST protocol).
pub struct GitHubClient {
    http: Client,
    endpoint: Url,
    token: String,
}

#[derive(Serialize)]
struct GraphQLRequest<'a> {
    query: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    variables: Option<&'a Variables>,
}

#[derive(Deserialize)]
struct GraphQLResponse {
    data: Option<Value>,
    errors: Option<Vec<GraphQLError>>,
}

#[derive(Deserialize, Debug)]
struct GraphQLError {
    message: String,
}

impl GitHubClient {
    pub fn new(endpoint: Url, token: String) -> Self {
        Self {
            http: Client::new(),
            endpoint,
            token,
        }
    }

    pub fn with_timeout(endpoint: Url, token: String, timeout: Duration) -> Result<Self> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            endpoint,
            token,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let endpoint = config.endpoint()?;
        let token = config.token()?;

        match config.timeout() {
            Some(timeout) => Self::with_timeout(endpoint, token, timeout),
            None => Ok(Self::new(endpoint, token)),
        }
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub async fn query(&self, query: &str, variables: Option<&Variables>) -> Result<Value> {
        let request = GraphQLRequest { query, variables };

        debug!(endpoint = %self.endpoint, "sending GraphQL request");

        let response = self
            .http
            .post(self.endpoint.clone())
            .bearer_auth(&self.token)
            .header("User-Agent", USER_AGENT)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(GhQueryError::ApiError {
                status: response.status().as_u16(),
                message: response
                    .text()
                    .await
                    .unwrap_or_else(|_| "<failed to read response body>".to_string()),
            });
        }

        let gql_response: GraphQLResponse = response.json().await?;

        if let Some(errors) = gql_response.errors {
            if !errors.is_empty() {
                return Err(GhQueryError::GraphQL {
                    messages: errors.into_iter().map(|e| e.message).collect(),
                });
            }
        }

        match gql_response.data {
            Some(Value::Null) | None => Err(GhQueryError::EmptyResponse),
            Some(data) => Ok(data),
        }
    }
}

impl RequestClient for GitHubClient {
    type Error = GhQueryError;

    fn request<'a>(
        &'a self,
        query: &'a str,
        variables: Option<&'a Variables>,
    ) -> BoxFuture<'a, Result<Value>> {
        self.query(query, variables).boxed()
    }
}
