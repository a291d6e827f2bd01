use std::time::Duration;

use reqwest::header::AUTHORIZATION;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::GithubError;

pub const DEFAULT_API_ENDPOINT: &str = "https://api.github.com/graphql";

/// Minimal GraphQL client for the GitHub v4 API.
#[derive(Debug, Clone)]
pub struct GithubClient {
    http: reqwest::Client,
    endpoint: String,
    token: String,
}

#[derive(Serialize)]
struct GraphQlRequest<'a> {
    query: &'a str,
    variables: serde_json::Value,
}

#[derive(Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Deserialize)]
struct GraphQlError {
    message: String,
}

impl GithubClient {
    /// `timeout` of `None` leaves requests unbounded. An empty `token` sends
    /// requests without authorization.
    pub fn new(
        endpoint: impl Into<String>,
        token: impl Into<String>,
        timeout: Option<Duration>,
    ) -> Result<Self, GithubError> {
        let mut builder = reqwest::Client::builder().user_agent(concat!(
            env!("CARGO_PKG_NAME"),
            "/",
            env!("CARGO_PKG_VERSION")
        ));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            http: builder.build()?,
            endpoint: endpoint.into(),
            token: token.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Execute `query` and decode its `data` into `T`.
    pub async fn run<T: DeserializeOwned>(
        &self,
        query: &str,
        variables: serde_json::Value,
    ) -> Result<T, GithubError> {
        let mut request = self
            .http
            .post(&self.endpoint)
            .json(&GraphQlRequest { query, variables });
        if !self.token.is_empty() {
            request = request.header(AUTHORIZATION, format!("bearer {}", self.token));
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GithubError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body: GraphQlResponse<T> = response.json().await?;
        if let Some(err) = body.errors.into_iter().next() {
            return Err(GithubError::GraphQl(err.message));
        }
        body.data.ok_or(GithubError::EmptyResponse)
    }
}
