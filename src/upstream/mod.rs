//! HTTP client for the upstream API server.
//!
//! One server hosts both the auth endpoints (`/auth/*`) and the GraphQL
//! endpoint (`/graphql`). Every outbound call is attempt-once: no retry, no
//! backoff; callers interpret the response.

mod graphql;

pub use graphql::{
    CREATE_TODO, GET_TODOS, GraphQlClient, GraphQlError, Identity, REMOVE_TODO, Todo, TodosData,
    UPDATE_TODO, UpdateTodoInput, WHOAMI, WhoamiData,
};

use reqwest::header;
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use url::Url;

/// User record returned by the auth endpoints.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub username: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Failure body of the auth endpoints.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiFailure {
    pub status_code: u16,
    pub message: String,
}

/// Either shape an auth endpoint answers with. A failure body always carries
/// `statusCode`, which a profile never does, so `Failure` must be tried first.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum AuthReply {
    Failure(ApiFailure),
    Profile(UserProfile),
}

/// Login/registration fields forwarded verbatim to the upstream.
#[derive(Debug, Serialize)]
pub struct Credentials<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

/// Errors from outbound calls to the upstream server.
#[derive(Debug)]
pub enum UpstreamError {
    /// Transport-level failure (connect, read, or body decode)
    Network(reqwest::Error),
    /// The upstream answered with a failure body the caller cannot recover from
    Rejected { status_code: u16, message: String },
}

impl std::fmt::Display for UpstreamError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UpstreamError::Network(e) => write!(f, "Upstream request failed: {}", e),
            UpstreamError::Rejected {
                status_code,
                message,
            } => {
                write!(f, "Upstream rejected the request ({}): {}", status_code, message)
            }
        }
    }
}

impl std::error::Error for UpstreamError {}

/// Client bound to one upstream server, constructed once at startup and
/// shared by every request handler.
#[derive(Clone)]
pub struct UpstreamClient {
    http: Client,
    base: Url,
}

impl UpstreamClient {
    pub fn new(base: Url) -> Self {
        Self {
            http: Client::new(),
            base,
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base.as_str().trim_end_matches('/'), path)
    }

    /// Single refresh attempt with the carrier as the `Cookie` header.
    pub async fn refresh(&self, carrier: &str) -> Result<Response, UpstreamError> {
        self.http
            .get(self.endpoint("/auth/refresh"))
            .header(header::COOKIE, carrier)
            .send()
            .await
            .map_err(UpstreamError::Network)
    }

    pub async fn login(&self, credentials: &Credentials<'_>) -> Result<Response, UpstreamError> {
        self.http
            .post(self.endpoint("/auth/login"))
            .json(credentials)
            .send()
            .await
            .map_err(UpstreamError::Network)
    }

    pub async fn register(&self, credentials: &Credentials<'_>) -> Result<Response, UpstreamError> {
        self.http
            .post(self.endpoint("/auth/register"))
            .json(credentials)
            .send()
            .await
            .map_err(UpstreamError::Network)
    }

    /// Forward the inbound cookies so the upstream can clear the session.
    pub async fn logout(&self, carrier: &str) -> Result<Response, UpstreamError> {
        self.http
            .post(self.endpoint("/auth/logout"))
            .header(header::COOKIE, carrier)
            .send()
            .await
            .map_err(UpstreamError::Network)
    }

    /// GraphQL client bound to this upstream and the given credentials.
    pub fn graphql(&self, carrier: &str) -> GraphQlClient {
        GraphQlClient::new(
            self.http.clone(),
            self.endpoint("/graphql"),
            carrier.to_string(),
        )
    }
}
