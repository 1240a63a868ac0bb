//! Minimal GraphQL-over-HTTP client for the todo schema.

use reqwest::{Client, header};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

pub const GET_TODOS: &str = "query GetTodos { todos { id title isCompleted createdAt } }";

pub const CREATE_TODO: &str = "mutation CreateTodo($title: String!) { \
     createTodo(createTodoInput: { title: $title }) { id } }";

pub const UPDATE_TODO: &str = "mutation UpdateTodo($updateTodoInput: UpdateTodoInput!) { \
     updateTodo(updateTodoInput: $updateTodoInput) { id } }";

pub const REMOVE_TODO: &str = "mutation RemoveTodo($id: String!) { removeTodo(id: $id) { id } }";

pub const WHOAMI: &str = "query Whoami { whoAmI { id username } }";

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: String,
    pub title: String,
    pub is_completed: bool,
    pub created_at: String,
}

#[derive(Debug, Deserialize)]
pub struct TodosData {
    pub todos: Vec<Todo>,
}

#[derive(Debug, Deserialize)]
pub struct Identity {
    pub id: String,
    pub username: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WhoamiData {
    pub who_am_i: Option<Identity>,
}

/// Variables for the `updateTodo` mutation. Only the fields being changed
/// are serialized.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTodoInput<'a> {
    pub id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_completed: Option<bool>,
}

#[derive(Serialize)]
struct GraphQlRequest<'a, V: Serialize> {
    query: &'a str,
    variables: V,
}

#[derive(Deserialize)]
struct GraphQlResponse<D> {
    data: Option<D>,
    errors: Option<Vec<GraphQlResponseError>>,
}

#[derive(Deserialize)]
struct GraphQlResponseError {
    message: String,
}

/// Errors from a GraphQL call.
#[derive(Debug)]
pub enum GraphQlError {
    /// The upstream rejected the call's credentials
    Unauthorized,
    /// Any other error reported in the response envelope
    Request(String),
    /// Transport-level failure
    Network(reqwest::Error),
}

impl std::fmt::Display for GraphQlError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GraphQlError::Unauthorized => write!(f, "Unauthorized"),
            GraphQlError::Request(message) => write!(f, "GraphQL request failed: {}", message),
            GraphQlError::Network(e) => write!(f, "GraphQL transport failed: {}", e),
        }
    }
}

impl std::error::Error for GraphQlError {}

/// A GraphQL client carrying one request's credentials as its `Cookie`
/// header. Built per request; the underlying connection pool is shared.
pub struct GraphQlClient {
    http: Client,
    endpoint: String,
    carrier: String,
}

impl GraphQlClient {
    pub(super) fn new(http: Client, endpoint: String, carrier: String) -> Self {
        Self {
            http,
            endpoint,
            carrier,
        }
    }

    /// POST one operation and unwrap the response envelope.
    pub async fn request<V, D>(&self, query: &str, variables: V) -> Result<D, GraphQlError>
    where
        V: Serialize,
        D: DeserializeOwned,
    {
        let response = self
            .http
            .post(&self.endpoint)
            .header(header::COOKIE, &self.carrier)
            .json(&GraphQlRequest { query, variables })
            .send()
            .await
            .map_err(GraphQlError::Network)?;

        let reply: GraphQlResponse<D> = response.json().await.map_err(GraphQlError::Network)?;

        if let Some(first) = reply.errors.as_ref().and_then(|errors| errors.first()) {
            if first.message == "Unauthorized" {
                return Err(GraphQlError::Unauthorized);
            }
            return Err(GraphQlError::Request(first.message.clone()));
        }

        reply
            .data
            .ok_or_else(|| GraphQlError::Request("response carried no data".into()))
    }
}
