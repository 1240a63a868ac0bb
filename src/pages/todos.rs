//! Todos page: list loader and the create/toggle/rename/delete actions.

use axum::extract::{Form, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Redirect, Response};
use serde::Deserialize;
use serde_json::json;

use super::render;
use super::{PageError, PagesState};
use crate::session::{SessionOutcome, check_session};
use crate::upstream::{
    CREATE_TODO, GET_TODOS, GraphQlClient, REMOVE_TODO, TodosData, UPDATE_TODO, UpdateTodoInput,
    WHOAMI, WhoamiData,
};

#[derive(Deserialize)]
pub struct TodoForm {
    intent: Option<String>,
    id: Option<String>,
    title: Option<String>,
    is_completed: Option<String>,
}

/// Resolve the request's credentials through the session gate.
///
/// Returns the carrier for this request's GraphQL calls plus the headers the
/// response must carry. Requests without cookies and requests whose session
/// cannot be refreshed bubble out as `SessionExpired` (redirect to login).
async fn fresh_credentials(
    state: &PagesState,
    headers: &HeaderMap,
) -> Result<(String, HeaderMap), PageError> {
    let carrier = headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .ok_or(PageError::SessionExpired)?;

    match check_session(&state.upstream, carrier).await? {
        SessionOutcome::Unchanged => Ok((carrier.to_string(), HeaderMap::new())),
        SessionOutcome::Refreshed { carrier, headers } => Ok((carrier, headers)),
        SessionOutcome::Unrecoverable => Err(PageError::SessionExpired),
    }
}

/// Fetch and render the list, with `title_error` threaded into the create
/// form when a submission was rejected.
async fn render_list(
    client: &GraphQlClient,
    status: StatusCode,
    title_error: Option<&str>,
) -> Result<Response, PageError> {
    let whoami: WhoamiData = client.request(WHOAMI, json!({})).await?;
    let data: TodosData = client.request(GET_TODOS, json!({})).await?;

    let mut todos = data.todos;
    // ISO-8601 timestamps order lexicographically
    todos.sort_by(|a, b| a.created_at.cmp(&b.created_at));

    let username = whoami.who_am_i.as_ref().map(|who| who.username.as_str());
    Ok(render::html_response(
        status,
        render::todos_page(username, &todos, title_error),
    ))
}

pub async fn page(
    State(state): State<PagesState>,
    headers: HeaderMap,
) -> Result<Response, PageError> {
    let (carrier, outbound) = fresh_credentials(&state, &headers).await?;
    let client = state.upstream.graphql(&carrier);
    let page = render_list(&client, StatusCode::OK, None).await?;
    Ok((outbound, page).into_response())
}

pub async fn submit(
    State(state): State<PagesState>,
    headers: HeaderMap,
    Form(form): Form<TodoForm>,
) -> Result<Response, PageError> {
    let (carrier, outbound) = fresh_credentials(&state, &headers).await?;
    let client = state.upstream.graphql(&carrier);

    let response = match form.intent.as_deref() {
        Some("create") => {
            let title = form.title.as_deref().unwrap_or("");
            if title.is_empty() {
                render_list(&client, StatusCode::BAD_REQUEST, Some("Title is required")).await?
            } else {
                let _: serde_json::Value =
                    client.request(CREATE_TODO, json!({ "title": title })).await?;
                Redirect::to("/todos").into_response()
            }
        }
        Some("toggle") => match (form.id.as_deref(), form.is_completed.as_deref()) {
            (Some(id), Some(is_completed)) if !id.is_empty() => {
                let input = UpdateTodoInput {
                    id,
                    title: None,
                    // flip the stored flag
                    is_completed: Some(is_completed != "true"),
                };
                let _: serde_json::Value = client
                    .request(UPDATE_TODO, json!({ "updateTodoInput": input }))
                    .await?;
                Redirect::to("/todos").into_response()
            }
            _ => invalid_submission(),
        },
        Some("rename") => match (form.id.as_deref(), form.title.as_deref()) {
            (Some(id), Some(title)) if !id.is_empty() && !title.is_empty() => {
                let input = UpdateTodoInput {
                    id,
                    title: Some(title),
                    is_completed: None,
                };
                let _: serde_json::Value = client
                    .request(UPDATE_TODO, json!({ "updateTodoInput": input }))
                    .await?;
                Redirect::to("/todos").into_response()
            }
            _ => invalid_submission(),
        },
        Some("delete") => match form.id.as_deref() {
            Some(id) if !id.is_empty() => {
                let _: serde_json::Value =
                    client.request(REMOVE_TODO, json!({ "id": id })).await?;
                Redirect::to("/todos").into_response()
            }
            _ => invalid_submission(),
        },
        _ => invalid_submission(),
    };

    // Refreshed cookies ride on every outcome, including the 400s
    Ok((outbound, response).into_response())
}

fn invalid_submission() -> Response {
    render::error_page(StatusCode::BAD_REQUEST, "Form not submitted correctly")
}
