//! HTTP handlers and route table

use axum::{
    extract::{rejection::QueryRejection, FromRequest, Query, Request, State},
    http::{Method, StatusCode, Uri},
    response::{IntoResponse, Redirect, Response},
    routing::any,
    Form, Router,
};
use serde::Deserialize;

use crate::error::AppError;
use crate::models::MAX_EXPIRY_DAYS;
use crate::mux::ServeMux;
use crate::state::AppState;
use crate::templates::{HomePage, HtmlTemplate};

/// Route table for the application
///
/// Every handler is registered for all methods and checks the method itself.
pub fn routes() -> ServeMux<AppState> {
    ServeMux::new()
        .handle("/", any(home))
        .handle("/snippet", any(show_snippet))
        .handle("/snippet/create", any(create_snippet))
}

/// Routes with state supplied, ready to be served
pub fn router(state: AppState) -> Router {
    routes().into_router(state)
}

/// Fields of the snippet creation form
#[derive(Debug, Clone, Deserialize)]
pub struct SnippetForm {
    pub title: String,
    pub content: String,
    /// Lifetime in whole days, `1..=MAX_EXPIRY_DAYS`
    pub expires: u32,
}

/// `/`: the home page
///
/// `/` is a subtree pattern, so anything unmatched lands here and is
/// answered with 404.
pub async fn home(uri: Uri) -> Result<Response, AppError> {
    if uri.path() != "/" {
        return Err(AppError::NotFound);
    }

    HtmlTemplate::new(HomePage).render()
}

/// `/snippet?id=N`: one live snippet as plain text
pub async fn show_snippet(
    State(state): State<AppState>,
    query: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Result<String, AppError> {
    let Ok(Query(params)) = query else {
        return Err(AppError::NotFound);
    };

    let id = params
        .iter()
        .find(|(key, _)| key == "id")
        .and_then(|(_, value)| value.parse::<i64>().ok())
        .filter(|id| *id >= 1)
        .ok_or(AppError::NotFound)?;

    let snippet = state.snippets().get(id).await?;
    Ok(snippet.to_string())
}

/// `/snippet/create`: store a snippet from a POSTed form and redirect to it
pub async fn create_snippet(
    State(state): State<AppState>,
    request: Request,
) -> Result<Response, AppError> {
    if request.method() != Method::POST {
        return Err(AppError::MethodNotAllowed { allow: "POST" });
    }

    let Form(form) = Form::<SnippetForm>::from_request(request, &state)
        .await
        .map_err(|rejection| {
            tracing::debug!(reason = %rejection.body_text(), "rejected snippet form");
            match rejection.status() {
                StatusCode::PAYLOAD_TOO_LARGE => AppError::Client(StatusCode::PAYLOAD_TOO_LARGE),
                _ => AppError::Client(StatusCode::BAD_REQUEST),
            }
        })?;

    if !(1..=MAX_EXPIRY_DAYS).contains(&form.expires) {
        return Err(AppError::Client(StatusCode::BAD_REQUEST));
    }

    let id = state
        .snippets()
        .insert(&form.title, &form.content, form.expires)
        .await?;

    tracing::info!(id, "snippet created");
    Ok(Redirect::to(&format!("/snippet?id={id}")).into_response())
}
