use axum::{
    Form, Json,
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

use crate::{
    ApiState, pages,
    middleware::error_handling::{AppError, LinkResponse},
};

#[derive(Debug, Deserialize)]
pub struct LinkQuery {
    #[serde(default)]
    pub token: String,
}

/// Form fields posted by the link page.
#[derive(Debug, Deserialize)]
pub struct LinkSubmission {
    #[serde(default)]
    pub link_token: String,
    #[serde(default)]
    pub access_token: String,
}

/// `GET /link?token=...` serves the form without consuming the token.
pub async fn link_page(
    State(state): State<Arc<ApiState>>,
    Query(query): Query<LinkQuery>,
) -> Response {
    match state.link_tokens.peek(&query.token).await {
        Some(_) => Html(pages::link_form(&query.token)).into_response(),
        None => (StatusCode::GONE, Html(pages::expired())).into_response(),
    }
}

/// `POST /link/submit` consumes the one-time token, then validates and
/// stores the credential for the token's owner.
pub async fn submit_link(
    State(state): State<Arc<ApiState>>,
    Form(submission): Form<LinkSubmission>,
) -> Result<Json<LinkResponse>, AppError> {
    let user = state
        .link_tokens
        .consume(&submission.link_token)
        .await
        .ok_or(AppError::LinkExpired)?;

    let course_count = state.linker.link(user, &submission.access_token).await?;
    info!(user_id = %user, course_count, "Credential linked through web form");

    Ok(Json(LinkResponse::success(format!(
        "Canvas account linked! Found {course_count} active course(s). You can close this page."
    ))))
}
