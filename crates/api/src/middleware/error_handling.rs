//! # Error Handling Middleware
//!
//! Maps [`BotError`] to HTTP status codes and the JSON body the link page
//! script understands. The body never carries internal error detail, only
//! the user-facing line from [`BotError::user_message`].

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use duebot_core::errors::BotError;
use serde::{Deserialize, Serialize};
use tracing::error;

pub const EXPIRED_LINK_MESSAGE: &str =
    "This link has expired or was already used. Run /setup again in the bot.";

/// Body of every `/link/submit` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkResponse {
    pub ok: bool,
    pub message: String,
}

impl LinkResponse {
    pub fn success(message: impl Into<String>) -> Self {
        Self { ok: true, message: message.into() }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self { ok: false, message: message.into() }
    }
}

/// Application error wrapper that provides HTTP status code mapping
#[derive(Debug)]
pub enum AppError {
    /// The one-time link token is unknown, used or expired
    LinkExpired,
    Core(BotError),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::LinkExpired => StatusCode::GONE,
            AppError::Core(err) => match err {
                BotError::NotLinked | BotError::NotFound(_) => StatusCode::NOT_FOUND,
                BotError::Validation(_) => StatusCode::BAD_REQUEST,
                BotError::AuthExpired => StatusCode::UNAUTHORIZED,
                BotError::RemoteUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
                BotError::StoreFailure(_) | BotError::Crypto(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
        }
    }

    pub fn message(&self) -> String {
        match self {
            AppError::LinkExpired => EXPIRED_LINK_MESSAGE.to_string(),
            AppError::Core(err) => err.user_message(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            if let AppError::Core(err) = &self {
                error!(error = %err, "Link request failed");
            }
        }
        (status, Json(LinkResponse::failure(self.message()))).into_response()
    }
}

/// Automatic conversion from BotError to AppError
impl From<BotError> for AppError {
    fn from(err: BotError) -> Self {
        AppError::Core(err)
    }
}
