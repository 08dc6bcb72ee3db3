//! Web Error Types
//!
//! Errors that abort a request. Failed backend fetches are not errors at
//! this level: views render them as an in-page placeholder.

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use std::fmt;
use thiserror::Error;

use crate::views::{escape_html, render_page};

#[derive(Error, Debug)]
pub enum WebError {
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<fmt::Error> for WebError {
    fn from(_: fmt::Error) -> Self {
        WebError::Internal("failed to render page".to_string())
    }
}

impl WebError {
    pub fn status(&self) -> StatusCode {
        match self {
            WebError::Internal(_) | WebError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let status = self.status();
        let request_id = uuid::Uuid::new_v4().to_string();

        tracing::error!(
            request_id = %request_id,
            status = %status.as_u16(),
            error_message = %self,
            "Request failed"
        );

        let body = format!(
            "<div class=\"placeholder error\">{}</div>\n<p class=\"mono\">Request ID: {}</p>\n",
            escape_html(status.canonical_reason().unwrap_or("Error")),
            request_id
        );
        // The shell itself is static; fall back to the bare fragment if it fails
        let page = render_page("Error", &body, None).unwrap_or(body);

        (status, Html(page)).into_response()
    }
}

pub type WebResult<T> = Result<T, WebError>;
