use axum::{
    extract::rejection::FormRejection,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use thiserror::Error;
use tracing::{error, warn};

use findit_store::StoreError;

use crate::pages;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("login required")]
    AuthRequired,

    #[error("invalid username or password")]
    InvalidCredentials,

    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("{0}")]
    Internal(String),
}

impl From<FormRejection> for ApiError {
    fn from(rejection: FormRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::AuthRequired => Redirect::to("/login").into_response(),
            Self::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                pages::login_with_error("Wrong username or password."),
            )
                .into_response(),
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg).into_response(),
            Self::Store(e) => store_error_response(e),
            Self::Internal(msg) => {
                error!("{}", msg);
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }
}

fn store_error_response(e: StoreError) -> Response {
    let status = match &e {
        StoreError::AlreadyExists(_) => {
            return (
                StatusCode::CONFLICT,
                pages::register_with_error("That username is already taken."),
            )
                .into_response();
        }
        StoreError::UnknownUser(_)
        | StoreError::ItemNotFound(_)
        | StoreError::ReportNotFound { .. } => StatusCode::NOT_FOUND,
        StoreError::Forbidden { .. } => StatusCode::FORBIDDEN,
        StoreError::AlreadyReported { .. } | StoreError::AlreadyResolved { .. } => {
            StatusCode::CONFLICT
        }
        StoreError::IdsExhausted(_)
        | StoreError::Io { .. }
        | StoreError::Json { .. }
        | StoreError::LockPoisoned => {
            error!("Record store failure: {}", e);
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    warn!("Request rejected: {}", e);
    (status, e.to_string()).into_response()
}
