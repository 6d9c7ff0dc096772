//! API error types with IntoResponse
//!
//! Business failures travel inside the envelope with HTTP 200; only the auth
//! gate answers with a real 401.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use super::envelope::Envelope;
use crate::models::ValidationError;
use crate::repos::DbError;
use crate::store::StoreError;
use crate::workflow::DispatchError;

/// API error type with envelope code mapping
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Credential or connection string absent (500)
    #[error("{0}")]
    ConfigurationMissing(String),

    /// Rejected before touching the store (400)
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Target key does not exist (404)
    #[error("{resource} '{id}' not found")]
    NotFound { resource: &'static str, id: String },

    /// Duplicate key (400)
    #[error("{resource} '{id}' already exists")]
    Conflict { resource: &'static str, id: String },

    /// Store query or connection failure (500)
    #[error("store error: {0}")]
    Store(StoreError),

    /// Non-2xx from an external API, status passed through
    #[error("upstream returned {status}: {message}")]
    Upstream { status: u16, message: String },

    /// Request outlived the server deadline (504)
    #[error("request timed out")]
    Timeout,

    /// Middleware failure outside any handler (500)
    #[error("internal error: {0}")]
    Internal(String),

    /// Missing or invalid credential (HTTP 401)
    #[error("authentication required")]
    Unauthorized,
}

impl ApiError {
    pub fn code(&self) -> u16 {
        match self {
            Self::ConfigurationMissing(_) | Self::Store(_) | Self::Internal(_) => 500,
            Self::Timeout => 504,
            Self::Validation(_) | Self::Conflict { .. } => 400,
            Self::NotFound { .. } => 404,
            Self::Upstream { status, .. } => *status,
            Self::Unauthorized => 401,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let code = self.code();
        match &self {
            Self::Store(e) => tracing::error!(error = %e, "store failure"),
            Self::Internal(e) => tracing::error!(error = %e, "middleware failure"),
            Self::Timeout => tracing::warn!("request timed out"),
            Self::Upstream { status, message } => {
                tracing::warn!(status, message = %message, "upstream failure")
            }
            Self::ConfigurationMissing(what) => tracing::warn!(missing = %what, "not configured"),
            _ => tracing::debug!(code, error = %self, "request rejected"),
        }

        let status = match self {
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            _ => StatusCode::OK,
        };
        (status, Json(Envelope::error(code, self.to_string()))).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotConfigured(reason) => Self::ConfigurationMissing(reason),
            other => Self::Store(other),
        }
    }
}

impl From<DbError> for ApiError {
    fn from(e: DbError) -> Self {
        match e {
            DbError::Store(e) => e.into(),
            DbError::NotFound { resource, id } => Self::NotFound { resource, id },
            DbError::Conflict { resource, id } => Self::Conflict { resource, id },
        }
    }
}

impl From<DispatchError> for ApiError {
    fn from(e: DispatchError) -> Self {
        match e {
            DispatchError::NotConfigured(what) => Self::ConfigurationMissing(what.to_string()),
            DispatchError::Http(e) => Self::Upstream {
                status: 500,
                message: e.to_string(),
            },
            DispatchError::Upstream { status, message } => Self::Upstream { status, message },
        }
    }
}
