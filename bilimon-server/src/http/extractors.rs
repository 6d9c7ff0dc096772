//! Custom Axum extractors
//!
//! Every rejection is an [`ApiError`], so malformed input still answers
//! with the envelope instead of axum's plain-text bodies.

use axum::extract::{FromRequest, FromRequestParts, Path, Query, Request};
use axum::http::request::Parts;
use axum::Json;
use serde::de::DeserializeOwned;

use super::error::ApiError;
use crate::models::{Bvid, ValidationError};

/// Extract a bvid from the path; free text and video URLs are accepted
pub struct ValidBvid(pub Bvid);

impl<S> FromRequestParts<S> for ValidBvid
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw): Path<String> = Path::from_request_parts(parts, state)
            .await
            .map_err(|_| ApiError::Validation(ValidationError::Empty { field: "bvid" }))?;

        Ok(Self(Bvid::extract(&raw)?))
    }
}

/// Extract a cookie pool position from the path
pub struct PoolIndex(pub usize);

impl<S> FromRequestParts<S> for PoolIndex
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw): Path<String> = Path::from_request_parts(parts, state)
            .await
            .map_err(|_| ApiError::Validation(ValidationError::Empty { field: "index" }))?;

        let index = raw.trim().parse().map_err(|_| {
            ApiError::Validation(ValidationError::InvalidFormat {
                field: "index",
                reason: "expected a non-negative integer",
            })
        })?;
        Ok(Self(index))
    }
}

/// JSON body; syntax, type and content-type errors become a 400 envelope
pub struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await.map_err(|rejection| {
            ApiError::Validation(ValidationError::Malformed {
                part: "body",
                detail: rejection.body_text(),
            })
        })?;
        Ok(Self(value))
    }
}

/// Query string, rejected the same way as [`ApiJson`]
pub struct ApiQuery<T>(pub T);

impl<S, T> FromRequestParts<S> for ApiQuery<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| {
                ApiError::Validation(ValidationError::Malformed {
                    part: "query",
                    detail: rejection.body_text(),
                })
            })?;
        Ok(Self(value))
    }
}
