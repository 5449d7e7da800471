//! JSON body extraction
//!
//! `JsonBody` behaves like `Json` but rejects malformed bodies, missing keys
//! and wrong content types with `422 {"detail": <reason>}`.

use axum::{
    Json,
    extract::{FromRequest, Request},
};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::ApiError;

/// A JSON extractor with `{"detail"}` rejections
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonBody<T>(pub T);

impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => {
                debug!(status = %rejection.status(), "JSON body rejected");
                Err(ApiError::Unprocessable(rejection.body_text()))
            },
        }
    }
}
