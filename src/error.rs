//! API Error Handling

use crate::auth::validation::ValidationError;
use crate::ratings::RatingError;
use async_trait::async_trait;
use axum::{
    extract::{rejection::JsonRejection, FromRequest, FromRequestParts, Query, Request},
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::{debug, error};

/// Handler-level errors
#[derive(Debug)]
pub enum ApiError {
    Validation(String),
    InvalidRating(RatingError),
    UserExists,
    InvalidCredentials,
    IncorrectPassword,
    NotFound(&'static str),
    Forbidden,
    Internal,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_)
            | ApiError::InvalidRating(_)
            | ApiError::UserExists
            | ApiError::InvalidCredentials
            | ApiError::IncorrectPassword => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn message(&self) -> String {
        match self {
            ApiError::Validation(msg) => msg.clone(),
            ApiError::InvalidRating(e) => e.to_string(),
            ApiError::UserExists => "User already exists".to_string(),
            ApiError::InvalidCredentials => "Invalid credentials".to_string(),
            ApiError::IncorrectPassword => "Current password is incorrect".to_string(),
            ApiError::NotFound(what) => (*what).to_string(),
            ApiError::Forbidden => "Access denied".to_string(),
            ApiError::Internal => "Internal server error".to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "message": self.message() }))).into_response()
    }
}

/// Storage and runtime failures collapse to a generic 500.
impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        error!(error = ?err, "Request failed with internal error");
        ApiError::Internal
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::Validation(err.to_string())
    }
}

impl From<RatingError> for ApiError {
    fn from(err: RatingError) -> Self {
        ApiError::InvalidRating(err)
    }
}

/// JSON body extractor that reports bad bodies as 400 with a `message` payload
pub struct ApiJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(ApiJson(value)),
            Err(rejection) => {
                debug!(reason = %rejection.body_text(), "Rejected request body");
                Err(ApiError::Validation(json_rejection_message(&rejection)))
            }
        }
    }
}

fn json_rejection_message(rejection: &JsonRejection) -> String {
    match rejection {
        JsonRejection::MissingJsonContentType(_) => {
            "Expected request with `Content-Type: application/json`".to_string()
        }
        _ => "Invalid request body".to_string(),
    }
}

/// Query-string extractor with the same 400 `{"message"}` rejection as `ApiJson`
pub struct ApiQuery<T>(pub T);

#[async_trait]
impl<S, T> FromRequestParts<S> for ApiQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Query::<T>::from_request_parts(parts, state).await {
            Ok(Query(value)) => Ok(ApiQuery(value)),
            Err(rejection) => {
                debug!(reason = %rejection.body_text(), "Rejected query string");
                Err(ApiError::Validation("Invalid query parameters".to_string()))
            }
        }
    }
}
