use axum::{
    Json, http,
    response::{IntoResponse, Response},
};

use agririsk::response::FailureResponse;

use crate::Error;

/// Top level error of the request handlers.
/// Every failure is reported with a 200 status code in the `{success: 0, message}` envelope.
#[derive(Debug)]
pub enum AppError {
    Error(Error),
}

impl From<Error> for AppError {
    fn from(inner: Error) -> Self {
        AppError::Error(inner)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = match self {
            AppError::Error(err) => FailureResponse::from_error(&err),
        };

        (http::StatusCode::OK, Json(body)).into_response()
    }
}
