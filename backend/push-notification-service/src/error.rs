/// Error envelope for the push endpoint
///
/// Every failure leaves the service as `{"error": "<message>"}`. Caller and
/// delivery faults are 400; missing upstream configuration is 500.
use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use nova_fcm_dispatch::DispatchError;
use serde::Serialize;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    #[error("{0}")]
    BadRequest(String),
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Dispatch(e) if e.is_infrastructure() => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Dispatch(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorBody {
            error: self.to_string(),
        })
    }
}
