use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use checkin_shared::{CurrencyKind, Rejection};

use crate::ledger::LedgerError;
use crate::render;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Rejected: {reason}")]
    Rejected { reason: Rejection, text: String },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServerError {
    /// Map a ledger failure, rendering rejections for the currency involved.
    pub fn from_ledger(err: LedgerError, kind: Option<CurrencyKind>) -> Self {
        match err {
            LedgerError::Rejected(reason) => ServerError::Rejected {
                reason,
                text: render::rejection(reason, kind),
            },
            LedgerError::Persistence(e) => {
                tracing::error!(error = %e, "ledger operation failed");
                ServerError::Internal(e.to_string())
            }
        }
    }
}

impl From<LedgerError> for ServerError {
    fn from(err: LedgerError) -> Self {
        ServerError::from_ledger(err, None)
    }
}

fn status(reason: Rejection) -> StatusCode {
    match reason {
        Rejection::AlreadyCheckedIn => StatusCode::CONFLICT,
        Rejection::InvalidAmount => StatusCode::BAD_REQUEST,
        Rejection::InsufficientFunds => StatusCode::UNPROCESSABLE_ENTITY,
        Rejection::NotAuthorized => StatusCode::FORBIDDEN,
        Rejection::NotFound => StatusCode::NOT_FOUND,
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            ServerError::Rejected { reason, text } => (
                status(*reason),
                serde_json::json!({ "reason": reason.code(), "text": text }),
            ),
            ServerError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                serde_json::json!({ "reason": "internal", "text": render::TRY_AGAIN_LATER }),
            ),
        };

        (status, axum::Json(body)).into_response()
    }
}
