use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chain_sol::SolError;
use serde::Serialize;

use crate::rpc::RpcError;

/// Every way a gateway request can fail. Rendered as
/// `{"status": false, "message": ...}`.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("Required Param: {0}")]
    MissingField(&'static str),

    #[error("malformed request body: {0}")]
    MalformedBody(String),

    #[error(transparent)]
    Chain(#[from] SolError),

    #[error(transparent)]
    RemoteFailure(#[from] RpcError),
}

#[derive(Serialize)]
struct ErrorEnvelope {
    status: bool,
    message: String,
}

impl GatewayError {
    /// Stable name of the failure class, used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            GatewayError::MissingField(_) => "MissingField",
            GatewayError::MalformedBody(_) => "MalformedBody",
            GatewayError::RemoteFailure(_) => "RemoteFailure",
            GatewayError::Chain(e) => match e {
                SolError::InvalidPrivateKey(_) => "InvalidSecret",
                SolError::InvalidAddress(_) => "InvalidAddress",
                SolError::DerivationExhausted(_) => "DerivationExhausted",
                SolError::InvalidAmount(_) => "InvalidAmount",
                SolError::InvalidScale(_) => "InvalidScale",
                SolError::AmountOverflow { .. } => "AmountOverflow",
                SolError::InvalidInstructionInput(_) => "InvalidInstructionInput",
                SolError::TransactionBuildError(_)
                | SolError::SigningError(_)
                | SolError::SerializationError(_) => "Internal",
            },
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::MissingField(_) | GatewayError::MalformedBody(_) => {
                StatusCode::BAD_REQUEST
            }
            GatewayError::Chain(e) if e.is_validation() => StatusCode::BAD_REQUEST,
            GatewayError::Chain(_) => StatusCode::INTERNAL_SERVER_ERROR,
            GatewayError::RemoteFailure(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl From<JsonRejection> for GatewayError {
    fn from(rejection: JsonRejection) -> Self {
        GatewayError::MalformedBody(rejection.body_text())
    }
}

impl From<crypto_utils::CryptoError> for GatewayError {
    fn from(e: crypto_utils::CryptoError) -> Self {
        GatewayError::Chain(e.into())
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(kind = self.kind(), error = %self, "request failed");
        } else {
            tracing::info!(kind = self.kind(), error = %self, "request rejected");
        }

        let body = ErrorEnvelope {
            status: false,
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
