//! API error types with HTTP response mapping.
//!
//! Every checkout failure class maps to its own status code and a
//! user-facing message; raw transport detail is logged server-side and
//! never echoed to the buyer.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use checkout::{CheckoutError, PaymentBackendError};
use domain::DomainError;

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// Resource not found.
    NotFound(String),
    /// Bad request from the client.
    BadRequest(String),
    /// Checkout orchestration error.
    Checkout(CheckoutError),
    /// Internal server error.
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::NotFound(msg) => simple(StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => simple(StatusCode::BAD_REQUEST, msg),
            ApiError::Checkout(err) => checkout_error_to_response(err),
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "internal server error");
                simple(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Something went wrong".to_string(),
                )
            }
        }
    }
}

fn simple(status: StatusCode, message: String) -> Response {
    let body = serde_json::json!({ "error": message });
    (status, axum::Json(body)).into_response()
}

fn checkout_error_to_response(err: CheckoutError) -> Response {
    match err {
        CheckoutError::AttemptNotFound(id) => simple(
            StatusCode::NOT_FOUND,
            format!("Checkout attempt {id} not found"),
        ),
        CheckoutError::EmptyCart => simple(StatusCode::BAD_REQUEST, "Your cart is empty".to_string()),
        CheckoutError::Address(address_err) => {
            let body = serde_json::json!({
                "error": "Please fill all address fields",
                "missing": address_err.missing,
            });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(body)).into_response()
        }
        CheckoutError::PaymentInProgress => simple(
            StatusCode::CONFLICT,
            "A payment is already being processed".to_string(),
        ),
        CheckoutError::GatewayUnavailable(detail) => {
            tracing::warn!(%detail, "gateway unavailable");
            simple(
                StatusCode::SERVICE_UNAVAILABLE,
                "Payment gateway not available. Please try again.".to_string(),
            )
        }
        CheckoutError::Gateway(detail) => {
            tracing::error!(%detail, "gateway error");
            simple(
                StatusCode::BAD_GATEWAY,
                "Payment gateway error. Please try again.".to_string(),
            )
        }
        CheckoutError::Backend(backend_err) => backend_error_to_response(backend_err),
        CheckoutError::MisconfiguredGateway { key_id } => {
            tracing::error!(%key_id, "gateway key misconfigured");
            simple(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Payment gateway configuration error".to_string(),
            )
        }
        CheckoutError::VerificationFailed { reason } => {
            tracing::error!(%reason, "payment verification failed");
            simple(
                StatusCode::PAYMENT_REQUIRED,
                "Payment verification failed. If money was debited, please contact support."
                    .to_string(),
            )
        }
        CheckoutError::OrderPlacementFailed { reason } => {
            tracing::error!(%reason, "order placement failed after settlement");
            simple(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Payment succeeded but order placement failed. Please contact support."
                    .to_string(),
            )
        }
        CheckoutError::Cart(detail) => {
            tracing::warn!(%detail, "cart service error");
            simple(
                StatusCode::BAD_GATEWAY,
                "Failed to load your cart. Please try again.".to_string(),
            )
        }
        CheckoutError::Domain(domain_err) => domain_error_to_response(domain_err),
    }
}

fn backend_error_to_response(err: PaymentBackendError) -> Response {
    match &err {
        PaymentBackendError::InsufficientStock(_) | PaymentBackendError::InvalidCart(_) => {
            simple(StatusCode::CONFLICT, err.to_string())
        }
        PaymentBackendError::Unauthorized => simple(
            StatusCode::UNAUTHORIZED,
            "Please login to continue".to_string(),
        ),
        PaymentBackendError::Network(detail) => {
            tracing::warn!(%detail, "payment backend unreachable");
            simple(
                StatusCode::BAD_GATEWAY,
                "Could not reach the payment service. Please try again.".to_string(),
            )
        }
        PaymentBackendError::Rejected(_) => simple(StatusCode::BAD_REQUEST, err.to_string()),
    }
}

fn domain_error_to_response(err: DomainError) -> Response {
    match &err {
        DomainError::Attempt(_) => simple(StatusCode::CONFLICT, err.to_string()),
        DomainError::AggregateNotFound { .. } => simple(StatusCode::NOT_FOUND, err.to_string()),
        other => {
            tracing::error!(error = %other, "domain error");
            simple(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Something went wrong".to_string(),
            )
        }
    }
}

impl From<CheckoutError> for ApiError {
    fn from(err: CheckoutError) -> Self {
        ApiError::Checkout(err)
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        ApiError::Checkout(CheckoutError::Domain(err))
    }
}
