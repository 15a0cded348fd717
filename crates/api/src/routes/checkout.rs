//! Checkout wizard endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use checkout::{
    CheckoutCoordinator, InMemoryCartService, InMemoryGatewayProvider, InMemoryOrderBackend,
    InMemoryPaymentBackend, PaymentResolution,
};
use common::AggregateId;
use domain::{AddressForm, Aggregate, BuyerId, CheckoutAttempt, PriceSummary};
use event_store::{EventStore, EventStoreExt};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// Shared application state accessible from all handlers.
pub struct AppState<S: EventStore> {
    pub coordinator: CheckoutCoordinator<
        S,
        InMemoryCartService,
        InMemoryPaymentBackend,
        InMemoryGatewayProvider,
        InMemoryOrderBackend,
    >,
    pub event_store: S,
}

// -- Request types --

#[derive(Deserialize)]
pub struct StartCheckoutRequest {
    /// Buyer UUID; generated when omitted.
    pub buyer_id: Option<String>,
}

#[derive(Deserialize, Default)]
pub struct AddressRequest {
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub address_line: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub pincode: String,
}

// -- Response types --

#[derive(Serialize)]
pub struct AttemptResponse {
    pub attempt_id: String,
    pub buyer_id: String,
    pub step: String,
    pub phase: String,
    pub processing_payment: bool,
    pub summary: Option<SummaryResponse>,
    pub address: Option<AddressResponse>,
    pub order_ref: Option<String>,
    pub last_failure: Option<String>,
}

#[derive(Serialize)]
pub struct SummaryResponse {
    pub subtotal_paise: i64,
    pub shipping_paise: i64,
    pub total_paise: i64,
    pub free_shipping: bool,
}

#[derive(Serialize)]
pub struct AddressResponse {
    pub full_name: String,
    pub phone: String,
    pub email: String,
    pub address_line: String,
    pub city: String,
    pub state: String,
    pub pincode: String,
}

#[derive(Serialize)]
pub struct PayResponse {
    pub outcome: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_ref: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[derive(Serialize)]
pub struct AttemptEventResponse {
    pub event_type: String,
    pub version: i64,
    pub timestamp: String,
}

fn summary_response(summary: PriceSummary) -> SummaryResponse {
    SummaryResponse {
        subtotal_paise: summary.subtotal.paise(),
        shipping_paise: summary.shipping.paise(),
        total_paise: summary.total.paise(),
        free_shipping: summary.is_free_shipping(),
    }
}

fn attempt_response(attempt: &CheckoutAttempt) -> AttemptResponse {
    AttemptResponse {
        attempt_id: attempt
            .id()
            .map(|id| id.to_string())
            .unwrap_or_default(),
        buyer_id: attempt
            .buyer_id()
            .map(|id| id.to_string())
            .unwrap_or_default(),
        step: attempt.step().to_string(),
        phase: attempt.phase().to_string(),
        processing_payment: attempt.processing_payment(),
        summary: attempt.summary().map(summary_response),
        address: attempt.address().map(|a| AddressResponse {
            full_name: a.full_name.clone(),
            phone: a.phone.clone(),
            email: a.email.clone(),
            address_line: a.address_line.clone(),
            city: a.city.clone(),
            state: a.state.clone(),
            pincode: a.pincode.clone(),
        }),
        order_ref: attempt.order_ref().map(str::to_string),
        last_failure: attempt.last_failure().map(str::to_string),
    }
}

fn parse_attempt_id(id: &str) -> Result<AggregateId, ApiError> {
    let uuid = uuid::Uuid::parse_str(id)
        .map_err(|e| ApiError::BadRequest(format!("Invalid attempt id: {e}")))?;
    Ok(AggregateId::from_uuid(uuid))
}

// -- Handlers --

/// POST /checkout — start a checkout attempt for a buyer.
#[tracing::instrument(skip(state, req))]
pub async fn start<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Json(req): Json<StartCheckoutRequest>,
) -> Result<(axum::http::StatusCode, Json<AttemptResponse>), ApiError> {
    let buyer_id = if let Some(ref id_str) = req.buyer_id {
        let uuid = uuid::Uuid::parse_str(id_str)
            .map_err(|e| ApiError::BadRequest(format!("Invalid buyer_id: {e}")))?;
        BuyerId::from_uuid(uuid)
    } else {
        BuyerId::new()
    };

    let attempt = state.coordinator.start_attempt(buyer_id).await?;

    Ok((
        axum::http::StatusCode::CREATED,
        Json(attempt_response(&attempt)),
    ))
}

/// GET /checkout/{id} — load an attempt's current status.
#[tracing::instrument(skip(state))]
pub async fn get<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<AttemptResponse>, ApiError> {
    let attempt_id = parse_attempt_id(&id)?;
    let attempt = state.coordinator.get_attempt(attempt_id).await?;
    Ok(Json(attempt_response(&attempt)))
}

/// POST /checkout/{id}/address — submit the shipping address and advance
/// to the payment step.
#[tracing::instrument(skip(state, req))]
pub async fn submit_address<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
    Json(req): Json<AddressRequest>,
) -> Result<Json<AttemptResponse>, ApiError> {
    let attempt_id = parse_attempt_id(&id)?;

    let mut form = AddressForm::new();
    form.set_full_name(req.full_name);
    form.set_phone(req.phone);
    form.set_email(req.email);
    form.set_address_line(req.address_line);
    form.set_city(req.city);
    form.set_state(req.state);
    form.set_pincode(req.pincode);

    let attempt = state.coordinator.confirm_address(attempt_id, &form).await?;
    Ok(Json(attempt_response(&attempt)))
}

/// POST /checkout/{id}/back — return to the address step.
#[tracing::instrument(skip(state))]
pub async fn back<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<AttemptResponse>, ApiError> {
    let attempt_id = parse_attempt_id(&id)?;
    let attempt = state.coordinator.return_to_address(attempt_id).await?;
    Ok(Json(attempt_response(&attempt)))
}

/// POST /checkout/{id}/pay — run one payment attempt end to end.
#[tracing::instrument(skip(state))]
pub async fn pay<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<PayResponse>, ApiError> {
    let attempt_id = parse_attempt_id(&id)?;

    let resolution = state.coordinator.pay(attempt_id).await?;

    let response = match resolution {
        PaymentResolution::Settled { order_ref } => PayResponse {
            outcome: "settled",
            order_ref: Some(order_ref),
            reason: None,
        },
        PaymentResolution::Declined { reason } => PayResponse {
            outcome: "declined",
            order_ref: None,
            reason: Some(reason),
        },
        PaymentResolution::Cancelled => PayResponse {
            outcome: "cancelled",
            order_ref: None,
            reason: Some("Payment cancelled".to_string()),
        },
        PaymentResolution::AlreadyResolved => PayResponse {
            outcome: "already_resolved",
            order_ref: None,
            reason: None,
        },
    };

    Ok(Json(response))
}

/// GET /checkout/{id}/events — the attempt's audit trail.
#[tracing::instrument(skip(state))]
pub async fn events<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<Vec<AttemptEventResponse>>, ApiError> {
    let attempt_id = parse_attempt_id(&id)?;

    // 404 for attempts that never existed; no need to replay the aggregate
    // just to render its history
    let exists = state
        .event_store
        .aggregate_exists(attempt_id)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    if !exists {
        return Err(ApiError::NotFound(format!(
            "Checkout attempt {attempt_id} not found"
        )));
    }

    let envelopes = state
        .event_store
        .get_events_for_aggregate(attempt_id)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    let events = envelopes
        .into_iter()
        .map(|e| AttemptEventResponse {
            event_type: e.event_type,
            version: e.version.as_i64(),
            timestamp: e.timestamp.to_rfc3339(),
        })
        .collect();

    Ok(Json(events))
}
