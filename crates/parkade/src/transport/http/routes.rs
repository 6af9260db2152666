//! HTTP route handlers.
//!
//! Parking and release take spot locks and may sleep during admission
//! backoff, so those handlers run the service call on the blocking pool.

use std::sync::Arc;

use axum::{
    Router,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post, put},
};
use serde::{Deserialize, Serialize};

use crate::lot::LotError;
use crate::panel::{AdmissionFailure, ExitError};
use crate::service::{ParkError, ParkingService};
use crate::strategy::StrategyKind;
use crate::vehicle::VehicleType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HealthResponse {
    Available,
    Full,
}

#[derive(Debug, Serialize)]
pub struct HealthCheckResponse {
    pub status: HealthResponse,
    pub active_tickets: usize,
}

#[derive(Debug, Deserialize)]
pub struct ParkRequest {
    pub license_number: String,
    pub vehicle_type: VehicleType,
}

#[derive(Debug, Deserialize)]
pub struct MaintenanceRequest {
    pub under_maintenance: bool,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct StrategyRequest {
    pub strategy: StrategyKind,
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(serde_json::json!({ "error": message.into() })),
    )
        .into_response()
}

/// Run `f` against the service on the blocking pool.
async fn blocking<T, F>(service: Arc<ParkingService>, f: F) -> Result<T, Response>
where
    F: FnOnce(&ParkingService) -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(move || f(&service))
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Blocking service call failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal error")
        })
}

fn park_error_status(err: &ParkError) -> StatusCode {
    match err {
        ParkError::InvalidVehicle(_) => StatusCode::BAD_REQUEST,
        ParkError::NotAdmitted(AdmissionFailure::Registration(_)) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
        ParkError::NotAdmitted(_) => StatusCode::CONFLICT,
    }
}

fn exit_error_status(err: &ExitError) -> StatusCode {
    match err {
        ExitError::InvalidTicket => StatusCode::BAD_REQUEST,
        ExitError::AlreadyReleasedOrUnknown(_) => StatusCode::NOT_FOUND,
        ExitError::PaymentFailed { .. } => StatusCode::PAYMENT_REQUIRED,
        ExitError::SpotNotFound(_) => StatusCode::INTERNAL_SERVER_ERROR,
        ExitError::SpotAlreadyFree(_) | ExitError::SpotOccupantMismatch { .. } => {
            StatusCode::CONFLICT
        }
        ExitError::Cost(_) => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

async fn health_check(State(service): State<Arc<ParkingService>>) -> Json<HealthCheckResponse> {
    let status = service.status();
    Json(HealthCheckResponse {
        status: if status.full {
            HealthResponse::Full
        } else {
            HealthResponse::Available
        },
        active_tickets: status.active_tickets,
    })
}

async fn floors(State(service): State<Arc<ParkingService>>) -> Response {
    Json(service.status()).into_response()
}

async fn set_floor_maintenance(
    State(service): State<Arc<ParkingService>>,
    Path(floor_id): Path<String>,
    payload: Result<Json<MaintenanceRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match payload {
        Ok(request) => request,
        Err(rejection) => return error_response(StatusCode::BAD_REQUEST, rejection.body_text()),
    };

    match service.set_floor_maintenance(&floor_id, request.under_maintenance) {
        Ok(status) => Json(status).into_response(),
        Err(e @ LotError::FloorNotFound(_)) => error_response(StatusCode::NOT_FOUND, e.to_string()),
        Err(e) => error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    }
}

async fn list_tickets(State(service): State<Arc<ParkingService>>) -> Response {
    let tickets = service.active_tickets();
    Json(tickets).into_response()
}

async fn create_ticket(
    State(service): State<Arc<ParkingService>>,
    payload: Result<Json<ParkRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match payload {
        Ok(request) => request,
        Err(rejection) => return error_response(StatusCode::BAD_REQUEST, rejection.body_text()),
    };

    let result = blocking(service, move |service| {
        service.park(&request.license_number, request.vehicle_type)
    })
    .await;

    match result {
        Ok(Ok(ticket)) => (StatusCode::CREATED, Json(ticket)).into_response(),
        Ok(Err(e)) => error_response(park_error_status(&e), e.to_string()),
        Err(response) => response,
    }
}

async fn get_ticket(
    State(service): State<Arc<ParkingService>>,
    Path(ticket_id): Path<String>,
) -> Response {
    match service.ticket(&ticket_id) {
        Some(ticket) => Json(ticket).into_response(),
        None => error_response(
            StatusCode::NOT_FOUND,
            format!("Ticket not found: {ticket_id}"),
        ),
    }
}

async fn release_ticket(
    State(service): State<Arc<ParkingService>>,
    Path(ticket_id): Path<String>,
) -> Response {
    let result = blocking(service, move |service| service.unpark(&ticket_id)).await;

    match result {
        Ok(Ok(receipt)) => Json(receipt).into_response(),
        Ok(Err(e)) => error_response(exit_error_status(&e), e.to_string()),
        Err(response) => response,
    }
}

async fn change_strategy(
    State(service): State<Arc<ParkingService>>,
    payload: Result<Json<StrategyRequest>, JsonRejection>,
) -> Response {
    match payload {
        Ok(Json(request)) => {
            service.change_strategy(request.strategy);
            Json(request).into_response()
        }
        Err(rejection) => error_response(StatusCode::BAD_REQUEST, rejection.body_text()),
    }
}

async fn shutdown(State(service): State<Arc<ParkingService>>) -> impl IntoResponse {
    tracing::info!("Shutdown requested via HTTP");
    service.trigger_shutdown();
    (StatusCode::OK, Json(serde_json::json!({})))
}

pub fn routes(service: Arc<ParkingService>) -> Router {
    Router::new()
        .route("/health-check", get(health_check))
        .route("/floors", get(floors))
        .route("/floors/{id}/maintenance", put(set_floor_maintenance))
        .route("/tickets", get(list_tickets).post(create_ticket))
        .route("/tickets/{id}", get(get_ticket).delete(release_ticket))
        .route("/strategy", put(change_strategy))
        .route("/shutdown", post(shutdown))
        .with_state(service)
}
