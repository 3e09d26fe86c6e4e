//! Blood unit ledger endpoints.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::info;

use shared::{ApiResponse, BloodGroup, CreateInventoryRequest, UnitsUpdateRequest};

use super::{bad_request, error_response, AppState};

pub async fn create(
    State(state): State<AppState>,
    Json(request): Json<CreateInventoryRequest>,
) -> Response {
    info!("POST /api/inventory - blood group: {}", request.blood_group);
    match state.inventory.create(request) {
        Ok(record) => (
            StatusCode::CREATED,
            Json(ApiResponse::with_message(
                "Blood inventory created successfully",
                record,
            )),
        )
            .into_response(),
        Err(err) => error_response(err),
    }
}

pub async fn list(State(state): State<AppState>) -> Response {
    info!("GET /api/inventory");
    Json(ApiResponse::success(state.inventory.list())).into_response()
}

pub async fn get_by_id(State(state): State<AppState>, Path(id): Path<i64>) -> Response {
    info!("GET /api/inventory/{}", id);
    match state.inventory.get_by_id(id) {
        Ok(record) => Json(ApiResponse::success(record)).into_response(),
        Err(err) => error_response(err),
    }
}

pub async fn by_blood_group(
    State(state): State<AppState>,
    Path(group): Path<String>,
) -> Response {
    info!("GET /api/inventory/blood-group/{}", group);
    let group = match group.parse::<BloodGroup>() {
        Ok(group) => group,
        Err(message) => return bad_request(message),
    };
    match state.inventory.get_by_group(group) {
        Ok(record) => Json(ApiResponse::success(record)).into_response(),
        Err(err) => error_response(err),
    }
}

pub async fn add_units(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<UnitsUpdateRequest>,
) -> Response {
    info!("PUT /api/inventory/{}/add-units - units: {}", id, request.units);
    match state.inventory.add_units_by_id(id, request) {
        Ok(record) => Json(ApiResponse::with_message(
            "Units added successfully",
            record,
        ))
        .into_response(),
        Err(err) => error_response(err),
    }
}

pub async fn remove_units(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<UnitsUpdateRequest>,
) -> Response {
    info!(
        "PUT /api/inventory/{}/remove-units - units: {}",
        id, request.units
    );
    match state.inventory.remove_units_by_id(id, request) {
        Ok(record) => Json(ApiResponse::with_message(
            "Units removed successfully",
            record,
        ))
        .into_response(),
        Err(err) => error_response(err),
    }
}

pub async fn remove(State(state): State<AppState>, Path(id): Path<i64>) -> Response {
    info!("DELETE /api/inventory/{}", id);
    match state.inventory.delete(id) {
        Ok(()) => Json(ApiResponse::<()>::with_message(
            "Blood inventory deleted successfully",
            (),
        ))
        .into_response(),
        Err(err) => error_response(err),
    }
}

pub async fn critical(State(state): State<AppState>) -> Response {
    info!("GET /api/inventory/critical");
    Json(ApiResponse::success(state.inventory.critical_shortages())).into_response()
}

pub async fn low_stock(State(state): State<AppState>) -> Response {
    info!("GET /api/inventory/low-stock");
    Json(ApiResponse::success(state.inventory.low_stock())).into_response()
}

pub async fn out_of_stock(State(state): State<AppState>) -> Response {
    info!("GET /api/inventory/out-of-stock");
    Json(ApiResponse::success(state.inventory.out_of_stock())).into_response()
}

pub async fn availability(State(state): State<AppState>) -> Response {
    info!("GET /api/inventory/availability");
    Json(ApiResponse::success(state.inventory.availability())).into_response()
}

pub async fn statistics(State(state): State<AppState>) -> Response {
    info!("GET /api/inventory/statistics");
    Json(ApiResponse::success(state.inventory.statistics())).into_response()
}

pub async fn initialize(State(state): State<AppState>) -> Response {
    info!("POST /api/inventory/initialize");
    match state.inventory.initialize_groups() {
        Ok(()) => Json(ApiResponse::with_message(
            "Blood inventory initialized for all blood groups",
            state.inventory.list(),
        ))
        .into_response(),
        Err(err) => error_response(err),
    }
}
