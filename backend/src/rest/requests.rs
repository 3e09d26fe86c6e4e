//! Blood request lifecycle endpoints.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use tracing::info;

use shared::{ApiResponse, BloodGroup, CreateBloodRequest, RequestStatus, StatusUpdateRequest};

use super::{bad_request, error_response, AppState};

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub hospital: Option<String>,
    pub patient: Option<String>,
}

pub async fn create(
    State(state): State<AppState>,
    Json(request): Json<CreateBloodRequest>,
) -> Response {
    info!(
        "POST /api/requests - requester: {}, blood group: {}",
        request.requester_name, request.blood_group
    );
    match state.requests.submit(request) {
        Ok(record) => (
            StatusCode::CREATED,
            Json(ApiResponse::with_message(
                "Blood request submitted successfully",
                record,
            )),
        )
            .into_response(),
        Err(err) => error_response(err),
    }
}

pub async fn list(State(state): State<AppState>) -> Response {
    info!("GET /api/requests");
    Json(ApiResponse::success(state.requests.list())).into_response()
}

pub async fn get_by_id(State(state): State<AppState>, Path(id): Path<i64>) -> Response {
    info!("GET /api/requests/{}", id);
    match state.requests.get(id) {
        Ok(record) => Json(ApiResponse::success(record)).into_response(),
        Err(err) => error_response(err),
    }
}

pub async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(update): Json<StatusUpdateRequest>,
) -> Response {
    info!("PUT /api/requests/{}/status - target: {}", id, update.status);
    match state.requests.transition(id, update) {
        Ok(record) => Json(ApiResponse::with_message(
            "Request status updated successfully",
            record,
        ))
        .into_response(),
        Err(err) => error_response(err),
    }
}

pub async fn remove(State(state): State<AppState>, Path(id): Path<i64>) -> Response {
    info!("DELETE /api/requests/{}", id);
    match state.requests.delete(id) {
        Ok(()) => Json(ApiResponse::<()>::with_message(
            "Blood request deleted successfully",
            (),
        ))
        .into_response(),
        Err(err) => error_response(err),
    }
}

pub async fn by_status(State(state): State<AppState>, Path(status): Path<String>) -> Response {
    info!("GET /api/requests/status/{}", status);
    match status.parse::<RequestStatus>() {
        Ok(status) => Json(ApiResponse::success(state.requests.by_status(status))).into_response(),
        Err(message) => bad_request(message),
    }
}

pub async fn pending(State(state): State<AppState>) -> Response {
    info!("GET /api/requests/pending");
    Json(ApiResponse::success(state.requests.pending())).into_response()
}

pub async fn emergency(State(state): State<AppState>) -> Response {
    info!("GET /api/requests/emergency");
    Json(ApiResponse::success(state.requests.emergency())).into_response()
}

pub async fn by_email(State(state): State<AppState>, Path(email): Path<String>) -> Response {
    info!("GET /api/requests/email/{}", email);
    Json(ApiResponse::success(state.requests.by_email(&email))).into_response()
}

pub async fn by_blood_group(
    State(state): State<AppState>,
    Path(group): Path<String>,
) -> Response {
    info!("GET /api/requests/blood-group/{}", group);
    match group.parse::<BloodGroup>() {
        Ok(group) => {
            Json(ApiResponse::success(state.requests.by_blood_group(group))).into_response()
        }
        Err(message) => bad_request(message),
    }
}

pub async fn recent(State(state): State<AppState>) -> Response {
    info!("GET /api/requests/recent");
    Json(ApiResponse::success(state.requests.recent())).into_response()
}

pub async fn overdue(State(state): State<AppState>) -> Response {
    info!("GET /api/requests/overdue");
    Json(ApiResponse::success(state.requests.overdue_pending())).into_response()
}

pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Response {
    info!(
        "GET /api/requests/search - hospital: {:?}, patient: {:?}",
        params.hospital, params.patient
    );
    let results = state
        .requests
        .search(params.hospital.as_deref(), params.patient.as_deref());
    Json(ApiResponse::success(results)).into_response()
}

pub async fn statistics(State(state): State<AppState>) -> Response {
    info!("GET /api/requests/statistics");
    Json(ApiResponse::success(state.requests.statistics())).into_response()
}

pub async fn blood_group_statistics(State(state): State<AppState>) -> Response {
    info!("GET /api/requests/statistics/blood-groups");
    Json(ApiResponse::success(state.requests.blood_group_statistics())).into_response()
}
