//! Donor registry endpoints.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use tracing::info;

use shared::{
    ApiResponse, BloodGroup, CreateDonorRequest, DonationDateUpdate, UpdateDonorRequest,
};

use super::{bad_request, error_response, AppState};

pub async fn create(
    State(state): State<AppState>,
    Json(request): Json<CreateDonorRequest>,
) -> Response {
    info!("POST /api/donors - email: {}", request.email);
    match state.donors.create(request) {
        Ok(donor) => (
            StatusCode::CREATED,
            Json(ApiResponse::with_message(
                "Donor registered successfully",
                donor,
            )),
        )
            .into_response(),
        Err(err) => error_response(err),
    }
}

pub async fn list(State(state): State<AppState>) -> Response {
    info!("GET /api/donors");
    Json(ApiResponse::success(state.donors.list())).into_response()
}

pub async fn get_by_id(State(state): State<AppState>, Path(id): Path<i64>) -> Response {
    info!("GET /api/donors/{}", id);
    match state.donors.get(id) {
        Ok(donor) => Json(ApiResponse::success(donor)).into_response(),
        Err(err) => error_response(err),
    }
}

pub async fn by_email(State(state): State<AppState>, Path(email): Path<String>) -> Response {
    info!("GET /api/donors/email/{}", email);
    match state.donors.get_by_email(&email) {
        Ok(donor) => Json(ApiResponse::success(donor)).into_response(),
        Err(err) => error_response(err),
    }
}

pub async fn by_blood_group(
    State(state): State<AppState>,
    Path(group): Path<String>,
) -> Response {
    info!("GET /api/donors/blood-group/{}", group);
    match group.parse::<BloodGroup>() {
        Ok(group) => Json(ApiResponse::success(state.donors.by_blood_group(group))).into_response(),
        Err(message) => bad_request(message),
    }
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub name: String,
}

pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Response {
    info!("GET /api/donors/search - name: {}", params.name);
    Json(ApiResponse::success(state.donors.search_by_name(&params.name))).into_response()
}

pub async fn statistics(State(state): State<AppState>) -> Response {
    info!("GET /api/donors/statistics");
    Json(ApiResponse::success(state.donors.statistics())).into_response()
}

pub async fn recent(State(state): State<AppState>) -> Response {
    info!("GET /api/donors/recent");
    Json(ApiResponse::success(state.donors.recent())).into_response()
}

pub async fn eligible(State(state): State<AppState>) -> Response {
    info!("GET /api/donors/eligible");
    Json(ApiResponse::success(state.donors.eligible())).into_response()
}

pub async fn eligible_by_group(
    State(state): State<AppState>,
    Path(group): Path<String>,
) -> Response {
    info!("GET /api/donors/eligible/{}", group);
    match group.parse::<BloodGroup>() {
        Ok(group) => {
            Json(ApiResponse::success(state.donors.eligible_by_blood_group(group))).into_response()
        }
        Err(message) => bad_request(message),
    }
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<UpdateDonorRequest>,
) -> Response {
    info!("PUT /api/donors/{}", id);
    match state.donors.update(id, request) {
        Ok(donor) => Json(ApiResponse::with_message("Donor updated successfully", donor))
            .into_response(),
        Err(err) => error_response(err),
    }
}

pub async fn update_donation_date(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(update): Json<DonationDateUpdate>,
) -> Response {
    info!("PUT /api/donors/{}/donation-date", id);
    match state.donors.update_donation_date(id, update) {
        Ok(donor) => Json(ApiResponse::with_message(
            "Donation date updated successfully",
            donor,
        ))
        .into_response(),
        Err(err) => error_response(err),
    }
}

pub async fn remove(State(state): State<AppState>, Path(id): Path<i64>) -> Response {
    info!("DELETE /api/donors/{}", id);
    match state.donors.delete(id) {
        Ok(()) => {
            Json(ApiResponse::<()>::with_message("Donor deleted successfully", ())).into_response()
        }
        Err(err) => error_response(err),
    }
}
