//! REST layer: axum handlers over the domain services.
//!
//! Every endpoint responds with the `ApiResponse` envelope. Expected domain
//! failures map to 404 (missing entity) or 400 (everything else); handlers
//! never panic on caller input.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};

use crate::domain::{DashboardService, DonorService, InventoryService, RequestService};
use crate::error::DomainError;
use crate::storage::{DonorStore, InventoryStore, RequestStore};
use shared::ApiResponse;

pub mod dashboard;
pub mod donors;
pub mod inventory;
pub mod requests;

/// Application state shared across handlers: one service per entity family,
/// all wired over the same stores.
#[derive(Clone)]
pub struct AppState {
    pub donors: DonorService,
    pub inventory: InventoryService,
    pub requests: RequestService,
    pub dashboard: DashboardService,
}

impl AppState {
    pub fn new() -> Self {
        let donor_store = std::sync::Arc::new(DonorStore::new());
        let inventory_store = std::sync::Arc::new(InventoryStore::new());
        let request_store = std::sync::Arc::new(RequestStore::new());

        let inventory = InventoryService::new(std::sync::Arc::clone(&inventory_store));
        AppState {
            donors: DonorService::new(std::sync::Arc::clone(&donor_store)),
            inventory: inventory.clone(),
            requests: RequestService::new(std::sync::Arc::clone(&request_store), inventory),
            dashboard: DashboardService::new(donor_store, inventory_store, request_store),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

/// Build the full application router, nested under `/api`.
pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route("/donors", post(donors::create).get(donors::list))
        .route("/donors/search", get(donors::search))
        .route("/donors/statistics", get(donors::statistics))
        .route("/donors/recent", get(donors::recent))
        .route("/donors/eligible", get(donors::eligible))
        .route("/donors/eligible/:group", get(donors::eligible_by_group))
        .route("/donors/email/:email", get(donors::by_email))
        .route("/donors/blood-group/:group", get(donors::by_blood_group))
        .route(
            "/donors/:id",
            get(donors::get_by_id).put(donors::update).delete(donors::remove),
        )
        .route("/donors/:id/donation-date", put(donors::update_donation_date))
        .route("/inventory", post(inventory::create).get(inventory::list))
        .route("/inventory/critical", get(inventory::critical))
        .route("/inventory/low-stock", get(inventory::low_stock))
        .route("/inventory/out-of-stock", get(inventory::out_of_stock))
        .route("/inventory/availability", get(inventory::availability))
        .route("/inventory/statistics", get(inventory::statistics))
        .route("/inventory/initialize", post(inventory::initialize))
        .route("/inventory/blood-group/:group", get(inventory::by_blood_group))
        .route(
            "/inventory/:id",
            get(inventory::get_by_id).delete(inventory::remove),
        )
        .route("/inventory/:id/add-units", put(inventory::add_units))
        .route("/inventory/:id/remove-units", put(inventory::remove_units))
        .route("/requests", post(requests::create).get(requests::list))
        .route("/requests/pending", get(requests::pending))
        .route("/requests/emergency", get(requests::emergency))
        .route("/requests/recent", get(requests::recent))
        .route("/requests/overdue", get(requests::overdue))
        .route("/requests/search", get(requests::search))
        .route("/requests/statistics", get(requests::statistics))
        .route(
            "/requests/statistics/blood-groups",
            get(requests::blood_group_statistics),
        )
        .route("/requests/status/:status", get(requests::by_status))
        .route("/requests/email/:email", get(requests::by_email))
        .route("/requests/blood-group/:group", get(requests::by_blood_group))
        .route(
            "/requests/:id",
            get(requests::get_by_id).delete(requests::remove),
        )
        .route("/requests/:id/status", put(requests::update_status))
        .route("/dashboard/stats", get(dashboard::stats))
        .route("/dashboard/health", get(dashboard::health));

    Router::new().nest("/api", api).with_state(state)
}

/// Map a domain failure to a status code and the error envelope.
pub(crate) fn error_response(err: DomainError) -> Response {
    let status = match err {
        DomainError::NotFound { .. } => StatusCode::NOT_FOUND,
        _ => StatusCode::BAD_REQUEST,
    };
    (status, Json(ApiResponse::<()>::error(err.to_string()))).into_response()
}

/// 400 with the envelope, for malformed path parameters.
pub(crate) fn bad_request(message: impl Into<String>) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ApiResponse::<()>::error(message)),
    )
        .into_response()
}
