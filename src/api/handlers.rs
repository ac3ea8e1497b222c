//! HTTP endpoint handlers

use std::sync::Arc;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use tracing::{error, info, warn};

use crate::{rooms::RoomId, state::AppState};
use super::responses::{ApiResponse, HealthResponse, RoomsResponse, StatusResponse};

/// Handle GET /status - Return what the kiosk shows right now
pub async fn status_handler(State(state): State<Arc<AppState>>) -> Result<Json<StatusResponse>, StatusCode> {
    let display = match state.get_display_state() {
        Ok(d) => d,
        Err(e) => {
            error!("Failed to get display state: {}", e);
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    let countdown = match state.get_countdown() {
        Ok(c) => c,
        Err(e) => {
            error!("Failed to get countdown state: {}", e);
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    Ok(Json(StatusResponse::new(display, countdown, &state.catalog, state.get_uptime())))
}

/// Handle GET /rooms - List selectable rooms
pub async fn rooms_handler(State(state): State<Arc<AppState>>) -> Json<RoomsResponse> {
    Json(RoomsResponse {
        selected: state.selected_room(),
        rooms: state.catalog.rooms().to_vec(),
    })
}

/// Handle POST /room/:room_id - Switch the displayed room
pub async fn select_room_handler(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<RoomId>,
) -> (StatusCode, Json<ApiResponse>) {
    match state.select_room(room_id) {
        Ok(true) => {
            info!("Room endpoint called - switched to room {}", room_id);
            (
                StatusCode::OK,
                Json(ApiResponse::ok(format!("Switched to {}", state.catalog.label(room_id)))),
            )
        }
        Ok(false) => (
            StatusCode::OK,
            Json(ApiResponse::ok(format!("{} already selected", state.catalog.label(room_id)))),
        ),
        Err(e) => {
            warn!("Rejected room selection: {}", e);
            (StatusCode::NOT_FOUND, Json(ApiResponse::error(e)))
        }
    }
}

/// Handle POST /refresh - Re-resolve the current room now
pub async fn refresh_handler(State(state): State<Arc<AppState>>) -> Json<ApiResponse> {
    state.request_refresh();
    Json(ApiResponse::ok("Refresh requested".to_string()))
}

/// Handle POST /alert/dismiss - Close the completion alert
pub async fn dismiss_alert_handler(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>, StatusCode> {
    match state.dismiss_alert() {
        Ok(true) => Ok(Json(ApiResponse::ok("Alert dismissed".to_string()))),
        Ok(false) => Ok(Json(ApiResponse::ok("No alert showing".to_string()))),
        Err(e) => {
            error!("Failed to dismiss alert: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
