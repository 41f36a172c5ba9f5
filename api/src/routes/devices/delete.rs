//! # Device Deactivation Routes
//!
//! - `DELETE /api/devices/{device_id}`: Deactivate a device
//!
//! Devices are never hard-deleted; their recordings keep a valid reference
//! and the device can be reactivated via `PUT`.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use db::models::nfc_device::Entity as DeviceEntity;
use sea_orm::EntityTrait;
use util::state::AppState;

use crate::response::ApiResponse;
use crate::routes::devices::common::DeviceResponse;

/// DELETE /api/devices/{device_id}
///
/// Deactivates a device. A deactivated device fails authentication on every
/// subsequent capture attempt. Admin-only.
///
/// ### Response: 200 OK
/// - JSON body with the deactivated device
///
/// ### Errors
/// - 404 Not Found — no such device
pub async fn deactivate_device(
    State(state): State<AppState>,
    Path(device_id): Path<i64>,
) -> impl IntoResponse {
    let device = match DeviceEntity::find_by_id(device_id).one(state.db()).await {
        Ok(Some(device)) => device,
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(ApiResponse::<()>::error("Device not found")),
            )
                .into_response();
        }
        Err(e) => {
            tracing::error!(error = %e, device_id, "failed to fetch device");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::<()>::error_kind(
                    "internal_error",
                    "An internal error occurred",
                )),
            )
                .into_response();
        }
    };

    match device.deactivate(state.db()).await {
        Ok(device) => (
            StatusCode::OK,
            Json(ApiResponse::<DeviceResponse>::success(
                device.into(),
                "Device deactivated",
            )),
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, device_id, "failed to deactivate device");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::<()>::error_kind(
                    "internal_error",
                    "An internal error occurred",
                )),
            )
                .into_response()
        }
    }
}
