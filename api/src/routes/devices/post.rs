//! # Device Registration Routes
//!
//! - `POST /api/devices`: Register an NFC reader
//!
//! All routes require admin privileges.

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use db::models::nfc_device::{Location, Model as DeviceModel};
use sea_orm::DbErr;
use serde::Deserialize;
use util::{config, state::AppState};
use validator::Validate;

use crate::auth::AuthUser;
use crate::response::ApiResponse;
use crate::routes::common::format_validation_errors;
use crate::routes::devices::common::DeviceWithKeyResponse;

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterDeviceRequest {
    #[validate(length(min = 7, max = 21, message = "device_id must look like NFC-001"))]
    pub device_id: String,
    #[validate(length(min = 1, max = 100, message = "name must be 1 to 100 characters"))]
    pub name: String,
    pub location: Location,
    pub assigned_college_id: Option<i64>,
    pub assigned_department_id: Option<i64>,
}

/// POST /api/devices
///
/// Registers a new NFC reader and mints its API key. The key appears in this
/// response only; it cannot be read back later, only rotated.
///
/// ### Request Body
/// ```json
/// {
///   "device_id": "NFC-001",
///   "name": "Main gate reader",
///   "location": "main_gate",
///   "assigned_department_id": 3
/// }
/// ```
///
/// ### Response: 201 Created
/// - JSON body with the device and its one-time visible `api_key`
///
/// ### Errors
/// - 409 Conflict — a device with this id already exists
/// - 422 Unprocessable Entity — validation failure, bad id format, or
///   unknown/inactive assigned department
pub async fn register_device(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<RegisterDeviceRequest>,
) -> impl IntoResponse {
    if let Err(e) = req.validate() {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ApiResponse::<()>::error_kind(
                "validation_error",
                format_validation_errors(&e),
            )),
        )
            .into_response();
    }

    match DeviceModel::register(
        state.db(),
        &req.device_id,
        &req.name,
        req.location,
        req.assigned_college_id,
        req.assigned_department_id,
        user.0.sub,
        config::device_key_validity_days(),
    )
    .await
    {
        Ok(device) => {
            let api_key = device.api_key.clone();
            (
                StatusCode::CREATED,
                Json(ApiResponse::success(
                    DeviceWithKeyResponse {
                        device: device.into(),
                        api_key,
                    },
                    "Device registered",
                )),
            )
                .into_response()
        }
        Err(DbErr::Custom(msg)) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ApiResponse::<()>::error_kind("validation_error", msg)),
        )
            .into_response(),
        Err(e) if e.to_string().contains("UNIQUE constraint failed") => (
            StatusCode::CONFLICT,
            Json(ApiResponse::<()>::error(
                "A device with this id already exists",
            )),
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "device registration failed");
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
