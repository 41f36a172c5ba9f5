//! # Device Update Routes
//!
//! - `PUT /api/devices/{device_id}`: Update metadata or rotate the credential

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use db::models::nfc_device::{Entity as DeviceEntity, Location};
use sea_orm::{ActiveModelTrait, EntityTrait, IntoActiveModel, Set};
use serde::Deserialize;
use util::{config, state::AppState};
use validator::Validate;

use crate::response::ApiResponse;
use crate::routes::common::format_validation_errors;
use crate::routes::devices::common::{DeviceResponse, DeviceWithKeyResponse};

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateDeviceRequest {
    #[validate(length(min = 1, max = 100, message = "name must be 1 to 100 characters"))]
    pub name: Option<String>,
    pub location: Option<Location>,
    pub assigned_college_id: Option<i64>,
    pub assigned_department_id: Option<i64>,
    pub is_active: Option<bool>,
    /// When true a fresh API key is minted and returned once.
    pub rotate_api_key: Option<bool>,
}

/// PUT /api/devices/{device_id}
///
/// Updates a device's metadata and optionally rotates its API key. Only
/// provided fields change. Admin-only.
///
/// ### Request Body
/// ```json
/// {
///   "name": "Lab reader (rear door)",
///   "rotate_api_key": true
/// }
/// ```
///
/// ### Response: 200 OK
/// - JSON body with the updated device; includes the new `api_key` only
///   when it was rotated
///
/// ### Errors
/// - 404 Not Found — no such device
/// - 422 Unprocessable Entity — validation failure
pub async fn update_device(
    State(state): State<AppState>,
    Path(device_id): Path<i64>,
    Json(req): Json<UpdateDeviceRequest>,
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
            return internal_error();
        }
    };

    // Re-pointing a device at a department gets the same check as
    // registration.
    if let Some(dept_id) = req.assigned_department_id {
        let dept = db::models::department::Entity::find_by_id(dept_id)
            .one(state.db())
            .await;
        match dept {
            Ok(Some(d)) if d.is_active => {}
            Ok(_) => {
                return (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    Json(ApiResponse::<()>::error_kind(
                        "validation_error",
                        "Assigned department not found or inactive",
                    )),
                )
                    .into_response();
            }
            Err(e) => {
                tracing::error!(error = %e, "department lookup failed");
                return internal_error();
            }
        }
    }

    let mut active = device.into_active_model();
    if let Some(name) = req.name {
        active.name = Set(name);
    }
    if let Some(location) = req.location {
        active.location = Set(location);
    }
    if let Some(college_id) = req.assigned_college_id {
        active.assigned_college_id = Set(Some(college_id));
    }
    if let Some(dept_id) = req.assigned_department_id {
        active.assigned_department_id = Set(Some(dept_id));
    }
    if let Some(is_active) = req.is_active {
        active.is_active = Set(is_active);
    }
    active.updated_at = Set(chrono::Utc::now());

    let updated = match active.update(state.db()).await {
        Ok(updated) => updated,
        Err(e) => {
            tracing::error!(error = %e, device_id, "failed to update device");
            return internal_error();
        }
    };

    if req.rotate_api_key.unwrap_or(false) {
        match updated
            .rotate_key(state.db(), config::device_key_validity_days())
            .await
        {
            Ok(rotated) => {
                let api_key = rotated.api_key.clone();
                (
                    StatusCode::OK,
                    Json(ApiResponse::success(
                        DeviceWithKeyResponse {
                            device: rotated.into(),
                            api_key,
                        },
                        "Device updated and credential rotated",
                    )),
                )
                    .into_response()
            }
            Err(e) => {
                tracing::error!(error = %e, device_id, "failed to rotate device key");
                internal_error()
            }
        }
    } else {
        (
            StatusCode::OK,
            Json(ApiResponse::<DeviceResponse>::success(
                updated.into(),
                "Device updated",
            )),
        )
            .into_response()
    }
}

fn internal_error() -> axum::response::Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ApiResponse::<()>::error_kind(
            "internal_error",
            "An internal error occurred",
        )),
    )
        .into_response()
}
