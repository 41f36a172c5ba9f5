//! # Device Listing Routes
//!
//! - `GET /api/devices`: List registered devices
//! - `GET /api/devices/{device_id}`: Fetch one device

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use db::models::nfc_device::{Column as DeviceColumn, Entity as DeviceEntity, Location};
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder};
use serde::{Deserialize, Serialize};
use util::state::AppState;
use validator::Validate;

use crate::response::ApiResponse;
use crate::routes::common::format_validation_errors;
use crate::routes::devices::common::DeviceResponse;

#[derive(Debug, Deserialize, Validate)]
pub struct ListDevicesQuery {
    #[validate(range(min = 1, message = "page must be at least 1"))]
    pub page: Option<u64>,
    #[validate(range(min = 1, max = 100, message = "per_page must be between 1 and 100"))]
    pub per_page: Option<u64>,
    pub location: Option<Location>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct DevicesListResponse {
    pub devices: Vec<DeviceResponse>,
    pub page: u64,
    pub per_page: u64,
    pub total: u64,
}

/// GET /api/devices
///
/// Retrieve a paginated list of registered devices. Admin-only.
///
/// ### Query Parameters
/// - `page` (optional): Page number (default: 1)
/// - `per_page` (optional): Items per page (default: 20, max: 100)
/// - `location` (optional): Filter by installed location
/// - `is_active` (optional): Filter by lifecycle state
pub async fn list_devices(
    State(state): State<AppState>,
    Query(query): Query<ListDevicesQuery>,
) -> impl IntoResponse {
    if let Err(e) = query.validate() {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ApiResponse::<()>::error_kind(
                "validation_error",
                format_validation_errors(&e),
            )),
        )
            .into_response();
    }

    let page = query.page.unwrap_or(1);
    let per_page = query.per_page.unwrap_or(20);

    let mut select = DeviceEntity::find();
    if let Some(location) = query.location {
        select = select.filter(DeviceColumn::Location.eq(location));
    }
    if let Some(is_active) = query.is_active {
        select = select.filter(DeviceColumn::IsActive.eq(is_active));
    }

    let paginator = select
        .order_by_asc(DeviceColumn::DeviceId)
        .paginate(state.db(), per_page);

    let total = match paginator.num_items().await {
        Ok(total) => total,
        Err(e) => {
            tracing::error!(error = %e, "failed to count devices");
            return internal_error();
        }
    };

    match paginator.fetch_page(page - 1).await {
        Ok(devices) => (
            StatusCode::OK,
            Json(ApiResponse::success(
                DevicesListResponse {
                    devices: devices.into_iter().map(Into::into).collect(),
                    page,
                    per_page,
                    total,
                },
                "Devices retrieved",
            )),
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "failed to list devices");
            internal_error()
        }
    }
}

/// GET /api/devices/{device_id}
///
/// Retrieve a single device by numeric id. Admin-only.
pub async fn get_device(
    State(state): State<AppState>,
    Path(device_id): Path<i64>,
) -> impl IntoResponse {
    match DeviceEntity::find_by_id(device_id).one(state.db()).await {
        Ok(Some(device)) => (
            StatusCode::OK,
            Json(ApiResponse::<DeviceResponse>::success(
                device.into(),
                "Device retrieved",
            )),
        )
            .into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::<()>::error("Device not found")),
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, device_id, "failed to fetch device");
            internal_error()
        }
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
