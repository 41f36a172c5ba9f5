//! # Attendance Listing Routes
//!
//! - `GET /api/attendance/records`: Paginated, filterable record listing
//! - `GET /api/attendance/records/{record_id}`: Retrieve a single record

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::NaiveDate;
use db::models::attendance_record::{
    AttendanceStatus, Column as RecordColumn, Entity as RecordEntity, RecordType,
};
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder};
use serde::{Deserialize, Serialize};
use util::state::AppState;
use validator::Validate;

use crate::auth::AuthUser;
use crate::response::ApiResponse;
use crate::routes::common::{AttendanceRecordResponse, format_validation_errors};

#[derive(Debug, Deserialize, Validate)]
pub struct ListRecordsQuery {
    #[validate(range(min = 1, message = "page must be at least 1"))]
    pub page: Option<u64>,
    #[validate(range(min = 1, max = 100, message = "per_page must be between 1 and 100"))]
    pub per_page: Option<u64>,
    pub schedule_id: Option<i64>,
    pub subject_actor_id: Option<i64>,
    pub record_type: Option<RecordType>,
    pub status: Option<AttendanceStatus>,
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
pub struct RecordsListResponse {
    pub records: Vec<AttendanceRecordResponse>,
    pub page: u64,
    pub per_page: u64,
    pub total: u64,
}

/// GET /api/attendance/records
///
/// Retrieve a paginated list of attendance records with optional filtering.
/// Requires a staff token.
///
/// ### Query Parameters
/// - `page` (optional): Page number (default: 1, min: 1)
/// - `per_page` (optional): Items per page (default: 20, min: 1, max: 100)
/// - `schedule_id` (optional): Restrict to one session
/// - `subject_actor_id` (optional): Restrict to one subject actor
/// - `record_type` (optional): `student` or `faculty`
/// - `status` (optional): `present`, `absent`, `late` or `excused`
/// - `date` (optional): One calendar day, `YYYY-MM-DD`
///
/// ### Responses
/// - `200 OK` with the page of records, newest capture first
/// - `401 Unauthorized` / `403 Forbidden`
/// - `422 Unprocessable Entity` on bad pagination values
pub async fn list_records(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<ListRecordsQuery>,
) -> impl IntoResponse {
    if !user.is_staff() {
        return (
            StatusCode::FORBIDDEN,
            Json(ApiResponse::<()>::error("Staff access required")),
        )
            .into_response();
    }
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

    let mut select = RecordEntity::find();
    if let Some(schedule_id) = query.schedule_id {
        select = select.filter(RecordColumn::ScheduleId.eq(schedule_id));
    }
    if let Some(subject_actor_id) = query.subject_actor_id {
        select = select.filter(RecordColumn::SubjectActorId.eq(subject_actor_id));
    }
    if let Some(record_type) = query.record_type {
        select = select.filter(RecordColumn::RecordType.eq(record_type));
    }
    if let Some(status) = query.status {
        select = select.filter(RecordColumn::Status.eq(status));
    }
    if let Some(date) = query.date {
        select = select.filter(RecordColumn::Date.eq(date));
    }

    let paginator = select
        .order_by_desc(RecordColumn::CapturedAt)
        .paginate(state.db(), per_page);

    let total = match paginator.num_items().await {
        Ok(total) => total,
        Err(e) => {
            tracing::error!(error = %e, "failed to count attendance records");
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

    match paginator.fetch_page(page - 1).await {
        Ok(records) => (
            StatusCode::OK,
            Json(ApiResponse::success(
                RecordsListResponse {
                    records: records.into_iter().map(Into::into).collect(),
                    page,
                    per_page,
                    total,
                },
                "Attendance records retrieved",
            )),
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "failed to list attendance records");
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

/// GET /api/attendance/records/{record_id}
///
/// Retrieve a single attendance record by id. Requires a staff token.
///
/// ### Responses
/// - `200 OK` with the record
/// - `404 Not Found` if no such record exists
pub async fn get_record(
    State(state): State<AppState>,
    user: AuthUser,
    Path(record_id): Path<i64>,
) -> impl IntoResponse {
    if !user.is_staff() {
        return (
            StatusCode::FORBIDDEN,
            Json(ApiResponse::<()>::error("Staff access required")),
        )
            .into_response();
    }

    match RecordEntity::find_by_id(record_id).one(state.db()).await {
        Ok(Some(record)) => (
            StatusCode::OK,
            Json(ApiResponse::<AttendanceRecordResponse>::success(
                record.into(),
                "Attendance record retrieved",
            )),
        )
            .into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::<()>::error("Attendance record not found")),
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, record_id, "failed to fetch attendance record");
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
