//! # Report Routes
//!
//! - `GET /api/reports/{kind}`: Run one of the four attendance aggregations
//!
//! Every report runs over an inclusive calendar-day range and returns
//! complete results or an error; a report that exceeds the operation
//! deadline yields `503` rather than a partial aggregation.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::NaiveDate;
use db::reports::{
    self, ReportRange, department_attendance_comparison, faculty_attendance_by_section,
    highest_absence_subjects, student_attendance_percentage,
};
use sea_orm::DbErr;
use serde::{Deserialize, Serialize};
use util::state::AppState;
use validator::Validate;

use crate::auth::AuthUser;
use crate::response::ApiResponse;
use crate::routes::common::{format_validation_errors, with_timeout};

pub const KIND_STUDENT_PERCENTAGE: &str = "student-attendance-percentage";
pub const KIND_HIGHEST_ABSENCE: &str = "highest-absence-subjects";
pub const KIND_FACULTY_BY_SECTION: &str = "faculty-attendance-by-section";
pub const KIND_DEPARTMENT_COMPARISON: &str = "department-attendance-comparison";

const DEFAULT_ABSENCE_LIMIT: usize = 10;

#[derive(Debug, Deserialize, Validate)]
pub struct ReportQuery {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub department_id: Option<i64>,
    pub section_id: Option<i64>,
    pub faculty_id: Option<i64>,
    #[validate(range(min = 1, max = 100, message = "limit must be between 1 and 100"))]
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum ReportRows {
    Students(Vec<reports::StudentAttendanceRow>),
    Subjects(Vec<reports::SubjectAbsenceRow>),
    FacultySections(Vec<reports::FacultySectionRow>),
    Departments(Vec<reports::DepartmentComparisonRow>),
}

/// GET /api/reports/{kind}
///
/// Runs an attendance aggregation over `start_date..=end_date` (inclusive,
/// institution-timezone calendar days).
///
/// ### Kinds
/// - `student-attendance-percentage` — per-student rates, optional
///   `department_id` / `section_id` filters (admin)
/// - `highest-absence-subjects` — subjects ranked by absence rate, capped to
///   `limit` (default 10, admin)
/// - `faculty-attendance-by-section` — session attendance per
///   (faculty, section) pair; faculty callers are scoped to themselves
/// - `department-attendance-comparison` — departments ranked by rate (admin)
///
/// ### Responses
/// - `200 OK` with the report rows
/// - `403 Forbidden` — faculty calling an admin-only report
/// - `404 Not Found` — unknown report kind
/// - `422 Unprocessable Entity` — bad range or limit
/// - `503 Service Unavailable` — deadline expired, nothing partial returned
pub async fn get_report(
    State(state): State<AppState>,
    user: AuthUser,
    Path(kind): Path<String>,
    Query(query): Query<ReportQuery>,
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
    if query.start_date > query.end_date {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ApiResponse::<()>::error_kind(
                "validation_error",
                "start_date must not be after end_date",
            )),
        )
            .into_response();
    }

    let range = ReportRange {
        start: query.start_date,
        end: query.end_date,
    };

    // Faculty tokens only reach their own section report.
    let faculty_id = if user.is_admin() {
        query.faculty_id
    } else {
        if kind != KIND_FACULTY_BY_SECTION {
            return (
                StatusCode::FORBIDDEN,
                Json(ApiResponse::<()>::error("Admin access required")),
            )
                .into_response();
        }
        Some(user.0.sub)
    };

    let outcome: Result<Result<ReportRows, DbErr>, _> = match kind.as_str() {
        KIND_STUDENT_PERCENTAGE => with_timeout(async {
            student_attendance_percentage(
                state.db(),
                range,
                query.department_id,
                query.section_id,
            )
            .await
            .map(ReportRows::Students)
        })
        .await,
        KIND_HIGHEST_ABSENCE => with_timeout(async {
            highest_absence_subjects(
                state.db(),
                range,
                query.limit.unwrap_or(DEFAULT_ABSENCE_LIMIT),
            )
            .await
            .map(ReportRows::Subjects)
        })
        .await,
        KIND_FACULTY_BY_SECTION => with_timeout(async {
            faculty_attendance_by_section(state.db(), range, faculty_id, query.section_id)
                .await
                .map(ReportRows::FacultySections)
        })
        .await,
        KIND_DEPARTMENT_COMPARISON => with_timeout(async {
            department_attendance_comparison(state.db(), range)
                .await
                .map(ReportRows::Departments)
        })
        .await,
        _ => {
            return (
                StatusCode::NOT_FOUND,
                Json(ApiResponse::<()>::error("Unknown report kind")),
            )
                .into_response();
        }
    };

    match outcome {
        Ok(Ok(rows)) => (
            StatusCode::OK,
            Json(ApiResponse::success(rows, "Report generated")),
        )
            .into_response(),
        Ok(Err(e)) => {
            tracing::error!(error = %e, kind, "report generation failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::<()>::error_kind(
                    "internal_error",
                    "An internal error occurred",
                )),
            )
                .into_response()
        }
        Err(resp) => resp,
    }
}
