//! HTTP route entry point for `/api/...`.
//!
//! Routes are organized by domain, each protected via the access control
//! middleware it needs:
//! - `/health` → Liveness probe (public)
//! - `/attendance` → Recording, correction and listing of attendance records
//!   (recording is public so readers can post with body credentials; the
//!   rest requires a staff token)
//! - `/devices` → NFC reader administration (admin-only)
//! - `/reports` → Aggregated attendance reports (staff)

use crate::auth::guards::{allow_admin, allow_staff};
use crate::routes::{
    attendance::attendance_routes, devices::devices_routes, health::health_routes,
    reports::reports_routes,
};
use axum::{Router, middleware::from_fn};
use util::state::AppState;

pub mod attendance;
pub mod common;
pub mod devices;
pub mod health;
pub mod reports;

/// Builds the complete application router for all HTTP endpoints.
///
/// The returned router has `AppState` as its state type and mounts
/// all core API routes under their respective base paths.
///
/// # Route Structure:
/// - `/health` → Health check endpoint (no authentication required).
/// - `/attendance` → Record capture and the correction/listing surface.
/// - `/devices` → Device registration and lifecycle (restricted to admins).
/// - `/reports` → Attendance aggregation reports (staff tokens).
pub fn routes(app_state: AppState) -> Router<AppState> {
    Router::new()
        .nest("/health", health_routes())
        .nest("/attendance", attendance_routes())
        .nest("/devices", devices_routes().route_layer(from_fn(allow_admin)))
        .nest("/reports", reports_routes().route_layer(from_fn(allow_staff)))
        .with_state(app_state)
}
