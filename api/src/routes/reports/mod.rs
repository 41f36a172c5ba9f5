//! # Reports Routes Module
//!
//! This module defines and wires up routes for the `/api/reports` endpoint group.
//!
//! ## Middleware
//! The group is mounted behind the `allow_staff` guard. Faculty members may
//! only call the faculty-attendance-by-section report, scoped to themselves;
//! every other report requires an admin token.

use axum::{Router, routing::get};
use util::state::AppState;

pub mod get;

/// Builds the `/reports` route group.
///
/// - `GET /reports/{kind}` → `get_report` (staff)
pub fn reports_routes() -> Router<AppState> {
    Router::new().route("/{kind}", get(get::get_report))
}
