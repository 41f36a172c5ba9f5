//! # Attendance Routes Module
//!
//! This module defines and wires up routes for the `/api/attendance` endpoint group.
//!
//! ## Structure
//! - `post.rs` — POST handlers (record capture from devices and staff)
//! - `put.rs` — PUT handlers (manual correction)
//! - `get.rs` — GET handlers (record listing and retrieval)
//!
//! ## Middleware
//! `POST /records` is deliberately unguarded at the router level: NFC readers
//! authenticate with credentials carried in the request body, staff with a
//! bearer token checked inside the handler. The remaining routes verify a
//! staff token in their handlers.

use axum::{
    Router,
    routing::{get, post, put},
};
use util::state::AppState;

pub mod get;
pub mod post;
pub mod put;

/// Builds the `/attendance` route group, mapping HTTP methods to handlers.
///
/// - `POST /attendance/records` → `create_record` (devices and staff)
/// - `GET /attendance/records` → `list_records` (staff)
/// - `GET /attendance/records/{record_id}` → `get_record` (staff)
/// - `PUT /attendance/records/{record_id}` → `correct_record` (staff)
pub fn attendance_routes() -> Router<AppState> {
    Router::new()
        .route("/records", post(post::create_record))
        .route("/records", get(get::list_records))
        .route("/records/{record_id}", get(get::get_record))
        .route("/records/{record_id}", put(put::correct_record))
}
