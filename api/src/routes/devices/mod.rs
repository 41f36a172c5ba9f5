//! # Devices Routes Module
//!
//! This module defines and wires up routes for the `/api/devices` endpoint group.
//!
//! ## Structure
//! - `post.rs` — POST handlers (register a device)
//! - `get.rs` — GET handlers (list devices, fetch one)
//! - `put.rs` — PUT handlers (update metadata, rotate credential)
//! - `delete.rs` — DELETE handlers (deactivate)
//!
//! ## Middleware
//! The whole group is mounted behind the `allow_admin` guard.

use axum::{
    Router,
    routing::{delete, get, post, put},
};
use util::state::AppState;

pub mod common;
pub mod delete;
pub mod get;
pub mod post;
pub mod put;

/// Builds the `/devices` route group, mapping HTTP methods to handlers.
///
/// - `POST /devices` → `register_device` (admin only)
/// - `GET /devices` → `list_devices` (admin only)
/// - `GET /devices/{device_id}` → `get_device` (admin only)
/// - `PUT /devices/{device_id}` → `update_device` (admin only)
/// - `DELETE /devices/{device_id}` → `deactivate_device` (admin only)
pub fn devices_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(post::register_device))
        .route("/", get(get::list_devices))
        .route("/{device_id}", get(get::get_device))
        .route("/{device_id}", put(put::update_device))
        .route("/{device_id}", delete(delete::deactivate_device))
}
