//! Application state container shared across Axum route handlers.
//!
//! This struct holds shared resources such as the database connection and the
//! attendance notifier. It is cheap to clone and passed into route handlers
//! via Axum's `State<T>` extractor.

use crate::notifier::AttendanceNotifier;
use sea_orm::DatabaseConnection;

/// Central application state shared across the server.
///
/// This includes:
/// - A cloned, thread-safe database connection for use with SeaORM.
/// - The `AttendanceNotifier` used to publish recorded attendance.
#[derive(Clone)]
pub struct AppState {
    db: DatabaseConnection,
    notifier: AttendanceNotifier,
}

impl AppState {
    pub fn new(db: DatabaseConnection, notifier: AttendanceNotifier) -> Self {
        Self { db, notifier }
    }

    /// Returns a shared reference to the internal `DatabaseConnection`.
    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    pub fn notifier(&self) -> &AttendanceNotifier {
        &self.notifier
    }

    /// Returns a cloned copy of the database connection.
    ///
    /// Useful for async contexts or spawned tasks that require ownership.
    pub fn db_clone(&self) -> DatabaseConnection {
        self.db.clone()
    }
}
