use api::routes::routes;
use axum::Router;
use db::models::enrollment;
use db::test_utils::{TestDirectory, seed_directory, setup_test_db};
use sea_orm::DatabaseConnection;
use util::{config::AppConfig, notifier::AttendanceNotifier, state::AppState};

/// Pins the process-global config to known values. Tests touching it run
/// under `#[serial]`.
fn init_test_config() {
    AppConfig::reset();
    AppConfig::set_env("test");
    AppConfig::set_jwt_secret("test-secret");
    AppConfig::set_jwt_duration_minutes(60u64);
    AppConfig::set_timezone_offset_minutes(180);
    AppConfig::set_operation_timeout_ms(5_000u64);
    AppConfig::set_device_key_validity_days(365);
}

/// Builds the full application router over a fresh in-memory database.
pub async fn make_test_app() -> (Router, DatabaseConnection) {
    init_test_config();
    let db = setup_test_db().await;
    let state = AppState::new(db.clone(), AttendanceNotifier::new(16));
    let app = Router::new()
        .nest("/api", routes(state.clone()))
        .with_state(state);
    (app, db)
}

/// Seeds one of everything plus an enrollment matching the seeded schedule's
/// term, so student captures pass the enrollment check.
pub async fn seed_enrolled_directory(db: &DatabaseConnection, tag: &str) -> TestDirectory {
    let dir = seed_directory(db, tag).await;
    enrollment::Model::create(db, dir.student.id, dir.subject.id, "2025-2026", 1)
        .await
        .expect("create enrollment");
    dir
}

/// Bearer header value for the given staff actor.
pub fn auth_header(actor_id: i64, role: db::models::actor::ActorKind) -> String {
    let (token, _) = api::auth::generate_jwt(actor_id, role);
    format!("Bearer {token}")
}
