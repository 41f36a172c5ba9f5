#[cfg(test)]
mod tests {
    use axum::{
        Router,
        body::Body as AxumBody,
        http::{Request, StatusCode},
    };
    use sea_orm::EntityTrait;
    use serde_json::{Value, json};
    use serial_test::serial;
    use tower::ServiceExt;

    use db::models::{
        actor::ActorKind,
        attendance_record::Entity as RecordEntity,
        nfc_device::{Location, Model as DeviceModel},
    };

    use crate::helpers::{auth_header, make_test_app, seed_enrolled_directory};

    fn post_records(body: Value, auth: Option<&str>) -> Request<AxumBody> {
        let mut builder = Request::builder()
            .method("POST")
            .uri("/api/attendance/records")
            .header("content-type", "application/json");
        if let Some(auth) = auth {
            builder = builder.header("authorization", auth);
        }
        builder.body(AxumBody::from(body.to_string())).unwrap()
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    async fn register_device(
        db: &sea_orm::DatabaseConnection,
        admin_id: i64,
    ) -> DeviceModel {
        DeviceModel::register(db, "NFC-001", "Gate", Location::MainGate, None, None, admin_id, 365)
            .await
            .expect("register device")
    }

    #[tokio::test]
    #[serial]
    async fn device_scan_creates_present_record() {
        let (app, db) = make_test_app().await;
        let dir = seed_enrolled_directory(&db, "dp1").await;
        let device = register_device(&db, dir.admin.id).await;

        let response = app
            .oneshot(post_records(
                json!({
                    "device_id": device.device_id,
                    "api_key": device.api_key,
                    "card_id": format!("CARD-S-{}", "dp1"),
                    "schedule_id": dir.schedule.id,
                }),
                None,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        let json = body_json(response).await;
        assert_eq!(json["success"], true);
        assert_eq!(json["data"]["status"], "present");
        assert_eq!(json["data"]["recorded_by"], "nfc");
        assert_eq!(json["data"]["record_type"], "student");
        assert_eq!(json["data"]["device_id"], device.id);
    }

    #[tokio::test]
    #[serial]
    async fn duplicate_scan_same_day_conflicts() {
        let (app, db) = make_test_app().await;
        let dir = seed_enrolled_directory(&db, "dp2").await;
        let device = register_device(&db, dir.admin.id).await;

        let body = json!({
            "device_id": device.device_id,
            "api_key": device.api_key,
            "card_id": "CARD-S-dp2",
            "schedule_id": dir.schedule.id,
        });

        let first = Router::clone(&app)
            .oneshot(post_records(body.clone(), None))
            .await
            .unwrap();
        assert_eq!(first.status(), StatusCode::CREATED);

        let second = app.oneshot(post_records(body, None)).await.unwrap();
        assert_eq!(second.status(), StatusCode::CONFLICT);
        let json = body_json(second).await;
        assert_eq!(json["success"], false);
        assert_eq!(json["kind"], "duplicate_attendance");
    }

    #[tokio::test]
    #[serial]
    async fn rejected_device_writes_nothing() {
        let (app, db) = make_test_app().await;
        let dir = seed_enrolled_directory(&db, "dp3").await;
        let device = register_device(&db, dir.admin.id).await;
        let api_key = device.api_key.clone();
        device.deactivate(&db).await.unwrap();

        let response = app
            .oneshot(post_records(
                json!({
                    "device_id": "NFC-001",
                    "api_key": api_key,
                    "card_id": "CARD-S-dp3",
                    "schedule_id": dir.schedule.id,
                }),
                None,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let records = RecordEntity::find().all(&db).await.unwrap();
        assert!(records.is_empty());
    }

    #[tokio::test]
    #[serial]
    async fn wrong_api_key_is_rejected() {
        let (app, db) = make_test_app().await;
        let dir = seed_enrolled_directory(&db, "dp4").await;
        register_device(&db, dir.admin.id).await;

        let response = app
            .oneshot(post_records(
                json!({
                    "device_id": "NFC-001",
                    "api_key": "0000",
                    "card_id": "CARD-S-dp4",
                    "schedule_id": dir.schedule.id,
                }),
                None,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    #[serial]
    async fn staff_capture_with_explicit_status() {
        let (app, db) = make_test_app().await;
        let dir = seed_enrolled_directory(&db, "dp5").await;
        let auth = auth_header(dir.faculty.id, ActorKind::Faculty);

        let response = app
            .oneshot(post_records(
                json!({
                    "subject_actor_kind": "student",
                    "subject_actor_id": dir.student.id,
                    "schedule_id": dir.schedule.id,
                    "status": "late",
                    "notes": "Arrived 20 minutes in",
                }),
                Some(&auth),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        let json = body_json(response).await;
        assert_eq!(json["data"]["status"], "late");
        assert_eq!(json["data"]["recorded_by"], "faculty");
        assert_eq!(json["data"]["recording_actor_id"], dir.faculty.id);
        assert_eq!(json["data"]["notes"], "Arrived 20 minutes in");
    }

    #[tokio::test]
    #[serial]
    async fn student_token_cannot_record() {
        let (app, db) = make_test_app().await;
        let dir = seed_enrolled_directory(&db, "dp6").await;
        let auth = auth_header(dir.student.id, ActorKind::Student);

        let response = app
            .oneshot(post_records(
                json!({
                    "subject_actor_kind": "student",
                    "subject_actor_id": dir.student.id,
                    "schedule_id": dir.schedule.id,
                }),
                Some(&auth),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    #[serial]
    async fn missing_credentials_is_unauthorized() {
        let (app, db) = make_test_app().await;
        let dir = seed_enrolled_directory(&db, "dp7").await;

        let response = app
            .oneshot(post_records(
                json!({
                    "subject_actor_kind": "student",
                    "subject_actor_id": dir.student.id,
                    "schedule_id": dir.schedule.id,
                }),
                None,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    #[serial]
    async fn unknown_card_is_not_found() {
        let (app, db) = make_test_app().await;
        let dir = seed_enrolled_directory(&db, "dp8").await;
        let device = register_device(&db, dir.admin.id).await;

        let response = app
            .oneshot(post_records(
                json!({
                    "device_id": device.device_id,
                    "api_key": device.api_key,
                    "card_id": "CARD-UNKNOWN",
                    "schedule_id": dir.schedule.id,
                }),
                None,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    #[serial]
    async fn unenrolled_student_is_forbidden() {
        let (app, db) = make_test_app().await;
        // plain seed, no enrollment
        let dir = db::test_utils::seed_directory(&db, "dp9").await;
        let auth = auth_header(dir.faculty.id, ActorKind::Faculty);

        let response = app
            .oneshot(post_records(
                json!({
                    "subject_actor_kind": "student",
                    "subject_actor_id": dir.student.id,
                    "schedule_id": dir.schedule.id,
                }),
                Some(&auth),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        let json = body_json(response).await;
        assert_eq!(json["kind"], "not_enrolled");
    }
}
