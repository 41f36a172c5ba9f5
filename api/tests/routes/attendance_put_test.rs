#[cfg(test)]
mod tests {
    use axum::{
        body::Body as AxumBody,
        http::{Request, StatusCode},
    };
    use chrono::Utc;
    use serde_json::{Value, json};
    use serial_test::serial;
    use tower::ServiceExt;

    use db::models::actor::{Actor, ActorKind};
    use db::models::nfc_device::{Location, Model as DeviceModel};
    use db::recorder::{self, RecordAttendance, RecordingActor};

    use crate::helpers::{auth_header, make_test_app, seed_enrolled_directory};

    fn put_record(record_id: i64, body: Value, auth: Option<&str>) -> Request<AxumBody> {
        let mut builder = Request::builder()
            .method("PUT")
            .uri(format!("/api/attendance/records/{record_id}"))
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

    /// Writes one device-captured record directly through the recorder.
    async fn seed_device_record(
        db: &sea_orm::DatabaseConnection,
        tag: &str,
        admin_id: i64,
        student_id: i64,
        schedule_id: i64,
    ) -> db::models::attendance_record::Model {
        let device = DeviceModel::register(
            db,
            &format!("NFC-{}", tag.to_uppercase()),
            "Reader",
            Location::Classroom,
            None,
            None,
            admin_id,
            365,
        )
        .await
        .unwrap();
        let subject = Actor::find(db, ActorKind::Student, student_id)
            .await
            .unwrap()
            .unwrap();
        recorder::record_attendance(
            db,
            RecordAttendance {
                actor: RecordingActor::Device(&device),
                subject_actor: &subject,
                schedule_id,
                captured_at: Utc::now(),
                status: None,
                notes: None,
                tz_offset_minutes: 180,
            },
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    #[serial]
    async fn faculty_correction_keeps_provenance() {
        let (app, db) = make_test_app().await;
        let dir = seed_enrolled_directory(&db, "cr1").await;
        let record =
            seed_device_record(&db, "cr1", dir.admin.id, dir.student.id, dir.schedule.id).await;
        let auth = auth_header(dir.faculty.id, ActorKind::Faculty);

        let response = app
            .oneshot(put_record(
                record.id,
                json!({ "status": "excused", "notes": "Medical certificate" }),
                Some(&auth),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["data"]["status"], "excused");
        assert_eq!(json["data"]["is_manual_correction"], true);
        assert_eq!(json["data"]["corrected_by"], dir.faculty.id);
        // original capture provenance survives
        assert_eq!(json["data"]["recorded_by"], "nfc");
    }

    #[tokio::test]
    #[serial]
    async fn student_token_cannot_correct() {
        let (app, db) = make_test_app().await;
        let dir = seed_enrolled_directory(&db, "cr2").await;
        let record =
            seed_device_record(&db, "cr2", dir.admin.id, dir.student.id, dir.schedule.id).await;
        let auth = auth_header(dir.student.id, ActorKind::Student);

        let response = app
            .oneshot(put_record(
                record.id,
                json!({ "status": "excused" }),
                Some(&auth),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    #[serial]
    async fn missing_record_is_not_found() {
        let (app, db) = make_test_app().await;
        let dir = seed_enrolled_directory(&db, "cr3").await;
        let auth = auth_header(dir.admin.id, ActorKind::Admin);

        let response = app
            .oneshot(put_record(9999, json!({ "status": "absent" }), Some(&auth)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let json = body_json(response).await;
        assert_eq!(json["kind"], "record_not_found");
    }

    #[tokio::test]
    #[serial]
    async fn correction_requires_token() {
        let (app, db) = make_test_app().await;
        let dir = seed_enrolled_directory(&db, "cr4").await;
        let record =
            seed_device_record(&db, "cr4", dir.admin.id, dir.student.id, dir.schedule.id).await;

        let response = app
            .oneshot(put_record(record.id, json!({ "status": "absent" }), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
