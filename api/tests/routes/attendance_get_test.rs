#[cfg(test)]
mod tests {
    use axum::{
        Router,
        body::Body as AxumBody,
        http::{Request, StatusCode},
    };
    use chrono::Utc;
    use serde_json::Value;
    use serial_test::serial;
    use tower::ServiceExt;

    use db::models::actor::{Actor, ActorKind};
    use db::models::attendance_record::AttendanceStatus;
    use db::recorder::{self, RecordAttendance, RecordingActor, StaffActor};

    use crate::helpers::{auth_header, make_test_app, seed_enrolled_directory};

    fn get(uri: &str, auth: Option<&str>) -> Request<AxumBody> {
        let mut builder = Request::builder().method("GET").uri(uri);
        if let Some(auth) = auth {
            builder = builder.header("authorization", auth);
        }
        builder.body(AxumBody::empty()).unwrap()
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    async fn seed_staff_record(
        db: &sea_orm::DatabaseConnection,
        dir: &db::test_utils::TestDirectory,
        status: AttendanceStatus,
    ) -> db::models::attendance_record::Model {
        let subject = Actor::find(db, ActorKind::Student, dir.student.id)
            .await
            .unwrap()
            .unwrap();
        recorder::record_attendance(
            db,
            RecordAttendance {
                actor: RecordingActor::Staff(StaffActor {
                    id: dir.faculty.id,
                    kind: ActorKind::Faculty,
                }),
                subject_actor: &subject,
                schedule_id: dir.schedule.id,
                captured_at: Utc::now(),
                status: Some(status),
                notes: None,
                tz_offset_minutes: 180,
            },
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    #[serial]
    async fn listing_filters_by_status() {
        let (app, db) = make_test_app().await;
        let dir = seed_enrolled_directory(&db, "ls1").await;
        seed_staff_record(&db, &dir, AttendanceStatus::Late).await;
        let auth = auth_header(dir.faculty.id, ActorKind::Faculty);

        let response = Router::clone(&app)
            .oneshot(get("/api/attendance/records?status=late", Some(&auth)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["data"]["total"], 1);
        assert_eq!(json["data"]["records"][0]["status"], "late");

        // A non-matching filter returns an empty page.
        let response = app
            .oneshot(get("/api/attendance/records?status=absent", Some(&auth)))
            .await
            .unwrap();
        let json = body_json(response).await;
        assert_eq!(json["data"]["total"], 0);
    }

    #[tokio::test]
    #[serial]
    async fn single_record_fetch_roundtrips() {
        let (app, db) = make_test_app().await;
        let dir = seed_enrolled_directory(&db, "ls2").await;
        let record = seed_staff_record(&db, &dir, AttendanceStatus::Present).await;
        let auth = auth_header(dir.admin.id, ActorKind::Admin);

        let response = app
            .oneshot(get(
                &format!("/api/attendance/records/{}", record.id),
                Some(&auth),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["data"]["id"], record.id);
        assert_eq!(json["data"]["schedule_id"], dir.schedule.id);
    }

    #[tokio::test]
    #[serial]
    async fn listing_requires_staff() {
        let (app, db) = make_test_app().await;
        let dir = seed_enrolled_directory(&db, "ls3").await;

        let response = Router::clone(&app)
            .oneshot(get("/api/attendance/records", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let auth = auth_header(dir.student.id, ActorKind::Student);
        let response = app
            .oneshot(get("/api/attendance/records", Some(&auth)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    #[serial]
    async fn bad_pagination_is_rejected() {
        let (app, db) = make_test_app().await;
        let dir = seed_enrolled_directory(&db, "ls4").await;
        let auth = auth_header(dir.admin.id, ActorKind::Admin);

        let response = app
            .oneshot(get("/api/attendance/records?per_page=500", Some(&auth)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let json = body_json(response).await;
        assert_eq!(json["kind"], "validation_error");
    }
}
