#[cfg(test)]
mod tests {
    use axum::{
        Router,
        body::Body as AxumBody,
        http::{Request, StatusCode},
    };
    use chrono::{TimeZone, Utc};
    use serde_json::Value;
    use serial_test::serial;
    use tower::ServiceExt;

    use db::models::actor::{Actor, ActorKind};
    use db::models::attendance_record::AttendanceStatus;
    use db::recorder::{self, RecordAttendance, RecordingActor, StaffActor};

    use crate::helpers::{auth_header, make_test_app, seed_enrolled_directory};

    fn get(uri: &str, auth: &str) -> Request<AxumBody> {
        Request::builder()
            .method("GET")
            .uri(uri)
            .header("authorization", auth)
            .body(AxumBody::empty())
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    /// One record per day in March 2025: present, late, absent.
    async fn seed_three_days(db: &sea_orm::DatabaseConnection, dir: &db::test_utils::TestDirectory) {
        let subject = Actor::find(db, ActorKind::Student, dir.student.id)
            .await
            .unwrap()
            .unwrap();
        let staff = StaffActor {
            id: dir.faculty.id,
            kind: ActorKind::Faculty,
        };
        let days = [
            (3, AttendanceStatus::Present),
            (4, AttendanceStatus::Late),
            (5, AttendanceStatus::Absent),
        ];
        for (day, status) in days {
            recorder::record_attendance(
                db,
                RecordAttendance {
                    actor: RecordingActor::Staff(staff),
                    subject_actor: &subject,
                    schedule_id: dir.schedule.id,
                    captured_at: Utc.with_ymd_and_hms(2025, 3, day, 10, 0, 0).unwrap(),
                    status: Some(status),
                    notes: None,
                    tz_offset_minutes: 180,
                },
            )
            .await
            .unwrap();
        }
    }

    #[tokio::test]
    #[serial]
    async fn department_comparison_counts_present_and_late() {
        let (app, db) = make_test_app().await;
        let dir = seed_enrolled_directory(&db, "rp1").await;
        seed_three_days(&db, &dir).await;
        let auth = auth_header(dir.admin.id, ActorKind::Admin);

        let response = app
            .oneshot(get(
                "/api/reports/department-attendance-comparison?start_date=2025-03-01&end_date=2025-03-31",
                &auth,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        let row = &json["data"][0];
        assert_eq!(row["total_sessions"], 3);
        assert_eq!(row["present_sessions"], 1);
        assert_eq!(row["late_sessions"], 1);
        assert_eq!(row["distinct_students"], 1);
        assert_eq!(row["attendance_rate"], 66.67);
    }

    #[tokio::test]
    #[serial]
    async fn student_percentage_report_is_admin_only() {
        let (app, db) = make_test_app().await;
        let dir = seed_enrolled_directory(&db, "rp2").await;
        seed_three_days(&db, &dir).await;

        let faculty_auth = auth_header(dir.faculty.id, ActorKind::Faculty);
        let response = Router::clone(&app)
            .oneshot(get(
                "/api/reports/student-attendance-percentage?start_date=2025-03-01&end_date=2025-03-31",
                &faculty_auth,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let admin_auth = auth_header(dir.admin.id, ActorKind::Admin);
        let response = app
            .oneshot(get(
                "/api/reports/student-attendance-percentage?start_date=2025-03-01&end_date=2025-03-31",
                &admin_auth,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["data"][0]["student_id"], dir.student.id);
        assert_eq!(json["data"][0]["attendance_rate"], 66.67);
    }

    #[tokio::test]
    #[serial]
    async fn faculty_section_report_is_scoped_to_caller() {
        let (app, db) = make_test_app().await;
        let dir = seed_enrolled_directory(&db, "rp3").await;
        seed_three_days(&db, &dir).await;

        let auth = auth_header(dir.faculty.id, ActorKind::Faculty);
        let response = app
            .oneshot(get(
                "/api/reports/faculty-attendance-by-section?start_date=2025-03-01&end_date=2025-03-31",
                &auth,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["data"][0]["faculty_id"], dir.faculty.id);
        assert_eq!(json["data"][0]["section_id"], dir.section.id);
    }

    #[tokio::test]
    #[serial]
    async fn unknown_kind_is_not_found() {
        let (app, db) = make_test_app().await;
        let dir = seed_enrolled_directory(&db, "rp4").await;
        let auth = auth_header(dir.admin.id, ActorKind::Admin);

        let response = app
            .oneshot(get(
                "/api/reports/nonexistent-report?start_date=2025-03-01&end_date=2025-03-31",
                &auth,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    #[serial]
    async fn inverted_range_is_rejected() {
        let (app, db) = make_test_app().await;
        let dir = seed_enrolled_directory(&db, "rp5").await;
        let auth = auth_header(dir.admin.id, ActorKind::Admin);

        let response = app
            .oneshot(get(
                "/api/reports/department-attendance-comparison?start_date=2025-03-31&end_date=2025-03-01",
                &auth,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let json = body_json(response).await;
        assert_eq!(json["kind"], "validation_error");
    }

    #[tokio::test]
    #[serial]
    async fn student_token_is_rejected_by_guard() {
        let (app, db) = make_test_app().await;
        let dir = seed_enrolled_directory(&db, "rp6").await;
        let auth = auth_header(dir.student.id, ActorKind::Student);

        let response = app
            .oneshot(get(
                "/api/reports/department-attendance-comparison?start_date=2025-03-01&end_date=2025-03-31",
                &auth,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }
}
