#[cfg(test)]
mod tests {
    use axum::{
        Router,
        body::Body as AxumBody,
        http::{Request, StatusCode},
    };
    use serde_json::{Value, json};
    use serial_test::serial;
    use tower::ServiceExt;

    use db::models::actor::ActorKind;

    use crate::helpers::{auth_header, make_test_app, seed_enrolled_directory};

    fn request(method: &str, uri: &str, body: Option<Value>, auth: Option<&str>) -> Request<AxumBody> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(auth) = auth {
            builder = builder.header("authorization", auth);
        }
        match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(AxumBody::from(body.to_string()))
                .unwrap(),
            None => builder.body(AxumBody::empty()).unwrap(),
        }
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    #[serial]
    async fn admin_registers_and_lists_devices() {
        let (app, db) = make_test_app().await;
        let dir = seed_enrolled_directory(&db, "dv1").await;
        let auth = auth_header(dir.admin.id, ActorKind::Admin);

        let response = Router::clone(&app)
            .oneshot(request(
                "POST",
                "/api/devices",
                Some(json!({
                    "device_id": "nfc-010",
                    "name": "Library reader",
                    "location": "library",
                })),
                Some(&auth),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let json = body_json(response).await;
        assert_eq!(json["data"]["device_id"], "NFC-010");
        // the minted key is visible exactly once, here
        assert_eq!(json["data"]["api_key"].as_str().unwrap().len(), 64);

        let response = app
            .oneshot(request("GET", "/api/devices", None, Some(&auth)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["data"]["total"], 1);
        assert!(json["data"]["devices"][0]["api_key"].is_null());
    }

    #[tokio::test]
    #[serial]
    async fn faculty_token_is_forbidden() {
        let (app, db) = make_test_app().await;
        let dir = seed_enrolled_directory(&db, "dv2").await;
        let auth = auth_header(dir.faculty.id, ActorKind::Faculty);

        let response = app
            .oneshot(request("GET", "/api/devices", None, Some(&auth)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    #[serial]
    async fn update_rotates_credential_on_request() {
        let (app, db) = make_test_app().await;
        let dir = seed_enrolled_directory(&db, "dv3").await;
        let auth = auth_header(dir.admin.id, ActorKind::Admin);

        let response = Router::clone(&app)
            .oneshot(request(
                "POST",
                "/api/devices",
                Some(json!({
                    "device_id": "LAB-A12",
                    "name": "Lab reader",
                    "location": "lab",
                })),
                Some(&auth),
            ))
            .await
            .unwrap();
        let created = body_json(response).await;
        let device_pk = created["data"]["id"].as_i64().unwrap();
        let old_key = created["data"]["api_key"].as_str().unwrap().to_owned();

        let response = app
            .oneshot(request(
                "PUT",
                &format!("/api/devices/{device_pk}"),
                Some(json!({ "name": "Lab reader (rear door)", "rotate_api_key": true })),
                Some(&auth),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["data"]["name"], "Lab reader (rear door)");
        let new_key = json["data"]["api_key"].as_str().unwrap();
        assert_eq!(new_key.len(), 64);
        assert_ne!(new_key, old_key);
    }

    #[tokio::test]
    #[serial]
    async fn delete_deactivates_instead_of_removing() {
        let (app, db) = make_test_app().await;
        let dir = seed_enrolled_directory(&db, "dv4").await;
        let auth = auth_header(dir.admin.id, ActorKind::Admin);

        let response = Router::clone(&app)
            .oneshot(request(
                "POST",
                "/api/devices",
                Some(json!({
                    "device_id": "NFC-020",
                    "name": "Auditorium reader",
                    "location": "auditorium",
                })),
                Some(&auth),
            ))
            .await
            .unwrap();
        let created = body_json(response).await;
        let device_pk = created["data"]["id"].as_i64().unwrap();

        let response = Router::clone(&app)
            .oneshot(request(
                "DELETE",
                &format!("/api/devices/{device_pk}"),
                None,
                Some(&auth),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["data"]["is_active"], false);

        // still retrievable
        let response = app
            .oneshot(request(
                "GET",
                &format!("/api/devices/{device_pk}"),
                None,
                Some(&auth),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    #[serial]
    async fn bad_device_id_format_is_rejected() {
        let (app, db) = make_test_app().await;
        let dir = seed_enrolled_directory(&db, "dv5").await;
        let auth = auth_header(dir.admin.id, ActorKind::Admin);

        let response = app
            .oneshot(request(
                "POST",
                "/api/devices",
                Some(json!({
                    "device_id": "not a device",
                    "name": "Broken",
                    "location": "lab",
                })),
                Some(&auth),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
