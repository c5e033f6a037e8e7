mod common;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use common::TestApp;
use serde_json::{json, Value};
use tower::ServiceExt;

async fn parse_body(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

// 2026-02-16 is a Monday.
async fn create_weekly_template(app: &TestApp, token: &str) -> String {
    let res = app.router.clone().oneshot(
        Request::builder().method("POST").uri("/api/v1/sessions")
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .header("Content-Type", "application/json")
            .body(Body::from(json!({
                "title": "Interval Training",
                "session_type": "GROUP",
                "visibility": "PUBLIC",
                "scheduled_at": "2026-02-16T09:00:00Z",
                "duration_min": 60,
                "is_recurring": true,
                "recurrence_rule": {"frequency": "WEEKLY", "interval": 1, "days_of_week": [1, 3, 5]}
            }).to_string())).unwrap()
    ).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    parse_body(res).await["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_occurrence_preview() {
    let app = TestApp::new().await;
    let token = app.token_for("instructor-1");
    let session_id = create_weekly_template(&app, &token).await;

    // 1. One week: Monday, Wednesday, Friday of the anchor week
    let res = app.router.clone().oneshot(
        Request::builder().method("GET").uri(format!("/api/v1/sessions/{}/occurrences?weeks=1", session_id))
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .body(Body::empty()).unwrap()
    ).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body = parse_body(res).await;
    assert_eq!(body["session_id"], session_id.as_str());
    let occurrences: Vec<&str> = body["occurrences"].as_array().unwrap()
        .iter().map(|v| v.as_str().unwrap()).collect();
    assert_eq!(occurrences, vec![
        "2026-02-16T09:00:00+00:00",
        "2026-02-18T09:00:00+00:00",
        "2026-02-20T09:00:00+00:00",
    ]);

    // 2. Default horizon is four weeks: 3 per week
    let res = app.router.clone().oneshot(
        Request::builder().method("GET").uri(format!("/api/v1/sessions/{}/occurrences", session_id))
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .body(Body::empty()).unwrap()
    ).await.unwrap();
    assert_eq!(parse_body(res).await["occurrences"].as_array().unwrap().len(), 12);

    // 3. Anyone who can see the session can preview it
    let res = app.router.clone().oneshot(
        Request::builder().method("GET").uri(format!("/api/v1/sessions/{}/occurrences?weeks=1", session_id))
            .header(header::AUTHORIZATION, format!("Bearer {}", app.token_for("member-1")))
            .body(Body::empty()).unwrap()
    ).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    // 4. Horizon bounds
    for bad_weeks in [0, 53] {
        let res = app.router.clone().oneshot(
            Request::builder().method("GET").uri(format!("/api/v1/sessions/{}/occurrences?weeks={}", session_id, bad_weeks))
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .body(Body::empty()).unwrap()
        ).await.unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST, "weeks={} must be rejected", bad_weeks);
    }
}

#[tokio::test]
async fn test_preview_requires_a_rule() {
    let app = TestApp::new().await;
    let token = app.token_for("instructor-1");

    let res = app.router.clone().oneshot(
        Request::builder().method("POST").uri("/api/v1/sessions")
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .header("Content-Type", "application/json")
            .body(Body::from(json!({
                "title": "One Off",
                "session_type": "ONE_ON_ONE",
                "scheduled_at": "2026-03-01T10:00:00Z",
                "duration_min": 30
            }).to_string())).unwrap()
    ).await.unwrap();
    let session_id = parse_body(res).await["id"].as_str().unwrap().to_string();

    let res = app.router.clone().oneshot(
        Request::builder().method("GET").uri(format!("/api/v1/sessions/{}/occurrences", session_id))
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .body(Body::empty()).unwrap()
    ).await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_instance_generation_is_idempotent() {
    let app = TestApp::new().await;
    let token = app.token_for("instructor-1");
    let template_id = create_weekly_template(&app, &token).await;

    // 1. Two weeks of Mon/Wed/Fri minus the template's own slot = 5
    let res = app.router.clone().oneshot(
        Request::builder().method("POST").uri(format!("/api/v1/sessions/{}/instances", template_id))
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .header("Content-Type", "application/json")
            .body(Body::from(json!({"weeks": 2}).to_string())).unwrap()
    ).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let batch = parse_body(res).await;
    assert_eq!(batch["created_count"], 5);

    let instances = batch["created_sessions"].as_array().unwrap();
    for instance in instances {
        assert_eq!(instance["title"], "Interval Training");
        assert_eq!(instance["is_recurring"], false);
        assert!(instance["recurrence_rule"].is_null());
        assert_eq!(instance["status"], "SCHEDULED");
        assert_ne!(instance["id"], template_id.as_str());
        assert_ne!(instance["scheduled_at"], "2026-02-16T09:00:00Z", "The template slot is never re-created");
    }

    // 2. Running it again creates nothing new
    let res = app.router.clone().oneshot(
        Request::builder().method("POST").uri(format!("/api/v1/sessions/{}/instances", template_id))
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .header("Content-Type", "application/json")
            .body(Body::from(json!({"weeks": 2}).to_string())).unwrap()
    ).await.unwrap();
    let batch = parse_body(res).await;
    assert_eq!(batch["created_count"], 0);

    // 3. Deleting an instance does not resurrect its slot
    let victim_id = instances[0]["id"].as_str().unwrap();
    let res = app.router.clone().oneshot(
        Request::builder().method("DELETE").uri(format!("/api/v1/sessions/{}", victim_id))
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .body(Body::empty()).unwrap()
    ).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = app.router.clone().oneshot(
        Request::builder().method("POST").uri(format!("/api/v1/sessions/{}/instances", template_id))
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .header("Content-Type", "application/json")
            .body(Body::from(json!({"weeks": 2}).to_string())).unwrap()
    ).await.unwrap();
    assert_eq!(parse_body(res).await["created_count"], 0);

    // 4. Widening the horizon only fills the new weeks
    let res = app.router.clone().oneshot(
        Request::builder().method("POST").uri(format!("/api/v1/sessions/{}/instances", template_id))
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .header("Content-Type", "application/json")
            .body(Body::from(json!({"weeks": 3}).to_string())).unwrap()
    ).await.unwrap();
    assert_eq!(parse_body(res).await["created_count"], 3);
}

#[tokio::test]
async fn test_instance_generation_guards() {
    let app = TestApp::new().await;
    let token = app.token_for("instructor-1");
    let template_id = create_weekly_template(&app, &token).await;

    // 1. Only the instructor may materialize
    let res = app.router.clone().oneshot(
        Request::builder().method("POST").uri(format!("/api/v1/sessions/{}/instances", template_id))
            .header(header::AUTHORIZATION, format!("Bearer {}", app.token_for("user-a")))
            .header("Content-Type", "application/json")
            .body(Body::from(json!({}).to_string())).unwrap()
    ).await.unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    // 2. Non-recurring sessions have nothing to materialize
    let res = app.router.clone().oneshot(
        Request::builder().method("POST").uri("/api/v1/sessions")
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .header("Content-Type", "application/json")
            .body(Body::from(json!({
                "title": "Single",
                "session_type": "GROUP",
                "scheduled_at": "2026-04-01T08:00:00Z",
                "duration_min": 60
            }).to_string())).unwrap()
    ).await.unwrap();
    let plain_id = parse_body(res).await["id"].as_str().unwrap().to_string();

    let res = app.router.clone().oneshot(
        Request::builder().method("POST").uri(format!("/api/v1/sessions/{}/instances", plain_id))
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .header("Content-Type", "application/json")
            .body(Body::from(json!({}).to_string())).unwrap()
    ).await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    // 3. Unknown template
    let res = app.router.clone().oneshot(
        Request::builder().method("POST").uri("/api/v1/sessions/does-not-exist/instances")
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .header("Content-Type", "application/json")
            .body(Body::from(json!({}).to_string())).unwrap()
    ).await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}
