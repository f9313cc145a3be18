mod common;

use axum::http::{Method, StatusCode};
use common::TestApp;
use cybersentinel_core::asm::AsmTrigger;
use cybersentinel_server::scheduler::run_scheduled_tick;
use serde_json::json;

#[tokio::test]
async fn health_routes_are_public() {
    let app = TestApp::spawn().await;

    let (status, body) = app.send(Method::GET, "/", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "running");

    let (status, body) = app.send(Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn openapi_document_describes_auth_routes() {
    let app = TestApp::spawn().await;
    let (status, doc) = app.send(Method::GET, "/openapi.json", None, None).await;
    assert_eq!(status, StatusCode::OK);

    let refresh = &doc["paths"]["/api/v1/auth/refresh"]["post"];
    assert_eq!(refresh["parameters"][0]["name"], "refresh_token");
    assert_eq!(refresh["parameters"][0]["in"], "query");
    assert!(doc["paths"]["/api/v1/auth/signup"]["post"].is_object());
}

#[tokio::test]
async fn asset_crud_is_scoped_to_owner() {
    let app = TestApp::spawn().await;
    let alice = app.access_token("alice@example.com", "analyst").await;
    let bob = app.access_token("bob@example.com", "analyst").await;

    let (status, asset) = app
        .send(
            Method::POST,
            "/api/v1/assets",
            Some(&alice),
            Some(json!({ "name": "example.com", "type": "domain", "exposure": "public", "tags": ["prod"] })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{}", asset);
    assert_eq!(asset["type"], "domain");
    assert_eq!(asset["status"], "active");
    let id = asset["id"].as_str().unwrap().to_string();

    let (status, _) = app
        .send(
            Method::POST,
            "/api/v1/assets",
            Some(&alice),
            Some(json!({ "name": "example.com", "type": "domain" })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, page) = app
        .send(Method::GET, "/api/v1/assets?q=example", Some(&alice), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["total"], 1);

    let (status, _) = app
        .send(Method::GET, &format!("/api/v1/assets/{}", id), Some(&bob), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, updated) = app
        .send(
            Method::PATCH,
            &format!("/api/v1/assets/{}", id),
            Some(&alice),
            Some(json!({ "risk_score": 80 })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["risk_score"], 80);
    assert_eq!(updated["name"], "example.com");

    let (status, body) = app
        .send(Method::DELETE, &format!("/api/v1/assets/{}", id), Some(&alice), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Asset deleted successfully");
}

#[tokio::test]
async fn discovery_creation_publishes_trigger() {
    let app = TestApp::spawn().await;
    let token = app.access_token("ops@example.com", "analyst").await;

    let (status, discovery) = app
        .send(
            Method::POST,
            "/api/v1/asm/discoveries",
            Some(&token),
            Some(json!({
                "name": "Perimeter",
                "asset_type": "domain",
                "target_source": "MANUAL_ENTRY",
                "manual_targets": ["example.com", " example.com "],
                "schedule_type": "INTERVAL",
                "schedule_value": "1h"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{}", discovery);
    assert_eq!(discovery["status"], "PENDING");
    assert_eq!(discovery["manual_targets"], json!(["example.com"]));
    let id = discovery["id"].as_str().unwrap().to_string();

    let delivery = app
        .state
        .queue
        .receive("asm_triggers")
        .await
        .unwrap()
        .expect("trigger published");
    let trigger: AsmTrigger = delivery.deserialize().unwrap();
    assert_eq!(trigger.asm_discovery_id, id);
    app.state.queue.ack(&delivery).await.unwrap();

    // Only ACTIVE interval discoveries are picked up by the scheduler.
    run_scheduled_tick(&app.state).await;
    assert!(app.state.queue.receive("asm_triggers").await.unwrap().is_none());

    let (status, _) = app
        .send(
            Method::PATCH,
            &format!("/api/v1/asm/discoveries/{}", id),
            Some(&token),
            Some(json!({ "status": "ACTIVE" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    run_scheduled_tick(&app.state).await;
    let scheduled = app
        .state
        .queue
        .receive("asm_triggers")
        .await
        .unwrap()
        .expect("scheduled trigger");
    let trigger: AsmTrigger = scheduled.deserialize().unwrap();
    assert_eq!(trigger.asm_discovery_id, id);

    let (status, dashboard) = app
        .send(Method::GET, "/api/v1/asm/dashboard", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(dashboard["total_discoveries"], 1);
    assert_eq!(dashboard["active_discoveries"], 1);
}

#[tokio::test]
async fn invalid_discovery_is_rejected() {
    let app = TestApp::spawn().await;
    let token = app.access_token("ops@example.com", "analyst").await;

    let (status, _) = app
        .send(
            Method::POST,
            "/api/v1/asm/discoveries",
            Some(&token),
            Some(json!({
                "name": "Missing assets",
                "asset_type": "domain",
                "target_source": "FROM_ASSET",
                "asset_ids": ["does-not-exist"]
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(app.state.queue.receive("asm_triggers").await.unwrap().is_none());
}

#[tokio::test]
async fn scans_are_queued_for_the_worker() {
    let app = TestApp::spawn().await;
    let token = app.access_token("vs@example.com", "analyst").await;

    let (status, accepted) = app
        .send(
            Method::POST,
            "/api/v1/scans",
            Some(&token),
            Some(json!({ "name": "Weekly", "target": "10.0.0.1" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{}", accepted);
    assert_eq!(accepted["status"], "running");

    let delivery = app.state.queue.receive("vs_scans").await.unwrap();
    assert!(delivery.is_some());

    let (status, scans) = app
        .send(Method::GET, "/api/v1/scans", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(scans.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn tasks_are_seeded_and_accept_messages() {
    let app = TestApp::spawn().await;
    let token = app.access_token("lead@example.com", "admin").await;

    let (status, page) = app
        .send(Method::GET, "/api/v1/tasks", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["total"], 2);

    let (status, message) = app
        .send(
            Method::POST,
            "/api/v1/tasks/1/messages",
            Some(&token),
            Some(json!({ "message": "On it" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{}", message);
    assert_eq!(message["message"], "On it");

    let (status, _) = app
        .send(Method::GET, "/api/v1/tasks/missing", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn settings_default_then_persist() {
    let app = TestApp::spawn().await;
    let token = app.access_token("me@example.com", "reader").await;

    let (status, settings) = app
        .send(Method::GET, "/api/v1/settings", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(settings["preferences"]["theme"], "light");

    let mut changed = settings.clone();
    changed["preferences"]["theme"] = json!("dark");
    let (status, body) = app
        .send(Method::PUT, "/api/v1/settings", Some(&token), Some(changed))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Settings updated");

    let (_, settings) = app
        .send(Method::GET, "/api/v1/settings", Some(&token), None)
        .await;
    assert_eq!(settings["preferences"]["theme"], "dark");
}

#[tokio::test]
async fn audit_logs_require_admin() {
    let app = TestApp::spawn().await;
    let reader = app.access_token("reader@example.com", "reader").await;
    let admin = app.access_token("admin@example.com", "admin").await;

    let (status, body) = app
        .send(Method::GET, "/api/v1/audit-logs", Some(&reader), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "forbidden");

    let (status, body) = app
        .send(Method::GET, "/api/v1/audit-logs", Some(&admin), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["total"].as_i64().unwrap() >= 1);
}

#[tokio::test]
async fn users_in_other_companies_are_hidden() {
    let app = TestApp::spawn().await;
    let token = app.access_token("gone@example.com", "admin").await;
    let other = app.signup("other@example.com", "reader").await;

    let (status, _) = app
        .send(Method::DELETE, &format!("/api/v1/users/{}", other), Some(&token), None)
        .await;
    // Users in another company are invisible.
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = app
        .send(Method::GET, "/api/v1/users/me", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "gone@example.com");
}
