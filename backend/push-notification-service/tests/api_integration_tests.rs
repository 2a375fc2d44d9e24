/// HTTP API tests for push-notification-service
///
/// Runs the real handler stack against wiremock stand-ins for Supabase
/// PostgREST, the Google token endpoint and FCM.
use actix_web::{dev::ServiceResponse, http::Method, test, web, App};
use push_notification_service::{
    build_cors, build_dispatcher, cors_headers, handlers, Config, CORS_ALLOWED_HEADERS,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TEST_KEY_PEM: &str =
    include_str!("../../libs/nova-fcm-dispatch/tests/fixtures/service_account_key.pem");

const SEND_PATH: &str = "/v1/projects/nova-push/messages:send";

fn v1_vars(server: &MockServer) -> HashMap<&'static str, String> {
    let service_account = json!({
        "type": "service_account",
        "project_id": "nova-push",
        "private_key": TEST_KEY_PEM,
        "client_email": "fcm@nova-push.iam.gserviceaccount.com"
    });
    HashMap::from([
        ("SUPABASE_URL", server.uri()),
        ("SUPABASE_SERVICE_ROLE_KEY", "service-role-key".to_string()),
        ("FIREBASE_SERVICE_ACCOUNT_KEY", service_account.to_string()),
        ("FCM_API_BASE_URL", server.uri()),
        ("GOOGLE_TOKEN_URI", format!("{}/token", server.uri())),
    ])
}

fn legacy_vars(server: &MockServer) -> HashMap<&'static str, String> {
    HashMap::from([
        ("SUPABASE_URL", server.uri()),
        ("SUPABASE_SERVICE_ROLE_KEY", "service-role-key".to_string()),
        ("FCM_SERVER_KEY", "legacy-server-key".to_string()),
        ("FCM_API_BASE_URL", server.uri()),
    ])
}

fn config(vars: HashMap<&'static str, String>) -> Config {
    Config::from_lookup(|key| vars.get(key).cloned()).expect("valid test configuration")
}

async fn mount_profile(server: &MockServer, recipient_id: &str, row: Value, expected: u64) {
    Mock::given(method("GET"))
        .and(path("/rest/v1/profiles"))
        .and(query_param("select", "fcm_token"))
        .and(query_param("id", format!("eq.{}", recipient_id).as_str()))
        .and(header("apikey", "service-role-key"))
        .and(header("Authorization", "Bearer service-role-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(row))
        .expect(expected)
        .mount(server)
        .await;
}

async fn mount_token(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "ya29.test-token",
            "expires_in": 3599,
            "token_type": "Bearer"
        })))
        .mount(server)
        .await;
}

fn header_value<B>(resp: &ServiceResponse<B>, name: &str) -> String {
    resp.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

macro_rules! init_app {
    ($config:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new(build_dispatcher(&$config)))
                .wrap(cors_headers())
                .wrap(build_cors())
                .configure(handlers::register_routes),
        )
        .await
    };
}

#[actix_web::test]
async fn test_v1_send_to_recipient() {
    let server = MockServer::start().await;
    mount_profile(&server, "u1", json!([{"fcm_token": "tok-123"}]), 1).await;
    mount_token(&server).await;
    Mock::given(method("POST"))
        .and(path(SEND_PATH))
        .and(header("Authorization", "Bearer ya29.test-token"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"name": "projects/nova-push/messages/0:1"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let app = init_app!(config(v1_vars(&server)));
    let req = test::TestRequest::post()
        .uri("/")
        .set_json(json!({"recipientId": "u1", "title": "Hi", "message": "there"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(
        body,
        json!({"success": true, "result": {"name": "projects/nova-push/messages/0:1"}})
    );

    let sent: Vec<Value> = server
        .received_requests()
        .await
        .unwrap_or_default()
        .into_iter()
        .filter(|r| r.url.path() == SEND_PATH)
        .map(|r| serde_json::from_slice(&r.body).unwrap())
        .collect();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0]["message"]["token"], "tok-123");
    assert_eq!(
        sent[0]["message"]["notification"],
        json!({"title": "Hi", "body": "there"})
    );
}

#[actix_web::test]
async fn test_fcm_error_is_returned_as_400() {
    let server = MockServer::start().await;
    mount_token(&server).await;
    Mock::given(method("POST"))
        .and(path(SEND_PATH))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({"error": "invalid token"})))
        .mount(&server)
        .await;

    let app = init_app!(config(v1_vars(&server)));
    let req = test::TestRequest::post()
        .uri("/api/v1/push/send")
        .set_json(json!({"fcmToken": "stale", "title": "Hi", "message": "there"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);

    let body: Value = test::read_body_json(resp).await;
    let error = body["error"].as_str().unwrap();
    assert!(error.starts_with("FCM API error: "));
    assert!(error.contains("invalid token"));
}

#[actix_web::test]
async fn test_explicit_token_skips_profile_lookup() {
    let server = MockServer::start().await;
    mount_profile(&server, "u1", json!([{"fcm_token": "tok-from-profile"}]), 0).await;
    Mock::given(method("POST"))
        .and(path("/fcm/send"))
        .and(header("Authorization", "key=legacy-server-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": 1, "failure": 0})))
        .expect(1)
        .mount(&server)
        .await;

    let app = init_app!(config(legacy_vars(&server)));
    let req = test::TestRequest::post()
        .uri("/")
        .set_json(json!({
            "recipientId": "u1",
            "fcmToken": "explicit-token",
            "title": "Hi",
            "message": "there",
            "data": {"chat_id": "42"}
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);

    let sent: Value = serde_json::from_slice(
        &server
            .received_requests()
            .await
            .unwrap_or_default()
            .into_iter()
            .find(|r| r.url.path() == "/fcm/send")
            .unwrap()
            .body,
    )
    .unwrap();
    assert_eq!(sent["to"], "explicit-token");
    assert_eq!(sent["data"]["chat_id"], "42");
    assert_eq!(sent["data"]["click_action"], "FLUTTER_NOTIFICATION_CLICK");
}

#[actix_web::test]
async fn test_recipient_without_token() {
    let server = MockServer::start().await;
    mount_profile(&server, "u2", json!([{"fcm_token": null}]), 1).await;

    let app = init_app!(config(legacy_vars(&server)));
    let req = test::TestRequest::post()
        .uri("/")
        .set_json(json!({"recipientId": "u2", "title": "Hi", "message": "there"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({"error": "Recipient FCM token not found"}));
}

#[actix_web::test]
async fn test_profile_store_failure_collapses_to_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/profiles"))
        .respond_with(ResponseTemplate::new(500).set_body_string("db down"))
        .expect(1)
        .mount(&server)
        .await;

    let app = init_app!(config(legacy_vars(&server)));
    let req = test::TestRequest::post()
        .uri("/")
        .set_json(json!({"recipientId": "u3", "title": "Hi", "message": "there"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Recipient FCM token not found");
}

#[actix_web::test]
async fn test_no_target_specified() {
    let server = MockServer::start().await;

    let app = init_app!(config(legacy_vars(&server)));
    let req = test::TestRequest::post()
        .uri("/")
        .set_json(json!({"title": "Hi", "message": "there"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "No FCM token provided or found");
}

#[actix_web::test]
async fn test_malformed_body_uses_error_envelope() {
    let server = MockServer::start().await;

    let app = init_app!(config(legacy_vars(&server)));
    let req = test::TestRequest::post()
        .uri("/")
        .set_json(json!({"fcmToken": "tok", "message": "no title"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);

    let body: Value = test::read_body_json(resp).await;
    assert!(body["error"].as_str().unwrap().contains("title"));
}

#[actix_web::test]
async fn test_cors_preflight() {
    let server = MockServer::start().await;

    let app = init_app!(config(legacy_vars(&server)));
    let req = test::TestRequest::default()
        .method(Method::OPTIONS)
        .uri("/")
        .insert_header(("Origin", "https://app.example.com"))
        .insert_header(("Access-Control-Request-Method", "POST"))
        .insert_header(("Access-Control-Request-Headers", "authorization, content-type"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    assert_eq!(
        resp.headers()
            .get("access-control-allow-origin")
            .and_then(|v| v.to_str().ok()),
        Some("*")
    );
    let allowed = header_value(&resp, "access-control-allow-headers").to_lowercase();
    assert!(allowed.contains("authorization"));
    assert!(allowed.contains("content-type"));
}

#[actix_web::test]
async fn test_cors_preflight_with_unlisted_header() {
    let server = MockServer::start().await;

    let app = init_app!(config(legacy_vars(&server)));
    let req = test::TestRequest::default()
        .method(Method::OPTIONS)
        .uri("/api/v1/push/send")
        .insert_header(("Origin", "https://app.example.com"))
        .insert_header(("Access-Control-Request-Method", "POST"))
        .insert_header((
            "Access-Control-Request-Headers",
            "x-supabase-api-version, content-type",
        ))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    assert_eq!(header_value(&resp, "access-control-allow-origin"), "*");
    assert!(header_value(&resp, "access-control-allow-headers")
        .to_lowercase()
        .contains("x-supabase-api-version"));
}

#[actix_web::test]
async fn test_bare_options_returns_empty_ok() {
    let server = MockServer::start().await;

    let app = init_app!(config(legacy_vars(&server)));
    let req = test::TestRequest::default()
        .method(Method::OPTIONS)
        .uri("/")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    assert_eq!(header_value(&resp, "access-control-allow-origin"), "*");
    assert_eq!(
        header_value(&resp, "access-control-allow-headers"),
        CORS_ALLOWED_HEADERS.join(", ")
    );

    let body = test::read_body(resp).await;
    assert!(body.is_empty());
}
