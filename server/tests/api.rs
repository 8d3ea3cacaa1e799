use axum::http::{self, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use navien_server::handlers::GENERIC_GREETING;
use navien_server::{app, AppState, ServerConfig, SqliteStorage};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

async fn test_app_with(config: ServerConfig) -> Router {
    let storage = SqliteStorage::connect("sqlite::memory:", config.table.clone())
        .await
        .unwrap();
    app(AppState::new(storage, &config))
}

async fn test_app() -> Router {
    test_app_with(ServerConfig::default()).await
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_text(response: axum::response::Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn content_type(response: &axum::response::Response) -> &str {
    response
        .headers()
        .get(http::header::CONTENT_TYPE)
        .unwrap()
        .to_str()
        .unwrap()
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

fn get(uri: &str) -> Request<String> {
    Request::builder().uri(uri).body(String::new()).unwrap()
}

// --- demo01 ---

#[tokio::test]
async fn demo01_greets_by_name() {
    let resp = test_app().await.oneshot(get("/demo01?name=Kim")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(content_type(&resp), "text/plain; charset=utf-8");
    assert_eq!(body_text(resp).await, "[VERSION_1.0.0] Hello, Kim.");
}

#[tokio::test]
async fn demo01_without_name_returns_generic_message() {
    let resp = test_app()
        .await
        .oneshot(json_request("POST", "/demo01", ""))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_text(resp).await, GENERIC_GREETING);
}

// --- named insert ---

#[tokio::test]
async fn navien_insert_from_body_then_select() {
    let app = test_app().await;

    let resp = app
        .clone()
        .oneshot(json_request("POST", "/navien", r#"{"name":"x","url":"y"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_text(resp).await, "Hello x!");

    let resp = app.oneshot(get("/navien-test/x/false")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let rows = body_json(resp).await;
    let rows = rows.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["title"], "x");
    assert_eq!(rows[0]["url"], "y");
    assert_eq!(rows[0]["completed"], false);
    let id = Uuid::parse_str(rows[0]["id"].as_str().unwrap()).unwrap();
    assert_eq!(id.get_version_num(), 4);
}

#[tokio::test]
async fn navien_query_name_wins_and_drops_url() {
    let app = test_app().await;

    let resp = app
        .clone()
        .oneshot(json_request("POST", "/navien?name=a", r#"{"name":"b","url":"c"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_text(resp).await, "Hello a!");

    let rows = body_json(app.clone().oneshot(get("/navien-test/a/0")).await.unwrap()).await;
    assert_eq!(rows.as_array().unwrap().len(), 1);
    assert_eq!(rows[0]["url"], Value::Null);

    let rows = body_json(app.oneshot(get("/navien-test/b/0")).await.unwrap()).await;
    assert!(rows.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn navien_without_name_returns_400() {
    let resp = test_app()
        .await
        .oneshot(json_request("POST", "/navien", r#"{"url":"y"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(content_type(&resp), "application/json; charset=utf-8");
    assert_eq!(
        body_json(resp).await,
        json!({"error": "Please pass a name on the query string or in the request body"})
    );
}

#[tokio::test]
async fn navien_malformed_body_fails_open() {
    let resp = test_app()
        .await
        .oneshot(json_request("POST", "/navien", "not json"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = body_json(resp).await;
    assert!(body["error"].as_str().unwrap().starts_with("Please pass a name"));
}

#[tokio::test]
async fn navien_malformed_body_rejected_when_strict() {
    let config = ServerConfig {
        reject_malformed_body: true,
        ..ServerConfig::default()
    };
    let resp = test_app_with(config)
        .await
        .oneshot(json_request("POST", "/navien", "not json"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = body_json(resp).await;
    assert!(body["error"]
        .as_str()
        .unwrap()
        .starts_with("request body is not valid JSON"));
}

#[tokio::test]
async fn navien_strict_mode_still_accepts_query_only() {
    let config = ServerConfig {
        reject_malformed_body: true,
        ..ServerConfig::default()
    };
    let resp = test_app_with(config)
        .await
        .oneshot(json_request("POST", "/navien?name=q", ""))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_text(resp).await, "Hello q!");
}

// --- passthrough insert ---

#[tokio::test]
async fn navien_2_echoes_body_with_server_id() {
    let app = test_app().await;

    let resp = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/navien-2",
            r#"{"id":"client-id","title":"ohohoho","url":"http://127.0.0.1","completed":true}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    assert_eq!(content_type(&resp), "application/json; charset=utf-8");
    let created = body_json(resp).await;
    assert_eq!(created["title"], "ohohoho");
    assert_eq!(created["completed"], true);
    let id = created["id"].as_str().unwrap().to_string();
    assert_ne!(id, "client-id");
    assert!(Uuid::parse_str(&id).is_ok());

    let rows = body_json(app.oneshot(get(&format!("/navien-test/{id}"))).await.unwrap()).await;
    assert_eq!(rows, json!([created]));
}

async fn create_then_read(app: &Router, body: &str) -> (Value, Value) {
    let resp = app
        .clone()
        .oneshot(json_request("POST", "/navien-2", body))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created = body_json(resp).await;
    let id = created["id"].as_str().unwrap().to_string();

    let resp = app.clone().oneshot(get(&format!("/navien-test/{id}"))).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let rows = body_json(resp).await;
    assert_eq!(rows.as_array().unwrap().len(), 1);
    (created, rows[0].clone())
}

#[tokio::test]
async fn navien_2_text_flag_reads_back() {
    let app = test_app().await;
    let (created, stored) = create_then_read(&app, r#"{"title":"t","completed":"yes"}"#).await;
    assert_eq!(stored["completed"], "yes");
    assert_eq!(created, stored);
}

#[tokio::test]
async fn navien_2_echo_matches_stored_values() {
    let app = test_app().await;

    let (created, stored) = create_then_read(&app, r#"{"title":"t","completed":"true"}"#).await;
    assert_eq!(stored["completed"], "true");
    assert_eq!(created, stored);

    let (created, stored) = create_then_read(&app, r#"{"title":"t","completed":2.5}"#).await;
    assert_eq!(stored["completed"], 2.5);
    assert_eq!(created, stored);

    let (created, stored) =
        create_then_read(&app, r#"{"title":"t","completed":18446744073709551615}"#).await;
    assert_eq!(stored["completed"].as_f64(), Some(18446744073709551615.0));
    assert_eq!(created, stored);

    // TEXT columns store numbers and nested JSON as text.
    let (created, stored) = create_then_read(&app, r#"{"title":5}"#).await;
    assert_eq!(stored["title"], "5");
    assert_eq!(stored["completed"], false);
    assert_eq!(created, stored);

    let (created, stored) = create_then_read(&app, r#"{"title":"t","url":{"a":1}}"#).await;
    assert_eq!(stored["url"], r#"{"a":1}"#);
    assert_eq!(created, stored);
}

#[tokio::test]
async fn navien_2_unknown_column_returns_400() {
    let resp = test_app()
        .await
        .oneshot(json_request("POST", "/navien-2", r#"{"order":"1","title":"t"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = body_json(resp).await;
    assert!(body["error"].as_str().unwrap().contains("order"));
}

#[tokio::test]
async fn navien_2_rejects_non_object() {
    let resp = test_app()
        .await
        .oneshot(json_request("POST", "/navien-2", "[1,2]"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn navien_2_rejects_malformed_json() {
    let resp = test_app()
        .await
        .oneshot(json_request("POST", "/navien-2", "{"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// --- validate ---

#[tokio::test]
async fn validate_accepts_name() {
    let resp = test_app()
        .await
        .oneshot(json_request("POST", "/validate", r#"{"name":"x","url":"y"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(content_type(&resp), "application/json; charset=utf-8");
    assert_eq!(
        body_json(resp).await,
        json!({"message": "This is a custom JSON response", "status": "success"})
    );
}

#[tokio::test]
async fn validate_reports_missing_name() {
    let resp = test_app()
        .await
        .oneshot(json_request("POST", "/validate", r#"{"url":"only"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_json(resp).await;
    assert!(body["error"]
        .as_str()
        .unwrap()
        .contains("'name' is a required property"));
}

#[tokio::test]
async fn validate_empty_body_returns_400() {
    let resp = test_app()
        .await
        .oneshot(json_request("POST", "/validate", ""))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// --- select ---

#[tokio::test]
async fn select_unknown_id_returns_empty_array() {
    let resp = test_app()
        .await
        .oneshot(get("/navien-test/00000000-0000-0000-0000-000000000000"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await, json!([]));
}

#[tokio::test]
async fn select_filter_rejects_bad_flag() {
    let resp = test_app()
        .await
        .oneshot(get("/navien-test/x/maybe"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = body_json(resp).await;
    assert!(body["error"].as_str().unwrap().contains("val2"));
}

#[tokio::test]
async fn select_filter_treats_title_as_data() {
    let app = test_app().await;
    app.clone()
        .oneshot(json_request("POST", "/navien?name=safe", ""))
        .await
        .unwrap();

    let resp = app
        .oneshot(get("/navien-test/x'%20OR%20'1'='1/false"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await, json!([]));
}

// --- full lifecycle ---

#[tokio::test]
async fn insert_and_read_lifecycle() {
    use tower::Service;

    let mut app = test_app().await.into_service();

    for name in ["alpha", "alpha", "beta"] {
        let resp = ServiceExt::ready(&mut app)
            .await
            .unwrap()
            .call(json_request("POST", "/navien", &format!(r#"{{"name":"{name}"}}"#)))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get("/navien-test/alpha/false"))
        .await
        .unwrap();
    let rows = body_json(resp).await;
    let rows = rows.as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert_ne!(rows[0]["id"], rows[1]["id"]);

    let id = rows[0]["id"].as_str().unwrap().to_string();
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get(&format!("/navien-test/{id}")))
        .await
        .unwrap();
    let rows = body_json(resp).await;
    assert_eq!(rows.as_array().unwrap().len(), 1);
    assert_eq!(rows[0]["title"], "alpha");

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get("/navien-test/alpha/true"))
        .await
        .unwrap();
    assert_eq!(body_json(resp).await, json!([]));
}
