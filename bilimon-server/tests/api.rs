//! Router-level tests against the in-memory store

use std::sync::Arc;
use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use mongodb::bson::{doc, DateTime, Document};
use serde_json::{json, Value};
use tower::ServiceExt;

use bilimon_server::http::auth::{session_token, SESSION_COOKIE};
use bilimon_server::http::AuthGate;
use bilimon_server::store::MemoryStore;
use bilimon_server::workflow::{DispatchMode, RecordingDispatcher};
use bilimon_server::{build_router, AppState};

const BVID: &str = "BV1GJ411x7h7";

fn app(store: &MemoryStore) -> Router {
    build_router(AppState::new(
        Arc::new(store.clone()),
        Arc::new(RecordingDispatcher::new()),
    ))
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    call(app, builder.body(body).unwrap()).await
}

async fn call(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

fn comment(i: i64) -> Document {
    doc! {
        "rpid": (10_000 + i),
        "user": format!("user{i}"),
        "mid": (500 + i),
        "content": format!("comment #{i}"),
        "ctime": (1_704_412_989 + i),
        "level": 3,
        "likes": (i % 7),
        "root": 0,
    }
}

#[tokio::test]
async fn health_is_open() {
    let store = MemoryStore::new();
    let (status, body) = send(&app(&store), "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn comment_limit_is_capped_at_100() {
    let store = MemoryStore::new();
    store
        .seed(&format!("comments_{BVID}"), (0..150).map(comment))
        .await;
    let app = app(&store);

    let (status, body) = send(&app, "GET", &format!("/api/comments/{BVID}?limit=1000"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["code"], 0);
    assert_eq!(body["data"]["total"], 150);
    let comments = body["data"]["comments"].as_array().unwrap();
    assert_eq!(comments.len(), 100);
    // newest first
    assert_eq!(comments[0]["rpid"], 10_149);
    assert_eq!(comments[0]["is_reply"], false);

    let (_, body) = send(&app, "GET", &format!("/api/comments/{BVID}?offset=140"), None).await;
    assert_eq!(body["data"]["comments"].as_array().unwrap().len(), 10);
}

#[tokio::test]
async fn video_detail_needs_metadata() {
    let store = MemoryStore::new();
    let app = app(&store);

    let (status, body) = send(&app, "GET", &format!("/api/video/{BVID}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["code"], 404);

    store
        .seed(
            "video_metadata",
            vec![doc! {
                "bvid": BVID,
                "title": "测试视频",
                "oid": 170001_i64,
                "comment_count": 30,
                "last_updated": DateTime::from_millis(1_704_412_989_000),
            }],
        )
        .await;
    store.seed(&format!("comments_{BVID}"), (0..30).map(comment)).await;

    let (_, body) = send(&app, "GET", &format!("/api/video/{BVID}"), None).await;
    assert_eq!(body["code"], 0);
    assert_eq!(body["data"]["video"]["title"], "测试视频");
    assert_eq!(body["data"]["video"]["last_updated"], "2024/1/5 08:03:09");
    assert_eq!(body["data"]["comments"].as_array().unwrap().len(), 20);

    let (_, body) = send(&app, "GET", "/api/videos", None).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn malformed_bvid_is_rejected_before_store() {
    let store = MemoryStore::new();
    let (status, body) = send(&app(&store), "GET", "/api/comments/not-a-video", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["code"], 400);
    assert_eq!(store.open_connections(), 0);
}

fn raw(method: &str, uri: &str, content_type: Option<&str>, body: &'static str) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(ct) = content_type {
        builder = builder.header(header::CONTENT_TYPE, ct);
    }
    builder.body(Body::from(body)).unwrap()
}

#[tokio::test]
async fn undecodable_input_answers_with_envelope() {
    let store = MemoryStore::new();
    let app = app(&store);
    let json = Some("application/json");

    let cases = [
        raw("POST", "/api/monitor", json, "{not json"),
        raw("POST", "/api/monitor", json, r#"{"bvid":123}"#),
        raw("POST", "/api/monitor", None, r#"{"bvid":"BV1GJ411x7h7"}"#),
        raw("PATCH", &format!("/api/monitor/{BVID}"), json, r#"{"enabled":"yes"}"#),
        raw("POST", "/api/cookies", json, r#""SESSDATA=abc""#),
        raw("POST", "/api/run", json, r#"{"fetch_replies":"maybe"}"#),
        raw("POST", "/records", json, "{"),
        raw("GET", &format!("/api/comments/{BVID}?limit=abc"), None, ""),
        raw("GET", &format!("/api/stats/{BVID}?limit=-"), None, ""),
    ];
    for request in cases {
        let uri = request.uri().to_string();
        let (status, body) = call(&app, request).await;
        assert_eq!(status, StatusCode::OK, "{uri}");
        assert_eq!(body["code"], 400, "{uri}");
        assert!(body["msg"].as_str().unwrap().starts_with("malformed"), "{uri}");
    }
    assert_eq!(store.open_connections(), 0);
}

#[tokio::test]
async fn loosely_typed_crawler_documents_are_served() {
    let store = MemoryStore::new();
    store
        .seed(
            &format!("comments_{BVID}"),
            vec![
                doc! { "rpid": 1_i64, "ctime": 1_704_412_989_i64, "sex": "男" },
                doc! { "rpid": 254_000_000_001.0_f64, "mid": 3.546e15_f64, "ctime": 1_704_412_990_i64 },
                doc! { "rpid": 3_i32, "sex": mongodb::bson::Bson::Null, "ctime": 1_704_412_991_i64 },
            ],
        )
        .await;
    store
        .seed(
            "video_metadata",
            vec![doc! { "bvid": BVID, "title": mongodb::bson::Bson::Null, "comment_count": 3.0_f64 }],
        )
        .await;
    let app = app(&store);

    let (_, body) = send(&app, "GET", &format!("/api/comments/{BVID}"), None).await;
    assert_eq!(body["data"]["total"], 3);
    let comments = body["data"]["comments"].as_array().unwrap();
    assert_eq!(comments.len(), 3);
    assert_eq!(comments[1]["rpid"], 254_000_000_001_i64);
    assert_eq!(comments[1]["mid"], 3_546_000_000_000_000_i64);
    assert_eq!(comments[0]["sex"], "");

    let (_, body) = send(&app, "GET", &format!("/api/video/{BVID}"), None).await;
    assert_eq!(body["code"], 0);
    assert_eq!(body["data"]["video"]["title"], "");
    assert_eq!(body["data"]["video"]["comment_count"], 3);
    assert_eq!(body["data"]["comments"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn duplicate_monitor_is_rejected() {
    let store = MemoryStore::new();
    let app = app(&store);
    let add = json!({ "bvid": format!("https://www.bilibili.com/video/{BVID}/"), "title": "first" });

    let (_, body) = send(&app, "POST", "/api/monitor", Some(add.clone())).await;
    assert_eq!(body["code"], 0);
    assert_eq!(body["data"]["bvid"], BVID);
    assert_eq!(body["data"]["enabled"], true);

    let (status, body) = send(&app, "POST", "/api/monitor", Some(add)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["code"], 400);
    assert!(body["msg"].as_str().unwrap().contains("already exists"));

    let (_, body) = send(&app, "GET", "/api/monitor", None).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"][0]["title"], "first");
}

#[tokio::test]
async fn monitor_title_defaults_to_crawled_title() {
    let store = MemoryStore::new();
    store
        .seed("video_metadata", vec![doc! { "bvid": BVID, "title": "已抓取的标题" }])
        .await;
    let (_, body) = send(&app(&store), "POST", "/api/monitor", Some(json!({ "bvid": BVID }))).await;
    assert_eq!(body["data"]["title"], "已抓取的标题");
}

#[tokio::test]
async fn toggle_preserves_identity() {
    let store = MemoryStore::new();
    let app = app(&store);
    send(
        &app,
        "POST",
        "/api/monitor",
        Some(json!({ "bvid": BVID, "title": "keep me", "fetch_replies": true })),
    )
    .await;

    let uri = format!("/api/monitor/{BVID}");
    let (_, body) = send(&app, "PATCH", &uri, Some(json!({ "enabled": false }))).await;
    assert_eq!(body["code"], 0);
    assert_eq!(body["data"]["enabled"], false);
    assert_eq!(body["data"]["title"], "keep me");
    assert_eq!(body["data"]["bvid"], BVID);
    assert_eq!(body["data"]["fetch_replies"], true);

    let (_, body) = send(&app, "PATCH", &uri, Some(json!({ "enabled": true }))).await;
    assert_eq!(body["data"]["enabled"], true);
    assert_eq!(body["data"]["title"], "keep me");

    let (_, body) = send(&app, "PATCH", &uri, Some(json!({}))).await;
    assert_eq!(body["code"], 400);

    let (_, body) = send(&app, "PATCH", "/api/monitor/BV1missing", Some(json!({ "enabled": true }))).await;
    assert_eq!(body["code"], 404);

    let (_, body) = send(&app, "DELETE", &uri, None).await;
    assert_eq!(body["code"], 0);
    let (_, body) = send(&app, "DELETE", &uri, None).await;
    assert_eq!(body["code"], 404);
}

#[tokio::test]
async fn cookie_pool_delete_by_position() {
    let store = MemoryStore::new();
    let app = app(&store);

    let (_, body) = send(
        &app,
        "POST",
        "/api/cookies",
        Some(json!({ "cookies": [
            { "sessdata": "sessdata-first-0001", "buvid3": "b1", "bili_jct": "j1" },
            { "sessdata": "sessdata-second-0002", "buvid3": "b2", "bili_jct": "j2" },
            { "sessdata": "sessdata-third-0003", "buvid3": "b3", "bili_jct": "j3" },
        ]})),
    )
    .await;
    assert_eq!(body["data"]["added"], 3);

    let (_, body) = send(&app, "DELETE", "/api/cookies/1", None).await;
    assert_eq!(body["code"], 0);

    let (_, body) = send(&app, "GET", "/api/cookies", None).await;
    let pool = body["data"].as_array().unwrap();
    assert_eq!(pool.len(), 2);
    assert_eq!(pool[0]["sessdata"], "sess****0001");
    assert_eq!(pool[1]["sessdata"], "sess****0003");
    assert_eq!(pool[1]["index"], 1);

    let (_, body) = send(&app, "DELETE", "/api/cookies/2", None).await;
    assert_eq!(body["code"], 404);

    let (_, body) = send(&app, "DELETE", "/api/cookies/abc", None).await;
    assert_eq!(body["code"], 400);

    let (_, body) = send(&app, "POST", "/api/cookies", Some(json!({ "cookies": [] }))).await;
    assert_eq!(body["code"], 400);

    let (_, body) = send(&app, "DELETE", "/api/cookies", None).await;
    assert_eq!(body["data"]["deleted"], 2);
}

#[tokio::test]
async fn unconfigured_store_reports_500() {
    let state = bilimon_server::AppConfig::default().into_state();
    let app = build_router(state);
    let (status, body) = send(&app, "GET", "/api/videos", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["code"], 500);
    assert!(body["msg"].as_str().unwrap().contains("MONGODB_URI"));
}

#[tokio::test]
async fn session_gate_protects_api() {
    let store = MemoryStore::new();
    let app = build_router(
        AppState::new(Arc::new(store.clone()), Arc::new(RecordingDispatcher::new()))
            .with_auth(AuthGate::new(Some("admin".into()), Some("secret".into()))),
    );

    let (status, body) = send(&app, "GET", "/api/videos", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], 401);

    let token = session_token("admin", "secret");
    let request = Request::builder()
        .uri("/api/videos")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    let (status, body) = call(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["code"], 0);

    let request = Request::builder()
        .uri("/api/auth/check")
        .header(header::COOKIE, format!("{SESSION_COOKIE}={token}"))
        .body(Body::empty())
        .unwrap();
    let (status, body) = call(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!({ "authenticated": true, "required": true }));

    // Connector and health stay open
    let (status, _) = send(&app, "GET", "/meta.json", None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&app, "POST", "/records", Some(json!({}))).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn login_sets_session_cookie() {
    let store = MemoryStore::new();
    let app = build_router(
        AppState::new(Arc::new(store), Arc::new(RecordingDispatcher::new()))
            .with_auth(AuthGate::new(Some("admin".into()), Some("secret".into()))),
    );

    let (status, _) = send(
        &app,
        "POST",
        "/api/auth/login",
        Some(json!({ "username": "admin", "password": "nope" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let request = Request::builder()
        .method("POST")
        .uri("/api/auth/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json!({ "username": "admin", "password": "secret" }).to_string()))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
    assert!(cookie.starts_with(&format!("{SESSION_COOKIE}={}", session_token("admin", "secret"))));
}

#[tokio::test]
async fn records_page_through_large_collection() {
    let store = MemoryStore::new();
    store
        .seed(&format!("comments_{BVID}"), (0..1200).map(comment))
        .await;
    store
        .seed("video_metadata", vec![doc! { "bvid": BVID, "title": "分页视频" }])
        .await;
    let app = app(&store);

    let mut token = String::new();
    let mut sizes = Vec::new();
    let mut flags = Vec::new();
    loop {
        let params = json!({
            "datasourceConfig": json!({ "collection": format!("comments_{BVID}") }).to_string(),
            "pageToken": token,
            "maxPageSize": 1000,
        })
        .to_string();
        let (_, body) = send(&app, "POST", "/records", Some(json!({ "params": params, "context": {} }))).await;
        assert_eq!(body["code"], 0);
        let data = &body["data"];
        sizes.push(data["records"].as_array().unwrap().len());
        flags.push(data["hasMore"].as_bool().unwrap());
        if !flags[flags.len() - 1] {
            assert_eq!(data["nextPageToken"], "");
            break;
        }
        token = data["nextPageToken"].as_str().unwrap().to_owned();
    }
    assert_eq!(sizes, vec![500, 500, 200]);
    assert_eq!(flags, vec![true, true, false]);

    let (_, body) = send(
        &app,
        "POST",
        "/table_meta",
        Some(json!({ "params": { "datasourceConfig": { "collection": format!("comments_{BVID}") } } })),
    )
    .await;
    assert_eq!(body["data"]["tableName"], "分页视频");
    assert_eq!(body["data"]["fields"][0]["fieldId"], "id");
    assert_eq!(body["data"]["fields"][0]["isPrimary"], true);

    assert_eq!(store.open_connections(), 0);
}

#[tokio::test]
async fn stats_records_render_zero_views() {
    let store = MemoryStore::new();
    store
        .seed(
            "video_stats",
            vec![doc! { "bvid": BVID, "timestamp": DateTime::from_millis(1_704_412_989_000), "view": 0 }],
        )
        .await;
    let (_, body) = send(
        &app(&store),
        "POST",
        "/records",
        Some(json!({ "params": { "datasourceConfig": { "collection": "video_stats" } } })),
    )
    .await;
    let record = &body["data"]["records"][0]["data"];
    assert_eq!(record["view"], "0");
    assert_eq!(record["timestamp"], "2024/1/5 08:03:09");
}

#[tokio::test]
async fn run_dispatches_through_workflow() {
    let store = MemoryStore::new();
    let dispatcher = Arc::new(RecordingDispatcher::new());
    let app = build_router(
        AppState::new(Arc::new(store), dispatcher.clone()).with_dispatch_mode(DispatchMode::Blocking),
    );

    let (_, body) = send(&app, "POST", "/api/run", Some(json!({ "bvid": BVID, "fetch_replies": true }))).await;
    assert_eq!(body["code"], 0);
    let calls = dispatcher.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].bvid.as_ref().unwrap().as_str(), BVID);
    assert!(calls[0].fetch_replies);

    let (_, body) = send(&app, "GET", "/api/run/status", None).await;
    assert_eq!(body["data"]["configured"], true);
}

#[tokio::test]
async fn background_run_is_submitted() {
    let dispatcher = Arc::new(RecordingDispatcher::new());
    let app = build_router(AppState::new(Arc::new(MemoryStore::new()), dispatcher.clone()));

    let (_, body) = send(&app, "POST", "/api/run", Some(json!({}))).await;
    assert_eq!(body["code"], 0);
    for _ in 0..50 {
        if !dispatcher.calls().is_empty() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(dispatcher.calls().len(), 1);
    assert!(dispatcher.calls()[0].bvid.is_none());
}

#[tokio::test]
async fn run_without_credentials() {
    let app = build_router(AppState::new(
        Arc::new(MemoryStore::new()),
        Arc::new(RecordingDispatcher::unconfigured()),
    ));

    let (_, body) = send(&app, "POST", "/api/run", Some(json!({ "bvid": BVID }))).await;
    assert_eq!(body["code"], 500);

    let (_, body) = send(&app, "GET", "/api/run/status", None).await;
    assert_eq!(body["code"], 0);
    assert_eq!(body["data"], json!({ "configured": false }));
}
