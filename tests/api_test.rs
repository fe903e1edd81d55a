//! HTTP API tests
//!
//! The router backed by the filesystem adapters, driven with `oneshot`.

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header::CONTENT_TYPE, Request, StatusCode};
use axum::Router;
use orgdash::adapter::repositories::{JsonDocumentStore, LocalObjectStorage, MemoryPageCache};
use orgdash::application::dto::list_params::{ListParams, PageSizeLimits};
use orgdash::driver::http::router;
use orgdash::driver::AppState;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

const BOUNDARY: &str = "orgdash-test-boundary";

fn setup() -> (Router, Arc<AppState>, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let state = AppState::new(
        Arc::new(JsonDocumentStore::new(temp_dir.path().join("documents"))),
        Arc::new(LocalObjectStorage::new(
            temp_dir.path().join("objects"),
            "orgdash",
            "https://storage.googleapis.com",
        )),
        Arc::new(MemoryPageCache::new(None)),
        PageSizeLimits::default(),
    );

    (router(state.clone()), state, temp_dir)
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn json(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Builds a multipart body from text fields and at most one file
fn multipart(
    method: &str,
    uri: &str,
    fields: &[(&str, &str)],
    file: Option<(&str, &str, &str, &[u8])>,
) -> Request<Body> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                BOUNDARY, name, value
            )
            .as_bytes(),
        );
    }
    if let Some((name, file_name, content_type, bytes)) = file {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                BOUNDARY, name, file_name, content_type
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());

    Request::builder()
        .method(method)
        .uri(uri)
        .header(
            CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

const MEMBER_FIELDS: [(&str, &str); 5] = [
    ("name", "Budi Santoso"),
    ("email", "budi@example.com"),
    ("phone", "081234567890"),
    ("student_id", "13520001"),
    ("bio", "Mahasiswa teknik informatika angkatan 2020"),
];

#[tokio::test]
async fn test_member_multipart_upload() {
    let (app, _state, temp_dir) = setup();

    let (status, body) = send(
        &app,
        multipart(
            "POST",
            "/api/members",
            &MEMBER_FIELDS,
            Some(("photo_url", "budi.png", "image/png", b"PNGDATA")),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    let id = body["id"].as_str().unwrap().to_string();

    let (status, member) = send(&app, get(&format!("/api/members/{}", id))).await;
    assert_eq!(status, StatusCode::OK);
    let key = member["photo_path"].as_str().unwrap();
    assert!(member["photo_url"]
        .as_str()
        .unwrap()
        .starts_with("https://storage.googleapis.com/orgdash/members/"));
    assert_eq!(
        std::fs::read(temp_dir.path().join("objects/orgdash").join(key)).unwrap(),
        b"PNGDATA"
    );
}

#[tokio::test]
async fn test_oversized_photo_is_rejected() {
    let (app, _state, _temp_dir) = setup();
    let large = vec![0u8; 5_000_001];

    let (status, body) = send(
        &app,
        multipart(
            "POST",
            "/api/members",
            &MEMBER_FIELDS,
            Some(("photo_url", "big.png", "image/png", &large)),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["message"], "Invalid file.");
    assert_eq!(body["errors"]["photo_url"][0], "Max file size is 5MB.");
}

#[tokio::test]
async fn test_body_over_limit_is_payload_too_large() {
    let (app, state, _temp_dir) = setup();
    let huge = vec![0u8; 7 * 1024 * 1024];

    let (status, body) = send(
        &app,
        multipart(
            "POST",
            "/api/members",
            &MEMBER_FIELDS,
            Some(("photo_url", "huge.png", "image/png", &huge)),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body["success"], false);
    let members = state
        .members
        .list(&ListParams::from_params(
            Default::default(),
            PageSizeLimits::default(),
        ))
        .await
        .unwrap();
    assert_eq!(members.total_items, 0);
}

#[tokio::test]
async fn test_seeded_products_listing() {
    let (app, state, _temp_dir) = setup();
    state.products.seed().await.unwrap();

    let (status, body) = send(&app, get("/api/products?page=2&perPage=5")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_items"], 20);
    assert_eq!(body["page_count"], 4);
    assert_eq!(body["items"].as_array().unwrap().len(), 5);
    assert_eq!(body["links"]["next"], "/api/products?perPage=5&page=3");
    assert_eq!(body["links"]["prev"], "/api/products?perPage=5&page=1");

    let (status, body) = send(&app, get("/api/products?category=Books.Toys&perPage=100")).await;
    assert_eq!(status, StatusCode::OK);
    for item in body["items"].as_array().unwrap() {
        let category = item["category"].as_str().unwrap();
        assert!(category == "Books" || category == "Toys", "{}", category);
    }
}

#[tokio::test]
async fn test_listing_cache_is_invalidated_by_create() {
    let (app, _state, _temp_dir) = setup();

    let (_, body) = send(&app, get("/api/products")).await;
    assert_eq!(body["total_items"], 0);

    let (status, _) = send(
        &app,
        json(
            "POST",
            "/api/products",
            serde_json::json!({
                "name": "Kursi Kayu",
                "category": "Furniture",
                "price": "125000",
                "description": "Kursi kayu jati untuk ruang sekretariat"
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, body) = send(&app, get("/api/products")).await;
    assert_eq!(body["total_items"], 1);
    assert_eq!(body["items"][0]["name"], "Kursi Kayu");
}

#[tokio::test]
async fn test_period_active_filter() {
    let (app, _state, _temp_dir) = setup();

    for (name, active) in [("2023/2024", "false"), ("2024/2025", "true")] {
        let (status, _) = send(
            &app,
            json(
                "POST",
                "/api/periods",
                serde_json::json!({
                    "name": name,
                    "is_active": active,
                    "start_date": "2024-08-01",
                    "end_date": "2025-07-31"
                }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = send(&app, get("/api/periods?active=active")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_items"], 1);
    assert_eq!(body["items"][0]["name"], "2024/2025");
}

#[tokio::test]
async fn test_unknown_detail_is_not_found() {
    let (app, _state, _temp_dir) = setup();

    let (status, body) = send(&app, get("/api/prestasi/does-not-exist")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Prestasi not found.");
}
