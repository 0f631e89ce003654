//! End-to-end tests of the books API through the full router stack.

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use bookshelf_kernel::settings::Settings;
use serde_json::{json, Value};
use tower::ServiceExt;

fn app(settings: &Settings) -> Router {
    let registry = bookshelf_app::build_registry();
    bookshelf_http::build_router(&registry, settings)
}

async fn call(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

fn book(name: &str, page_count: u32, read_page: u32, reading: bool) -> Value {
    json!({
        "name": name,
        "year": 2008,
        "author": "Andrea Hirata",
        "summary": "Sepuluh anak Belitung",
        "publisher": "Bentang Pustaka",
        "pageCount": page_count,
        "readPage": read_page,
        "reading": reading
    })
}

#[tokio::test]
async fn full_book_lifecycle() {
    let app = app(&Settings::default());

    let (status, body) = call(&app, Method::POST, "/books", Some(book("Laskar Pelangi", 529, 529, false))).await;
    assert_eq!(status, StatusCode::CREATED);
    let id = body["data"]["bookId"].as_str().unwrap().to_string();
    assert_eq!(id.len(), 16);

    let (status, body) = call(&app, Method::GET, &format!("/books/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["book"]["finished"], true);
    let inserted_at = body["data"]["book"]["insertedAt"].clone();

    let (status, _) = call(
        &app,
        Method::PUT,
        &format!("/books/{id}"),
        Some(book("Laskar Pelangi (Edisi Baru)", 600, 10, true)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = call(&app, Method::GET, &format!("/books/{id}"), None).await;
    let stored = &body["data"]["book"];
    assert_eq!(stored["id"], id.as_str());
    assert_eq!(stored["name"], "Laskar Pelangi (Edisi Baru)");
    assert_eq!(stored["insertedAt"], inserted_at);
    // finished keeps its creation-time value
    assert_eq!(stored["finished"], true);

    let (status, _) = call(&app, Method::DELETE, &format!("/books/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = call(&app, Method::GET, &format!("/books/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["status"], "fail");
    assert_eq!(body["message"], "Buku tidak ditemukan");
}

#[tokio::test]
async fn list_reflects_filters_and_order() {
    let app = app(&Settings::default());

    for (name, pages, read, reading) in [
        ("Bumi Manusia", 535, 100, true),
        ("Anak Semua Bangsa", 539, 539, false),
        ("Jejak Langkah", 724, 0, false),
    ] {
        let (status, _) = call(&app, Method::POST, "/books", Some(book(name, pages, read, reading))).await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = call(&app, Method::GET, "/books", None).await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<_> = body["data"]["books"]
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, ["Bumi Manusia", "Anak Semua Bangsa", "Jejak Langkah"]);

    let (_, body) = call(&app, Method::GET, "/books?reading=0", None).await;
    assert_eq!(body["data"]["books"].as_array().unwrap().len(), 2);

    // reading is the last filter supplied, so the name filter is discarded
    let (_, body) = call(&app, Method::GET, "/books?name=bumi&reading=0", None).await;
    let names: Vec<_> = body["data"]["books"]
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, ["Anak Semua Bangsa", "Jejak Langkah"]);

    let (status, body) = call(&app, Method::GET, "/books?name=pramoedya", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["books"], json!([]));
}

#[tokio::test]
async fn api_prefix_moves_module_routes() {
    let mut settings = Settings::default();
    settings.server.api_prefix = "/api".to_string();
    let app = app(&settings);

    let (status, _) = call(&app, Method::GET, "/api/books", None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = call(&app, Method::GET, "/books", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn responses_carry_request_id_and_healthz_is_served() {
    let app = app(&Settings::default());

    let request = Request::builder().uri("/healthz").body(Body::empty()).unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn books_health_is_looked_up_as_a_book_id() {
    let app = app(&Settings::default());

    let (status, body) = call(&app, Method::GET, "/books/health", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(
        body,
        json!({"status": "fail", "message": "Buku tidak ditemukan"})
    );

    let (status, body) = call(&app, Method::PUT, "/books/health", Some(json!({"name": ""}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "fail");
    assert_eq!(body["message"], "Gagal memperbarui buku. Mohon isi nama buku");
}

#[tokio::test]
async fn openapi_document_lists_book_routes() {
    let app = app(&Settings::default());

    let (status, body) = call(&app, Method::GET, "/docs/openapi.json", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/books"]["post"].is_object());
    assert!(body["paths"]["/books/{id}"]["delete"].is_object());
    assert!(body["components"]["schemas"]["FailResponse"].is_object());
}
