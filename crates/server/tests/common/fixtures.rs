//! Request helpers and test data.

use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode};
use serde_json::{Value, json};
use tower::ServiceExt;

/// Boundary used by [`multipart_body`].
pub const MULTIPART_BOUNDARY: &str = "hitos-test-boundary";

/// PNG signature and IHDR tag. Upload contents are never inspected.
#[allow(dead_code)]
pub const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";

/// Send a request with an optional JSON body and decode the JSON response.
#[allow(dead_code)]
pub async fn json_request(
    router: &axum::Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);

    let body = match body {
        Some(v) => {
            builder = builder.header("Content-Type", "application/json");
            Body::from(serde_json::to_vec(&v).unwrap())
        }
        None => Body::empty(),
    };

    let (status, _, bytes) = send(router, builder.body(body).unwrap()).await;
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, json)
}

/// Send a request and collect status, headers and body.
#[allow(dead_code)]
pub async fn send(router: &axum::Router, request: Request<Body>) -> (StatusCode, HeaderMap, Vec<u8>) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, headers, bytes.to_vec())
}

/// One part of a multipart form.
#[allow(dead_code)]
pub struct Part<'a> {
    pub name: &'a str,
    pub file_name: Option<&'a str>,
    pub content_type: Option<&'a str>,
    pub data: &'a [u8],
}

/// Encode parts as a `multipart/form-data` body using [`MULTIPART_BOUNDARY`].
#[allow(dead_code)]
pub fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{MULTIPART_BOUNDARY}\r\n").as_bytes());
        let mut disposition = format!("Content-Disposition: form-data; name=\"{}\"", part.name);
        if let Some(file_name) = part.file_name {
            disposition.push_str(&format!("; filename=\"{file_name}\""));
        }
        body.extend_from_slice(disposition.as_bytes());
        body.extend_from_slice(b"\r\n");
        if let Some(content_type) = part.content_type {
            body.extend_from_slice(format!("Content-Type: {content_type}\r\n").as_bytes());
        }
        body.extend_from_slice(b"\r\n");
        body.extend_from_slice(part.data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{MULTIPART_BOUNDARY}--\r\n").as_bytes());
    body
}

/// Build a multipart upload request for `/api/upload`.
#[allow(dead_code)]
pub fn upload_request(parts: &[Part<'_>], host: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/api/upload")
        .header(
            "Content-Type",
            format!("multipart/form-data; boundary={MULTIPART_BOUNDARY}"),
        );
    if let Some(host) = host {
        builder = builder.header("Host", host);
    }
    builder.body(Body::from(multipart_body(parts))).unwrap()
}

/// Upload a single image in the `image` field.
#[allow(dead_code)]
pub fn image_upload_request(file_name: &str, content_type: &str, data: &[u8]) -> Request<Body> {
    upload_request(
        &[Part {
            name: "image",
            file_name: Some(file_name),
            content_type: Some(content_type),
            data,
        }],
        Some("hitos.test"),
    )
}

/// Milestone body with the required fields.
#[allow(dead_code)]
pub fn milestone_body(item: i64, stage_id: i64, location: &str) -> Value {
    json!({
        "item": item,
        "stage_id": stage_id,
        "start_date": "2024-03-01",
        "location": location,
    })
}

/// Create a milestone through the API and return its id.
#[allow(dead_code)]
pub async fn create_milestone(router: &axum::Router, body: Value) -> i64 {
    let (status, json) = json_request(router, "POST", "/api/milestones", Some(body)).await;
    assert_eq!(status, StatusCode::CREATED, "{json}");
    json["id"].as_i64().expect("milestone id")
}

/// Create a stage through the API and return its id.
#[allow(dead_code)]
pub async fn create_stage(router: &axum::Router, name: &str) -> i64 {
    let (status, json) = json_request(
        router,
        "POST",
        "/api/stages",
        Some(json!({ "name": name, "color": "#123456" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{json}");
    json["id"].as_i64().expect("stage id")
}
