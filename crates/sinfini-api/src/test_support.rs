//! In-process harness for router tests: in-memory store, temp upload dir,
//! requests driven through `tower::ServiceExt::oneshot`.

use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use sinfini_db::Database;
use sinfini_db::seed::hash_password;

use crate::auth::create_token;
use crate::router::api_router;
use crate::{AppState, AppStateInner};

pub const SECRET: &str = "test-secret";
const BOUNDARY: &str = "sinfini-test-boundary";

pub enum Part<'a> {
    Text(&'a str, &'a str),
    File(&'a str, &'a str, &'a [u8]),
}

impl<'a> Part<'a> {
    pub fn text(name: &'a str, value: &'a str) -> Self {
        Part::Text(name, value)
    }

    pub fn file(name: &'a str, file_name: &'a str, bytes: &'a [u8]) -> Self {
        Part::File(name, file_name, bytes)
    }
}

pub struct TestApp {
    pub state: AppState,
    router: Router,
    upload_dir: TempDir,
}

impl TestApp {
    /// Empty store with a single `admin` / `admin123` account.
    pub fn new() -> Self {
        let db = Database::open_in_memory().unwrap();
        db.create_user("admin", &hash_password("admin123").unwrap()).unwrap();
        Self::with_db(db)
    }

    /// Store populated by the first-run seeder.
    pub fn seeded() -> Self {
        let db = Database::open_in_memory().unwrap();
        db.seed().unwrap();
        Self::with_db(db)
    }

    fn with_db(db: Database) -> Self {
        let upload_dir = tempfile::tempdir().unwrap();
        let state: AppState = Arc::new(AppStateInner {
            db,
            jwt_secret: SECRET.to_string(),
            upload_dir: upload_dir.path().to_path_buf(),
        });
        Self {
            router: api_router(state.clone()),
            state,
            upload_dir,
        }
    }

    pub fn token(&self) -> String {
        create_token(SECRET, "admin").unwrap()
    }

    /// Filesystem location of a `/uploads/...` media reference.
    pub fn upload_path(&self, media_ref: &str) -> PathBuf {
        self.upload_dir
            .path()
            .join(media_ref.trim_start_matches("/uploads/"))
    }

    pub async fn send(&self, req: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(req).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        let req = with_token(Request::builder().uri(uri), token)
            .body(Body::empty())
            .unwrap();
        self.send(req).await
    }

    pub async fn get_with_header(&self, uri: &str, authorization: &str) -> (StatusCode, Value) {
        let req = Request::builder()
            .uri(uri)
            .header(header::AUTHORIZATION, authorization)
            .body(Body::empty())
            .unwrap();
        self.send(req).await
    }

    pub async fn delete(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        let req = with_token(Request::builder().method("DELETE").uri(uri), token)
            .body(Body::empty())
            .unwrap();
        self.send(req).await
    }

    pub async fn post_json(&self, uri: &str, body: Value, token: Option<&str>) -> (StatusCode, Value) {
        self.json("POST", uri, body, token).await
    }

    pub async fn put_json(&self, uri: &str, body: Value, token: Option<&str>) -> (StatusCode, Value) {
        self.json("PUT", uri, body, token).await
    }

    async fn json(&self, method: &str, uri: &str, body: Value, token: Option<&str>) -> (StatusCode, Value) {
        let req = with_token(Request::builder().method(method).uri(uri), token)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(req).await
    }

    pub async fn multipart(
        &self,
        method: &str,
        uri: &str,
        parts: &[Part<'_>],
        token: Option<&str>,
    ) -> (StatusCode, Value) {
        let req = with_token(Request::builder().method(method).uri(uri), token)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(multipart_body(parts)))
            .unwrap();
        self.send(req).await
    }
}

fn with_token(builder: axum::http::request::Builder, token: Option<&str>) -> axum::http::request::Builder {
    match token {
        Some(token) => builder.header(header::AUTHORIZATION, format!("Bearer {token}")),
        None => builder,
    }
}

fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match part {
            Part::Text(name, value) => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
                );
                body.extend_from_slice(value.as_bytes());
            }
            Part::File(name, file_name, bytes) => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\n\
                         Content-Type: application/octet-stream\r\n\r\n"
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(bytes);
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}
