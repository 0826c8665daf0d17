#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header, Request, Response};
use axum::Router;
use tagwizard::{TagPredictor, TagScore, TaggerError};
use tower::ServiceExt;

/// Returns fixed tags, or a model error when the question mentions "explode".
pub struct StubPredictor;

impl TagPredictor for StubPredictor {
    fn predict(&self, text: &str) -> Result<Vec<TagScore>, TaggerError> {
        if text.contains("explode") {
            return Err(TaggerError::ModelError("onnx session crashed at /secret/path".into()));
        }
        Ok(["rust", "async", "tokio", "axum", "serde"]
            .iter()
            .enumerate()
            .map(|(i, tag)| TagScore {
                tag: (*tag).to_string(),
                score: 0.9 - i as f32 * 0.1,
            })
            .collect())
    }

    fn model_name(&self) -> &str {
        "stub-model"
    }
}

pub async fn send(app: &Router, request: Request<Body>) -> Response<Body> {
    app.clone().oneshot(request).await.expect("router is infallible")
}

pub async fn body_string(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body should be readable");
    String::from_utf8(bytes.to_vec()).expect("body should be UTF-8")
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let body = body_string(response).await;
    serde_json::from_str(&body).expect("body should be JSON")
}

pub fn location(response: &Response<Body>) -> Option<&str> {
    response.headers().get(header::LOCATION)?.to_str().ok()
}

/// The `name=value` part of the first Set-Cookie header.
pub fn session_cookie(response: &Response<Body>) -> Option<String> {
    let raw = response.headers().get(header::SET_COOKIE)?.to_str().ok()?;
    raw.split(';').next().map(str::to_string)
}

pub fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::get(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

pub fn post_form(uri: &str, form: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::post(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(form.to_string())).unwrap()
}

pub fn post_json(uri: &str, json: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::post(uri).header(header::CONTENT_TYPE, "application/json");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(json.to_string())).unwrap()
}
