//! The tag prediction endpoint.

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;

use crate::auth::RequireUser;
use crate::store::UserStore;

use super::AppState;

#[derive(Debug, Deserialize)]
struct TagsRequest {
    #[serde(default)]
    question: Option<String>,
}

fn bad_request(message: &str) -> Response {
    (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
}

fn prediction_failure(message: &str, model_loaded: bool) -> Response {
    let status = if model_loaded { "loaded" } else { "not loaded" };
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "error": message,
            "model_status": status,
            "tokenizer_status": status,
        })),
    )
        .into_response()
}

/// POST /get_tags
///
/// The body is read as JSON whatever the content type says.
pub async fn get_tags<S: UserStore>(
    State(state): State<AppState<S>>,
    RequireUser(user): RequireUser,
    body: Bytes,
) -> Response {
    let Some(tagger) = state.tagger().cloned() else {
        log::error!("Error in /get_tags: model not loaded");
        return prediction_failure(
            "Error in /get_tags: Model not loaded - check server startup logs",
            false,
        );
    };

    let request: TagsRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(e) => {
            log::debug!("Rejected /get_tags body: {}", e);
            return bad_request("Invalid JSON body");
        }
    };

    let question = request.question.unwrap_or_default().trim().to_string();
    log::debug!("Received question from user {}: {}", user.user_id, question);
    if question.is_empty() {
        return bad_request("No question provided");
    }

    let model_name = tagger.model_name().to_string();
    let prediction = tokio::task::spawn_blocking(move || tagger.predict(&question)).await;

    match prediction {
        Ok(Ok(scores)) => {
            let tags: Vec<String> = scores.into_iter().map(|s| s.tag).collect();
            log::debug!("Predicted tags: {:?}", tags);
            Json(json!({
                "tags": tags,
                "model": model_name,
                "status": "success",
            }))
            .into_response()
        }
        Ok(Err(e)) => {
            log::error!("Error in /get_tags: {}", e);
            prediction_failure("Tag prediction failed", true)
        }
        Err(e) => {
            log::error!("Error in /get_tags: prediction task failed: {}", e);
            prediction_failure("Tag prediction failed", true)
        }
    }
}

/// GET /health
pub async fn health<S: UserStore>(State(state): State<AppState<S>>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "model_status": if state.tagger().is_some() { "loaded" } else { "not loaded" },
        "auth_status": if state.auth_enabled() { "enabled" } else { "disabled" },
    }))
}
