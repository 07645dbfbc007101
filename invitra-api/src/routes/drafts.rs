//! Bulk-draft REST API Routes
//!
//! `POST /api/bulk-draft` forwards a save through the dedup layer.
//! `GET /api/bulk-draft` loads the stored draft for a user's invitation.

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    routing::get,
    Json, Router,
};
use invitra_core::{Draft, DraftContent, DraftKey, SaveAck};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

// ============================================================================
// TYPES
// ============================================================================

/// Body of a save request.
///
/// `user_id` accepts either a JSON string or a number, since form builders
/// send whichever their session store holds.
#[derive(Debug, Clone, Deserialize)]
pub struct SaveDraftBody {
    #[serde(default, deserialize_with = "string_or_number")]
    pub user_id: Option<String>,
    #[serde(default)]
    pub invitation_title: Option<String>,
    #[serde(flatten)]
    pub content: DraftContent,
}

/// Query parameters of a load request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoadDraftQuery {
    pub user_id: Option<String>,
    pub invitation_title: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadDraftResponse {
    pub success: bool,
    pub data: Option<Draft>,
}

fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(Option::<Raw>::deserialize(deserializer)?.map(|raw| match raw {
        Raw::Text(text) => text,
        Raw::Number(number) => number.to_string(),
    }))
}

fn draft_key(user_id: Option<String>, invitation_title: Option<String>) -> ApiResult<DraftKey> {
    let user_id = user_id.ok_or_else(|| ApiError::missing_field("user_id"))?;
    let invitation_title =
        invitation_title.ok_or_else(|| ApiError::missing_field("invitation_title"))?;
    Ok(DraftKey::new(user_id, invitation_title)?)
}

// ============================================================================
// HANDLERS
// ============================================================================

/// POST /api/bulk-draft
pub async fn save_draft(
    State(state): State<AppState>,
    body: Result<Json<SaveDraftBody>, JsonRejection>,
) -> ApiResult<Json<SaveAck>> {
    let Json(body) = body.map_err(|rejection| ApiError::invalid_input(rejection.body_text()))?;
    let key = draft_key(body.user_id, body.invitation_title)?;

    let ack = state.saver.save_draft(&key, &body.content).await?;
    Ok(Json(ack))
}

/// GET /api/bulk-draft
pub async fn load_draft(
    State(state): State<AppState>,
    Query(query): Query<LoadDraftQuery>,
) -> ApiResult<Json<LoadDraftResponse>> {
    let key = draft_key(query.user_id, query.invitation_title)?;

    let data = state.saver.load_draft(&key).await;
    Ok(Json(LoadDraftResponse {
        success: data.is_some(),
        data,
    }))
}

// ============================================================================
// ROUTER
// ============================================================================

pub const DRAFTS_PATH: &str = "/api/bulk-draft";

pub fn create_router() -> Router<AppState> {
    Router::new().route(DRAFTS_PATH, get(load_draft).post(save_draft))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use invitra_drafts::{DraftSaver, MockDraftBackend, MockFailure};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn test_app(backend: Arc<MockDraftBackend>) -> Router {
        let state = AppState::new(DraftSaver::with_defaults(backend));
        create_router().with_state(state)
    }

    fn post(body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/bulk-draft")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    // ========================================================================
    // SAVE
    // ========================================================================

    #[tokio::test]
    async fn test_identical_saves_reach_backend_once() {
        let backend = Arc::new(MockDraftBackend::new());
        let app = test_app(backend.clone());
        let body = serde_json::json!({
            "user_id": 1,
            "invitation_title": "wedding-a",
            "names_list": "Alice,Bob",
            "template_text": "T1"
        });

        for _ in 0..2 {
            let response = app.clone().oneshot(post(body.clone())).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK);
            assert_eq!(json_body(response).await, serde_json::json!({ "success": true }));
        }
        assert_eq!(backend.save_calls(), 1);

        let key = DraftKey::new("1", "wedding-a").unwrap();
        assert_eq!(backend.stored(&key).unwrap().names_list, "Alice,Bob");
    }

    #[tokio::test]
    async fn test_missing_user_id_is_bad_request() {
        let backend = Arc::new(MockDraftBackend::new());
        let app = test_app(backend.clone());

        let response = app
            .oneshot(post(serde_json::json!({
                "invitation_title": "wedding-a",
                "names_list": "Alice",
                "template_text": "T1"
            })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["code"], "MISSING_FIELD");
        assert_eq!(backend.save_calls(), 0);
    }

    #[tokio::test]
    async fn test_blank_title_is_bad_request() {
        let app = test_app(Arc::new(MockDraftBackend::new()));

        let response = app
            .oneshot(post(serde_json::json!({
                "user_id": "7",
                "invitation_title": "  ",
                "names_list": "Alice",
                "template_text": "T1"
            })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_malformed_json_is_invalid_input() {
        let app = test_app(Arc::new(MockDraftBackend::new()));
        let request = Request::builder()
            .method("POST")
            .uri("/api/bulk-draft")
            .header("content-type", "application/json")
            .body(Body::from("{not json"))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["code"], "INVALID_INPUT");
    }

    #[tokio::test]
    async fn test_backend_failures_map_to_gateway_errors() {
        let backend = Arc::new(MockDraftBackend::failing(MockFailure::Reject));
        let app = test_app(backend.clone());
        let body = serde_json::json!({
            "user_id": "1",
            "invitation_title": "wedding-a",
            "names_list": "Alice",
            "template_text": "T1"
        });

        let response = app.clone().oneshot(post(body.clone())).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(json_body(response).await["code"], "BACKEND_REJECTED");

        backend.set_failure(Some(MockFailure::Network));
        let response = app.oneshot(post(body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(json_body(response).await["code"], "BACKEND_UNAVAILABLE");
    }

    #[tokio::test(start_paused = true)]
    async fn test_hung_backend_is_gateway_timeout() {
        let app = test_app(Arc::new(MockDraftBackend::failing(MockFailure::Hang)));

        let response = app
            .oneshot(post(serde_json::json!({
                "user_id": "1",
                "invitation_title": "wedding-a",
                "names_list": "Alice",
                "template_text": "T1"
            })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(json_body(response).await["code"], "TIMEOUT");
    }

    // ========================================================================
    // LOAD
    // ========================================================================

    #[tokio::test]
    async fn test_load_returns_stored_draft() {
        let backend = Arc::new(MockDraftBackend::new());
        let key = DraftKey::new("1", "wedding-a").unwrap();
        backend.insert(
            key,
            Draft {
                names_list: "Alice,Bob".to_string(),
                template_text: "T1".to_string(),
                checklist_data: None,
                updated_at: Some("2026-10-01 12:00:00".to_string()),
            },
        );
        let app = test_app(backend);

        let request = Request::builder()
            .uri("/api/bulk-draft?user_id=1&invitation_title=wedding-a")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["names_list"], "Alice,Bob");
        assert_eq!(body["data"]["updated_at"], "2026-10-01 12:00:00");
    }

    #[tokio::test]
    async fn test_load_failure_is_absent_draft() {
        let app = test_app(Arc::new(MockDraftBackend::failing(MockFailure::Reject)));

        let request = Request::builder()
            .uri("/api/bulk-draft?user_id=1&invitation_title=missing")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            json_body(response).await,
            serde_json::json!({ "success": false, "data": null })
        );
    }

    #[tokio::test]
    async fn test_load_without_title_is_bad_request() {
        let backend = Arc::new(MockDraftBackend::new());
        let app = test_app(backend.clone());

        let request = Request::builder()
            .uri("/api/bulk-draft?user_id=1")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(backend.load_calls(), 0);
    }

    #[test]
    fn test_save_body_accepts_numeric_user_id() {
        let body: SaveDraftBody = serde_json::from_value(serde_json::json!({
            "user_id": 42,
            "invitation_title": "wedding-a",
            "names_list": "Alice",
            "template_text": "T1",
            "checklist_data": "{\"venue\":true}"
        }))
        .unwrap();

        assert_eq!(body.user_id.as_deref(), Some("42"));
        assert_eq!(body.content.checklist_data.as_deref(), Some("{\"venue\":true}"));
    }
}
