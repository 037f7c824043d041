use axum::{Json, extract::State, response::IntoResponse};
use tracing::{debug, info};

use sinfini_types::api::{ChatMessageRequest, ChatMessageResponse};
use sinfini_types::chatbot::ChatbotSettingsUpdate;

use crate::error::ApiError;
use crate::extract::ApiJson;
use crate::{AppState, db_call};

pub async fn get_settings(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let settings = db_call(&state, |db| db.get_chatbot_settings()).await?;
    Ok(Json(settings))
}

pub async fn update_settings(
    State(state): State<AppState>,
    ApiJson(update): ApiJson<ChatbotSettingsUpdate>,
) -> Result<impl IntoResponse, ApiError> {
    let faq_count = update.faqs.len();
    let settings = db_call(&state, move |db| {
        db.update_chatbot_settings(&update)?;
        db.get_chatbot_settings()
    })
    .await?;

    info!("Chatbot settings updated ({} FAQs)", faq_count);
    Ok(Json(settings))
}

/// POST /api/chatbot/message — public FAQ lookup.
pub async fn message(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<ChatMessageRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let settings = db_call(&state, |db| db.get_chatbot_settings()).await?;
    let response = settings.respond(&req.message).to_string();
    debug!("Chatbot reply to {:?}: {:?}", req.message, response);
    Ok(Json(ChatMessageResponse { response }))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::{Value, json};

    use sinfini_types::chatbot::{DEFAULT_GREETING, FALLBACK_RESPONSE};

    use crate::test_support::TestApp;

    #[tokio::test]
    async fn default_settings_before_any_save() {
        let app = TestApp::new();
        let (status, body) = app.get("/api/chatbot/settings", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["greeting"], DEFAULT_GREETING);
        assert_eq!(body["faqs"], "[]");
    }

    #[tokio::test]
    async fn update_then_match() {
        let app = TestApp::new();
        let (status, body) = app
            .put_json(
                "/api/chatbot/settings",
                json!({
                    "greeting": "Welcome!",
                    "faqs": [
                        {"question": "Export?", "answer": "A", "keywords": ["export"]},
                        {"question": "Contact?", "answer": "B", "keywords": ["contact"]}
                    ]
                }),
                Some(&app.token()),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["greeting"], "Welcome!");
        let faqs: Value = serde_json::from_str(body["faqs"].as_str().unwrap()).unwrap();
        assert_eq!(faqs.as_array().unwrap().len(), 2);
        assert_eq!(faqs[0]["keywords"], json!(["export"]));

        let (_, reply) = app
            .post_json("/api/chatbot/message", json!({"message": "Where do you export to?"}), None)
            .await;
        assert_eq!(reply["response"], "A");

        let (_, reply) = app
            .post_json("/api/chatbot/message", json!({"message": "hello"}), None)
            .await;
        assert_eq!(reply["response"], FALLBACK_RESPONSE);
    }

    #[tokio::test]
    async fn update_requires_token() {
        let app = TestApp::new();
        let (status, _) = app
            .put_json("/api/chatbot/settings", json!({"greeting": "x", "faqs": []}), None)
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn seeded_faqs_answer_questions() {
        let app = TestApp::seeded();
        let (status, reply) = app
            .post_json("/api/chatbot/message", json!({"message": "How can I CONTACT you?"}), None)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert!(reply["response"].as_str().unwrap().contains("info@sinfinimarketing.com"));
    }

    #[tokio::test]
    async fn settings_round_trip_through_json_text() {
        let app = TestApp::seeded();
        let (status, body) = app.get("/api/chatbot/settings", None).await;
        assert_eq!(status, StatusCode::OK);
        let text = body["faqs"].as_str().unwrap();
        let faqs: Value = serde_json::from_str(text).unwrap();
        assert_eq!(faqs.as_array().unwrap().len(), 4);

        // the admin page parses the string and sends back an array
        let (status, saved) = app
            .put_json(
                "/api/chatbot/settings",
                json!({"greeting": body["greeting"], "faqs": faqs}),
                Some(&app.token()),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(saved["faqs"].as_str().unwrap(), text);

        let (status, saved) = app
            .put_json(
                "/api/chatbot/settings",
                json!({"greeting": "Hi", "faqs": "[]"}),
                Some(&app.token()),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(saved["faqs"], "[]");
    }

    #[tokio::test]
    async fn malformed_bodies_get_json_errors() {
        let app = TestApp::new();

        let (status, body) = app
            .put_json("/api/chatbot/settings", json!({"faqs": []}), Some(&app.token()))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("greeting"));

        let (status, body) = app
            .post_json("/api/chatbot/message", json!("hello"), None)
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }
}
