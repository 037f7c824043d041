use axum::{Json, response::IntoResponse};
use tracing::info;

use sinfini_types::api::{ContactRequest, MessageResponse};

use crate::error::ApiError;
use crate::extract::ApiJson;

/// POST /api/contact — the enquiry is logged for follow-up; nothing is stored.
pub async fn submit(ApiJson(req): ApiJson<ContactRequest>) -> Result<impl IntoResponse, ApiError> {
    if req.email.trim().is_empty() || req.message.trim().is_empty() {
        return Err(ApiError::BadRequest("Email and message required".into()));
    }

    info!(
        name = %req.name,
        email = %req.email,
        phone = req.phone.as_deref().unwrap_or(""),
        subject = req.subject.as_deref().unwrap_or(""),
        "Contact form enquiry: {}",
        req.message
    );

    Ok(Json(MessageResponse::new("Message sent successfully")))
}
