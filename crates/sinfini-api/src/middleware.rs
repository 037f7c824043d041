use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use jsonwebtoken::errors::ErrorKind;

use crate::AppState;
use crate::auth::decode_token;
use crate::error::ApiError;

/// Extract and validate the admin JWT from the Authorization header.
/// On success the decoded `Claims` are available as a request extension.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::Unauthorized("missing_authorization".into()))?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| ApiError::Unauthorized("missing_authorization".into()))?;

    let claims = decode_token(&state.jwt_secret, token).map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => ApiError::Unauthorized("token_expired".into()),
        _ => ApiError::Unauthorized("invalid_token".into()),
    })?;

    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use jsonwebtoken::{EncodingKey, Header, encode};
    use sinfini_types::api::Claims;

    use crate::test_support::{SECRET, TestApp};

    #[tokio::test]
    async fn expired_token_is_reported() {
        let app = TestApp::new();
        let claims = Claims {
            sub: "admin".into(),
            exp: (chrono::Utc::now() - chrono::Duration::hours(2)).timestamp() as usize,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        let (status, body) = app.get("/api/dashboard/stats", Some(&token)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "token_expired");
    }

    #[tokio::test]
    async fn non_bearer_scheme_is_rejected() {
        let app = TestApp::new();
        let (status, body) = app.get_with_header("/api/dashboard/stats", "Basic YWRtaW46YWRtaW4=").await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "missing_authorization");
    }
}
