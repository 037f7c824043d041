use argon2::{Argon2, PasswordHash, PasswordVerifier};
use axum::{Extension, Json, extract::State, response::IntoResponse};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use tracing::{info, warn};

use sinfini_types::api::{Claims, LoginRequest, LoginResponse, UserInfo, VerifyResponse};

use crate::error::ApiError;
use crate::extract::ApiJson;
use crate::{AppState, db_call};

/// Admin tokens are valid for one day.
const TOKEN_TTL_HOURS: i64 = 24;

pub async fn login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if req.username.is_empty() || req.password.is_empty() {
        return Err(ApiError::BadRequest("Username and password required".into()));
    }

    let username = req.username.clone();
    let password = req.password;
    let verified = db_call(&state, move |db| {
        let Some(user) = db.get_user_by_username(&username)? else {
            return Ok(false);
        };
        Ok(verify_password(&password, &user.password_hash))
    })
    .await?;

    if !verified {
        warn!("Failed login attempt for '{}'", req.username);
        return Err(ApiError::Unauthorized("Invalid credentials".into()));
    }

    let access_token = create_token(&state.jwt_secret, &req.username)
        .map_err(|e| ApiError::Internal(format!("token encoding failed: {e}")))?;

    info!("Admin '{}' logged in", req.username);
    Ok(Json(LoginResponse {
        access_token,
        user: UserInfo {
            username: req.username,
        },
    }))
}

/// GET /api/auth/verify — runs behind `require_auth`, so reaching it means
/// the token is valid.
pub async fn verify(Extension(claims): Extension<Claims>) -> impl IntoResponse {
    Json(VerifyResponse {
        user: UserInfo {
            username: claims.sub,
        },
    })
}

fn verify_password(password: &str, stored_hash: &str) -> bool {
    let parsed = match PasswordHash::new(stored_hash) {
        Ok(parsed) => parsed,
        Err(e) => {
            warn!("Unparseable password hash in users table: {}", e);
            return false;
        }
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

pub fn create_token(secret: &str, username: &str) -> anyhow::Result<String> {
    let claims = Claims {
        sub: username.to_string(),
        exp: (chrono::Utc::now() + chrono::Duration::hours(TOKEN_TTL_HOURS)).timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(token)
}

pub fn decode_token(secret: &str, token: &str) -> jsonwebtoken::errors::Result<Claims> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
}
