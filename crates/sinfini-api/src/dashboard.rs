use axum::{Json, extract::State, response::IntoResponse};

use sinfini_types::api::DashboardStats;

use crate::error::ApiError;
use crate::{AppState, db_call};

/// GET /api/dashboard/stats — record counts for the admin landing page.
pub async fn stats(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let stats = db_call(&state, |db| {
        Ok(DashboardStats {
            products_count: db.count_products()?,
            blog_count: db.count_blog_posts()?,
            gallery_count: db.count_gallery_items()?,
        })
    })
    .await?;
    Ok(Json(stats))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use crate::test_support::TestApp;

    #[tokio::test]
    async fn counts_seeded_content() {
        let app = TestApp::seeded();
        let (status, body) = app.get("/api/dashboard/stats", Some(&app.token())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["products_count"], 3);
        assert_eq!(body["blog_count"], 2);
        assert_eq!(body["gallery_count"], 3);
    }

    #[tokio::test]
    async fn requires_token() {
        let app = TestApp::new();
        let (status, body) = app.get("/api/dashboard/stats", None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "missing_authorization");
    }
}
