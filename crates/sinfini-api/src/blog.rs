use axum::{
    Json,
    extract::{Multipart, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::info;

use sinfini_types::api::MessageResponse;
use sinfini_types::models::{BlogPostUpdate, DEFAULT_AUTHOR, NewBlogPost};

use crate::error::ApiError;
use crate::extract::ApiPath;
use crate::uploads::{FormData, UploadKind, discard_upload_on_err, save_upload};
use crate::{AppState, db_call};

pub async fn list_posts(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let posts = db_call(&state, |db| db.list_blog_posts()).await?;
    Ok(Json(posts))
}

pub async fn get_post(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let post = db_call(&state, move |db| db.get_blog_post(id))
        .await?
        .ok_or_else(|| ApiError::NotFound("Blog post not found".into()))?;
    Ok(Json(post))
}

pub async fn create_post(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let mut form = FormData::read(multipart).await?;
    let title = form.required("title")?;
    let content = form.required("content")?;
    let author = form
        .optional("author")
        .unwrap_or_else(|| DEFAULT_AUTHOR.to_string());

    let image_url = match form.take_file("image") {
        Some(file) => Some(save_upload(&state.upload_dir, UploadKind::Blog, &file).await?),
        None => None,
    };

    let new_post = NewBlogPost {
        title,
        content,
        author,
        image_url: image_url.clone(),
    };
    let created = db_call(&state, move |db| {
        let id = db.create_blog_post(&new_post)?;
        db.get_blog_post(id)
    })
    .await
    .and_then(|p| p.ok_or_else(|| ApiError::Internal("created blog post vanished".into())));
    let post = discard_upload_on_err(&state.upload_dir, image_url.as_deref(), created).await?;

    info!("Created blog post {} '{}'", post.id, post.title);
    Ok((StatusCode::CREATED, Json(post)))
}

pub async fn update_post(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let mut form = FormData::read(multipart).await?;

    let current = db_call(&state, move |db| db.get_blog_post(id))
        .await?
        .ok_or_else(|| ApiError::NotFound("Blog post not found".into()))?;

    let new_image = match form.take_file("image") {
        Some(file) => Some(save_upload(&state.upload_dir, UploadKind::Blog, &file).await?),
        None => None,
    };
    let image_url = new_image.clone().or(current.image_url);

    let update = BlogPostUpdate {
        title: form.optional("title").unwrap_or(current.title),
        content: form.optional("content").unwrap_or(current.content),
        author: form.optional("author").unwrap_or(current.author),
        image_url,
    };

    let updated = db_call(&state, move |db| {
        db.update_blog_post(id, &update)?;
        db.get_blog_post(id)
    })
    .await
    .and_then(|p| p.ok_or_else(|| ApiError::NotFound("Blog post not found".into())));
    let post = discard_upload_on_err(&state.upload_dir, new_image.as_deref(), updated).await?;

    info!("Updated blog post {}", id);
    Ok(Json(post))
}

pub async fn delete_post(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<impl IntoResponse, ApiError> {
    if db_call(&state, move |db| db.delete_blog_post(id)).await? {
        info!("Deleted blog post {}", id);
    }
    Ok(Json(MessageResponse::new("Blog post deleted successfully")))
}
