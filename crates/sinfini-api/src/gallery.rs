use axum::{
    Json,
    extract::{Multipart, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::info;

use sinfini_types::api::MessageResponse;
use sinfini_types::models::{MediaType, NewGalleryItem};

use crate::error::ApiError;
use crate::extract::ApiPath;
use crate::uploads::{FormData, UploadKind, discard_upload_on_err, save_upload};
use crate::{AppState, db_call};

pub async fn list_items(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let items = db_call(&state, |db| db.list_gallery_items()).await?;
    Ok(Json(items))
}

/// POST /api/gallery — multipart form with a required `file` part; the media
/// type follows from its extension.
pub async fn create_item(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let mut form = FormData::read(multipart).await?;

    let file = form
        .take_file("file")
        .ok_or_else(|| ApiError::BadRequest("Invalid file".into()))?;
    let ext = file
        .allowed_extension()
        .ok_or_else(|| ApiError::BadRequest("Invalid file".into()))?;

    let media_url = save_upload(&state.upload_dir, UploadKind::Gallery, &file).await?;

    let new_item = NewGalleryItem {
        media_type: MediaType::from_extension(&ext),
        media_url: media_url.clone(),
        title: form.optional("title"),
        description: form.optional("description"),
    };
    let created = db_call(&state, move |db| {
        let id = db.create_gallery_item(&new_item)?;
        db.get_gallery_item(id)
    })
    .await
    .and_then(|item| item.ok_or_else(|| ApiError::Internal("created gallery item vanished".into())));
    let item = discard_upload_on_err(&state.upload_dir, Some(media_url.as_str()), created).await?;

    info!("Created gallery {} item {}", item.media_type, item.id);
    Ok((StatusCode::CREATED, Json(item)))
}

pub async fn delete_item(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<impl IntoResponse, ApiError> {
    if db_call(&state, move |db| db.delete_gallery_item(id)).await? {
        info!("Deleted gallery item {}", id);
    }
    Ok(Json(MessageResponse::new("Gallery item deleted successfully")))
}
