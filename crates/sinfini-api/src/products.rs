use axum::{
    Json,
    extract::{Multipart, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::info;

use sinfini_types::api::MessageResponse;
use sinfini_types::models::{NewProduct, ProductUpdate};

use crate::error::ApiError;
use crate::extract::ApiPath;
use crate::uploads::{FormData, UploadKind, discard_upload_on_err, save_upload};
use crate::{AppState, db_call};

pub async fn list_products(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let products = db_call(&state, |db| db.list_products()).await?;
    Ok(Json(products))
}

pub async fn get_product(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let product = db_call(&state, move |db| db.get_product(id))
        .await?
        .ok_or_else(|| ApiError::NotFound("Product not found".into()))?;
    Ok(Json(product))
}

/// POST /api/products — multipart form: `name`, `category`, optional
/// `description` and `image`.
pub async fn create_product(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let mut form = FormData::read(multipart).await?;
    let name = form.required("name")?;
    let category = form.required("category")?;
    let description = form.optional("description");

    let image_url = match form.take_file("image") {
        Some(file) => Some(save_upload(&state.upload_dir, UploadKind::Products, &file).await?),
        None => None,
    };

    let new_product = NewProduct {
        name,
        category,
        description,
        image_url: image_url.clone(),
    };
    let created = db_call(&state, move |db| {
        let id = db.create_product(&new_product)?;
        db.get_product(id)
    })
    .await
    .and_then(|p| p.ok_or_else(|| ApiError::Internal("created product vanished".into())));
    let product = discard_upload_on_err(&state.upload_dir, image_url.as_deref(), created).await?;

    info!("Created product {} '{}'", product.id, product.name);
    Ok((StatusCode::CREATED, Json(product)))
}

/// PUT /api/products/{id} — fields left out of the form keep their current
/// value; a new `image` replaces the stored reference.
pub async fn update_product(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let mut form = FormData::read(multipart).await?;

    let current = db_call(&state, move |db| db.get_product(id))
        .await?
        .ok_or_else(|| ApiError::NotFound("Product not found".into()))?;

    let new_image = match form.take_file("image") {
        Some(file) => Some(save_upload(&state.upload_dir, UploadKind::Products, &file).await?),
        None => None,
    };
    let image_url = new_image.clone().or(current.image_url);

    let update = ProductUpdate {
        name: form.optional("name").unwrap_or(current.name),
        category: form.optional("category").unwrap_or(current.category),
        description: match form.text("description") {
            Some(text) => Some(text.to_string()).filter(|t| !t.is_empty()),
            None => current.description,
        },
        image_url,
    };

    let updated = db_call(&state, move |db| {
        db.update_product(id, &update)?;
        db.get_product(id)
    })
    .await
    .and_then(|p| p.ok_or_else(|| ApiError::NotFound("Product not found".into())));
    let product = discard_upload_on_err(&state.upload_dir, new_image.as_deref(), updated).await?;

    info!("Updated product {}", id);
    Ok(Json(product))
}

pub async fn delete_product(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let removed = db_call(&state, move |db| db.delete_product(id)).await?;
    if removed {
        info!("Deleted product {}", id);
    }
    Ok(Json(MessageResponse::new("Product deleted successfully")))
}
