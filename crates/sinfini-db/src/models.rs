//! Row mapping between SQLite and the `sinfini-types` models.
//!
//! Each entity has exactly one `*_from_row` function; the matching
//! `*_COLUMNS` constant fixes the column order it expects.

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::Row;
use rusqlite::types::Type;

use sinfini_types::models::{BlogPost, GalleryItem, MediaType, Product};

/// Account row including the password hash. Only login verification reads it.
pub struct UserRow {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

pub(crate) const USER_COLUMNS: &str = "id, username, password_hash, created_at";
pub(crate) const PRODUCT_COLUMNS: &str =
    "id, name, category, description, image_url, created_at, updated_at";
pub(crate) const BLOG_POST_COLUMNS: &str =
    "id, title, content, author, image_url, created_at, updated_at";
pub(crate) const GALLERY_ITEM_COLUMNS: &str =
    "id, media_type, media_url, title, description, created_at";

/// Current time in the stored format: RFC 3339, UTC, fixed microsecond width,
/// so that text ordering in SQL matches chronological ordering.
pub(crate) fn now_timestamp() -> String {
    format_timestamp(Utc::now())
}

pub(crate) fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Accepts the stored RFC 3339 form and SQLite's `datetime('now')` form.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    raw.parse::<DateTime<Utc>>().or_else(|_| {
        chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
    })
}

fn timestamp_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    parse_timestamp(&raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

pub(crate) fn user_from_row(row: &Row<'_>) -> rusqlite::Result<UserRow> {
    Ok(UserRow {
        id: row.get(0)?,
        username: row.get(1)?,
        password_hash: row.get(2)?,
        created_at: timestamp_at(row, 3)?,
    })
}

pub(crate) fn product_from_row(row: &Row<'_>) -> rusqlite::Result<Product> {
    Ok(Product {
        id: row.get(0)?,
        name: row.get(1)?,
        category: row.get(2)?,
        description: row.get(3)?,
        image_url: row.get(4)?,
        created_at: timestamp_at(row, 5)?,
        updated_at: timestamp_at(row, 6)?,
    })
}

pub(crate) fn blog_post_from_row(row: &Row<'_>) -> rusqlite::Result<BlogPost> {
    Ok(BlogPost {
        id: row.get(0)?,
        title: row.get(1)?,
        content: row.get(2)?,
        author: row.get(3)?,
        image_url: row.get(4)?,
        created_at: timestamp_at(row, 5)?,
        updated_at: timestamp_at(row, 6)?,
    })
}

pub(crate) fn gallery_item_from_row(row: &Row<'_>) -> rusqlite::Result<GalleryItem> {
    let media_type: String = row.get(1)?;
    let media_type = media_type
        .parse::<MediaType>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(1, Type::Text, Box::new(e)))?;

    Ok(GalleryItem {
        id: row.get(0)?,
        media_type,
        media_url: row.get(2)?,
        title: row.get(3)?,
        description: row.get(4)?,
        created_at: timestamp_at(row, 5)?,
    })
}
