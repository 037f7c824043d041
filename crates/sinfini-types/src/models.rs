use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// -- Products --

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub category: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub category: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
}

/// Every mutable product field. Callers merge partial input with the
/// current record before building one of these.
#[derive(Debug, Clone)]
pub struct ProductUpdate {
    pub name: String,
    pub category: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
}

// -- Blog --

pub const DEFAULT_AUTHOR: &str = "Admin";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlogPost {
    pub id: i64,
    pub title: String,
    /// Rich text (HTML) as authored in the admin editor.
    pub content: String,
    pub author: String,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewBlogPost {
    pub title: String,
    pub content: String,
    pub author: String,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct BlogPostUpdate {
    pub title: String,
    pub content: String,
    pub author: String,
    pub image_url: Option<String>,
}

// -- Gallery --

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Image,
    Video,
}

impl MediaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Video => "video",
        }
    }

    /// Classify an upload by its (already validated) file extension.
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_ascii_lowercase().as_str() {
            "mp4" | "webm" | "ogg" => Self::Video,
            _ => Self::Image,
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownMediaType(pub String);

impl fmt::Display for UnknownMediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown media type '{}'", self.0)
    }
}

impl std::error::Error for UnknownMediaType {}

impl FromStr for MediaType {
    type Err = UnknownMediaType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "image" => Ok(Self::Image),
            "video" => Ok(Self::Video),
            other => Err(UnknownMediaType(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GalleryItem {
    pub id: i64,
    pub media_type: MediaType,
    pub media_url: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewGalleryItem {
    pub media_type: MediaType,
    pub media_url: String,
    pub title: Option<String>,
    pub description: Option<String>,
}
