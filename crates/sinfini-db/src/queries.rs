use anyhow::Result;
use rusqlite::{Connection, OptionalExtension, params};

use sinfini_types::chatbot::{ChatbotSettings, ChatbotSettingsUpdate, Faq};
use sinfini_types::models::{
    BlogPost, BlogPostUpdate, GalleryItem, NewBlogPost, NewGalleryItem, NewProduct, Product,
    ProductUpdate,
};

use crate::Database;
use crate::models::{
    BLOG_POST_COLUMNS, GALLERY_ITEM_COLUMNS, PRODUCT_COLUMNS, USER_COLUMNS, UserRow,
    blog_post_from_row, gallery_item_from_row, now_timestamp, parse_timestamp, product_from_row,
    user_from_row,
};

impl Database {
    // -- Users --

    pub fn create_user(&self, username: &str, password_hash: &str) -> Result<i64> {
        self.with_conn(|conn| insert_user(conn, username, password_hash))
    }

    pub fn get_user_by_username(&self, username: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user_by_username(conn, username))
    }

    pub fn count_users(&self) -> Result<u64> {
        self.with_conn(|conn| count_rows(conn, "users"))
    }

    // -- Products --

    pub fn list_products(&self) -> Result<Vec<Product>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY created_at DESC, id DESC"
            ))?;
            let rows = stmt
                .query_map([], product_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn get_product(&self, id: i64) -> Result<Option<Product>> {
        self.with_conn(|conn| {
            let row = conn
                .query_row(
                    &format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1"),
                    [id],
                    product_from_row,
                )
                .optional()?;
            Ok(row)
        })
    }

    pub fn create_product(&self, product: &NewProduct) -> Result<i64> {
        self.with_conn(|conn| insert_product(conn, product))
    }

    /// Returns `false` (and writes nothing) when `id` does not exist.
    pub fn update_product(&self, id: i64, update: &ProductUpdate) -> Result<bool> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE products
                 SET name = ?1, category = ?2, description = ?3, image_url = ?4, updated_at = ?5
                 WHERE id = ?6",
                params![
                    update.name,
                    update.category,
                    update.description,
                    update.image_url,
                    now_timestamp(),
                    id
                ],
            )?;
            Ok(changed > 0)
        })
    }

    pub fn delete_product(&self, id: i64) -> Result<bool> {
        self.with_conn(|conn| delete_by_id(conn, "products", id))
    }

    pub fn count_products(&self) -> Result<u64> {
        self.with_conn(|conn| count_rows(conn, "products"))
    }

    // -- Blog posts --

    pub fn list_blog_posts(&self) -> Result<Vec<BlogPost>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {BLOG_POST_COLUMNS} FROM blog_posts ORDER BY created_at DESC, id DESC"
            ))?;
            let rows = stmt
                .query_map([], blog_post_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn get_blog_post(&self, id: i64) -> Result<Option<BlogPost>> {
        self.with_conn(|conn| {
            let row = conn
                .query_row(
                    &format!("SELECT {BLOG_POST_COLUMNS} FROM blog_posts WHERE id = ?1"),
                    [id],
                    blog_post_from_row,
                )
                .optional()?;
            Ok(row)
        })
    }

    pub fn create_blog_post(&self, post: &NewBlogPost) -> Result<i64> {
        self.with_conn(|conn| insert_blog_post(conn, post))
    }

    /// Returns `false` (and writes nothing) when `id` does not exist.
    pub fn update_blog_post(&self, id: i64, update: &BlogPostUpdate) -> Result<bool> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE blog_posts
                 SET title = ?1, content = ?2, author = ?3, image_url = ?4, updated_at = ?5
                 WHERE id = ?6",
                params![
                    update.title,
                    update.content,
                    update.author,
                    update.image_url,
                    now_timestamp(),
                    id
                ],
            )?;
            Ok(changed > 0)
        })
    }

    pub fn delete_blog_post(&self, id: i64) -> Result<bool> {
        self.with_conn(|conn| delete_by_id(conn, "blog_posts", id))
    }

    pub fn count_blog_posts(&self) -> Result<u64> {
        self.with_conn(|conn| count_rows(conn, "blog_posts"))
    }

    // -- Gallery --

    pub fn list_gallery_items(&self) -> Result<Vec<GalleryItem>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {GALLERY_ITEM_COLUMNS} FROM gallery_items ORDER BY created_at DESC, id DESC"
            ))?;
            let rows = stmt
                .query_map([], gallery_item_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn get_gallery_item(&self, id: i64) -> Result<Option<GalleryItem>> {
        self.with_conn(|conn| {
            let row = conn
                .query_row(
                    &format!("SELECT {GALLERY_ITEM_COLUMNS} FROM gallery_items WHERE id = ?1"),
                    [id],
                    gallery_item_from_row,
                )
                .optional()?;
            Ok(row)
        })
    }

    pub fn create_gallery_item(&self, item: &NewGalleryItem) -> Result<i64> {
        self.with_conn(|conn| insert_gallery_item(conn, item))
    }

    pub fn delete_gallery_item(&self, id: i64) -> Result<bool> {
        self.with_conn(|conn| delete_by_id(conn, "gallery_items", id))
    }

    pub fn count_gallery_items(&self) -> Result<u64> {
        self.with_conn(|conn| count_rows(conn, "gallery_items"))
    }

    // -- Chatbot settings --

    /// The stored settings, or the built-in default when none were saved.
    pub fn get_chatbot_settings(&self) -> Result<ChatbotSettings> {
        self.with_conn(|conn| Ok(query_chatbot_settings(conn)?.unwrap_or_default()))
    }

    /// Overwrite the singleton row, creating it on first save.
    pub fn update_chatbot_settings(&self, update: &ChatbotSettingsUpdate) -> Result<()> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            let faqs = serde_json::to_string(&update.faqs)?;
            let existing: Option<i64> = tx
                .query_row("SELECT id FROM chatbot_settings ORDER BY id ASC LIMIT 1", [], |row| {
                    row.get(0)
                })
                .optional()?;

            match existing {
                Some(id) => {
                    tx.execute(
                        "UPDATE chatbot_settings SET greeting = ?1, faqs = ?2, updated_at = ?3 WHERE id = ?4",
                        params![update.greeting, faqs, now_timestamp(), id],
                    )?;
                }
                None => insert_chatbot_settings(&tx, &update.greeting, &update.faqs)?,
            }

            tx.commit()?;
            Ok(())
        })
    }
}

// Free functions over a bare connection, shared with the seeder so it can
// run inside one transaction.

pub(crate) fn insert_user(conn: &Connection, username: &str, password_hash: &str) -> Result<i64> {
    conn.execute(
        "INSERT INTO users (username, password_hash, created_at) VALUES (?1, ?2, ?3)",
        params![username, password_hash, now_timestamp()],
    )?;
    Ok(conn.last_insert_rowid())
}

pub(crate) fn query_user_by_username(conn: &Connection, username: &str) -> Result<Option<UserRow>> {
    let row = conn
        .query_row(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE username = ?1"),
            [username],
            user_from_row,
        )
        .optional()?;
    Ok(row)
}

pub(crate) fn insert_product(conn: &Connection, product: &NewProduct) -> Result<i64> {
    let now = now_timestamp();
    conn.execute(
        "INSERT INTO products (name, category, description, image_url, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
        params![product.name, product.category, product.description, product.image_url, now],
    )?;
    Ok(conn.last_insert_rowid())
}

pub(crate) fn insert_blog_post(conn: &Connection, post: &NewBlogPost) -> Result<i64> {
    let now = now_timestamp();
    conn.execute(
        "INSERT INTO blog_posts (title, content, author, image_url, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
        params![post.title, post.content, post.author, post.image_url, now],
    )?;
    Ok(conn.last_insert_rowid())
}

pub(crate) fn insert_gallery_item(conn: &Connection, item: &NewGalleryItem) -> Result<i64> {
    conn.execute(
        "INSERT INTO gallery_items (media_type, media_url, title, description, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            item.media_type.as_str(),
            item.media_url,
            item.title,
            item.description,
            now_timestamp()
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub(crate) fn insert_chatbot_settings(conn: &Connection, greeting: &str, faqs: &[Faq]) -> Result<()> {
    conn.execute(
        "INSERT INTO chatbot_settings (greeting, faqs, updated_at) VALUES (?1, ?2, ?3)",
        params![greeting, serde_json::to_string(faqs)?, now_timestamp()],
    )?;
    Ok(())
}

pub(crate) fn query_chatbot_settings(conn: &Connection) -> Result<Option<ChatbotSettings>> {
    let row: Option<(String, String, String)> = conn
        .query_row(
            "SELECT greeting, faqs, updated_at FROM chatbot_settings ORDER BY id ASC LIMIT 1",
            [],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )
        .optional()?;

    let Some((greeting, faqs, updated_at)) = row else {
        return Ok(None);
    };

    Ok(Some(ChatbotSettings {
        greeting,
        faqs: serde_json::from_str(&faqs)?,
        updated_at: Some(parse_timestamp(&updated_at)?),
    }))
}

/// `table` is always one of our own table names, never user input.
pub(crate) fn count_rows(conn: &Connection, table: &str) -> Result<u64> {
    let count: i64 = conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))?;
    Ok(count as u64)
}

fn delete_by_id(conn: &Connection, table: &str, id: i64) -> Result<bool> {
    let removed = conn.execute(&format!("DELETE FROM {table} WHERE id = ?1"), [id])?;
    Ok(removed > 0)
}
