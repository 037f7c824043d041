use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);")?;

    let version: i64 =
        conn.query_row("SELECT COALESCE(MAX(version), 0) FROM schema_version", [], |r| r.get(0))?;

    if version < 1 {
        info!("Running migration v1 (initial schema)");
        conn.execute_batch(
            "
            BEGIN;

            CREATE TABLE IF NOT EXISTS users (
                id              INTEGER PRIMARY KEY AUTOINCREMENT,
                username        TEXT NOT NULL UNIQUE,
                password_hash   TEXT NOT NULL,
                created_at      TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS products (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                name        TEXT NOT NULL,
                category    TEXT NOT NULL,
                description TEXT,
                image_url   TEXT,
                created_at  TEXT NOT NULL,
                updated_at  TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_products_created
                ON products(created_at);

            CREATE TABLE IF NOT EXISTS blog_posts (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                title       TEXT NOT NULL,
                content     TEXT NOT NULL,
                author      TEXT NOT NULL DEFAULT 'Admin',
                image_url   TEXT,
                created_at  TEXT NOT NULL,
                updated_at  TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_blog_posts_created
                ON blog_posts(created_at);

            CREATE TABLE IF NOT EXISTS gallery_items (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                media_type  TEXT NOT NULL CHECK (media_type IN ('image', 'video')),
                media_url   TEXT NOT NULL,
                title       TEXT,
                description TEXT,
                created_at  TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_gallery_items_created
                ON gallery_items(created_at);

            -- Only the lowest id is read; see queries::get_chatbot_settings
            CREATE TABLE IF NOT EXISTS chatbot_settings (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                greeting    TEXT NOT NULL,
                faqs        TEXT NOT NULL DEFAULT '[]',
                updated_at  TEXT NOT NULL
            );

            INSERT INTO schema_version (version) VALUES (1);

            COMMIT;
            ",
        )?;
    }

    info!("Database migrations complete");
    Ok(())
}
