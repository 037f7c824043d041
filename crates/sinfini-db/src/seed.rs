//! First-run bootstrap: default admin accounts, chatbot FAQ and demo content.
//!
//! Every step checks before inserting, so running it on a populated store
//! inserts nothing.

use anyhow::{Result, anyhow};
use argon2::{
    Argon2, PasswordHasher,
    password_hash::{SaltString, rand_core::OsRng},
};
use rusqlite::Connection;
use tracing::info;

use sinfini_types::chatbot::Faq;
use sinfini_types::models::{MediaType, NewBlogPost, NewGalleryItem, NewProduct};

use crate::Database;
use crate::queries::{
    count_rows, insert_blog_post, insert_chatbot_settings, insert_gallery_item, insert_product,
    insert_user, query_user_by_username,
};

/// (username, password) pairs created when missing.
pub const DEFAULT_USERS: &[(&str, &str)] = &[
    ("admin", "admin123"),
    ("info@sinfinimarketing.com", "Sinfini.Marketing@2024"),
];

const SEED_GREETING: &str =
    "Hello! Welcome to Sinfini Marketing FZC. How can I assist you today?";

/// Rows inserted by one `seed` run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SeedReport {
    pub users: usize,
    pub chatbot_settings: usize,
    pub products: usize,
    pub blog_posts: usize,
    pub gallery_items: usize,
}

impl SeedReport {
    pub fn total(&self) -> usize {
        self.users + self.chatbot_settings + self.products + self.blog_posts + self.gallery_items
    }
}

/// Argon2id with a fresh random salt, in PHC string form.
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow!("Password hashing failed: {}", e))?;
    Ok(hash.to_string())
}

impl Database {
    pub fn seed(&self) -> Result<SeedReport> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            let report = seed_all(&tx)?;
            tx.commit()?;

            if report.total() > 0 {
                info!(?report, "Seeded default data");
            }
            Ok(report)
        })
    }
}

fn seed_all(conn: &Connection) -> Result<SeedReport> {
    let mut report = SeedReport::default();

    for (username, password) in DEFAULT_USERS {
        if query_user_by_username(conn, username)?.is_none() {
            insert_user(conn, username, &hash_password(password)?)?;
            report.users += 1;
        }
    }

    if count_rows(conn, "chatbot_settings")? == 0 {
        insert_chatbot_settings(conn, SEED_GREETING, &default_faqs())?;
        report.chatbot_settings = 1;
    }

    if count_rows(conn, "products")? == 0 {
        for product in demo_products() {
            insert_product(conn, &product)?;
            report.products += 1;
        }
    }

    if count_rows(conn, "blog_posts")? == 0 {
        for post in demo_blog_posts() {
            insert_blog_post(conn, &post)?;
            report.blog_posts += 1;
        }
    }

    if count_rows(conn, "gallery_items")? == 0 {
        for item in demo_gallery_items() {
            insert_gallery_item(conn, &item)?;
            report.gallery_items += 1;
        }
    }

    Ok(report)
}

fn faq(question: &str, answer: &str, keywords: &[&str]) -> Faq {
    Faq {
        question: question.to_string(),
        answer: answer.to_string(),
        keywords: keywords.iter().map(|k| k.to_string()).collect(),
    }
}

pub fn default_faqs() -> Vec<Faq> {
    vec![
        faq(
            "What products do you offer?",
            "We specialize in premium cotton and synthetic ladies' fabrics, garments, linens, and terry toweling products.",
            &["products", "offer", "sell", "fabrics", "textile"],
        ),
        faq(
            "Where do you export to?",
            "We export to international markets across Asia, Africa, and Europe.",
            &["export", "ship", "countries", "where", "location"],
        ),
        faq(
            "How can I contact you?",
            "You can reach us through our contact form or email us at info@sinfinimarketing.com. We are located in Sharjah, UAE.",
            &["contact", "email", "phone", "reach", "address"],
        ),
        faq(
            "What is your company's specialty?",
            "Sinfini Marketing FZC specializes in exporting premium quality textiles including cotton and synthetic fabrics, garments, linens, and terry toweling products.",
            &["specialty", "specialize", "focus", "expertise"],
        ),
    ]
}

fn demo_products() -> Vec<NewProduct> {
    let product = |name: &str, category: &str, description: &str, image: &str| NewProduct {
        name: name.to_string(),
        category: category.to_string(),
        description: Some(description.to_string()),
        image_url: Some(image.to_string()),
    };

    vec![
        product(
            "Bamboo Terry Towels - Eco-Friendly",
            "Terry Toweling",
            "Eco-friendly bamboo terry towels combining sustainability with luxury.",
            "https://images.unsplash.com/photo-1520975940276-6d98d6f2f6b1?w=800",
        ),
        product(
            "Premium Denim Fabric",
            "Cotton Fabrics",
            "High-quality denim fabric perfect for jeans, jackets, and accessories.",
            "https://images.unsplash.com/photo-1520974735194-6c1eaa8f1a79?w=800",
        ),
        product(
            "Silk Blend Evening Fabric",
            "Synthetic Fabrics",
            "Luxurious silk blend fabric with beautiful drape and sheen.",
            "https://images.unsplash.com/photo-1512436991641-6745cdb1723f?w=800",
        ),
    ]
}

fn demo_blog_posts() -> Vec<NewBlogPost> {
    vec![
        NewBlogPost {
            title: "Sustainable Textiles: Our Commitment to the Environment".to_string(),
            content: "Sustainability is not just a trend, it's a responsibility. At Sinfini Marketing FZC, \
                      we're committed to eco-friendly practices across sourcing and production."
                .to_string(),
            author: "Environmental Team".to_string(),
            image_url: Some(
                "https://images.unsplash.com/photo-1484882918957-e9ba8f06e3f9?w=800".to_string(),
            ),
        },
        NewBlogPost {
            title: "Cotton vs Synthetic: Choosing the Right Fabric".to_string(),
            content: "Choosing between cotton and synthetic fabrics depends on your specific needs. \
                      Let's explore the benefits of each."
                .to_string(),
            author: "Product Specialist".to_string(),
            image_url: Some(
                "https://images.unsplash.com/photo-1520974735194-6c1eaa8f1a79?w=800".to_string(),
            ),
        },
    ]
}

fn demo_gallery_items() -> Vec<NewGalleryItem> {
    let image = |url: &str, title: &str, description: &str| NewGalleryItem {
        media_type: MediaType::Image,
        media_url: url.to_string(),
        title: Some(title.to_string()),
        description: Some(description.to_string()),
    };

    vec![
        image(
            "https://images.unsplash.com/photo-1524102724378-4bc7a4d4a27b?w=1000",
            "Factory Floor",
            "High-quality production line",
        ),
        image(
            "https://images.unsplash.com/photo-1503342394122-6c6a3c3c1b2e?w=1000",
            "Textile Rolls",
            "Premium fabric inventory",
        ),
        image(
            "https://images.unsplash.com/photo-1520975940276-6d98d6f2f6b1?w=1000",
            "Terry Towels",
            "Eco-friendly towels ready to ship",
        ),
    ]
}
