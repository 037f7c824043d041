pub mod api;
pub mod chatbot;
pub mod models;
