pub mod api;
pub mod app_state;
pub mod config;
pub mod entities;
pub mod extractor;
pub mod fallback;
pub mod fetcher;
pub mod health;
pub mod pipeline;
pub mod source;
pub mod transcript;
