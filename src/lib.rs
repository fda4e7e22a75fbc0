pub mod app_state;
pub mod blog;
pub mod config;
pub mod entities;
pub mod generation;
pub mod health;
pub mod repositories;
pub mod seo;
pub mod storage;
