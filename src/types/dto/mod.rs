// API request/response models
pub mod auth;
pub mod common;
pub mod users;
