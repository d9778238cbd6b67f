// HTTP request handlers module
// Thin adapters between axum and the upload service

pub mod health;
pub mod upload;
