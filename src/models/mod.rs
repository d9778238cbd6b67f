// Typed records exchanged between handlers and services

pub mod errors;
pub mod upload;
