pub mod auth;
pub mod collections;
