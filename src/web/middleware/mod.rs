//! Middleware for the Web API.

mod auth;
mod cors;

pub use auth::SessionSecret;
pub use cors::create_cors_layer;
