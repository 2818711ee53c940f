//! HTTP server module
//!
//! This module handles HTTP request routing and handling:
//! - Axum router with the overlay and streaming endpoints
//! - `/info` timeline snapshot handler
//! - `/video` range-request streaming handler
//! - CORS middleware for the browser player

pub mod handlers;
pub mod routes;

pub use routes::create_router;
