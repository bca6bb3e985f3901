//! HTTP API Module
//!
//! Provides the REST API for PIN-scoped file listing, upload and download.

mod cors;
mod docs;
mod http;

pub use cors::Cors;
pub use docs::openapi;
pub use http::{AppState, ErrorResponse, HttpServer, ListResponse, MessageResponse};
