//! PinDrop - PIN-namespaced HTTP file sharing
//!
//! A small HTTP server that lets clients upload and download files grouped
//! under a short PIN. Each PIN maps to a directory under a configurable
//! storage root; the filesystem is the only state.
//!
//! # Features
//!
//! - List, upload and download files per PIN
//! - Upload names reduced to their base name so writes stay inside the PIN directory
//! - Fixed-origin CORS with `OPTIONS` short-circuit
//! - Static OpenAPI document at `/api/swagger`

pub mod config;
pub mod error;
pub mod storage;
pub mod api;

pub use config::PinDropConfig;
pub use error::{Error, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::PinDropConfig;
    pub use crate::error::{Error, Result};
    pub use crate::storage::{FileInfo, FileStore};
    pub use crate::api::HttpServer;
}
