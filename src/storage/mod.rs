//! Storage Module
//!
//! Filesystem-backed file storage partitioned into one directory per PIN.
//! The filesystem is the only source of truth; nothing is cached.

mod names;
mod store;

pub use names::{base_name, validate_file_name, validate_pin};
pub use store::{FileInfo, FileStore, Upload};
