//! Object storage for evidence workbooks using Apache OpenDAL.
//!
//! Vendor-agnostic storage with support for S3-compatible providers,
//! Azure Blob Storage, and the local filesystem for development. Uploads
//! are written server-side; stored keys are exposed through a configured
//! public base URL.

mod config;
mod error;
mod service;

pub use config::{StorageConfig, StorageProvider};
pub use error::StorageError;
pub use service::{StorageService, StoredEvidence};
