//! Shared types, errors, and configuration for Tillbook.
//!
//! This crate provides common types used across all other crates:
//! - Configuration management
//! - JWT claims and validation
//! - Role definitions for the review workflow

pub mod auth;
pub mod config;
pub mod jwt;
pub mod types;

pub use auth::Claims;
pub use config::AppConfig;
pub use jwt::{JwtError, JwtService};
pub use types::Role;
