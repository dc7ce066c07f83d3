//! Shared value types.

pub mod role;

pub use role::Role;
