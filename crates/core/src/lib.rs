//! Core types and shared functionality for jobscout.
//!
//! This crate provides:
//! - Vacancy store with SQLite backend
//! - Unified error types
//! - Configuration structures

pub mod config;
pub mod error;
pub mod store;

pub use config::AppConfig;
pub use error::Error;
pub use store::{StoreDb, Vacancy};
