//! SQLite-backed vacancy store.
//!
//! This module provides the persistent record of every posting the pipeline
//! has evaluated, using SQLite with async access via tokio-rusqlite. It
//! supports:
//!
//! - URL-keyed vacancy records (one record per URL, ever)
//! - Automatic schema migrations
//! - WAL mode for concurrent access
//!
//! Existence of a URL in this store is the sole cross-cycle dedup boundary:
//! the orchestrator checks it before spending any extraction or scoring work.

pub mod connection;
pub mod migrations;
pub mod vacancies;

pub use crate::Error;

pub use connection::StoreDb;
pub use vacancies::Vacancy;
