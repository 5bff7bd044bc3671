//! Durable store boundary for processing requests.
//!
//! This crate provides:
//! - The `RequestRepository` port (save, find by id, find by owner)
//! - An in-memory document-style repository for local runs and tests

pub mod error;
pub mod repository;

pub use error::{RepoError, RepoResult};
pub use repository::{InMemoryRequestRepository, RequestRepository};
