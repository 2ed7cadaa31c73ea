//! Core types and shared functionality for wayside.
//!
//! This crate provides:
//! - Cache store registry with SQLite backend
//! - Request/response values shared by the interceptor and the stores
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod config;
pub mod error;
pub mod http;

pub use cache::{CacheDb, CacheStorage, Generation, StoreNames, StorePurpose, StoreStats};
pub use config::AppConfig;
pub use error::Error;
pub use http::{AgentRequest, AgentResponse, RequestMode};
