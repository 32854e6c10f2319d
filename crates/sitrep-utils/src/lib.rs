//! Shared utilities for sitrep
//!
//! This crate provides common functionality used across the sitrep workspace,
//! including logging setup, retry with exponential backoff, and credential loading.

pub mod config;
pub mod logging;
pub mod retry;

pub use config::{Credentials, MissingCredential};
pub use logging::{LogFormat, init_tracing};
pub use retry::{RetryPolicy, Retryable};
