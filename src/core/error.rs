//! Defines the custom error types for the mailvet application.
//!
//! `AppError` covers the fatal, pre-flight class of failures only:
//! configuration, initialization, and file handling. Per-candidate
//! failures are not errors here; the pipeline converts them into a
//! terminal [`Status`](crate::core::models::Status) so that one bad
//! address can never abort a batch.

use std::io;
use thiserror::Error;
use url::ParseError as UrlParseError;

/// The primary error type for the verification process.
#[derive(Error, Debug)]
pub enum AppError {
    /// Error occurring during configuration loading or validation.
    #[error("Configuration Error: {0}")]
    Config(String),

    /// Error initializing necessary components (e.g., clients, resolvers).
    #[error("Initialization Error: {0}")]
    Initialization(String),

    /// Error related to file input/output operations.
    #[error("IO Error: {0}")]
    Io(#[from] io::Error),

    /// Error during JSON serialization or deserialization.
    #[error("JSON Error: {0}")]
    Json(#[from] serde_json::Error),

    /// Error parsing a URL.
    #[error("URL Parsing Error: {0}")]
    UrlParse(#[from] UrlParseError),
}

pub type Result<T> = std::result::Result<T, AppError>;
