//! Core shared building blocks: configuration, error types, data
//! models, and run statistics.

pub mod config;
pub mod error;
pub mod models;
pub mod stats;
