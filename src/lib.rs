//! Match Compatibility Engine Library
//!
//! This library provides the core functionality for the match compatibility
//! scoring and ranking engine: a pure weighted-factor scorer, the ranking
//! and replacement service, the transactional match storage layer, and the
//! HTTP surface that receives profile-change triggers.
//!
//! # Modules
//!
//! - `config`: Configuration management.
//! - `db`: Database connection and pool management.
//! - `errors`: Error handling types.
//! - `handlers`: HTTP request handlers.
//! - `match_storage`: Match record and profile storage operations.
//! - `matchmaking`: Ranking, selection policy, and rebuild orchestration.
//! - `models`: Core data models.
//! - `scoring`: Compatibility scoring.
//! - `webhook_handler`: Profile-change webhook handler.
//! - `webhook_models`: Webhook payload models.

// Re-export primary modules for shared use in tests and other binaries
pub mod config;
pub mod db;
pub mod errors;
pub mod handlers;
pub mod match_storage;
pub mod matchmaking;
pub mod models;
pub mod scoring;
pub mod webhook_handler;
pub mod webhook_models;
