//! Integration test suite for dekube-manager
//!
//! # Running Integration Tests
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! # Test Organization
//!
//! - **pipeline**: Library pipeline from selection to installed files, over
//!   in-memory release and download fakes
//! - **cli**: The binary against fixture registries with GitHub unreachable
//! - **config**: Global config discovery through `DEKUBE_CONFIG`

// Shared test utilities (from parent tests/ directory)
#[path = "../common/mod.rs"]
mod common;

mod cli;
mod config;
mod pipeline;
