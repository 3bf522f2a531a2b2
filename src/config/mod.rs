//! Configuration management for dekube-manager.
//!
//! Two layers feed a run:
//!
//! 1. **Global configuration** (`~/.dekube/config.toml`, see [`GlobalConfig`]):
//!    where registries live, GitHub endpoints and token, and the network
//!    budget. Per user, never committed.
//! 2. **Project config** (`dekube.yaml`, see [`crate::manifest`]): which
//!    distribution and extensions this project wants. Shared with the
//!    downstream converter.
//!
//! The global layer is optional. An explicit `--config` path or the
//! `DEKUBE_CONFIG` environment variable replaces the default location, and
//! `GITHUB_TOKEN` overrides the configured token.

pub mod global;

pub use global::{GitHubSettings, GlobalConfig, NetworkSettings, RegistrySettings};
