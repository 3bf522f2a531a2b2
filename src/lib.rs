//! dekube-manager - dependency resolver and fetcher for dekube
//!
//! Installs a dekube distribution (the base converter script) and its
//! extensions (provider and transform modules) from GitHub, following a
//! static registry of names, repositories and dependency edges.
//!
//! # Architecture Overview
//!
//! A run is a straight pipeline; each stage either hands a complete value to
//! the next or fails the whole run:
//!
//! 1. [`wishlist`] - merge the command line with `dekube.yaml` into a wishlist
//! 2. [`resolver`] - expand `depends` edges into a conflict-free, acyclic set
//!    in install order, then reject incompatible pairs
//! 3. [`version`] - bind every artifact to a release tag
//! 4. [`installer`] - fetch each file and write it atomically
//!
//! Stages 1 and 2 are pure over the loaded registries, so unknown names,
//! conflicting pins and cycles are reported before any network lookup or
//! file write.
//!
//! # Core Modules
//!
//! - [`cli`] - `install`, `plan` and `info` commands
//! - [`config`] - Global config (`~/.dekube/config.toml`)
//! - [`core`] - Error taxonomy and artifact kinds
//! - [`manifest`] - Project config (`dekube.yaml`) and `name==version` tokens
//! - [`registry`] - Registry documents and where they are loaded from
//! - [`source`] - GitHub release lookups and downloads behind two traits
//! - [`plan`] - The install plan and its on-disk layout
//! - [`utils`] - Atomic writes and content digests
//!
//! # Project Config (dekube.yaml)
//!
//! ```yaml
//! distribution: core
//! distribution_version: v2.1.0
//! depends:
//!   - keycloak
//!   - cert-manager==0.2.0
//! ```
//!
//! Keys other than these belong to the converter and are ignored here.
//!
//! # Install Layout
//!
//! ```text
//! .dekube/
//! ├── dekube.py          # distribution file
//! └── extensions/
//!     ├── keycloak.py
//!     └── cert_manager.py
//! ```

pub mod cli;
pub mod config;
pub mod constants;
pub mod core;
pub mod installer;
pub mod manifest;
pub mod plan;
pub mod registry;
pub mod resolver;
pub mod source;
pub mod utils;
pub mod version;
pub mod wishlist;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
