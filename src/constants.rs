//! Global constants used throughout the dekube-manager codebase.
//!
//! This module contains file names, default endpoints, timeout durations and
//! retry parameters that are used across multiple modules.

use std::time::Duration;

/// Primary declarative config file name, looked up in the working directory.
pub const PRIMARY_CONFIG_FILE: &str = "dekube.yaml";

/// Legacy config file name, used only when [`PRIMARY_CONFIG_FILE`] is absent.
pub const LEGACY_CONFIG_FILE: &str = "helmfile2compose.yaml";

/// Distribution installed when neither the CLI nor the config selects one.
pub const DEFAULT_DISTRIBUTION: &str = "core";

/// Default install directory, relative to the working directory.
pub const DEFAULT_INSTALL_DIR: &str = ".dekube";

/// Subdirectory of the install directory that receives extension files.
pub const EXTENSIONS_SUBDIR: &str = "extensions";

/// Highest registry `schema_version` this build understands.
pub const SUPPORTED_REGISTRY_SCHEMA: u32 = 1;

/// Default location of the extensions registry.
pub const DEFAULT_EXTENSIONS_REGISTRY: &str =
    "https://raw.githubusercontent.com/dekubeio/dekube-manager/main/extensions.json";

/// Default location of the distributions registry.
pub const DEFAULT_DISTRIBUTIONS_REGISTRY: &str =
    "https://raw.githubusercontent.com/dekubeio/dekube-manager/main/distributions.json";

/// GitHub REST API base URL.
pub const GITHUB_API_BASE: &str = "https://api.github.com";

/// Base URL for raw file downloads at a tag.
pub const GITHUB_RAW_BASE: &str = "https://raw.githubusercontent.com";

/// Base URL for release asset downloads.
pub const GITHUB_RELEASE_BASE: &str = "https://github.com";

/// User agent sent with every request; GitHub rejects requests without one.
pub const USER_AGENT: &str = concat!("dekube-manager/", env!("CARGO_PKG_VERSION"));

/// Default per-request timeout for network calls (30 seconds).
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Default number of attempts for a network call, including the first one.
pub const DEFAULT_MAX_ATTEMPTS: usize = 3;

/// Starting delay for exponential backoff between attempts (200ms).
///
/// The delay doubles on each retry.
pub const STARTING_BACKOFF_DELAY_MS: u64 = 200;

/// Maximum backoff delay between attempts (2 seconds).
pub const MAX_BACKOFF_DELAY_MS: u64 = 2_000;

/// Environment variable overriding the global config path.
pub const CONFIG_PATH_ENV: &str = "DEKUBE_CONFIG";

/// Environment variable providing a GitHub token.
pub const GITHUB_TOKEN_ENV: &str = "GITHUB_TOKEN";
