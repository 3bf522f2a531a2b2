//! Registry fixtures shared by unit and integration tests.

use crate::core::ArtifactKind;
use crate::registry::{Registry, RegistryEntry};
use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Extensions used across tests.
///
/// - `trust-manager` depends on `cert-manager==0.1.0`
/// - `vault` depends on `cert-manager==0.2.0`
/// - `traefik` is incompatible with `nginx`
#[must_use]
pub fn sample_extensions() -> Registry {
    Registry::from_entries(
        ArtifactKind::Extension,
        [
            RegistryEntry::new("cert-manager", "dekubeio/dekube-provider-cert-manager", "cert_manager.py")
                .with_description("cert-manager Certificate and Issuer support"),
            RegistryEntry::new("trust-manager", "dekubeio/dekube-provider-trust-manager", "trust_manager.py")
                .with_description("trust-manager Bundle support")
                .with_depends(["cert-manager==0.1.0"]),
            RegistryEntry::new("vault", "dekubeio/dekube-provider-vault", "vault.py")
                .with_depends(["cert-manager==0.2.0"]),
            RegistryEntry::new("keycloak", "dekubeio/dekube-provider-keycloak", "keycloak.py")
                .with_description("Keycloak realm import"),
            RegistryEntry::new("nginx", "dekubeio/dekube-transform-nginx", "nginx.py"),
            RegistryEntry::new("traefik", "dekubeio/dekube-transform-traefik", "traefik.py")
                .with_incompatible(["nginx"]),
        ],
    )
}

/// Distributions used across tests: `core` only.
#[must_use]
pub fn sample_distributions() -> Registry {
    Registry::from_entries(
        ArtifactKind::Distribution,
        [RegistryEntry::new("core", "dekubeio/dekube-core", "dekube.py")
            .with_description("Core converter")],
    )
}

/// Serialize a registry into its JSON document form.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn registry_json(registry: &Registry) -> Result<String> {
    let entries: BTreeMap<&str, &RegistryEntry> =
        registry.iter().map(|e| (e.name.as_str(), e)).collect();
    let mut document = serde_json::Map::new();
    document.insert("schema_version".to_string(), serde_json::json!(1));
    document.insert(registry.kind().registry_key().to_string(), serde_json::to_value(entries)?);
    serde_json::to_string_pretty(&document).context("Failed to serialize registry")
}

/// Base URL nothing listens on.
const CLOSED_PORT: &str = "http://127.0.0.1:9";

/// Registry documents and a matching global config written to a directory.
#[derive(Debug, Clone)]
pub struct RegistryFixture {
    /// Extensions registry file.
    pub extensions: PathBuf,
    /// Distributions registry file.
    pub distributions: PathBuf,
    /// Global config pointing at both files.
    pub config: PathBuf,
}

impl RegistryFixture {
    /// Write the sample registries and a global config under `dir`.
    ///
    /// The config points GitHub at a closed local port with a single
    /// attempt, so any network call fails fast.
    ///
    /// # Errors
    ///
    /// Returns an error if a file cannot be written.
    pub fn write(dir: &Path) -> Result<Self> {
        Self::write_with(dir, &sample_distributions(), &sample_extensions())
    }

    /// Like [`Self::write`] with custom registries.
    ///
    /// # Errors
    ///
    /// Returns an error if a file cannot be written.
    pub fn write_with(dir: &Path, distributions: &Registry, extensions: &Registry) -> Result<Self> {
        let fixture = Self {
            extensions: dir.join("extensions.json"),
            distributions: dir.join("distributions.json"),
            config: dir.join("config.toml"),
        };

        std::fs::write(&fixture.extensions, registry_json(extensions)?)?;
        std::fs::write(&fixture.distributions, registry_json(distributions)?)?;

        let config = format!(
            "[registries]\nextensions = '{}'\ndistributions = '{}'\n\n\
             [github]\napi_base = '{CLOSED_PORT}'\nraw_base = '{CLOSED_PORT}'\nrelease_base = '{CLOSED_PORT}'\n\n\
             [network]\nrequest_timeout_secs = 2\nmax_attempts = 1\n",
            fixture.extensions.display(),
            fixture.distributions.display(),
        );
        std::fs::write(&fixture.config, config)?;

        Ok(fixture)
    }
}
