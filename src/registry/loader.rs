//! Registry document locations and loading.

use super::Registry;
use crate::core::{ArtifactKind, DekubeError};
use crate::source::{ArtifactFetcher, SourceError};
use std::fmt;
use std::path::PathBuf;
use tracing::debug;

/// Where a registry document is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrySource {
    /// `http://` or `https://` URL.
    Remote(String),
    /// Local file, given as a path or `file://` URL.
    Local(PathBuf),
}

impl RegistrySource {
    /// Classify a configured location.
    #[must_use]
    pub fn parse(location: &str) -> Self {
        if location.starts_with("https://") || location.starts_with("http://") {
            Self::Remote(location.to_string())
        } else if let Some(path) = location.strip_prefix("file://") {
            Self::Local(PathBuf::from(path))
        } else {
            Self::Local(PathBuf::from(location))
        }
    }

    /// Read and parse the registry for `kind`.
    ///
    /// # Errors
    ///
    /// Returns [`DekubeError::RegistryError`] when the document cannot be
    /// read, plus everything [`Registry::parse`] rejects.
    pub async fn load<F: ArtifactFetcher>(
        &self,
        kind: ArtifactKind,
        fetcher: &F,
    ) -> Result<Registry, DekubeError> {
        debug!("Loading {kind} registry from {self}");
        let location = self.to_string();

        let content = match self {
            Self::Remote(url) => {
                let body = fetcher.fetch(url).await.map_err(|e| unreadable(&location, &e))?;
                String::from_utf8(body).map_err(|e| DekubeError::RegistryError {
                    location: location.clone(),
                    reason: format!("not UTF-8: {e}"),
                })?
            }
            Self::Local(path) => {
                tokio::fs::read_to_string(path).await.map_err(|e| DekubeError::RegistryError {
                    location: location.clone(),
                    reason: e.to_string(),
                })?
            }
        };

        let registry = Registry::parse(&content, kind, &location)?;
        debug!("Loaded {} {kind} entries", registry.len());
        Ok(registry)
    }
}

fn unreadable(location: &str, error: &SourceError) -> DekubeError {
    DekubeError::RegistryError {
        location: location.to_string(),
        reason: error.to_string(),
    }
}

impl fmt::Display for RegistrySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Remote(url) => f.write_str(url),
            Self::Local(path) => write!(f, "{}", path.display()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::FakeFetcher;
    use tempfile::TempDir;

    #[test]
    fn test_parse_locations() {
        assert_eq!(
            RegistrySource::parse("https://example.com/extensions.json"),
            RegistrySource::Remote("https://example.com/extensions.json".to_string())
        );
        assert_eq!(
            RegistrySource::parse("file:///srv/extensions.json"),
            RegistrySource::Local(PathBuf::from("/srv/extensions.json"))
        );
        assert_eq!(
            RegistrySource::parse("registry/extensions.json"),
            RegistrySource::Local(PathBuf::from("registry/extensions.json"))
        );
    }

    #[tokio::test]
    async fn test_load_local_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("extensions.json");
        std::fs::write(&path, r#"{"extensions": {"nginx": {"repo": "o/nginx", "file": "nginx.py"}}}"#)
            .unwrap();

        let registry = RegistrySource::Local(path)
            .load(ArtifactKind::Extension, &FakeFetcher::default())
            .await
            .unwrap();
        assert!(registry.get("nginx").is_some());
    }

    #[tokio::test]
    async fn test_load_remote() {
        let url = "https://example.com/distributions.json";
        let fetcher = FakeFetcher::default().with_file(
            url,
            r#"{"distributions": {"core": {"repo": "o/core", "file": "dekube.py"}}}"#,
        );

        let registry = RegistrySource::parse(url)
            .load(ArtifactKind::Distribution, &fetcher)
            .await
            .unwrap();
        assert_eq!(registry.names(), vec!["core"]);
    }

    #[tokio::test]
    async fn test_missing_file_is_registry_error() {
        let temp = TempDir::new().unwrap();
        let err = RegistrySource::Local(temp.path().join("absent.json"))
            .load(ArtifactKind::Extension, &FakeFetcher::default())
            .await
            .unwrap_err();
        assert!(matches!(err, DekubeError::RegistryError { .. }));
        assert!(err.to_string().contains("absent.json"));
    }
}
