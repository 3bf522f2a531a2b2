//! Mutual incompatibility check over a resolved extension set.

use super::ResolvedArtifact;
use crate::core::DekubeError;
use crate::registry::Registry;
use std::collections::HashSet;
use tracing::warn;

/// Reject plans holding two artifacts that declare each other incompatible.
///
/// An `incompatible` entry on either side is enough. A pair is tolerated
/// when either name is in `ignore`.
///
/// # Errors
///
/// Returns the first [`DekubeError::IncompatibleArtifacts`] found in plan
/// order.
pub fn check_compatibility(
    extensions: &[ResolvedArtifact],
    registry: &Registry,
    ignore: &HashSet<String>,
) -> Result<(), DekubeError> {
    let planned: HashSet<&str> = extensions.iter().map(|a| a.name.as_str()).collect();

    for artifact in extensions {
        let Some(entry) = registry.get(&artifact.name) else {
            continue;
        };
        for other in &entry.incompatible {
            if !planned.contains(other.as_str()) || *other == artifact.name {
                continue;
            }
            if ignore.contains(&artifact.name) || ignore.contains(other) {
                warn!("Installing incompatible extensions '{}' and '{other}' as requested", artifact.name);
                continue;
            }
            return Err(DekubeError::IncompatibleArtifacts {
                first: artifact.name.clone(),
                second: other.clone(),
            });
        }
    }

    Ok(())
}
