//! Per-artifact constraint bookkeeping during expansion.
//!
//! Precedence for one artifact, highest first:
//!
//! 1. a pinned wishlist root (command line or project config)
//! 2. a pin on a transitive `depends` edge
//! 3. `latest`
//!
//! A bare root does not constrain, so edge pins still apply to it. Two edge
//! pins that disagree are a [`DekubeError::DependencyConflict`] unless a
//! pinned root settles the version.

use crate::core::DekubeError;
use crate::version::VersionConstraint;
use std::collections::HashMap;
use tracing::debug;

#[derive(Debug, Default)]
struct Constraints {
    root: Option<VersionConstraint>,
    /// First edge pin seen, with the dependent that declared it.
    edge_pin: Option<(String, String)>,
    required_by: Vec<String>,
}

/// Collects root and edge constraints and reports conflicts as they appear.
#[derive(Debug, Default)]
pub struct ConstraintTracker {
    by_name: HashMap<String, Constraints>,
}

impl ConstraintTracker {
    /// Create an empty tracker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a wishlist root.
    pub fn add_root(&mut self, name: &str, constraint: VersionConstraint) {
        self.by_name.entry(name.to_string()).or_default().root = Some(constraint);
    }

    /// Record the edge `dependent → name` carrying `constraint`.
    ///
    /// # Errors
    ///
    /// Returns [`DekubeError::DependencyConflict`] when this edge pins a
    /// different version than an earlier edge and no pinned root overrides
    /// both.
    pub fn add_edge(
        &mut self,
        name: &str,
        constraint: &VersionConstraint,
        dependent: &str,
    ) -> Result<(), DekubeError> {
        let slot = self.by_name.entry(name.to_string()).or_default();
        if !slot.required_by.iter().any(|d| d == dependent) {
            slot.required_by.push(dependent.to_string());
        }

        let Some(version) = constraint.pin() else {
            return Ok(());
        };

        if let Some(root @ VersionConstraint::Pinned(_)) = &slot.root {
            if root.pin() != Some(version) {
                debug!("'{dependent}' pins '{name}' to {version}; overridden by requested {root}");
            }
            return Ok(());
        }

        match &slot.edge_pin {
            None => {
                slot.edge_pin = Some((version.to_string(), dependent.to_string()));
                Ok(())
            }
            Some((first_version, _)) if first_version == version => Ok(()),
            Some((first_version, first_required_by)) => Err(DekubeError::DependencyConflict {
                name: name.to_string(),
                first_version: first_version.clone(),
                first_required_by: first_required_by.clone(),
                second_version: version.to_string(),
                second_required_by: dependent.to_string(),
            }),
        }
    }

    /// Effective constraint for `name`.
    #[must_use]
    pub fn effective(&self, name: &str) -> VersionConstraint {
        let Some(slot) = self.by_name.get(name) else {
            return VersionConstraint::Latest;
        };
        match (&slot.root, &slot.edge_pin) {
            (Some(root @ VersionConstraint::Pinned(_)), _) => root.clone(),
            (_, Some((version, _))) => VersionConstraint::Pinned(version.clone()),
            _ => VersionConstraint::Latest,
        }
    }

    /// Dependents that reference `name`, in discovery order.
    #[must_use]
    pub fn required_by(&self, name: &str) -> &[String] {
        self.by_name.get(name).map_or(&[], |slot| slot.required_by.as_slice())
    }
}
