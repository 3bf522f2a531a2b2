//! Dependency resolution and conflict detection.
//!
//! The resolver turns a merged selection (see [`crate::wishlist`]) into a
//! [`PlanSkeleton`]: every artifact that must be installed, with its
//! effective version constraint, but no concrete version yet. Binding
//! versions is left to the [`crate::version::reconciler`], which needs the
//! network; the resolver is purely in-memory and fails before any I/O.
//!
//! # Resolution Process
//!
//! 1. **Distribution lookup**: the selected distribution must exist in the
//!    distributions registry.
//! 2. **Root lookup**: every wishlist entry must exist in the extensions
//!    registry; each becomes a root of the expansion.
//! 3. **Breadth-first expansion**: an explicit queue walks registry `depends`
//!    edges. A visited set keyed by name makes each artifact expand once, so
//!    diamonds and cycles terminate.
//! 4. **Constraint tracking**: every edge is fed to a
//!    [`ConstraintTracker`], which applies precedence and reports conflicts
//!    as soon as they appear.
//! 5. **Ordering**: the [`DependencyGraph`] rejects cycles and yields
//!    dependencies before dependents, ties broken by discovery order.
//!
//! # Constraint precedence
//!
//! | Source | Effect |
//! |--------|--------|
//! | Pinned root (CLI or config) | Wins over any edge pin |
//! | Edge pin (`name==version` in `depends`) | Applies unless a pinned root exists |
//! | Bare root or bare edge | `latest` |
//!
//! Two edges pinning different versions with no pinned root fail with
//! [`DekubeError::DependencyConflict`].
//!
//! # Failure
//!
//! Unknown names, conflicts and cycles abort resolution; a partial plan is
//! never returned.

pub mod compat;
pub mod conflict;
pub mod dependency_graph;

pub use compat::check_compatibility;
pub use conflict::ConstraintTracker;
pub use dependency_graph::DependencyGraph;

use crate::core::{ArtifactKind, DekubeError};
use crate::plan::destination_for;
use crate::registry::{Registry, RegistryEntry};
use crate::version::VersionConstraint;
use crate::wishlist::{MergedSelection, Wishlist, WishlistEntry};
use serde::Serialize;
use std::collections::{HashMap, HashSet, VecDeque};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// An artifact that must be installed, before version binding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedArtifact {
    /// Registry namespace.
    pub kind: ArtifactKind,
    /// Artifact name.
    pub name: String,
    /// Effective constraint after precedence.
    pub constraint: VersionConstraint,
    /// GitHub `owner/name`.
    pub repo: String,
    /// File to download.
    pub file: String,
    /// Dependents that pulled this artifact in; empty for roots.
    pub required_by: Vec<String>,
}

impl ResolvedArtifact {
    fn from_entry(
        kind: ArtifactKind,
        entry: &RegistryEntry,
        constraint: VersionConstraint,
        required_by: Vec<String>,
    ) -> Self {
        Self {
            kind,
            name: entry.name.clone(),
            constraint,
            repo: entry.repo.clone(),
            file: entry.file.clone(),
            required_by,
        }
    }
}

/// Complete, conflict-free artifact set in install order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PlanSkeleton {
    /// Selected distribution, if any.
    pub distribution: Option<ResolvedArtifact>,
    /// Extensions, dependencies before dependents.
    pub extensions: Vec<ResolvedArtifact>,
}

/// Expands a selection over the two registries.
#[derive(Debug, Clone, Copy)]
pub struct DependencyResolver<'a> {
    distributions: &'a Registry,
    extensions: &'a Registry,
}

impl<'a> DependencyResolver<'a> {
    /// Resolver over the distributions and extensions registries.
    #[must_use]
    pub const fn new(distributions: &'a Registry, extensions: &'a Registry) -> Self {
        Self {
            distributions,
            extensions,
        }
    }

    /// Resolve the distribution and the extension closure.
    ///
    /// # Errors
    ///
    /// - [`DekubeError::UnknownArtifact`] for a name missing from its registry
    /// - [`DekubeError::DependencyConflict`] for disagreeing edge pins
    /// - [`DekubeError::CircularDependency`] for a `depends` cycle
    /// - [`DekubeError::ConfigError`] for a malformed registry `depends` token,
    ///   or two extensions whose files share a base name
    pub fn resolve(&self, selection: &MergedSelection) -> Result<PlanSkeleton, DekubeError> {
        let distribution =
            selection.distribution.as_ref().map(|d| self.resolve_distribution(d)).transpose()?;
        let extensions = self.resolve_extensions(&selection.wishlist)?;
        check_destinations(&extensions)?;

        Ok(PlanSkeleton {
            distribution,
            extensions,
        })
    }

    fn resolve_distribution(&self, wanted: &WishlistEntry) -> Result<ResolvedArtifact, DekubeError> {
        let entry = self.distributions.require(&wanted.name, None)?;
        if !entry.depends.is_empty() {
            warn!("Distribution '{}' declares depends; distributions are not expanded", entry.name);
        }
        Ok(ResolvedArtifact::from_entry(
            ArtifactKind::Distribution,
            entry,
            wanted.constraint.clone(),
            Vec::new(),
        ))
    }

    /// Breadth-first closure of the wishlist over `depends` edges.
    ///
    /// # Errors
    ///
    /// See [`Self::resolve`].
    pub fn resolve_extensions(
        &self,
        wishlist: &Wishlist,
    ) -> Result<Vec<ResolvedArtifact>, DekubeError> {
        let mut tracker = ConstraintTracker::new();
        let order = self.walk(wishlist, Some(&mut tracker))?;

        order
            .iter()
            .map(|name| {
                let entry = self.extensions.require(name, None)?;
                Ok(ResolvedArtifact::from_entry(
                    ArtifactKind::Extension,
                    entry,
                    tracker.effective(name),
                    tracker.required_by(name).to_vec(),
                ))
            })
            .collect()
    }

    /// Names in the closure of `wishlist`, dependencies first.
    ///
    /// Version pins are ignored, so two dependents pinning different
    /// versions of the same artifact are not a conflict here.
    ///
    /// # Errors
    ///
    /// [`DekubeError::UnknownArtifact`], [`DekubeError::CircularDependency`]
    /// or a malformed registry `depends` token.
    pub fn closure_names(&self, wishlist: &Wishlist) -> Result<Vec<String>, DekubeError> {
        self.walk(wishlist, None)
    }

    fn walk(
        &self,
        wishlist: &Wishlist,
        mut tracker: Option<&mut ConstraintTracker>,
    ) -> Result<Vec<String>, DekubeError> {
        let registry = self.extensions;
        let mut graph = DependencyGraph::new();
        let mut visited: HashSet<&str> = HashSet::new();
        let mut queue: VecDeque<&RegistryEntry> = VecDeque::new();

        for root in wishlist {
            let entry = registry.require(&root.name, None)?;
            if let Some(tracker) = tracker.as_deref_mut() {
                tracker.add_root(&entry.name, root.constraint.clone());
            }
            graph.ensure_node(&entry.name);
            if visited.insert(entry.name.as_str()) {
                queue.push_back(entry);
            }
        }

        while let Some(entry) = queue.pop_front() {
            for spec in entry.dependency_specs()? {
                let dependency = registry.require(spec.name(), Some(&entry.name))?;
                debug!("'{}' depends on '{spec}'", entry.name);

                graph.add_dependency(&entry.name, &dependency.name);
                if let Some(tracker) = tracker.as_deref_mut() {
                    tracker.add_edge(&dependency.name, &spec.constraint(), &entry.name)?;
                }

                if visited.insert(dependency.name.as_str()) {
                    queue.push_back(dependency);
                }
            }
        }

        let order = graph.install_order()?;
        debug!("Install order: {}", order.join(", "));
        Ok(order)
    }
}

/// Two extensions whose files share a base name would overwrite each other.
fn check_destinations(extensions: &[ResolvedArtifact]) -> Result<(), DekubeError> {
    let mut claimed: HashMap<PathBuf, &str> = HashMap::new();
    for artifact in extensions {
        let destination = destination_for(Path::new(""), artifact.kind, &artifact.file);
        if let Some(previous) = claimed.insert(destination.clone(), &artifact.name) {
            return Err(DekubeError::config(format!(
                "extensions '{previous}' and '{}' both install to {}",
                artifact.name,
                destination.display()
            )));
        }
    }
    Ok(())
}
