//! Engine configuration.
//!
//! Everything the resolution engine is allowed to consult beyond the
//! filesystem lives in one explicit `GraphConfig` value handed to
//! [`crate::ModuleGraph`] at construction. Nothing here is process-global,
//! so independent builds cannot contaminate each other.

use rustc_hash::{FxHashMap, FxHashSet};
use std::path::PathBuf;
use std::sync::Arc;

// =============================================================================
// Graph Configuration
// =============================================================================

/// Immutable build configuration.
#[derive(Debug, Clone, Default)]
pub struct GraphConfig {
    /// Ordered top-level module search path.
    pub search_path: Vec<PathBuf>,

    /// Identifiers that always resolve to `ExcludedModule`. Exclusion beats
    /// every other lazy policy for the same identifier.
    pub excludes: Vec<String>,

    /// Alternate identities: importing the key materializes an alias node
    /// snapshotting the value's node.
    pub aliases: Vec<(String, String)>,

    /// Dependencies static analysis cannot see, forced by name (e.g. a
    /// native module's hidden imports).
    pub implies: Vec<(String, Vec<String>)>,

    /// Extra search-path directories appended when the named package is
    /// materialized. Mirrors runtime search-path mutation some packages do.
    pub package_paths: FxHashMap<String, Vec<PathBuf>>,

    /// Identifier substitution applied when a package's initializer is
    /// about to load, redirecting its eventual identity.
    pub replace_package: FxHashMap<String, String>,

    /// Recorded-location rewrite rules for materialized units, in order.
    pub replace_paths: Vec<(PathBuf, PathBuf)>,

    /// Names that resolve as platform builtins when reached through the
    /// top-level search path.
    pub builtins: FxHashSet<Arc<str>>,
}

impl GraphConfig {
    /// Configuration with the default builtin table and the given search
    /// path.
    pub fn with_search_path(search_path: Vec<PathBuf>) -> Self {
        GraphConfig {
            search_path,
            builtins: default_builtins(),
            ..Default::default()
        }
    }

    /// Register an excluded identifier.
    pub fn exclude(mut self, name: impl Into<String>) -> Self {
        self.excludes.push(name.into());
        self
    }

    /// Register an alias identity.
    pub fn alias(mut self, name: impl Into<String>, target: impl Into<String>) -> Self {
        self.aliases.push((name.into(), target.into()));
        self
    }

    /// Register implied dependencies for an identifier.
    pub fn imply(mut self, name: impl Into<String>, deps: &[&str]) -> Self {
        self.implies
            .push((name.into(), deps.iter().map(|d| d.to_string()).collect()));
        self
    }

    /// Append an extra directory to a package's eventual search path.
    pub fn add_package_path(mut self, package: impl Into<String>, dir: PathBuf) -> Self {
        self.package_paths.entry(package.into()).or_default().push(dir);
        self
    }

    /// Redirect a package identity at load time.
    pub fn substitute_package(mut self, old: impl Into<String>, new: impl Into<String>) -> Self {
        self.replace_package.insert(old.into(), new.into());
        self
    }

    /// Append a recorded-location rewrite rule.
    pub fn rewrite_path(mut self, from: PathBuf, to: PathBuf) -> Self {
        self.replace_paths.push((from, to));
        self
    }
}

/// Names treated as loadable builtins with no backing file.
pub fn default_builtins() -> FxHashSet<Arc<str>> {
    ["sys", "builtins", "marshal", "gc", "errno", "posix", "_thread", "time"]
        .into_iter()
        .map(Arc::from)
        .collect()
}

// =============================================================================
// Runtime Probe
// =============================================================================

/// Answers the one question static analysis cannot: "does the host runtime
/// consider this name already loaded, and from which directories?"
///
/// Used only for the namespace-package fallback (a bare directory with no
/// initializer). The default [`NoProbe`] disables the fallback; callers with
/// a precomputed manifest can supply [`ManifestProbe`].
pub trait RuntimeProbe {
    /// The directory-shaped location of an already-loaded name, if any.
    fn package_path(&self, name: &str) -> Option<Vec<PathBuf>>;
}

/// Probe that knows nothing.
#[derive(Debug, Default)]
pub struct NoProbe;

impl RuntimeProbe for NoProbe {
    fn package_path(&self, _name: &str) -> Option<Vec<PathBuf>> {
        None
    }
}

/// Probe backed by a precomputed name → directories manifest.
#[derive(Debug, Default)]
pub struct ManifestProbe {
    entries: FxHashMap<String, Vec<PathBuf>>,
}

impl ManifestProbe {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a loaded name with its directory-shaped location.
    pub fn insert(&mut self, name: impl Into<String>, dirs: Vec<PathBuf>) {
        self.entries.insert(name.into(), dirs);
    }
}

impl RuntimeProbe for ManifestProbe {
    fn package_path(&self, name: &str) -> Option<Vec<PathBuf>> {
        self.entries.get(name).cloned()
    }
}

// =============================================================================
// Tests
// =============================================================================
