//! Filesystem probing: map a module name to a load descriptor.
//!
//! The layered matcher runs per search-path directory, in order:
//! package directory with an initializer, then source, then precompiled
//! cache, then native extension. A bare directory with no initializer only
//! becomes a namespace package if the runtime probe vouches for it (handled
//! by the resolver).

use std::fs;
use std::path::{Path, PathBuf};

/// Source-file suffix.
pub const SOURCE_SUFFIX: &str = ".py";
/// Precompiled-cache suffix.
pub const CACHED_SUFFIX: &str = ".pyc";
/// Native-extension suffixes.
pub const EXTENSION_SUFFIXES: &[&str] = &[".so", ".pyd"];
/// Stem of a package initializer unit.
pub const INIT_STEM: &str = "__init__";

/// Where and how a module can be loaded from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Located {
    /// Package directory (the initializer is located separately).
    Package(PathBuf),
    /// Source file to compile.
    Source(PathBuf),
    /// Precompiled cache file to deserialize.
    Cached(PathBuf),
    /// Native extension; never scanned.
    Extension(PathBuf),
    /// Platform builtin; no location at all.
    Builtin,
    /// Namespace package with an externally seeded search path.
    Namespace(Vec<PathBuf>),
}

/// Check a single search-path directory for `name`.
///
/// Returns the descriptor on a hit, plus whether a bare `name/` directory
/// (no initializer) was seen — input to the namespace fallback.
pub fn scan_directory(dir: &Path, name: &str) -> (Option<Located>, bool) {
    let pkg_dir = dir.join(name);
    let mut bare_dir = false;
    if pkg_dir.is_dir() {
        if find_init(&pkg_dir).is_some() {
            return (Some(Located::Package(canonical(pkg_dir))), false);
        }
        bare_dir = true;
    }

    let source = dir.join(format!("{}{}", name, SOURCE_SUFFIX));
    if source.is_file() {
        return (Some(Located::Source(canonical(source))), bare_dir);
    }

    let cached = dir.join(format!("{}{}", name, CACHED_SUFFIX));
    if cached.is_file() {
        return (Some(Located::Cached(canonical(cached))), bare_dir);
    }

    for suffix in EXTENSION_SUFFIXES {
        let ext = dir.join(format!("{}{}", name, suffix));
        if ext.is_file() {
            return (Some(Located::Extension(canonical(ext))), bare_dir);
        }
    }

    (None, bare_dir)
}

/// Locate the initializer unit of a package directory.
pub fn find_init(pkg_dir: &Path) -> Option<Located> {
    let source = pkg_dir.join(format!("{}{}", INIT_STEM, SOURCE_SUFFIX));
    if source.is_file() {
        return Some(Located::Source(canonical(source)));
    }
    let cached = pkg_dir.join(format!("{}{}", INIT_STEM, CACHED_SUFFIX));
    if cached.is_file() {
        return Some(Located::Cached(canonical(cached)));
    }
    None
}

/// Module name for a directory entry, when its suffix is recognized.
///
/// Used by wildcard expansion to enumerate a package's loadable submodules.
pub fn module_name_for_file(filename: &str) -> Option<&str> {
    let strip = |suffix: &str| filename.strip_suffix(suffix);
    strip(SOURCE_SUFFIX)
        .or_else(|| strip(CACHED_SUFFIX))
        .or_else(|| EXTENSION_SUFFIXES.iter().find_map(|&s| strip(s)))
}

/// Enumerate the loadable submodule names under one directory. Listing
/// failures degrade to an empty result.
pub fn list_submodules(dir: &Path) -> Vec<String> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) => {
            log::debug!("can't list directory {}: {}", dir.display(), err);
            return Vec::new();
        }
    };
    let mut names = Vec::new();
    for entry in entries.flatten() {
        let filename = entry.file_name();
        let Some(filename) = filename.to_str() else { continue };
        if let Some(stem) = module_name_for_file(filename) {
            if stem != INIT_STEM {
                names.push(stem.to_string());
            }
        }
    }
    names
}

/// Canonicalize when possible; fall back to the path as found.
pub fn canonical(path: PathBuf) -> PathBuf {
    fs::canonicalize(&path).unwrap_or(path)
}

// =============================================================================
// Tests
// =============================================================================
