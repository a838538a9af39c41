//! Resolution failure taxonomy.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Why an import could not be satisfied.
///
/// Only [`ResolveError::NoModuleNamed`] is recoverable: while a unit's own
/// import statements are being scanned it degrades to a `MissingModule`
/// placeholder. Everything else aborts the build.
#[derive(Debug)]
pub enum ResolveError {
    /// The target was absent along the resolved search path.
    NoModuleNamed(String),

    /// A relative import ascended past the top of its package.
    RelativeImportTooDeep { requester: String, level: u32 },

    /// A precompiled unit carried the wrong format tag (or an unreadable
    /// payload behind a matching tag).
    BadCacheFormat { path: PathBuf },

    /// Internal-consistency violation: an identifier that already has a
    /// node was about to be materialized again.
    DuplicateResolution(String),

    /// Filesystem failure while loading a located unit.
    Io { path: PathBuf, error: io::Error },
}

impl ResolveError {
    /// Whether the scan-and-recover wrapper may swallow this failure.
    #[inline]
    pub fn is_recoverable(&self) -> bool {
        matches!(self, ResolveError::NoModuleNamed(_))
    }
}

impl fmt::Display for ResolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolveError::NoModuleNamed(name) => {
                write!(f, "no module named {}", name)
            }
            ResolveError::RelativeImportTooDeep { requester, level } => {
                write!(
                    f,
                    "relative import too deep (level {} from {})",
                    level, requester
                )
            }
            ResolveError::BadCacheFormat { path } => {
                write!(f, "bad cache format in {}", path.display())
            }
            ResolveError::DuplicateResolution(name) => {
                write!(f, "duplicate resolution of {}", name)
            }
            ResolveError::Io { path, error } => {
                write!(f, "cannot read {}: {}", path.display(), error)
            }
        }
    }
}

impl std::error::Error for ResolveError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ResolveError::Io { error, .. } => Some(error),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_missing_module_is_recoverable() {
        assert!(ResolveError::NoModuleNamed("x".into()).is_recoverable());
        assert!(!ResolveError::RelativeImportTooDeep {
            requester: "p.m".into(),
            level: 3,
        }
        .is_recoverable());
        assert!(!ResolveError::BadCacheFormat {
            path: PathBuf::from("m.pyc"),
        }
        .is_recoverable());
        assert!(!ResolveError::DuplicateResolution("x".into()).is_recoverable());
    }

    #[test]
    fn test_display_names_the_module() {
        let err = ResolveError::NoModuleNamed("pkg.sub".into());
        assert_eq!(err.to_string(), "no module named pkg.sub");
    }
}
