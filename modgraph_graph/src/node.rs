//! Graph vertices: one `Node` per resolved (or deliberately unresolved)
//! module identifier.

use crate::graph::NodeIndex;
use modgraph_core::CodeObject;
use rustc_hash::{FxHashMap, FxHashSet};
use std::path::PathBuf;
use std::sync::Arc;

// =============================================================================
// Node Kind
// =============================================================================

/// The closed set of vertex kinds.
///
/// Behavior differences between kinds (whether a node is scanned, carries a
/// search path, terminates resolution) are matched exhaustively wherever
/// they matter, never duck-typed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// Entry unit keyed by file path rather than module name.
    Script,
    /// Platform builtin: no file, no code.
    Builtin,
    /// Module compiled from source text.
    Source,
    /// Module deserialized from a precompiled cache; never recompiled.
    Compiled,
    /// Package with a search path and an initializer unit.
    Package,
    /// Native extension; opaque to the scanner.
    Extension,
    /// Package-like node with no initializer, search path seeded externally.
    Namespace,
    /// Alternate identity for another node, holding a frozen snapshot of it.
    Alias { target: Arc<str> },
    /// Terminal placeholder for an import that could not be satisfied.
    Missing,
    /// Terminal placeholder for an identifier excluded by configuration.
    Excluded,
}

impl NodeKind {
    /// Human-readable kind label used by the reporting layer.
    pub fn label(&self) -> &'static str {
        match self {
            NodeKind::Script => "Script",
            NodeKind::Builtin => "BuiltinModule",
            NodeKind::Source => "SourceModule",
            NodeKind::Compiled => "CompiledModule",
            NodeKind::Package => "Package",
            NodeKind::Extension => "Extension",
            NodeKind::Namespace => "NamespaceModule",
            NodeKind::Alias { .. } => "AliasNode",
            NodeKind::Missing => "MissingModule",
            NodeKind::Excluded => "ExcludedModule",
        }
    }
}

// =============================================================================
// Node
// =============================================================================

/// A vertex in the dependency graph.
#[derive(Debug)]
pub struct Node {
    /// Fully qualified dotted name; the unique graph key. Scripts use their
    /// canonical file path instead.
    pub identifier: Arc<str>,

    /// Which kind of vertex this is.
    pub kind: NodeKind,

    /// Backing file, when one exists.
    pub filename: Option<PathBuf>,

    /// Search-path directories. Present exactly for package-like nodes —
    /// its presence is what makes dotted sub-name lookup meaningful.
    pub packagepath: Option<Vec<PathBuf>>,

    /// Compiled unit, for nodes that were scanned.
    pub code: Option<Arc<CodeObject>>,

    /// Resolved submodules by short name. A `None` value records a
    /// requested from-list name known not to be a submodule.
    pub namespace: FxHashMap<Arc<str>, Option<NodeIndex>>,

    /// Names the unit binds at top level, including names pulled in through
    /// resolved wildcard imports.
    pub globalnames: FxHashSet<Arc<str>>,

    /// Wildcard-import origins whose exports could not be enumerated
    /// statically (targets with no code to introspect).
    pub starimports: FxHashSet<Arc<str>>,
}

impl Node {
    /// Create a bare node of the given kind.
    pub fn new(kind: NodeKind, identifier: impl Into<Arc<str>>) -> Self {
        Node {
            identifier: identifier.into(),
            kind,
            filename: None,
            packagepath: None,
            code: None,
            namespace: FxHashMap::default(),
            globalnames: FxHashSet::default(),
            starimports: FxHashSet::default(),
        }
    }

    /// Whether dotted sub-names can live under this node.
    #[inline]
    pub fn is_package_like(&self) -> bool {
        self.packagepath.is_some()
    }

    /// The short name of this node (`"path"` for `"os.path"`).
    #[inline]
    pub fn short_name(&self) -> &str {
        self.identifier
            .rsplit_once('.')
            .map_or(&*self.identifier, |(_, leaf)| leaf)
    }

    /// The parent identifier, when the identifier is dotted.
    #[inline]
    pub fn parent_name(&self) -> Option<&str> {
        self.identifier.rsplit_once('.').map(|(parent, _)| parent)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_labels() {
        assert_eq!(NodeKind::Source.label(), "SourceModule");
        assert_eq!(NodeKind::Missing.label(), "MissingModule");
        assert_eq!(
            NodeKind::Alias {
                target: "os".into()
            }
            .label(),
            "AliasNode"
        );
    }

    #[test]
    fn test_package_like_follows_search_path() {
        let mut node = Node::new(NodeKind::Source, "mod");
        assert!(!node.is_package_like());
        node.packagepath = Some(vec![PathBuf::from("/lib/mod")]);
        assert!(node.is_package_like());
    }

    #[test]
    fn test_short_and_parent_names() {
        let node = Node::new(NodeKind::Source, "os.path.join");
        assert_eq!(node.short_name(), "join");
        assert_eq!(node.parent_name(), Some("os.path"));

        let top = Node::new(NodeKind::Source, "os");
        assert_eq!(top.short_name(), "os");
        assert_eq!(top.parent_name(), None);
    }
}
