//! Static import-resolution engine.
//!
//! Builds the directed module-dependency graph of a program without running
//! it, by scanning compiled units and replaying the runtime's import
//! algorithm against the filesystem.
//!
//! # Architecture
//!
//! ```text
//! ModuleGraph (resolver)
//!   ├── DependencyGraph — petgraph store + identifier memo table
//!   ├── GraphConfig     — search path, excludes/aliases/implies, overrides
//!   ├── locate          — filesystem probing (suffix table, packages)
//!   └── scan loop       — decoder events re-entering the resolver
//! ```
//!
//! All resolution is single-threaded and depth-first: scanning a unit can
//! trigger loading another unit whose scan recurses further before the
//! original call returns. The graph only ever grows during a build.

pub mod config;
pub mod error;
pub mod graph;
pub mod locate;
pub mod node;
pub mod resolver;

pub use config::{GraphConfig, ManifestProbe, NoProbe, RuntimeProbe};
pub use error::ResolveError;
pub use graph::{DependencyGraph, EdgeKind, NodeIndex};
pub use node::{Node, NodeKind};
pub use petgraph::Direction;
pub use resolver::ModuleGraph;
