//! Compiled-code model for static dependency scanning.
//!
//! This crate owns everything that touches a compiled unit directly:
//!
//! ```text
//! CodeObject (code/)
//!   ├── opcodes     — u8 instruction set, width rule
//!   ├── builder     — CodeBuilder for emitting units
//!   ├── decoder     — ScanEvents: store/import event stream
//!   └── rewrite     — recorded-filename rewriting
//! compile  — statement compiler (text → CodeObject)
//! cache    — magic-tagged binary form (bytes ⇄ CodeObject)
//! ```
//!
//! Nothing here knows about modules, packages, or graphs — the resolution
//! engine in `modgraph_graph` consumes these pieces.

pub mod cache;
pub mod code;
pub mod compile;

pub use cache::{read_cache, write_cache, CacheError, CACHE_MAGIC};
pub use code::builder::CodeBuilder;
pub use code::decoder::{DecodeStrategy, ScanEvent, ScanEvents};
pub use code::rewrite::rewrite_paths;
pub use code::{CodeObject, Const};
pub use compile::compile_source;

/// Crate version, surfaced by the CLI banner.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
