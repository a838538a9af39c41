//! Code object representation for compiled units.
//!
//! A `CodeObject` is the fundamental unit the scanner operates on: a flat
//! byte stream of instructions plus the name and constant tables those
//! instructions index. Code objects are immutable once built and are shared
//! via `Arc` (nested function/class bodies live in the constant pool of
//! their enclosing unit).

pub mod builder;
pub mod decoder;
pub mod opcodes;
pub mod rewrite;

use std::sync::Arc;

/// A compiled code object representing a module, script, or nested body.
#[derive(Debug, Clone)]
pub struct CodeObject {
    /// Unit name (`<module>` for top-level units).
    pub name: Arc<str>,

    /// Recorded source location. This is the string the path rewriter
    /// operates on.
    pub filename: Arc<str>,

    /// Raw instruction stream. Opcodes at or above
    /// [`opcodes::HAVE_ARGUMENT`] carry a little-endian `u16` argument.
    pub code: Box<[u8]>,

    /// Binding/import name table (indexed by `STORE_NAME`, `IMPORT_NAME`).
    pub names: Box<[Arc<str>]>,

    /// Constant pool (indexed by `LOAD_CONST`).
    pub consts: Box<[Const]>,
}

/// A constant-pool entry.
///
/// Only the shapes the scanner cares about exist: import levels are `Int`,
/// from-lists are `Names`, nested bodies are `Code`. Everything else a real
/// unit would carry collapses to `None`.
#[derive(Debug, Clone)]
pub enum Const {
    /// Absent value (also used for "no from-list").
    None,
    /// Integer constant (import level, plain literals).
    Int(i64),
    /// String constant.
    Str(Arc<str>),
    /// Tuple of names (a from-list; may contain the `"*"` marker).
    Names(Box<[Arc<str>]>),
    /// A nested compiled unit.
    Code(Arc<CodeObject>),
}

impl Const {
    /// View this constant as an import level.
    #[inline]
    pub fn as_level(&self) -> Option<i64> {
        match self {
            Const::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// View this constant as a from-list: `None` means "no from-list".
    #[inline]
    pub fn as_fromlist(&self) -> Option<&[Arc<str>]> {
        match self {
            Const::Names(names) => Some(names),
            _ => None,
        }
    }
}

impl PartialEq for Const {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Const::None, Const::None) => true,
            (Const::Int(a), Const::Int(b)) => a == b,
            (Const::Str(a), Const::Str(b)) => a == b,
            (Const::Names(a), Const::Names(b)) => a == b,
            // Nested units compare by identity; the builder never needs
            // structural equality for code constants.
            (Const::Code(a), Const::Code(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl CodeObject {
    /// Create an empty code object (mostly useful in tests).
    pub fn empty(name: impl Into<Arc<str>>, filename: impl Into<Arc<str>>) -> Self {
        CodeObject {
            name: name.into(),
            filename: filename.into(),
            code: Box::new([]),
            names: Box::new([]),
            consts: Box::new([]),
        }
    }

    /// Iterate over the nested units in this unit's constant pool.
    pub fn nested_units(&self) -> impl Iterator<Item = &Arc<CodeObject>> {
        self.consts.iter().filter_map(|c| match c {
            Const::Code(code) => Some(code),
            _ => None,
        })
    }
}
