//! Builder for constructing code objects.
//!
//! Provides instruction emission with automatic constant and name pool
//! deduplication. Used by the statement compiler and by tests that need
//! hand-assembled units.

use super::opcodes;
use super::{CodeObject, Const};
use std::collections::HashMap;
use std::sync::Arc;

/// Builder for a single code object.
///
/// # Example
/// ```ignore
/// let mut b = CodeBuilder::new("<module>", "app.py");
/// b.load_const(Const::Int(-1));
/// b.load_const(Const::None);
/// b.import_name("os.path");
/// b.store_name("os");
/// let code = b.finish();
/// ```
pub struct CodeBuilder {
    name: Arc<str>,
    filename: Arc<str>,

    /// Emitted instruction bytes.
    code: Vec<u8>,

    /// Constant pool.
    consts: Vec<Const>,

    /// Name table.
    names: Vec<Arc<str>>,
    /// Name to index map.
    name_map: HashMap<Arc<str>, u16>,
}

impl CodeBuilder {
    /// Create a builder for a unit with the given name and recorded location.
    pub fn new(name: impl Into<Arc<str>>, filename: impl Into<Arc<str>>) -> Self {
        CodeBuilder {
            name: name.into(),
            filename: filename.into(),
            code: Vec::new(),
            consts: Vec::new(),
            names: Vec::new(),
            name_map: HashMap::new(),
        }
    }

    /// Emit a 1-byte instruction.
    pub fn emit(&mut self, op: u8) {
        debug_assert!(op < opcodes::HAVE_ARGUMENT);
        self.code.push(op);
    }

    /// Emit a 3-byte instruction with a 16-bit argument.
    pub fn emit_arg(&mut self, op: u8, arg: u16) {
        debug_assert!(op >= opcodes::HAVE_ARGUMENT);
        self.code.push(op);
        self.code.extend_from_slice(&arg.to_le_bytes());
    }

    /// Intern a constant, reusing an existing pool slot when possible.
    pub fn const_index(&mut self, value: Const) -> u16 {
        if let Some(i) = self.consts.iter().position(|c| *c == value) {
            return i as u16;
        }
        self.consts.push(value);
        (self.consts.len() - 1) as u16
    }

    /// Intern a name-table entry.
    pub fn name_index(&mut self, name: &str) -> u16 {
        if let Some(&i) = self.name_map.get(name) {
            return i;
        }
        let key: Arc<str> = Arc::from(name);
        let i = self.names.len() as u16;
        self.names.push(Arc::clone(&key));
        self.name_map.insert(key, i);
        i
    }

    /// Emit `LOAD_CONST` for the given constant.
    pub fn load_const(&mut self, value: Const) {
        let i = self.const_index(value);
        self.emit_arg(opcodes::LOAD_CONST, i);
    }

    /// Emit `LOAD_NAME` for the given name.
    pub fn load_name(&mut self, name: &str) {
        let i = self.name_index(name);
        self.emit_arg(opcodes::LOAD_NAME, i);
    }

    /// Emit `IMPORT_NAME` for the given (possibly dotted) target.
    pub fn import_name(&mut self, target: &str) {
        let i = self.name_index(target);
        self.emit_arg(opcodes::IMPORT_NAME, i);
    }

    /// Emit `STORE_NAME` for the given name.
    pub fn store_name(&mut self, name: &str) {
        let i = self.name_index(name);
        self.emit_arg(opcodes::STORE_NAME, i);
    }

    /// Finish the unit.
    pub fn finish(self) -> CodeObject {
        CodeObject {
            name: self.name,
            filename: self.filename,
            code: self.code.into_boxed_slice(),
            names: self.names.into_boxed_slice(),
            consts: self.consts.into_boxed_slice(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_emits_widths() {
        let mut b = CodeBuilder::new("<module>", "t.py");
        b.emit(opcodes::NOP);
        b.emit_arg(opcodes::STORE_NAME, 0);
        let code = b.finish();
        assert_eq!(code.code.len(), 4);
        assert_eq!(code.code[0], opcodes::NOP);
        assert_eq!(code.code[1], opcodes::STORE_NAME);
    }

    #[test]
    fn test_const_pool_dedup() {
        let mut b = CodeBuilder::new("<module>", "t.py");
        let a = b.const_index(Const::Int(-1));
        let c = b.const_index(Const::Int(-1));
        let d = b.const_index(Const::Int(0));
        assert_eq!(a, c);
        assert_ne!(a, d);
        let code = b.finish();
        assert_eq!(code.consts.len(), 2);
    }

    #[test]
    fn test_name_table_dedup() {
        let mut b = CodeBuilder::new("<module>", "t.py");
        b.store_name("x");
        b.store_name("y");
        b.store_name("x");
        let code = b.finish();
        assert_eq!(code.names.len(), 2);
    }

    #[test]
    fn test_import_sequence_shape() {
        let mut b = CodeBuilder::new("<module>", "t.py");
        b.load_const(Const::Int(-1));
        b.load_const(Const::None);
        b.import_name("os");
        b.store_name("os");
        let code = b.finish();
        // Three 3-byte loads/imports plus the store.
        assert_eq!(code.code.len(), 12);
        assert_eq!(code.code[6], opcodes::IMPORT_NAME);
    }
}
