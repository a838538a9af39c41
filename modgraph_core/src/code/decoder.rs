//! Bytecode scanner — turns a code object into a stream of scan events.
//!
//! The scanner walks the instruction stream linearly with no control-flow
//! awareness: every statically present import is reported regardless of
//! reachability. Two instruction dialects exist for expressing imports:
//!
//! ```text
//! Legacy:  LOAD_CONST fromlist; IMPORT_NAME target
//!          (no level operand — implicit "relative then absolute")
//! Modern:  LOAD_CONST level; LOAD_CONST fromlist; IMPORT_NAME target
//! ```
//!
//! The dialect is detected per unit by a pre-scan for the modern triple; the
//! caller never chooses. After a unit's own stream is exhausted the scanner
//! recurses into every code constant in its pool, so imports buried in
//! function and class bodies are still seen. Events from the outer unit
//! always precede events from its nested units.

use super::opcodes::{self, arg_at};
use super::{CodeObject, Const};
use smallvec::SmallVec;
use std::sync::Arc;

// =============================================================================
// Scan Events
// =============================================================================

/// One semantic event decoded from an instruction stream.
#[derive(Debug, Clone, PartialEq)]
pub enum ScanEvent {
    /// A top-level name binding.
    Store(Arc<str>),

    /// An import under the implicit relative-then-absolute rule (level −1).
    Import {
        fromlist: Option<Box<[Arc<str>]>>,
        target: Arc<str>,
    },

    /// An import that must ignore the requesting package (level 0).
    AbsoluteImport {
        fromlist: Option<Box<[Arc<str>]>>,
        target: Arc<str>,
    },

    /// An explicitly relative import. `target` may be empty, meaning
    /// "the ancestor package reached by ascending `level` steps".
    RelativeImport {
        level: u32,
        fromlist: Option<Box<[Arc<str>]>>,
        target: Arc<str>,
    },
}

// =============================================================================
// Dialect Detection
// =============================================================================

/// Which import-instruction encoding a unit uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeStrategy {
    /// `LOAD_CONST fromlist; IMPORT_NAME target` pairs.
    Legacy,
    /// `LOAD_CONST level; LOAD_CONST fromlist; IMPORT_NAME target` triples.
    Modern,
}

impl DecodeStrategy {
    /// Detect the dialect of a unit by pre-scanning its instruction stream.
    ///
    /// The modern triple is checked first over the whole stream: a modern
    /// unit necessarily contains a `LOAD_CONST; IMPORT_NAME` window inside
    /// each triple, so checking the pair first would misclassify it. A unit
    /// exhibiting neither pattern has no import instructions and decodes as
    /// `Modern`.
    pub fn detect(code: &CodeObject) -> DecodeStrategy {
        let stream = &code.code;
        let mut pc = 0;
        while pc < stream.len() {
            let op = stream[pc];
            if op == opcodes::LOAD_CONST
                && stream.get(pc + 3) == Some(&opcodes::LOAD_CONST)
                && stream.get(pc + 6) == Some(&opcodes::IMPORT_NAME)
            {
                // Require an integer level constant so that an accidental
                // LOAD_CONST window in legacy code does not match.
                if arg_at(stream, pc)
                    .and_then(|i| code.consts.get(i as usize))
                    .and_then(Const::as_level)
                    .is_some()
                {
                    return DecodeStrategy::Modern;
                }
            }
            pc += opcodes::width(op);
        }

        let mut pc = 0;
        while pc < stream.len() {
            let op = stream[pc];
            if op == opcodes::LOAD_CONST && stream.get(pc + 3) == Some(&opcodes::IMPORT_NAME) {
                return DecodeStrategy::Legacy;
            }
            pc += opcodes::width(op);
        }

        DecodeStrategy::Modern
    }
}

// =============================================================================
// Event Stream
// =============================================================================

/// Per-unit cursor.
struct Frame<'a> {
    code: &'a CodeObject,
    strategy: DecodeStrategy,
    pc: usize,
}

/// Lazy, single-pass event stream over a unit and its nested units.
///
/// The stream is finite and non-restartable; build a new one to re-scan.
pub struct ScanEvents<'a> {
    current: Option<Frame<'a>>,
    /// Nested units waiting to be scanned, oldest first.
    pending: SmallVec<[&'a CodeObject; 8]>,
}

impl<'a> ScanEvents<'a> {
    /// Start scanning at the given unit.
    pub fn new(code: &'a CodeObject) -> Self {
        ScanEvents {
            current: Some(Frame {
                code,
                strategy: DecodeStrategy::detect(code),
                pc: 0,
            }),
            pending: SmallVec::new(),
        }
    }

    /// Pull the next event out of the current frame, if any.
    fn step(frame: &mut Frame<'a>) -> Option<ScanEvent> {
        let code = frame.code;
        let stream = &code.code;

        while frame.pc < stream.len() {
            let pc = frame.pc;
            let op = stream[pc];

            if opcodes::is_store(op) {
                if let Some(name) = arg_at(stream, pc)
                    .and_then(|i| code.names.get(i as usize))
                    .cloned()
                {
                    frame.pc = pc + 3;
                    return Some(ScanEvent::Store(name));
                }
                // Truncated or out-of-range store: fall through and skip.
            } else if op == opcodes::LOAD_CONST {
                match frame.strategy {
                    DecodeStrategy::Modern => {
                        if let Some(event) = Self::match_modern(code, pc) {
                            frame.pc = pc + 9;
                            return Some(event);
                        }
                    }
                    DecodeStrategy::Legacy => {
                        if let Some(event) = Self::match_legacy(code, pc) {
                            frame.pc = pc + 6;
                            return Some(event);
                        }
                    }
                }
            }

            frame.pc = pc + opcodes::width(op);
        }

        None
    }

    /// Match `LOAD_CONST level; LOAD_CONST fromlist; IMPORT_NAME target`
    /// at `pc`. A non-integer level constant means "not an import window".
    fn match_modern(code: &CodeObject, pc: usize) -> Option<ScanEvent> {
        let stream = &code.code;
        if stream.get(pc + 3) != Some(&opcodes::LOAD_CONST)
            || stream.get(pc + 6) != Some(&opcodes::IMPORT_NAME)
        {
            return None;
        }
        let level = code
            .consts
            .get(arg_at(stream, pc)? as usize)
            .and_then(Const::as_level)?;
        let fromlist = fromlist_const(code, arg_at(stream, pc + 3)?);
        let target = code.names.get(arg_at(stream, pc + 6)? as usize)?.clone();

        Some(match level {
            -1 => ScanEvent::Import { fromlist, target },
            0 => ScanEvent::AbsoluteImport { fromlist, target },
            n if n > 0 => ScanEvent::RelativeImport {
                level: n as u32,
                fromlist,
                target,
            },
            // Levels below −1 never occur in well-formed units; treat the
            // window as the dialect default.
            _ => ScanEvent::Import { fromlist, target },
        })
    }

    /// Match `LOAD_CONST fromlist; IMPORT_NAME target` at `pc`.
    fn match_legacy(code: &CodeObject, pc: usize) -> Option<ScanEvent> {
        let stream = &code.code;
        if stream.get(pc + 3) != Some(&opcodes::IMPORT_NAME) {
            return None;
        }
        let fromlist = fromlist_const(code, arg_at(stream, pc)?);
        let target = code.names.get(arg_at(stream, pc + 3)? as usize)?.clone();
        Some(ScanEvent::Import { fromlist, target })
    }
}

/// Interpret a constant-pool slot as a from-list operand.
fn fromlist_const(code: &CodeObject, index: u16) -> Option<Box<[Arc<str>]>> {
    code.consts
        .get(index as usize)
        .and_then(Const::as_fromlist)
        .map(Box::from)
}

impl<'a> Iterator for ScanEvents<'a> {
    type Item = ScanEvent;

    fn next(&mut self) -> Option<ScanEvent> {
        loop {
            let frame = self.current.as_mut()?;
            if let Some(event) = Self::step(frame) {
                return Some(event);
            }

            // Unit exhausted: queue its nested units, then move on.
            let done = self.current.take()?;
            self.pending.extend(done.code.nested_units().map(Arc::as_ref));
            if !self.pending.is_empty() {
                let next = self.pending.remove(0);
                self.current = Some(Frame {
                    code: next,
                    strategy: DecodeStrategy::detect(next),
                    pc: 0,
                });
            } else {
                return None;
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::code::builder::CodeBuilder;

    fn names(list: &[&str]) -> Const {
        Const::Names(list.iter().map(|s| Arc::from(*s)).collect())
    }

    fn events(code: &CodeObject) -> Vec<ScanEvent> {
        ScanEvents::new(code).collect()
    }

    // =========================================================================
    // Dialect Detection
    // =========================================================================

    #[test]
    fn test_detect_modern_triple() {
        let mut b = CodeBuilder::new("<module>", "t.py");
        b.load_const(Const::Int(-1));
        b.load_const(Const::None);
        b.import_name("os");
        let code = b.finish();
        assert_eq!(DecodeStrategy::detect(&code), DecodeStrategy::Modern);
    }

    #[test]
    fn test_detect_legacy_pair() {
        let mut b = CodeBuilder::new("<module>", "t.py");
        b.load_const(Const::None);
        b.import_name("os");
        let code = b.finish();
        assert_eq!(DecodeStrategy::detect(&code), DecodeStrategy::Legacy);
    }

    #[test]
    fn test_detect_defaults_to_modern_without_imports() {
        let mut b = CodeBuilder::new("<module>", "t.py");
        b.load_const(Const::Int(1));
        b.store_name("x");
        let code = b.finish();
        assert_eq!(DecodeStrategy::detect(&code), DecodeStrategy::Modern);
    }

    #[test]
    fn test_detect_modern_wins_over_embedded_pair() {
        // The second and third instructions of a modern triple look like a
        // legacy pair; the pre-scan must still say Modern.
        let mut b = CodeBuilder::new("<module>", "t.py");
        b.store_name("x");
        b.load_const(Const::Int(2));
        b.load_const(names(&["a"]));
        b.import_name("pkg");
        let code = b.finish();
        assert_eq!(DecodeStrategy::detect(&code), DecodeStrategy::Modern);
    }

    // =========================================================================
    // Event Decoding
    // =========================================================================

    #[test]
    fn test_store_events() {
        let mut b = CodeBuilder::new("<module>", "t.py");
        b.store_name("alpha");
        b.emit(opcodes::NOP);
        b.store_name("beta");
        let code = b.finish();
        assert_eq!(
            events(&code),
            vec![
                ScanEvent::Store("alpha".into()),
                ScanEvent::Store("beta".into()),
            ]
        );
    }

    #[test]
    fn test_modern_plain_import() {
        let mut b = CodeBuilder::new("<module>", "t.py");
        b.load_const(Const::Int(-1));
        b.load_const(Const::None);
        b.import_name("os.path");
        b.store_name("os");
        let code = b.finish();
        assert_eq!(
            events(&code),
            vec![
                ScanEvent::Import {
                    fromlist: None,
                    target: "os.path".into(),
                },
                ScanEvent::Store("os".into()),
            ]
        );
    }

    #[test]
    fn test_modern_absolute_import() {
        let mut b = CodeBuilder::new("<module>", "t.py");
        b.load_const(Const::Int(0));
        b.load_const(names(&["sep"]));
        b.import_name("os.path");
        let code = b.finish();
        match &events(&code)[0] {
            ScanEvent::AbsoluteImport { fromlist, target } => {
                assert_eq!(&**target, "os.path");
                assert_eq!(fromlist.as_deref().map(<[_]>::len), Some(1));
            }
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[test]
    fn test_modern_relative_import_empty_target() {
        let mut b = CodeBuilder::new("<module>", "t.py");
        b.load_const(Const::Int(2));
        b.load_const(names(&["helper"]));
        b.import_name("");
        let code = b.finish();
        assert_eq!(
            events(&code),
            vec![ScanEvent::RelativeImport {
                level: 2,
                fromlist: Some(vec![Arc::from("helper")].into_boxed_slice()),
                target: "".into(),
            }]
        );
    }

    #[test]
    fn test_legacy_import() {
        let mut b = CodeBuilder::new("<module>", "t.py");
        b.load_const(names(&["join", "split"]));
        b.import_name("os.path");
        b.store_name("join");
        let code = b.finish();
        match &events(&code)[0] {
            ScanEvent::Import { fromlist, target } => {
                assert_eq!(&**target, "os.path");
                assert_eq!(fromlist.as_deref().map(<[_]>::len), Some(2));
            }
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[test]
    fn test_filler_instructions_skipped_by_width() {
        let mut b = CodeBuilder::new("<module>", "t.py");
        b.emit(opcodes::NOP);
        b.load_name("print");
        b.emit_arg(opcodes::CALL_FUNCTION, 1);
        b.emit(opcodes::POP_TOP);
        b.load_const(Const::Int(-1));
        b.load_const(Const::None);
        b.import_name("sys");
        b.emit(opcodes::RETURN_VALUE);
        let code = b.finish();
        assert_eq!(
            events(&code),
            vec![ScanEvent::Import {
                fromlist: None,
                target: "sys".into(),
            }]
        );
    }

    #[test]
    fn test_nested_units_scanned_after_outer() {
        let mut inner = CodeBuilder::new("body", "t.py");
        inner.load_const(Const::Int(-1));
        inner.load_const(Const::None);
        inner.import_name("json");
        let inner = Arc::new(inner.finish());

        let mut outer = CodeBuilder::new("<module>", "t.py");
        outer.load_const(Const::Code(inner));
        outer.store_name("f");
        outer.load_const(Const::Int(-1));
        outer.load_const(Const::None);
        outer.import_name("sys");
        let outer = outer.finish();

        let got = events(&outer);
        // Outer events first, nested afterwards.
        assert_eq!(
            got,
            vec![
                ScanEvent::Store("f".into()),
                ScanEvent::Import {
                    fromlist: None,
                    target: "sys".into(),
                },
                ScanEvent::Import {
                    fromlist: None,
                    target: "json".into(),
                },
            ]
        );
    }

    #[test]
    fn test_deeply_nested_units() {
        let mut innermost = CodeBuilder::new("inner", "t.py");
        innermost.load_const(Const::Int(-1));
        innermost.load_const(Const::None);
        innermost.import_name("re");
        let innermost = Arc::new(innermost.finish());

        let mut middle = CodeBuilder::new("middle", "t.py");
        middle.load_const(Const::Code(innermost));
        middle.store_name("g");
        let middle = Arc::new(middle.finish());

        let mut outer = CodeBuilder::new("<module>", "t.py");
        outer.load_const(Const::Code(middle));
        outer.store_name("f");
        let outer = outer.finish();

        let got = events(&outer);
        assert!(got.contains(&ScanEvent::Import {
            fromlist: None,
            target: "re".into(),
        }));
    }

    #[test]
    fn test_mixed_dialects_across_nesting() {
        // A legacy nested unit inside a modern outer unit: detection is
        // per unit, so both imports must surface.
        let mut inner = CodeBuilder::new("body", "t.py");
        inner.load_const(Const::None);
        inner.import_name("legacy_dep");
        let inner = Arc::new(inner.finish());

        let mut outer = CodeBuilder::new("<module>", "t.py");
        outer.load_const(Const::Int(-1));
        outer.load_const(Const::None);
        outer.import_name("modern_dep");
        outer.load_const(Const::Code(inner));
        outer.store_name("f");
        let outer = outer.finish();

        let targets: Vec<_> = events(&outer)
            .into_iter()
            .filter_map(|e| match e {
                ScanEvent::Import { target, .. } => Some(target),
                _ => None,
            })
            .collect();
        assert_eq!(targets.len(), 2);
        assert_eq!(&*targets[0], "modern_dep");
        assert_eq!(&*targets[1], "legacy_dep");
    }

    #[test]
    fn test_truncated_stream_ends_cleanly() {
        let code = CodeObject {
            name: "<module>".into(),
            filename: "t.py".into(),
            code: vec![opcodes::LOAD_CONST, 0x00].into_boxed_slice(),
            names: Box::new([]),
            consts: Box::new([Const::None]),
        };
        assert!(events(&code).is_empty());
    }
}
