//! Statement compiler: source text → code object.
//!
//! Dependency scanning only needs the binding and import instructions, so
//! this compiler is deliberately narrow: it recognizes `import` / `from`
//! statements, top-level name bindings, and `def` / `class` headers (whose
//! indented bodies become nested units in the constant pool). Everything
//! else compiles to filler or to nothing at all — the contract is that
//! compilation never fails, because scanning must survive code it cannot
//! model.
//!
//! A `from __future__ import absolute_import` anywhere in the file flips the
//! default import level of the whole unit (including nested bodies) from −1
//! to 0, matching the dialect's own switch.

use crate::code::builder::CodeBuilder;
use crate::code::{opcodes, CodeObject, Const};
use std::sync::Arc;

/// Compile source text into a module-level code object.
///
/// A trailing newline is implied; the recorded location is `filename`.
pub fn compile_source(source: &str, filename: &str) -> Arc<CodeObject> {
    let lines = logical_lines(source);
    let default_level = if has_future_absolute_import(&lines) { 0 } else { -1 };

    let mut compiler = Compiler {
        lines: &lines,
        pos: 0,
        default_level,
        filename,
    };
    let mut builder = CodeBuilder::new("<module>", filename);
    compiler.block(&mut builder, 0);
    builder.emit(opcodes::RETURN_VALUE);
    Arc::new(builder.finish())
}

// =============================================================================
// Line Preprocessing
// =============================================================================

struct Line {
    indent: usize,
    text: String,
}

/// Split the source into indented statement lines, dropping blanks and
/// comments. Tabs count as eight columns.
fn logical_lines(source: &str) -> Vec<Line> {
    let mut out = Vec::new();
    for raw in source.lines() {
        let mut indent = 0;
        let mut start = raw.len();
        for (i, ch) in raw.char_indices() {
            match ch {
                ' ' => indent += 1,
                '\t' => indent += 8,
                _ => {
                    start = i;
                    break;
                }
            }
        }
        let text = strip_comment(&raw[start..]);
        let text = text.trim_end();
        if text.is_empty() {
            continue;
        }
        out.push(Line {
            indent,
            text: text.to_string(),
        });
    }
    out
}

/// Truncate at the first `#` that sits outside a string literal.
fn strip_comment(text: &str) -> &str {
    let mut quote: Option<char> = None;
    for (i, ch) in text.char_indices() {
        match (quote, ch) {
            (None, '#') => return &text[..i],
            (None, '\'' | '"') => quote = Some(ch),
            (Some(q), c) if c == q => quote = None,
            _ => {}
        }
    }
    text
}

fn has_future_absolute_import(lines: &[Line]) -> bool {
    lines.iter().any(|l| {
        l.indent == 0
            && l.text.starts_with("from __future__ import")
            && l.text.contains("absolute_import")
    })
}

// =============================================================================
// Compiler
// =============================================================================

const COMPOUND_KEYWORDS: &[&str] = &[
    "if", "elif", "else", "for", "while", "with", "try", "except", "finally",
];

struct Compiler<'a> {
    lines: &'a [Line],
    pos: usize,
    default_level: i64,
    filename: &'a str,
}

impl<'a> Compiler<'a> {
    /// Compile statements at `indent` into `b` until the indentation drops.
    fn block(&mut self, b: &mut CodeBuilder, indent: usize) {
        while self.pos < self.lines.len() {
            if self.lines[self.pos].indent < indent {
                return;
            }
            let text = self.lines[self.pos].text.clone();
            let line_indent = self.lines[self.pos].indent;
            self.pos += 1;

            if let Some(name) = definition_name(&text) {
                self.definition(b, &name, line_indent);
            } else if let Some(inline) = compound_header(&text) {
                // The header itself emits nothing; the body stays in the
                // same unit.
                if let Some(stmt) = inline {
                    self.statement(b, stmt);
                }
                if self.pos < self.lines.len() && self.lines[self.pos].indent > line_indent {
                    let body_indent = self.lines[self.pos].indent;
                    self.block(b, body_indent);
                }
            } else {
                self.statement(b, &text);
            }
        }
    }

    /// Compile a `def` / `class` body into a nested unit bound to `name`.
    fn definition(&mut self, b: &mut CodeBuilder, name: &str, header_indent: usize) {
        let mut nb = CodeBuilder::new(name, self.filename);
        if self.pos < self.lines.len() && self.lines[self.pos].indent > header_indent {
            let body_indent = self.lines[self.pos].indent;
            self.block(&mut nb, body_indent);
        }
        nb.emit(opcodes::RETURN_VALUE);
        b.load_const(Const::Code(Arc::new(nb.finish())));
        b.emit_arg(opcodes::MAKE_FUNCTION, 0);
        b.store_name(name);
    }

    /// Compile one simple statement.
    fn statement(&mut self, b: &mut CodeBuilder, text: &str) {
        let text = text.trim();
        if let Some(rest) = text.strip_prefix("import ") {
            self.import_statement(b, rest);
        } else if let Some(rest) = text.strip_prefix("from ") {
            self.from_statement(b, rest);
        } else if let Some(name) = assignment_target(text) {
            b.load_const(Const::None);
            b.store_name(&name);
        } else if let Some(callee) = call_target(text) {
            b.load_name(&callee);
            b.emit_arg(opcodes::CALL_FUNCTION, 0);
            b.emit(opcodes::POP_TOP);
        }
        // Anything else contributes nothing the scanner cares about.
    }

    /// `import a.b.c [as x][, d ...]`
    fn import_statement(&mut self, b: &mut CodeBuilder, rest: &str) {
        for spec in rest.split(',') {
            let tokens: Vec<&str> = spec.split_whitespace().collect();
            let Some(&target) = tokens.first() else { continue };
            if !is_dotted_name(target) {
                continue;
            }
            b.load_const(Const::Int(self.default_level));
            b.load_const(Const::None);
            b.import_name(target);

            let bound = match tokens.get(1).zip(tokens.get(2)) {
                Some((&"as", alias)) if is_identifier(alias) => *alias,
                _ => target.split('.').next().unwrap_or(target),
            };
            b.store_name(bound);
        }
    }

    /// `from [dots]module import names | *`
    fn from_statement(&mut self, b: &mut CodeBuilder, rest: &str) {
        let Some((module_part, names_part)) = split_once_token(rest, "import") else {
            return;
        };
        let module_part = module_part.trim();
        let dots = module_part.chars().take_while(|&c| c == '.').count();
        let target = &module_part[dots..];
        if dots == 0 && !is_dotted_name(target) {
            return;
        }
        let level = if dots > 0 {
            dots as i64
        } else {
            self.default_level
        };

        let names_part = names_part
            .trim()
            .trim_start_matches('(')
            .trim_end_matches(')');

        let mut fromlist: Vec<Arc<str>> = Vec::new();
        let mut bound: Vec<String> = Vec::new();
        for entry in names_part.split(',') {
            let tokens: Vec<&str> = entry.split_whitespace().collect();
            let Some(&name) = tokens.first() else { continue };
            if name == "*" {
                fromlist.push(Arc::from("*"));
                continue;
            }
            if !is_identifier(name) {
                continue;
            }
            fromlist.push(Arc::from(name));
            match tokens.get(1).zip(tokens.get(2)) {
                Some((&"as", alias)) if is_identifier(alias) => bound.push((*alias).to_string()),
                _ => bound.push(name.to_string()),
            }
        }
        if fromlist.is_empty() {
            return;
        }

        b.load_const(Const::Int(level));
        b.load_const(Const::Names(fromlist.into_boxed_slice()));
        b.import_name(target);
        for name in &bound {
            b.store_name(name);
        }
    }
}

// =============================================================================
// Token Helpers
// =============================================================================

/// `def name(...)` / `class name...` headers ending in `:`.
fn definition_name(text: &str) -> Option<String> {
    let rest = text
        .strip_prefix("def ")
        .or_else(|| text.strip_prefix("class "))?;
    if !text.trim_end().ends_with(':') {
        return None;
    }
    let name: String = rest
        .chars()
        .take_while(|c| c.is_alphanumeric() || *c == '_')
        .collect();
    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}

/// A compound-statement header: returns any inline body after the colon
/// (`if cond: import x`).
fn compound_header(text: &str) -> Option<Option<&str>> {
    let keyword = text
        .split(|c: char| !c.is_alphanumeric() && c != '_')
        .next()?;
    if !COMPOUND_KEYWORDS.contains(&keyword) {
        return None;
    }
    let colon = find_outside_quotes(text, ':')?;
    let tail = text[colon + 1..].trim();
    Some((!tail.is_empty()).then_some(tail))
}

/// `name = ...` (a single identifier target, not `==`).
fn assignment_target(text: &str) -> Option<String> {
    let eq = find_outside_quotes(text, '=')?;
    if text.as_bytes().get(eq + 1) == Some(&b'=') {
        return None;
    }
    let lhs = text[..eq].trim();
    // Strip a trailing annotation (`name: int = ...`).
    let lhs = lhs.split(':').next().unwrap_or(lhs).trim();
    is_identifier(lhs).then(|| lhs.to_string())
}

/// `name(...)` expression statements.
fn call_target(text: &str) -> Option<String> {
    let open = text.find('(')?;
    let callee = text[..open].trim();
    is_identifier(callee).then(|| callee.to_string())
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_')
}

fn is_dotted_name(s: &str) -> bool {
    !s.is_empty() && s.split('.').all(is_identifier)
}

/// Split at the first standalone occurrence of `word`.
fn split_once_token<'t>(text: &'t str, word: &str) -> Option<(&'t str, &'t str)> {
    let mut search = 0;
    while let Some(at) = text[search..].find(word) {
        let start = search + at;
        let end = start + word.len();
        let before_ok = start == 0
            || text[..start]
                .chars()
                .next_back()
                .is_some_and(char::is_whitespace);
        let after_ok = text[end..]
            .chars()
            .next()
            .map_or(true, char::is_whitespace);
        if before_ok && after_ok {
            return Some((&text[..start], &text[end..]));
        }
        search = end;
    }
    None
}

fn find_outside_quotes(text: &str, needle: char) -> Option<usize> {
    let mut quote: Option<char> = None;
    for (i, ch) in text.char_indices() {
        match (quote, ch) {
            (None, c) if c == needle => return Some(i),
            (None, '\'' | '"') => quote = Some(ch),
            (Some(q), c) if c == q => quote = None,
            _ => {}
        }
    }
    None
}

// =============================================================================
// Tests
// =============================================================================
