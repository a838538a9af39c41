//! Recorded-location rewriting for reproducible output.
//!
//! Freezing tools want the filenames baked into shipped units to point at
//! the install layout, not the build machine. `rewrite_paths` rebuilds a
//! unit (and every nested unit reachable through its constant pool) with
//! its recorded filename translated through an ordered prefix-rule list.

use super::{CodeObject, Const};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Rewrite the recorded filename of `code` and of all nested units.
///
/// Rules are `(from, to)` prefix pairs tried in order; the first rule whose
/// `from` is a whole-component prefix of the recorded location wins, and at
/// most one rule is applied per location. Locations matching no rule are
/// left unchanged.
pub fn rewrite_paths(code: &CodeObject, rules: &[(PathBuf, PathBuf)]) -> CodeObject {
    let consts: Vec<Const> = code
        .consts
        .iter()
        .map(|c| match c {
            Const::Code(nested) => Const::Code(Arc::new(rewrite_paths(nested, rules))),
            other => other.clone(),
        })
        .collect();

    CodeObject {
        name: Arc::clone(&code.name),
        filename: rewrite_one(&code.filename, rules),
        code: code.code.clone(),
        names: code.names.clone(),
        consts: consts.into_boxed_slice(),
    }
}

/// Apply the first matching rule to a single location.
fn rewrite_one(filename: &Arc<str>, rules: &[(PathBuf, PathBuf)]) -> Arc<str> {
    let location = Path::new(filename.as_ref());
    for (from, to) in rules {
        // strip_prefix only succeeds on whole path components, which is
        // exactly the boundary rule: "/src/app" never matches "/src/appx".
        if let Ok(rest) = location.strip_prefix(from) {
            return Arc::from(to.join(rest).to_string_lossy().as_ref());
        }
    }
    Arc::clone(filename)
}
