//! Scan configuration resolved from CLI flags and environment variables.
//!
//! Mirrors the engine's explicit-configuration rule: everything is resolved
//! once here, then handed to the engine as a `GraphConfig`. The environment
//! is only consulted when `-E` was not given.

use crate::args::ModgraphArgs;
use modgraph_graph::GraphConfig;
use std::path::{Path, PathBuf};

/// Environment variable naming extra search directories.
pub const PATH_ENV_VAR: &str = "MODGRAPH_PATH";

/// Assemble the engine configuration.
///
/// Search-path order: `-p` directories first (in flag order), then
/// `MODGRAPH_PATH`, then the directory of the first script operand (or the
/// current directory under `-m`).
pub fn build_graph_config(args: &ModgraphArgs) -> GraphConfig {
    let mut search_path: Vec<PathBuf> = Vec::new();

    for list in &args.paths {
        search_path.extend(std::env::split_paths(list));
    }

    if !args.ignore_environment {
        if let Some(list) = std::env::var_os(PATH_ENV_VAR) {
            search_path.extend(std::env::split_paths(&list));
        }
    }

    search_path.push(default_target_dir(args));

    let mut config = GraphConfig::with_search_path(search_path);
    for name in &args.excludes {
        config = config.exclude(name.clone());
    }
    config
}

/// The implicit final search entry derived from the analysis targets.
fn default_target_dir(args: &ModgraphArgs) -> PathBuf {
    if !args.modules {
        if let Some(script) = args.operands.first() {
            let dir = Path::new(script).parent();
            if let Some(dir) = dir.filter(|d| !d.as_os_str().is_empty()) {
                return dir.to_path_buf();
            }
        }
    }
    PathBuf::from(".")
}

/// Log filter derived from `-d` / `-q`.
pub fn log_level(args: &ModgraphArgs) -> log::LevelFilter {
    if args.quiet {
        log::LevelFilter::Error
    } else {
        match args.debug {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
