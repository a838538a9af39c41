//! The resolution engine.
//!
//! `ModuleGraph` replays the runtime's import algorithm statically:
//! a top-level request (run a script, resolve an import) loads a unit,
//! scanning the unit emits import events, and every event re-enters the
//! engine until the dependency closure is materialized. All state — the
//! graph, the memo table, the lazy registry — is owned here and mutated
//! strictly sequentially.

use crate::config::{GraphConfig, NoProbe, RuntimeProbe};
use crate::error::ResolveError;
use crate::graph::{DependencyGraph, EdgeKind, NodeIndex};
use crate::locate::{self, Located};
use crate::node::{Node, NodeKind};
use log::{debug, trace};
use modgraph_core::{compile_source, read_cache, rewrite_paths, CodeObject, ScanEvent, ScanEvents};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use std::collections::BTreeSet;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

/// Pre-registered policy for an identifier that has no node yet.
///
/// Entries are consumed exactly once, at first resolution.
enum LazyEntry {
    Excluded,
    Alias(Arc<str>),
    Implies(Vec<Arc<str>>),
}

/// Static module-dependency graph builder.
pub struct ModuleGraph {
    graph: DependencyGraph,
    lazy: FxHashMap<Arc<str>, LazyEntry>,
    config: GraphConfig,
    probe: Box<dyn RuntimeProbe>,
}

impl ModuleGraph {
    /// Build an engine over the given configuration, with the namespace
    /// fallback disabled.
    pub fn new(config: GraphConfig) -> Self {
        Self::with_probe(config, Box::new(NoProbe))
    }

    /// Build an engine with an explicit runtime probe.
    pub fn with_probe(config: GraphConfig, probe: Box<dyn RuntimeProbe>) -> Self {
        let mut lazy: FxHashMap<Arc<str>, LazyEntry> = FxHashMap::default();
        for (name, deps) in &config.implies {
            lazy.insert(
                Arc::from(name.as_str()),
                LazyEntry::Implies(deps.iter().map(|d| Arc::from(d.as_str())).collect()),
            );
        }
        for (name, target) in &config.aliases {
            lazy.insert(
                Arc::from(name.as_str()),
                LazyEntry::Alias(Arc::from(target.as_str())),
            );
        }
        // Exclusion is strongest: registered last so it overwrites any
        // alias/implies entry for the same identifier.
        for name in &config.excludes {
            lazy.insert(Arc::from(name.as_str()), LazyEntry::Excluded);
        }

        ModuleGraph {
            graph: DependencyGraph::new(),
            lazy,
            config,
            probe,
        }
    }

    /// Read-only view of the accumulated graph.
    #[inline]
    pub fn graph(&self) -> &DependencyGraph {
        &self.graph
    }

    /// The configuration this build runs under.
    #[inline]
    pub fn config(&self) -> &GraphConfig {
        &self.config
    }

    // =========================================================================
    // Entry Points
    // =========================================================================

    /// Analyze a script file: compile it, scan it, and pull in everything
    /// it transitively imports.
    pub fn run_script(&mut self, path: &std::path::Path) -> Result<NodeIndex, ResolveError> {
        let path = fs::canonicalize(path).map_err(|error| ResolveError::Io {
            path: path.to_path_buf(),
            error,
        })?;
        let identifier: Arc<str> = Arc::from(path.to_string_lossy().as_ref());
        trace!("run_script {}", identifier);

        if let Some(existing) = self.find_node(&identifier)? {
            return Ok(existing);
        }

        let text = fs::read_to_string(&path).map_err(|error| ResolveError::Io {
            path: path.clone(),
            error,
        })?;
        let code = self.apply_rewrite(compile_source(&text, &identifier));

        let mut node = Node::new(NodeKind::Script, Arc::clone(&identifier));
        node.filename = Some(path);
        node.code = Some(Arc::clone(&code));
        let m = self.graph.intern(node);
        self.scan_unit(&code, m)?;
        Ok(m)
    }

    /// Resolve an import request.
    ///
    /// `level` follows the dialect: −1 tries relative to the requesting
    /// package first and absolute second, 0 is absolute, ≥1 ascends the
    /// requester's package chain. Returns every node the request produced
    /// (the leaf plus any from-list targets). Fails when the import cannot
    /// be satisfied; automatic scanning wraps this in the recovering path
    /// instead of calling it directly.
    pub fn resolve_import(
        &mut self,
        name: &str,
        caller: Option<NodeIndex>,
        fromlist: Option<&[Arc<str>]>,
        level: i32,
    ) -> Result<BTreeSet<NodeIndex>, ResolveError> {
        trace!("resolve_import {} (level {})", name, level);
        let parent = self.determine_parent(caller, level)?;
        let (head, tail) = self.resolve_head(parent, name)?;
        let leaf = self.descend_tail(head, &tail)?;

        let mut modules = BTreeSet::new();
        modules.insert(leaf);
        if let Some(fromlist) = fromlist {
            if !fromlist.is_empty() && self.graph.node(leaf).is_package_like() {
                modules.extend(self.ensure_fromlist(leaf, fromlist)?);
            }
        }
        if let Some(caller) = caller {
            for &m in &modules {
                self.graph.add_edge(caller, m, EdgeKind::Direct);
            }
        }
        Ok(modules)
    }

    // =========================================================================
    // Import Algorithm
    // =========================================================================

    /// Resolve the package an import request is relative to.
    fn determine_parent(
        &mut self,
        caller: Option<NodeIndex>,
        level: i32,
    ) -> Result<Option<NodeIndex>, ResolveError> {
        let Some(caller) = caller else {
            return Ok(None);
        };
        if level == 0 {
            return Ok(None);
        }

        let (identifier, package_like) = {
            let node = self.graph.node(caller);
            (Arc::clone(&node.identifier), node.is_package_like())
        };

        if level >= 1 {
            // A package consumes one ascension step for itself.
            let mut remaining = level as usize;
            if package_like {
                remaining -= 1;
            }
            if remaining == 0 {
                return Ok(Some(caller));
            }
            let dots = identifier.matches('.').count();
            if dots < remaining {
                return Err(ResolveError::RelativeImportTooDeep {
                    requester: identifier.to_string(),
                    level: level as u32,
                });
            }
            let parts: Vec<&str> = identifier.split('.').collect();
            let ancestor = parts[..parts.len() - remaining].join(".");
            return self.find_node(&ancestor);
        }

        // level == −1: implicit relative-or-absolute.
        if package_like {
            return Ok(Some(caller));
        }
        if let Some((parent, _)) = identifier.rsplit_once('.') {
            return self.find_node(parent);
        }
        Ok(None)
    }

    /// Resolve the head component of a dotted name, retrying once without
    /// the parent: under level −1 an apparently relative reference can
    /// really be a top-level module.
    fn resolve_head(
        &mut self,
        parent: Option<NodeIndex>,
        name: &str,
    ) -> Result<(NodeIndex, String), ResolveError> {
        let (head, tail) = match name.split_once('.') {
            Some((head, tail)) => (head, tail.to_string()),
            None => (name, String::new()),
        };

        let qualified = match parent {
            Some(p) => format!("{}.{}", self.graph.node(p).identifier, head),
            None => head.to_string(),
        };
        if let Some(q) = self.import_one(head, &qualified, parent)? {
            return Ok((q, tail));
        }
        if parent.is_some() {
            if let Some(q) = self.import_one(head, head, None)? {
                return Ok((q, tail));
            }
            return Err(ResolveError::NoModuleNamed(head.to_string()));
        }
        Err(ResolveError::NoModuleNamed(qualified))
    }

    /// Walk the remaining dotted components below the head package.
    fn descend_tail(&mut self, head: NodeIndex, tail: &str) -> Result<NodeIndex, ResolveError> {
        let mut m = head;
        for part in tail.split('.').filter(|p| !p.is_empty()) {
            let qualified = format!("{}.{}", self.graph.node(m).identifier, part);
            m = self
                .import_one(part, &qualified, Some(m))?
                .ok_or(ResolveError::NoModuleNamed(qualified))?;
        }
        Ok(m)
    }

    /// Resolve the names requested alongside an import of a package.
    ///
    /// The wildcard marker expands to every directly loadable submodule on
    /// the package's search path.
    fn ensure_fromlist(
        &mut self,
        m: NodeIndex,
        fromlist: &[Arc<str>],
    ) -> Result<Vec<NodeIndex>, ResolveError> {
        let mut wanted: Vec<Arc<str>> = Vec::new();
        let mut seen: BTreeSet<Arc<str>> = BTreeSet::new();
        for sub in fromlist {
            if &**sub == "*" {
                for name in self.list_package_submodules(m) {
                    let name: Arc<str> = Arc::from(name.as_str());
                    if seen.insert(Arc::clone(&name)) {
                        wanted.push(name);
                    }
                }
            } else if seen.insert(Arc::clone(sub)) {
                wanted.push(Arc::clone(sub));
            }
        }

        let mut produced = Vec::new();
        for sub in wanted {
            if let Some(Some(cached)) = self.graph.node(m).namespace.get(&sub) {
                produced.push(*cached);
                continue;
            }
            let qualified = format!("{}.{}", self.graph.node(m).identifier, sub);
            let node = self
                .import_one(&sub, &qualified, Some(m))?
                .ok_or(ResolveError::NoModuleNamed(qualified))?;
            produced.push(node);
        }
        Ok(produced)
    }

    /// Every loadable submodule name along a package's search path,
    /// initializers excluded. Sorted for deterministic expansion.
    fn list_package_submodules(&self, m: NodeIndex) -> Vec<String> {
        let Some(packagepath) = self.graph.node(m).packagepath.clone() else {
            return Vec::new();
        };
        let mut names = BTreeSet::new();
        for dir in &packagepath {
            names.extend(locate::list_submodules(dir));
        }
        names.into_iter().collect()
    }

    /// Import a single dotted-name component. Memoized: this is the only
    /// place an identifier's node is reused instead of re-materialized.
    ///
    /// Returns `Ok(None)` as a soft miss — the caller decides whether that
    /// is fatal. Submodule lookup under a non-package is structurally
    /// impossible and always a soft miss.
    fn import_one(
        &mut self,
        part: &str,
        qualified: &str,
        parent: Option<NodeIndex>,
    ) -> Result<Option<NodeIndex>, ResolveError> {
        trace!("import_one {} as {}", part, qualified);
        if let Some(m) = self.find_node(qualified)? {
            if let Some(p) = parent {
                self.graph.add_edge(m, p, EdgeKind::Direct);
            }
            return Ok(Some(m));
        }

        let parent_path = match parent {
            Some(p) => match self.graph.node(p).packagepath.clone() {
                Some(path) => Some(path),
                None => return Ok(None),
            },
            None => None,
        };

        let located = match self.locate(part, parent_path.as_deref(), qualified)? {
            Some(located) => located,
            None => return Ok(None),
        };
        let m = self.materialize(qualified, located)?;
        if let Some(p) = parent {
            self.graph.add_edge(m, p, EdgeKind::Direct);
            self.graph
                .node_mut(p)
                .namespace
                .insert(Arc::from(part), Some(m));
        }
        Ok(Some(m))
    }

    /// Find a not-yet-seen module by name along a search path.
    fn locate(
        &mut self,
        name: &str,
        path: Option<&[PathBuf]>,
        qualified: &str,
    ) -> Result<Option<Located>, ResolveError> {
        // Reaching this for an identifier that already has a node means the
        // memo check was bypassed somewhere.
        if self.graph.find(qualified).is_some() {
            return Err(ResolveError::DuplicateResolution(qualified.to_string()));
        }

        let search: Vec<PathBuf> = match path {
            Some(path) => path.to_vec(),
            None => {
                if self.config.builtins.contains(name) {
                    return Ok(Some(Located::Builtin));
                }
                self.config.search_path.clone()
            }
        };

        let mut saw_bare_dir = false;
        for dir in &search {
            let (hit, bare) = locate::scan_directory(dir, name);
            saw_bare_dir |= bare;
            if hit.is_some() {
                return Ok(hit);
            }
        }

        // Initializer-less directory: only a namespace package if the host
        // runtime reports the name as loaded from a directory.
        if saw_bare_dir {
            if let Some(seed) = self.probe.package_path(qualified) {
                return Ok(Some(Located::Namespace(seed)));
            }
        }
        Ok(None)
    }

    // =========================================================================
    // Materialization
    // =========================================================================

    /// Turn a load descriptor into a node, scanning it when it has code.
    fn materialize(&mut self, qualified: &str, located: Located) -> Result<NodeIndex, ResolveError> {
        debug!("materialize {} from {:?}", qualified, located);
        match located {
            Located::Package(dir) => self.materialize_package(qualified, dir),
            Located::Source(path) => {
                // Compile before the node exists so a failed load leaves no
                // trace in the graph.
                let code = self.load_source_unit(&path)?;
                let mut node = Node::new(NodeKind::Source, qualified);
                node.filename = Some(path);
                node.code = Some(Arc::clone(&code));
                let m = self.graph.intern(node);
                self.scan_unit(&code, m)?;
                Ok(m)
            }
            Located::Cached(path) => {
                // Same for a bad format tag: validate first, intern after.
                let code = self.load_cached_unit(&path)?;
                let mut node = Node::new(NodeKind::Compiled, qualified);
                node.filename = Some(path);
                node.code = Some(Arc::clone(&code));
                let m = self.graph.intern(node);
                self.scan_unit(&code, m)?;
                Ok(m)
            }
            Located::Builtin => Ok(self.graph.intern(Node::new(NodeKind::Builtin, qualified))),
            Located::Namespace(seed) => {
                let mut node = Node::new(NodeKind::Namespace, qualified);
                node.packagepath = Some(seed);
                Ok(self.graph.intern(node))
            }
            Located::Extension(path) => {
                let mut node = Node::new(NodeKind::Extension, qualified);
                node.filename = Some(path);
                Ok(self.graph.intern(node))
            }
        }
    }

    /// Materialize a package: apply the identity substitution, assemble the
    /// search path from the override table, then load and scan the
    /// initializer into the package node itself.
    fn materialize_package(
        &mut self,
        qualified: &str,
        dir: PathBuf,
    ) -> Result<NodeIndex, ResolveError> {
        let qualified = self
            .config
            .replace_package
            .get(qualified)
            .cloned()
            .unwrap_or_else(|| qualified.to_string());

        let additions = self
            .config
            .package_paths
            .get(&qualified)
            .cloned()
            .unwrap_or_default();
        let packagepath = if additions.contains(&dir) {
            additions
        } else {
            let mut path = vec![dir.clone()];
            path.extend(additions);
            path
        };

        let mut node = Node::new(NodeKind::Package, qualified.as_str());
        node.filename = Some(dir.clone());
        node.packagepath = Some(packagepath.clone());
        let m = self.graph.intern(node);

        let (init, code) = match Self::find_package_init(&packagepath) {
            Some(Located::Source(init)) => {
                let code = self.load_source_unit(&init)?;
                (init, code)
            }
            Some(Located::Cached(init)) => {
                let code = self.load_cached_unit(&init)?;
                (init, code)
            }
            _ => return Err(ResolveError::NoModuleNamed(qualified)),
        };
        {
            let node = self.graph.node_mut(m);
            node.filename = Some(init);
            node.code = Some(Arc::clone(&code));
        }
        self.scan_unit(&code, m)?;
        Ok(m)
    }

    /// Locate a package initializer anywhere on the assembled search path.
    fn find_package_init(packagepath: &[PathBuf]) -> Option<Located> {
        packagepath.iter().find_map(|dir| locate::find_init(dir))
    }

    /// Read and compile a source unit, applying the rewrite rules.
    fn load_source_unit(&self, path: &PathBuf) -> Result<Arc<CodeObject>, ResolveError> {
        let text = fs::read_to_string(path).map_err(|error| ResolveError::Io {
            path: path.clone(),
            error,
        })?;
        Ok(self.apply_rewrite(compile_source(&text, &path.to_string_lossy())))
    }

    /// Deserialize a precompiled unit, mapping every decode failure to the
    /// fatal cache-format error.
    fn load_cached_unit(&self, path: &PathBuf) -> Result<Arc<CodeObject>, ResolveError> {
        let bytes = fs::read(path).map_err(|error| ResolveError::Io {
            path: path.clone(),
            error,
        })?;
        let code = read_cache(&mut bytes.as_slice()).map_err(|err| {
            debug!("cache rejected for {}: {}", path.display(), err);
            ResolveError::BadCacheFormat { path: path.clone() }
        })?;
        Ok(if self.config.replace_paths.is_empty() {
            code
        } else {
            Arc::new(rewrite_paths(&code, &self.config.replace_paths))
        })
    }

    /// Apply the configured location-rewrite rules to a fresh unit.
    fn apply_rewrite(&self, code: Arc<CodeObject>) -> Arc<CodeObject> {
        if self.config.replace_paths.is_empty() {
            code
        } else {
            Arc::new(rewrite_paths(&code, &self.config.replace_paths))
        }
    }

    // =========================================================================
    // Lazy Registry
    // =========================================================================

    /// Look up a node, materializing a lazily registered identity on first
    /// touch. Exclusion is terminal; aliases snapshot their target; implied
    /// dependencies force edges static analysis cannot see.
    pub fn find_node(&mut self, name: &str) -> Result<Option<NodeIndex>, ResolveError> {
        if let Some(existing) = self.graph.find(name) {
            return Ok(Some(existing));
        }
        let Some(entry) = self.lazy.remove(name) else {
            return Ok(None);
        };
        match entry {
            LazyEntry::Excluded => {
                debug!("excluding {}", name);
                Ok(Some(self.graph.intern(Node::new(NodeKind::Excluded, name))))
            }
            LazyEntry::Alias(target) => {
                debug!("aliasing {} -> {}", name, target);
                let resolved = self.resolve_or_record(&target, None, &[], -1)?;
                let target_index = resolved[0];
                let snapshot = {
                    let t = self.graph.node(target_index);
                    (
                        t.namespace.clone(),
                        t.packagepath.clone(),
                        t.globalnames.clone(),
                        t.starimports.clone(),
                    )
                };
                let mut node = Node::new(
                    NodeKind::Alias {
                        target: Arc::clone(&target),
                    },
                    name,
                );
                // Frozen copy: later growth of the target is not reflected.
                node.namespace = snapshot.0;
                node.packagepath = snapshot.1;
                node.globalnames = snapshot.2;
                node.starimports = snapshot.3;
                let m = self.graph.intern(node);
                self.graph.add_edge(m, target_index, EdgeKind::Implied);
                Ok(Some(m))
            }
            LazyEntry::Implies(deps) => {
                debug!("materializing {} with {} implied deps", name, deps.len());
                let m = self.resolve_or_record(name, None, &[], -1)?[0];
                for dep in deps {
                    let resolved = self.resolve_or_record(&dep, Some(m), &[], -1)?;
                    for d in resolved {
                        self.graph.add_edge(m, d, EdgeKind::Implied);
                    }
                }
                Ok(Some(m))
            }
        }
    }

    // =========================================================================
    // Scanning
    // =========================================================================

    /// Feed a unit's decoded events back into the engine.
    fn scan_unit(&mut self, code: &Arc<CodeObject>, m: NodeIndex) -> Result<(), ResolveError> {
        let unit = Arc::clone(code);
        for event in ScanEvents::new(&unit) {
            match event {
                ScanEvent::Store(name) => {
                    self.graph.node_mut(m).globalnames.insert(name);
                }
                ScanEvent::Import { fromlist, target } => {
                    self.scan_import(m, fromlist.as_deref(), &target, -1)?;
                }
                ScanEvent::AbsoluteImport { fromlist, target } => {
                    self.scan_import(m, fromlist.as_deref(), &target, 0)?;
                }
                ScanEvent::RelativeImport {
                    level,
                    fromlist,
                    target,
                } => {
                    let (filtered, _) = split_wildcard(fromlist.as_deref());
                    if !target.is_empty() {
                        self.resolve_or_record(&target, Some(m), &filtered, level as i32)?;
                    } else {
                        // Importing the ancestor package itself.
                        match self.determine_parent(Some(m), level as i32)? {
                            Some(parent) => {
                                let parent_name =
                                    Arc::clone(&self.graph.node(parent).identifier);
                                self.resolve_or_record(&parent_name, None, &filtered, 0)?;
                            }
                            None => {
                                debug!(
                                    "relative import with no materialized ancestor in {}",
                                    self.graph.node(m).identifier
                                );
                            }
                        }
                    }
                }
            }
        }
        Ok(())
    }

    /// Handle one plain or absolute import event.
    fn scan_import(
        &mut self,
        m: NodeIndex,
        fromlist: Option<&[Arc<str>]>,
        target: &str,
        level: i32,
    ) -> Result<(), ResolveError> {
        let (filtered, have_star) = split_wildcard(fromlist);
        self.resolve_or_record(target, Some(m), &filtered, level)?;
        if have_star {
            self.merge_wildcard(m, target)?;
        }
        Ok(())
    }

    /// The non-raising resolution wrapper used while scanning.
    ///
    /// Recoverable failures become `MissingModule` placeholders linked from
    /// the scanning unit; everything else propagates. Returns the resolved
    /// leaf followed by any from-list nodes.
    fn resolve_or_record(
        &mut self,
        name: &str,
        caller: Option<NodeIndex>,
        fromlist: &[Arc<str>],
        level: i32,
    ) -> Result<SmallVec<[NodeIndex; 4]>, ResolveError> {
        let m = match self.resolve_import(name, caller, None, level) {
            Ok(modules) => match modules.into_iter().next() {
                Some(m) => m,
                None => return Err(ResolveError::NoModuleNamed(name.to_string())),
            },
            Err(err) if err.is_recoverable() => {
                debug!("import failed, recording missing module: {}", err);
                let m = self.graph.intern(Node::new(NodeKind::Missing, name));
                if let Some(caller) = caller {
                    self.graph.add_edge(caller, m, EdgeKind::Direct);
                }
                m
            }
            Err(err) => return Err(err),
        };

        let mut produced: SmallVec<[NodeIndex; 4]> = SmallVec::new();
        produced.push(m);

        for sub in fromlist {
            // Already known under the target: reuse the namespace entry (a
            // recorded `None` means "attribute, not a submodule").
            if let Some(entry) = self.graph.node(m).namespace.get(sub).copied() {
                if let Some(sm) = entry {
                    if let Some(caller) = caller {
                        self.graph.add_edge(caller, sm, EdgeKind::Direct);
                    }
                    produced.push(sm);
                }
                continue;
            }

            let qualified = format!("{}.{}", name, sub);
            let mut sm = self.find_node(&qualified)?;
            if sm.is_none() {
                let single = [Arc::clone(sub)];
                match self.resolve_import(name, caller, Some(&single), level) {
                    Ok(_) => sm = self.find_node(&qualified)?,
                    Err(err) if err.is_recoverable() => {
                        debug!("from-list miss: {}", err);
                        sm = Some(
                            self.graph
                                .intern(Node::new(NodeKind::Missing, qualified.as_str())),
                        );
                    }
                    Err(err) => return Err(err),
                }
            }

            self.graph
                .node_mut(m)
                .namespace
                .insert(Arc::clone(sub), sm);
            if let Some(sm) = sm {
                self.graph.add_edge(sm, m, EdgeKind::Direct);
                produced.push(sm);
            }
        }
        Ok(produced)
    }

    /// Fold a wildcard-import target's exported names into the scanning
    /// unit.
    fn merge_wildcard(&mut self, m: NodeIndex, target: &str) -> Result<(), ResolveError> {
        // Inside a package the bare name may be a sibling submodule; try
        // the qualified spelling first.
        let mut found = None;
        if self.graph.node(m).is_package_like() {
            let qualified = format!("{}.{}", self.graph.node(m).identifier, target);
            found = self.find_node(&qualified)?;
        }
        if found.is_none() {
            found = self.find_node(target)?;
        }

        match found {
            Some(source) => {
                let (globals, stars, has_code) = {
                    let node = self.graph.node(source);
                    (
                        node.globalnames.clone(),
                        node.starimports.clone(),
                        node.code.is_some(),
                    )
                };
                let node = self.graph.node_mut(m);
                node.globalnames.extend(globals);
                node.starimports.extend(stars);
                if !has_code {
                    // Nothing to introspect: exports stay unresolved.
                    node.starimports.insert(Arc::from(target));
                }
            }
            None => {
                self.graph.node_mut(m).starimports.insert(Arc::from(target));
            }
        }
        Ok(())
    }
}

/// Strip the wildcard marker out of a from-list.
fn split_wildcard(fromlist: Option<&[Arc<str>]>) -> (Vec<Arc<str>>, bool) {
    let Some(fromlist) = fromlist else {
        return (Vec::new(), false);
    };
    let have_star = fromlist.iter().any(|s| &**s == "*");
    let filtered = fromlist
        .iter()
        .filter(|s| &***s != "*")
        .cloned()
        .collect();
    (filtered, have_star)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_wildcard() {
        let list = [Arc::from("a"), Arc::from("*"), Arc::from("b")];
        let (filtered, star) = split_wildcard(Some(&list));
        assert!(star);
        assert_eq!(filtered.len(), 2);

        let (filtered, star) = split_wildcard(None);
        assert!(!star);
        assert!(filtered.is_empty());
    }

    #[test]
    fn test_lazy_seeding_exclusion_wins() {
        let config = GraphConfig::with_search_path(vec![])
            .alias("foo", "bar")
            .exclude("foo");
        let mut graph = ModuleGraph::new(config);
        let found = graph.find_node("foo").unwrap();
        let node = graph.graph().node(found.unwrap());
        assert_eq!(node.kind, NodeKind::Excluded);
    }

    #[test]
    fn test_determine_parent_no_caller() {
        let mut graph = ModuleGraph::new(GraphConfig::default());
        assert!(graph.determine_parent(None, -1).unwrap().is_none());
        assert!(graph.determine_parent(None, 2).unwrap().is_none());
    }

    #[test]
    fn test_relative_depth_error_kind() {
        let mut graph = ModuleGraph::new(GraphConfig::default());
        let m = graph
            .graph
            .intern(Node::new(NodeKind::Source, "pkg.mod"));
        let err = graph.determine_parent(Some(m), 3).unwrap_err();
        assert!(matches!(err, ResolveError::RelativeImportTooDeep { .. }));
    }

    #[test]
    fn test_missing_import_direct_is_fatal() {
        let mut graph = ModuleGraph::new(GraphConfig::with_search_path(vec![]));
        let err = graph
            .resolve_import("definitely_absent", None, None, 0)
            .unwrap_err();
        assert!(matches!(err, ResolveError::NoModuleNamed(_)));
    }

    #[test]
    fn test_builtin_resolution_without_location() {
        let mut graph = ModuleGraph::new(GraphConfig::with_search_path(vec![]));
        let modules = graph.resolve_import("sys", None, None, 0).unwrap();
        assert_eq!(modules.len(), 1);
        let node = graph.graph().node(*modules.iter().next().unwrap());
        assert_eq!(node.kind, NodeKind::Builtin);
        assert!(node.filename.is_none());
        assert!(node.code.is_none());
    }
}
