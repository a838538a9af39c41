//! Graphviz rendering of the dependency graph.
//!
//! Packages become clusters containing their submodules; implied edges are
//! drawn dashed so forced dependencies stand out from observed ones.

use modgraph_graph::{DependencyGraph, EdgeKind, NodeKind};
use std::fmt::Write;

/// Render a `digraph` with record-shaped nodes and package clusters.
pub fn render_dot(graph: &DependencyGraph) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "digraph modgraph {{");
    let _ = writeln!(out, "\trankdir=\"LR\";");
    let _ = writeln!(out, "\tconcentrate=\"true\";");
    let _ = writeln!(out, "\tnode [shape=\"record\"];");

    let packages: Vec<String> = graph
        .nodes()
        .filter(|(_, n)| n.kind == NodeKind::Package)
        .map(|(_, n)| n.identifier.to_string())
        .collect();

    for pkg_name in &packages {
        let _ = writeln!(out, "\tsubgraph \"cluster_{}\" {{", escape(pkg_name));
        let _ = writeln!(out, "\t\tlabel=\"{}\";", escape(pkg_name));
        for (_, node) in graph.nodes() {
            if cluster_of(&packages, &node.identifier) == Some(pkg_name.as_str()) {
                let _ = writeln!(out, "\t\t{};", node_decl(node.kind.label(), &node.identifier));
            }
        }
        let _ = writeln!(out, "\t}}");
    }

    for (_, node) in graph.nodes() {
        if cluster_of(&packages, &node.identifier).is_none() {
            let _ = writeln!(out, "\t{};", node_decl(node.kind.label(), &node.identifier));
        }
    }

    for (source, target, kind) in graph.edges() {
        let style = match kind {
            EdgeKind::Direct => "",
            EdgeKind::Implied => " [style=\"dashed\"]",
        };
        let _ = writeln!(
            out,
            "\t\"{}\" -> \"{}\"{};",
            escape(&graph.node(source).identifier),
            escape(&graph.node(target).identifier),
            style,
        );
    }

    let _ = writeln!(out, "}}");
    out
}

/// The longest enclosing package a node belongs to, if any.
fn cluster_of<'p>(packages: &'p [String], identifier: &str) -> Option<&'p str> {
    packages
        .iter()
        .map(String::as_str)
        .filter(|pkg| {
            identifier == *pkg
                || (identifier.starts_with(pkg)
                    && identifier.as_bytes().get(pkg.len()) == Some(&b'.'))
        })
        .max_by_key(|pkg| pkg.len())
}

fn node_decl(kind: &str, identifier: &str) -> String {
    format!(
        "\"{}\" [label=\"{} | {}\"]",
        escape(identifier),
        kind,
        escape(identifier),
    )
}

fn escape(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}
