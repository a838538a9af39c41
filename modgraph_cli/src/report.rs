//! Plain-text report: one line per discovered module.

use modgraph_graph::DependencyGraph;
use std::fmt::Write;

/// Render the kind / name / file table, sorted by display name.
pub fn render_report(graph: &DependencyGraph) -> String {
    let mut rows: Vec<(String, &'static str, String)> = graph
        .nodes()
        .map(|(_, node)| {
            (
                display_name(&node.identifier),
                node.kind.label(),
                node.filename
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_default(),
            )
        })
        .collect();
    rows.sort();

    let mut out = String::new();
    let _ = writeln!(out, "{:<15} {:<25} {}", "Kind", "Name", "File");
    let _ = writeln!(out, "{:<15} {:<25} {}", "----", "----", "----");
    for (name, kind, file) in rows {
        let _ = writeln!(out, "{:<15} {:<25} {}", kind, name, file);
    }
    out
}

/// Scripts display as their file basename; modules as their dotted name.
pub fn display_name(identifier: &str) -> String {
    identifier
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(identifier)
        .to_string()
}
