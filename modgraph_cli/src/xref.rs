//! HTML cross-reference: per-module anchors with "imports" and
//! "imported by" link lists.

use crate::report::display_name;
use modgraph_graph::{DependencyGraph, Direction, NodeIndex, NodeKind};
use std::fmt::Write;

/// Render the cross-reference page.
pub fn render_xref(graph: &DependencyGraph) -> String {
    let mut entries: Vec<(String, NodeIndex)> = graph
        .nodes()
        .map(|(i, n)| (display_name(&n.identifier), i))
        .collect();
    // Scripts first, then modules, each alphabetically.
    entries.sort_by_key(|(name, i)| {
        (
            graph.node(*i).kind != NodeKind::Script,
            name.clone(),
        )
    });

    let scripts: Vec<&str> = entries
        .iter()
        .filter(|(_, i)| graph.node(*i).kind == NodeKind::Script)
        .map(|(name, _)| name.as_str())
        .collect();
    let title = format!("modgraph cross reference for {}", scripts.join(", "));

    let mut out = String::new();
    let _ = writeln!(
        out,
        "<html><head><title>{}</title></head>",
        escape(&title)
    );
    let _ = writeln!(out, "<body><h1>{}</h1>", escape(&title));

    for (name, index) in &entries {
        let node = graph.node(*index);
        match node.kind {
            NodeKind::Builtin => {
                let _ = writeln!(
                    out,
                    "<a name=\"{0}\"></a><tt>{0}</tt> <i>(builtin module)</i> <br />",
                    escape(name),
                );
            }
            NodeKind::Extension => {
                let file = node
                    .filename
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_default();
                let _ = writeln!(
                    out,
                    "<a name=\"{0}\"></a><tt>{0}</tt> <tt>{1}</tt> <br />",
                    escape(name),
                    escape(&file),
                );
            }
            _ => {
                let file = node
                    .filename
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_default();
                let _ = writeln!(
                    out,
                    "<a name=\"{0}\"></a><a target=\"code\" href=\"{1}\" type=\"text/plain\"><tt>{0}</tt></a> <br />",
                    escape(name),
                    escape(&file),
                );
            }
        }

        write_link_list(&mut out, graph, *index, Direction::Outgoing, "imports:");
        write_link_list(&mut out, graph, *index, Direction::Incoming, "imported by:");
        let _ = writeln!(out, "<br/>");
    }

    let _ = writeln!(out, "</body></html>");
    out
}

fn write_link_list(
    out: &mut String,
    graph: &DependencyGraph,
    index: NodeIndex,
    dir: Direction,
    heading: &str,
) {
    let mut names: Vec<String> = graph
        .neighbors(index, dir)
        .into_iter()
        .map(|n| display_name(&graph.node(n).identifier))
        .collect();
    if names.is_empty() {
        return;
    }
    names.sort();
    names.dedup();
    let _ = writeln!(out, "{}", heading);
    for name in names {
        let _ = writeln!(out, "<a href=\"#{0}\">{0}</a>", escape(&name));
    }
    let _ = writeln!(out, "<br />");
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use modgraph_graph::{EdgeKind, Node};

    #[test]
    fn test_xref_links_both_directions() {
        let mut graph = DependencyGraph::new();
        let script = graph.intern(Node::new(NodeKind::Script, "/src/app.py"));
        let dep = graph.intern(Node::new(NodeKind::Source, "dep"));
        graph.add_edge(script, dep, EdgeKind::Direct);

        let html = render_xref(&graph);
        assert!(html.contains("modgraph cross reference for app.py"));
        assert!(html.contains("imports:"));
        assert!(html.contains("imported by:"));
        assert!(html.contains("<a href=\"#dep\">dep</a>"));
        assert!(html.contains("<a href=\"#app.py\">app.py</a>"));
    }

    #[test]
    fn test_builtin_rendering() {
        let mut graph = DependencyGraph::new();
        graph.intern(Node::new(NodeKind::Builtin, "sys"));
        let html = render_xref(&graph);
        assert!(html.contains("(builtin module)"));
    }
}
