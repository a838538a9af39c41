//! modgraph: static module-dependency scanner.

mod args;
mod config;
mod dot;
mod report;
mod xref;

use args::OutputFormat;
use modgraph_graph::ModuleGraph;
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

/// Successful run.
const EXIT_SUCCESS: u8 = 0;
/// Resolution or I/O failure.
const EXIT_ERROR: u8 = 1;
/// Bad command line.
const EXIT_USAGE_ERROR: u8 = 2;

fn main() -> ExitCode {
    let parsed = match args::parse_args(std::env::args().skip(1)) {
        Ok(parsed) => parsed,
        Err(err) => {
            eprintln!("modgraph: {}", err);
            eprint!("{}", args::USAGE);
            return ExitCode::from(EXIT_USAGE_ERROR);
        }
    };

    if parsed.print_help {
        print!("{}", args::USAGE);
        return ExitCode::from(EXIT_SUCCESS);
    }
    if parsed.print_version {
        println!("modgraph {}", modgraph_core::VERSION);
        return ExitCode::from(EXIT_SUCCESS);
    }

    env_logger::Builder::new()
        .filter_level(config::log_level(&parsed))
        .init();

    let mut graph = ModuleGraph::new(config::build_graph_config(&parsed));

    for operand in &parsed.operands {
        let outcome = if parsed.modules {
            resolve_module(&mut graph, operand)
        } else {
            graph.run_script(Path::new(operand)).map(|_| ())
        };
        if let Err(err) = outcome {
            eprintln!("modgraph: error: {}", err);
            return ExitCode::from(EXIT_ERROR);
        }
    }

    let rendered = match parsed.output {
        OutputFormat::Report => report::render_report(graph.graph()),
        OutputFormat::Dot => dot::render_dot(graph.graph()),
        OutputFormat::Xref => xref::render_xref(graph.graph()),
    };
    print!("{}", rendered);
    ExitCode::from(EXIT_SUCCESS)
}

/// Resolve one `-m` operand; `name.*` pulls in every submodule.
fn resolve_module(
    graph: &mut ModuleGraph,
    operand: &str,
) -> Result<(), modgraph_graph::ResolveError> {
    if let Some(base) = operand.strip_suffix(".*") {
        let star: [Arc<str>; 1] = [Arc::from("*")];
        graph.resolve_import(base, None, Some(&star), 0)?;
    } else {
        graph.resolve_import(operand, None, None, 0)?;
    }
    Ok(())
}
