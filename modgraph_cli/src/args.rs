//! Command-line argument parser.
//!
//! Hand-rolled, left-to-right. Options come first; the first non-option
//! operand and everything after it are analysis targets (script paths, or
//! module names under `-m`).

// =============================================================================
// Output Format
// =============================================================================

/// Which rendering of the finished graph goes to stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Aligned table of kind / name / file.
    #[default]
    Report,
    /// Graphviz digraph.
    Dot,
    /// HTML cross-reference.
    Xref,
}

// =============================================================================
// Parsed Arguments
// =============================================================================

/// Complete set of parsed CLI arguments.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ModgraphArgs {
    /// Analysis targets: script paths, or module names under `-m`.
    pub operands: Vec<String>,

    /// `-m`: operands are module names (a trailing `.*` imports everything
    /// under the package).
    pub modules: bool,

    /// `-x NAME`: excluded module names, repeatable.
    pub excludes: Vec<String>,

    /// `-p PATH`: extra search directories (path-separator lists),
    /// prepended in order.
    pub paths: Vec<String>,

    /// `-g`: emit a Graphviz graph instead of the report table.
    /// `-r`: emit the HTML cross-reference.
    pub output: OutputFormat,

    /// `-d`: debug tracing, repeatable for more detail.
    pub debug: u32,

    /// `-q`: only errors on stderr.
    pub quiet: bool,

    /// `-E`: ignore `MODGRAPH_PATH` from the environment.
    pub ignore_environment: bool,

    /// `-V` / `--version`.
    pub print_version: bool,

    /// `-h` / `--help`.
    pub print_help: bool,
}

// =============================================================================
// Parse Error
// =============================================================================

/// Error during argument parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgError {
    /// Missing required argument value (e.g., `-x` without a name).
    MissingValue(&'static str),
    /// Unknown flag.
    UnknownFlag(String),
    /// No analysis targets given.
    NoTargets,
}

impl std::fmt::Display for ArgError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ArgError::MissingValue(flag) => {
                write!(f, "argument expected for the {} option", flag)
            }
            ArgError::UnknownFlag(flag) => write!(f, "unknown option: {}", flag),
            ArgError::NoTargets => write!(f, "no script or module to analyze"),
        }
    }
}

impl std::error::Error for ArgError {}

// =============================================================================
// Parser Entry Point
// =============================================================================

/// Parse command-line arguments (without the program name).
pub fn parse_args<I>(args: I) -> Result<ModgraphArgs, ArgError>
where
    I: IntoIterator<Item = String>,
{
    let mut parsed = ModgraphArgs::default();
    let mut iter = args.into_iter();

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "-m" => parsed.modules = true,
            "-g" => parsed.output = OutputFormat::Dot,
            "-r" => parsed.output = OutputFormat::Xref,
            "-d" => parsed.debug += 1,
            "-q" => parsed.quiet = true,
            "-E" => parsed.ignore_environment = true,
            "-V" | "--version" => parsed.print_version = true,
            "-h" | "--help" => parsed.print_help = true,
            "-x" => {
                let value = iter.next().ok_or(ArgError::MissingValue("-x"))?;
                parsed.excludes.push(value);
            }
            "-p" => {
                let value = iter.next().ok_or(ArgError::MissingValue("-p"))?;
                parsed.paths.push(value);
            }
            "--" => {
                parsed.operands.extend(iter);
                break;
            }
            flag if flag.starts_with('-') && flag.len() > 1 => {
                return Err(ArgError::UnknownFlag(flag.to_string()));
            }
            operand => {
                parsed.operands.push(operand.to_string());
                parsed.operands.extend(iter);
                break;
            }
        }
    }

    if parsed.operands.is_empty() && !parsed.print_help && !parsed.print_version {
        return Err(ArgError::NoTargets);
    }
    Ok(parsed)
}

/// Usage text for `-h`.
pub const USAGE: &str = "\
usage: modgraph [options] script [script ...]
       modgraph [options] -m module [module ...]

options:
  -m            treat operands as module names; `name.*` pulls in every
                submodule of the package
  -x NAME       exclude NAME from the graph (repeatable)
  -p PATH       prepend PATH (a path-separator list) to the search path
  -g            write a Graphviz graph to stdout
  -r            write an HTML cross-reference to stdout
  -d            enable debug tracing (repeat for more detail)
  -q            quiet: errors only
  -E            ignore the MODGRAPH_PATH environment variable
  -V, --version print version and exit
  -h, --help    print this help and exit
";

// =============================================================================
// Tests
// =============================================================================
