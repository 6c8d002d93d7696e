use anyhow::Result;
use clap::{Parser, Subcommand};
use symgraph::commands::{
    classify_command, ingest_command, init_project_command, list_functions_command,
    list_runs_command, list_types_command, normalize_command, project_info_command,
};
use symgraph::init_tracing;

/// Symbol metadata normalizer and relation graph builder.
///
/// This CLI is a thin wrapper around `symgraph-core` (exposed in code as
/// `symgraph_core`). Logging goes to stderr and is controlled by `SYMGRAPH_LOG`.
#[derive(Parser, Debug)]
#[command(
    name = "symgraph",
    version,
    about = "Normalize exported symbol metadata into a type/function relation graph",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Initialize a new symgraph project at the given root.
    ///
    /// This will:
    /// - Create a `.symgraph` metadata directory with `project.json` and `project.db`.
    /// - Create `inputs` and `reports` directories.
    InitProject {
        /// Project root directory. Defaults to the current working directory.
        #[arg(long, default_value = ".")]
        root: String,

        /// Optional project name. If omitted, the name is derived from the root directory.
        #[arg(long)]
        name: Option<String>,

        /// Decoder used by `ingest` when `--decoder` is not given.
        #[arg(long)]
        default_decoder: Option<String>,
    },

    /// Show basic information about an existing project.
    ProjectInfo {
        /// Project root directory. Defaults to the current working directory.
        #[arg(long, default_value = ".")]
        root: String,

        /// Emit JSON instead of human-readable text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Normalize, classify and link a batch of raw symbols, then store it as a new run.
    ///
    /// The batch is a YAML or JSON document with `functions` and `types` lists.
    /// A report is written to `reports/<file>.ingest.json`.
    Ingest {
        /// Project root directory. Defaults to the current working directory.
        #[arg(long, default_value = ".")]
        root: String,

        /// Batch file (relative paths are resolved against the project root).
        #[arg(long)]
        file: String,

        /// Decoder for the encoded type/field blobs (defaults to the project setting, then `json`).
        #[arg(long)]
        decoder: Option<String>,

        /// Emit the report as JSON.
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// List functions stored by an ingest run.
    ListFunctions {
        /// Project root directory. Defaults to the current working directory.
        #[arg(long, default_value = ".")]
        root: String,

        /// Ingest run id. Defaults to the latest run.
        #[arg(long)]
        run: Option<i64>,

        /// Emit JSON instead of human-readable text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// List local types stored by an ingest run.
    ListTypes {
        /// Project root directory. Defaults to the current working directory.
        #[arg(long, default_value = ".")]
        root: String,

        /// Ingest run id. Defaults to the latest run.
        #[arg(long)]
        run: Option<i64>,

        /// Emit JSON instead of human-readable text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// List ingest runs recorded in the project database.
    ListRuns {
        /// Project root directory. Defaults to the current working directory.
        #[arg(long, default_value = ".")]
        root: String,

        /// Emit JSON instead of human-readable text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Split decorated names into leaf name and owner scope.
    Normalize {
        /// Raw names, e.g. `NS::Outer::method<int>(int,float)`.
        #[arg(required = true)]
        names: Vec<String>,

        /// Emit JSON instead of human-readable text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Print the category (struct/union/enum/typedef/class) of a type declaration.
    Classify {
        /// Declaration text, e.g. `const struct _mon_block_fld`.
        declaration: String,
    },
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Command::InitProject { root, name, default_decoder } => {
            init_project_command(&root, name, default_decoder)?
        }
        Command::ProjectInfo { root, json } => project_info_command(&root, json)?,
        Command::Ingest { root, file, decoder, json } => {
            ingest_command(&root, &file, decoder, json)?
        }
        Command::ListFunctions { root, run, json } => list_functions_command(&root, run, json)?,
        Command::ListTypes { root, run, json } => list_types_command(&root, run, json)?,
        Command::ListRuns { root, json } => list_runs_command(&root, json)?,
        Command::Normalize { names, json } => normalize_command(&names, json)?,
        Command::Classify { declaration } => classify_command(&declaration)?,
    }

    Ok(())
}
