use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use symhound_cli::commands;
use symhound_core::db::IndexConfig;
use symhound_core::services::{SortDirection, SubmatchOrder};

/// Duplicate-function index for decompilation corpora.
///
/// The binary only parses arguments and builds the index configuration;
/// everything else happens in the command helpers and `symhound-core`.
#[derive(Parser, Debug)]
#[command(
    name = "symhound",
    version,
    about = "Find duplicate and partially shared functions across disassembled binaries",
    long_about = None
)]
struct Cli {
    /// Path to the index database. Defaults to SYMHOUND_DB or ./symhound.db.
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Directory object blobs are stored under. Defaults to SYMHOUND_BLOBS
    /// or ./blobs.
    #[arg(long, global = true)]
    blobs: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Initialize the index database and blob storage.
    Init,

    /// Ingest a project descriptor (YAML) listing objects, versions, and
    /// platforms.
    AddProject {
        /// Path to the project descriptor.
        #[arg(long)]
        descriptor: String,
    },

    /// List all projects in the index.
    Projects {
        /// Emit JSON instead of human-readable text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Delete a project and everything it owns.
    DeleteProject {
        /// Name of the project to delete.
        name: String,
    },

    /// Search symbols by name substring.
    Search {
        /// Name fragment to search for.
        fragment: String,

        /// Emit JSON instead of human-readable text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Show metadata for a symbol.
    Show {
        /// Symbol slug.
        slug: String,

        /// Emit JSON instead of human-readable text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Print a symbol's disassembly from the stored object blob.
    Asm {
        /// Symbol slug.
        slug: String,

        /// Emit JSON instead of human-readable text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Find whole-symbol matches at the three fingerprint fidelities.
    Match {
        /// Symbol slug.
        slug: String,

        /// Emit JSON instead of human-readable text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Find maximal shared instruction runs against every other symbol.
    Submatch {
        /// Symbol slug.
        slug: String,

        /// Minimum match length in instructions. Values below the window
        /// width are clamped up to it.
        #[arg(long, default_value_t = 8)]
        min_len: i64,

        /// First instruction index to search from.
        #[arg(long)]
        start: Option<i64>,

        /// Last instruction index to search to (inclusive).
        #[arg(long)]
        end: Option<i64>,

        /// Result page number.
        #[arg(long, default_value_t = 0)]
        page: i64,

        /// Result page size.
        #[arg(long, default_value_t = 50)]
        page_size: i64,

        /// Sort key for the result set.
        #[arg(long, value_enum, default_value = "length")]
        sort_by: SortByArg,

        /// Sort direction.
        #[arg(long, value_enum, default_value = "desc")]
        sort_dir: SortDirArg,

        /// Emit JSON instead of human-readable text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Show metadata for a source.
    Source {
        /// Source slug.
        slug: String,

        /// Emit JSON instead of human-readable text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Group a source's symbols into exact-duplicate clusters.
    Cluster {
        /// Source slug.
        #[arg(long)]
        source: String,

        /// Minimum cluster size to report.
        #[arg(long, default_value_t = 2)]
        min_size: usize,

        /// Cluster across the whole owning project instead of one source.
        #[arg(long, default_value_t = false)]
        project_wide: bool,

        /// Emit JSON instead of human-readable text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Show row counts for the whole index.
    Status {
        /// Emit JSON instead of human-readable text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SortByArg {
    Length,
    QueryStart,
}

impl From<SortByArg> for SubmatchOrder {
    fn from(value: SortByArg) -> Self {
        match value {
            SortByArg::Length => SubmatchOrder::Length,
            SortByArg::QueryStart => SubmatchOrder::QueryStart,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SortDirArg {
    Asc,
    Desc,
}

impl From<SortDirArg> for SortDirection {
    fn from(value: SortDirArg) -> Self {
        match value {
            SortDirArg::Asc => SortDirection::Asc,
            SortDirArg::Desc => SortDirection::Desc,
        }
    }
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let code = match run(cli) {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("error: {err:#}");
            symhound_cli::exit_code_for(&err)
        }
    };
    std::process::exit(code);
}

fn run(cli: Cli) -> Result<()> {
    let mut config = IndexConfig::from_env();
    if let Some(db) = cli.db {
        config.db_path = db;
    }
    if let Some(blobs) = cli.blobs {
        config.blob_root = blobs;
    }

    match cli.command {
        Command::Init => commands::init_command(config),
        Command::AddProject { descriptor } => commands::add_project_command(config, &descriptor),
        Command::Projects { json } => commands::projects_command(config, json),
        Command::DeleteProject { name } => commands::delete_project_command(config, &name),
        Command::Search { fragment, json } => commands::search_command(config, &fragment, json),
        Command::Show { slug, json } => commands::show_command(config, &slug, json),
        Command::Asm { slug, json } => commands::asm_command(config, &slug, json),
        Command::Match { slug, json } => commands::match_command(config, &slug, json),
        Command::Submatch {
            slug,
            min_len,
            start,
            end,
            page,
            page_size,
            sort_by,
            sort_dir,
            json,
        } => commands::submatch_command(
            config,
            &slug,
            min_len,
            start,
            end,
            page,
            page_size,
            sort_by.into(),
            sort_dir.into(),
            json,
        ),
        Command::Source { slug, json } => commands::source_command(config, &slug, json),
        Command::Cluster { source, min_size, project_wide, json } => {
            commands::cluster_command(config, &source, min_size, project_wide, json)
        }
        Command::Status { json } => commands::status_command(config, json),
    }
}
