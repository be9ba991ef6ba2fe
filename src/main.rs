//! Memsnap CLI
//!
//! Inspects allocation profiler captures: per-class tables, snapshot
//! comparisons and allocation call trees.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use env_logger::Env;
use std::path::PathBuf;

use memsnap::cct::SortKey;
use memsnap::commands::{
    display_schema, display_version, execute_diff, execute_replay, execute_show, execute_tree,
    validate_capture_file, validate_diff_args, validate_replay_args, validate_show_args,
    validate_tree_args, DiffArgs, ReplayArgs, ShowArgs, TreeArgs,
};
use memsnap::config::{load_view_config, ViewConfig};
use memsnap::snapshot::Metric;

/// Memsnap - allocation snapshot tables, diffs and call trees
#[derive(Parser, Debug)]
#[command(name = "memsnap")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// View settings TOML file
    #[arg(long, global = true, env = "MEMSNAP_CONFIG")]
    config: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the per-class table of a capture
    Show {
        /// Capture JSON file
        capture: PathBuf,

        /// Sort metric (e.g. live_bytes, allocated_objects)
        #[arg(short, long)]
        sort: Option<Metric>,

        /// Sort smallest first
        #[arg(long)]
        asc: bool,

        /// Number of rows to print
        #[arg(short, long)]
        top: Option<usize>,

        /// Class filter (java.util.HashMap, java.util.*, java.util.**)
        #[arg(short, long = "filter")]
        filters: Vec<String>,

        /// Mark a class as selected
        #[arg(long = "select")]
        select: Vec<String>,

        /// Output path for a JSON table report
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Compare two captures of the same mode
    Diff {
        /// Baseline capture
        older: PathBuf,

        /// Capture compared against the baseline
        newer: PathBuf,

        /// Metric to rank changes by
        #[arg(short, long)]
        sort: Option<Metric>,

        /// Number of rows to print
        #[arg(short, long)]
        top: Option<usize>,

        /// Class filter
        #[arg(short, long = "filter")]
        filters: Vec<String>,

        /// Output path for a JSON diff report
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the allocation call tree of a class
    Tree {
        /// Capture JSON file
        capture: PathBuf,

        /// Class whose allocations are shown
        #[arg(short, long = "class")]
        class_name: String,

        /// Start at the allocation site and walk up the callers
        #[arg(short, long)]
        reverse: bool,

        /// Levels to expand below the class
        #[arg(short, long, default_value = "3")]
        depth: usize,

        /// Sort key (name, allocated_bytes, allocated_objects, live_bytes, ...)
        #[arg(short, long)]
        sort: Option<SortKey>,

        /// Sort smallest first
        #[arg(long)]
        asc: bool,

        /// Omit call paths whose objects are all dead
        #[arg(long)]
        hide_dead: bool,

        /// Output path for a JSON tree report
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Replay a series of captures as a live session would receive them
    Replay {
        /// Capture files in capture order
        #[arg(required = true, num_args = 2..)]
        captures: Vec<PathBuf>,

        /// Compare every capture with the first instead of its predecessor
        #[arg(long)]
        against_first: bool,

        /// Class filter
        #[arg(short, long = "filter")]
        filters: Vec<String>,
    },

    /// Validate a capture JSON file
    Validate {
        /// Path to capture JSON file
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Display schema information
    Schema {
        /// Show full schema details
        #[arg(long)]
        show: bool,
    },

    /// Display version information
    Version,
}

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    let config = match &cli.config {
        Some(path) => load_view_config(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => ViewConfig::default(),
    };

    // Execute command
    match cli.command {
        Commands::Show {
            capture,
            sort,
            asc,
            top,
            filters,
            select,
            output,
        } => {
            let mut args = ShowArgs::from_config(capture, &config);
            args.sort = sort.or(args.sort);
            args.ascending |= asc;
            args.top = top.unwrap_or(args.top);
            args.filters.extend(filters);
            args.select = select;
            args.output = output;

            validate_show_args(&args)?;
            execute_show(args)?;
        }

        Commands::Diff {
            older,
            newer,
            sort,
            top,
            filters,
            output,
        } => {
            let mut args = DiffArgs::from_config(older, newer, &config);
            args.sort = sort.or(args.sort);
            args.top = top.unwrap_or(args.top);
            args.filters.extend(filters);
            args.output = output;

            validate_diff_args(&args)?;
            execute_diff(args)?;
        }

        Commands::Tree {
            capture,
            class_name,
            reverse,
            depth,
            sort,
            asc,
            hide_dead,
            output,
        } => {
            let mut args = TreeArgs::from_config(capture, class_name, &config);
            args.reverse = reverse;
            args.depth = depth;
            args.sort = sort.unwrap_or(args.sort);
            args.ascending = asc;
            args.hide_dead_paths |= hide_dead;
            args.output = output;

            validate_tree_args(&args)?;
            execute_tree(args)?;
        }

        Commands::Replay {
            captures,
            against_first,
            filters,
        } => {
            let mut args = ReplayArgs {
                captures,
                against_first,
                filters: config.filters.clone(),
            };
            args.filters.extend(filters);

            validate_replay_args(&args)?;
            execute_replay(args)?;
        }

        Commands::Validate { file } => {
            validate_capture_file(file)?;
        }

        Commands::Schema { show } => {
            display_schema(show);
        }

        Commands::Version => {
            display_version();
        }
    }

    Ok(())
}
