mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use cmd::config::ConfigSubcommand;
use kb_core::KbError;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "kb",
    about = "Browse, search and render a markdown knowledge base of notes and prompt templates",
    version,
    propagate_version = true
)]
struct Cli {
    /// Knowledge-base root (default: auto-detect from .kb/, else the current directory)
    #[arg(long, global = true, env = "KB_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scaffold the standard category folders and .kb/config.yaml
    Init,

    /// List document titles and paths, grouped by category
    List {
        /// Only show this category
        #[arg(long)]
        category: Option<String>,
    },

    /// Print a document with its placeholders filled in
    Render {
        /// Document path relative to the root, e.g. Prompts/review.md
        path: String,
        /// Placeholder value, repeatable: --set NAME=Ann --set PLACE=Rome
        #[arg(long = "set", value_name = "KEY=VALUE")]
        set: Vec<String>,
        /// Fail if any placeholder is left without a value
        #[arg(long)]
        strict: bool,
        /// Write the result to a file instead of stdout
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// List the placeholders a document uses
    Placeholders {
        /// Document path relative to the root
        path: String,
    },

    /// Show a document's title, category, front matter and placeholders
    Show {
        /// Document path relative to the root
        path: String,
    },

    /// Print a markdown table of contents for the whole knowledge base
    Toc {
        /// Write it to INDEX.md at the root instead of printing
        #[arg(long)]
        write: bool,
    },

    /// Full-text search across titles and document bodies
    ///
    /// Supports AND/OR/NOT, field scoping (category:Prompts, title:review),
    /// phrase queries ("exact phrase"), and prefix wildcards (refact*).
    /// Multiple bare words are ANDed by default.
    Search {
        /// Query string
        query: String,
        /// Maximum number of results
        #[arg(
            short,
            long,
            default_value_t = 10,
            value_parser = clap::value_parser!(u64).range(1..)
        )]
        limit: u64,
        /// Only search this category
        #[arg(long)]
        category: Option<String>,
    },

    /// Inspect and validate .kb/config.yaml
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
}

/// Process exit code for a failed command, keyed on the underlying error.
fn exit_code(err: &anyhow::Error) -> i32 {
    let kb_err = err
        .chain()
        .find_map(|e| e.downcast_ref::<KbError>());
    match kb_err {
        Some(KbError::RootNotFound(_)) => 2,
        Some(KbError::InvalidTemplate { .. }) => 3,
        Some(KbError::UnknownPlaceholders(_)) => 4,
        Some(KbError::Read { .. }) => 5,
        _ => 1,
    }
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let root = root::resolve_root(cli.root.as_deref());
    tracing::debug!(root = %root.display(), "resolved knowledge-base root");

    let result = match cli.command {
        Commands::Init => cmd::init::run(&root, cli.json),
        Commands::List { category } => cmd::list::run(&root, category.as_deref(), cli.json),
        Commands::Render {
            path,
            set,
            strict,
            output,
        } => cmd::render::run(&root, &path, &set, strict, output.as_deref(), cli.json),
        Commands::Placeholders { path } => cmd::placeholders::run(&root, &path, cli.json),
        Commands::Show { path } => cmd::show::run(&root, &path, cli.json),
        Commands::Toc { write } => cmd::toc::run(&root, write, cli.json),
        Commands::Search {
            query,
            limit,
            category,
        } => cmd::search::run(
            &root,
            &query,
            usize::try_from(limit).unwrap_or(usize::MAX),
            category.as_deref(),
            cli.json,
        ),
        Commands::Config { subcommand } => cmd::config::run(&root, subcommand, cli.json),
    };

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(exit_code(&e));
    }
}
