use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use wptree::filter::Interval;

mod commands;

#[derive(Parser)]
#[command(name = "wpt")]
#[command(about = "wptree - Work packages as a filterable, color-coded activity tree")]
#[command(version)]
struct Cli {
    /// Path to the project directory (default: .wptree in current dir)
    #[arg(long, global = true)]
    dir: Option<PathBuf>,

    /// Output as JSON for machine consumption
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Where to load from and which rows to keep
#[derive(Args, Debug, Clone, Default)]
pub struct TableArgs {
    /// API URL or local JSON dump (repeatable; default: sources from config)
    #[arg(long = "source", short = 's')]
    sources: Vec<String>,

    /// Finish-date range, e.g. 2024-01-01..2024-12-31 (either side may be empty)
    #[arg(long, conflicts_with = "this_year")]
    end: Option<Interval>,

    /// Restrict finish dates to the current calendar year
    #[arg(long)]
    this_year: bool,

    /// Progress range in percent, e.g. 50.. or 10..90
    #[arg(long)]
    progress: Option<Interval>,

    /// Match the finish-date range on each row only, ignoring descendants
    #[arg(long)]
    shallow: bool,

    /// Also show rows whose status is excluded by config (e.g. Retired)
    #[arg(long)]
    all_statuses: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a project directory with a default config
    Init {
        /// Source URL or file to store in the new config (repeatable)
        #[arg(long = "source", short = 's')]
        sources: Vec<String>,
    },

    /// Show root activities as a tree, grouped by area
    Show {
        #[command(flatten)]
        table: TableArgs,

        /// Disable row highlighting
        #[arg(long)]
        no_color: bool,
    },

    /// Export the visible rows, including row colors, as JSON lines
    Export {
        /// Output file
        #[arg(long, short)]
        output: PathBuf,

        #[command(flatten)]
        table: TableArgs,
    },

    /// Show the effective configuration
    Config,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let project_dir = cli.dir.unwrap_or_else(|| PathBuf::from(".wptree"));

    match cli.command {
        Commands::Init { sources } => commands::init::run(&project_dir, &sources),
        Commands::Show { table, no_color } => {
            commands::show::run(&project_dir, &table.into(), cli.json, !no_color)
        }
        Commands::Export { output, table } => {
            commands::export::run(&project_dir, &table.into(), &output, cli.json)
        }
        Commands::Config => commands::config_cmd::run(&project_dir, cli.json),
    }
}

impl From<TableArgs> for commands::TableOptions {
    fn from(args: TableArgs) -> Self {
        commands::TableOptions {
            sources: args.sources,
            end: args.end,
            this_year: args.this_year,
            progress: args.progress,
            shallow: args.shallow,
            all_statuses: args.all_statuses,
        }
    }
}
