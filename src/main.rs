use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use rdmst::config::Config;
use rdmst::solver::Strategy;

mod commands;

#[derive(Parser)]
#[command(name = "rdmst")]
#[command(about = "Minimum spanning arborescence over weighted sample graphs", long_about = None)]
#[command(version)]
struct Cli {
    /// TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute the minimum-weight arborescence rooted at a node
    Solve {
        /// JSON graph file
        #[arg(long)]
        graph: PathBuf,

        /// Root node label
        #[arg(long)]
        root: String,

        /// Contraction strategy: recursive or iterative
        #[arg(long)]
        strategy: Option<Strategy>,

        /// Abort after this many seconds
        #[arg(long)]
        time_limit: Option<u64>,

        /// Also write the tree to this file as JSON
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check that the root reaches every node
    Check {
        /// JSON graph file
        #[arg(long)]
        graph: PathBuf,

        /// Root node label
        #[arg(long)]
        root: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn init_logging(verbose: u8, configured: Option<&str>) {
    let default = match verbose {
        0 => configured.unwrap_or("warn"),
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default)).init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load_or_default(cli.config.as_deref())?;
    init_logging(cli.verbose, config.log_level.as_deref());

    match cli.command {
        Commands::Solve {
            graph,
            root,
            strategy,
            time_limit,
            output,
            json,
        } => {
            let mut options = config.solve_options();
            if let Some(strategy) = strategy {
                options.strategy = strategy;
            }
            if let Some(secs) = time_limit {
                options.time_limit = Some(std::time::Duration::from_secs(secs));
            }
            commands::solve::run(&graph, &root, &options, output.as_deref(), json)
        }
        Commands::Check { graph, root, json } => commands::check::run(&graph, &root, json),
    }
}
