mod activity;
mod chart;
mod commands;
mod config;
mod error;
mod github;
mod observability;
mod readme;
mod stats;

use anyhow::Result;
use chrono::Utc;
use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing::debug;

use config::{ActivityConfig, ActivityOverrides, ReadmeConfig, ReadmeOverrides, process_env};

#[derive(Parser)]
#[command(
    name = "repo-pulse",
    version,
    about = "Commit-activity charts and README stats from the GitHub API"
)]
struct Cli {
    /// More log output (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a bar chart of commits per month for one repository.
    Activity(ActivityArgs),
    /// Refresh the stats section of a README from a user's repositories.
    Readme(ReadmeArgs),
}

#[derive(Args)]
struct ActivityArgs {
    /// Repository as owner/name [env: GITHUB_REPOSITORY]
    #[arg(short, long)]
    repository: Option<String>,

    /// Number of months in the window, current month included [env: MONTHS]
    #[arg(short, long)]
    months: Option<u32>,

    /// Output PNG path
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Preferred chart style, tried before the built-in list
    #[arg(long)]
    style: Option<String>,
}

#[derive(Args)]
struct ReadmeArgs {
    /// GitHub login [env: GITHUB_USER, GITHUB_REPOSITORY_OWNER]
    #[arg(short, long)]
    user: Option<String>,

    /// README to update
    #[arg(long)]
    readme: Option<PathBuf>,

    /// Print the updated document instead of writing it
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    observability::init(observability::log_filter(cli.quiet, cli.verbose));

    if let Err(error) = run(cli.command).await {
        tracing::debug!(error = ?error, "fatal error");
        eprintln!("Error: {error:#}");
        std::process::exit(1);
    }
}

async fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Activity(args) => {
            let cfg = ActivityConfig::resolve(
                ActivityOverrides {
                    repository: args.repository,
                    months: args.months,
                    output: args.output,
                    style: args.style,
                },
                process_env,
            )?;
            debug!(repository = %cfg.repository, months = cfg.months, output = %cfg.output.display(), "activity config");
            commands::activity::cmd_activity(&cfg, Utc::now()).await?;
        }
        Commands::Readme(args) => {
            let cfg = ReadmeConfig::resolve(
                ReadmeOverrides {
                    user: args.user,
                    readme: args.readme,
                    dry_run: args.dry_run,
                },
                process_env,
            )?;
            debug!(user = %cfg.user, readme = %cfg.readme.display(), dry_run = cfg.dry_run, "readme config");
            commands::readme::cmd_readme(&cfg).await?;
        }
    }
    Ok(())
}
