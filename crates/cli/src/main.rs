use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod session;
mod ui;

use session::LabSession;

#[derive(Parser)]
#[command(name = "vulnlab")]
#[command(about = "Locate and run isolated vulnerability-reproduction labs", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Search the catalog and show ranked matches
    Search {
        /// CVE id, path, application name, or free text
        keyword: String,
    },
    /// List catalog environments
    List {
        /// Only environments of this application
        #[arg(long)]
        app: Option<String>,
        /// Only environments carrying this tag
        #[arg(long)]
        tag: Option<String>,
        /// Only environments present on disk
        #[arg(long)]
        downloaded: bool,
    },
    /// Show details for one environment
    Info { keyword: String },
    /// Start an environment
    Start {
        keyword: String,
        /// Skip prompts; an ambiguous keyword becomes an error
        #[arg(short, long)]
        yes: bool,
        /// Pull images before starting
        #[arg(long)]
        pull: bool,
        /// Build images before starting
        #[arg(long)]
        build: bool,
        /// Force recreate containers
        #[arg(long)]
        force_recreate: bool,
    },
    /// Stop an environment's containers
    Stop {
        keyword: String,
        /// Shutdown timeout in seconds
        #[arg(short = 't', long)]
        timeout: Option<u32>,
    },
    /// Restart an environment's containers
    Restart {
        keyword: String,
        #[arg(short = 't', long)]
        timeout: Option<u32>,
    },
    /// Stop an environment and remove its containers and networks
    Down {
        keyword: String,
        /// Also remove named volumes
        #[arg(long)]
        volumes: bool,
    },
    /// Show container status for one or all environments
    Status { keyword: Option<String> },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let session = LabSession::discover()?;

    match cli.command {
        Commands::Search { keyword } => commands::search::run(&session, &keyword),
        Commands::List {
            app,
            tag,
            downloaded,
        } => commands::list::run(&session, app.as_deref(), tag.as_deref(), downloaded),
        Commands::Info { keyword } => commands::info::run(&session, &keyword),
        Commands::Start {
            keyword,
            yes,
            pull,
            build,
            force_recreate,
        } => {
            commands::start::run(
                &session,
                &keyword,
                yes,
                vulnlab_compose::UpOptions {
                    pull,
                    build,
                    force_recreate,
                },
            )
            .await
        }
        Commands::Stop { keyword, timeout } => commands::stop::run(&session, &keyword, timeout).await,
        Commands::Restart { keyword, timeout } => {
            commands::restart::run(&session, &keyword, timeout).await
        }
        Commands::Down { keyword, volumes } => {
            commands::down::run(&session, &keyword, volumes).await
        }
        Commands::Status { keyword } => commands::status::run(&session, keyword.as_deref()).await,
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}
