use std::{path::PathBuf, process::ExitCode};

use clap::{ArgAction, Parser, Subcommand};
use cine_server::{Config, config::generate_default_config};
use tracing::{error, info};

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file to use instead of the default locations.
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Increase log verbosity. Ignored when `RUST_LOG` is set.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Silence all logging.
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Start the API server.
    Serve {
        /// Port to listen on, overriding the configuration file.
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Write a default configuration file.
    Init {
        #[arg(default_value = "./cine.toml")]
        path: PathBuf,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    configure_logging(cli.verbose, cli.quiet);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            error!(%error, "Exiting.");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> cine_server::Result<()> {
    match cli.command {
        Commands::Serve { port } => {
            let mut config = Config::load(cli.config.as_deref())?;
            if let Some(port) = port {
                config.server.port = port;
            }

            cine_server::serve(config).await
        }
        Commands::Init { path } => {
            generate_default_config(&path)?;
            info!(path = %path.display(), "Wrote default configuration.");
            Ok(())
        }
    }
}

fn configure_logging(verbose: u8, quiet: bool) {
    use tracing::level_filters::LevelFilter;
    use tracing_subscriber::{EnvFilter, fmt};

    let level = match (quiet, verbose) {
        (true, _) => LevelFilter::OFF,
        (false, 0) => LevelFilter::INFO,
        (false, 1) => LevelFilter::DEBUG,
        (false, _) => LevelFilter::TRACE,
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let mut directives = vec![level.min(LevelFilter::WARN).to_string()];
        for krate in ["pager", "server", "store", "tmdb"] {
            directives.push(format!("cine_{krate}={level}"));
        }

        EnvFilter::new(directives.join(","))
    });

    tracing_subscriber::fmt()
        .event_format(fmt::format().compact())
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();
}
