use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use fxchat::cli::rates::RatesArgs;
use fxchat::core::log::init_logging;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

impl From<Commands> for fxchat::AppCommand {
    fn from(cmd: Commands) -> fxchat::AppCommand {
        match cmd {
            Commands::Serve { host, port } => fxchat::AppCommand::Serve { host, port },
            Commands::Rates {
                days,
                currencies,
                json,
            } => fxchat::AppCommand::Rates(RatesArgs {
                days,
                currencies,
                json,
            }),
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Run the exchange chat server
    Serve {
        /// Host to listen on (overrides configuration)
        #[arg(long)]
        host: Option<String>,
        /// Port to listen on (overrides configuration)
        #[arg(long)]
        port: Option<u16>,
    },
    /// Print sale/purchase rates for the last DAYS days
    Rates {
        /// Number of days, 1 to 10
        #[arg(allow_hyphen_values = true)]
        days: Option<String>,
        /// Currency codes, e.g. USD EUR
        currencies: Vec<String>,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => fxchat::cli::setup::setup(),
        Some(cmd) => fxchat::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
