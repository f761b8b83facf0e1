use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use pricefolio::core::log::init_logging;
use pricefolio::{AppCommand, HoldingsCommand};
use rust_decimal::Decimal;

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

impl From<Commands> for AppCommand {
    fn from(cmd: Commands) -> AppCommand {
        match cmd {
            Commands::Fetch => AppCommand::Fetch,
            Commands::Extract => AppCommand::Extract,
            Commands::Summarize => AppCommand::Summarize,
            Commands::Run => AppCommand::Run,
            Commands::Report => AppCommand::Report,
            Commands::Holdings { command } => AppCommand::Holdings(command.into()),
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

impl From<HoldingsCommands> for HoldingsCommand {
    fn from(cmd: HoldingsCommands) -> HoldingsCommand {
        match cmd {
            HoldingsCommands::Init => HoldingsCommand::Init,
            HoldingsCommands::Show => HoldingsCommand::Show,
            HoldingsCommands::Set { subject, quantity } => {
                HoldingsCommand::Set { subject, quantity }
            }
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Download the price page and save it to the data directory
    Fetch,
    /// Extract prices from the saved page into the price history
    Extract,
    /// Value holdings at the latest prices and append to the summary ledger
    Summarize,
    /// Fetch, extract and summarize in one go
    Run,
    /// Display the latest summary, holdings and prices
    Report,
    /// Manage asset holdings
    Holdings {
        #[command(subcommand)]
        command: HoldingsCommands,
    },
}

#[derive(Subcommand)]
enum HoldingsCommands {
    /// Create the holdings file with every configured subject at zero
    Init,
    /// Display current holdings
    Show,
    /// Set the quantity held of one subject
    Set {
        /// Subject key (e.g. usd) or its name as it appears on the page
        subject: String,
        quantity: Decimal,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => match cli.config_path.as_deref() {
            Some(path) => pricefolio::cli::setup::setup_at_path(path),
            None => pricefolio::cli::setup::setup(),
        },
        Some(cmd) => pricefolio::run_command(cmd.into(), cli.config_path.as_deref()).await,
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
