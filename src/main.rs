use anyhow::Result;
use brational::core::log::init_logging;
use clap::{CommandFactory, Parser, Subcommand};

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

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Display income, expenses and balance for a month
    Summary {
        /// Month as YYYY-MM, defaults to the current month
        #[arg(short, long)]
        month: Option<String>,
    },
    /// Display cached exchange rates for the base currency
    Rates,
    /// Convert an amount between currencies
    Convert {
        amount: f64,
        from: String,
        /// Target currency, defaults to the base currency
        #[arg(short, long)]
        to: Option<String>,
    },
    /// Change the base currency
    Base { code: String },
}

impl From<Commands> for brational::AppCommand {
    fn from(cmd: Commands) -> brational::AppCommand {
        match cmd {
            Commands::Summary { month } => brational::AppCommand::Summary { month },
            Commands::Rates => brational::AppCommand::Rates,
            Commands::Convert { amount, from, to } => {
                brational::AppCommand::Convert { amount, from, to }
            }
            Commands::Base { code } => brational::AppCommand::Base { code },
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => match cli.config_path.as_deref() {
            Some(path) => brational::cli::setup::setup_at_path(path),
            None => brational::cli::setup::setup(),
        },
        Some(cmd) => brational::run_command(cmd.into(), cli.config_path.as_deref()).await,
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
