use crate::config::FacadeConfig;
use crate::io::read_seed_csv;
use crate::runner::RunOptions;
use crate::types::CurrencyError;
use clap::{ArgAction, Parser};
use std::path::PathBuf;

/// Replay a currency script against the client-side balance facade
#[derive(Parser, Debug)]
#[command(name = "currency-facade")]
#[command(about = "Replay a currency script against the client-side balance facade", long_about = None)]
pub struct CliArgs {
    /// Script CSV file path containing facade and ledger steps
    #[arg(value_name = "SCRIPT", help = "Path to the script CSV file")]
    pub script_file: PathBuf,

    /// Publisher id used to initialize the facade
    #[arg(
        long = "publisher-id",
        value_name = "ID",
        default_value = "demo-publisher",
        help = "Publisher id passed to initialize"
    )]
    pub publisher_id: String,

    /// User id used to initialize the facade
    #[arg(
        long = "user-id",
        value_name = "ID",
        default_value = "",
        help = "User id passed to initialize (default: the provider's default user)"
    )]
    pub user_id: String,

    /// Facade configuration file
    #[arg(
        long = "config",
        value_name = "FILE",
        help = "TOML file with facade settings"
    )]
    pub config_file: Option<PathBuf>,

    /// Seed balances for the in-memory ledger
    #[arg(
        long = "seed",
        value_name = "FILE",
        help = "CSV file (currency,balance) preloading the ledger"
    )]
    pub seed_file: Option<PathBuf>,

    /// Log verbosity
    #[arg(
        short = 'v',
        long = "verbose",
        action = ArgAction::Count,
        help = "Increase log verbosity (-v debug, -vv trace)"
    )]
    pub verbose: u8,
}

impl CliArgs {
    /// Build runner options from CLI arguments
    ///
    /// Loads the configuration and seed files when given; otherwise falls back
    /// to the default configuration and an empty ledger.
    pub fn to_run_options(&self) -> Result<RunOptions, CurrencyError> {
        let config = match &self.config_file {
            Some(path) => FacadeConfig::load(path)?,
            None => FacadeConfig::default(),
        };

        let seed = match &self.seed_file {
            Some(path) => read_seed_csv(path)?,
            None => Default::default(),
        };

        Ok(RunOptions {
            publisher_id: self.publisher_id.clone(),
            user_id: self.user_id.clone(),
            seed,
            config,
        })
    }

    /// Default log filter directive for the requested verbosity
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }
}
