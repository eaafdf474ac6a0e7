//! Currency Facade CLI
//!
//! Replays a script of balance operations against the currency facade backed
//! by an in-memory ledger.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- script.csv > balances.csv
//! cargo run -- --publisher-id acme --user-id player-1 script.csv > balances.csv
//! cargo run -- --seed seed.csv --config facade.toml -v script.csv > balances.csv
//! ```
//!
//! The final cached balances are written to stdout as `currency,balance`
//! rows sorted by currency. Logs go to stderr; `RUST_LOG` overrides `-v`.
//!
//! # Exit Codes
//!
//! - 0: Success
//! - 1: Error (script not found, unreadable config or seed file, etc.)

use currency_facade::cli;
use currency_facade::runner::ScriptRunner;
use std::process;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() {
    let args = cli::parse_args();

    init_tracing(args.log_level());

    let options = match args.to_run_options() {
        Ok(options) => options,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    // Balances go to stdout
    let runner = ScriptRunner::new(options);
    let mut output = std::io::stdout();
    if let Err(e) = runner.run(&args.script_file, &mut output) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn init_tracing(filter: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .without_time()
                .with_writer(std::io::stderr),
        )
        .init();
}
