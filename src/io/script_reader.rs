//! Replay script reader with iterator interface
//!
//! Provides a streaming iterator over script steps from a CSV file, plus a
//! loader for seed balance files. Format concerns live in `csv_format`.
//!
//! ```no_run
//! use currency_facade::io::ScriptReader;
//! use std::path::Path;
//!
//! let reader = ScriptReader::new(Path::new("session.csv")).unwrap();
//! for result in reader {
//!     match result {
//!         Ok(step) => println!("step: {:?}", step),
//!         Err(e) => eprintln!("Error: {}", e),
//!     }
//! }
//! ```
//!
//! # Error Handling
//!
//! - Fatal errors (file not found, I/O errors) are returned from `new()`
//! - Malformed rows are yielded as `CurrencyError::Parse` with their line number

use crate::io::csv_format::{convert_script_record, seed_snapshot, ScriptRecord, SeedRecord};
use crate::types::{BalanceSnapshot, CurrencyError, ScriptStep};
use csv::{ReaderBuilder, Trim};
use std::fs::File;
use std::path::Path;

/// Streaming reader over a replay script
#[derive(Debug)]
pub struct ScriptReader {
    reader: csv::Reader<File>,
    line_num: u64,
}

impl ScriptReader {
    /// Open a script file
    ///
    /// The CSV reader trims whitespace from all fields and allows rows with
    /// fewer fields, so `reconcile` can be written without trailing commas.
    pub fn new(path: &Path) -> Result<Self, CurrencyError> {
        let file = File::open(path).map_err(|e| CurrencyError::Io {
            message: format!("Failed to open file '{}': {}", path.display(), e),
        })?;

        let reader = ReaderBuilder::new()
            .trim(Trim::All)
            .flexible(true)
            .from_reader(file);

        Ok(Self {
            reader,
            line_num: 1,
        })
    }
}

impl Iterator for ScriptReader {
    type Item = Result<ScriptStep, CurrencyError>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut deserializer = self.reader.deserialize::<ScriptRecord>();
        let result = deserializer.next()?;
        self.line_num += 1;

        Some(match result {
            Ok(record) => convert_script_record(record)
                .map_err(|message| CurrencyError::parse(Some(self.line_num), message)),
            Err(e) => Err(CurrencyError::parse(Some(self.line_num), e.to_string())),
        })
    }
}

/// Load seed balances (`currency,balance`) from a CSV file
pub fn read_seed_csv(path: &Path) -> Result<BalanceSnapshot, CurrencyError> {
    let file = File::open(path).map_err(|e| CurrencyError::Io {
        message: format!("Failed to open file '{}': {}", path.display(), e),
    })?;

    let mut reader = ReaderBuilder::new().trim(Trim::All).from_reader(file);
    let records = reader
        .deserialize::<SeedRecord>()
        .collect::<Result<Vec<_>, _>>()?;

    seed_snapshot(records)
}
