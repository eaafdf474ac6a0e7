//! I/O module
//!
//! Handles CSV parsing and output for the CLI runner.
//!
//! # Components
//!
//! - `csv_format` - CSV format handling (row conversion, output serialization)
//! - `script_reader` - Script reader with iterator interface, seed loader

pub mod csv_format;
pub mod script_reader;

pub use csv_format::{convert_script_record, write_balances_csv, ScriptRecord, SeedRecord};
pub use script_reader::{read_seed_csv, ScriptReader};
