// SWIFT Directory - Core Library
// Exposes all modules for use in CLI, API server, and tests

pub mod config;
pub mod db;
pub mod entities;
pub mod error;
pub mod hierarchy;
pub mod parser;
pub mod service;
pub mod store;
pub mod validators;

#[cfg(feature = "server")]
pub mod api;

// Re-export commonly used types
pub use config::Config;
pub use db::{get_events_for_entity, insert_event, setup_database, Event, SqliteStore};
pub use entities::{Bank, BranchSummary, CodeType, Country};
pub use error::{ErrorKind, FieldError, RecordError, ServiceError, StoreError};
pub use hierarchy::{resolve, ResolvedBank, SwiftCodeDetails};
pub use parser::{parse_file, parse_str, ParsedDirectory};
pub use service::{CountrySwiftCodes, ImportSummary, SwiftService};
pub use store::{BankStore, BulkInsert};
pub use validators::{
    BankRecordValidator, CountryRecordValidator, Record, ValidatedBank, ValidatedCountry,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Open the store a `Config` points at.
pub fn open_store(config: &Config) -> Result<SqliteStore, StoreError> {
    if config.is_in_memory() {
        SqliteStore::open_in_memory()
    } else {
        SqliteStore::open(std::path::Path::new(&config.database_path))
    }
}
