//! Infrastructure layer for configuration, logging, transport, parsing and persistence
//!
//! Everything that touches the network, the file system or the markup parser
//! lives here; the application layer only sees the traits and types exported below.

pub mod config;
pub mod http_client;
pub mod logging;
pub mod parsing;
pub mod parsing_error;
pub mod record_store;

pub use config::{AppConfig, ConfigManager};
pub use http_client::{Fetcher, HttpFetcher, StagedFetcher, TransportError};
pub use logging::init_logging_with_config;
pub use parsing::{DocumentView, ExtractionRules, ParsingError, ParsingResult, SelectorConfig};
pub use record_store::{DuplicatePolicy, PersistenceError, RecordStore};
