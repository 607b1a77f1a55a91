#[cfg(feature = "desktop")]
mod commands;
pub mod config;
pub mod logging;
pub mod models;
pub mod normalize;
pub mod source;
pub mod state;
pub mod storage;
pub mod store;
pub mod ticketmaster;
mod utils;

pub use config::{AppConfig, SourceKind};
pub use models::{ConcertRecord, Price};
pub use normalize::{normalize, NormalizeError};
pub use source::ConcertSource;
pub use storage::{LocalStorage, MemoryStorage, SqliteStorage, StorageError};
pub use store::{ConcertStore, FetchPhase, StoreStatus};
pub use ticketmaster::{FetchError, RawEvent, TicketmasterClient};

#[cfg(feature = "desktop")]
pub use commands::run;
