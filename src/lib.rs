// Plate Catalog - Core Library
// Exposes all modules for use in the admin CLI, the API server, and tests

pub mod plate;
pub mod query;
pub mod store;
pub mod db;
pub mod error;
pub mod service;
pub mod consumer;
pub mod config;
pub mod logging;

#[cfg(feature = "server")]
pub mod api;

// Re-export commonly used types
pub use plate::{Plate, PlateTransfer, MARKUP_FACTOR, MAX_REGISTRATION_LEN};
pub use query::{PlateQuery, SortDirection};
pub use store::{InMemoryPlateStore, PlateStore, StoreError};
pub use db::{
    SqlitePlateStore,
    setup_database, seed_defaults, verify_count,
    insert_plate, get_plate, get_all_plates, update_plate, query_plates,
    update_sale_price, mark_not_for_sale,
};
pub use error::CatalogError;
pub use service::PlateService;
pub use consumer::{CatalogMessage, LoggingConsumer, MessageConsumer};
pub use config::CatalogConfig;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
