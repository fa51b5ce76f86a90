//! Cartwheel - client-side shopping-cart store for a headless storefront.
//!
//! The store keeps an ordered list of line-items in memory, gates
//! mutations on a remote stock check, mirrors every successful mutation to
//! a local persistence slot, and reports failures through a fire-and-forget
//! notification sink instead of returned errors.
//!
//! # Architecture
//!
//! - Collaborators (`StockService`, `CatalogService`, `CartStorage`,
//!   `Notifier`) are injected as trait objects - tests substitute fakes
//! - The storefront API is source of truth for stock and catalog data -
//!   stock is fetched fresh per operation, product metadata is cached via
//!   `moka` (5 minute TTL)
//! - The persistence slot is a single JSON blob, read once at open and
//!   overwritten wholesale after every successful mutation
//!
//! # Example
//!
//! ```rust,ignore
//! use cartwheel::{CartConfig, CartStore, ProductId};
//!
//! let config = CartConfig::from_env()?;
//! let store = CartStore::from_config(&config)?;
//!
//! // Outcomes mirror what the notification sink reports; callers may
//! // ignore them and observe notices only.
//! let outcome = store.add_item(ProductId::new(1)).await;
//! assert!(outcome.is_success());
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod config;
pub mod error;
pub mod notify;
pub mod persist;
pub mod store;
pub mod types;

pub use api::{ApiError, CatalogService, StockService, StorefrontApiClient};
pub use config::{CartConfig, ConfigError};
pub use error::{CartError, CartOp, CartOutcome, FailureKind};
pub use notify::{Notice, Notifier, Severity, TracingNotifier};
pub use persist::{CartStorage, JsonFileStorage, MemoryStorage, StorageError};
pub use store::CartStore;
pub use types::{LineItem, ProductId, ProductRecord, StockSnapshot};
