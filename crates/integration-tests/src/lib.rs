//! Test support for Cartwheel integration tests.
//!
//! Provides scriptable fakes for every store collaborator plus a
//! [`TestCart`] bundle that wires them into a store and keeps handles for
//! assertions.
//!
//! # Test Categories
//!
//! - `cart_add` - add_item behavior
//! - `cart_remove` - remove_item behavior
//! - `cart_update` - update_quantity behavior
//! - `cart_persistence` - slot round-trips and reopening
//! - `cart_race` - interleaving across suspension points

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use rust_decimal::Decimal;

use cartwheel::{
    ApiError, CartStore, CatalogService, LineItem, MemoryStorage, Notice, Notifier, ProductId,
    ProductRecord, StockService, StockSnapshot,
};

/// Build the transport-level error the fakes use to simulate an
/// unreachable service.
#[must_use]
pub fn transport_error(resource: &str) -> ApiError {
    ApiError::Status {
        status: reqwest::StatusCode::INTERNAL_SERVER_ERROR,
        body: format!("{resource} service unavailable"),
    }
}

/// Build a catalog record for seeding [`FakeCatalog`].
#[must_use]
pub fn catalog_record(id: i64, title: &str, price: Decimal) -> ProductRecord {
    ProductRecord {
        id: ProductId::new(id),
        title: title.to_string(),
        price,
        image: format!("https://cdn.example.com/{id}.jpg"),
    }
}

// =============================================================================
// Fake Collaborators
// =============================================================================

/// Scriptable stock service.
///
/// Reports a configured amount per product, can be flipped into a failure
/// mode, and counts how many times it was called.
#[derive(Default)]
pub struct FakeStock {
    amounts: Mutex<HashMap<ProductId, i64>>,
    failing: AtomicBool,
    calls: AtomicUsize,
}

impl FakeStock {
    /// Create a stock service that knows no products.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the available amount reported for a product.
    pub fn set_amount(&self, id: ProductId, amount: i64) {
        self.amounts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, amount);
    }

    /// Make every subsequent call fail at the transport level.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// How many stock checks have been issued.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StockService for FakeStock {
    async fn stock(&self, id: ProductId) -> Result<StockSnapshot, ApiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if self.failing.load(Ordering::SeqCst) {
            return Err(transport_error("stock"));
        }

        let amounts = self.amounts.lock().unwrap_or_else(PoisonError::into_inner);
        let amount = amounts.get(&id).copied().ok_or(ApiError::NotFound(id))?;
        Ok(StockSnapshot { id, amount })
    }
}

/// Scriptable catalog service with the same failure switch and counter.
#[derive(Default)]
pub struct FakeCatalog {
    products: Mutex<HashMap<ProductId, ProductRecord>>,
    failing: AtomicBool,
    calls: AtomicUsize,
}

impl FakeCatalog {
    /// Create a catalog that knows no products.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a product record.
    pub fn insert(&self, record: ProductRecord) {
        self.products
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(record.id, record);
    }

    /// Make every subsequent call fail at the transport level.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// How many metadata fetches have been issued.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CatalogService for FakeCatalog {
    async fn product(&self, id: ProductId) -> Result<ProductRecord, ApiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if self.failing.load(Ordering::SeqCst) {
            return Err(transport_error("catalog"));
        }

        let products = self.products.lock().unwrap_or_else(PoisonError::into_inner);
        products.get(&id).cloned().ok_or(ApiError::NotFound(id))
    }
}

/// Notifier that records every notice for later assertions.
#[derive(Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
    /// Create an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All notices dispatched so far.
    #[must_use]
    pub fn notices(&self) -> Vec<Notice> {
        self.notices
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Message texts only, in dispatch order.
    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        self.notices()
            .into_iter()
            .map(|notice| notice.message)
            .collect()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: &Notice) {
        self.notices
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(notice.clone());
    }
}

// =============================================================================
// Test Harness
// =============================================================================

/// A store wired to fakes, with handles kept for scripting and assertions.
pub struct TestCart {
    /// The store under test.
    pub store: CartStore,
    /// Stock collaborator handle.
    pub stock: Arc<FakeStock>,
    /// Catalog collaborator handle.
    pub catalog: Arc<FakeCatalog>,
    /// The in-memory persistence slot.
    pub storage: Arc<MemoryStorage>,
    /// The recorded notification channel.
    pub notifier: Arc<RecordingNotifier>,
}

impl TestCart {
    /// A store opened on an empty slot.
    #[must_use]
    pub fn empty() -> Self {
        Self::with_slot(MemoryStorage::new())
    }

    /// A store opened on a slot a previous session already wrote.
    #[must_use]
    pub fn seeded(items: Vec<LineItem>) -> Self {
        Self::with_slot(MemoryStorage::with_items(items))
    }

    fn with_slot(slot: MemoryStorage) -> Self {
        let stock = Arc::new(FakeStock::new());
        let catalog = Arc::new(FakeCatalog::new());
        let storage = Arc::new(slot);
        let notifier = Arc::new(RecordingNotifier::new());

        let store = CartStore::open(
            stock.clone(),
            catalog.clone(),
            storage.clone(),
            notifier.clone(),
        )
        .expect("in-memory slot is always readable");

        Self {
            store,
            stock,
            catalog,
            storage,
            notifier,
        }
    }

    /// Register a product with both remote collaborators in one call.
    pub fn stock_product(&self, record: ProductRecord, amount: i64) {
        self.stock.set_amount(record.id, amount);
        self.catalog.insert(record);
    }
}

/// Install a subscriber printing test output when `RUST_LOG` asks for it.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cartwheel=debug".into()),
        )
        .with_test_writer()
        .try_init();
}
