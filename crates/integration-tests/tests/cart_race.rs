//! Interleaving across suspension points.
//!
//! Each operation snapshots the cart once, suspends on its network calls,
//! and commits a list computed from that snapshot; nothing serializes
//! overlapping operations. A mutation based on a stale snapshot silently
//! overwrites a concurrent one - last writer wins, in memory and in the
//! slot. These tests pin that down as current behavior.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use rust_decimal_macros::dec;
use tokio::sync::Notify;

use cartwheel::{
    ApiError, CartStorage, CartStore, MemoryStorage, ProductId, StockService, StockSnapshot,
};
use cartwheel_integration_tests::{FakeCatalog, RecordingNotifier, catalog_record};

/// Stock service that parks its first caller until released, so a test can
/// run a whole second operation inside the first one's suspension point.
struct GatedStock {
    amount: i64,
    entered: Notify,
    release: Notify,
    calls: AtomicUsize,
}

impl GatedStock {
    fn new(amount: i64) -> Self {
        Self {
            amount,
            entered: Notify::new(),
            release: Notify::new(),
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl StockService for GatedStock {
    async fn stock(&self, id: ProductId) -> Result<StockSnapshot, ApiError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if call == 0 {
            self.entered.notify_one();
            self.release.notified().await;
        }
        Ok(StockSnapshot {
            id,
            amount: self.amount,
        })
    }
}

#[tokio::test]
async fn test_overlapping_adds_lose_an_increment() {
    let stock = Arc::new(GatedStock::new(10));
    let catalog = Arc::new(FakeCatalog::new());
    catalog.insert(catalog_record(1, "Sneaker", dec!(179.90)));
    let storage = Arc::new(MemoryStorage::new());
    let notifier = Arc::new(RecordingNotifier::new());

    let store = CartStore::open(
        stock.clone(),
        catalog,
        storage.clone(),
        notifier.clone(),
    )
    .expect("empty slot");

    let id = ProductId::new(1);

    // First add parks inside its stock check, snapshot already taken.
    let first = {
        let store = store.clone();
        tokio::spawn(async move { store.add_item(id).await })
    };
    stock.entered.notified().await;

    // Second add runs to completion against the same (empty) cart.
    let second = store.add_item(id).await;
    assert!(second.is_success());
    assert_eq!(store.total_quantity().await, 1);

    // Release the first add: it commits a list computed before the second
    // one landed.
    stock.release.notify_one();
    let first = first.await.expect("task completes");
    assert!(first.is_success());

    // Two successful adds, one unit in the cart: the second increment was
    // overwritten. Sequential awaited adds yield two (see cart_add).
    assert_eq!(store.total_quantity().await, 1);
    assert!(notifier.notices().is_empty());

    // The slot agrees with the last writer.
    let persisted = storage.load().expect("slot readable");
    assert_eq!(persisted, Some(store.items().await));
}

#[tokio::test]
async fn test_overlapping_add_overwrites_concurrent_removal() {
    let stock = Arc::new(GatedStock::new(10));
    let catalog = Arc::new(FakeCatalog::new());
    let record = catalog_record(1, "Sneaker", dec!(179.90));
    let seeded = vec![record.clone().into_line_item(1)];
    catalog.insert(record);
    let storage = Arc::new(MemoryStorage::with_items(seeded));
    let notifier = Arc::new(RecordingNotifier::new());

    let store = CartStore::open(stock.clone(), catalog, storage, notifier)
        .expect("seeded slot");

    let id = ProductId::new(1);

    // The add snapshots a cart that still contains the line...
    let add = {
        let store = store.clone();
        tokio::spawn(async move { store.add_item(id).await })
    };
    stock.entered.notified().await;

    // ...the removal completes while the add is suspended...
    assert!(store.remove_item(id).await.is_success());
    assert!(store.items().await.is_empty());

    // ...and the add resurrects the line with its incremented quantity.
    stock.release.notify_one();
    assert!(add.await.expect("task completes").is_success());

    let items = store.items().await;
    assert_eq!(items.len(), 1);
    assert_eq!(items.first().expect("one line").quantity, 2);
}
