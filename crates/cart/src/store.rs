//! The cart store.
//!
//! Holds the ordered line-item list in memory, mirrors it to the
//! persistence slot after every successful mutation, and gates add/update
//! on a fresh stock check. Failures never propagate to the caller: each
//! operation converts its error into a [`CartOutcome`] and one notice
//! through the sink.
//!
//! # Example
//!
//! ```rust,ignore
//! use cartwheel::{CartConfig, CartStore, ProductId};
//!
//! let config = CartConfig::from_env()?;
//! let store = CartStore::from_config(&config)?;
//!
//! store.add_item(ProductId::new(1)).await;
//! store.update_quantity(ProductId::new(1), 3).await;
//! let items = store.items().await;
//! ```

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::instrument;

use crate::api::{CatalogService, StockService, StorefrontApiClient};
use crate::config::CartConfig;
use crate::error::{CartError, CartOp, CartOutcome};
use crate::notify::{Notice, Notifier, TracingNotifier};
use crate::persist::{CartStorage, JsonFileStorage};
use crate::types::{LineItem, ProductId};

/// Client-side shopping-cart store.
///
/// Cheaply cloneable via `Arc`; clones share the same state and
/// collaborators. Construct with [`CartStore::open`] to inject
/// collaborators, or [`CartStore::from_config`] for the production wiring.
///
/// Operations are not serialized against each other: each one reads the
/// state once up front, suspends on its network calls, and commits a list
/// computed from that snapshot. Two overlapping operations on the same
/// product can therefore lose an update (last writer wins, in memory and
/// in the slot).
#[derive(Clone)]
pub struct CartStore {
    inner: Arc<CartStoreInner>,
}

struct CartStoreInner {
    stock: Arc<dyn StockService>,
    catalog: Arc<dyn CatalogService>,
    storage: Arc<dyn CartStorage>,
    notifier: Arc<dyn Notifier>,
    items: RwLock<Vec<LineItem>>,
}

impl CartStore {
    /// Open a store with injected collaborators.
    ///
    /// Reads the persistence slot once; a slot that has never been written
    /// yields an empty cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the slot exists but cannot be read or parsed.
    pub fn open(
        stock: Arc<dyn StockService>,
        catalog: Arc<dyn CatalogService>,
        storage: Arc<dyn CartStorage>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, CartError> {
        let items = storage.load()?.unwrap_or_default();

        Ok(Self {
            inner: Arc::new(CartStoreInner {
                stock,
                catalog,
                storage,
                notifier,
                items: RwLock::new(items),
            }),
        })
    }

    /// Open a store wired to the production collaborators: the storefront
    /// API client, a JSON file slot, and the tracing notifier.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built or the slot
    /// cannot be read.
    pub fn from_config(config: &CartConfig) -> Result<Self, CartError> {
        let client = StorefrontApiClient::new(config)?;
        let storage = JsonFileStorage::new(&config.storage_dir, &config.storage_slot);

        Self::open(
            Arc::new(client.clone()),
            Arc::new(client),
            Arc::new(storage),
            Arc::new(TracingNotifier),
        )
    }

    /// Current cart state, in insertion order.
    pub async fn items(&self) -> Vec<LineItem> {
        self.inner.items.read().await.clone()
    }

    /// Total units across all lines.
    pub async fn total_quantity(&self) -> u64 {
        self.inner
            .items
            .read()
            .await
            .iter()
            .map(|item| u64::from(item.quantity))
            .sum()
    }

    /// Add one unit of a product to the cart.
    ///
    /// Checks stock first; a product already in the cart has its quantity
    /// incremented, otherwise catalog metadata is fetched and a new line
    /// appended.
    #[instrument(skip(self))]
    pub async fn add_item(&self, product_id: ProductId) -> CartOutcome {
        let result = self.try_add(product_id).await;
        self.conclude(CartOp::Add, result)
    }

    /// Remove a product's whole line from the cart, regardless of quantity.
    #[instrument(skip(self))]
    pub async fn remove_item(&self, product_id: ProductId) -> CartOutcome {
        let result = self.try_remove(product_id).await;
        self.conclude(CartOp::Remove, result)
    }

    /// Set a product's quantity to an absolute value.
    #[instrument(skip(self))]
    pub async fn update_quantity(&self, product_id: ProductId, quantity: u32) -> CartOutcome {
        let result = self.try_update(product_id, quantity).await;
        self.conclude(CartOp::UpdateQuantity, result)
    }

    // =========================================================================
    // Operation internals
    // =========================================================================

    async fn try_add(&self, product_id: ProductId) -> Result<(), CartError> {
        // One read up front; the commit below overwrites whatever landed
        // while the network calls were in flight.
        let snapshot = self.inner.items.read().await.clone();

        let stock = self.inner.stock.stock(product_id).await?;
        // A single remaining unit is treated as unavailable.
        if stock.amount <= 1 {
            return Err(CartError::OutOfStock {
                id: product_id,
                available: stock.amount,
            });
        }

        let next = if snapshot.iter().any(|item| item.id == product_id) {
            snapshot
                .into_iter()
                .map(|mut item| {
                    if item.id == product_id {
                        item.quantity += 1;
                    }
                    item
                })
                .collect()
        } else {
            let record = self.inner.catalog.product(product_id).await?;
            let mut next = snapshot;
            next.push(record.into_line_item(1));
            next
        };

        self.commit(next).await
    }

    async fn try_remove(&self, product_id: ProductId) -> Result<(), CartError> {
        let snapshot = self.inner.items.read().await.clone();

        if !snapshot.iter().any(|item| item.id == product_id) {
            return Err(CartError::NotFound(product_id));
        }

        let next: Vec<LineItem> = snapshot
            .into_iter()
            .filter(|item| item.id != product_id)
            .collect();

        self.commit(next).await
    }

    async fn try_update(&self, product_id: ProductId, quantity: u32) -> Result<(), CartError> {
        if quantity < 1 {
            return Err(CartError::InvalidQuantity(quantity));
        }

        let snapshot = self.inner.items.read().await.clone();

        let stock = self.inner.stock.stock(product_id).await?;
        // Same threshold as add_item, even when the new quantity is lower
        // than the current one.
        if stock.amount <= 1 {
            return Err(CartError::OutOfStock {
                id: product_id,
                available: stock.amount,
            });
        }

        // An id with no matching line falls through untouched: the
        // unchanged list is rewritten and the operation reports success.
        // Only removal checks membership.
        let next: Vec<LineItem> = snapshot
            .into_iter()
            .map(|mut item| {
                if item.id == product_id {
                    item.quantity = quantity;
                }
                item
            })
            .collect();

        self.commit(next).await
    }

    /// Persist the new state, then swap it in. A failed write leaves the
    /// in-memory state untouched.
    async fn commit(&self, next: Vec<LineItem>) -> Result<(), CartError> {
        self.inner.storage.save(&next)?;
        *self.inner.items.write().await = next;
        Ok(())
    }

    /// Convert an operation result into its outcome, dispatching one notice
    /// on failure.
    fn conclude(&self, op: CartOp, result: Result<(), CartError>) -> CartOutcome {
        match result {
            Ok(()) => CartOutcome::Success,
            Err(err) => {
                tracing::debug!(error = %err, "cart operation failed");
                let message = err.user_message(op);
                self.inner.notifier.notify(&Notice::error(message.clone()));
                CartOutcome::Failure {
                    kind: err.kind(),
                    message,
                }
            }
        }
    }
}
