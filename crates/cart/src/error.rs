//! Error taxonomy and per-operation outcomes.
//!
//! Internals propagate `CartError` with `?`; the public operation boundary
//! converts every error into a [`CartOutcome`] plus one user-facing notice.
//! No error ever reaches the caller as `Err`.

use thiserror::Error;

use crate::api::ApiError;
use crate::persist::StorageError;
use crate::types::ProductId;

/// Errors that can occur inside a cart operation.
#[derive(Debug, Error)]
pub enum CartError {
    /// Requested quantity is malformed (below 1).
    #[error("invalid quantity: {0}")]
    InvalidQuantity(u32),

    /// Operation targets a product that is not in the cart.
    #[error("product {0} not in cart")]
    NotFound(ProductId),

    /// Stock service reports too few units available.
    #[error("product {id} out of stock ({available} available)")]
    OutOfStock {
        /// Product the stock check was for.
        id: ProductId,
        /// Units the stock service reported.
        available: i64,
    },

    /// Stock or catalog call failed.
    #[error("api error: {0}")]
    Api(#[from] ApiError),

    /// Persistence slot could not be written.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Which store operation an error surfaced from.
///
/// Failure messages are worded per operation, matching the toasts the
/// storefront shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartOp {
    /// `add_item`
    Add,
    /// `remove_item`
    Remove,
    /// `update_quantity`
    UpdateQuantity,
}

/// Broad classification of an operation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Input validation rejected the request.
    InvalidQuantity,
    /// The product is not in the cart.
    NotFound,
    /// The stock service reported too few units.
    OutOfStock,
    /// A network call failed.
    Transport,
    /// The persistence slot could not be written.
    Storage,
}

/// Result of one public store operation.
///
/// Success and failure are both terminal: the operation has already applied
/// (or skipped) its mutation and dispatched its notice by the time this is
/// returned. Callers may ignore it entirely and observe only the
/// notification channel, as the original UI does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartOutcome {
    /// The mutation was applied and persisted.
    Success,
    /// Nothing changed; one notice was dispatched.
    Failure {
        /// Classification of what went wrong.
        kind: FailureKind,
        /// The user-facing message that was dispatched.
        message: String,
    },
}

impl CartOutcome {
    /// Whether the operation applied its mutation.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

impl CartError {
    /// Classify this error for the outcome surface.
    #[must_use]
    pub const fn kind(&self) -> FailureKind {
        match self {
            Self::InvalidQuantity(_) => FailureKind::InvalidQuantity,
            Self::NotFound(_) => FailureKind::NotFound,
            Self::OutOfStock { .. } => FailureKind::OutOfStock,
            Self::Api(_) => FailureKind::Transport,
            Self::Storage(_) => FailureKind::Storage,
        }
    }

    /// The user-facing message for this error in the given operation.
    ///
    /// Out-of-stock and invalid-quantity failures get specific wording;
    /// everything else collapses to the operation's generic failure message
    /// so infrastructure details never reach the user.
    #[must_use]
    pub fn user_message(&self, op: CartOp) -> String {
        match self {
            Self::OutOfStock { .. } => "Requested quantity is out of stock".to_string(),
            Self::InvalidQuantity(_) => "Invalid product quantity".to_string(),
            Self::NotFound(_) | Self::Api(_) | Self::Storage(_) => match op {
                CartOp::Add => "Failed to add product to cart".to_string(),
                CartOp::Remove => "Failed to remove product from cart".to_string(),
                CartOp::UpdateQuantity => "Failed to update product quantity".to_string(),
            },
        }
    }
}
