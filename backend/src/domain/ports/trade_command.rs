//! Driving port for the transaction engine.

use async_trait::async_trait;

use crate::domain::{ArtworkId, Error, Money, PurchaseReceipt, UserId};

/// Balance- and ownership-affecting operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TradeCommand: Send + Sync {
    /// Buy `artwork` for `buyer`.
    ///
    /// Failure kinds, in the order they are checked: `not_found`,
    /// `conflict` (`already_sold`), `invalid_operation` (`self_purchase`,
    /// `insufficient_funds`) and `internal_error` (`missing_owner`).
    async fn purchase(&self, buyer: &UserId, artwork: &ArtworkId)
    -> Result<PurchaseReceipt, Error>;

    /// Credit a strictly positive `amount` to `user` and return the new
    /// balance.
    async fn credit(&self, user: &UserId, amount: Money) -> Result<Money, Error>;
}
