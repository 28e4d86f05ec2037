//! Port for balance- and ownership-affecting writes.
//!
//! Every method is one atomic unit: adapters either commit all effects or
//! none. Implementations evaluate [`settle`](crate::domain::settle) against
//! state they hold locked for the duration of the unit.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::{AcquisitionId, ArtworkId, Money, PurchaseReceipt, PurchaseRejection, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by ledger adapters.
    pub enum LedgerRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "ledger connection failed: {message}",
        /// Statement failed during execution; the unit was rolled back.
        Query { message: String } => "ledger query failed: {message}",
        /// A purchase precondition did not hold.
        Rejected { rejection: PurchaseRejection } => "purchase rejected: {rejection}",
        /// The account to credit does not exist.
        AccountNotFound => "account not found",
        /// The credit would exceed the storable balance.
        BalanceLimit => "balance limit exceeded",
    }
}

/// A purchase to execute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PurchaseOrder {
    pub buyer_id: UserId,
    pub artwork_id: ArtworkId,
    /// Identifier for the acquisition row created on success.
    pub acquisition_id: AcquisitionId,
    pub acquired_on: NaiveDate,
}

/// Atomic ledger operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LedgerRepository: Send + Sync {
    /// Move the artwork's price from buyer to seller, mark it sold and
    /// append the acquisition.
    async fn purchase(&self, order: &PurchaseOrder)
    -> Result<PurchaseReceipt, LedgerRepositoryError>;

    /// Add `amount` to the user's balance and return the new balance.
    async fn credit(&self, user: &UserId, amount: Money) -> Result<Money, LedgerRepositoryError>;
}
