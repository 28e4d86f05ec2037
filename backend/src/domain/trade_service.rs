//! Transaction engine service.
//!
//! Drives purchases and balance top-ups through the [`LedgerRepository`].
//! Each operation runs under a timeout; when it elapses the in-flight ledger
//! future is dropped, which rolls its transaction back.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{error, info};

use crate::domain::ports::{LedgerRepository, LedgerRepositoryError, PurchaseOrder, TradeCommand};
use crate::domain::{AcquisitionId, ArtworkId, Error, Money, PurchaseReceipt, UserId};

/// Default bound on a single engine operation.
pub const DEFAULT_OPERATION_TIMEOUT: Duration = Duration::from_secs(10);

fn map_ledger_error(error: LedgerRepositoryError) -> Error {
    match error {
        LedgerRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("ledger unavailable: {message}"))
        }
        LedgerRepositoryError::Query { message } => {
            Error::internal(format!("ledger error: {message}"))
        }
        LedgerRepositoryError::Rejected { rejection } => {
            if rejection.is_inconsistency() {
                error!(reason = rejection.reason(), "ledger integrity fault");
            }
            Error::from(rejection)
        }
        LedgerRepositoryError::AccountNotFound => {
            Error::not_found("user not found").with_reason("user_not_found")
        }
        LedgerRepositoryError::BalanceLimit => {
            Error::invalid_request("amount exceeds the maximum balance").with_reason("amount")
        }
    }
}

/// Transaction engine implementing [`TradeCommand`].
#[derive(Clone)]
pub struct TradeService<L> {
    ledger: Arc<L>,
    clock: Arc<dyn Clock>,
    timeout: Duration,
}

impl<L> TradeService<L> {
    /// Create an engine with the [`DEFAULT_OPERATION_TIMEOUT`].
    pub fn new(ledger: Arc<L>, clock: Arc<dyn Clock>) -> Self {
        Self {
            ledger,
            clock,
            timeout: DEFAULT_OPERATION_TIMEOUT,
        }
    }

    /// Override the per-operation timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    async fn bounded<T, F>(&self, operation: &'static str, fut: F) -> Result<T, Error>
    where
        F: std::future::Future<Output = Result<T, LedgerRepositoryError>>,
    {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => result.map_err(map_ledger_error),
            Err(_) => {
                let timeout_ms = u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX);
                error!(operation, timeout_ms, "ledger operation timed out");
                Err(Error::service_unavailable("operation timed out").with_reason("timeout"))
            }
        }
    }
}

#[async_trait]
impl<L> TradeCommand for TradeService<L>
where
    L: LedgerRepository,
{
    async fn purchase(
        &self,
        buyer: &UserId,
        artwork: &ArtworkId,
    ) -> Result<PurchaseReceipt, Error> {
        let order = PurchaseOrder {
            buyer_id: *buyer,
            artwork_id: *artwork,
            acquisition_id: AcquisitionId::random(),
            acquired_on: self.clock.utc().date_naive(),
        };
        let receipt = self
            .bounded("purchase", self.ledger.purchase(&order))
            .await?;
        info!(
            buyer_id = %buyer,
            artwork_id = %artwork,
            acquisition_id = %receipt.acquisition_id,
            price = %receipt.price,
            "purchase committed"
        );
        Ok(receipt)
    }

    async fn credit(&self, user: &UserId, amount: Money) -> Result<Money, Error> {
        if amount.is_zero() {
            return Err(
                Error::invalid_request("amount must be greater than zero").with_reason("amount")
            );
        }
        let balance = self
            .bounded("credit", self.ledger.credit(user, amount))
            .await?;
        info!(user_id = %user, amount = %amount, "balance credited");
        Ok(balance)
    }
}

#[cfg(test)]
#[path = "trade_service_tests.rs"]
mod tests;
