//! PostgreSQL-backed `LedgerRepository`: the purchase transaction.
//!
//! A purchase runs in one transaction:
//!
//! 1. lock the artwork row (`SELECT … FOR UPDATE`);
//! 2. lock the buyer and seller rows in ascending id order;
//! 3. evaluate [`settle`] against the locked state;
//! 4. flip availability with `… WHERE available = true`, requiring one row;
//! 5. debit the buyer guarded by `balance >= price`, credit the seller;
//! 6. insert the acquisition (unique per artwork).
//!
//! Any failure returns an error from the transaction closure, which rolls
//! every statement back.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::AsyncConnection as _;
use diesel_async::RunQueryDsl;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::domain::ports::{LedgerRepository, LedgerRepositoryError, PurchaseOrder};
use crate::domain::{
    ArtworkId, ListedArtwork, Money, PurchaseReceipt, PurchaseRejection, PurchaseSnapshot, UserId,
    settle,
};

use super::diesel_error_mapping::{
    Violation, classify_violation, map_basic_diesel_error, map_basic_pool_error,
};
use super::models::{BalanceRow, NewAcquisitionRow, SaleRow};
use super::pool::{DbPool, PoolError};
use super::schema::{acquisitions, artworks, users};

/// Diesel-backed implementation of the ledger port.
#[derive(Clone)]
pub struct DieselLedgerRepository {
    pool: DbPool,
}

impl DieselLedgerRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Failure inside the purchase transaction.
#[derive(Debug)]
enum PurchaseTxError {
    Diesel(diesel::result::Error),
    Rejected(PurchaseRejection),
    Corrupt(String),
}

impl From<diesel::result::Error> for PurchaseTxError {
    fn from(value: diesel::result::Error) -> Self {
        Self::Diesel(value)
    }
}

fn map_pool_error(error: PoolError) -> LedgerRepositoryError {
    map_basic_pool_error(error, LedgerRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> LedgerRepositoryError {
    map_basic_diesel_error(
        error,
        LedgerRepositoryError::query,
        LedgerRepositoryError::connection,
    )
}

fn map_purchase_error(error: PurchaseTxError) -> LedgerRepositoryError {
    match error {
        PurchaseTxError::Rejected(rejection) => LedgerRepositoryError::rejected(rejection),
        PurchaseTxError::Corrupt(message) => LedgerRepositoryError::query(message),
        PurchaseTxError::Diesel(err) => match classify_violation(&err) {
            // A concurrent sale that slipped past the row lock still hits the
            // unique acquisition constraint.
            Some(Violation::Unique(_)) => {
                LedgerRepositoryError::rejected(PurchaseRejection::AlreadySold)
            }
            Some(Violation::Check(_)) => {
                LedgerRepositoryError::rejected(PurchaseRejection::InsufficientFunds)
            }
            _ => map_diesel_error(err),
        },
    }
}

fn to_money(amount: Decimal, what: &str) -> Result<Money, PurchaseTxError> {
    Money::new(amount).map_err(|err| PurchaseTxError::Corrupt(format!("stored {what}: {err}")))
}

fn sale_to_listing(row: SaleRow) -> Result<ListedArtwork, PurchaseTxError> {
    Ok(ListedArtwork {
        id: ArtworkId::from_uuid(row.id),
        owner_id: UserId::from_uuid(row.owner_id),
        price: to_money(row.price, "artwork price")?,
        available: row.available,
    })
}

/// Lock both parties in ascending id order and return their balances.
async fn lock_balances(
    conn: &mut diesel_async::AsyncPgConnection,
    buyer: Uuid,
    seller: Uuid,
) -> Result<(Option<Money>, Option<Money>), PurchaseTxError> {
    let mut ids = vec![buyer, seller];
    ids.sort();
    ids.dedup();

    let rows: Vec<BalanceRow> = users::table
        .filter(users::id.eq_any(&ids))
        .order_by(users::id)
        .select(BalanceRow::as_select())
        .for_update()
        .load(conn)
        .await?;

    let balance_of = |id: Uuid| -> Result<Option<Money>, PurchaseTxError> {
        rows.iter()
            .find(|row| row.id == id)
            .map(|row| to_money(row.balance, "user balance"))
            .transpose()
    };
    Ok((balance_of(buyer)?, balance_of(seller)?))
}

async fn purchase_in_transaction(
    conn: &mut diesel_async::AsyncPgConnection,
    order: &PurchaseOrder,
) -> Result<PurchaseReceipt, PurchaseTxError> {
    let artwork_id = *order.artwork_id.as_uuid();
    let buyer_id = *order.buyer_id.as_uuid();

    let sale = artworks::table
        .filter(artworks::id.eq(artwork_id))
        .select(SaleRow::as_select())
        .for_update()
        .first::<SaleRow>(conn)
        .await
        .optional()?
        .map(sale_to_listing)
        .transpose()?;

    let (buyer_balance, seller_balance) = match &sale {
        Some(listing) if listing.available && listing.owner_id != order.buyer_id => {
            lock_balances(conn, buyer_id, *listing.owner_id.as_uuid()).await?
        }
        _ => (None, None),
    };

    let settlement = settle(&PurchaseSnapshot {
        buyer_id: order.buyer_id,
        artwork: sale,
        buyer_balance,
        seller_balance,
    })
    .map_err(PurchaseTxError::Rejected)?;
    let price = settlement.price.as_decimal();

    let flipped = diesel::update(
        artworks::table
            .filter(artworks::id.eq(artwork_id))
            .filter(artworks::available.eq(true)),
    )
    .set(artworks::available.eq(false))
    .execute(conn)
    .await?;
    if flipped != 1 {
        return Err(PurchaseTxError::Rejected(PurchaseRejection::AlreadySold));
    }

    let remaining = diesel::update(
        users::table
            .filter(users::id.eq(buyer_id))
            .filter(users::balance.ge(price)),
    )
    .set(users::balance.eq(users::balance - price))
    .returning(users::balance)
    .get_result::<Decimal>(conn)
    .await
    .optional()?
    .ok_or(PurchaseTxError::Rejected(PurchaseRejection::InsufficientFunds))?;

    let credited = diesel::update(users::table.filter(users::id.eq(settlement.seller_id.as_uuid())))
        .set(users::balance.eq(users::balance + price))
        .execute(conn)
        .await?;
    if credited != 1 {
        return Err(PurchaseTxError::Rejected(PurchaseRejection::MissingOwner));
    }

    diesel::insert_into(acquisitions::table)
        .values(&NewAcquisitionRow {
            id: *order.acquisition_id.as_uuid(),
            buyer_id,
            artwork_id,
            acquired_on: order.acquired_on,
        })
        .execute(conn)
        .await?;

    Ok(PurchaseReceipt {
        acquisition_id: order.acquisition_id,
        artwork_id: order.artwork_id,
        price: settlement.price,
        remaining_balance: to_money(remaining, "buyer balance")?,
        acquired_on: order.acquired_on,
    })
}

#[async_trait]
impl LedgerRepository for DieselLedgerRepository {
    async fn purchase(
        &self,
        order: &PurchaseOrder,
    ) -> Result<PurchaseReceipt, LedgerRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let order = *order;
        conn.transaction(|conn| async move { purchase_in_transaction(conn, &order).await }.scope_boxed())
            .await
            .map_err(map_purchase_error)
    }

    async fn credit(&self, user: &UserId, amount: Money) -> Result<Money, LedgerRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let balance = diesel::update(users::table.filter(users::id.eq(user.as_uuid())))
            .set(users::balance.eq(users::balance + amount.as_decimal()))
            .returning(users::balance)
            .get_result::<Decimal>(&mut conn)
            .await
            .optional()
            .map_err(|err| match classify_violation(&err) {
                Some(Violation::NumericOverflow) => LedgerRepositoryError::balance_limit(),
                _ => map_diesel_error(err),
            })?
            .ok_or_else(LedgerRepositoryError::account_not_found)?;
        Money::new(balance).map_err(|_| LedgerRepositoryError::balance_limit())
    }
}
