//! Purchase settlement rules.
//!
//! Ledger adapters lock the artwork and both user rows, then hand the locked
//! state to [`settle`]. The function is pure: it evaluates the preconditions
//! in a fixed order and, when they all hold, returns the balances to write.
//! Adapters apply the [`Settlement`] inside the same transaction or discard
//! everything.

use chrono::NaiveDate;
use serde::Serialize;
use serde_json::json;

use crate::domain::{AcquisitionId, ArtworkId, Error, Money, UserId};

/// Locked artwork state relevant to a sale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListedArtwork {
    /// Artwork being bought.
    pub id: ArtworkId,
    /// Listing user who receives the price.
    pub owner_id: UserId,
    /// Asking price.
    pub price: Money,
    /// Whether the artwork is still for sale.
    pub available: bool,
}

/// Locked state gathered by a ledger adapter before settlement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PurchaseSnapshot {
    /// Purchasing user.
    pub buyer_id: UserId,
    /// Artwork row, if it exists.
    pub artwork: Option<ListedArtwork>,
    /// Buyer's balance, if the buyer row exists.
    pub buyer_balance: Option<Money>,
    /// Seller's balance, if the seller row exists.
    pub seller_balance: Option<Money>,
}

/// Reasons a purchase is refused. Evaluated in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PurchaseRejection {
    /// No artwork with the requested id.
    #[error("artwork not found")]
    ArtworkNotFound,
    /// The artwork has already been sold.
    #[error("artwork already sold")]
    AlreadySold,
    /// The buyer listed the artwork.
    #[error("cannot purchase your own artwork")]
    SelfPurchase,
    /// The authenticated buyer has no account row.
    #[error("buyer account not found")]
    BuyerNotFound,
    /// The buyer cannot cover the price.
    #[error("insufficient funds")]
    InsufficientFunds,
    /// The listing user's account row is missing.
    #[error("artwork owner record is missing")]
    MissingOwner,
    /// Crediting the seller would exceed the storable balance.
    #[error("seller balance limit exceeded")]
    SellerBalanceLimit,
}

impl PurchaseRejection {
    /// Stable sub-kind reported under `details.code`.
    pub fn reason(self) -> &'static str {
        match self {
            Self::ArtworkNotFound => "artwork_not_found",
            Self::AlreadySold => "already_sold",
            Self::SelfPurchase => "self_purchase",
            Self::BuyerNotFound => "user_not_found",
            Self::InsufficientFunds => "insufficient_funds",
            Self::MissingOwner => "missing_owner",
            Self::SellerBalanceLimit => "balance_limit",
        }
    }

    /// Whether the rejection indicates a data-integrity fault.
    pub fn is_inconsistency(self) -> bool {
        matches!(self, Self::MissingOwner)
    }
}

impl From<PurchaseRejection> for Error {
    fn from(value: PurchaseRejection) -> Self {
        let message = value.to_string();
        let error = match value {
            PurchaseRejection::ArtworkNotFound | PurchaseRejection::BuyerNotFound => {
                Error::not_found(message)
            }
            PurchaseRejection::AlreadySold => Error::conflict(message),
            PurchaseRejection::SelfPurchase
            | PurchaseRejection::InsufficientFunds
            | PurchaseRejection::SellerBalanceLimit => Error::invalid_operation(message),
            PurchaseRejection::MissingOwner => Error::internal(message),
        };
        error.with_details(json!({ "code": value.reason() }))
    }
}

/// Balance effects of an accepted purchase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settlement {
    /// Artwork changing hands.
    pub artwork_id: ArtworkId,
    /// Purchasing user.
    pub buyer_id: UserId,
    /// Listing user.
    pub seller_id: UserId,
    /// Amount transferred.
    pub price: Money,
    /// Buyer balance after the debit.
    pub buyer_balance_after: Money,
    /// Seller balance after the credit.
    pub seller_balance_after: Money,
}

/// Evaluate the purchase preconditions against locked state.
///
/// # Examples
/// ```
/// use artmarket::domain::{
///     ArtworkId, ListedArtwork, Money, PurchaseSnapshot, UserId, settle,
/// };
///
/// let buyer = UserId::random();
/// let seller = UserId::random();
/// let snapshot = PurchaseSnapshot {
///     buyer_id: buyer,
///     artwork: Some(ListedArtwork {
///         id: ArtworkId::random(),
///         owner_id: seller,
///         price: "30".parse().unwrap(),
///         available: true,
///     }),
///     buyer_balance: Some("50".parse().unwrap()),
///     seller_balance: Some("100".parse().unwrap()),
/// };
/// let settlement = settle(&snapshot).unwrap();
/// assert_eq!(settlement.buyer_balance_after.to_string(), "20.00");
/// assert_eq!(settlement.seller_balance_after.to_string(), "130.00");
/// ```
pub fn settle(snapshot: &PurchaseSnapshot) -> Result<Settlement, PurchaseRejection> {
    let artwork = snapshot.artwork.ok_or(PurchaseRejection::ArtworkNotFound)?;
    if !artwork.available {
        return Err(PurchaseRejection::AlreadySold);
    }
    if artwork.owner_id == snapshot.buyer_id {
        return Err(PurchaseRejection::SelfPurchase);
    }
    let buyer_balance = snapshot
        .buyer_balance
        .ok_or(PurchaseRejection::BuyerNotFound)?;
    let buyer_balance_after = buyer_balance
        .checked_sub(artwork.price)
        .ok_or(PurchaseRejection::InsufficientFunds)?;
    let seller_balance = snapshot
        .seller_balance
        .ok_or(PurchaseRejection::MissingOwner)?;
    let seller_balance_after = seller_balance
        .checked_add(artwork.price)
        .ok_or(PurchaseRejection::SellerBalanceLimit)?;

    Ok(Settlement {
        artwork_id: artwork.id,
        buyer_id: snapshot.buyer_id,
        seller_id: artwork.owner_id,
        price: artwork.price,
        buyer_balance_after,
        seller_balance_after,
    })
}

/// Result returned to the buyer after a committed purchase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseReceipt {
    /// Ledger entry created by the purchase.
    pub acquisition_id: AcquisitionId,
    /// Purchased artwork.
    pub artwork_id: ArtworkId,
    /// Amount paid.
    pub price: Money,
    /// Buyer balance after the purchase.
    pub remaining_balance: Money,
    /// Purchase date.
    pub acquired_on: NaiveDate,
}
