//! In-process market store used when no database URL is configured and by
//! the HTTP integration tests.
//!
//! One [`tokio::sync::Mutex`] guards the whole state. Writes operate on a
//! copy and swap it in only when every step succeeded, so a failed unit
//! leaves nothing behind.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::domain::ports::{
    CatalogueRepository, CatalogueRepositoryError, LedgerRepository, LedgerRepositoryError,
    NewUserRecord, ProfileUpdate, PurchaseOrder, UserPersistenceError, UserRepository,
};
use crate::domain::{
    Acquisition, Artwork, ArtworkId, ArtworkSummary, Author, AuthorId, ListedArtwork, LoginName,
    Money, OwnedAcquisition, PasswordHash, PurchaseReceipt, PurchaseRejection, PurchaseSnapshot,
    StoredCredentials, UserAccount, UserId, settle,
};


const SEED_AUTHORS: [(u128, &str); 5] = [
    (0x6f1c2a3e_0b1d_4c55_9a57_1d2f3b4c5d60, "Frida Kahlo"),
    (0x7a2d3b4f_1c2e_4d66_8b68_2e3f4c5d6e71, "Diego Rivera"),
    (0x8b3e4c5a_2d3f_4e77_9c79_3f4a5d6e7f82, "Remedios Varo"),
    (0x9c4f5d6b_3e4a_4f88_8d8a_4a5b6e7f8093, "Leonora Carrington"),
    (0xad5a6e7c_4f5b_4a99_9e9b_5b6c7f8091a4, "Rufino Tamayo"),
];

#[derive(Clone)]
struct StoredUser {
    account: UserAccount,
    password_hash: PasswordHash,
}

#[derive(Clone, Default)]
struct MarketState {
    users: BTreeMap<UserId, StoredUser>,
    authors: BTreeMap<AuthorId, Author>,
    artworks: BTreeMap<ArtworkId, Artwork>,
    acquisitions: Vec<Acquisition>,
}

impl MarketState {
    fn login_holder(&self, login: &LoginName) -> Option<UserId> {
        self.users
            .values()
            .find(|user| user.account.login == *login)
            .map(|user| user.account.id)
    }

    fn summarise(&self, artwork: &Artwork) -> Option<ArtworkSummary> {
        let author = self.authors.get(&artwork.author_id)?;
        let owner = self.users.get(&artwork.owner_id)?;
        Some(ArtworkSummary {
            id: artwork.id,
            title: artwork.title.clone(),
            author_id: artwork.author_id,
            author_name: author.name.clone(),
            published_on: artwork.published_on,
            available: artwork.available,
            price: artwork.price,
            image: artwork.image.clone(),
            owner_id: artwork.owner_id,
            owner_login: owner.account.login.clone(),
            owner_name: owner.account.full_name.clone(),
        })
    }

    fn summaries<'a>(&self, artworks: impl Iterator<Item = &'a Artwork>) -> Vec<ArtworkSummary> {
        let mut rows: Vec<ArtworkSummary> =
            artworks.filter_map(|artwork| self.summarise(artwork)).collect();
        rows.sort_by(|a, b| {
            a.title
                .as_str()
                .cmp(b.title.as_str())
                .then_with(|| a.id.cmp(&b.id))
        });
        rows
    }

    fn snapshot(&self, order: &PurchaseOrder) -> PurchaseSnapshot {
        let artwork = self.artworks.get(&order.artwork_id).map(|art| ListedArtwork {
            id: art.id,
            owner_id: art.owner_id,
            price: art.price,
            available: art.available,
        });
        let balance_of = |id: &UserId| self.users.get(id).map(|user| user.account.balance);
        PurchaseSnapshot {
            buyer_id: order.buyer_id,
            artwork,
            buyer_balance: balance_of(&order.buyer_id),
            seller_balance: artwork.and_then(|art| balance_of(&art.owner_id)),
        }
    }

    fn set_balance(&mut self, id: &UserId, balance: Money) -> Result<(), PurchaseRejection> {
        let user = self
            .users
            .get_mut(id)
            .ok_or(PurchaseRejection::MissingOwner)?;
        user.account.balance = balance;
        Ok(())
    }

    fn apply_purchase(&mut self, order: &PurchaseOrder) -> Result<PurchaseReceipt, PurchaseRejection> {
        let settlement = settle(&self.snapshot(order))?;
        let artwork = self
            .artworks
            .get_mut(&order.artwork_id)
            .ok_or(PurchaseRejection::ArtworkNotFound)?;
        if !artwork.available {
            return Err(PurchaseRejection::AlreadySold);
        }
        artwork.available = false;

        self.set_balance(&settlement.buyer_id, settlement.buyer_balance_after)?;
        self.set_balance(&settlement.seller_id, settlement.seller_balance_after)?;

        if self
            .acquisitions
            .iter()
            .any(|entry| entry.artwork_id == order.artwork_id)
        {
            return Err(PurchaseRejection::AlreadySold);
        }
        self.acquisitions.push(Acquisition {
            id: order.acquisition_id,
            buyer_id: order.buyer_id,
            artwork_id: order.artwork_id,
            acquired_on: order.acquired_on,
        });

        Ok(PurchaseReceipt {
            acquisition_id: order.acquisition_id,
            artwork_id: order.artwork_id,
            price: settlement.price,
            remaining_balance: settlement.buyer_balance_after,
            acquired_on: order.acquired_on,
        })
    }
}

/// Shared in-memory market implementing the user, catalogue and ledger ports.
///
/// Clones share state.
#[derive(Clone)]
pub struct InMemoryMarketStore {
    state: Arc<Mutex<MarketState>>,
}

impl Default for InMemoryMarketStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryMarketStore {
    /// Create a store seeded with the catalogue authors.
    pub fn new() -> Self {
        let authors = SEED_AUTHORS
            .iter()
            .map(|(id, name)| {
                let id = AuthorId::from_uuid(Uuid::from_u128(*id));
                (
                    id,
                    Author {
                        id,
                        name: (*name).to_owned(),
                    },
                )
            })
            .collect();
        Self {
            state: Arc::new(Mutex::new(MarketState {
                authors,
                ..MarketState::default()
            })),
        }
    }

    /// Run `change` against a copy of the state and keep it only on success.
    async fn commit<T, E>(
        &self,
        change: impl FnOnce(&mut MarketState) -> Result<T, E>,
    ) -> Result<T, E> {
        let mut state = self.state.lock().await;
        let mut next = state.clone();
        let value = change(&mut next)?;
        *state = next;
        Ok(value)
    }

    /// Sum of every balance; used by invariant checks.
    pub async fn total_balance(&self) -> Option<Money> {
        let state = self.state.lock().await;
        state
            .users
            .values()
            .try_fold(Money::ZERO, |sum, user| sum.checked_add(user.account.balance))
    }

    /// Number of acquisitions recorded for `artwork`.
    pub async fn acquisition_count(&self, artwork: &ArtworkId) -> usize {
        let state = self.state.lock().await;
        state
            .acquisitions
            .iter()
            .filter(|entry| entry.artwork_id == *artwork)
            .count()
    }
}

#[async_trait]
impl UserRepository for InMemoryMarketStore {
    async fn create(&self, record: &NewUserRecord) -> Result<UserAccount, UserPersistenceError> {
        self.commit(|state| {
            if state.login_holder(&record.login).is_some() {
                return Err(UserPersistenceError::login_taken(record.login.as_str()));
            }
            let account = UserAccount {
                id: record.id,
                login: record.login.clone(),
                full_name: record.full_name.clone(),
                image: record.image.clone(),
                balance: Money::ZERO,
            };
            state.users.insert(
                record.id,
                StoredUser {
                    account: account.clone(),
                    password_hash: record.password_hash.clone(),
                },
            );
            Ok(account)
        })
        .await
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<UserAccount>, UserPersistenceError> {
        let state = self.state.lock().await;
        Ok(state.users.get(id).map(|user| user.account.clone()))
    }

    async fn find_credentials(
        &self,
        login: &LoginName,
    ) -> Result<Option<StoredCredentials>, UserPersistenceError> {
        let state = self.state.lock().await;
        Ok(state
            .users
            .values()
            .find(|user| user.account.login == *login)
            .map(|user| StoredCredentials {
                user_id: user.account.id,
                password_hash: user.password_hash.clone(),
            }))
    }

    async fn find_password_hash(
        &self,
        id: &UserId,
    ) -> Result<Option<PasswordHash>, UserPersistenceError> {
        let state = self.state.lock().await;
        Ok(state.users.get(id).map(|user| user.password_hash.clone()))
    }

    async fn update_profile(
        &self,
        id: &UserId,
        update: &ProfileUpdate,
    ) -> Result<Option<UserAccount>, UserPersistenceError> {
        self.commit(|state| {
            if state
                .login_holder(&update.login)
                .is_some_and(|holder| holder != *id)
            {
                return Err(UserPersistenceError::login_taken(update.login.as_str()));
            }
            let Some(user) = state.users.get_mut(id) else {
                return Ok(None);
            };
            user.account.login = update.login.clone();
            user.account.full_name = update.full_name.clone();
            if let Some(image) = &update.image {
                user.account.image = image.clone();
            }
            Ok(Some(user.account.clone()))
        })
        .await
    }
}

#[async_trait]
impl CatalogueRepository for InMemoryMarketStore {
    async fn list_authors(&self) -> Result<Vec<Author>, CatalogueRepositoryError> {
        let state = self.state.lock().await;
        let mut authors: Vec<Author> = state.authors.values().cloned().collect();
        authors.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        Ok(authors)
    }

    async fn find_author(&self, id: &AuthorId) -> Result<Option<Author>, CatalogueRepositoryError> {
        let state = self.state.lock().await;
        Ok(state.authors.get(id).cloned())
    }

    async fn create_artwork(&self, artwork: &Artwork) -> Result<(), CatalogueRepositoryError> {
        self.commit(|state| {
            if !state.authors.contains_key(&artwork.author_id) {
                return Err(CatalogueRepositoryError::unknown_author(
                    artwork.author_id.to_string(),
                ));
            }
            if !state.users.contains_key(&artwork.owner_id) {
                return Err(CatalogueRepositoryError::query(format!(
                    "owner {} does not exist",
                    artwork.owner_id
                )));
            }
            if state.artworks.contains_key(&artwork.id) {
                return Err(CatalogueRepositoryError::query(format!(
                    "artwork {} already exists",
                    artwork.id
                )));
            }
            state.artworks.insert(artwork.id, artwork.clone());
            Ok(())
        })
        .await
    }

    async fn find_artwork(
        &self,
        id: &ArtworkId,
    ) -> Result<Option<ArtworkSummary>, CatalogueRepositoryError> {
        let state = self.state.lock().await;
        Ok(state
            .artworks
            .get(id)
            .and_then(|artwork| state.summarise(artwork)))
    }

    async fn list_available(&self) -> Result<Vec<ArtworkSummary>, CatalogueRepositoryError> {
        let state = self.state.lock().await;
        Ok(state.summaries(state.artworks.values().filter(|art| art.available)))
    }

    async fn list_by_owner(
        &self,
        owner: &UserId,
    ) -> Result<Vec<ArtworkSummary>, CatalogueRepositoryError> {
        let state = self.state.lock().await;
        Ok(state.summaries(
            state
                .artworks
                .values()
                .filter(|art| art.owner_id == *owner),
        ))
    }

    async fn acquisitions_for(
        &self,
        buyer: &UserId,
    ) -> Result<Vec<OwnedAcquisition>, CatalogueRepositoryError> {
        let state = self.state.lock().await;
        let mut owned = Vec::new();
        for entry in state.acquisitions.iter().filter(|e| e.buyer_id == *buyer) {
            let artwork = state.artworks.get(&entry.artwork_id).ok_or_else(|| {
                CatalogueRepositoryError::query(format!(
                    "acquisition {} references a missing artwork",
                    entry.id
                ))
            })?;
            let author_name = state
                .authors
                .get(&artwork.author_id)
                .map(|author| author.name.clone())
                .ok_or_else(|| {
                    CatalogueRepositoryError::query(format!(
                        "artwork {} references a missing author",
                        artwork.id
                    ))
                })?;
            owned.push(OwnedAcquisition {
                acquisition_id: entry.id,
                artwork_id: artwork.id,
                title: artwork.title.clone(),
                author_name,
                price: artwork.price,
                published_on: artwork.published_on,
                acquired_on: entry.acquired_on,
                image: artwork.image.clone(),
            });
        }
        Ok(owned)
    }
}

#[async_trait]
impl LedgerRepository for InMemoryMarketStore {
    async fn purchase(
        &self,
        order: &PurchaseOrder,
    ) -> Result<PurchaseReceipt, LedgerRepositoryError> {
        self.commit(|state| state.apply_purchase(order))
            .await
            .map_err(LedgerRepositoryError::rejected)
    }

    async fn credit(&self, user: &UserId, amount: Money) -> Result<Money, LedgerRepositoryError> {
        self.commit(|state| {
            let stored = state
                .users
                .get_mut(user)
                .ok_or_else(LedgerRepositoryError::account_not_found)?;
            let balance = stored
                .account
                .balance
                .checked_add(amount)
                .ok_or_else(LedgerRepositoryError::balance_limit)?;
            stored.account.balance = balance;
            Ok(balance)
        })
        .await
    }
}
