//! Integration tests for `DieselLedgerRepository` against embedded PostgreSQL.
//!
//! Each test starts its own cluster, applies the embedded migrations and
//! drives the repositories through a Tokio runtime owned by the test
//! context. Purchases are checked end to end: row locks, the conditional
//! availability flip, the guarded debit and rollback of the whole unit.

use std::sync::Arc;

use chrono::NaiveDate;
use diesel::pg::PgConnection;
use diesel::sql_types::{BigInt, Date, Uuid as SqlUuid};
use diesel::{Connection as _, QueryableByName, RunQueryDsl as _};
use futures_util::future::join_all;
use pg_embedded_setup_unpriv::TestCluster;
use rstest::{fixture, rstest};
use tokio::runtime::Runtime;

use artmarket::domain::ports::{
    CatalogueRepository, LedgerRepository, LedgerRepositoryError, NewUserRecord, PurchaseOrder,
    UserRepository,
};
use artmarket::domain::{
    AcquisitionId, Artwork, ArtworkId, ArtworkTitle, AuthorId, FullName, ImageRef, LoginName,
    Money, PasswordHash, PurchaseRejection, UserId,
};
use artmarket::outbound::persistence::{
    DbPool, DieselCatalogueRepository, DieselLedgerRepository, DieselUserRepository, PoolConfig,
    run_pending_migrations,
};

#[path = "support/pg_embed.rs"]
mod pg_embed;

use pg_embed::{handle_cluster_setup_failure, test_cluster};

const FRIDA_KAHLO: &str = "6f1c2a3e-0b1d-4c55-9a57-1d2f3b4c5d60";

#[derive(QueryableByName)]
struct CountRow {
    #[diesel(sql_type = BigInt)]
    count: i64,
}

struct LedgerContext {
    runtime: Runtime,
    database_url: String,
    users: DieselUserRepository,
    catalogue: DieselCatalogueRepository,
    ledger: Arc<DieselLedgerRepository>,
    _cluster: TestCluster,
}

fn money(text: &str) -> Money {
    text.parse().expect("valid amount")
}

fn setup_context() -> Result<LedgerContext, String> {
    let runtime = Runtime::new().map_err(|err| err.to_string())?;
    let cluster = test_cluster()?;
    let database_url = cluster.connection().database_url("postgres");
    run_pending_migrations(&database_url).map_err(|err| err.to_string())?;

    let config = PoolConfig::new(&database_url)
        .with_max_size(8)
        .with_min_idle(Some(1));
    let pool = runtime
        .block_on(async { DbPool::new(config).await })
        .map_err(|err| err.to_string())?;

    Ok(LedgerContext {
        runtime,
        database_url,
        users: DieselUserRepository::new(pool.clone()),
        catalogue: DieselCatalogueRepository::new(pool.clone()),
        ledger: Arc::new(DieselLedgerRepository::new(pool)),
        _cluster: cluster,
    })
}

#[fixture]
fn ledger_context() -> Option<LedgerContext> {
    match setup_context() {
        Ok(ctx) => Some(ctx),
        Err(reason) => handle_cluster_setup_failure(reason),
    }
}

impl LedgerContext {
    fn user(&self, login: &str, balance: &str) -> UserId {
        let record = NewUserRecord {
            id: UserId::random(),
            login: LoginName::new(login).expect("login"),
            full_name: FullName::new(format!("{login} Example")).expect("name"),
            password_hash: PasswordHash::from_phc("$argon2id$stub"),
            image: ImageRef::new(format!("/images/profiles/{login}_profile.jpg")).expect("image"),
        };
        let account = self
            .runtime
            .block_on(self.users.create(&record))
            .expect("create user");
        let amount = money(balance);
        if !amount.is_zero() {
            self.runtime
                .block_on(self.ledger.credit(&account.id, amount))
                .expect("credit");
        }
        account.id
    }

    fn listing(&self, owner: UserId, price: &str) -> ArtworkId {
        let id = ArtworkId::random();
        let artwork = Artwork {
            id,
            title: ArtworkTitle::new("Las dos Fridas").expect("title"),
            author_id: AuthorId::new(FRIDA_KAHLO).expect("seeded author"),
            published_on: NaiveDate::from_ymd_opt(1939, 1, 1).expect("date"),
            available: true,
            price: money(price),
            image: ImageRef::new(format!("/images/artworks/{id}.jpg")).expect("image"),
            owner_id: owner,
        };
        self.runtime
            .block_on(self.catalogue.create_artwork(&artwork))
            .expect("create artwork");
        id
    }

    fn balance(&self, user: &UserId) -> Money {
        self.runtime
            .block_on(self.users.find_by_id(user))
            .expect("lookup")
            .expect("user exists")
            .balance
    }

    fn available(&self, artwork: &ArtworkId) -> bool {
        self.runtime
            .block_on(self.catalogue.find_artwork(artwork))
            .expect("lookup")
            .expect("artwork exists")
            .available
    }

    fn connection(&self) -> PgConnection {
        PgConnection::establish(&self.database_url).expect("sync connection")
    }

    fn acquisition_count(&self, artwork: &ArtworkId) -> i64 {
        diesel::sql_query("SELECT COUNT(*) AS count FROM acquisitions WHERE artwork_id = $1")
            .bind::<SqlUuid, _>(*artwork.as_uuid())
            .get_result::<CountRow>(&mut self.connection())
            .expect("count acquisitions")
            .count
    }

    /// Record a sale behind the ledger's back, leaving the artwork listed.
    fn plant_acquisition(&self, artwork: &ArtworkId, buyer: &UserId) {
        diesel::sql_query(
            "INSERT INTO acquisitions (id, buyer_id, artwork_id, acquired_on) \
             VALUES ($1, $2, $3, $4)",
        )
        .bind::<SqlUuid, _>(*AcquisitionId::random().as_uuid())
        .bind::<SqlUuid, _>(*buyer.as_uuid())
        .bind::<SqlUuid, _>(*artwork.as_uuid())
        .bind::<Date, _>(acquired_on())
        .execute(&mut self.connection())
        .expect("plant acquisition");
    }
}

fn acquired_on() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 1, 1).expect("date")
}

fn order(buyer: UserId, artwork: ArtworkId) -> PurchaseOrder {
    PurchaseOrder {
        buyer_id: buyer,
        artwork_id: artwork,
        acquisition_id: AcquisitionId::random(),
        acquired_on: acquired_on(),
    }
}

#[rstest]
fn purchase_moves_price_and_ownership(ledger_context: Option<LedgerContext>) {
    let Some(ctx) = ledger_context else {
        return;
    };
    let alice = ctx.user("alice", "100.00");
    let bob = ctx.user("bob", "50.00");
    let artwork = ctx.listing(alice, "30.00");

    let receipt = ctx
        .runtime
        .block_on(ctx.ledger.purchase(&order(bob, artwork)))
        .expect("purchase succeeds");

    assert_eq!(receipt.remaining_balance.to_string(), "20.00");
    assert_eq!(ctx.balance(&bob).to_string(), "20.00");
    assert_eq!(ctx.balance(&alice).to_string(), "130.00");
    assert!(!ctx.available(&artwork));
    assert_eq!(ctx.acquisition_count(&artwork), 1);

    let owned = ctx
        .runtime
        .block_on(ctx.catalogue.acquisitions_for(&bob))
        .expect("acquisitions");
    let ids: Vec<ArtworkId> = owned.iter().map(|entry| entry.artwork_id).collect();
    assert_eq!(ids, vec![artwork]);
}

#[rstest]
fn insufficient_funds_change_nothing(ledger_context: Option<LedgerContext>) {
    let Some(ctx) = ledger_context else {
        return;
    };
    let alice = ctx.user("alice", "0.00");
    let bob = ctx.user("bob", "29.99");
    let artwork = ctx.listing(alice, "30.00");

    let error = ctx
        .runtime
        .block_on(ctx.ledger.purchase(&order(bob, artwork)))
        .expect_err("purchase rejected");

    assert_eq!(
        error,
        LedgerRepositoryError::rejected(PurchaseRejection::InsufficientFunds)
    );
    assert_eq!(ctx.balance(&bob).to_string(), "29.99");
    assert_eq!(ctx.balance(&alice).to_string(), "0.00");
    assert!(ctx.available(&artwork));
    assert_eq!(ctx.acquisition_count(&artwork), 0);
}

#[rstest]
fn concurrent_buyers_yield_exactly_one_sale(ledger_context: Option<LedgerContext>) {
    let Some(ctx) = ledger_context else {
        return;
    };
    let seller = ctx.user("seller", "0.00");
    let artwork = ctx.listing(seller, "30.00");
    let buyers: Vec<UserId> = (0..5)
        .map(|n| ctx.user(&format!("buyer{n}"), "50.00"))
        .collect();

    let outcomes = ctx.runtime.block_on(join_all(buyers.iter().map(|buyer| {
        let ledger = Arc::clone(&ctx.ledger);
        let order = order(*buyer, artwork);
        async move { ledger.purchase(&order).await }
    })));

    let sold = outcomes.iter().filter(|outcome| outcome.is_ok()).count();
    assert_eq!(sold, 1, "{outcomes:?}");
    for outcome in outcomes.iter().filter_map(|outcome| outcome.as_ref().err()) {
        assert_eq!(
            outcome,
            &LedgerRepositoryError::rejected(PurchaseRejection::AlreadySold)
        );
    }
    assert_eq!(ctx.acquisition_count(&artwork), 1);
    assert_eq!(ctx.balance(&seller).to_string(), "30.00");

    let remaining: Vec<String> = buyers
        .iter()
        .map(|buyer| ctx.balance(buyer).to_string())
        .collect();
    assert_eq!(remaining.iter().filter(|b| b.as_str() == "20.00").count(), 1);
    assert_eq!(remaining.iter().filter(|b| b.as_str() == "50.00").count(), 4);
}

#[rstest]
fn failed_acquisition_insert_rolls_back_the_whole_purchase(
    ledger_context: Option<LedgerContext>,
) {
    let Some(ctx) = ledger_context else {
        return;
    };
    let alice = ctx.user("alice", "0.00");
    let bob = ctx.user("bob", "50.00");
    let carol = ctx.user("carol", "0.00");
    let artwork = ctx.listing(alice, "30.00");
    ctx.plant_acquisition(&artwork, &carol);

    let error = ctx
        .runtime
        .block_on(ctx.ledger.purchase(&order(bob, artwork)))
        .expect_err("duplicate acquisition");

    assert_eq!(
        error,
        LedgerRepositoryError::rejected(PurchaseRejection::AlreadySold)
    );
    assert_eq!(ctx.balance(&bob).to_string(), "50.00");
    assert_eq!(ctx.balance(&alice).to_string(), "0.00");
    assert!(ctx.available(&artwork), "availability flip rolled back");
    assert_eq!(ctx.acquisition_count(&artwork), 1);
}

#[rstest]
fn repeat_purchase_is_rejected_without_balance_change(ledger_context: Option<LedgerContext>) {
    let Some(ctx) = ledger_context else {
        return;
    };
    let alice = ctx.user("alice", "0.00");
    let bob = ctx.user("bob", "50.00");
    let carol = ctx.user("carol", "50.00");
    let artwork = ctx.listing(alice, "30.00");
    ctx.runtime
        .block_on(ctx.ledger.purchase(&order(bob, artwork)))
        .expect("first purchase");

    let error = ctx
        .runtime
        .block_on(ctx.ledger.purchase(&order(carol, artwork)))
        .expect_err("already sold");

    assert_eq!(
        error,
        LedgerRepositoryError::rejected(PurchaseRejection::AlreadySold)
    );
    assert_eq!(ctx.balance(&carol).to_string(), "50.00");
    assert_eq!(ctx.balance(&alice).to_string(), "30.00");
}
