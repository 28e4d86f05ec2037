//! PostgreSQL-backed `UserRepository` implementation using Diesel ORM.
//!
//! Login uniqueness is enforced by `users_login_key`; a violation maps to
//! [`UserPersistenceError::LoginTaken`] so registration and profile edits
//! have no read-then-write window.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use rust_decimal::Decimal;

use crate::domain::ports::{NewUserRecord, ProfileUpdate, UserPersistenceError, UserRepository};
use crate::domain::{
    FullName, ImageRef, LoginName, Money, PasswordHash, StoredCredentials, UserAccount, UserId,
};

use super::diesel_error_mapping::{
    Violation, classify_violation, map_basic_diesel_error, map_basic_pool_error,
};
use super::models::{CredentialRow, NewUserRow, ProfileChangeset, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::users;

/// Diesel-backed implementation of the identity store.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> UserPersistenceError {
    map_basic_pool_error(error, UserPersistenceError::connection)
}

/// Map Diesel errors, turning the login constraint into `LoginTaken`.
fn map_diesel_error(error: diesel::result::Error, login: &str) -> UserPersistenceError {
    if let Some(Violation::Unique(_)) = classify_violation(&error) {
        return UserPersistenceError::login_taken(login);
    }
    map_basic_diesel_error(
        error,
        UserPersistenceError::query,
        UserPersistenceError::connection,
    )
}

fn map_read_error(error: diesel::result::Error) -> UserPersistenceError {
    map_basic_diesel_error(
        error,
        UserPersistenceError::query,
        UserPersistenceError::connection,
    )
}

/// Convert a database row into a validated domain account.
pub(super) fn row_to_account(row: UserRow) -> Result<UserAccount, UserPersistenceError> {
    let UserRow {
        id,
        login,
        full_name,
        image_ref,
        balance,
    } = row;
    let corrupt = |field: &str, err: &dyn std::fmt::Display| {
        UserPersistenceError::query(format!("stored user {id} has invalid {field}: {err}"))
    };

    Ok(UserAccount {
        id: UserId::from_uuid(id),
        login: LoginName::new(login).map_err(|err| corrupt("login", &err))?,
        full_name: FullName::new(full_name).map_err(|err| corrupt("full name", &err))?,
        image: ImageRef::new(image_ref).map_err(|err| corrupt("image", &err))?,
        balance: Money::new(balance).map_err(|err| corrupt("balance", &err))?,
    })
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn create(&self, record: &NewUserRecord) -> Result<UserAccount, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewUserRow {
            id: *record.id.as_uuid(),
            login: record.login.as_str(),
            full_name: record.full_name.as_str(),
            password_hash: record.password_hash.as_str(),
            image_ref: record.image.as_str(),
            balance: Decimal::ZERO,
        };

        let inserted = diesel::insert_into(users::table)
            .values(&row)
            .returning(UserRow::as_returning())
            .get_result::<UserRow>(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, record.login.as_str()))?;
        row_to_account(inserted)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<UserAccount>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = users::table
            .filter(users::id.eq(id.as_uuid()))
            .select(UserRow::as_select())
            .first::<UserRow>(&mut conn)
            .await
            .optional()
            .map_err(map_read_error)?;
        row.map(row_to_account).transpose()
    }

    async fn find_credentials(
        &self,
        login: &LoginName,
    ) -> Result<Option<StoredCredentials>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = users::table
            .filter(users::login.eq(login.as_str()))
            .select(CredentialRow::as_select())
            .first::<CredentialRow>(&mut conn)
            .await
            .optional()
            .map_err(map_read_error)?;
        Ok(row.map(|row| StoredCredentials {
            user_id: UserId::from_uuid(row.id),
            password_hash: PasswordHash::from_phc(row.password_hash),
        }))
    }

    async fn find_password_hash(
        &self,
        id: &UserId,
    ) -> Result<Option<PasswordHash>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let hash = users::table
            .filter(users::id.eq(id.as_uuid()))
            .select(users::password_hash)
            .first::<String>(&mut conn)
            .await
            .optional()
            .map_err(map_read_error)?;
        Ok(hash.map(PasswordHash::from_phc))
    }

    async fn update_profile(
        &self,
        id: &UserId,
        update: &ProfileUpdate,
    ) -> Result<Option<UserAccount>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let changeset = ProfileChangeset {
            login: update.login.as_str(),
            full_name: update.full_name.as_str(),
            image_ref: update.image.as_ref().map(ImageRef::as_str),
        };

        let row = diesel::update(users::table.filter(users::id.eq(id.as_uuid())))
            .set(&changeset)
            .returning(UserRow::as_returning())
            .get_result::<UserRow>(&mut conn)
            .await
            .optional()
            .map_err(|err| map_diesel_error(err, update.login.as_str()))?;
        row.map(row_to_account).transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use diesel::result::{DatabaseErrorKind, Error as DieselError};
    use rstest::rstest;
    use uuid::Uuid;

    fn row(login: &str, balance: Decimal) -> UserRow {
        UserRow {
            id: Uuid::new_v4(),
            login: login.to_owned(),
            full_name: "Frida Kahlo".to_owned(),
            image_ref: "/images/profiles/frida_profile.jpg".to_owned(),
            balance,
        }
    }

    #[rstest]
    fn valid_rows_convert_to_accounts() {
        let account = row_to_account(row("frida", Decimal::new(10050, 2))).expect("valid row");
        assert_eq!(account.login.as_str(), "frida");
        assert_eq!(account.balance.to_string(), "100.50");
    }

    #[rstest]
    #[case(row("has space", Decimal::ZERO))]
    #[case(row("frida", Decimal::new(-1, 2)))]
    fn corrupt_rows_are_query_errors(#[case] bad: UserRow) {
        let error = row_to_account(bad).expect_err("corrupt row");
        assert!(matches!(error, UserPersistenceError::Query { .. }));
    }

    #[rstest]
    fn unique_violation_maps_to_login_taken() {
        let error = DieselError::DatabaseError(
            DatabaseErrorKind::UniqueViolation,
            Box::new("duplicate key value violates unique constraint".to_owned()),
        );
        assert_eq!(
            map_diesel_error(error, "frida"),
            UserPersistenceError::login_taken("frida")
        );
    }

    #[rstest]
    fn pool_failures_map_to_connection() {
        let error = map_pool_error(PoolError::checkout("timed out"));
        assert_eq!(error, UserPersistenceError::connection("timed out"));
    }
}
