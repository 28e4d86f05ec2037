//! PostgreSQL-backed `CatalogueRepository` implementation using Diesel ORM.
//!
//! Gallery reads run outside any transaction and take no locks.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{CatalogueRepository, CatalogueRepositoryError};
use crate::domain::{
    AcquisitionId, Artwork, ArtworkId, ArtworkSummary, ArtworkTitle, Author, AuthorId, FullName,
    ImageRef, LoginName, Money, OwnedAcquisition, UserId,
};

use super::diesel_error_mapping::{
    Violation, classify_violation, map_basic_diesel_error, map_basic_pool_error,
};
use super::models::{ArtworkRow, AuthorRow, NewArtworkRow};
use super::pool::{DbPool, PoolError};
use super::schema::{acquisitions, artworks, authors, users};

/// Artwork joined with author name, owner login and owner name.
type SummaryRow = (ArtworkRow, String, String, String);

/// Acquisition id and date joined with the artwork and author name.
type AcquisitionRow = (Uuid, chrono::NaiveDate, ArtworkRow, String);

/// Diesel-backed implementation of the catalogue port.
#[derive(Clone)]
pub struct DieselCatalogueRepository {
    pool: DbPool,
}

impl DieselCatalogueRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> CatalogueRepositoryError {
    map_basic_pool_error(error, CatalogueRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> CatalogueRepositoryError {
    map_basic_diesel_error(
        error,
        CatalogueRepositoryError::query,
        CatalogueRepositoryError::connection,
    )
}

fn corrupt(what: &str, err: impl std::fmt::Display) -> CatalogueRepositoryError {
    CatalogueRepositoryError::query(format!("stored {what} is invalid: {err}"))
}

fn row_to_artwork(row: ArtworkRow) -> Result<Artwork, CatalogueRepositoryError> {
    Ok(Artwork {
        id: ArtworkId::from_uuid(row.id),
        title: ArtworkTitle::new(row.title).map_err(|err| corrupt("artwork title", err))?,
        author_id: AuthorId::from_uuid(row.author_id),
        published_on: row.published_on,
        available: row.available,
        price: Money::new(row.price).map_err(|err| corrupt("artwork price", err))?,
        image: ImageRef::new(row.image_ref).map_err(|err| corrupt("artwork image", err))?,
        owner_id: UserId::from_uuid(row.owner_id),
    })
}

fn row_to_summary(
    (artwork, author_name, owner_login, owner_name): SummaryRow,
) -> Result<ArtworkSummary, CatalogueRepositoryError> {
    let artwork = row_to_artwork(artwork)?;
    Ok(ArtworkSummary {
        id: artwork.id,
        title: artwork.title,
        author_id: artwork.author_id,
        author_name,
        published_on: artwork.published_on,
        available: artwork.available,
        price: artwork.price,
        image: artwork.image,
        owner_id: artwork.owner_id,
        owner_login: LoginName::new(owner_login).map_err(|err| corrupt("owner login", err))?,
        owner_name: FullName::new(owner_name).map_err(|err| corrupt("owner name", err))?,
    })
}

fn row_to_owned(
    (acquisition_id, acquired_on, artwork, author_name): AcquisitionRow,
) -> Result<OwnedAcquisition, CatalogueRepositoryError> {
    let artwork = row_to_artwork(artwork)?;
    Ok(OwnedAcquisition {
        acquisition_id: AcquisitionId::from_uuid(acquisition_id),
        artwork_id: artwork.id,
        title: artwork.title,
        author_name,
        price: artwork.price,
        published_on: artwork.published_on,
        acquired_on,
        image: artwork.image,
    })
}

fn collect<R, T>(
    rows: Vec<R>,
    convert: fn(R) -> Result<T, CatalogueRepositoryError>,
) -> Result<Vec<T>, CatalogueRepositoryError> {
    rows.into_iter().map(convert).collect()
}

#[async_trait]
impl CatalogueRepository for DieselCatalogueRepository {
    async fn list_authors(&self) -> Result<Vec<Author>, CatalogueRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<AuthorRow> = authors::table
            .select(AuthorRow::as_select())
            .order_by((authors::name, authors::id))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows
            .into_iter()
            .map(|row| Author {
                id: AuthorId::from_uuid(row.id),
                name: row.name,
            })
            .collect())
    }

    async fn find_author(&self, id: &AuthorId) -> Result<Option<Author>, CatalogueRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = authors::table
            .filter(authors::id.eq(id.as_uuid()))
            .select(AuthorRow::as_select())
            .first::<AuthorRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(|row| Author {
            id: AuthorId::from_uuid(row.id),
            name: row.name,
        }))
    }

    async fn create_artwork(&self, artwork: &Artwork) -> Result<(), CatalogueRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewArtworkRow {
            id: *artwork.id.as_uuid(),
            title: artwork.title.as_str(),
            author_id: *artwork.author_id.as_uuid(),
            published_on: artwork.published_on,
            available: artwork.available,
            price: artwork.price.as_decimal(),
            image_ref: artwork.image.as_str(),
            owner_id: *artwork.owner_id.as_uuid(),
        };

        diesel::insert_into(artworks::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|err| match classify_violation(&err) {
                Some(Violation::ForeignKey(constraint))
                    if constraint.is_none_or(|name| name.contains("author")) =>
                {
                    CatalogueRepositoryError::unknown_author(artwork.author_id.to_string())
                }
                _ => map_diesel_error(err),
            })
    }

    async fn find_artwork(
        &self,
        id: &ArtworkId,
    ) -> Result<Option<ArtworkSummary>, CatalogueRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = artworks::table
            .inner_join(authors::table)
            .inner_join(users::table)
            .filter(artworks::id.eq(id.as_uuid()))
            .select((
                ArtworkRow::as_select(),
                authors::name,
                users::login,
                users::full_name,
            ))
            .first::<SummaryRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_summary).transpose()
    }

    async fn list_available(&self) -> Result<Vec<ArtworkSummary>, CatalogueRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<SummaryRow> = artworks::table
            .inner_join(authors::table)
            .inner_join(users::table)
            .filter(artworks::available.eq(true))
            .order_by((artworks::title, artworks::id))
            .select((
                ArtworkRow::as_select(),
                authors::name,
                users::login,
                users::full_name,
            ))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        collect(rows, row_to_summary)
    }

    async fn list_by_owner(
        &self,
        owner: &UserId,
    ) -> Result<Vec<ArtworkSummary>, CatalogueRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<SummaryRow> = artworks::table
            .inner_join(authors::table)
            .inner_join(users::table)
            .filter(artworks::owner_id.eq(owner.as_uuid()))
            .order_by((artworks::title, artworks::id))
            .select((
                ArtworkRow::as_select(),
                authors::name,
                users::login,
                users::full_name,
            ))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        collect(rows, row_to_summary)
    }

    async fn acquisitions_for(
        &self,
        buyer: &UserId,
    ) -> Result<Vec<OwnedAcquisition>, CatalogueRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<AcquisitionRow> = acquisitions::table
            .inner_join(artworks::table.inner_join(authors::table))
            .filter(acquisitions::buyer_id.eq(buyer.as_uuid()))
            .order_by((acquisitions::acquired_on, acquisitions::id))
            .select((
                acquisitions::id,
                acquisitions::acquired_on,
                ArtworkRow::as_select(),
                authors::name,
            ))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        collect(rows, row_to_owned)
    }
}
