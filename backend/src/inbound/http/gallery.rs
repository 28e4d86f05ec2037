//! Gallery read handlers.
//!
//! ```text
//! GET /api/gallery
//! GET /api/gallery/{artworkId}
//! GET /api/my-art
//! GET /api/authors
//! ```

use actix_web::{get, web};

use crate::domain::ArtworkId;
use crate::inbound::http::ApiResult;
use crate::inbound::http::bearer::AuthenticatedUser;
use crate::inbound::http::dto::{ArtworkSummaryResponse, AuthorResponse};
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_uuid};

const ARTWORK_ID: FieldName = FieldName::new("artworkId");

fn summaries<T, U: From<T>>(items: Vec<T>) -> Vec<U> {
    items.into_iter().map(U::from).collect()
}

/// Artworks currently for sale, sorted by title.
#[utoipa::path(
    get,
    path = "/api/gallery",
    responses(
        (status = 200, description = "Available artworks", body = [ArtworkSummaryResponse]),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 503, description = "Store unavailable", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["gallery"],
    operation_id = "listGallery"
)]
#[get("/gallery")]
pub async fn list_gallery(
    state: web::Data<HttpState>,
    _user: AuthenticatedUser,
) -> ApiResult<web::Json<Vec<ArtworkSummaryResponse>>> {
    let artworks = state.gallery.list_available().await?;
    Ok(web::Json(summaries(artworks)))
}

/// One artwork, sold or not.
#[utoipa::path(
    get,
    path = "/api/gallery/{artwork_id}",
    params(("artwork_id" = String, Path, description = "Artwork identifier")),
    responses(
        (status = 200, description = "Artwork", body = ArtworkSummaryResponse),
        (status = 400, description = "Invalid identifier", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Artwork not found", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["gallery"],
    operation_id = "getArtwork"
)]
#[get("/gallery/{artwork_id}")]
pub async fn get_artwork(
    state: web::Data<HttpState>,
    _user: AuthenticatedUser,
    path: web::Path<String>,
) -> ApiResult<web::Json<ArtworkSummaryResponse>> {
    let id = ArtworkId::from_uuid(parse_uuid(&path.into_inner(), ARTWORK_ID)?);
    let artwork = state.gallery.get_artwork(&id).await?;
    Ok(web::Json(artwork.into()))
}

/// Artworks the caller has listed.
#[utoipa::path(
    get,
    path = "/api/my-art",
    responses(
        (status = 200, description = "Caller's listings", body = [ArtworkSummaryResponse]),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["gallery"],
    operation_id = "listMyArt"
)]
#[get("/my-art")]
pub async fn list_my_art(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
) -> ApiResult<web::Json<Vec<ArtworkSummaryResponse>>> {
    let artworks = state.gallery.list_listed_by(user.id()).await?;
    Ok(web::Json(summaries(artworks)))
}

#[utoipa::path(
    get,
    path = "/api/authors",
    responses(
        (status = 200, description = "Authors by name", body = [AuthorResponse]),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["gallery"],
    operation_id = "listAuthors"
)]
#[get("/authors")]
pub async fn list_authors(
    state: web::Data<HttpState>,
    _user: AuthenticatedUser,
) -> ApiResult<web::Json<Vec<AuthorResponse>>> {
    let authors = state.gallery.list_authors().await?;
    Ok(web::Json(summaries(authors)))
}
