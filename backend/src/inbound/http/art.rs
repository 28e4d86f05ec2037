//! Listing and purchase handlers.
//!
//! ```text
//! POST /api/art/create {"title":"…","authorId":"…","publicationDate":"1939-01-01","price":"30.00","image":"<base64>"}
//! POST /api/art/purchase/{artworkId}
//! ```

use actix_web::{HttpResponse, post, web};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::domain::ports::ListingRequest;
use crate::domain::{ArtworkId, AuthorId, Error, NewArtwork};
use crate::inbound::http::ApiResult;
use crate::inbound::http::bearer::AuthenticatedUser;
use crate::inbound::http::dto::{ArtworkResponse, PurchaseResponse};
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, parse_date, parse_image, parse_price, parse_title, parse_uuid, require_text,
};

const TITLE: FieldName = FieldName::new("title");
const AUTHOR_ID: FieldName = FieldName::new("authorId");
const PUBLICATION_DATE: FieldName = FieldName::new("publicationDate");
const PRICE: FieldName = FieldName::new("price");
const IMAGE: FieldName = FieldName::new("image");
const ARTWORK_ID: FieldName = FieldName::new("artworkId");

/// Listing body for `POST /api/art/create`.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateArtworkRequest {
    #[schema(example = "Las dos Fridas")]
    pub title: Option<String>,
    #[schema(example = "6f1c2a3e-0b1d-4c55-9a57-1d2f3b4c5d60")]
    pub author_id: Option<String>,
    /// ISO-8601 calendar date.
    #[schema(example = "1939-01-01")]
    pub publication_date: Option<String>,
    /// Non-negative amount as a JSON number or decimal string.
    #[schema(value_type = String, example = "30.00")]
    pub price: Option<serde_json::Value>,
    /// Base64 JPEG, optionally as a `data:` URL.
    pub image: Option<String>,
}

impl TryFrom<CreateArtworkRequest> for ListingRequest {
    type Error = Error;

    fn try_from(value: CreateArtworkRequest) -> Result<Self, Self::Error> {
        let title = parse_title(value.title, TITLE)?;
        let author = require_text(value.author_id, AUTHOR_ID)?;
        let author_id = AuthorId::from_uuid(parse_uuid(&author, AUTHOR_ID)?);
        let published_on = parse_date(value.publication_date, PUBLICATION_DATE)?;
        let price = parse_price(value.price, PRICE)?;
        let image = parse_image(value.image, IMAGE)?;
        Ok(Self {
            artwork: NewArtwork {
                title,
                author_id,
                published_on,
                price,
            },
            image,
        })
    }
}

/// List a new artwork for sale.
#[utoipa::path(
    post,
    path = "/api/art/create",
    request_body = CreateArtworkRequest,
    responses(
        (status = 201, description = "Artwork listed", body = ArtworkResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Author not found", body = ErrorSchema),
        (status = 502, description = "Image upload failed", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["art"],
    operation_id = "createArtwork"
)]
#[post("/art/create")]
pub async fn create_artwork(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    payload: web::Json<CreateArtworkRequest>,
) -> ApiResult<HttpResponse> {
    let request = ListingRequest::try_from(payload.into_inner())?;
    let artwork = state.listings.create_artwork(user.id(), request).await?;
    Ok(HttpResponse::Created().json(ArtworkResponse::from(artwork)))
}

/// Buy an artwork with the caller's balance.
#[utoipa::path(
    post,
    path = "/api/art/purchase/{artwork_id}",
    params(("artwork_id" = String, Path, description = "Artwork identifier")),
    responses(
        (status = 200, description = "Purchase committed", body = PurchaseResponse),
        (status = 400, description = "Self-purchase or insufficient funds", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Artwork or buyer not found", body = ErrorSchema),
        (status = 409, description = "Artwork already sold", body = ErrorSchema),
        (status = 503, description = "Store unavailable", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["art"],
    operation_id = "purchaseArtwork"
)]
#[post("/art/purchase/{artwork_id}")]
pub async fn purchase_artwork(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    path: web::Path<String>,
) -> ApiResult<web::Json<PurchaseResponse>> {
    let artwork_id = ArtworkId::from_uuid(parse_uuid(&path.into_inner(), ARTWORK_ID)?);
    let receipt = state.trades.purchase(user.id(), &artwork_id).await?;
    Ok(web::Json(receipt.into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use actix_web::http::StatusCode;
    use actix_web::test as actix_test;
    use chrono::NaiveDate;
    use rstest::rstest;
    use serde_json::{Value, json};

    use crate::domain::ports::{MockListingCommand, MockTradeCommand};
    use crate::domain::{
        AcquisitionId, Artwork, ImageRef, PurchaseReceipt, PurchaseRejection, UserId,
    };
    use crate::inbound::http::test_utils::{bearer_header, state_with, test_app, verifier_for};

    const AUTHOR: &str = "6f1c2a3e-0b1d-4c55-9a57-1d2f3b4c5d60";

    fn seller() -> UserId {
        UserId::new("3fa85f64-5717-4562-b3fc-2c963f66afa6").expect("fixture id")
    }

    async fn send(state: HttpState, request: actix_test::TestRequest) -> (StatusCode, Value) {
        let app = actix_test::init_service(test_app(state)).await;
        let response =
            actix_test::call_service(&app, request.insert_header(bearer_header()).to_request())
                .await;
        let status = response.status();
        let body = actix_test::read_body(response).await;
        (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
    }

    fn listing_payload() -> Value {
        json!({
            "title": "Las dos Fridas",
            "authorId": AUTHOR,
            "publicationDate": "1939-01-01",
            "price": 30,
            "image": "data:image/jpeg;base64,aW1hZ2U=",
        })
    }

    #[rstest]
    #[actix_web::test]
    async fn create_artwork_lists_for_the_caller() {
        let mut listings = MockListingCommand::new();
        listings
            .expect_create_artwork()
            .withf(|owner, request| {
                *owner == seller()
                    && request.artwork.title.as_str() == "Las dos Fridas"
                    && request.artwork.price.to_string() == "30.00"
                    && request.image.as_bytes() == b"image"
            })
            .returning(|owner, request| {
                let id = ArtworkId::random();
                Ok(Artwork {
                    id,
                    title: request.artwork.title,
                    author_id: request.artwork.author_id,
                    published_on: request.artwork.published_on,
                    available: true,
                    price: request.artwork.price,
                    image: ImageRef::new(format!("https://blobs.test/artworks/{id}.jpg"))
                        .expect("image"),
                    owner_id: *owner,
                })
            });
        let state = state_with(|ports| {
            ports.sessions = verifier_for(seller());
            ports.listings = Arc::new(listings);
        });

        let (status, body) = send(
            state,
            actix_test::TestRequest::post()
                .uri("/api/art/create")
                .set_json(listing_payload()),
        )
        .await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["available"], true);
        assert_eq!(body["price"], "30.00");
        assert_eq!(body["ownerId"], seller().to_string());
        assert_eq!(body["publishedOn"], "1939-01-01");
    }

    #[rstest]
    #[case("title", "missing_field")]
    #[case("authorId", "missing_field")]
    #[case("publicationDate", "missing_field")]
    #[case("price", "missing_field")]
    #[case("image", "missing_field")]
    #[actix_web::test]
    async fn every_listing_field_is_required(#[case] field: &str, #[case] code: &str) {
        let mut payload = listing_payload();
        payload
            .as_object_mut()
            .expect("object payload")
            .remove(field);
        let state = state_with(|ports| ports.sessions = verifier_for(seller()));

        let (status, body) = send(
            state,
            actix_test::TestRequest::post()
                .uri("/api/art/create")
                .set_json(payload),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["details"]["field"], field);
        assert_eq!(body["details"]["code"], code);
    }

    #[rstest]
    #[case("authorId", json!("not-a-uuid"), "invalid_uuid")]
    #[case("publicationDate", json!("1939-13-01"), "invalid_date")]
    #[case("price", json!("-1"), "invalid_price")]
    #[case("price", json!("9.999"), "invalid_price")]
    #[actix_web::test]
    async fn malformed_listing_fields_are_rejected(
        #[case] field: &str,
        #[case] value: Value,
        #[case] code: &str,
    ) {
        let mut payload = listing_payload();
        payload[field] = value;
        let state = state_with(|ports| ports.sessions = verifier_for(seller()));

        let (status, body) = send(
            state,
            actix_test::TestRequest::post()
                .uri("/api/art/create")
                .set_json(payload),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["details"]["code"], code);
    }

    #[rstest]
    #[actix_web::test]
    async fn purchase_returns_the_receipt() {
        let artwork_id = ArtworkId::random();
        let buyer = UserId::random();
        let mut trades = MockTradeCommand::new();
        trades
            .expect_purchase()
            .withf(move |who, what| *who == buyer && *what == artwork_id)
            .returning(|_, what| {
                Ok(PurchaseReceipt {
                    acquisition_id: AcquisitionId::random(),
                    artwork_id: *what,
                    price: "30".parse().expect("money"),
                    remaining_balance: "20".parse().expect("money"),
                    acquired_on: NaiveDate::from_ymd_opt(2026, 3, 1).expect("date"),
                })
            });
        let state = state_with(|ports| {
            ports.sessions = verifier_for(buyer);
            ports.trades = Arc::new(trades);
        });

        let (status, body) = send(
            state,
            actix_test::TestRequest::post().uri(&format!("/api/art/purchase/{artwork_id}")),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["remainingBalance"], "20.00");
        assert_eq!(body["artworkId"], artwork_id.to_string());
    }

    #[rstest]
    #[case(PurchaseRejection::ArtworkNotFound, StatusCode::NOT_FOUND)]
    #[case(PurchaseRejection::AlreadySold, StatusCode::CONFLICT)]
    #[case(PurchaseRejection::SelfPurchase, StatusCode::BAD_REQUEST)]
    #[case(PurchaseRejection::InsufficientFunds, StatusCode::BAD_REQUEST)]
    #[case(PurchaseRejection::MissingOwner, StatusCode::INTERNAL_SERVER_ERROR)]
    #[actix_web::test]
    async fn purchase_rejections_map_to_statuses(
        #[case] rejection: PurchaseRejection,
        #[case] expected: StatusCode,
    ) {
        let mut trades = MockTradeCommand::new();
        trades
            .expect_purchase()
            .returning(move |_, _| Err(rejection.into()));
        let state = state_with(|ports| {
            ports.sessions = verifier_for(seller());
            ports.trades = Arc::new(trades);
        });

        let (status, body) = send(
            state,
            actix_test::TestRequest::post()
                .uri(&format!("/api/art/purchase/{}", ArtworkId::random())),
        )
        .await;

        assert_eq!(status, expected);
        if expected != StatusCode::INTERNAL_SERVER_ERROR {
            assert_eq!(body["details"]["code"], rejection.reason());
        }
    }

    #[rstest]
    #[actix_web::test]
    async fn purchase_paths_must_be_uuids() {
        let mut trades = MockTradeCommand::new();
        trades.expect_purchase().never();
        let state = state_with(|ports| {
            ports.sessions = verifier_for(seller());
            ports.trades = Arc::new(trades);
        });

        let (status, body) = send(
            state,
            actix_test::TestRequest::post().uri("/api/art/purchase/42"),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["details"]["field"], "artworkId");
    }
}
