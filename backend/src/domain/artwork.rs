//! Catalogue entities: authors and listed artworks.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{FullName, ImageRef, LoginName, Money, UserId};

/// Maximum title length, matching the `artworks.title` column.
pub const TITLE_MAX: usize = 150;

/// Validation errors for catalogue fields.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ArtworkValidationError {
    /// Identifier was not a UUID.
    #[error("identifier must be a valid UUID")]
    InvalidId,
    /// Title was blank.
    #[error("title must not be empty")]
    EmptyTitle,
    /// Title exceeded [`TITLE_MAX`] characters.
    #[error("title must be at most {max} characters")]
    TitleTooLong {
        /// Allowed maximum.
        max: usize,
    },
    /// Publication date was not `YYYY-MM-DD`.
    #[error("publication date must be an ISO-8601 calendar date (YYYY-MM-DD)")]
    InvalidDate,
}

macro_rules! uuid_identifier {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(Uuid);

        impl $name {
            /// Parse an identifier from text.
            pub fn new(id: impl AsRef<str>) -> Result<Self, ArtworkValidationError> {
                Uuid::parse_str(id.as_ref())
                    .map(Self)
                    .map_err(|_| ArtworkValidationError::InvalidId)
            }

            /// Wrap an existing UUID.
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Generate a new random identifier.
            pub fn random() -> Self {
                Self(Uuid::new_v4())
            }

            /// Access the underlying UUID.
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0.to_string()
            }
        }

        impl TryFrom<String> for $name {
            type Error = ArtworkValidationError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }
    };
}

uuid_identifier! {
    /// Artwork identifier.
    ArtworkId
}

uuid_identifier! {
    /// Author identifier.
    AuthorId
}

/// Artwork title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ArtworkTitle(String);

impl ArtworkTitle {
    /// Validate and construct a title. Surrounding whitespace is trimmed.
    pub fn new(title: impl AsRef<str>) -> Result<Self, ArtworkValidationError> {
        let trimmed = title.as_ref().trim();
        if trimmed.is_empty() {
            return Err(ArtworkValidationError::EmptyTitle);
        }
        if trimmed.chars().count() > TITLE_MAX {
            return Err(ArtworkValidationError::TitleTooLong { max: TITLE_MAX });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the title text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<ArtworkTitle> for String {
    fn from(value: ArtworkTitle) -> Self {
        value.0
    }
}

impl TryFrom<String> for ArtworkTitle {
    type Error = ArtworkValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Parse a `YYYY-MM-DD` publication date.
pub fn parse_publication_date(raw: &str) -> Result<NaiveDate, ArtworkValidationError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| ArtworkValidationError::InvalidDate)
}

/// Catalogue attribution entity; not a registered user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    /// Identifier.
    pub id: AuthorId,
    /// Display name.
    pub name: String,
}

/// A listed artwork.
///
/// ## Invariants
/// - Once `available` is false it stays false.
/// - `price` is non-negative with two fractional digits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Artwork {
    /// Identifier.
    pub id: ArtworkId,
    /// Title.
    pub title: ArtworkTitle,
    /// Attributed author.
    pub author_id: AuthorId,
    /// Publication date.
    pub published_on: NaiveDate,
    /// Whether the artwork is still for sale.
    pub available: bool,
    /// Asking price.
    pub price: Money,
    /// Uploaded image.
    pub image: ImageRef,
    /// User who listed the artwork.
    pub owner_id: UserId,
}

/// Validated listing request before the image is uploaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewArtwork {
    /// Title.
    pub title: ArtworkTitle,
    /// Attributed author.
    pub author_id: AuthorId,
    /// Publication date.
    pub published_on: NaiveDate,
    /// Asking price.
    pub price: Money,
}

/// Artwork joined with its author and owner for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtworkSummary {
    /// Identifier.
    pub id: ArtworkId,
    /// Title.
    pub title: ArtworkTitle,
    /// Author identifier.
    pub author_id: AuthorId,
    /// Author display name.
    pub author_name: String,
    /// Publication date.
    pub published_on: NaiveDate,
    /// Whether the artwork is still for sale.
    pub available: bool,
    /// Asking price.
    pub price: Money,
    /// Uploaded image.
    pub image: ImageRef,
    /// Listing user.
    pub owner_id: UserId,
    /// Listing user's login.
    pub owner_login: LoginName,
    /// Listing user's display name.
    pub owner_name: FullName,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("2021-03-04", true)]
    #[case(" 1907-07-06 ", true)]
    #[case("2021-02-30", false)]
    #[case("04/03/2021", false)]
    #[case("", false)]
    fn publication_date_parsing(#[case] raw: &str, #[case] ok: bool) {
        assert_eq!(parse_publication_date(raw).is_ok(), ok);
    }

    #[rstest]
    #[case("", Err(ArtworkValidationError::EmptyTitle))]
    #[case("  Las dos Fridas ", Ok("Las dos Fridas"))]
    fn title_validation(#[case] raw: &str, #[case] expected: Result<&str, ArtworkValidationError>) {
        let parsed = ArtworkTitle::new(raw);
        assert_eq!(parsed.as_ref().map(ArtworkTitle::as_str), expected.as_ref().map(|s| *s));
    }

    #[test]
    fn identifiers_reject_non_uuid_text() {
        assert_eq!(ArtworkId::new("42"), Err(ArtworkValidationError::InvalidId));
        assert_eq!(AuthorId::new(""), Err(ArtworkValidationError::InvalidId));
    }
}
