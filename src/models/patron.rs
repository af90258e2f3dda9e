//! Patron model and related types

use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, FromRow, Postgres};
use utoipa::ToSchema;
use validator::Validate;

/// Patron borrowing status, stored as a two-letter code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum PatronStatus {
    /// No open borrows
    #[serde(rename = "IN")]
    Inactive,
    /// At least one open borrow
    #[serde(rename = "AC")]
    Active,
}

impl PatronStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PatronStatus::Inactive => "IN",
            PatronStatus::Active => "AC",
        }
    }
}

impl std::fmt::Display for PatronStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for PatronStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "IN" => Ok(PatronStatus::Inactive),
            "AC" => Ok(PatronStatus::Active),
            _ => Err(format!("Invalid patron status: {}", s)),
        }
    }
}

// SQLx conversion for PatronStatus
impl sqlx::Type<Postgres> for PatronStatus {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<Postgres>>::compatible(ty)
    }
}

impl<'r> Decode<'r, Postgres> for PatronStatus {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: String = Decode::<Postgres>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl Encode<'_, Postgres> for PatronStatus {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        <&str as Encode<Postgres>>::encode(self.as_str(), buf)
    }
}

/// Patron model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Patron {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub status: PatronStatus,
    pub fine: i32,
}

/// Create patron request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreatePatron {
    pub patron_id: String,
    #[validate(length(min = 1, max = 25, message = "First name must be 1 to 25 characters"))]
    pub patron_first_name: String,
    #[validate(length(min = 1, max = 25, message = "Last name must be 1 to 25 characters"))]
    pub patron_last_name: String,
    #[validate(
        email(message = "Invalid email format"),
        length(max = 50, message = "Email must be at most 50 characters")
    )]
    pub patron_email: String,
    pub patron_phone: String,
}

/// Update patron request; absent fields are left unchanged
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdatePatron {
    #[validate(length(min = 1, max = 25, message = "First name must be 1 to 25 characters"))]
    pub patron_first_name: Option<String>,
    #[validate(length(min = 1, max = 25, message = "Last name must be 1 to 25 characters"))]
    pub patron_last_name: Option<String>,
    #[validate(
        email(message = "Invalid email format"),
        length(max = 50, message = "Email must be at most 50 characters")
    )]
    pub patron_email: Option<String>,
    pub patron_phone: Option<String>,
}

/// Aggregate fine balance across all patrons
#[derive(Debug, Serialize, ToSchema)]
pub struct FineTotal {
    pub total: i64,
}
