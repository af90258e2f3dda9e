//! Author model and related types

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// Full author model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Author {
    pub id: i32,
    pub first_name: String,
    pub midname_initial: String,
    pub last_name: String,
}

impl Author {
    pub fn display_name(&self) -> String {
        format!("{} {} {}", self.first_name, self.midname_initial, self.last_name)
    }
}

/// Create author request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateAuthor {
    #[validate(length(min = 1, max = 25))]
    pub author_first_name: String,
    #[validate(length(min = 1, max = 25))]
    pub author_initial_midname: String,
    #[validate(length(min = 1, max = 25))]
    pub author_last_name: String,
}

/// Update author request
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateAuthor {
    #[validate(length(min = 1, max = 25))]
    pub author_first_name: Option<String>,
    #[validate(length(min = 1, max = 25))]
    pub author_initial_midname: Option<String>,
    #[validate(length(min = 1, max = 25))]
    pub author_last_name: Option<String>,
}

/// Full author name split into its three stored parts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorName {
    pub first_name: String,
    pub midname_initial: String,
    pub last_name: String,
}

impl AuthorName {
    /// Parse "first middle last"; anything other than three words is rejected.
    pub fn parse(name: &str) -> Option<Self> {
        let mut parts = name.split_whitespace();
        let (first, middle, last) = (parts.next()?, parts.next()?, parts.next()?);
        if parts.next().is_some() {
            return None;
        }
        Some(Self {
            first_name: first.to_string(),
            midname_initial: middle.to_string(),
            last_name: last.to_string(),
        })
    }
}
