mod repository;
mod service;

pub use repository::*;
pub use service::*;

use axum::extract::{FromRequestParts, Query};
use axum::http::request::Parts;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::ServerError;

/// User as saved on database.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub username: String,
    /// Argon2 PHC string. Never serialized into a response.
    #[serde(skip_serializing, default)]
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<Uuid>,
    pub updated_at: DateTime<Utc>,
    /// Embedded relation, present when requested through `include`.
    #[sqlx(json(nullable))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[sqlx(json(nullable))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer: Option<Customer>,
}

#[cfg(test)]
impl User {
    /// Bare user for unit tests.
    pub(crate) fn test(username: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            username: username.to_owned(),
            password: String::default(),
            first_name: None,
            role_id: None,
            customer_id: None,
            updated_at: Utc::now(),
            role: None,
            customer: None,
        }
    }
}

/// Role of a [`User`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Role {
    pub id: Uuid,
    pub name: String,
}

/// Customer a [`User`] belongs to.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub id: Uuid,
    pub name: String,
}

/// Input for user creation. Identifier is generated by the service.
#[derive(Clone, Debug)]
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub first_name: Option<String>,
    pub role_id: Option<Uuid>,
    pub customer_id: Option<Uuid>,
}

/// Equality predicates and relation inclusion for store queries.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserFilter {
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub role_id: Option<Uuid>,
    pub customer_id: Option<Uuid>,
    include: Option<String>,
}

impl UserFilter {
    pub fn include_role(&self) -> bool {
        self.includes("role")
    }

    pub fn include_customer(&self) -> bool {
        self.includes("customer")
    }

    fn includes(&self, relation: &str) -> bool {
        self.include
            .as_deref()
            .is_some_and(|list| list.split(',').any(|r| r.trim() == relation))
    }
}

impl<S> FromRequestParts<S> for UserFilter
where
    S: Send + Sync,
{
    type Rejection = ServerError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> Result<Self, Self::Rejection> {
        let Query(filter) =
            Query::<UserFilter>::from_request_parts(parts, state).await?;
        Ok(filter)
    }
}

/// Partial update. Absent fields stay untouched.
#[derive(
    Clone,
    Debug,
    Default,
    Serialize,
    Deserialize,
    Validate,
    Zeroize,
    ZeroizeOnDrop,
)]
#[serde(rename_all = "camelCase")]
pub struct UserPatch {
    #[validate(length(
        min = 2,
        max = 50,
        message = "Username must be 2 to 50 characters long."
    ))]
    pub username: Option<String>,
    pub first_name: Option<String>,
    #[validate(length(
        min = 8,
        max = 255,
        message = "Password must contain at least 8 characters."
    ))]
    pub password: Option<String>,
    #[zeroize(skip)]
    pub role_id: Option<Uuid>,
    #[zeroize(skip)]
    pub customer_id: Option<Uuid>,
}

/// Full-replace payload. The identifier comes from the path and never moves.
#[derive(
    Clone, Debug, Serialize, Deserialize, Validate, Zeroize, ZeroizeOnDrop,
)]
#[serde(rename_all = "camelCase")]
pub struct UserReplacement {
    #[validate(length(
        min = 2,
        max = 50,
        message = "Username must be 2 to 50 characters long."
    ))]
    pub username: String,
    #[validate(length(
        min = 8,
        max = 255,
        message = "Password must contain at least 8 characters."
    ))]
    pub password: String,
    pub first_name: Option<String>,
    #[zeroize(skip)]
    pub role_id: Option<Uuid>,
    #[zeroize(skip)]
    pub customer_id: Option<Uuid>,
}
