//! Patch a single user.

use axum::extract::State;
use axum::http::StatusCode;

use crate::AppState;
use crate::error::Result;
use crate::router::{UserId, Valid};
use crate::user::UserPatch;

/// Only supplied fields move; `updatedAt` moves with them.
pub async fn handler(
    State(state): State<AppState>,
    UserId(user_id): UserId,
    Valid(patch): Valid<UserPatch>,
) -> Result<StatusCode> {
    state.users().patch_user(user_id, patch).await?;

    Ok(StatusCode::NO_CONTENT)
}
