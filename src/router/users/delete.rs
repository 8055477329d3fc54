//! Delete a single user.

use axum::extract::State;
use axum::http::StatusCode;

use crate::AppState;
use crate::error::Result;
use crate::router::UserId;

/// Hard delete. There is no retention window for user records.
pub async fn handler(
    State(state): State<AppState>,
    UserId(user_id): UserId,
) -> Result<StatusCode> {
    state.users().delete_user(user_id).await?;

    Ok(StatusCode::NO_CONTENT)
}
