//! List users matching a filter.

use axum::Json;
use axum::extract::State;

use crate::AppState;
use crate::error::Result;
use crate::user::{User, UserFilter};

pub async fn handler(
    State(state): State<AppState>,
    filter: UserFilter,
) -> Result<Json<Vec<User>>> {
    let users = state.users().list_users(&filter).await?;

    Ok(Json(users))
}
