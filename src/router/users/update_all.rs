//! Patch every user matching a filter.

use axum::Json;
use axum::extract::State;
use serde::{Deserialize, Serialize};

use crate::AppState;
use crate::error::Result;
use crate::router::Valid;
use crate::user::{UserFilter, UserPatch};

#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub count: u64,
}

pub async fn handler(
    State(state): State<AppState>,
    filter: UserFilter,
    Valid(patch): Valid<UserPatch>,
) -> Result<Json<Response>> {
    let count = state.users().patch_users(patch, &filter).await?;

    Ok(Json(Response { count }))
}
