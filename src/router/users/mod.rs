//! Users-related HTTP API, bearer-protected.
mod count;
mod delete;
mod get;
mod list;
mod replace;
mod update;
mod update_all;

use axum::Router;
use axum::extract::{Request, State};
use axum::http::header;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::get;

use crate::token::Claims;
use crate::{AppState, ServerError};

const BEARER: &str = "Bearer ";

/// Custom middleware for authentification.
///
/// Bearer strategy: decode the `Authorization` token and attach the
/// resulting principal to the request. Failures short-circuit before any
/// handler or store operation runs.
async fn auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ServerError> {
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .ok_or(ServerError::Unauthorized)?;
    let token = token.strip_prefix(BEARER).unwrap_or(token);

    let claims = state.token.decode(token)?;
    req.extensions_mut().insert::<Claims>(claims);

    Ok(next.run(req).await)
}

pub fn router(state: AppState) -> Router<AppState> {
    Router::new()
        // `GET /users/count` goes to `count`.
        .route("/users/count", get(count::handler))
        // `GET /users` goes to `list`, `PATCH /users` to `update_all`.
        .route(
            "/users",
            get(list::handler).patch(update_all::handler),
        )
        // By-id operations share one path.
        .route(
            "/users/{user_id}",
            get(get::handler)
                .patch(update::handler)
                .put(replace::handler)
                .delete(delete::handler),
        )
        .route_layer(middleware::from_fn_with_state(state, auth))
}
