//! Count users matching a filter.

use axum::Json;
use axum::extract::State;
use serde::{Deserialize, Serialize};

use crate::AppState;
use crate::error::Result;
use crate::user::UserFilter;

#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub count: i64,
}

pub async fn handler(
    State(state): State<AppState>,
    filter: UserFilter,
) -> Result<Json<Response>> {
    let count = state.users().count_users(&filter).await?;

    Ok(Json(Response { count }))
}

#[cfg(test)]
pub(super) mod tests {
    use axum::http::{Method, StatusCode};
    use http_body_util::BodyExt;
    use sqlx::{Pool, Postgres};

    use super::Response;
    use crate::*;

    #[sqlx::test(fixtures("../../../fixtures/users.sql"))]
    async fn test_count_handler(pool: Pool<Postgres>) {
        let state = router::state(pool);
        let app = app(state.clone());

        let response = make_request(
            Some(&state),
            app.clone(),
            Method::GET,
            "/users/count",
            String::default(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let body: Response = serde_json::from_slice(&body).unwrap();
        assert_eq!(body.count, 2);

        // Equality filter narrows the count.
        let response = make_request(
            Some(&state),
            app,
            Method::GET,
            "/users/count?username=alice",
            String::default(),
        )
        .await;
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let body: Response = serde_json::from_slice(&body).unwrap();
        assert_eq!(body.count, 1);
    }

    #[sqlx::test(fixtures("../../../fixtures/users.sql"))]
    async fn test_count_requires_token(pool: Pool<Postgres>) {
        let state = router::state(pool);
        let app = app(state);

        let response = make_request(
            None,
            app,
            Method::GET,
            "/users/count",
            String::default(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
