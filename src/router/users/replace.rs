//! Replace a single user.

use axum::extract::State;
use axum::http::StatusCode;

use crate::AppState;
use crate::error::Result;
use crate::router::{UserId, Valid};
use crate::user::UserReplacement;

/// Every mutable field is overwritten; the identifier never moves.
pub async fn handler(
    State(state): State<AppState>,
    UserId(user_id): UserId,
    Valid(replacement): Valid<UserReplacement>,
) -> Result<StatusCode> {
    state.users().replace_user(user_id, replacement).await?;

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
pub(super) mod tests {
    use axum::http::{Method, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::json;
    use sqlx::{Pool, Postgres};

    use crate::*;

    const ALICE: &str = "aaaaaaaa-0000-0000-0000-000000000001";

    #[sqlx::test(fixtures("../../../fixtures/users.sql"))]
    async fn test_replace_user_handler(pool: Pool<Postgres>) {
        let state = router::state(pool);
        let app = app(state.clone());

        let path = format!("/users/{ALICE}");
        let response = make_request(
            Some(&state),
            app.clone(),
            Method::PUT,
            &path,
            json!({"username": "alison", "password": "P$soW%920$n&"})
                .to_string(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let response = make_request(
            Some(&state),
            app,
            Method::GET,
            &path,
            String::default(),
        )
        .await;
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let body: user::User = serde_json::from_slice(&body).unwrap();

        assert_eq!(body.id.to_string(), ALICE);
        assert_eq!(body.username, "alison");
        // The replacement carried no first name or relations.
        assert!(body.first_name.is_none());
        assert!(body.role_id.is_none());
        assert!(body.customer_id.is_none());
    }

    #[sqlx::test(fixtures("../../../fixtures/users.sql"))]
    async fn test_replace_unknown_user(pool: Pool<Postgres>) {
        let state = router::state(pool);
        let app = app(state.clone());

        let path = format!("/users/{}", uuid::Uuid::new_v4());
        let response = make_request(
            Some(&state),
            app,
            Method::PUT,
            &path,
            json!({"username": "ghost", "password": "P$soW%920$n&"})
                .to_string(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[sqlx::test(fixtures("../../../fixtures/users.sql"))]
    async fn test_replace_with_taken_username(pool: Pool<Postgres>) {
        let state = router::state(pool);
        let app = app(state.clone());

        let path = format!("/users/{ALICE}");
        let response = make_request(
            Some(&state),
            app,
            Method::PUT,
            &path,
            json!({"username": "bob", "password": "P$soW%920$n&"}).to_string(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }
}
