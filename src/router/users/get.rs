//! Get a single user.

use axum::Json;
use axum::extract::State;

use crate::AppState;
use crate::error::Result;
use crate::router::UserId;
use crate::user::{User, UserFilter};

pub async fn handler(
    State(state): State<AppState>,
    UserId(user_id): UserId,
    filter: UserFilter,
) -> Result<Json<User>> {
    let user = state.users().get_user(user_id, &filter).await?;

    Ok(Json(user))
}

#[cfg(test)]
pub(super) mod tests {
    use axum::http::{Method, StatusCode};
    use http_body_util::BodyExt;
    use sqlx::{Pool, Postgres};

    use crate::*;

    const ALICE: &str = "aaaaaaaa-0000-0000-0000-000000000001";

    #[sqlx::test(fixtures("../../../fixtures/users.sql"))]
    async fn test_get_user_handler(pool: Pool<Postgres>) {
        let state = router::state(pool);
        let app = app(state.clone());

        let path = format!("/users/{ALICE}");
        let response = make_request(
            Some(&state),
            app,
            Method::GET,
            &path,
            String::default(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = response.into_body().collect().await.unwrap().to_bytes();

        let raw: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert!(raw.get("password").is_none());

        let body: user::User = serde_json::from_slice(&body).unwrap();
        assert_eq!(body.id.to_string(), ALICE);
        assert_eq!(body.username, "alice");
        assert_eq!(body.first_name.as_deref(), Some("Alice"));
    }

    #[sqlx::test(fixtures("../../../fixtures/users.sql"))]
    async fn test_get_user_with_relations(pool: Pool<Postgres>) {
        let state = router::state(pool);
        let app = app(state.clone());

        let path = format!("/users/{ALICE}?include=role");
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
        assert_eq!(body.role.as_ref().unwrap().name, "admin");
        assert!(body.customer.is_none());
    }

    #[sqlx::test(fixtures("../../../fixtures/users.sql"))]
    async fn test_get_unknown_user(pool: Pool<Postgres>) {
        let state = router::state(pool);
        let app = app(state.clone());

        let path = format!("/users/{}", uuid::Uuid::new_v4());
        let response = make_request(
            Some(&state),
            app,
            Method::GET,
            &path,
            String::default(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[sqlx::test(fixtures("../../../fixtures/users.sql"))]
    async fn test_get_user_requires_token(pool: Pool<Postgres>) {
        let state = router::state(pool);
        let app = app(state);

        let path = format!("/users/{ALICE}");
        let response =
            make_request(None, app, Method::GET, &path, String::default())
                .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
