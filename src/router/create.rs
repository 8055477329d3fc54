//! Create a new user.

use axum::Json;
use axum::extract::State;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::AppState;
use crate::error::Result;
use crate::router::Valid;
use crate::user::{NewUser, User};

#[derive(Debug, Serialize, Deserialize, Validate, Zeroize, ZeroizeOnDrop)]
#[serde(rename_all = "camelCase")]
pub struct Body {
    #[validate(
        length(
            min = 2,
            max = 50,
            message = "Username must be 2 to 50 characters long."
        ),
        custom(
            function = "crate::router::validate_username",
            message = "Username must be alphanumeric."
        )
    )]
    username: String,
    #[validate(length(
        min = 8,
        max = 255,
        message = "Password must contain at least 8 characters."
    ))]
    password: String,
    first_name: Option<String>,
    #[zeroize(skip)]
    role_id: Option<Uuid>,
    #[zeroize(skip)]
    customer_id: Option<Uuid>,
}

/// Handler to create user.
///
/// Registration is open on purpose; this is the only unauthenticated write.
pub async fn handler(
    State(state): State<AppState>,
    Valid(mut body): Valid<Body>,
) -> Result<Json<User>> {
    let user = state
        .users()
        .create_user(NewUser {
            username: std::mem::take(&mut body.username),
            password: std::mem::take(&mut body.password),
            first_name: body.first_name.take(),
            role_id: body.role_id,
            customer_id: body.customer_id,
        })
        .await?;

    Ok(Json(user))
}

#[cfg(test)]
pub(super) mod tests {
    use axum::http::{Method, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::json;
    use sqlx::{Pool, Postgres};

    use crate::error::ResponseError;
    use crate::*;

    #[sqlx::test]
    async fn test_create_handler(pool: Pool<Postgres>) {
        let state = router::state(pool.clone());
        let app = app(state);

        let response = make_request(
            None,
            app,
            Method::POST,
            "/users",
            json!({
                "username": "Carol",
                "password": "P$soW%920$n&",
                "firstName": "Carol",
            })
            .to_string(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = response.into_body().collect().await.unwrap().to_bytes();

        // The hash must never leave the store boundary.
        let raw: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert!(raw.get("password").is_none());

        let body: user::User = serde_json::from_slice(&body).unwrap();
        assert_eq!(body.username, "carol");
        assert_eq!(body.first_name.as_deref(), Some("Carol"));

        let stored: String =
            sqlx::query_scalar("SELECT password FROM users WHERE id = $1")
                .bind(body.id)
                .fetch_one(&pool)
                .await
                .unwrap();
        assert!(stored.starts_with("$argon2id$"));
        assert_ne!(stored, "P$soW%920$n&");
    }

    #[sqlx::test(fixtures("../../fixtures/users.sql"))]
    async fn test_create_with_duplicate_username(pool: Pool<Postgres>) {
        let state = router::state(pool);
        let app = app(state);

        let response = make_request(
            None,
            app,
            Method::POST,
            "/users",
            json!({"username": "alice", "password": "P$soW%920$n&"}).to_string(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let body: ResponseError = serde_json::from_slice(&body).unwrap();
        assert_eq!(body.status_code, 409);
        assert_eq!(body.message, "username 'alice' is already taken");
    }

    #[sqlx::test]
    async fn test_create_with_weak_password(pool: Pool<Postgres>) {
        let state = router::state(pool);
        let app = app(state);

        let response = make_request(
            None,
            app,
            Method::POST,
            "/users",
            json!({"username": "carol", "password": "short"}).to_string(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[sqlx::test]
    async fn test_create_with_bad_username(pool: Pool<Postgres>) {
        let state = router::state(pool);
        let app = app(state);

        let response = make_request(
            None,
            app,
            Method::POST,
            "/users",
            json!({"username": "not a name", "password": "P$soW%920$n&"})
                .to_string(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
