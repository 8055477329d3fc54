//! Handle database requests.

use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::error::{Result, ServerError};
use crate::user::{User, UserFilter, UserPatch, UserReplacement};

#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new [`UserRepository`].
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert [`User`] into database.
    ///
    /// A colliding username surfaces as [`ServerError::Conflict`]; under
    /// concurrent creates the unique constraint lets exactly one row in.
    pub async fn insert(&self, user: &User) -> Result<User> {
        sqlx::query_as::<_, User>(
            r#"INSERT INTO users (id, username, password, first_name, role_id, customer_id)
                VALUES ($1, $2, $3, $4, $5, $6)
                RETURNING id, username, password, first_name, role_id, customer_id, updated_at,
                    NULL::jsonb AS role, NULL::jsonb AS customer"#,
        )
        .bind(user.id)
        .bind(&user.username)
        .bind(&user.password)
        .bind(&user.first_name)
        .bind(user.role_id)
        .bind(user.customer_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|err| conflict_on_unique(err, &user.username))
    }

    /// Count users matching `filter`.
    pub async fn count(&self, filter: &UserFilter) -> Result<i64> {
        let mut query = QueryBuilder::new("SELECT COUNT(*) FROM users u");
        push_filter(&mut query, filter);

        Ok(query
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await?)
    }

    /// Find users matching `filter`, with requested relations embedded.
    pub async fn find(&self, filter: &UserFilter) -> Result<Vec<User>> {
        let mut query = select_users(filter);
        push_filter(&mut query, filter);
        query.push(" ORDER BY u.username");

        Ok(query
            .build_query_as::<User>()
            .fetch_all(&self.pool)
            .await?)
    }

    /// Find current user using `id` field.
    pub async fn find_by_id(&self, id: Uuid, filter: &UserFilter) -> Result<User> {
        let mut query = select_users(filter);
        query.push(" WHERE u.id = ").push_bind(id);

        query
            .build_query_as::<User>()
            .fetch_optional(&self.pool)
            .await?
            .ok_or(ServerError::NotFound)
    }

    /// Find current user using `username` field.
    pub async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        let mut query = select_users(&UserFilter::default());
        query.push(" WHERE u.username = ").push_bind(username.to_owned());

        Ok(query
            .build_query_as::<User>()
            .fetch_optional(&self.pool)
            .await?)
    }

    /// Apply `patch` to every user matching `filter`.
    pub async fn update_all(
        &self,
        patch: &UserPatch,
        filter: &UserFilter,
    ) -> Result<u64> {
        let mut query = QueryBuilder::new("UPDATE users AS u SET ");
        push_patch(&mut query, patch);
        push_filter(&mut query, filter);

        let result = query
            .build()
            .execute(&self.pool)
            .await
            .map_err(|err| {
                conflict_on_unique(err, patch.username.as_deref().unwrap_or_default())
            })?;

        Ok(result.rows_affected())
    }

    /// Apply `patch` to a single user.
    pub async fn update_by_id(&self, id: Uuid, patch: &UserPatch) -> Result<()> {
        let mut query = QueryBuilder::new("UPDATE users AS u SET ");
        push_patch(&mut query, patch);
        query.push(" WHERE u.id = ").push_bind(id);

        let result = query
            .build()
            .execute(&self.pool)
            .await
            .map_err(|err| {
                conflict_on_unique(err, patch.username.as_deref().unwrap_or_default())
            })?;

        if result.rows_affected() == 0 {
            return Err(ServerError::NotFound);
        }

        Ok(())
    }

    /// Overwrite every mutable field of a single user.
    pub async fn replace_by_id(
        &self,
        id: Uuid,
        user: &UserReplacement,
    ) -> Result<()> {
        let result = sqlx::query(
            r#"UPDATE users
                SET username = $1, password = $2, first_name = $3,
                    role_id = $4, customer_id = $5, updated_at = NOW()
                WHERE id = $6"#,
        )
        .bind(&user.username)
        .bind(&user.password)
        .bind(&user.first_name)
        .bind(user.role_id)
        .bind(user.customer_id)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|err| conflict_on_unique(err, &user.username))?;

        if result.rows_affected() == 0 {
            return Err(ServerError::NotFound);
        }

        Ok(())
    }

    /// Delete a single user.
    pub async fn delete_by_id(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ServerError::NotFound);
        }

        Ok(())
    }
}

fn conflict_on_unique(err: sqlx::Error, username: &str) -> ServerError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            ServerError::Conflict {
                username: username.to_owned(),
            }
        },
        _ => err.into(),
    }
}

/// SELECT over `users` with relations rendered as jsonb columns, so a single
/// [`User`] row decode covers both the bare and the embedded shape.
fn select_users(filter: &UserFilter) -> QueryBuilder<'static, Postgres> {
    let mut query = QueryBuilder::new(
        "SELECT u.id, u.username, u.password, u.first_name, u.role_id, u.customer_id, u.updated_at",
    );

    if filter.include_role() {
        query.push(
            ", CASE WHEN r.id IS NULL THEN NULL \
               ELSE jsonb_build_object('id', r.id, 'name', r.name) END AS role",
        );
    } else {
        query.push(", NULL::jsonb AS role");
    }

    if filter.include_customer() {
        query.push(
            ", CASE WHEN c.id IS NULL THEN NULL \
               ELSE jsonb_build_object('id', c.id, 'name', c.name) END AS customer",
        );
    } else {
        query.push(", NULL::jsonb AS customer");
    }

    query.push(" FROM users u");
    if filter.include_role() {
        query.push(" LEFT JOIN roles r ON r.id = u.role_id");
    }
    if filter.include_customer() {
        query.push(" LEFT JOIN customers c ON c.id = u.customer_id");
    }

    query
}

fn push_filter(query: &mut QueryBuilder<'static, Postgres>, filter: &UserFilter) {
    let mut separator = " WHERE ";

    if let Some(username) = &filter.username {
        query.push(separator).push("u.username = ").push_bind(username.clone());
        separator = " AND ";
    }
    if let Some(first_name) = &filter.first_name {
        query
            .push(separator)
            .push("u.first_name = ")
            .push_bind(first_name.clone());
        separator = " AND ";
    }
    if let Some(role_id) = filter.role_id {
        query.push(separator).push("u.role_id = ").push_bind(role_id);
        separator = " AND ";
    }
    if let Some(customer_id) = filter.customer_id {
        query
            .push(separator)
            .push("u.customer_id = ")
            .push_bind(customer_id);
    }
}

fn push_patch(query: &mut QueryBuilder<'static, Postgres>, patch: &UserPatch) {
    query.push("updated_at = NOW()");

    if let Some(username) = &patch.username {
        query.push(", username = ").push_bind(username.clone());
    }
    if let Some(first_name) = &patch.first_name {
        query.push(", first_name = ").push_bind(first_name.clone());
    }
    if let Some(password) = &patch.password {
        query.push(", password = ").push_bind(password.clone());
    }
    if let Some(role_id) = patch.role_id {
        query.push(", role_id = ").push_bind(role_id);
    }
    if let Some(customer_id) = patch.customer_id {
        query.push(", customer_id = ").push_bind(customer_id);
    }
}
