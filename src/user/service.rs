use std::sync::Arc;

use uuid::Uuid;

use crate::crypto::PasswordManager;
use crate::error::{Result, ServerError};
use crate::token::TokenManager;
use crate::user::{
    NewUser, User, UserFilter, UserPatch, UserReplacement, UserRepository,
};

/// User manager.
///
/// Orchestrates the store, the password hasher and the token issuer. Every
/// collaborator comes in through the constructor.
#[derive(Clone)]
pub struct UserService {
    pub repo: UserRepository,
    crypto: Arc<PasswordManager>,
    token: TokenManager,
}

impl UserService {
    /// Create a new [`UserService`].
    pub fn new(
        repo: UserRepository,
        crypto: Arc<PasswordManager>,
        token: TokenManager,
    ) -> Self {
        Self {
            repo,
            crypto,
            token,
        }
    }

    /// Local strategy: resolve and verify submitted credentials.
    ///
    /// Unknown usernames and wrong passwords are indistinguishable for the
    /// caller.
    pub async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<User> {
        let username = username.to_lowercase();
        let Some(user) = self.repo.find_by_username(&username).await? else {
            return Err(ServerError::InvalidCredentials);
        };

        if !self.crypto.verify_password(password, &user.password) {
            return Err(ServerError::InvalidCredentials);
        }

        Ok(user)
    }

    /// Authenticate and issue a session token.
    pub async fn login(&self, username: &str, password: &str) -> Result<String> {
        let user = self.authenticate(username, password).await?;
        tracing::info!(user_id = %user.id, "user logged in");

        self.token.create(&user)
    }

    /// Create a user.
    ///
    /// Hash password before persistence.
    pub async fn create_user(&self, new: NewUser) -> Result<User> {
        let password = self.crypto.hash_password(&new.password)?;

        let user = self
            .repo
            .insert(&User {
                id: Uuid::new_v4(),
                username: new.username.to_lowercase(),
                password,
                first_name: new.first_name,
                role_id: new.role_id,
                customer_id: new.customer_id,
                updated_at: chrono::Utc::now(),
                role: None,
                customer: None,
            })
            .await?;

        tracing::info!(user_id = %user.id, username = %user.username, "user created");
        Ok(user)
    }

    /// Count users matching `filter`.
    pub async fn count_users(&self, filter: &UserFilter) -> Result<i64> {
        self.repo.count(filter).await
    }

    /// List users matching `filter`.
    pub async fn list_users(&self, filter: &UserFilter) -> Result<Vec<User>> {
        self.repo.find(filter).await
    }

    /// Find a user by identifier.
    pub async fn get_user(&self, id: Uuid, filter: &UserFilter) -> Result<User> {
        self.repo.find_by_id(id, filter).await
    }

    /// Apply `patch` to every user matching `filter`.
    pub async fn patch_users(
        &self,
        mut patch: UserPatch,
        filter: &UserFilter,
    ) -> Result<u64> {
        self.hash_patch(&mut patch)?;
        self.repo.update_all(&patch, filter).await
    }

    /// Apply `patch` to a single user.
    pub async fn patch_user(&self, id: Uuid, mut patch: UserPatch) -> Result<()> {
        self.hash_patch(&mut patch)?;
        self.repo.update_by_id(id, &patch).await?;

        tracing::info!(user_id = %id, "user updated");
        Ok(())
    }

    /// Replace every mutable field of a single user.
    pub async fn replace_user(
        &self,
        id: Uuid,
        mut replacement: UserReplacement,
    ) -> Result<()> {
        replacement.username = replacement.username.to_lowercase();
        replacement.password = self.crypto.hash_password(&replacement.password)?;
        self.repo.replace_by_id(id, &replacement).await?;

        tracing::info!(user_id = %id, "user replaced");
        Ok(())
    }

    /// Delete a single user.
    pub async fn delete_user(&self, id: Uuid) -> Result<()> {
        self.repo.delete_by_id(id).await?;

        tracing::info!(user_id = %id, "user deleted");
        Ok(())
    }

    /// A patched password is re-hashed so the store never sees plaintext.
    fn hash_patch(&self, patch: &mut UserPatch) -> Result<()> {
        if let Some(password) = patch.password.take() {
            patch.password = Some(self.crypto.hash_password(password)?);
        }

        Ok(())
    }
}
