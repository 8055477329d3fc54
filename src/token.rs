//! Manage json web tokens.

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode,
};
use serde::{Deserialize, Serialize};

use crate::error::{Result, ServerError};
use crate::user::User;

const DEFAULT_AUDIENCE: &str = "accountd";
pub const EXPIRATION_TIME: u64 = 60 * 15; // 15 minutes.

/// Pieces of information asserted on a JWT.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Claims {
    /// Recipients that the JWT is intended for.
    pub aud: String,
    /// Identifies the expiration time on or after which the JWT must not be
    /// accepted for processing.
    pub exp: u64,
    /// Identifies the time at which the JWT was issued.
    pub iat: u64,
    /// Identifies the organization that issued the JWT.
    pub iss: String,
    /// User ID.
    pub sub: String,
    /// Unique username.
    pub preferred_username: String,
    /// First name, when the user has one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub given_name: Option<String>,
}

/// Manage JWT tokens.
#[derive(Clone)]
pub struct TokenManager {
    algorithm: Algorithm,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    name: String,
    audience: String,
}

impl TokenManager {
    /// Create a new [`TokenManager`] instance.
    pub fn new(name: &str, secret: &str) -> Self {
        Self {
            algorithm: Algorithm::HS256,
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            name: name.to_owned(),
            audience: DEFAULT_AUDIENCE.to_owned(),
        }
    }

    /// Set `audience` field on JWT.
    pub fn audience(&mut self, audience: &str) {
        self.audience = audience.to_owned();
    }

    /// Create a new token embedding the session claim of `user`.
    pub fn create(&self, user: &User) -> Result<String> {
        let time = chrono::Utc::now().timestamp() as u64;
        let header = Header::new(self.algorithm);
        let claims = Claims {
            aud: self.audience.clone(),
            exp: time + EXPIRATION_TIME,
            iat: time,
            iss: self.name.clone(),
            sub: user.id.to_string(),
            preferred_username: user.username.clone(),
            given_name: user.first_name.clone(),
        };

        encode(&header, &claims, &self.encoding_key).map_err(ServerError::Signing)
    }

    /// Decode and check a token.
    pub fn decode(&self, token: &str) -> Result<Claims> {
        let mut validation = Validation::new(self.algorithm);
        validation.set_audience(&[self.audience.clone()]);

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|err| match err.kind() {
                ErrorKind::ExpiredSignature => ServerError::Expired,
                _ => ServerError::InvalidToken,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ISSUER: &str = "https://accounts.example.com";
    const SECRET: &str = "test-secret";

    #[test]
    fn test_create_and_decode() {
        let manager = TokenManager::new(ISSUER, SECRET);
        let user = User::test("admin");

        let token = manager.create(&user).unwrap();
        let claims = manager.decode(&token).unwrap();

        assert_eq!(claims.sub, user.id.to_string());
        assert_eq!(claims.preferred_username, "admin");
        assert_eq!(claims.iss, ISSUER);
        assert_eq!(claims.aud, DEFAULT_AUDIENCE);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_wrong_secret_is_invalid() {
        let manager = TokenManager::new(ISSUER, SECRET);
        let other = TokenManager::new(ISSUER, "another-secret");

        let token = manager.create(&User::test("admin")).unwrap();
        let err = other.decode(&token).unwrap_err();
        assert!(matches!(err, ServerError::InvalidToken));
    }

    #[test]
    fn test_expired_token() {
        let manager = TokenManager::new(ISSUER, SECRET);
        let time = chrono::Utc::now().timestamp() as u64;

        // Issued two hours ago, expired one hour ago. Past any leeway.
        let claims = Claims {
            aud: DEFAULT_AUDIENCE.to_owned(),
            exp: time - 3600,
            iat: time - 7200,
            iss: ISSUER.to_owned(),
            sub: "admin".to_owned(),
            preferred_username: "admin".to_owned(),
            given_name: None,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        let err = manager.decode(&token).unwrap_err();
        assert!(matches!(err, ServerError::Expired));
    }
}
