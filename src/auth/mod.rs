pub mod password;

use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::config::{SecurityConfig, MAX_TOKEN_EXPIRY_HOURS};
use crate::database::models::PublicUser;

pub use password::{hash_password, verify_password, PasswordError};

/// Session claims carried inside an auth token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn new(user: &PublicUser, expiry: Duration) -> Self {
        let now = Utc::now();

        Self {
            id: user.id,
            email: user.email.clone(),
            name: user.name.clone(),
            iat: now.timestamp(),
            exp: (now + expiry).timestamp(),
        }
    }
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("Token secret is not configured")]
    MissingSecret,

    #[error("Token expiry of {0} hours is out of range")]
    InvalidExpiry(u64),

    #[error("Token generation error: {0}")]
    Generation(String),

    #[error("{0}")]
    Invalid(String),
}

/// Issues and verifies HS256 session tokens with a process-wide secret
#[derive(Clone)]
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    expiry: Duration,
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("expiry", &self.expiry)
            .finish_non_exhaustive()
    }
}

impl TokenIssuer {
    pub fn new(security: &SecurityConfig) -> Result<Self, TokenError> {
        if security.token_secret.is_empty() {
            return Err(TokenError::MissingSecret);
        }

        let hours = security.token_expiry_hours;
        let expiry = Some(hours)
            .filter(|h| (1..=MAX_TOKEN_EXPIRY_HOURS).contains(h))
            .and_then(|h| i64::try_from(h).ok())
            .and_then(Duration::try_hours)
            .ok_or(TokenError::InvalidExpiry(hours))?;

        let secret = security.token_secret.as_bytes();
        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            expiry,
        })
    }

    pub fn issue(&self, user: &PublicUser) -> Result<String, TokenError> {
        self.issue_for(user, self.expiry)
    }

    pub fn issue_for(&self, user: &PublicUser, expiry: Duration) -> Result<String, TokenError> {
        self.sign(&Claims::new(user, expiry))
    }

    pub fn sign(&self, claims: &Claims) -> Result<String, TokenError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| TokenError::Generation(e.to_string()))
    }

    /// Check signature, algorithm and expiry, returning the embedded claims
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|err| {
                let reason = match err.kind() {
                    ErrorKind::ExpiredSignature => "Token expired",
                    ErrorKind::InvalidSignature => "Invalid token signature",
                    ErrorKind::InvalidAlgorithm => "Invalid token algorithm",
                    _ => "Invalid token",
                };
                TokenError::Invalid(reason.to_string())
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    fn issuer(secret: &str) -> TokenIssuer {
        TokenIssuer::new(&AppConfig::for_testing(secret).security).unwrap()
    }

    fn user() -> PublicUser {
        PublicUser {
            id: Uuid::new_v4(),
            email: "ada@example.com".to_string(),
            name: "Ada".to_string(),
        }
    }

    #[test]
    fn issued_token_round_trips() {
        let tokens = issuer("round-trip-secret");
        let user = user();

        let token = tokens.issue(&user).unwrap();
        let claims = tokens.verify(&token).unwrap();

        assert_eq!(claims.id, user.id);
        assert_eq!(claims.email, user.email);
        assert_eq!(claims.name, user.name);
        assert_eq!(claims.exp - claims.iat, 6 * 60 * 60);
    }

    #[test]
    fn expired_token_is_rejected() {
        let tokens = issuer("expiry-secret");
        let token = tokens.issue_for(&user(), Duration::seconds(-30)).unwrap();

        match tokens.verify(&token) {
            Err(TokenError::Invalid(reason)) => assert_eq!(reason, "Token expired"),
            other => panic!("expected expiry rejection, got {:?}", other),
        }
    }

    #[test]
    fn foreign_signature_is_rejected() {
        let token = issuer("secret-one").issue(&user()).unwrap();
        assert!(matches!(
            issuer("secret-two").verify(&token),
            Err(TokenError::Invalid(_))
        ));
    }

    #[test]
    fn malformed_token_is_rejected() {
        let tokens = issuer("malformed-secret");
        assert!(tokens.verify("not.a.token").is_err());
        assert!(tokens.verify("").is_err());
    }

    #[test]
    fn empty_secret_cannot_build_issuer() {
        let mut config = AppConfig::for_testing("x");
        config.security.token_secret.clear();
        assert!(matches!(
            TokenIssuer::new(&config.security),
            Err(TokenError::MissingSecret)
        ));
    }

    #[test]
    fn out_of_range_expiry_cannot_build_issuer() {
        let mut config = AppConfig::for_testing("expiry-range-secret");

        for hours in [0, MAX_TOKEN_EXPIRY_HOURS + 1, i64::MAX as u64, u64::MAX] {
            config.security.token_expiry_hours = hours;
            let result = TokenIssuer::new(&config.security);
            assert!(
                matches!(result, Err(TokenError::InvalidExpiry(h)) if h == hours),
                "accepted {} hours",
                hours
            );
        }

        config.security.token_expiry_hours = MAX_TOKEN_EXPIRY_HOURS;
        let tokens = TokenIssuer::new(&config.security).unwrap();
        let claims = tokens.verify(&tokens.issue(&user()).unwrap()).unwrap();
        assert_eq!(claims.exp - claims.iat, MAX_TOKEN_EXPIRY_HOURS as i64 * 3600);
    }
}
