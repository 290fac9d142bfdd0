use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tokio::task::{self, JoinError};
use tracing::{info, warn};

use crate::auth::{hash_password, verify_password, PasswordError, TokenError, TokenIssuer};
use crate::database::models::{NewUser, PublicUser};
use crate::database::{StoreError, UserStore};

/// local-part@domain.tld with a TLD of at least two characters
static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]{2,}$").expect("email pattern compiles")
});

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("email, password and name are required")]
    MissingSignupFields,
    #[error("email address is malformed")]
    InvalidEmail,
    #[error("email and password are required")]
    MissingLoginFields,
    #[error("user already exists")]
    UserExists,
    #[error("user not found")]
    UserNotFound,
    #[error("password does not match")]
    WrongPassword,
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Token(#[from] TokenError),
    #[error(transparent)]
    Password(#[from] PasswordError),
    #[error("password worker failed: {0}")]
    Worker(#[from] JoinError),
}

/// Missing fields deserialize as empty strings and fail validation
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub auth_token: String,
}

/// Signup and login over a credential store and a token issuer
pub struct AuthService<'a, S: UserStore + ?Sized> {
    users: &'a S,
    tokens: &'a TokenIssuer,
}

impl<'a, S: UserStore + ?Sized> AuthService<'a, S> {
    pub fn new(users: &'a S, tokens: &'a TokenIssuer) -> Self {
        Self { users, tokens }
    }

    /// Validate, check uniqueness, hash, persist, and return the public view
    pub async fn signup(&self, request: SignupRequest) -> Result<PublicUser, AuthError> {
        let SignupRequest { email, password, name } = request;

        if is_blank(&email) || is_blank(&password) || is_blank(&name) {
            return Err(AuthError::MissingSignupFields);
        }
        if !is_valid_email(&email) {
            return Err(AuthError::InvalidEmail);
        }

        // Fast path for a clear error; the store's unique constraint is the real guard
        if self.users.find_user_by_email(&email).await?.is_some() {
            warn!("Signup rejected, email already registered");
            return Err(AuthError::UserExists);
        }

        let password_hash = task::spawn_blocking(move || hash_password(&password)).await??;

        let created = self
            .users
            .create_user(NewUser {
                email,
                name,
                password_hash,
            })
            .await
            .map_err(|err| match err {
                StoreError::Duplicate(_) => AuthError::UserExists,
                other => AuthError::Store(other),
            })?;

        info!(user_id = %created.id, "User signed up");
        Ok(created.into())
    }

    /// Look up the user, check the password, and issue a session token
    pub async fn login(&self, request: LoginRequest) -> Result<LoginResponse, AuthError> {
        let LoginRequest { email, password } = request;

        if is_blank(&email) || is_blank(&password) {
            return Err(AuthError::MissingLoginFields);
        }

        let user = self
            .users
            .find_user_by_email(&email)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        let digest = user.password_hash.clone();
        let matches = task::spawn_blocking(move || verify_password(&password, &digest)).await?;
        if !matches {
            warn!(user_id = %user.id, "Login rejected, wrong password");
            return Err(AuthError::WrongPassword);
        }

        let auth_token = self.tokens.issue(&PublicUser::from(user.clone()))?;
        info!(user_id = %user.id, "User authenticated");

        Ok(LoginResponse { auth_token })
    }
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_PATTERN.is_match(email)
}
