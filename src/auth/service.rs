use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use super::password::PasswordHasher;
use super::token::TokenSigner;
use crate::error::{Error, Result};
use crate::store::MetadataStore;
use crate::types::User;

/// The only place passwords are ever checked. Issues session tokens on
/// registration and login, and resolves tokens back to tenant ids.
pub struct AuthService {
    store: Arc<dyn MetadataStore>,
    signer: TokenSigner,
    passwords: PasswordHasher,
}

impl AuthService {
    pub fn new(store: Arc<dyn MetadataStore>, secret: &[u8]) -> Self {
        Self {
            store,
            signer: TokenSigner::new(secret),
            passwords: PasswordHasher::new(),
        }
    }

    /// Creates an account and returns a session token for it.
    pub fn register(&self, login: &str, password: &str) -> Result<String> {
        if self.store.get_user_by_login(login)?.is_some() {
            return Err(Error::AlreadyExists);
        }

        let user = User {
            id: Uuid::new_v4(),
            login: login.to_string(),
            password_hash: self.passwords.hash(password)?,
            created_at: Utc::now(),
        };

        // The login is UNIQUE in the store, so a concurrent registration
        // racing past the check above still surfaces as AlreadyExists.
        self.store.create_user(&user)?;

        tracing::info!("registered user {} ({})", user.id, login);
        self.signer.issue(user.id)
    }

    /// Unknown login and wrong password produce the same error, so the
    /// endpoint cannot be used to enumerate accounts.
    pub fn login(&self, login: &str, password: &str) -> Result<String> {
        let user = self
            .store
            .get_user_by_login(login)?
            .ok_or(Error::InvalidCredentials)?;

        if !self.passwords.verify(password, &user.password_hash)? {
            return Err(Error::InvalidCredentials);
        }

        tracing::info!("user {} logged in", user.id);
        self.signer.issue(user.id)
    }

    pub fn validate(&self, token: &str) -> Result<Uuid> {
        self.signer.validate(token)
    }
}
