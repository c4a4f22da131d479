//! A simulated sign-in session.
//!
//! This is not security. Users live in a storage slot with a reversibly encoded password, and the
//! session token is an unsigned JWT look-alike. Its only job is to tell the ledger who is recording
//! transactions.

use crate::model::GUEST;
use crate::storage::{Storage, StorageError, TOKEN, USER, USERS};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

const PASSWORD_SALT: &str = "salt_value";
const TOKEN_LIFETIME_SECS: i64 = 60 * 60 * 24;

/// Answers "who is recording this transaction?". Must not fail: when nobody is signed in, the
/// answer is the guest sentinel.
pub trait CurrentUserProvider {
    fn current_user_id(&self) -> String;
}

/// Always the guest.
#[derive(Debug, Default, Clone, Copy)]
pub struct Guest;

impl CurrentUserProvider for Guest {
    fn current_user_id(&self) -> String {
        GUEST.to_string()
    }
}

/// A fixed, known user id.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct SignedIn(String);

impl SignedIn {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl CurrentUserProvider for SignedIn {
    fn current_user_id(&self) -> String {
        self.0.clone()
    }
}

/// The user recorded in the session slot when it was read, or the guest.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct SessionUser(Option<User>);

impl SessionUser {
    /// Reads the session slot. Any problem reading it means nobody is signed in.
    pub async fn load(storage: &dyn Storage) -> Self {
        match read_current_user(storage).await {
            Ok(user) => Self(user),
            Err(e) => {
                warn!("Unable to read the session, continuing as guest: {e}");
                Self(None)
            }
        }
    }

    pub fn user(&self) -> Option<&User> {
        self.0.as_ref()
    }
}

impl CurrentUserProvider for SessionUser {
    fn current_user_id(&self) -> String {
        match &self.0 {
            Some(user) => user.id.clone(),
            None => GUEST.to_string(),
        }
    }
}

/// The public part of a registered user, as kept in the session slot.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
}

/// A registered user as kept in the users slot.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredUser {
    id: String,
    name: String,
    email: String,
    password: String,
    created_at: String,
}

impl From<&StoredUser> for User {
    fn from(stored: &StoredUser) -> Self {
        User {
            id: stored.id.clone(),
            name: stored.name.clone(),
            email: stored.email.clone(),
        }
    }
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("the {0} is required")]
    MissingField(&'static str),
    #[error("the passwords do not match")]
    PasswordMismatch,
    #[error("the email '{0}' is already registered")]
    EmailTaken(String),
    #[error("incorrect email or password")]
    InvalidCredentials,
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("the stored session data is malformed: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Registers users and signs them in and out.
pub struct Session {
    storage: Box<dyn Storage>,
}

impl Session {
    pub fn new(storage: impl Storage + 'static) -> Self {
        Self {
            storage: Box::new(storage),
        }
    }

    /// Registers a new user and signs them in.
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
        confirm_password: &str,
    ) -> Result<User, SessionError> {
        for (field, value) in [("name", name), ("email", email), ("password", password)] {
            if value.trim().is_empty() {
                return Err(SessionError::MissingField(field));
            }
        }
        if password != confirm_password {
            return Err(SessionError::PasswordMismatch);
        }
        let mut users = self.users().await?;
        if users.iter().any(|u| u.email == email) {
            return Err(SessionError::EmailTaken(email.to_string()));
        }
        let now = Utc::now();
        let stored = StoredUser {
            id: now.timestamp_millis().to_string(),
            name: name.to_string(),
            email: email.to_string(),
            password: hash_password(password),
            created_at: now.to_rfc3339_opts(SecondsFormat::Millis, true),
        };
        let user = User::from(&stored);
        users.push(stored);
        self.storage
            .set(USERS, &serde_json::to_string(&users)?)
            .await?;
        debug!("Registered user {}", user.id);
        self.sign_in(&user).await?;
        Ok(user)
    }

    /// Signs in the user registered under `email` if `password` matches.
    pub async fn login(&self, email: &str, password: &str) -> Result<User, SessionError> {
        let users = self.users().await?;
        let user = users
            .iter()
            .find(|u| u.email == email && verify_password(password, &u.password))
            .map(User::from)
            .ok_or(SessionError::InvalidCredentials)?;
        self.sign_in(&user).await?;
        Ok(user)
    }

    /// Clears the signed-in user and token.
    pub async fn logout(&self) -> Result<(), SessionError> {
        self.storage.remove(USER).await?;
        self.storage.remove(TOKEN).await?;
        Ok(())
    }

    /// The signed-in user, if any.
    pub async fn current_user(&self) -> Result<Option<User>, SessionError> {
        read_current_user(self.storage.as_ref()).await
    }

    /// True when a session token is present. The token itself is never checked.
    pub async fn is_authenticated(&self) -> Result<bool, SessionError> {
        Ok(self.storage.get(TOKEN).await?.is_some())
    }

    async fn users(&self) -> Result<Vec<StoredUser>, SessionError> {
        match self.storage.get(USERS).await? {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(Vec::new()),
        }
    }

    async fn sign_in(&self, user: &User) -> Result<(), SessionError> {
        self.storage
            .set(USER, &serde_json::to_string(user)?)
            .await?;
        self.storage.set(TOKEN, &generate_token()).await?;
        Ok(())
    }
}

async fn read_current_user(storage: &dyn Storage) -> Result<Option<User>, SessionError> {
    match storage.get(USER).await? {
        Some(raw) => Ok(serde_json::from_str(&raw)?),
        None => Ok(None),
    }
}

fn hash_password(password: &str) -> String {
    STANDARD.encode(format!("{password}{PASSWORD_SALT}"))
}

fn verify_password(password: &str, hashed: &str) -> bool {
    hash_password(password) == hashed
}

/// Builds an unsigned, JWT-shaped token that expires a day from now.
fn generate_token() -> String {
    let now = Utc::now();
    let header = serde_json::json!({ "alg": "HS256", "typ": "JWT" });
    let payload = serde_json::json!({
        "sub": now.timestamp_millis().to_string(),
        "name": "APP AGRO User",
        "iat": now.timestamp(),
        "exp": now.timestamp() + TOKEN_LIFETIME_SECS,
    });
    format!(
        "{}.{}.{}",
        STANDARD.encode(header.to_string()),
        STANDARD.encode(payload.to_string()),
        STANDARD.encode("simulate_signature")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    #[test]
    fn test_guest_and_signed_in() {
        assert_eq!(Guest.current_user_id(), "guest");
        assert_eq!(SignedIn::new("42").current_user_id(), "42");
        assert_eq!(SessionUser::default().current_user_id(), "guest");
    }

    #[test]
    fn test_password_hash_matches_stored_format() {
        // base64("segredo" + "salt_value")
        assert_eq!(hash_password("segredo"), "c2VncmVkb3NhbHRfdmFsdWU=");
        assert!(verify_password("segredo", "c2VncmVkb3NhbHRfdmFsdWU="));
        assert!(!verify_password("errado", "c2VncmVkb3NhbHRfdmFsdWU="));
    }

    #[test]
    fn test_token_shape() {
        let token = generate_token();
        let parts: Vec<&str> = token.split('.').collect();
        assert_eq!(parts.len(), 3);
        let payload: serde_json::Value =
            serde_json::from_slice(&STANDARD.decode(parts[1]).unwrap()).unwrap();
        let iat = payload["iat"].as_i64().unwrap();
        assert_eq!(payload["exp"].as_i64().unwrap() - iat, TOKEN_LIFETIME_SECS);
    }

    #[tokio::test]
    async fn test_register_login_logout() {
        let storage = MemoryStorage::new();
        let session = Session::new(storage.clone());
        assert!(!session.is_authenticated().await.unwrap());

        let user = session
            .register("Maria", "maria@fazenda.br", "segredo", "segredo")
            .await
            .unwrap();
        assert!(session.is_authenticated().await.unwrap());
        assert_eq!(session.current_user().await.unwrap(), Some(user.clone()));
        assert_eq!(
            SessionUser::load(&storage).await.current_user_id(),
            user.id
        );

        session.logout().await.unwrap();
        assert_eq!(session.current_user().await.unwrap(), None);
        assert_eq!(SessionUser::load(&storage).await.current_user_id(), "guest");

        let again = session.login("maria@fazenda.br", "segredo").await.unwrap();
        assert_eq!(again, user);
        assert!(matches!(
            session.login("maria@fazenda.br", "errado").await,
            Err(SessionError::InvalidCredentials)
        ));
        assert!(matches!(
            session.login("joao@fazenda.br", "segredo").await,
            Err(SessionError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn test_register_rejections() {
        let session = Session::new(MemoryStorage::new());
        assert!(matches!(
            session.register("Maria", "m@f.br", "a", "b").await,
            Err(SessionError::PasswordMismatch)
        ));
        assert!(matches!(
            session.register(" ", "m@f.br", "a", "a").await,
            Err(SessionError::MissingField("name"))
        ));
        session.register("Maria", "m@f.br", "a", "a").await.unwrap();
        assert!(matches!(
            session.register("Outra", "m@f.br", "b", "b").await,
            Err(SessionError::EmailTaken(_))
        ));
    }

    #[tokio::test]
    async fn test_corrupt_session_is_guest() {
        let storage = MemoryStorage::new();
        storage.set(USER, "{not json").await.unwrap();
        assert_eq!(SessionUser::load(&storage).await.current_user_id(), "guest");
    }
}
