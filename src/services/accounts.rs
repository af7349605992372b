//! User accounts, sessions and favorite movies.
//!
//! Persistence goes through the [`AccountStore`] trait so the same service runs
//! against PostgreSQL in production and an in-memory store in tests or when no
//! database is configured. Sessions live in memory only and expire after a
//! configurable lifetime.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{Favorite, LoginRequest, MovieId, RegisterRequest, Session, User, UserRecord},
};

pub const MIN_PASSWORD_LEN: usize = 6;

/// Session lifetime used unless [`AccountService::with_session_ttl`] says otherwise
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Live sessions kept per user; older ones are dropped on login
pub const MAX_SESSIONS_PER_USER: usize = 5;

/// Storage for users and their favorites
#[async_trait::async_trait]
pub trait AccountStore: Send + Sync {
    /// Creates a user, failing with `Conflict` when the username is taken
    async fn create_user(&self, username: &str, password_hash: &str) -> AppResult<User>;

    async fn find_user(&self, username: &str) -> AppResult<Option<UserRecord>>;

    /// Adds a favorite; adding an existing one is a no-op
    async fn add_favorite(&self, user_id: i64, movie_id: &MovieId) -> AppResult<()>;

    /// Removes a favorite, returning whether it existed
    async fn remove_favorite(&self, user_id: i64, movie_id: &MovieId) -> AppResult<bool>;

    /// Favorites of a user, oldest first
    async fn list_favorites(&self, user_id: i64) -> AppResult<Vec<Favorite>>;

    /// Store name for logging and debugging
    fn name(&self) -> &'static str;
}

/// SHA-256 hex digest of a password
pub fn hash_password(password: &str) -> String {
    format!("{:x}", Sha256::digest(password.as_bytes()))
}

#[derive(Default)]
struct InMemoryState {
    next_user_id: i64,
    users: HashMap<String, UserRecord>,
    favorites: Vec<Favorite>,
}

/// Account store kept in process memory
#[derive(Default)]
pub struct InMemoryAccountStore {
    inner: RwLock<InMemoryState>,
}

impl InMemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl AccountStore for InMemoryAccountStore {
    async fn create_user(&self, username: &str, password_hash: &str) -> AppResult<User> {
        let mut state = self.inner.write().await;
        if state.users.contains_key(username) {
            return Err(AppError::Conflict(format!(
                "Username '{}' is already taken",
                username
            )));
        }

        state.next_user_id += 1;
        let user = User {
            user_id: state.next_user_id,
            username: username.to_string(),
            created_at: Utc::now(),
        };
        state.users.insert(
            username.to_string(),
            UserRecord {
                user: user.clone(),
                password_hash: password_hash.to_string(),
            },
        );

        Ok(user)
    }

    async fn find_user(&self, username: &str) -> AppResult<Option<UserRecord>> {
        Ok(self.inner.read().await.users.get(username).cloned())
    }

    async fn add_favorite(&self, user_id: i64, movie_id: &MovieId) -> AppResult<()> {
        let mut state = self.inner.write().await;
        let exists = state
            .favorites
            .iter()
            .any(|f| f.user_id == user_id && &f.movie_id == movie_id);

        if !exists {
            state.favorites.push(Favorite {
                user_id,
                movie_id: movie_id.clone(),
                added_at: Utc::now(),
            });
        }
        Ok(())
    }

    async fn remove_favorite(&self, user_id: i64, movie_id: &MovieId) -> AppResult<bool> {
        let mut state = self.inner.write().await;
        let before = state.favorites.len();
        state
            .favorites
            .retain(|f| !(f.user_id == user_id && &f.movie_id == movie_id));
        Ok(state.favorites.len() != before)
    }

    async fn list_favorites(&self, user_id: i64) -> AppResult<Vec<Favorite>> {
        Ok(self
            .inner
            .read()
            .await
            .favorites
            .iter()
            .filter(|f| f.user_id == user_id)
            .cloned()
            .collect())
    }

    fn name(&self) -> &'static str {
        "in-memory"
    }
}

#[derive(Default)]
struct SessionTable {
    next_login: u64,
    /// Session and its login sequence number, which orders same-instant logins
    live: HashMap<Uuid, (u64, Session)>,
}

/// Registration, login and favorites on top of an [`AccountStore`]
pub struct AccountService {
    store: Arc<dyn AccountStore>,
    sessions: RwLock<SessionTable>,
    session_ttl: Duration,
}

impl AccountService {
    pub fn new(store: Arc<dyn AccountStore>) -> Self {
        Self {
            store,
            sessions: RwLock::new(SessionTable::default()),
            session_ttl: DEFAULT_SESSION_TTL,
        }
    }

    pub fn with_session_ttl(mut self, session_ttl: Duration) -> Self {
        self.session_ttl = session_ttl;
        self
    }

    /// A clock that moved backwards leaves the session valid
    fn is_expired(&self, session: &Session, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(session.issued_at)
            .to_std()
            .is_ok_and(|age| age >= self.session_ttl)
    }

    pub async fn register(&self, request: RegisterRequest) -> AppResult<User> {
        let username = request.username.trim();
        if username.is_empty() {
            return Err(AppError::InvalidInput(
                "Username cannot be empty".to_string(),
            ));
        }
        if request.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AppError::InvalidInput(format!(
                "Password must be at least {} characters",
                MIN_PASSWORD_LEN
            )));
        }
        if request.password != request.confirm_password {
            return Err(AppError::InvalidInput(
                "Passwords do not match".to_string(),
            ));
        }

        let user = self
            .store
            .create_user(username, &hash_password(&request.password))
            .await?;

        tracing::info!(
            user_id = user.user_id,
            username = %user.username,
            store = self.store.name(),
            "User registered"
        );
        Ok(user)
    }

    pub async fn login(&self, request: LoginRequest) -> AppResult<Session> {
        let record = self
            .store
            .find_user(request.username.trim())
            .await?
            .filter(|record| record.password_hash == hash_password(&request.password))
            .ok_or_else(|| AppError::Unauthorized("Invalid username or password".to_string()))?;

        let now = Utc::now();
        let session = Session {
            token: Uuid::new_v4(),
            user_id: record.user.user_id,
            username: record.user.username,
            issued_at: now,
        };

        let mut sessions = self.sessions.write().await;
        let before = sessions.live.len();
        sessions
            .live
            .retain(|_, (_, live)| !self.is_expired(live, now));
        let expired = before - sessions.live.len();

        let mut own: Vec<(u64, Uuid)> = sessions
            .live
            .values()
            .filter(|(_, live)| live.user_id == session.user_id)
            .map(|(login, live)| (*login, live.token))
            .collect();
        own.sort_unstable();
        let evicted = (own.len() + 1).saturating_sub(MAX_SESSIONS_PER_USER);
        for (_, token) in own.iter().take(evicted) {
            sessions.live.remove(token);
        }

        let login = sessions.next_login;
        sessions.next_login += 1;
        sessions
            .live
            .insert(session.token, (login, session.clone()));
        drop(sessions);

        tracing::info!(
            user_id = session.user_id,
            expired,
            evicted,
            "User logged in"
        );
        Ok(session)
    }

    /// Drops a session, returning whether it existed
    pub async fn logout(&self, token: &Uuid) -> bool {
        self.sessions.write().await.live.remove(token).is_some()
    }

    pub async fn authenticate(&self, token: &Uuid) -> AppResult<Session> {
        let unauthorized = || AppError::Unauthorized("Invalid or expired session".to_string());

        let session = self
            .sessions
            .read()
            .await
            .live
            .get(token)
            .map(|(_, session)| session.clone())
            .ok_or_else(unauthorized)?;

        if self.is_expired(&session, Utc::now()) {
            self.sessions.write().await.live.remove(token);
            tracing::debug!(user_id = session.user_id, "Session expired");
            return Err(unauthorized());
        }

        Ok(session)
    }

    pub async fn add_favorite(&self, session: &Session, movie_id: &MovieId) -> AppResult<()> {
        self.store.add_favorite(session.user_id, movie_id).await
    }

    pub async fn remove_favorite(&self, session: &Session, movie_id: &MovieId) -> AppResult<()> {
        if self.store.remove_favorite(session.user_id, movie_id).await? {
            Ok(())
        } else {
            Err(AppError::NotFound(format!(
                "Movie {} is not in your favorites",
                movie_id
            )))
        }
    }

    pub async fn favorites(&self, session: &Session) -> AppResult<Vec<Favorite>> {
        self.store.list_favorites(session.user_id).await
    }
}
