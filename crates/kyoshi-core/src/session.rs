use std::sync::Arc;

use kyoshi_storage::KeyValueStore;
use kyoshi_types::User;

use crate::error::SessionError;
use crate::library::StorageScope;

/// Record holding the active identity between runs.
pub const CURRENT_USER_KEY: &str = "currentUser";

/// Identity state. `Unresolved` until the persisted current user has been
/// read; no library persistence may happen before that.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Session {
    #[default]
    Unresolved,
    Anonymous,
    Authenticated(User),
}

/// Maps the no-identity state to a named identity and decides which
/// persisted collection set is active. Identity is self-asserted; there is
/// no credential check.
pub struct SessionGate {
    store: Arc<dyn KeyValueStore>,
    session: Session,
}

impl SessionGate {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            session: Session::Unresolved,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn current_user(&self) -> Option<&User> {
        match &self.session {
            Session::Authenticated(user) => Some(user),
            _ => None,
        }
    }

    /// Storage scope for the active session; `None` while unresolved.
    pub fn scope(&self) -> Option<StorageScope> {
        match &self.session {
            Session::Unresolved => None,
            Session::Anonymous => Some(StorageScope::Anonymous),
            Session::Authenticated(user) => Some(StorageScope::User(user.username.clone())),
        }
    }

    /// Read the persisted current user once at startup. A missing or
    /// corrupt record resolves to anonymous.
    pub fn resolve(&mut self) -> &Session {
        if self.session != Session::Unresolved {
            return &self.session;
        }

        self.session = match self.store.get(CURRENT_USER_KEY) {
            Ok(Some(raw)) => match serde_json::from_str::<User>(&raw) {
                Ok(user) => Session::Authenticated(user),
                Err(e) => {
                    tracing::warn!("corrupt current-user record, starting anonymous: {e}");
                    Session::Anonymous
                }
            },
            Ok(None) => Session::Anonymous,
            Err(e) => {
                tracing::warn!("could not read current user, starting anonymous: {e}");
                Session::Anonymous
            }
        };
        &self.session
    }

    /// Trims the username, rejects empty input, persists the identity
    /// record. Persistence is best-effort; the login still succeeds.
    pub fn login(&mut self, username: &str) -> Result<User, SessionError> {
        let username = username.trim();
        if username.is_empty() {
            return Err(SessionError::EmptyUsername);
        }

        let user = User {
            username: username.to_string(),
        };
        match serde_json::to_string(&user) {
            Ok(json) => {
                if let Err(e) = self.store.set(CURRENT_USER_KEY, &json) {
                    tracing::warn!("could not persist current user: {e}");
                }
            }
            Err(e) => tracing::warn!("could not serialize current user: {e}"),
        }

        self.session = Session::Authenticated(user.clone());
        Ok(user)
    }

    /// Back to anonymous. Removes the identity record only; per-user
    /// libraries stay on disk.
    pub fn logout(&mut self) {
        if let Err(e) = self.store.remove(CURRENT_USER_KEY) {
            tracing::warn!("could not remove current-user record: {e}");
        }
        self.session = Session::Anonymous;
    }
}
