pub mod guard;
pub mod store;

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use thiserror::Error;

pub use guard::{GuardError, GuardState, Navigation, Navigator, SessionGuard, TerminalNavigator};
pub use store::{FileTokenStore, MemoryTokenStore, TokenStore};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Session storage error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Session file is not valid JSON: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Session storage lock poisoned")]
    Poisoned,
}

/// Opaque credential proving a prior login. Never validated client-side.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken(String);

impl SessionToken {
    /// Blank or whitespace-only values are treated as no token at all
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionToken(***)")
    }
}

/// Session state injected into every protected view at startup.
///
/// The token is read once from the backing [`TokenStore`] when the context is
/// built. [`SessionContext::login`] and [`SessionContext::logout`] are the only
/// writers; everything else reads.
#[derive(Clone)]
pub struct SessionContext {
    token: Arc<RwLock<Option<SessionToken>>>,
    store: Arc<dyn TokenStore>,
}

impl SessionContext {
    pub fn load(store: Arc<dyn TokenStore>) -> Result<Self, SessionError> {
        let token = store.load()?;
        tracing::debug!("Session context loaded (token present: {})", token.is_some());
        Ok(Self {
            token: Arc::new(RwLock::new(token)),
            store,
        })
    }

    /// Context backed by a fresh in-memory store
    pub fn in_memory(token: Option<SessionToken>) -> Self {
        let store = match token.clone() {
            Some(t) => MemoryTokenStore::with_token(t),
            None => MemoryTokenStore::new(),
        };
        Self {
            token: Arc::new(RwLock::new(token)),
            store: Arc::new(store),
        }
    }

    pub fn token(&self) -> Option<SessionToken> {
        self.token.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn has_token(&self) -> bool {
        self.token.read().unwrap_or_else(PoisonError::into_inner).is_some()
    }

    pub fn login(&self, token: SessionToken) -> Result<(), SessionError> {
        self.store.save(&token)?;
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = Some(token);
        tracing::info!("Session token stored");
        Ok(())
    }

    pub fn logout(&self) -> Result<(), SessionError> {
        self.store.clear()?;
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = None;
        tracing::info!("Session token cleared");
        Ok(())
    }
}

impl fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionContext")
            .field("authenticated", &self.has_token())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_parse_trims_and_rejects_blank() {
        assert!(SessionToken::parse("").is_none());
        assert!(SessionToken::parse(" \n\t").is_none());
        assert_eq!(SessionToken::parse("  abc ").unwrap().as_str(), "abc");
    }

    #[test]
    fn test_token_debug_is_redacted() {
        let token = SessionToken::parse("secret-value").unwrap();
        assert!(!format!("{:?}", token).contains("secret-value"));
    }

    #[test]
    fn test_login_logout_persist_through_store() {
        let store: Arc<dyn TokenStore> = Arc::new(MemoryTokenStore::new());
        let ctx = SessionContext::load(store.clone()).unwrap();
        assert!(!ctx.has_token());

        ctx.login(SessionToken::parse("abc").unwrap()).unwrap();
        assert!(ctx.has_token());
        assert_eq!(store.load().unwrap().unwrap().as_str(), "abc");

        // A clone sees the same session
        let view = ctx.clone();
        ctx.logout().unwrap();
        assert!(!view.has_token());
        assert!(store.load().unwrap().is_none());
    }
}
