// Session guard - presentational gating of protected views on token presence
//
// The guard never talks to the server. A present token is trusted as-is; a
// missing token turns into an explicit Navigation command that the host view
// awaits before deciding what to render.

use async_trait::async_trait;
use thiserror::Error;

use super::SessionContext;

#[derive(Debug, Error)]
pub enum GuardError {
    #[error("Navigation to '{target}' failed: {message}")]
    Navigation { target: String, message: String },
}

/// What the consuming view is allowed to render
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GuardState {
    pub is_authenticated: bool,
    pub loading: bool,
}

impl GuardState {
    /// Before evaluation: unauthenticated and still loading
    pub const PENDING: GuardState = GuardState {
        is_authenticated: false,
        loading: true,
    };

    pub const AUTHENTICATED: GuardState = GuardState {
        is_authenticated: true,
        loading: false,
    };

    /// Only an authenticated, settled state may render protected content
    pub fn can_render(&self) -> bool {
        self.is_authenticated && !self.loading
    }
}

/// Navigation command produced when no credential is present
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation {
    pub target: String,
}

/// Host-side executor for navigation commands
#[async_trait]
pub trait Navigator: Send + Sync {
    async fn navigate(&self, navigation: &Navigation) -> Result<(), GuardError>;
}

/// Per-mount session guard.
///
/// Evaluates once; a later call is a no-op unless the redirect target has
/// changed since the last evaluation.
#[derive(Debug, Clone)]
pub struct SessionGuard {
    redirect_target: String,
    state: GuardState,
    armed: bool,
}

impl SessionGuard {
    pub const DEFAULT_REDIRECT: &'static str = "/auth/login";

    pub fn new() -> Self {
        Self::with_redirect(Self::DEFAULT_REDIRECT)
    }

    pub fn with_redirect(target: impl Into<String>) -> Self {
        Self {
            redirect_target: target.into(),
            state: GuardState::PENDING,
            armed: true,
        }
    }

    pub fn redirect_target(&self) -> &str {
        &self.redirect_target
    }

    pub fn state(&self) -> GuardState {
        self.state
    }

    /// Re-arms the guard when the target actually changes
    pub fn set_redirect_target(&mut self, target: impl Into<String>) {
        let target = target.into();
        if target != self.redirect_target {
            self.redirect_target = target;
            self.armed = true;
        }
    }

    /// Synchronously read the session and decide. Returns the navigation the
    /// host must perform, if any. State is left pending on redirect.
    pub fn evaluate(&mut self, session: &SessionContext) -> Option<Navigation> {
        if !self.armed {
            return None;
        }
        self.armed = false;

        if session.has_token() {
            self.state = GuardState::AUTHENTICATED;
            None
        } else {
            // An earlier authenticated evaluation must not outlive the redirect
            self.state = GuardState::PENDING;
            tracing::debug!("No session token, redirecting to {}", self.redirect_target);
            Some(Navigation {
                target: self.redirect_target.clone(),
            })
        }
    }

    /// Evaluate and await any resulting navigation before returning the state
    pub async fn run<N>(&mut self, session: &SessionContext, navigator: &N) -> Result<GuardState, GuardError>
    where
        N: Navigator + ?Sized,
    {
        if let Some(navigation) = self.evaluate(session) {
            navigator.navigate(&navigation).await?;
        }
        Ok(self.state)
    }
}

impl Default for SessionGuard {
    fn default() -> Self {
        Self::new()
    }
}

/// CLI navigator: there is no page to load, so point the user at the login command
#[derive(Debug, Clone)]
pub struct TerminalNavigator {
    login_hint: String,
}

impl TerminalNavigator {
    pub fn new(login_hint: impl Into<String>) -> Self {
        Self {
            login_hint: login_hint.into(),
        }
    }
}

impl Default for TerminalNavigator {
    fn default() -> Self {
        Self::new("finpal auth login --token <TOKEN>")
    }
}

#[async_trait]
impl Navigator for TerminalNavigator {
    async fn navigate(&self, navigation: &Navigation) -> Result<(), GuardError> {
        tracing::warn!("Not authenticated, redirecting to {}", navigation.target);
        eprintln!("Not logged in. Run `{}` to continue.", self.login_hint);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionToken;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingNavigator {
        targets: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Navigator for RecordingNavigator {
        async fn navigate(&self, navigation: &Navigation) -> Result<(), GuardError> {
            self.targets.lock().unwrap().push(navigation.target.clone());
            Ok(())
        }
    }

    struct FailingNavigator;

    #[async_trait]
    impl Navigator for FailingNavigator {
        async fn navigate(&self, navigation: &Navigation) -> Result<(), GuardError> {
            Err(GuardError::Navigation {
                target: navigation.target.clone(),
                message: "router unmounted".to_string(),
            })
        }
    }

    fn signed_in() -> SessionContext {
        SessionContext::in_memory(SessionToken::parse("token-123"))
    }

    #[tokio::test]
    async fn test_missing_token_redirects_once_to_default() {
        let session = SessionContext::in_memory(None);
        let navigator = RecordingNavigator::default();
        let mut guard = SessionGuard::new();

        let state = guard.run(&session, &navigator).await.unwrap();
        assert_eq!(state, GuardState::PENDING);
        assert!(!state.can_render());

        // Same mount, same target: no second redirect
        let state = guard.run(&session, &navigator).await.unwrap();
        assert!(!state.is_authenticated);

        assert_eq!(*navigator.targets.lock().unwrap(), vec!["/auth/login".to_string()]);
    }

    #[tokio::test]
    async fn test_custom_redirect_target() {
        let session = SessionContext::in_memory(None);
        let navigator = RecordingNavigator::default();
        let mut guard = SessionGuard::with_redirect("/welcome");

        guard.run(&session, &navigator).await.unwrap();
        assert_eq!(*navigator.targets.lock().unwrap(), vec!["/welcome".to_string()]);
    }

    #[tokio::test]
    async fn test_present_token_authenticates_without_redirect() {
        let navigator = RecordingNavigator::default();
        let mut guard = SessionGuard::new();

        let state = guard.run(&signed_in(), &navigator).await.unwrap();
        assert_eq!(state, GuardState::AUTHENTICATED);
        assert!(state.can_render());
        assert!(navigator.targets.lock().unwrap().is_empty());
    }

    #[test]
    fn test_changed_target_rearms_guard() {
        let session = SessionContext::in_memory(None);
        let mut guard = SessionGuard::new();

        assert!(guard.evaluate(&session).is_some());
        assert!(guard.evaluate(&session).is_none());

        guard.set_redirect_target("/auth/login");
        assert!(guard.evaluate(&session).is_none());

        guard.set_redirect_target("/signin");
        assert_eq!(
            guard.evaluate(&session),
            Some(Navigation { target: "/signin".to_string() })
        );
    }

    #[tokio::test]
    async fn test_logout_then_rearm_drops_authenticated_state() {
        let session = signed_in();
        let navigator = RecordingNavigator::default();
        let mut guard = SessionGuard::new();

        let state = guard.run(&session, &navigator).await.unwrap();
        assert!(state.can_render());

        session.logout().unwrap();
        guard.set_redirect_target("/signin");

        let state = guard.run(&session, &navigator).await.unwrap();
        assert_eq!(state, GuardState::PENDING);
        assert!(!state.can_render());
        assert_eq!(*navigator.targets.lock().unwrap(), vec!["/signin".to_string()]);
    }

    #[tokio::test]
    async fn test_navigation_failure_reaches_host() {
        let session = SessionContext::in_memory(None);
        let mut guard = SessionGuard::new();

        let err = guard.run(&session, &FailingNavigator).await.unwrap_err();
        assert!(err.to_string().contains("/auth/login"));
        assert!(!guard.state().is_authenticated);
    }
}
