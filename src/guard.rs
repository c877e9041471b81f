use tokio::sync::watch;

use crate::auth::AuthState;

/// The one authorization predicate. Every privilege check in the app goes
/// through here rather than comparing role flags inline.
pub fn is_administrator(state: &AuthState) -> bool {
    matches!(state, AuthState::Authenticated(identity) if identity.is_administrator)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectTarget {
    Home,
    Login,
}

/// What the guarded surface should do right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    /// Session still bootstrapping: show a neutral placeholder. Neither the
    /// protected content nor a redirect may flash early.
    Pending,
    Grant,
    Redirect(RedirectTarget),
}

pub fn evaluate(state: &AuthState) -> GateDecision {
    match state {
        AuthState::Unknown => GateDecision::Pending,
        AuthState::Anonymous => GateDecision::Redirect(RedirectTarget::Login),
        AuthState::Authenticated(_) if is_administrator(state) => GateDecision::Grant,
        AuthState::Authenticated(_) => GateDecision::Redirect(RedirectTarget::Home),
    }
}

/// Structural gate in front of administrator-only surfaces. Re-evaluates
/// whenever the auth context's output changes, so an admin logging out (or
/// a promotion taking effect) re-gates without any manual reload.
pub struct AdminGate {
    auth: watch::Receiver<AuthState>,
}

impl AdminGate {
    pub fn new(auth: watch::Receiver<AuthState>) -> Self {
        Self { auth }
    }

    pub fn decision(&mut self) -> GateDecision {
        evaluate(&self.auth.borrow_and_update())
    }

    /// Wait for the next auth transition and return the fresh decision.
    /// `None` once the auth context is gone.
    pub async fn changed(&mut self) -> Option<GateDecision> {
        self.auth.changed().await.ok()?;
        Some(self.decision())
    }
}
