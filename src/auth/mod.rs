use std::sync::Arc;

use thiserror::Error;
use tokio::sync::watch;

use crate::gateway::{GatewayError, PersistenceGateway};
use crate::models::{Credential, Identity, Registration};
use crate::session::SessionStore;

pub const MIN_PASSWORD_LEN: usize = 6;

/// Where the session state machine currently stands. `Unknown` exists only
/// between construction and the completion of [`AuthContext::bootstrap`];
/// afterwards the state is always `Anonymous` or `Authenticated`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthState {
    Unknown,
    Anonymous,
    Authenticated(Identity),
}

impl AuthState {
    pub fn identity(&self) -> Option<&Identity> {
        match self {
            AuthState::Authenticated(identity) => Some(identity),
            _ => None,
        }
    }
}

/// Raw sign-up form as submitted. Password policy is enforced here, at the
/// call site, so a rejected form never reaches the auth context (and the
/// current identity provably cannot change).
#[derive(Debug, Clone)]
pub struct RegistrationForm {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub password: String,
    pub confirm_password: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistrationError {
    #[error("passwords do not match")]
    PasswordMismatch,
    #[error("password must be at least {minimum} characters")]
    PasswordTooShort { minimum: usize },
}

impl RegistrationForm {
    pub fn validate(self) -> Result<Registration, RegistrationError> {
        if self.password != self.confirm_password {
            return Err(RegistrationError::PasswordMismatch);
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(RegistrationError::PasswordTooShort {
                minimum: MIN_PASSWORD_LEN,
            });
        }
        Ok(Registration {
            name: self.name,
            email: self.email,
            phone: self.phone,
            password: self.password,
        })
    }
}

/// Single source of truth for "who is signed in and with what privilege".
/// Constructed once at startup and shared by reference; the session record
/// and the current state are mutated exclusively through the four operations
/// here ([`bootstrap`](Self::bootstrap), [`login`](Self::login),
/// [`register`](Self::register), [`logout`](Self::logout)).
pub struct AuthContext {
    gateway: Arc<dyn PersistenceGateway>,
    session: Arc<dyn SessionStore>,
    state: watch::Sender<AuthState>,
}

impl AuthContext {
    pub fn new(gateway: Arc<dyn PersistenceGateway>, session: Arc<dyn SessionStore>) -> Self {
        let (state, _) = watch::channel(AuthState::Unknown);
        Self {
            gateway,
            session,
            state,
        }
    }

    /// Resolve the startup session exactly once. Reads the session record,
    /// asks the gateway to revalidate it (realization-dependent: the mock
    /// trusts the cached copy, the hosted backend re-fetches the profile),
    /// and lands on `Authenticated` or `Anonymous`. Never fails: every
    /// fault degrades to signed-out.
    pub async fn bootstrap(&self) {
        let cached = match self.session.read() {
            Ok(cached) => cached,
            Err(err) => {
                tracing::warn!(%err, "session store unreadable at bootstrap");
                None
            }
        };

        let next = match cached {
            None => AuthState::Anonymous,
            Some(cached) => match self.gateway.resume(cached).await {
                Ok(fresh) => {
                    // Keep the cached copy in sync with the authoritative
                    // profile (name or role may have changed).
                    if let Err(err) = self.session.write(&fresh) {
                        tracing::warn!(%err, "could not refresh session record");
                    }
                    AuthState::Authenticated(fresh)
                }
                Err(GatewayError::NotFound(_)) => {
                    tracing::info!("stored session references a deleted account, clearing");
                    self.clear_session_best_effort();
                    AuthState::Anonymous
                }
                Err(err) => {
                    // Do not trust the cached role when revalidation is
                    // impossible; keep the record for a later retry.
                    tracing::warn!(%err, "session revalidation failed, starting signed out");
                    AuthState::Anonymous
                }
            },
        };

        self.state.send_replace(next);
    }

    /// Verify a credential and sign in. Uniform outcome: `false` covers
    /// unknown accounts, bad secrets, and transport faults alike, and the
    /// current identity is left untouched on failure.
    pub async fn login(&self, credential: Credential) -> bool {
        match self.gateway.authenticate(&credential).await {
            Ok(identity) => {
                self.persist_and_set(identity);
                true
            }
            Err(GatewayError::InvalidCredentials) => {
                tracing::debug!(subject = credential.subject(), "login rejected");
                false
            }
            Err(err) => {
                tracing::error!(%err, "login failed");
                false
            }
        }
    }

    /// Create an account and sign in as it. Takes a [`Registration`], which
    /// only [`RegistrationForm::validate`] produces. New accounts are never
    /// administrators.
    pub async fn register(&self, registration: Registration) -> bool {
        match self.gateway.register_account(&registration).await {
            Ok(identity) => {
                self.persist_and_set(identity);
                true
            }
            Err(err) => {
                tracing::error!(%err, "registration failed");
                false
            }
        }
    }

    /// Sign out and drop the session record. A no-op when already signed
    /// out.
    pub fn logout(&self) {
        if matches!(&*self.state.borrow(), AuthState::Anonymous) {
            return;
        }
        self.clear_session_best_effort();
        self.state.send_replace(AuthState::Anonymous);
    }

    pub fn identity(&self) -> Option<Identity> {
        self.state.borrow().identity().cloned()
    }

    /// True from construction until [`bootstrap`](Self::bootstrap) resolves,
    /// so consumers can tell "not yet known" from "known signed out".
    pub fn is_loading(&self) -> bool {
        matches!(&*self.state.borrow(), AuthState::Unknown)
    }

    pub fn state(&self) -> AuthState {
        self.state.borrow().clone()
    }

    /// Reactive output for the route guard and the appointments hook.
    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }

    fn persist_and_set(&self, identity: Identity) {
        if let Err(err) = self.session.write(&identity) {
            // The in-memory session still works for this run.
            tracing::warn!(%err, "could not persist session record");
        }
        self.state.send_replace(AuthState::Authenticated(identity));
    }

    fn clear_session_best_effort(&self) {
        if let Err(err) = self.session.clear() {
            tracing::warn!(%err, "could not clear session record");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(password: &str, confirm: &str) -> RegistrationForm {
        RegistrationForm {
            name: "John Doe".into(),
            email: "john@example.com".into(),
            phone: "555-0100".into(),
            password: password.into(),
            confirm_password: confirm.into(),
        }
    }

    #[test]
    fn mismatched_confirmation_rejected() {
        assert_eq!(
            form("abcdef", "abcdeg").validate().unwrap_err(),
            RegistrationError::PasswordMismatch
        );
    }

    #[test]
    fn short_password_rejected() {
        assert_eq!(
            form("abc", "abc").validate().unwrap_err(),
            RegistrationError::PasswordTooShort { minimum: 6 }
        );
    }

    #[test]
    fn minimum_length_password_accepted() {
        let registration = form("abcdef", "abcdef").validate().unwrap();
        assert_eq!(registration.email, "john@example.com");
    }
}
