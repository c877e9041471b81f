use serde::{Deserialize, Serialize};

/// Signed-in user profile plus role flag. The `id` is opaque and stable for
/// the lifetime of the account; exactly one Identity is current at a time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub id: String,
    pub name: String,
    /// Empty for phone-only accounts.
    #[serde(default)]
    pub email: String,
    pub phone: String,
    pub is_administrator: bool,
}

/// Credential presented at login. The gateway must fail uniformly for both
/// variants: callers can never tell an unknown account from a bad secret.
#[derive(Debug, Clone)]
pub enum Credential {
    EmailPassword { email: String, password: String },
    PhoneCode { phone: String, code: String },
}

impl Credential {
    /// Loggable handle for diagnostics. Never includes the secret.
    pub fn subject(&self) -> &str {
        match self {
            Credential::EmailPassword { email, .. } => email,
            Credential::PhoneCode { phone, .. } => phone,
        }
    }
}

/// Validated registration payload. Produced only by
/// [`crate::auth::RegistrationForm::validate`], so password policy checks
/// happen at the call site and rejected forms never reach the auth context.
#[derive(Debug, Clone)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub password: String,
}
