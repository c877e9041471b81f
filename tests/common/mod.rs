#![allow(dead_code)]

use std::sync::Arc;

use brutalmotors::auth::AuthContext;
use brutalmotors::gateway::MemoryGateway;
use brutalmotors::models::Credential;
use brutalmotors::session::MemorySessionStore;

pub const ADMIN_EMAIL: &str = "admin@brutalmotors.com";
pub const ADMIN_PASSWORD: &str = "admin123";
pub const USER_EMAIL: &str = "user@example.com";
pub const USER_PASSWORD: &str = "user123";

/// In-process stack against the seeded in-memory backend: one gateway, one
/// shared session slot, one auth context wired to both.
pub struct Harness {
    pub gateway: Arc<MemoryGateway>,
    pub sessions: MemorySessionStore,
    pub auth: AuthContext,
}

pub fn harness() -> Harness {
    let gateway = Arc::new(MemoryGateway::with_demo_data());
    let sessions = MemorySessionStore::new();
    let auth = AuthContext::new(gateway.clone(), Arc::new(sessions.clone()));
    Harness {
        gateway,
        sessions,
        auth,
    }
}

pub fn password_credential(email: &str, password: &str) -> Credential {
    Credential::EmailPassword {
        email: email.to_string(),
        password: password.to_string(),
    }
}

pub async fn sign_in_admin(harness: &Harness) {
    let ok = harness
        .auth
        .login(password_credential(ADMIN_EMAIL, ADMIN_PASSWORD))
        .await;
    assert!(ok, "demo admin login should succeed");
}

pub async fn sign_in_user(harness: &Harness) {
    let ok = harness
        .auth
        .login(password_credential(USER_EMAIL, USER_PASSWORD))
        .await;
    assert!(ok, "demo user login should succeed");
}
