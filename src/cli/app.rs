use std::sync::Arc;

use anyhow::Context;

use crate::auth::AuthContext;
use crate::config;
use crate::gateway::{self, PersistenceGateway};
use crate::guard::{evaluate, GateDecision, RedirectTarget};
use crate::session::{FileSessionStore, SessionStore};

/// Everything a command needs: the configured gateway and a bootstrapped
/// auth context. Bootstrap always completes here, before any command logic
/// or guard decision runs.
pub struct App {
    pub gateway: Arc<dyn PersistenceGateway>,
    pub auth: AuthContext,
}

impl App {
    pub async fn init() -> anyhow::Result<Self> {
        let config = config::config();

        let gateway = gateway::from_config(config).context("could not initialize backend gateway")?;
        let session: Arc<dyn SessionStore> = Arc::new(
            FileSessionStore::from_config(config).context("could not open session storage")?,
        );

        let auth = AuthContext::new(gateway.clone(), session);
        auth.bootstrap().await;

        Ok(Self { gateway, auth })
    }

    /// Admit only an authenticated administrator; the command-line analog of
    /// the admin route redirect.
    pub fn require_admin(&self) -> anyhow::Result<()> {
        match evaluate(&self.auth.state()) {
            GateDecision::Grant => Ok(()),
            GateDecision::Redirect(RedirectTarget::Login) => {
                anyhow::bail!("sign in first: motors auth login <email>")
            }
            GateDecision::Redirect(RedirectTarget::Home) => {
                anyhow::bail!("administrator access required")
            }
            // Bootstrap ran in init(), so the state is never still unknown.
            GateDecision::Pending => anyhow::bail!("session state not resolved"),
        }
    }
}
