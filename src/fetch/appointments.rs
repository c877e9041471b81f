use std::sync::{Arc, Mutex, Weak};

use tokio::sync::watch;

use super::{Cell, FetchFailure, FetchState};
use crate::auth::AuthState;
use crate::gateway::PersistenceGateway;
use crate::models::{Appointment, BookingRequest, Identity};

/// The signed-in user's appointments, scoped to their identity and reactive
/// to it: while signed out the hook issues no requests and stays empty;
/// when an identity appears it fetches exactly once for that id, and on
/// sign-out it resets without a request.
pub struct AppointmentsHook {
    inner: Arc<Inner>,
}

struct Inner {
    gateway: Arc<dyn PersistenceGateway>,
    cell: Cell<Vec<Appointment>>,
    current_user: Mutex<Option<Identity>>,
}

impl AppointmentsHook {
    /// Mount the hook against the auth context's output. The state present
    /// at mount is applied before returning (so a signed-in mount has its
    /// one scoped fetch settled); a background task follows later identity
    /// transitions for the lifetime of the hook.
    pub async fn mount(
        gateway: Arc<dyn PersistenceGateway>,
        mut auth: watch::Receiver<AuthState>,
    ) -> Self {
        let inner = Arc::new(Inner {
            gateway,
            cell: Cell::new(Vec::new()),
            current_user: Mutex::new(None),
        });

        let initial = auth.borrow_and_update().clone();
        inner.apply(initial).await;

        tokio::spawn(drive(Arc::downgrade(&inner), auth));
        Self { inner }
    }

    pub fn state(&self) -> FetchState<Vec<Appointment>> {
        self.inner.cell.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<FetchState<Vec<Appointment>>> {
        self.inner.cell.subscribe()
    }

    pub async fn refetch(&self) {
        self.inner.refetch().await;
    }

    /// Book a test drive for the current identity. A no-op returning `false`
    /// while signed out; on failure the hook's error state carries a short
    /// message and the booking is reported as not created.
    pub async fn book(&self, request: BookingRequest) -> bool {
        let Some(user) = self.inner.user() else {
            return false;
        };

        match self
            .inner
            .gateway
            .create_appointment(
                &user.id,
                &request.vehicle_id,
                request.date,
                request.time,
                &request.notes,
            )
            .await
        {
            Ok(_) => {
                self.inner.cell.clear_error();
                true
            }
            Err(err) => {
                tracing::error!(%err, "error creating appointment");
                self.inner
                    .cell
                    .set_error(FetchFailure::Transport("Failed to create appointment".into()));
                false
            }
        }
    }
}

impl Inner {
    fn user(&self) -> Option<Identity> {
        self.current_user.lock().ok().and_then(|user| user.clone())
    }

    fn set_user(&self, user: Option<Identity>) {
        if let Ok(mut slot) = self.current_user.lock() {
            *slot = user;
        }
    }

    async fn apply(&self, state: AuthState) {
        match state {
            AuthState::Authenticated(identity) => {
                self.set_user(Some(identity));
                self.refetch().await;
            }
            AuthState::Anonymous | AuthState::Unknown => {
                // Signed out: no request, and the previous user's data does
                // not linger.
                self.set_user(None);
                self.cell.reset(Vec::new());
            }
        }
    }

    async fn refetch(&self) {
        let Some(user) = self.user() else {
            return;
        };

        let token = self.cell.begin();
        match self.gateway.list_appointments(&user.id).await {
            Ok(appointments) => self.cell.finish(token, Ok(appointments)),
            Err(err) => {
                tracing::error!(%err, "error fetching appointments");
                self.cell.finish(
                    token,
                    Err(FetchFailure::Transport("Failed to fetch appointments".into())),
                );
            }
        }
    }
}

/// Follow the auth state for as long as the hook is alive. Holding only a
/// weak handle lets a dropped hook shut its watcher down.
async fn drive(inner: Weak<Inner>, mut auth: watch::Receiver<AuthState>) {
    while auth.changed().await.is_ok() {
        let state = auth.borrow_and_update().clone();
        let Some(inner) = inner.upgrade() else {
            return;
        };
        inner.apply(state).await;
    }
}
