//! Request/response state cells bridging one entity read to its consumers.
//!
//! Each hook owns a [`FetchState`] published through a watch channel:
//! `is_loading` while a request is in flight, a short `error` on failure
//! with the last good `data` preserved, and explicit `refetch` only (no
//! automatic retry). A request token makes settlements last-writer-wins, so
//! a stale in-flight response never clobbers a newer one.

pub mod appointments;
pub mod vehicles;

use std::sync::atomic::{AtomicU64, Ordering};

use thiserror::Error;
use tokio::sync::watch;

pub use appointments::AppointmentsHook;
pub use vehicles::{VehicleDetailHook, VehicleListHook};

/// Failure surfaced to the UI. Not-found is deliberately distinct from
/// transport trouble so pages can render a "no such vehicle" state instead
/// of a generic error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchFailure {
    #[error("not found")]
    NotFound,
    #[error("{0}")]
    Transport(String),
}

#[derive(Debug, Clone)]
pub struct FetchState<T> {
    pub data: T,
    pub is_loading: bool,
    pub error: Option<FetchFailure>,
}

impl<T> FetchState<T> {
    fn idle(data: T) -> Self {
        Self {
            data,
            is_loading: false,
            error: None,
        }
    }
}

/// Shared cell machinery: one watch channel plus a request counter.
pub(crate) struct Cell<T> {
    tx: watch::Sender<FetchState<T>>,
    seq: AtomicU64,
}

impl<T: Clone> Cell<T> {
    pub(crate) fn new(empty: T) -> Self {
        let (tx, _) = watch::channel(FetchState::idle(empty));
        Self {
            tx,
            seq: AtomicU64::new(0),
        }
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<FetchState<T>> {
        self.tx.subscribe()
    }

    pub(crate) fn snapshot(&self) -> FetchState<T> {
        self.tx.borrow().clone()
    }

    /// Mark a request in flight and return its token. Previous data stays
    /// visible while loading.
    pub(crate) fn begin(&self) -> u64 {
        let token = self.seq.fetch_add(1, Ordering::SeqCst) + 1;
        self.tx.send_modify(|state| state.is_loading = true);
        token
    }

    /// Settle a request. Ignored if a newer request has started since.
    pub(crate) fn finish(&self, token: u64, outcome: Result<T, FetchFailure>) {
        if self.seq.load(Ordering::SeqCst) != token {
            tracing::trace!(token, "dropping stale fetch settlement");
            return;
        }
        match outcome {
            Ok(data) => {
                self.tx.send_replace(FetchState::idle(data));
            }
            Err(failure) => {
                self.tx.send_modify(|state| {
                    state.is_loading = false;
                    state.error = Some(failure);
                });
            }
        }
    }

    /// Settle with a full replacement state (used for the not-found case,
    /// where stale data must not linger).
    pub(crate) fn finish_with(&self, token: u64, state: FetchState<T>) {
        if self.seq.load(Ordering::SeqCst) != token {
            tracing::trace!(token, "dropping stale fetch settlement");
            return;
        }
        self.tx.send_replace(state);
    }

    /// Return to the initial empty state and invalidate anything in flight.
    pub(crate) fn reset(&self, empty: T) {
        self.seq.fetch_add(1, Ordering::SeqCst);
        self.tx.send_replace(FetchState::idle(empty));
    }

    pub(crate) fn set_error(&self, failure: FetchFailure) {
        self.tx.send_modify(|state| state.error = Some(failure));
    }

    pub(crate) fn clear_error(&self) {
        self.tx.send_modify(|state| state.error = None);
    }
}

/// Wait until the observed state is not loading and return it.
pub async fn settled<T: Clone>(rx: &mut watch::Receiver<FetchState<T>>) -> FetchState<T> {
    loop {
        let state = rx.borrow_and_update().clone();
        if !state.is_loading {
            return state;
        }
        if rx.changed().await.is_err() {
            return state;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stale_settlement_is_dropped() {
        let cell: Cell<Vec<u32>> = Cell::new(Vec::new());

        let first = cell.begin();
        let second = cell.begin();

        // The later request settles first and wins.
        cell.finish(second, Ok(vec![2]));
        cell.finish(first, Ok(vec![1]));

        let state = cell.snapshot();
        assert_eq!(state.data, vec![2]);
        assert!(!state.is_loading);
    }

    #[test]
    fn failure_preserves_previous_data() {
        let cell: Cell<Vec<u32>> = Cell::new(Vec::new());

        let token = cell.begin();
        cell.finish(token, Ok(vec![1, 2]));

        let token = cell.begin();
        cell.finish(token, Err(FetchFailure::Transport("boom".into())));

        let state = cell.snapshot();
        assert_eq!(state.data, vec![1, 2]);
        assert_eq!(state.error, Some(FetchFailure::Transport("boom".into())));
        assert!(!state.is_loading);
    }

    #[test]
    fn reset_invalidates_in_flight_requests() {
        let cell: Cell<Vec<u32>> = Cell::new(Vec::new());

        let token = cell.begin();
        cell.reset(Vec::new());
        cell.finish(token, Ok(vec![9]));

        let state = cell.snapshot();
        assert!(state.data.is_empty());
        assert!(!state.is_loading);
    }
}
