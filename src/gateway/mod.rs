pub mod hosted;
pub mod memory;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::{AppConfig, BackendKind};
use crate::models::{Appointment, AppointmentStatus, Credential, Identity, Registration, Vehicle, VehicleDraft};

pub use hosted::HostedGateway;
pub use memory::MemoryGateway;

/// Which slice of the catalog a read should return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogScope {
    /// Only `available = true` records; what visitors see.
    Public,
    /// Every record regardless of availability; the admin inventory view.
    Admin,
}

#[derive(Debug, Error)]
pub enum GatewayError {
    /// Uniform rejection: never distinguishes an unknown account from a bad
    /// secret.
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("not found: {0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("invalid record: {0}")]
    Invalid(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("malformed response: {0}")]
    Malformed(String),
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            GatewayError::Malformed(err.to_string())
        } else {
            GatewayError::Transport(err.to_string())
        }
    }
}

/// Narrow interface to the external data store holding accounts, vehicles,
/// and appointments. Implementations surface every failure as a
/// [`GatewayError`]; nothing here panics past the boundary.
#[async_trait]
pub trait PersistenceGateway: Send + Sync {
    /// Verify a credential and return the matching account.
    async fn authenticate(&self, credential: &Credential) -> Result<Identity, GatewayError>;

    /// Create a new account. The role flag is always off: clients can never
    /// self-elevate.
    async fn register_account(&self, registration: &Registration) -> Result<Identity, GatewayError>;

    /// Revalidate a session record at bootstrap. Realizations decide how far
    /// to trust the cached copy: the mock keeps it, the hosted backend
    /// re-fetches the authoritative profile before trusting name or role.
    async fn resume(&self, cached: Identity) -> Result<Identity, GatewayError>;

    async fn fetch_profile(&self, id: &str) -> Result<Identity, GatewayError>;

    /// All accounts, newest first. Admin user-management view.
    async fn list_profiles(&self) -> Result<Vec<Identity>, GatewayError>;

    async fn set_administrator(&self, id: &str, is_administrator: bool) -> Result<Identity, GatewayError>;

    /// Vehicles ordered by creation time descending.
    async fn list_vehicles(&self, scope: CatalogScope) -> Result<Vec<Vehicle>, GatewayError>;

    async fn fetch_vehicle(&self, id: &str) -> Result<Vehicle, GatewayError>;

    async fn create_vehicle(&self, draft: &VehicleDraft) -> Result<Vehicle, GatewayError>;

    async fn update_vehicle(&self, id: &str, draft: &VehicleDraft) -> Result<Vehicle, GatewayError>;

    /// Restricted delete: fails with `Conflict` while appointments still
    /// reference the vehicle.
    async fn delete_vehicle(&self, id: &str) -> Result<(), GatewayError>;

    /// Appointments belonging to one user, date ascending.
    async fn list_appointments(&self, user_id: &str) -> Result<Vec<Appointment>, GatewayError>;

    /// Every appointment in the store. Admin back-office only.
    async fn list_all_appointments(&self) -> Result<Vec<Appointment>, GatewayError>;

    async fn create_appointment(
        &self,
        user_id: &str,
        vehicle_id: &str,
        date: chrono::NaiveDate,
        time: chrono::NaiveTime,
        notes: &str,
    ) -> Result<Appointment, GatewayError>;

    async fn set_appointment_status(
        &self,
        id: &str,
        status: AppointmentStatus,
    ) -> Result<Appointment, GatewayError>;
}

/// Build the gateway realization selected by configuration.
pub fn from_config(config: &AppConfig) -> Result<Arc<dyn PersistenceGateway>, GatewayError> {
    match config.backend.kind {
        BackendKind::Mock => Ok(Arc::new(MemoryGateway::with_demo_data())),
        BackendKind::Hosted => {
            let gateway = HostedGateway::from_config(config)?;
            Ok(Arc::new(gateway))
        }
    }
}
