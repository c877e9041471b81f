use std::sync::{Arc, Mutex};

use tokio::sync::watch;

use super::{Cell, FetchFailure, FetchState};
use crate::gateway::{CatalogScope, GatewayError, PersistenceGateway};
use crate::models::Vehicle;

/// Catalog listing, public or admin scope. Mounting issues exactly one read;
/// everything after that is an explicit `refetch`.
pub struct VehicleListHook {
    gateway: Arc<dyn PersistenceGateway>,
    scope: CatalogScope,
    cell: Cell<Vec<Vehicle>>,
}

impl VehicleListHook {
    pub async fn mount(gateway: Arc<dyn PersistenceGateway>, scope: CatalogScope) -> Self {
        let hook = Self {
            gateway,
            scope,
            cell: Cell::new(Vec::new()),
        };
        hook.refetch().await;
        hook
    }

    pub async fn refetch(&self) {
        let token = self.cell.begin();
        match self.gateway.list_vehicles(self.scope).await {
            Ok(vehicles) => self.cell.finish(token, Ok(vehicles)),
            Err(err) => {
                tracing::error!(%err, "error fetching vehicles");
                self.cell.finish(
                    token,
                    Err(FetchFailure::Transport("Failed to fetch vehicles".into())),
                );
            }
        }
    }

    pub fn state(&self) -> FetchState<Vec<Vehicle>> {
        self.cell.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<FetchState<Vec<Vehicle>>> {
        self.cell.subscribe()
    }
}

/// Single vehicle by id. A missing id settles with absent data and the
/// distinct not-found failure; transport trouble keeps whatever was shown
/// before.
pub struct VehicleDetailHook {
    gateway: Arc<dyn PersistenceGateway>,
    vehicle_id: Mutex<String>,
    cell: Cell<Option<Vehicle>>,
}

impl VehicleDetailHook {
    pub async fn mount(gateway: Arc<dyn PersistenceGateway>, vehicle_id: impl Into<String>) -> Self {
        let hook = Self {
            gateway,
            vehicle_id: Mutex::new(vehicle_id.into()),
            cell: Cell::new(None),
        };
        hook.refetch().await;
        hook
    }

    /// Follow a change of the input id, re-running the fetch.
    pub async fn retarget(&self, vehicle_id: impl Into<String>) {
        if let Ok(mut id) = self.vehicle_id.lock() {
            *id = vehicle_id.into();
        }
        self.refetch().await;
    }

    pub async fn refetch(&self) {
        let id = match self.vehicle_id.lock() {
            Ok(id) => id.clone(),
            Err(_) => return,
        };

        let token = self.cell.begin();
        match self.gateway.fetch_vehicle(&id).await {
            Ok(vehicle) => self.cell.finish(token, Ok(Some(vehicle))),
            Err(GatewayError::NotFound(_)) => {
                self.cell.finish_with(
                    token,
                    FetchState {
                        data: None,
                        is_loading: false,
                        error: Some(FetchFailure::NotFound),
                    },
                );
            }
            Err(err) => {
                tracing::error!(%err, vehicle = %id, "error fetching vehicle");
                self.cell.finish(
                    token,
                    Err(FetchFailure::Transport("Failed to fetch vehicle".into())),
                );
            }
        }
    }

    pub fn state(&self) -> FetchState<Option<Vehicle>> {
        self.cell.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<FetchState<Option<Vehicle>>> {
        self.cell.subscribe()
    }
}
