use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use sha2::{Digest, Sha256};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{CatalogScope, GatewayError, PersistenceGateway};
use crate::models::{
    Appointment, AppointmentStatus, Credential, FuelType, Identity, Registration, Transmission,
    Vehicle, VehicleDraft,
};

struct AccountRecord {
    identity: Identity,
    /// Absent for phone-only accounts.
    password_digest: Option<String>,
    created_at: DateTime<Utc>,
}

struct VehicleRecord {
    vehicle: Vehicle,
    created_at: DateTime<Utc>,
}

#[derive(Default)]
struct MemoryState {
    accounts: Vec<AccountRecord>,
    vehicles: Vec<VehicleRecord>,
    appointments: Vec<Appointment>,
    /// One-time codes issued per phone number.
    phone_codes: HashMap<String, String>,
}

/// Read-traffic counters, observable so tests can assert request-count laws
/// (e.g. the appointments hook issuing zero requests while signed out).
#[derive(Default)]
pub struct ReadCounters {
    authenticate: AtomicU64,
    profile_reads: AtomicU64,
    vehicle_reads: AtomicU64,
    appointment_reads: AtomicU64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CounterSnapshot {
    pub authenticate: u64,
    pub profile_reads: u64,
    pub vehicle_reads: u64,
    pub appointment_reads: u64,
}

/// In-memory realization of the persistence gateway: the "mock backend"
/// variant with hardcoded demo accounts and a seeded catalog. Also the
/// test double for the whole crate.
pub struct MemoryGateway {
    state: RwLock<MemoryState>,
    counters: ReadCounters,
    offline: AtomicBool,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(MemoryState::default()),
            counters: ReadCounters::default(),
            offline: AtomicBool::new(false),
        }
    }

    /// Demo dataset: one administrator, one regular account, and a small
    /// catalog including a sold (unavailable) record.
    pub fn with_demo_data() -> Self {
        let mut state = MemoryState::default();
        let now = Utc::now();

        state.accounts.push(AccountRecord {
            identity: Identity {
                id: "1".into(),
                name: "Admin User".into(),
                email: "admin@brutalmotors.com".into(),
                phone: "+1234567890".into(),
                is_administrator: true,
            },
            password_digest: Some(digest("admin123")),
            created_at: now - Duration::days(90),
        });
        state.accounts.push(AccountRecord {
            identity: Identity {
                id: "2".into(),
                name: "John Doe".into(),
                email: "user@example.com".into(),
                phone: "+1234567891".into(),
                is_administrator: false,
            },
            password_digest: Some(digest("user123")),
            created_at: now - Duration::days(30),
        });

        for (offset, vehicle) in demo_catalog().into_iter().enumerate() {
            state.vehicles.push(VehicleRecord {
                vehicle,
                created_at: now - Duration::days(offset as i64),
            });
        }

        Self {
            state: RwLock::new(state),
            counters: ReadCounters::default(),
            offline: AtomicBool::new(false),
        }
    }

    /// Simulate an unreachable backend: every operation fails with a
    /// transport error until switched back.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn counters(&self) -> CounterSnapshot {
        CounterSnapshot {
            authenticate: self.counters.authenticate.load(Ordering::SeqCst),
            profile_reads: self.counters.profile_reads.load(Ordering::SeqCst),
            vehicle_reads: self.counters.vehicle_reads.load(Ordering::SeqCst),
            appointment_reads: self.counters.appointment_reads.load(Ordering::SeqCst),
        }
    }

    /// Issue a one-time login code for a phone number. The mocked SMS flow
    /// always hands out the demo code.
    pub async fn issue_phone_code(&self, phone: &str) -> String {
        let code = "123456".to_string();
        let mut state = self.state.write().await;
        state.phone_codes.insert(phone.to_string(), code.clone());
        code
    }

    fn check_online(&self) -> Result<(), GatewayError> {
        if self.offline.load(Ordering::SeqCst) {
            Err(GatewayError::Transport("backend unreachable".into()))
        } else {
            Ok(())
        }
    }
}

impl Default for MemoryGateway {
    fn default() -> Self {
        Self::new()
    }
}

fn digest(secret: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(secret.as_bytes());
    format!("{:x}", hasher.finalize())
}

fn demo_catalog() -> Vec<Vehicle> {
    vec![
        Vehicle {
            id: Uuid::new_v4().to_string(),
            make: "Ferrari".into(),
            model: "488 GTB".into(),
            year: 2023,
            price: Decimal::from(299_000),
            image: "https://images.pexels.com/photos/544542/pexels-photo-544542.jpeg".into(),
            mileage: 1200,
            fuel_type: FuelType::Gasoline,
            transmission: Transmission::Automatic,
            color: "Rosso Corsa".into(),
            description: "Twin-turbo V8 with track-focused aerodynamics.".into(),
            features: vec!["Carbon ceramic brakes".into(), "Racing seats".into()],
            available: true,
        },
        Vehicle {
            id: Uuid::new_v4().to_string(),
            make: "Lamborghini".into(),
            model: "Huracán".into(),
            year: 2023,
            price: Decimal::from(259_000),
            image: "https://images.pexels.com/photos/2127733/pexels-photo-2127733.jpeg".into(),
            mileage: 800,
            fuel_type: FuelType::Gasoline,
            transmission: Transmission::Automatic,
            color: "Verde Mantis".into(),
            description: "Naturally aspirated V10, all-wheel drive.".into(),
            features: vec!["Lifting system".into(), "Sport exhaust".into()],
            available: true,
        },
        Vehicle {
            id: Uuid::new_v4().to_string(),
            make: "McLaren".into(),
            model: "720S".into(),
            year: 2022,
            price: Decimal::from(315_000),
            image: "https://images.pexels.com/photos/1545743/pexels-photo-1545743.jpeg".into(),
            mileage: 2100,
            fuel_type: FuelType::Gasoline,
            transmission: Transmission::Automatic,
            color: "Papaya Spark".into(),
            description: "Carbon monocoque, 710 horsepower.".into(),
            features: vec!["Dihedral doors".into(), "Variable drift control".into()],
            available: true,
        },
        Vehicle {
            id: Uuid::new_v4().to_string(),
            make: "Porsche".into(),
            model: "911 Carrera".into(),
            year: 2021,
            price: Decimal::from(118_000),
            image: "https://images.pexels.com/photos/3954440/pexels-photo-3954440.jpeg".into(),
            mileage: 9400,
            fuel_type: FuelType::Gasoline,
            transmission: Transmission::Manual,
            color: "GT Silver".into(),
            description: "Recently sold; record retained for history.".into(),
            features: vec!["Sport Chrono package".into()],
            available: false,
        },
    ]
}

#[async_trait::async_trait]
impl PersistenceGateway for MemoryGateway {
    async fn authenticate(&self, credential: &Credential) -> Result<Identity, GatewayError> {
        self.check_online()?;
        self.counters.authenticate.fetch_add(1, Ordering::SeqCst);

        let mut state = self.state.write().await;
        match credential {
            Credential::EmailPassword { email, password } => {
                let supplied = digest(password);
                state
                    .accounts
                    .iter()
                    .find(|a| {
                        !a.identity.email.is_empty()
                            && a.identity.email == *email
                            && a.password_digest.as_deref() == Some(supplied.as_str())
                    })
                    .map(|a| a.identity.clone())
                    .ok_or(GatewayError::InvalidCredentials)
            }
            Credential::PhoneCode { phone, code } => {
                let issued = state.phone_codes.get(phone).cloned();
                if issued.as_deref() != Some(code.as_str()) {
                    return Err(GatewayError::InvalidCredentials);
                }
                // One-time code: consumed on successful use.
                state.phone_codes.remove(phone);

                if let Some(existing) = state
                    .accounts
                    .iter()
                    .find(|a| a.identity.phone == *phone)
                    .map(|a| a.identity.clone())
                {
                    return Ok(existing);
                }

                let identity = Identity {
                    id: Uuid::new_v4().to_string(),
                    name: "Phone User".into(),
                    email: String::new(),
                    phone: phone.clone(),
                    is_administrator: false,
                };
                state.accounts.push(AccountRecord {
                    identity: identity.clone(),
                    password_digest: None,
                    created_at: Utc::now(),
                });
                Ok(identity)
            }
        }
    }

    async fn register_account(&self, registration: &Registration) -> Result<Identity, GatewayError> {
        self.check_online()?;

        let mut state = self.state.write().await;
        if state
            .accounts
            .iter()
            .any(|a| !a.identity.email.is_empty() && a.identity.email == registration.email)
        {
            return Err(GatewayError::Conflict(format!(
                "an account already exists for {}",
                registration.email
            )));
        }

        let identity = Identity {
            id: Uuid::new_v4().to_string(),
            name: registration.name.clone(),
            email: registration.email.clone(),
            phone: registration.phone.clone(),
            // Clients can never self-elevate.
            is_administrator: false,
        };
        state.accounts.push(AccountRecord {
            identity: identity.clone(),
            password_digest: Some(digest(&registration.password)),
            created_at: Utc::now(),
        });
        Ok(identity)
    }

    async fn resume(&self, cached: Identity) -> Result<Identity, GatewayError> {
        self.check_online()?;

        // Mock semantics: a known account resumes with the authoritative
        // profile (so role changes take effect), an unknown one is trusted
        // as stored.
        let state = self.state.read().await;
        Ok(state
            .accounts
            .iter()
            .find(|a| a.identity.id == cached.id)
            .map(|a| a.identity.clone())
            .unwrap_or(cached))
    }

    async fn fetch_profile(&self, id: &str) -> Result<Identity, GatewayError> {
        self.check_online()?;
        self.counters.profile_reads.fetch_add(1, Ordering::SeqCst);

        let state = self.state.read().await;
        state
            .accounts
            .iter()
            .find(|a| a.identity.id == id)
            .map(|a| a.identity.clone())
            .ok_or_else(|| GatewayError::NotFound(format!("profile {}", id)))
    }

    async fn list_profiles(&self) -> Result<Vec<Identity>, GatewayError> {
        self.check_online()?;
        self.counters.profile_reads.fetch_add(1, Ordering::SeqCst);

        let state = self.state.read().await;
        let mut accounts: Vec<_> = state
            .accounts
            .iter()
            .map(|a| (a.created_at, a.identity.clone()))
            .collect();
        accounts.sort_by(|a, b| b.0.cmp(&a.0));
        Ok(accounts.into_iter().map(|(_, identity)| identity).collect())
    }

    async fn set_administrator(
        &self,
        id: &str,
        is_administrator: bool,
    ) -> Result<Identity, GatewayError> {
        self.check_online()?;

        let mut state = self.state.write().await;
        let account = state
            .accounts
            .iter_mut()
            .find(|a| a.identity.id == id)
            .ok_or_else(|| GatewayError::NotFound(format!("profile {}", id)))?;
        account.identity.is_administrator = is_administrator;
        Ok(account.identity.clone())
    }

    async fn list_vehicles(&self, scope: CatalogScope) -> Result<Vec<Vehicle>, GatewayError> {
        self.check_online()?;
        self.counters.vehicle_reads.fetch_add(1, Ordering::SeqCst);

        let state = self.state.read().await;
        let mut records: Vec<_> = state
            .vehicles
            .iter()
            .filter(|r| scope == CatalogScope::Admin || r.vehicle.available)
            .map(|r| (r.created_at, r.vehicle.clone()))
            .collect();
        records.sort_by(|a, b| b.0.cmp(&a.0));
        Ok(records.into_iter().map(|(_, vehicle)| vehicle).collect())
    }

    async fn fetch_vehicle(&self, id: &str) -> Result<Vehicle, GatewayError> {
        self.check_online()?;
        self.counters.vehicle_reads.fetch_add(1, Ordering::SeqCst);

        let state = self.state.read().await;
        state
            .vehicles
            .iter()
            .find(|r| r.vehicle.id == id)
            .map(|r| r.vehicle.clone())
            .ok_or_else(|| GatewayError::NotFound(format!("vehicle {}", id)))
    }

    async fn create_vehicle(&self, draft: &VehicleDraft) -> Result<Vehicle, GatewayError> {
        self.check_online()?;
        draft
            .validate()
            .map_err(|e| GatewayError::Invalid(e.to_string()))?;

        let vehicle = Vehicle {
            id: Uuid::new_v4().to_string(),
            make: draft.make.clone(),
            model: draft.model.clone(),
            year: draft.year,
            price: draft.price,
            image: draft.image.clone(),
            mileage: draft.mileage,
            fuel_type: draft.fuel_type,
            transmission: draft.transmission,
            color: draft.color.clone(),
            description: draft.description.clone(),
            features: draft.features.clone(),
            available: draft.available,
        };

        let mut state = self.state.write().await;
        state.vehicles.push(VehicleRecord {
            vehicle: vehicle.clone(),
            created_at: Utc::now(),
        });
        Ok(vehicle)
    }

    async fn update_vehicle(&self, id: &str, draft: &VehicleDraft) -> Result<Vehicle, GatewayError> {
        self.check_online()?;
        draft
            .validate()
            .map_err(|e| GatewayError::Invalid(e.to_string()))?;

        let mut state = self.state.write().await;
        let record = state
            .vehicles
            .iter_mut()
            .find(|r| r.vehicle.id == id)
            .ok_or_else(|| GatewayError::NotFound(format!("vehicle {}", id)))?;

        record.vehicle = Vehicle {
            id: record.vehicle.id.clone(),
            make: draft.make.clone(),
            model: draft.model.clone(),
            year: draft.year,
            price: draft.price,
            image: draft.image.clone(),
            mileage: draft.mileage,
            fuel_type: draft.fuel_type,
            transmission: draft.transmission,
            color: draft.color.clone(),
            description: draft.description.clone(),
            features: draft.features.clone(),
            available: draft.available,
        };
        Ok(record.vehicle.clone())
    }

    async fn delete_vehicle(&self, id: &str) -> Result<(), GatewayError> {
        self.check_online()?;

        let mut state = self.state.write().await;
        if !state.vehicles.iter().any(|r| r.vehicle.id == id) {
            return Err(GatewayError::NotFound(format!("vehicle {}", id)));
        }
        // Restrict policy: bookings keep the record alive.
        if state.appointments.iter().any(|a| a.vehicle_id == id) {
            return Err(GatewayError::Conflict(
                "vehicle has existing appointments".into(),
            ));
        }
        state.vehicles.retain(|r| r.vehicle.id != id);
        Ok(())
    }

    async fn list_appointments(&self, user_id: &str) -> Result<Vec<Appointment>, GatewayError> {
        self.check_online()?;
        self.counters.appointment_reads.fetch_add(1, Ordering::SeqCst);

        let state = self.state.read().await;
        let mut appointments: Vec<_> = state
            .appointments
            .iter()
            .filter(|a| a.user_id == user_id)
            .cloned()
            .collect();
        appointments.sort_by(|a, b| (a.date, a.time).cmp(&(b.date, b.time)));
        Ok(appointments)
    }

    async fn list_all_appointments(&self) -> Result<Vec<Appointment>, GatewayError> {
        self.check_online()?;

        let state = self.state.read().await;
        let mut appointments = state.appointments.clone();
        appointments.sort_by(|a, b| (a.date, a.time).cmp(&(b.date, b.time)));
        Ok(appointments)
    }

    async fn create_appointment(
        &self,
        user_id: &str,
        vehicle_id: &str,
        date: NaiveDate,
        time: NaiveTime,
        notes: &str,
    ) -> Result<Appointment, GatewayError> {
        self.check_online()?;

        let mut state = self.state.write().await;
        if !state.accounts.iter().any(|a| a.identity.id == user_id) {
            return Err(GatewayError::NotFound(format!("profile {}", user_id)));
        }
        if !state.vehicles.iter().any(|r| r.vehicle.id == vehicle_id) {
            return Err(GatewayError::NotFound(format!("vehicle {}", vehicle_id)));
        }

        let appointment = Appointment {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            vehicle_id: vehicle_id.to_string(),
            date,
            time,
            status: AppointmentStatus::Pending,
            notes: notes.to_string(),
            created_at: Utc::now(),
        };
        state.appointments.push(appointment.clone());
        Ok(appointment)
    }

    async fn set_appointment_status(
        &self,
        id: &str,
        status: AppointmentStatus,
    ) -> Result<Appointment, GatewayError> {
        self.check_online()?;

        let mut state = self.state.write().await;
        let appointment = state
            .appointments
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| GatewayError::NotFound(format!("appointment {}", id)))?;

        if !appointment.status.can_transition_to(status) {
            return Err(GatewayError::Conflict(format!(
                "cannot move appointment from {} to {}",
                appointment.status, status
            )));
        }
        appointment.status = status;
        Ok(appointment.clone())
    }
}
