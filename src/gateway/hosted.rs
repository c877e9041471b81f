use std::time::Duration;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use reqwest::{Method, RequestBuilder, StatusCode};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use url::Url;

use super::{CatalogScope, GatewayError, PersistenceGateway};
use crate::config::AppConfig;
use crate::models::{
    Appointment, AppointmentStatus, Credential, FuelType, Identity, Registration, Transmission,
    Vehicle, VehicleDraft,
};

/// Persistence row for an account profile, exactly as the hosted store
/// serializes it (snake_case columns, nullable contact fields).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileRow {
    pub id: String,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub is_admin: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl From<ProfileRow> for Identity {
    fn from(row: ProfileRow) -> Self {
        Identity {
            id: row.id,
            name: row.name,
            email: row.email.unwrap_or_default(),
            phone: row.phone.unwrap_or_default(),
            is_administrator: row.is_admin,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VehicleRow {
    pub id: String,
    pub make: String,
    pub model: String,
    pub year: i32,
    pub price: Decimal,
    pub image: String,
    pub mileage: u32,
    pub fuel_type: FuelType,
    pub transmission: Transmission,
    pub color: String,
    pub description: String,
    #[serde(default)]
    pub features: Vec<String>,
    pub available: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl From<VehicleRow> for Vehicle {
    fn from(row: VehicleRow) -> Self {
        Vehicle {
            id: row.id,
            make: row.make,
            model: row.model,
            year: row.year,
            price: row.price,
            image: row.image,
            mileage: row.mileage,
            fuel_type: row.fuel_type,
            transmission: row.transmission,
            color: row.color,
            description: row.description,
            features: row.features,
            available: row.available,
        }
    }
}

/// Insert/update payload: everything the admin submits, nothing the server
/// mints itself.
#[derive(Debug, Clone, Serialize)]
struct VehicleWrite<'a> {
    make: &'a str,
    model: &'a str,
    year: i32,
    price: Decimal,
    image: &'a str,
    mileage: u32,
    fuel_type: FuelType,
    transmission: Transmission,
    color: &'a str,
    description: &'a str,
    features: &'a [String],
    available: bool,
}

impl<'a> From<&'a VehicleDraft> for VehicleWrite<'a> {
    fn from(draft: &'a VehicleDraft) -> Self {
        VehicleWrite {
            make: &draft.make,
            model: &draft.model,
            year: draft.year,
            price: draft.price,
            image: &draft.image,
            mileage: draft.mileage,
            fuel_type: draft.fuel_type,
            transmission: draft.transmission,
            color: &draft.color,
            description: &draft.description,
            features: &draft.features,
            available: draft.available,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppointmentRow {
    pub id: String,
    pub user_id: String,
    pub vehicle_id: String,
    pub appointment_date: NaiveDate,
    pub appointment_time: NaiveTime,
    pub status: AppointmentStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<AppointmentRow> for Appointment {
    fn from(row: AppointmentRow) -> Self {
        Appointment {
            id: row.id,
            user_id: row.user_id,
            vehicle_id: row.vehicle_id,
            date: row.appointment_date,
            time: row.appointment_time,
            status: row.status,
            notes: row.notes.unwrap_or_default(),
            created_at: row.created_at,
        }
    }
}

/// Hosted realization of the persistence gateway: a REST client over the
/// dealership's relational backend. The service owns ids, timestamps, and
/// referential integrity; this client maps rows to view models and HTTP
/// failures to [`GatewayError`].
pub struct HostedGateway {
    http: reqwest::Client,
    base: String,
    api_key: Option<String>,
}

impl HostedGateway {
    pub fn from_config(config: &AppConfig) -> Result<Self, GatewayError> {
        let raw = config
            .backend
            .base_url
            .as_deref()
            .ok_or_else(|| GatewayError::Invalid("hosted backend requires MOTORS_API_URL".into()))?;
        let base = Url::parse(raw)
            .map_err(|e| GatewayError::Invalid(format!("invalid backend URL {}: {}", raw, e)))?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.gateway.request_timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base: base.as_str().trim_end_matches('/').to_string(),
            api_key: config.backend.api_key.clone(),
        })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}/{}", self.base, path);
        let mut builder = self.http.request(method, url);
        if let Some(key) = &self.api_key {
            builder = builder.header("apikey", key);
        }
        builder
    }

    async fn expect_json<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
    ) -> Result<T, GatewayError> {
        let response = builder.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response.json::<T>().await?);
        }
        Err(error_for_status(status))
    }

    async fn expect_ok(&self, builder: RequestBuilder) -> Result<(), GatewayError> {
        let response = builder.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        Err(error_for_status(status))
    }
}

/// Encode the user id into the filter value; ids are opaque strings and must
/// not be able to smuggle extra query parameters.
fn scoped_appointments_path(user_id: &str) -> String {
    let mut query = url::form_urlencoded::Serializer::new(String::new());
    query.append_pair("user_id", &format!("eq.{}", user_id));
    query.append_pair("order", "appointment_date.asc");
    format!("appointments?{}", query.finish())
}

fn error_for_status(status: StatusCode) -> GatewayError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => GatewayError::InvalidCredentials,
        StatusCode::NOT_FOUND => GatewayError::NotFound("record".into()),
        StatusCode::CONFLICT => GatewayError::Conflict("rejected by backend".into()),
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
            GatewayError::Invalid(format!("backend rejected request ({})", status))
        }
        other => GatewayError::Transport(format!("backend returned {}", other)),
    }
}

#[async_trait::async_trait]
impl PersistenceGateway for HostedGateway {
    async fn authenticate(&self, credential: &Credential) -> Result<Identity, GatewayError> {
        let body = match credential {
            Credential::EmailPassword { email, password } => {
                json!({ "email": email, "password": password })
            }
            Credential::PhoneCode { phone, code } => json!({ "phone": phone, "code": code }),
        };
        let row: ProfileRow = self
            .expect_json(self.request(Method::POST, "auth/login").json(&body))
            .await?;
        Ok(row.into())
    }

    async fn register_account(&self, registration: &Registration) -> Result<Identity, GatewayError> {
        let body = json!({
            "name": registration.name,
            "email": registration.email,
            "phone": registration.phone,
            "password": registration.password,
        });
        let row: ProfileRow = self
            .expect_json(self.request(Method::POST, "auth/register").json(&body))
            .await?;
        Ok(row.into())
    }

    async fn resume(&self, cached: Identity) -> Result<Identity, GatewayError> {
        // Hosted semantics: never trust the cached name or role; re-fetch
        // the authoritative profile before resuming the session.
        self.fetch_profile(&cached.id).await
    }

    async fn fetch_profile(&self, id: &str) -> Result<Identity, GatewayError> {
        let row: ProfileRow = self
            .expect_json(self.request(Method::GET, &format!("profiles/{}", id)))
            .await?;
        Ok(row.into())
    }

    async fn list_profiles(&self) -> Result<Vec<Identity>, GatewayError> {
        let rows: Vec<ProfileRow> = self
            .expect_json(self.request(Method::GET, "profiles?order=created_at.desc"))
            .await?;
        Ok(rows.into_iter().map(Identity::from).collect())
    }

    async fn set_administrator(
        &self,
        id: &str,
        is_administrator: bool,
    ) -> Result<Identity, GatewayError> {
        let row: ProfileRow = self
            .expect_json(
                self.request(Method::PATCH, &format!("profiles/{}", id))
                    .json(&json!({ "is_admin": is_administrator })),
            )
            .await?;
        Ok(row.into())
    }

    async fn list_vehicles(&self, scope: CatalogScope) -> Result<Vec<Vehicle>, GatewayError> {
        let path = match scope {
            CatalogScope::Public => "vehicles?available=eq.true&order=created_at.desc",
            CatalogScope::Admin => "vehicles?order=created_at.desc",
        };
        let rows: Vec<VehicleRow> = self.expect_json(self.request(Method::GET, path)).await?;
        Ok(rows.into_iter().map(Vehicle::from).collect())
    }

    async fn fetch_vehicle(&self, id: &str) -> Result<Vehicle, GatewayError> {
        let row: VehicleRow = self
            .expect_json(self.request(Method::GET, &format!("vehicles/{}", id)))
            .await?;
        Ok(row.into())
    }

    async fn create_vehicle(&self, draft: &VehicleDraft) -> Result<Vehicle, GatewayError> {
        draft
            .validate()
            .map_err(|e| GatewayError::Invalid(e.to_string()))?;
        let row: VehicleRow = self
            .expect_json(
                self.request(Method::POST, "vehicles")
                    .json(&VehicleWrite::from(draft)),
            )
            .await?;
        Ok(row.into())
    }

    async fn update_vehicle(&self, id: &str, draft: &VehicleDraft) -> Result<Vehicle, GatewayError> {
        draft
            .validate()
            .map_err(|e| GatewayError::Invalid(e.to_string()))?;
        let row: VehicleRow = self
            .expect_json(
                self.request(Method::PATCH, &format!("vehicles/{}", id))
                    .json(&VehicleWrite::from(draft)),
            )
            .await?;
        Ok(row.into())
    }

    async fn delete_vehicle(&self, id: &str) -> Result<(), GatewayError> {
        self.expect_ok(self.request(Method::DELETE, &format!("vehicles/{}", id)))
            .await
    }

    async fn list_appointments(&self, user_id: &str) -> Result<Vec<Appointment>, GatewayError> {
        let path = scoped_appointments_path(user_id);
        let rows: Vec<AppointmentRow> = self.expect_json(self.request(Method::GET, &path)).await?;
        Ok(rows.into_iter().map(Appointment::from).collect())
    }

    async fn list_all_appointments(&self) -> Result<Vec<Appointment>, GatewayError> {
        let rows: Vec<AppointmentRow> = self
            .expect_json(self.request(Method::GET, "appointments?order=appointment_date.asc"))
            .await?;
        Ok(rows.into_iter().map(Appointment::from).collect())
    }

    async fn create_appointment(
        &self,
        user_id: &str,
        vehicle_id: &str,
        date: NaiveDate,
        time: NaiveTime,
        notes: &str,
    ) -> Result<Appointment, GatewayError> {
        let body = json!({
            "user_id": user_id,
            "vehicle_id": vehicle_id,
            "appointment_date": date,
            "appointment_time": time,
            "notes": notes,
            "status": AppointmentStatus::Pending,
        });
        let row: AppointmentRow = self
            .expect_json(self.request(Method::POST, "appointments").json(&body))
            .await?;
        Ok(row.into())
    }

    async fn set_appointment_status(
        &self,
        id: &str,
        status: AppointmentStatus,
    ) -> Result<Appointment, GatewayError> {
        let row: AppointmentRow = self
            .expect_json(
                self.request(Method::PATCH, &format!("appointments/{}", id))
                    .json(&json!({ "status": status })),
            )
            .await?;
        Ok(row.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vehicle_row_maps_every_catalog_field() {
        let row: VehicleRow = serde_json::from_value(serde_json::json!({
            "id": "v1",
            "make": "Ferrari",
            "model": "488 GTB",
            "year": 2023,
            "price": "299000",
            "image": "https://example.com/488.jpg",
            "mileage": 1200,
            "fuel_type": "Gasoline",
            "transmission": "Automatic",
            "color": "Red",
            "description": "Twin-turbo V8",
            "features": ["Carbon brakes"],
            "available": true,
            "created_at": "2024-01-01T00:00:00Z"
        }))
        .unwrap();

        let vehicle = Vehicle::from(row);
        assert_eq!(vehicle.id, "v1");
        assert_eq!(vehicle.fuel_type, FuelType::Gasoline);
        assert_eq!(vehicle.transmission, Transmission::Automatic);
        assert_eq!(vehicle.price, Decimal::from(299_000));
        assert_eq!(vehicle.features, vec!["Carbon brakes".to_string()]);

        // The view model exposes the same data under camelCase names.
        let value = serde_json::to_value(&vehicle).unwrap();
        assert_eq!(value["fuelType"], "Gasoline");
        assert!(value.get("fuel_type").is_none());
    }

    #[test]
    fn scoped_appointments_query_encodes_the_user_id() {
        assert_eq!(
            scoped_appointments_path("2"),
            "appointments?user_id=eq.2&order=appointment_date.asc"
        );

        // A hostile id cannot introduce extra query parameters.
        let path = scoped_appointments_path("2&order=id.desc");
        assert_eq!(
            path,
            "appointments?user_id=eq.2%26order%3Did.desc&order=appointment_date.asc"
        );
    }

    #[test]
    fn profile_row_nullable_fields_become_empty_strings() {
        let row: ProfileRow = serde_json::from_value(serde_json::json!({
            "id": "4",
            "name": "Phone User",
            "email": null,
            "phone": "+15550100",
            "is_admin": false
        }))
        .unwrap();

        let identity = Identity::from(row);
        assert_eq!(identity.email, "");
        assert_eq!(identity.phone, "+15550100");
        assert!(!identity.is_administrator);
    }

    #[test]
    fn appointment_row_maps_date_and_time_columns() {
        let row: AppointmentRow = serde_json::from_value(serde_json::json!({
            "id": "a1",
            "user_id": "2",
            "vehicle_id": "v1",
            "appointment_date": "2026-09-01",
            "appointment_time": "14:30:00",
            "status": "pending",
            "notes": null,
            "created_at": "2026-08-29T12:00:00Z"
        }))
        .unwrap();

        let appointment = Appointment::from(row);
        assert_eq!(appointment.date.to_string(), "2026-09-01");
        assert_eq!(appointment.status, AppointmentStatus::Pending);
        assert_eq!(appointment.notes, "");
    }
}
