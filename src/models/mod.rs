pub mod appointment;
pub mod identity;
pub mod vehicle;

pub use appointment::{Appointment, AppointmentStatus, BookingRequest};
pub use identity::{Credential, Identity, Registration};
pub use vehicle::{FuelType, Transmission, Vehicle, VehicleDraft};
