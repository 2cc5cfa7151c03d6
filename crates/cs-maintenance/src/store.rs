//! Store abstractions: where vehicles, service records and reminders live.
//!
//! The maintenance core never persists anything itself. Orchestration code
//! reads a consistent snapshot through these traits and writes the records
//! the core drafts. [`InMemoryGarage`](crate::memory::InMemoryGarage)
//! implements all three for tests and the demo binary; a database or HTTP
//! backend would implement them the same way.

use async_trait::async_trait;
use chrono::NaiveDate;
use cs_protocol::{
    NewReminder, NewServiceRecord, NewVehicle, Reminder, ServiceRecord, Vehicle, VehicleId,
};
use uuid::Uuid;

use crate::error::MaintenanceResult;

/// Registered vehicles.
#[async_trait]
pub trait VehicleStore: Send + Sync {
    async fn list_vehicles(&self) -> MaintenanceResult<Vec<Vehicle>>;

    async fn get_vehicle(&self, id: VehicleId) -> MaintenanceResult<Vehicle>;

    /// Register a vehicle first seen on `today`.
    async fn create_vehicle(&self, new: NewVehicle, today: NaiveDate) -> MaintenanceResult<Vehicle>;

    /// Add `km` to the odometer and return the updated vehicle.
    async fn add_distance(&self, id: VehicleId, km: u32) -> MaintenanceResult<Vehicle>;

    /// Remove a vehicle together with its service records and reminders.
    async fn delete_vehicle(&self, id: VehicleId) -> MaintenanceResult<()>;
}

/// Logged service events.
#[async_trait]
pub trait ServiceStore: Send + Sync {
    async fn list_services(&self, vehicle_id: VehicleId) -> MaintenanceResult<Vec<ServiceRecord>>;

    async fn create_service(&self, new: NewServiceRecord) -> MaintenanceResult<ServiceRecord>;

    async fn delete_service(&self, id: Uuid) -> MaintenanceResult<()>;
}

/// Reminders, whatever created them.
#[async_trait]
pub trait ReminderStore: Send + Sync {
    /// Reminders of a vehicle, newest first.
    async fn list_reminders(&self, vehicle_id: VehicleId) -> MaintenanceResult<Vec<Reminder>>;

    /// Validate and store a reminder created on `today`.
    async fn create_reminder(&self, new: NewReminder, today: NaiveDate)
    -> MaintenanceResult<Reminder>;

    async fn delete_reminder(&self, id: Uuid) -> MaintenanceResult<()>;

    /// Flip the done flag and return the updated reminder.
    async fn toggle_reminder(&self, id: Uuid) -> MaintenanceResult<Reminder>;
}
