//! In-memory garage: implements every store trait over `RwLock`ed maps.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::NaiveDate;
use cs_protocol::{
    NewReminder, NewServiceRecord, NewVehicle, Reminder, ServiceRecord, Vehicle, VehicleId,
};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{MaintenanceError, MaintenanceResult};
use crate::store::{ReminderStore, ServiceStore, VehicleStore};

/// Serializable dump of a garage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GarageSnapshot {
    #[serde(default)]
    pub vehicles: Vec<Vehicle>,
    #[serde(default)]
    pub services: Vec<ServiceRecord>,
    #[serde(default)]
    pub reminders: Vec<Reminder>,
}

#[derive(Default)]
struct GarageState {
    vehicles: BTreeMap<VehicleId, Vehicle>,
    services: Vec<ServiceRecord>,
    reminders: Vec<Reminder>,
}

impl GarageState {
    fn require_vehicle(&self, id: VehicleId) -> MaintenanceResult<()> {
        if self.vehicles.contains_key(&id) {
            Ok(())
        } else {
            Err(MaintenanceError::not_found("vehicle", id))
        }
    }
}

/// Store backed by process memory. Cheap to construct, safe to share.
#[derive(Default)]
pub struct InMemoryGarage {
    state: RwLock<GarageState>,
}

impl InMemoryGarage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a snapshot, dropping records of unknown vehicles.
    pub fn from_snapshot(snapshot: GarageSnapshot) -> Self {
        let vehicles: BTreeMap<_, _> = snapshot
            .vehicles
            .into_iter()
            .map(|v| (v.id, v))
            .collect();
        let services: Vec<_> = snapshot
            .services
            .into_iter()
            .filter(|s| vehicles.contains_key(&s.vehicle_id))
            .collect();
        let reminders: Vec<_> = snapshot
            .reminders
            .into_iter()
            .filter(|r| vehicles.contains_key(&r.vehicle_id))
            .collect();
        Self {
            state: RwLock::new(GarageState {
                vehicles,
                services,
                reminders,
            }),
        }
    }

    /// Load a JSON [`GarageSnapshot`] from disk.
    pub async fn load_json(path: &str) -> MaintenanceResult<Self> {
        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| MaintenanceError::Io(format!("{path}: {e}")))?;
        let snapshot: GarageSnapshot = serde_json::from_str(&contents)
            .map_err(|e| MaintenanceError::Snapshot(format!("{path}: {e}")))?;
        tracing::info!(
            path = %path,
            vehicles = snapshot.vehicles.len(),
            services = snapshot.services.len(),
            reminders = snapshot.reminders.len(),
            "garage snapshot loaded"
        );
        Ok(Self::from_snapshot(snapshot))
    }

    /// Current contents, vehicles ordered by id.
    pub async fn snapshot(&self) -> GarageSnapshot {
        let state = self.state.read().await;
        GarageSnapshot {
            vehicles: state.vehicles.values().cloned().collect(),
            services: state.services.clone(),
            reminders: state.reminders.clone(),
        }
    }

    /// Demo garage: one car with a short service history.
    pub fn with_sample_data(today: NaiveDate) -> Self {
        let vehicle = Vehicle {
            id: VehicleId::new(),
            make: "Mazda".into(),
            model: "3".into(),
            year: Some(2019),
            odometer: 45_200,
            vin: None,
            first_seen: Some(today - chrono::Duration::days(400)),
        };
        let service = |service_type: &str, days_ago: i64, distance: u32| ServiceRecord {
            id: Uuid::now_v7(),
            vehicle_id: vehicle.id,
            service_type: service_type.into(),
            date: Some(today - chrono::Duration::days(days_ago)),
            distance,
            notes: None,
        };
        let services = vec![
            service("Cambio de aceite", 300, 33_000),
            service("Rotación", 300, 33_000),
            service("Cambio de aceite", 120, 40_500),
            service("Pastillas de freno", 60, 42_800),
        ];
        Self::from_snapshot(GarageSnapshot {
            vehicles: vec![vehicle],
            services,
            reminders: Vec::new(),
        })
    }
}

#[async_trait]
impl VehicleStore for InMemoryGarage {
    async fn list_vehicles(&self) -> MaintenanceResult<Vec<Vehicle>> {
        Ok(self.state.read().await.vehicles.values().cloned().collect())
    }

    async fn get_vehicle(&self, id: VehicleId) -> MaintenanceResult<Vehicle> {
        self.state
            .read()
            .await
            .vehicles
            .get(&id)
            .cloned()
            .ok_or_else(|| MaintenanceError::not_found("vehicle", id))
    }

    async fn create_vehicle(&self, new: NewVehicle, today: NaiveDate) -> MaintenanceResult<Vehicle> {
        let vehicle = new.into_vehicle(today);
        self.state
            .write()
            .await
            .vehicles
            .insert(vehicle.id, vehicle.clone());
        tracing::debug!(vehicle_id = %vehicle.id, name = %vehicle.display_name(), "vehicle created");
        Ok(vehicle)
    }

    async fn add_distance(&self, id: VehicleId, km: u32) -> MaintenanceResult<Vehicle> {
        let mut state = self.state.write().await;
        let vehicle = state
            .vehicles
            .get_mut(&id)
            .ok_or_else(|| MaintenanceError::not_found("vehicle", id))?;
        vehicle.odometer = vehicle.odometer.saturating_add(km);
        Ok(vehicle.clone())
    }

    async fn delete_vehicle(&self, id: VehicleId) -> MaintenanceResult<()> {
        let mut state = self.state.write().await;
        if state.vehicles.remove(&id).is_none() {
            return Err(MaintenanceError::not_found("vehicle", id));
        }
        let services_before = state.services.len();
        let reminders_before = state.reminders.len();
        state.services.retain(|s| s.vehicle_id != id);
        state.reminders.retain(|r| r.vehicle_id != id);
        tracing::debug!(
            vehicle_id = %id,
            services_removed = services_before - state.services.len(),
            reminders_removed = reminders_before - state.reminders.len(),
            "vehicle deleted"
        );
        Ok(())
    }
}

#[async_trait]
impl ServiceStore for InMemoryGarage {
    async fn list_services(&self, vehicle_id: VehicleId) -> MaintenanceResult<Vec<ServiceRecord>> {
        let state = self.state.read().await;
        state.require_vehicle(vehicle_id)?;
        Ok(state
            .services
            .iter()
            .filter(|s| s.vehicle_id == vehicle_id)
            .cloned()
            .collect())
    }

    async fn create_service(&self, new: NewServiceRecord) -> MaintenanceResult<ServiceRecord> {
        let mut state = self.state.write().await;
        state.require_vehicle(new.vehicle_id)?;
        let record = new.into_record();
        state.services.push(record.clone());
        Ok(record)
    }

    async fn delete_service(&self, id: Uuid) -> MaintenanceResult<()> {
        let mut state = self.state.write().await;
        let before = state.services.len();
        state.services.retain(|s| s.id != id);
        if state.services.len() == before {
            return Err(MaintenanceError::not_found("service", id));
        }
        Ok(())
    }
}

#[async_trait]
impl ReminderStore for InMemoryGarage {
    async fn list_reminders(&self, vehicle_id: VehicleId) -> MaintenanceResult<Vec<Reminder>> {
        let state = self.state.read().await;
        state.require_vehicle(vehicle_id)?;
        let mut reminders: Vec<Reminder> = state
            .reminders
            .iter()
            .rev()
            .filter(|r| r.vehicle_id == vehicle_id)
            .cloned()
            .collect();
        reminders.sort_by(|a, b| b.created_on.cmp(&a.created_on));
        Ok(reminders)
    }

    async fn create_reminder(
        &self,
        new: NewReminder,
        today: NaiveDate,
    ) -> MaintenanceResult<Reminder> {
        let mut state = self.state.write().await;
        state.require_vehicle(new.vehicle_id)?;
        let reminder = new.into_reminder(today)?;
        state.reminders.push(reminder.clone());
        Ok(reminder)
    }

    async fn delete_reminder(&self, id: Uuid) -> MaintenanceResult<()> {
        let mut state = self.state.write().await;
        let before = state.reminders.len();
        state.reminders.retain(|r| r.id != id);
        if state.reminders.len() == before {
            return Err(MaintenanceError::not_found("reminder", id));
        }
        Ok(())
    }

    async fn toggle_reminder(&self, id: Uuid) -> MaintenanceResult<Reminder> {
        let mut state = self.state.write().await;
        let reminder = state
            .reminders
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| MaintenanceError::not_found("reminder", id))?;
        reminder.done = !reminder.done;
        Ok(reminder.clone())
    }
}
