use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::vehicle::VehicleId;

/// A logged maintenance event. Immutable once stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceRecord {
    pub id: Uuid,
    pub vehicle_id: VehicleId,
    /// Free-text service type as entered by the user ("Cambio de aceite").
    pub service_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    /// Odometer reading (km) when the service was performed.
    #[serde(default)]
    pub distance: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Payload for logging a service event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewServiceRecord {
    pub vehicle_id: VehicleId,
    pub service_type: String,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub distance: u32,
    #[serde(default)]
    pub notes: Option<String>,
}

impl NewServiceRecord {
    pub fn into_record(self) -> ServiceRecord {
        ServiceRecord {
            id: Uuid::now_v7(),
            vehicle_id: self.vehicle_id,
            service_type: self.service_type,
            date: self.date,
            distance: self.distance,
            notes: self.notes,
        }
    }
}
