use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique vehicle identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VehicleId(pub Uuid);

impl VehicleId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for VehicleId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for VehicleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Snapshot of a registered vehicle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: VehicleId,
    pub make: String,
    pub model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    /// Current odometer reading in km.
    #[serde(default)]
    pub odometer: u32,
    /// Vehicle Identification Number, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vin: Option<String>,
    /// Date the owner first opened this vehicle. Drives the new-vehicle
    /// grace period of the recommendation engine.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_seen: Option<NaiveDate>,
}

impl Vehicle {
    /// Display name such as "Mazda 3 (2019)".
    pub fn display_name(&self) -> String {
        match self.year {
            Some(year) => format!("{} {} ({year})", self.make, self.model),
            None => format!("{} {}", self.make, self.model),
        }
    }
}

/// Payload for registering a vehicle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewVehicle {
    pub make: String,
    pub model: String,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub odometer: u32,
    #[serde(default)]
    pub vin: Option<String>,
}

impl NewVehicle {
    /// Materialize into a [`Vehicle`] first seen on `today`.
    pub fn into_vehicle(self, today: NaiveDate) -> Vehicle {
        Vehicle {
            id: VehicleId::new(),
            make: self.make,
            model: self.model,
            year: self.year,
            odometer: self.odometer,
            vin: self.vin,
            first_seen: Some(today),
        }
    }
}
