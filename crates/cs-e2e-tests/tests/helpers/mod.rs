//! Shared test harness for E2E integration tests.
//!
//! Wires an in-memory garage, the assistant and a chosen responder stack,
//! exercising real code paths across all crate boundaries with a fixed
//! reference date.

#![allow(dead_code)]

use std::sync::Arc;

use chrono::NaiveDate;

use cs_assistant::chat::{ChatResponder, LocalResponder};
use cs_assistant::{Assistant, TurnOutcome};
use cs_maintenance::{InMemoryGarage, ServiceStore, VehicleStore};
use cs_protocol::{ChatMessage, NewServiceRecord, NewVehicle, ServiceRecord, VehicleId};

/// Fixed "today" for every E2E test.
pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// End-to-end test harness: garage + assistant + one registered vehicle.
pub struct TestHarness {
    /// Store backing every trait the assistant uses.
    pub garage: Arc<InMemoryGarage>,
    pub assistant: Assistant,
    /// The vehicle registered at construction (active in chat turns).
    pub vehicle_id: VehicleId,
}

impl TestHarness {
    /// Harness with offline answers only and a 45,000 km vehicle first
    /// seen well before [`today`].
    pub async fn new() -> Self {
        Self::with_responder(Arc::new(LocalResponder)).await
    }

    /// Harness with a custom responder stack.
    pub async fn with_responder(responder: Arc<dyn ChatResponder>) -> Self {
        Self::build(responder, 45_000, date(2023, 1, 1)).await
    }

    /// Harness whose vehicle was registered on `first_seen`.
    pub async fn with_vehicle(odometer: u32, first_seen: NaiveDate) -> Self {
        Self::build(Arc::new(LocalResponder), odometer, first_seen).await
    }

    async fn build(responder: Arc<dyn ChatResponder>, odometer: u32, first_seen: NaiveDate) -> Self {
        let garage = Arc::new(InMemoryGarage::new());
        let vehicle = garage
            .create_vehicle(
                NewVehicle {
                    make: "Mazda".into(),
                    model: "3".into(),
                    year: Some(2019),
                    odometer,
                    vin: None,
                },
                first_seen,
            )
            .await
            .unwrap();
        let assistant = Assistant::with_garage(garage.clone(), responder);

        Self {
            garage,
            assistant,
            vehicle_id: vehicle.id,
        }
    }

    /// Send a single user message with the harness vehicle active.
    pub async fn say(&self, text: &str) -> TurnOutcome {
        self.assistant
            .handle_turn(Some(self.vehicle_id), &[ChatMessage::user(text)], today())
            .await
            .unwrap()
    }

    /// Log a raw service record straight into the store.
    pub async fn add_service(&self, service_type: &str, on: NaiveDate, km: u32) -> ServiceRecord {
        self.garage
            .create_service(NewServiceRecord {
                vehicle_id: self.vehicle_id,
                service_type: service_type.into(),
                date: Some(on),
                distance: km,
                notes: None,
            })
            .await
            .unwrap()
    }
}
