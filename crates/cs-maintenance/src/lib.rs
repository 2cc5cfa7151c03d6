//! Maintenance core for CarSense.
//!
//! Provides the maintenance rule catalogue, a usage estimator (km/day from
//! service history), the recommendation engine that classifies every rule
//! as overdue / soon / OK, reminder alerts, service-entry planning, and the
//! store traits the orchestration layer reads snapshots from.
//!
//! Everything except the stores is a pure function of its inputs; the
//! reference date is always passed in.

pub mod alerts;
pub mod engine;
pub mod error;
pub mod estimator;
pub mod memory;
pub mod normalize;
pub mod planning;
pub mod rules;
pub mod store;
pub mod types;

// Re-export key types for convenience
pub use alerts::{AlertWindow, due_alerts};
pub use engine::{EngineSettings, RecommendationEngine};
pub use error::{MaintenanceError, MaintenanceResult};
pub use estimator::estimate_daily_distance;
pub use memory::{GarageSnapshot, InMemoryGarage};
pub use planning::{ServiceEntry, ServicePlan, overdue_autofill, plan_service_entry};
pub use rules::{MaintenanceRule, RuleTable};
pub use store::{ReminderStore, ServiceStore, VehicleStore};
pub use types::{DueStatus, LastService, Recommendation};
