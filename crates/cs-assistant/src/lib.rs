//! CarSense assistant: library crate behind the `cs-assistant` binary.
//!
//! Wires the maintenance core to a conversational front end:
//! - **nlp**: offline Spanish parser turning "recuérdame el aceite en 2
//!   semanas" into reminder / service intents.
//! - **chat**: rule-based knowledge base (maintenance, OBD-II codes), the
//!   remote backend client, and the fallback composition of both.
//! - **assistant**: the orchestrator that executes intents against the
//!   stores and builds maintenance reports.
//!
//! Exposed as a library so `cs-e2e-tests` can drive it end to end.

pub mod assistant;
pub mod chat;
pub mod config;
pub mod error;
pub mod nlp;

pub use assistant::{Assistant, LoggedService, MaintenanceReport, TurnAction, TurnOutcome};
pub use chat::{ChatResponder, FallbackResponder, LocalResponder, RemoteChatClient, ResponderReply};
pub use config::AssistantConfig;
pub use error::{AssistantError, AssistantResult};
