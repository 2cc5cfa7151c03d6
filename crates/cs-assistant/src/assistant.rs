//! Conversation orchestrator.
//!
//! A chat turn first goes through the offline intent parser: with an
//! active vehicle, reminder and service requests are executed against the
//! stores and confirmed in Spanish. Everything else is answered by the
//! configured [`ChatResponder`]. The maintenance report and the quick
//! actions of the maintenance screen (log a service, remind from a
//! recommendation, auto-add overdue items) live here too, so every caller
//! reads the same store snapshot the same way.

use std::sync::Arc;

use chrono::NaiveDate;
use cs_maintenance::normalize::format_km;
use cs_maintenance::{
    AlertWindow, MaintenanceError, Recommendation, RecommendationEngine, ReminderStore,
    ServiceEntry, ServiceStore, VehicleStore, due_alerts, estimate_daily_distance,
    overdue_autofill, plan_service_entry,
};
use cs_protocol::{
    ChatMessage, ChatReply, NewReminder, NewServiceRecord, NlIntent, Reminder, ServiceRecord,
    Vehicle, VehicleId, last_user_message,
};
use serde::Serialize;

use crate::chat::{ChatResponder, build_request};
use crate::error::{AssistantError, AssistantResult};
use crate::nlp::detect_intent;

/// Tier reported for turns handled by the intent parser.
const NLP_TIER: &str = "nlp";

// ── Outcomes ──────────────────────────────────────────────────

/// Store write performed by a chat turn.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum TurnAction {
    ReminderCreated { reminder: Reminder },
    ServiceCreated { record: ServiceRecord },
}

/// Result of one chat turn.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TurnOutcome {
    pub reply: ChatReply,
    /// Which tier answered: "nlp", "remote", "local".
    pub tier: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<TurnAction>,
}

/// Everything the maintenance screen shows for one vehicle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MaintenanceReport {
    pub vehicle: Vehicle,
    /// Estimated km per day.
    pub daily_rate: f64,
    pub recommendations: Vec<Recommendation>,
    pub alerts: Vec<Reminder>,
}

/// A logged service and the reminder created for its next occurrence.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoggedService {
    pub record: ServiceRecord,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub follow_up: Option<Reminder>,
}

// ── Assistant ─────────────────────────────────────────────────

pub struct Assistant {
    vehicles: Arc<dyn VehicleStore>,
    services: Arc<dyn ServiceStore>,
    reminders: Arc<dyn ReminderStore>,
    responder: Arc<dyn ChatResponder>,
    engine: RecommendationEngine,
    alert_window: AlertWindow,
}

impl Assistant {
    pub fn new(
        vehicles: Arc<dyn VehicleStore>,
        services: Arc<dyn ServiceStore>,
        reminders: Arc<dyn ReminderStore>,
        responder: Arc<dyn ChatResponder>,
    ) -> Self {
        Self {
            vehicles,
            services,
            reminders,
            responder,
            engine: RecommendationEngine::default(),
            alert_window: AlertWindow::default(),
        }
    }

    /// Use one backend for all three stores.
    pub fn with_garage<G>(garage: Arc<G>, responder: Arc<dyn ChatResponder>) -> Self
    where
        G: VehicleStore + ServiceStore + ReminderStore + 'static,
    {
        Self::new(garage.clone(), garage.clone(), garage, responder)
    }

    pub fn with_engine(mut self, engine: RecommendationEngine) -> Self {
        self.engine = engine;
        self
    }

    pub fn with_alert_window(mut self, window: AlertWindow) -> Self {
        self.alert_window = window;
        self
    }

    pub fn engine(&self) -> &RecommendationEngine {
        &self.engine
    }

    /// Handle the latest user message of `history`.
    ///
    /// Intents are only executed when a vehicle is active; without one,
    /// even "recuérdame ..." is answered by the responder. The responder
    /// sees the expanded question and the active vehicle's context (see
    /// [`build_request`]).
    pub async fn handle_turn(
        &self,
        vehicle_id: Option<VehicleId>,
        history: &[ChatMessage],
        today: NaiveDate,
    ) -> AssistantResult<TurnOutcome> {
        if let Some(vehicle_id) = vehicle_id {
            let question = last_user_message(history).trim();
            let intent = detect_intent(question, today);
            if intent.is_actionable() {
                tracing::info!(vehicle_id = %vehicle_id, intent = ?intent, "executing chat intent");
                return self.execute(vehicle_id, intent, today).await;
            }
        }

        let vehicle = match vehicle_id {
            Some(id) => Some(self.vehicles.get_vehicle(id).await?),
            None => None,
        };
        let request = build_request(history, vehicle.as_ref());
        let answer = self
            .responder
            .respond(&request)
            .await
            .ok_or(AssistantError::NoAnswer)?;
        tracing::debug!(tier = %answer.tier, "chat answered");
        Ok(TurnOutcome {
            reply: answer.reply,
            tier: answer.tier,
            action: None,
        })
    }

    async fn execute(
        &self,
        vehicle_id: VehicleId,
        intent: NlIntent,
        today: NaiveDate,
    ) -> AssistantResult<TurnOutcome> {
        let (text, topic, action) = match intent {
            NlIntent::ReminderByDate { date, notes } => {
                let text = format!(
                    "✅ Recordatorio por fecha creado: {date}{}",
                    notes_suffix(notes.as_deref())
                );
                let reminder = self
                    .reminders
                    .create_reminder(NewReminder::by_date(vehicle_id, date, notes), today)
                    .await?;
                (text, "reminder", TurnAction::ReminderCreated { reminder })
            }
            NlIntent::ReminderByDistance { distance, notes } => {
                let text = format!(
                    "✅ Recordatorio por odómetro creado: {} km{}",
                    format_km(distance),
                    notes_suffix(notes.as_deref())
                );
                let reminder = self
                    .reminders
                    .create_reminder(NewReminder::by_distance(vehicle_id, distance, notes), today)
                    .await?;
                (text, "reminder", TurnAction::ReminderCreated { reminder })
            }
            NlIntent::Service {
                service_type,
                date,
                distance,
            } => {
                let mut pieces = vec![format!("✅ Servicio creado: {service_type}")];
                if let Some(date) = date {
                    pieces.push(format!("fecha {date}"));
                }
                if let Some(km) = distance {
                    pieces.push(format!("{} km", format_km(km)));
                }

                let odometer = self.vehicles.get_vehicle(vehicle_id).await?.odometer;
                let record = self
                    .services
                    .create_service(NewServiceRecord {
                        vehicle_id,
                        service_type,
                        date,
                        distance: distance.unwrap_or(odometer),
                        notes: None,
                    })
                    .await?;
                (pieces.join(" — "), "service", TurnAction::ServiceCreated { record })
            }
            NlIntent::None => return Err(AssistantError::NoAnswer),
        };

        Ok(TurnOutcome {
            reply: ChatReply {
                text,
                followups: Vec::new(),
                intent: Some(topic.into()),
            },
            tier: NLP_TIER.into(),
            action: Some(action),
        })
    }

    async fn snapshot(
        &self,
        vehicle_id: VehicleId,
    ) -> AssistantResult<(Vehicle, Vec<ServiceRecord>, Vec<Reminder>)> {
        let vehicle = self.vehicles.get_vehicle(vehicle_id).await?;
        let services = self.services.list_services(vehicle_id).await?;
        let reminders = self.reminders.list_reminders(vehicle_id).await?;
        Ok((vehicle, services, reminders))
    }

    /// Usage estimate, sorted recommendations and due reminder alerts.
    pub async fn maintenance_report(
        &self,
        vehicle_id: VehicleId,
        today: NaiveDate,
    ) -> AssistantResult<MaintenanceReport> {
        let (vehicle, services, reminders) = self.snapshot(vehicle_id).await?;

        let daily_rate = estimate_daily_distance(&services, vehicle.odometer);
        let recommendations = self.engine.build(&vehicle, &services, daily_rate, today);
        let alerts = due_alerts(&reminders, &vehicle, today, self.alert_window)
            .into_iter()
            .cloned()
            .collect();

        Ok(MaintenanceReport {
            vehicle,
            daily_rate,
            recommendations,
            alerts,
        })
    }

    /// Log a service entry and schedule its next occurrence.
    pub async fn log_service(
        &self,
        vehicle_id: VehicleId,
        entry: ServiceEntry,
        today: NaiveDate,
    ) -> AssistantResult<LoggedService> {
        let vehicle = self.vehicles.get_vehicle(vehicle_id).await?;
        let plan = plan_service_entry(self.engine.table(), &vehicle, entry, today);

        let record = self.services.create_service(plan.record).await?;
        let follow_up = match plan.follow_up {
            Some(draft) => Some(self.reminders.create_reminder(draft, today).await?),
            None => None,
        };

        tracing::info!(
            vehicle_id = %vehicle_id,
            service_type = %record.service_type,
            follow_up = follow_up.is_some(),
            "service logged"
        );
        Ok(LoggedService { record, follow_up })
    }

    /// Create a reminder for the recommendation of rule `rule_key`.
    pub async fn remind_recommendation(
        &self,
        vehicle_id: VehicleId,
        rule_key: &str,
        today: NaiveDate,
    ) -> AssistantResult<Reminder> {
        let report = self.maintenance_report(vehicle_id, today).await?;
        let recommendation = report
            .recommendations
            .iter()
            .find(|r| r.rule.key == rule_key)
            .ok_or_else(|| MaintenanceError::not_found("rule", rule_key))?;
        let draft = recommendation
            .to_reminder_draft(vehicle_id)
            .ok_or_else(|| AssistantError::NothingToRemind(rule_key.to_string()))?;
        Ok(self.reminders.create_reminder(draft, today).await?)
    }

    /// Record every overdue item as done today (vehicles with history only).
    pub async fn autofill_overdue(
        &self,
        vehicle_id: VehicleId,
        today: NaiveDate,
    ) -> AssistantResult<Vec<ServiceRecord>> {
        let (vehicle, services, _) = self.snapshot(vehicle_id).await?;
        let daily_rate = estimate_daily_distance(&services, vehicle.odometer);
        let recommendations = self.engine.build(&vehicle, &services, daily_rate, today);

        let drafts = overdue_autofill(
            self.engine.table(),
            &recommendations,
            &vehicle,
            &services,
            today,
        );
        let mut created = Vec::with_capacity(drafts.len());
        for draft in drafts {
            created.push(self.services.create_service(draft).await?);
        }
        if !created.is_empty() {
            tracing::info!(vehicle_id = %vehicle_id, count = created.len(), "overdue services auto-added");
        }
        Ok(created)
    }
}

fn notes_suffix(notes: Option<&str>) -> String {
    notes.map(|n| format!(" — {n}")).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::LocalResponder;
    use crate::chat::rules::CATCH_ALL_TEXT;
    use cs_maintenance::{DueStatus, InMemoryGarage};
    use cs_protocol::{NewVehicle, ReminderKind};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    async fn setup() -> (Arc<InMemoryGarage>, Assistant, VehicleId) {
        let garage = Arc::new(InMemoryGarage::new());
        let vehicle = garage
            .create_vehicle(
                NewVehicle {
                    make: "Nissan".into(),
                    model: "Versa".into(),
                    year: Some(2021),
                    odometer: 45_000,
                    vin: None,
                },
                NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
            )
            .await
            .unwrap();
        let assistant = Assistant::with_garage(garage.clone(), Arc::new(LocalResponder));
        (garage, assistant, vehicle.id)
    }

    fn user(text: &str) -> Vec<ChatMessage> {
        vec![ChatMessage::user(text)]
    }

    #[tokio::test]
    async fn reminder_request_is_persisted() {
        let (garage, assistant, id) = setup().await;
        let outcome = assistant
            .handle_turn(Some(id), &user("recuérdame el aceite en 2 semanas"), today())
            .await
            .unwrap();

        assert_eq!(outcome.tier, "nlp");
        assert_eq!(
            outcome.reply.text,
            "✅ Recordatorio por fecha creado: 2024-06-15 — aceite"
        );
        let reminders = garage.list_reminders(id).await.unwrap();
        assert_eq!(reminders.len(), 1);
        assert_eq!(reminders[0].kind, ReminderKind::ByDate);
        assert_eq!(reminders[0].notes.as_deref(), Some("aceite"));
        assert!(matches!(outcome.action, Some(TurnAction::ReminderCreated { .. })));
    }

    #[tokio::test]
    async fn distance_reminder_confirmation() {
        let (_garage, assistant, id) = setup().await;
        let outcome = assistant
            .handle_turn(Some(id), &user("avísame a los 50000 km"), today())
            .await
            .unwrap();
        assert_eq!(outcome.reply.text, "✅ Recordatorio por odómetro creado: 50,000 km");
    }

    #[tokio::test]
    async fn service_request_defaults_to_odometer() {
        let (garage, assistant, id) = setup().await;
        let outcome = assistant
            .handle_turn(Some(id), &user("registrar servicio de frenos hoy"), today())
            .await
            .unwrap();
        assert_eq!(
            outcome.reply.text,
            "✅ Servicio creado: frenos — fecha 2024-06-01"
        );
        let services = garage.list_services(id).await.unwrap();
        assert_eq!(services.len(), 1);
        assert_eq!(services[0].distance, 45_000);
        assert_eq!(services[0].date, Some(today()));
    }

    #[tokio::test]
    async fn without_vehicle_the_responder_answers() {
        let (garage, assistant, id) = setup().await;
        let outcome = assistant
            .handle_turn(None, &user("recuérdame el aceite mañana"), today())
            .await
            .unwrap();
        assert_eq!(outcome.tier, "local");
        assert!(outcome.action.is_none());
        assert!(garage.list_reminders(id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn questions_go_to_responder() {
        let (_garage, assistant, id) = setup().await;
        let outcome = assistant
            .handle_turn(Some(id), &user("hola, ¿qué tal?"), today())
            .await
            .unwrap();
        assert_eq!(outcome.reply.text, CATCH_ALL_TEXT);
        assert_eq!(outcome.tier, "local");
    }

    /// Keeps every conversation it is asked about.
    #[derive(Default)]
    struct RecordingResponder {
        seen: std::sync::Mutex<Vec<Vec<ChatMessage>>>,
    }

    #[async_trait::async_trait]
    impl ChatResponder for RecordingResponder {
        async fn respond(&self, history: &[ChatMessage]) -> Option<crate::chat::ResponderReply> {
            self.seen.lock().unwrap().push(history.to_vec());
            LocalResponder.respond(history).await
        }

        fn tier_name(&self) -> &str {
            "recording"
        }
    }

    #[tokio::test]
    async fn responder_gets_vehicle_context_and_expanded_question() {
        let (garage, _assistant, id) = setup().await;
        let recorder = Arc::new(RecordingResponder::default());
        let assistant = Assistant::with_garage(garage, recorder.clone());

        let outcome = assistant
            .handle_turn(Some(id), &user("/frenos"), today())
            .await
            .unwrap();
        assert_eq!(outcome.reply.intent.as_deref(), Some("brakes"));

        let seen = recorder.seen.lock().unwrap();
        let request = &seen[0];
        assert_eq!(request.len(), 3);
        assert_eq!(request[0].role, cs_protocol::ChatRole::System);
        assert!(request[0].content.contains("- Vehículo: Nissan Versa (2021)"));
        assert!(request[0].content.contains("- Odómetro: 45000 km"));
        assert_eq!(request[1].content, "/frenos");
        assert_eq!(
            request[2].content,
            "Frenos rechinan o vibran: causas y verificación."
        );
    }

    #[tokio::test]
    async fn without_vehicle_prefix_has_no_context() {
        let (garage, _assistant, _) = setup().await;
        let recorder = Arc::new(RecordingResponder::default());
        let assistant = Assistant::with_garage(garage, recorder.clone());

        assistant
            .handle_turn(None, &user("tengo P0171"), today())
            .await
            .unwrap();

        let seen = recorder.seen.lock().unwrap();
        assert!(!seen[0][0].content.contains("Contexto:"));
        assert!(seen[0][2].content.starts_with("Tengo el código OBD-II P0171."));
    }

    #[tokio::test]
    async fn unknown_vehicle_propagates_store_error() {
        let (_garage, assistant, _) = setup().await;
        let err = assistant
            .handle_turn(Some(VehicleId::new()), &user("recordatorio mañana"), today())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AssistantError::Maintenance(MaintenanceError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn report_includes_alerts() {
        let (garage, assistant, id) = setup().await;
        garage
            .create_reminder(NewReminder::by_distance(id, 45_300, None), today())
            .await
            .unwrap();
        garage
            .create_reminder(NewReminder::by_distance(id, 60_000, None), today())
            .await
            .unwrap();

        let report = assistant.maintenance_report(id, today()).await.unwrap();
        assert_eq!(report.vehicle.id, id);
        assert_eq!(report.alerts.len(), 1);
        assert_eq!(report.recommendations.len(), 10);
        // no history: odometer heuristic 45000 / 365 ≈ 123 → clamped to 120
        assert_eq!(report.daily_rate, 120.0);
    }

    #[tokio::test]
    async fn log_service_schedules_next_occurrence() {
        let (garage, assistant, id) = setup().await;
        let logged = assistant
            .log_service(
                id,
                ServiceEntry {
                    service_type: "Cambio de aceite".into(),
                    date: Some(today()),
                    distance: None,
                    notes: None,
                },
                today(),
            )
            .await
            .unwrap();

        assert_eq!(logged.record.distance, 45_000);
        let follow_up = logged.follow_up.unwrap();
        assert_eq!(follow_up.due_distance, Some(53_000));
        assert_eq!(follow_up.due_date, NaiveDate::from_ymd_opt(2024, 12, 1));
        assert_eq!(garage.list_reminders(id).await.unwrap().len(), 1);

        let report = assistant.maintenance_report(id, today()).await.unwrap();
        let oil = report
            .recommendations
            .iter()
            .find(|r| r.rule.key == "Cambio de aceite")
            .unwrap();
        assert_eq!(oil.due_distance, Some(53_000));
        assert_eq!(oil.status, DueStatus::Ok);
    }

    #[tokio::test]
    async fn remind_from_recommendation() {
        let (_garage, assistant, id) = setup().await;
        let reminder = assistant
            .remind_recommendation(id, "Bujías", today())
            .await
            .unwrap();
        assert_eq!(reminder.kind, ReminderKind::ByDate);
        assert_eq!(reminder.due_distance, Some(60_000));
        assert_eq!(reminder.notes.as_deref(), Some("Bujías"));

        let err = assistant
            .remind_recommendation(id, "Turbo", today())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AssistantError::Maintenance(MaintenanceError::NotFound { kind: "rule", .. })
        ));
    }

    #[tokio::test]
    async fn autofill_adds_overdue_once() {
        let (garage, assistant, id) = setup().await;
        garage
            .create_service(NewServiceRecord {
                vehicle_id: id,
                service_type: "aceite".into(),
                date: NaiveDate::from_ymd_opt(2023, 1, 10),
                distance: 30_000,
                notes: None,
            })
            .await
            .unwrap();

        let added = assistant.autofill_overdue(id, today()).await.unwrap();
        assert_eq!(added.len(), 1);
        assert_eq!(added[0].service_type, "Cambio de aceite");

        // second run on the same day is a no-op
        assert!(assistant.autofill_overdue(id, today()).await.unwrap().is_empty());
    }
}
