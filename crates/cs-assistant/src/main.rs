//! CarSense assistant: maintenance report plus a line-oriented chat loop.
//!
//! Loads the rule catalogue and the garage snapshot, logs the maintenance
//! report of the first vehicle, then answers each stdin line as a chat
//! turn and prints the outcome as one JSON line.

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use cs_assistant::chat::{ChatResponder, FallbackResponder, LocalResponder, RemoteChatClient};
use cs_assistant::{Assistant, AssistantConfig};
use cs_maintenance::{InMemoryGarage, VehicleStore};
use cs_protocol::ChatMessage;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .with_writer(std::io::stderr)
        .init();

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "cs-assistant starting");

    // ── Load config ─────────────────────────────────────────────
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "carsense.toml".to_string());

    let config = if std::path::Path::new(&config_path).exists() {
        AssistantConfig::from_file(&config_path)?
    } else {
        tracing::info!(path = %config_path, "config file not found, using defaults");
        AssistantConfig::default()
    };

    let engine = config.build_engine()?;
    tracing::info!(rule_count = engine.table().len(), "rule catalogue ready");

    // ── Garage ──────────────────────────────────────────────────
    let today = chrono::Local::now().date_naive();
    let garage = match &config.garage_path {
        Some(path) => InMemoryGarage::load_json(path).await?,
        None => {
            tracing::info!("no garage snapshot configured, using sample data");
            InMemoryGarage::with_sample_data(today)
        }
    };
    let garage = Arc::new(garage);

    // ── Responder tiers ─────────────────────────────────────────
    let responder: Arc<dyn ChatResponder> = if config.remote.enabled {
        tracing::info!(url = %config.remote.ask_url(), "remote chatbot enabled");
        Arc::new(FallbackResponder::new(
            Box::new(RemoteChatClient::new(&config.remote)?),
            Box::new(LocalResponder),
        ))
    } else {
        tracing::info!("remote chatbot disabled");
        Arc::new(LocalResponder)
    };

    let assistant = Assistant::with_garage(garage.clone(), responder)
        .with_engine(engine)
        .with_alert_window(config.alerts);

    // ── Report ──────────────────────────────────────────────────
    let active = garage.list_vehicles().await?.into_iter().next();
    if let Some(vehicle) = &active {
        let report = assistant.maintenance_report(vehicle.id, today).await?;
        tracing::info!(
            vehicle = %vehicle.display_name(),
            daily_rate = report.daily_rate,
            alerts = report.alerts.len(),
            report = %serde_json::to_string(&report)?,
            "maintenance report"
        );
    } else {
        tracing::warn!("garage is empty, chat will not execute reminders or services");
    }
    let active_id = active.map(|v| v.id);

    // ── Chat loop ───────────────────────────────────────────────
    tracing::info!("cs-assistant ready");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut history: Vec<ChatMessage> = Vec::new();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    tracing::info!("stdin closed");
                    break;
                };
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }

                history.push(ChatMessage::user(line));
                let today = chrono::Local::now().date_naive();
                match assistant.handle_turn(active_id, &history, today).await {
                    Ok(outcome) => {
                        history.push(ChatMessage::assistant(outcome.reply.text.clone()));
                        println!("{}", serde_json::to_string(&outcome)?);
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "chat turn failed");
                    }
                }
            }
            // Graceful shutdown on SIGINT
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("shutdown signal received");
                break;
            }
        }
    }

    tracing::info!("cs-assistant stopped");
    Ok(())
}
