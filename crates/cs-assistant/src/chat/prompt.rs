//! Question shaping before an answer source sees the conversation.
//!
//! Slash shortcuts (`/aceite`, `/frenos`, ...) and topic keywords are
//! expanded into fuller questions, an OBD-II code becomes a diagnostic
//! request, and the request is prefixed with a system message carrying
//! the active vehicle and the expected answer layout.

use std::sync::LazyLock;

use cs_protocol::{ChatMessage, Vehicle, last_user_message};
use regex::Regex;

static RE_OBD_CODE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b(p\d{4})\b").unwrap());

const ANSWER_STYLE: &str = "Instrucciones de estilo:
Responde en español, claro y accionable. Usa este formato cuando aplique:
1) Diagnóstico rápido (qué significa / causas probables)
2) Acciones inmediatas (pasos concretos, con prioridad)
3) Checklist de verificación (3–8 ítems)
4) Riesgos y cuándo ir al taller (señales de urgencia)
5) Costos/tiempos aproximados (si aplica)
6) Prevención (hábitos y periodicidad)
Termina con 3–5 preguntas de seguimiento útiles en viñetas.";

pub const SHORTCUTS_HELP: &str =
    "Atajos: /aceite /llantas /frenos /bateria /viaje /consumo /liquidos /clima /suspension /luces";

const OBD_PROMPT: &str = "Interpreta el código OBD-II recibido, monitores y pruebas caseras.";

/// Prompt template for a topic key, as used by `/key` shortcuts.
fn topic_prompt(key: &str, vehicle: Option<&Vehicle>) -> Option<String> {
    let text = match key {
        "aceite" => {
            let target = vehicle.map_or_else(
                || "mi auto".to_string(),
                |v| {
                    let year = v.year.map_or_else(|| "s/a".to_string(), |y| y.to_string());
                    format!("{} {} ({year})", v.make, v.model)
                },
            );
            return Some(format!(
                "¿Cada cuándo debo cambiar aceite y filtro para {target}?\n\
                 Incluye tipo de aceite sugerido y señales de desgaste."
            ));
        }
        "llantas" => "Presión de llantas y rotación: guía práctica.",
        "frenos" => "Frenos rechinan o vibran: causas y verificación.",
        "bateria" => "Batería 12V: síntomas, voltajes y pruebas con multímetro.",
        "viaje" => {
            "Checklist antes de viaje largo (niveles, llantas, frenos, luces, documentos, kit)."
        }
        "consumo" => "Consumo alto: diagnóstico por etapas y hábitos eficientes.",
        "obd" => OBD_PROMPT,
        "liquidos" => "Mapa de fluidos: intervalos y colores.",
        "clima" => "A/C no enfría: diagnóstico básico y riesgos.",
        "suspension" => "Golpeteos/inestabilidad: diagnóstico y pruebas de rebote.",
        "luces" => "Luces de advertencia comunes: significado y prioridad.",
        _ => return None,
    };
    Some(text.to_string())
}

// Keyword → topic, first contained keyword wins.
const KEYWORD_TOPICS: &[(&[&str], &str)] = &[
    (&["aceite"], "aceite"),
    (&["llanta", "neum"], "llantas"),
    (&["freno"], "frenos"),
    (&["bater"], "bateria"),
    (&["viaje"], "viaje"),
    (&["consumo"], "consumo"),
    (&["aire", "a/c", "clima"], "clima"),
    (&["susp"], "suspension"),
    (&["luz", "warning", "testigo"], "luces"),
];

/// Expand a user question into the prompt sent to the answer source.
///
/// An OBD-II code wins, then a `/shortcut` (`/ayuda` lists them), then
/// the first topic keyword. Anything else is returned unchanged.
pub fn smart_prompt(question: &str, vehicle: Option<&Vehicle>) -> String {
    let low = question.trim().to_lowercase();

    if let Some(code) = RE_OBD_CODE.captures(&low) {
        return format!(
            "Tengo el código OBD-II {}. {OBD_PROMPT}",
            code[1].to_uppercase()
        );
    }

    if let Some(command) = low.strip_prefix('/') {
        let key = command.split_whitespace().next().unwrap_or_default();
        if let Some(prompt) = topic_prompt(key, vehicle) {
            return prompt;
        }
        if key == "ayuda" {
            return SHORTCUTS_HELP.to_string();
        }
    }

    KEYWORD_TOPICS
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| low.contains(k)))
        .and_then(|(_, topic)| topic_prompt(topic, vehicle))
        .unwrap_or_else(|| question.to_string())
}

/// System message: vehicle context (when one is active) plus the
/// answer layout.
pub fn system_prefix(vehicle: Option<&Vehicle>) -> String {
    match vehicle {
        Some(v) => {
            let year = v.year.map_or_else(|| "s/a".to_string(), |y| y.to_string());
            format!(
                "Contexto:\n- Vehículo: {} {} ({year})\n- Odómetro: {} km\n\n{ANSWER_STYLE}",
                v.make, v.model, v.odometer
            )
        }
        None => ANSWER_STYLE.to_string(),
    }
}

/// Conversation handed to a responder: system prefix, the history as
/// typed, then the expanded latest question.
pub fn build_request(history: &[ChatMessage], vehicle: Option<&Vehicle>) -> Vec<ChatMessage> {
    let mut request = Vec::with_capacity(history.len() + 2);
    request.push(ChatMessage::system(system_prefix(vehicle)));
    request.extend_from_slice(history);

    let question = last_user_message(history).trim();
    if !question.is_empty() {
        request.push(ChatMessage::user(smart_prompt(question, vehicle)));
    }
    request
}
