//! Offline knowledge base: ordered topic rules for maintenance and OBD-II
//! questions.
//!
//! Always answers: unmatched questions get a fixed catch-all with example
//! prompts. OBD-II codes in the question take priority over topic words.

use cs_maintenance::normalize::fold;
use cs_protocol::{ChatMessage, ChatReply, last_user_message};
use regex::Regex;
use std::sync::LazyLock;

// ── Rules ─────────────────────────────────────────────────────

struct TopicRule {
    intent: &'static str,
    pattern: Regex,
    paragraphs: &'static [&'static str],
    followups: &'static [&'static str],
}

impl TopicRule {
    fn new(
        intent: &'static str,
        pattern: &str,
        paragraphs: &'static [&'static str],
        followups: &'static [&'static str],
    ) -> Self {
        Self {
            intent,
            pattern: Regex::new(pattern).unwrap(),
            paragraphs,
            followups,
        }
    }

    fn reply(&self) -> ChatReply {
        ChatReply {
            text: self.paragraphs.join("\n\n"),
            followups: self.followups.iter().map(|f| (*f).to_string()).collect(),
            intent: Some(self.intent.to_string()),
        }
    }
}

static RE_OBD_CODE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\bP\d{4}\b").unwrap());

// First match wins; order matters.
static TOPIC_RULES: LazyLock<Vec<TopicRule>> = LazyLock::new(|| {
    vec![
        TopicRule::new(
            "oil_interval",
            r"(?i)aceite|cambio de aceite|cada cu[aá]nto.*aceite|oil",
            &[
                "En autos modernos el intervalo típico es **7,500–10,000 mi (12–16 mil km) o 12 meses**, pero **manda el manual** y el recordatorio del auto.",
                "Uso severo (urbano, trayectos cortos, calor, carga) acorta el intervalo. Cambia **filtro de aceite en cada servicio**.",
                "Usa la viscosidad y especificación del fabricante (p. ej. 5W-30 API/ILSAC/ACEA indicadas).",
            ],
            &[
                "¿Qué viscosidad lleva mi motor?",
                "¿Señales de aceite viejo?",
                "¿Cómo reinicio el recordatorio de servicio?",
                "¿Qué pasa si mezclo aceites?",
                "Checklist después del cambio",
            ],
        ),
        TopicRule::new(
            "tire_pressure",
            r"(?i)presi[óo]n.*llantas|psi|bar.*llantas|neum[aá]ticos",
            &[
                "La **presión correcta está en el ‘placard’** (etiqueta) del marco de la puerta del conductor o el manual, **no** en el costado de la llanta.",
                "Mide en **frío**; usa un manómetro confiable. Conduce con presión baja = más desgaste/calor; alta = menor agarre/centro gastado.",
            ],
            &[
                "¿Cómo encuentro el placard?",
                "¿Cada cuánto reviso la presión?",
                "¿Qué TPMS tengo (directo/indirecto)?",
                "¿Cómo rota llantas (patrón)?",
                "Profundidad mínima de dibujo",
            ],
        ),
        TopicRule::new(
            "brakes",
            r"(?i)fren[oa]s|chirr[ií]an|pastillas|liquido.*freno|l[ií]quido de frenos",
            &[
                "Si **rechinan**: podría ser polvo, pastillas cristalizadas o testigo ‘squealer’. Revisa grosor de pastillas y condición de discos.",
                "El **líquido de frenos** suele cambiarse **cada ~2 años** (absorbe humedad). Usa el **DOT** especificado y **no mezcles** tipos.",
            ],
            &[
                "¿Cuándo cambiar líquido de frenos?",
                "¿Cómo identificar pastillas gastadas?",
                "¿Vibración al frenar = discos alabeados?",
                "¿Qué DOT lleva mi auto?",
            ],
        ),
        TopicRule::new(
            "coolant",
            r"(?i)coolant|refrigerante|antifriz|antifreeze",
            &[
                "Respeta **tipo (OAT/HOAT/si-OAT)** y **color NO determina el tipo**. Mezclar tipos puede reducir protección.",
                "Intervalo típico de larga vida: **5 años/150,000 mi** (depende del tipo). Comprueba nivel en frío; nunca abras el tapón caliente.",
            ],
            &[
                "¿Cómo identificar mi tipo de refrigerante?",
                "Síntomas de termostato trabado (P0128)",
                "¿Cuándo cambiar mangueras?",
                "¿Puedo mezclar marcas?",
            ],
        ),
        TopicRule::new(
            "battery",
            r"(?i)bater[ií]a|no dura|no arranca|arranque en fr[ií]o|voltaje.*12",
            &[
                "Referencias en reposo: **~12.6 V ≈ cargada**, **~12.2 V ≈ 50%**, **≤12.0 V descargada**. Mide tras reposo y sin cargas.",
                "Si hay dudas, prueba con **carga** o en tienda con probador conductancia; revisa bornes y consumo parásito.",
            ],
            &[
                "¿Cómo medir voltaje correctamente?",
                "¿Cuánta vida útil promedio?",
                "¿Qué es consumo parásito?",
                "¿Se puede revivir con cargador?",
            ],
        ),
        TopicRule::new(
            "obd_generic",
            r"(?i)obd|dtc|c[oó]digo.*fall[ao]|scanner|esc[aá]ner",
            &[
                "Un DTC es un **código estandarizado**. Hay monitores **continuos** (misfire, combustible) y **no continuos** (catalizador, EVAP…).",
                "Tras borrar códigos, los **monitores** tardan en ponerse ‘LISTOS’; un **catalizador** o **EVAP** pueden requerir varios ciclos.",
            ],
            &[
                "¿Qué es ‘monitor listo’?",
                "¿Cómo hacer un ciclo de manejo?",
                "¿Puedo conducir con el testigo encendido?",
                "¿Cómo leer fuel trims (LTFT/STFT)?",
            ],
        ),
        TopicRule::new(
            "p0171",
            r"(?i)P0171",
            &[
                "**P0171 (mezcla pobre, banco 1)**. Causas comunes: **fugas de vacío**, MAF sucio/defectuoso, presión de combustible baja, escape antes del O2.",
                "Pasos: revisar fugas/abrazaderas, limpiar/verificar **MAF**, presión de bomba/filtro, **fuel trims** con escáner, humo para fugas.",
            ],
            &[
                "¿Cómo leer fuel trims?",
                "¿Cómo limpiar el MAF con seguridad?",
                "¿Dónde buscar fugas de vacío?",
                "¿Puedo conducir con P0171?",
            ],
        ),
        TopicRule::new(
            "p0420",
            r"(?i)P0420",
            &[
                "**P0420** indica **eficiencia baja del catalizador**. Antes de cambiarlo, verifica **fugas de escape**, misfires, mezcla rica/pobre, sensor O2 posterior.",
                "Usa datos del O2 adelante/atrás; revisa que no haya otros DTC de mezcla/ignición. Catalizador se daña por misfire/combustible sin quemar.",
            ],
            &[
                "¿Cómo probar fugas de escape?",
                "¿Qué gráfico del O2 debo ver?",
                "¿Catalizador universal vs OEM?",
                "¿Puedo pasar verificación con P0420?",
            ],
        ),
        TopicRule::new(
            "p030x",
            r"(?i)P030\d",
            &[
                "Misfire: revisa **bujías**, bobinas, cables, fugas vacío, compresión y mezcla. Si es P030X, el número indica el cilindro.",
                "Mira datos de misfire por cilindro si tu escáner lo soporta; revisa humedad/aislamiento en bobinas.",
            ],
            &[
                "¿Cómo leer misfire por cilindro?",
                "¿Cuándo cambiar bujías?",
                "¿Prueba de compresión/‘leak-down’?",
            ],
        ),
        TopicRule::new(
            "p0442",
            r"(?i)P0442",
            &[
                "EVAP fuga pequeña: lo más común es **tapa de combustible** mal cerrada o empaque dañado. Revisa mangueras EVAP y válvula purge.",
            ],
            &[
                "¿Cómo probar tapa del tanque?",
                "¿Dónde va la válvula purge/vent?",
                "¿Cómo hacer ‘drive cycle’ para EVAP?",
            ],
        ),
    ]
});

// ── Catch-all ─────────────────────────────────────────────────

pub const CATCH_ALL_TEXT: &str = "Puedo ayudarte con **mantenimiento, OBD-II y seguridad**. Prueba: “¿Cada cuánto cambio el aceite?”, “Tengo **P0171**”, “¿Presión correcta de llantas?” o “Mis frenos rechinan”.";

pub const CATCH_ALL_FOLLOWUPS: &[&str] = &[
    "¿Cada cuánto cambio el aceite?",
    "Tengo P0171",
    "¿Presión correcta de llantas?",
    "Mis frenos rechinan",
    "Mi batería ya no dura",
];

fn catch_all() -> ChatReply {
    ChatReply {
        text: CATCH_ALL_TEXT.to_string(),
        followups: CATCH_ALL_FOLLOWUPS.iter().map(|f| (*f).to_string()).collect(),
        intent: None,
    }
}

// ── Matching ──────────────────────────────────────────────────

/// Answer the last user message of `history`.
///
/// An OBD-II code (`P` + 4 digits) is matched alone, uppercased, against
/// the rules first, so "aceite y P0420" answers about the catalyst. Then
/// the diacritic-folded question is matched in rule order.
pub fn respond(history: &[ChatMessage]) -> ChatReply {
    let question = last_user_message(history);

    if let Some(code) = RE_OBD_CODE.find(question) {
        let code = code.as_str().to_uppercase();
        if let Some(rule) = TOPIC_RULES.iter().find(|r| r.pattern.is_match(&code)) {
            tracing::debug!(code = %code, intent = rule.intent, "obd code matched");
            return rule.reply();
        }
    }

    let folded = fold(question);
    match TOPIC_RULES.iter().find(|r| r.pattern.is_match(&folded)) {
        Some(rule) => rule.reply(),
        None => catch_all(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ask(question: &str) -> ChatReply {
        respond(&[ChatMessage::user(question)])
    }

    #[test]
    fn p0420_mentions_catalyst_efficiency() {
        let reply = ask("Tengo el código P0420, ¿qué hago?");
        assert!(reply.text.contains("eficiencia baja del catalizador"));
        assert_eq!(reply.intent.as_deref(), Some("p0420"));
        assert_eq!(
            reply.followups,
            vec![
                "¿Cómo probar fugas de escape?",
                "¿Qué gráfico del O2 debo ver?",
                "¿Catalizador universal vs OEM?",
                "¿Puedo pasar verificación con P0420?",
            ]
        );
    }

    #[test]
    fn code_takes_priority_over_topic_words() {
        let reply = ask("cambié el aceite y ahora sale p0171");
        assert_eq!(reply.intent.as_deref(), Some("p0171"));
    }

    #[test]
    fn misfire_codes_share_a_rule() {
        assert_eq!(ask("P0300").intent.as_deref(), Some("p030x"));
        assert_eq!(ask("me salió P0304").intent.as_deref(), Some("p030x"));
    }

    #[test]
    fn unknown_code_falls_back_to_topics() {
        // P0128 has no rule; "código ... falla" hits the generic OBD rule
        let reply = ask("código de falla P0128");
        assert_eq!(reply.intent.as_deref(), Some("obd_generic"));
    }

    #[test]
    fn topic_rules_in_order() {
        assert_eq!(ask("¿Cada cuánto cambio el aceite?").intent.as_deref(), Some("oil_interval"));
        assert_eq!(ask("¿Presión correcta de llantas?").intent.as_deref(), Some("tire_pressure"));
        assert_eq!(ask("Mis frenos rechinan").intent.as_deref(), Some("brakes"));
        assert_eq!(ask("¿Qué refrigerante uso?").intent.as_deref(), Some("coolant"));
        assert_eq!(ask("Mi batería ya no dura").intent.as_deref(), Some("battery"));
        assert_eq!(ask("¿Qué escáner OBD compro?").intent.as_deref(), Some("obd_generic"));
    }

    #[test]
    fn diacritics_are_ignored() {
        assert_eq!(ask("LIQUIDO DE FRENOS").intent.as_deref(), Some("brakes"));
        assert_eq!(ask("la bateria no arranca").intent.as_deref(), Some("battery"));
    }

    #[test]
    fn unrecognized_message_gets_catch_all_verbatim() {
        let reply = ask("¿Cuál es la capital de Francia?");
        assert_eq!(reply.text, CATCH_ALL_TEXT);
        assert_eq!(reply.followups, CATCH_ALL_FOLLOWUPS);
        assert!(reply.intent.is_none());
    }

    #[test]
    fn empty_history_gets_catch_all() {
        assert_eq!(respond(&[]).text, CATCH_ALL_TEXT);
    }

    #[test]
    fn answers_last_user_message() {
        let history = vec![
            ChatMessage::user("Tengo P0420"),
            ChatMessage::assistant("..."),
            ChatMessage::user("¿y la presión de llantas?"),
        ];
        assert_eq!(respond(&history).intent.as_deref(), Some("tire_pressure"));
    }
}
