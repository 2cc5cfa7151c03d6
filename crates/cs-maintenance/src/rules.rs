//! Maintenance rule catalogue and free-text service-name matching.
//!
//! The catalogue is configuration data: [`RuleTable::default`] ships the
//! built-in table, [`RuleTable::from_file`] loads a TOML override. Rule
//! order is significant: matching is first-match-wins, so more specific
//! rules ("Filtro de aceite") must precede broader ones ("Cambio de
//! aceite", whose alias "aceite" would otherwise swallow them).

use serde::{Deserialize, Serialize};

use crate::error::{MaintenanceError, MaintenanceResult};
use crate::normalize::fold;

/// A named maintenance task with its recommended recurrence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaintenanceRule {
    /// Canonical name, also used as the service type for quick-adds.
    pub key: String,
    /// Recurrence in km.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance_interval: Option<u32>,
    /// Recurrence in calendar months.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub months_interval: Option<u32>,
    /// Substrings that identify this rule in free-text service names.
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl MaintenanceRule {
    fn new(
        key: &str,
        distance_interval: u32,
        months_interval: u32,
        aliases: &[&str],
        hint: Option<&str>,
    ) -> Self {
        Self {
            key: key.into(),
            distance_interval: Some(distance_interval),
            months_interval: Some(months_interval),
            aliases: aliases.iter().map(|a| (*a).to_string()).collect(),
            hint: hint.map(String::from),
        }
    }

    /// Whether the rule can produce a due projection at all.
    pub fn has_interval(&self) -> bool {
        self.distance_interval.is_some() || self.months_interval.is_some()
    }

    fn matches_folded(&self, folded: &str) -> bool {
        self.aliases.iter().any(|a| folded.contains(&fold(a))) || folded == fold(&self.key)
    }
}

/// Ordered, read-only rule catalogue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleTable {
    rules: Vec<MaintenanceRule>,
}

impl RuleTable {
    /// Build a table from rules in priority order.
    pub fn new(rules: Vec<MaintenanceRule>) -> MaintenanceResult<Self> {
        let table = Self { rules };
        table.validate()?;
        Ok(table)
    }

    /// Parse a catalogue from TOML (`[[rules]]` array of tables).
    pub fn from_toml_str(contents: &str) -> MaintenanceResult<Self> {
        let table: Self =
            toml::from_str(contents).map_err(|e| MaintenanceError::Catalog(e.to_string()))?;
        table.validate()?;
        Ok(table)
    }

    /// Load a catalogue from a TOML file path.
    pub fn from_file(path: &str) -> MaintenanceResult<Self> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| MaintenanceError::Io(format!("{path}: {e}")))?;
        let table = Self::from_toml_str(&contents)?;
        tracing::info!(path = %path, rule_count = table.len(), "rule catalogue loaded");
        Ok(table)
    }

    fn validate(&self) -> MaintenanceResult<()> {
        if self.rules.is_empty() {
            return Err(MaintenanceError::Catalog("catalogue has no rules".into()));
        }
        for rule in &self.rules {
            if rule.key.trim().is_empty() {
                return Err(MaintenanceError::Catalog("rule with empty key".into()));
            }
            if rule.distance_interval == Some(0) || rule.months_interval == Some(0) {
                return Err(MaintenanceError::Catalog(format!(
                    "rule '{}' has a zero interval",
                    rule.key
                )));
            }
            if !rule.has_interval() {
                tracing::warn!(rule = %rule.key, "rule has no interval and will never be due");
            }
        }
        Ok(())
    }

    pub fn rules(&self) -> &[MaintenanceRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Look up a rule by its exact key.
    pub fn get(&self, key: &str) -> Option<&MaintenanceRule> {
        self.rules.iter().find(|r| r.key == key)
    }

    /// Find the rule a free-text service name refers to.
    ///
    /// Case and diacritic insensitive: the first rule with an alias
    /// contained in the input, or whose key equals the input, wins.
    pub fn match_rule_name(&self, text: &str) -> Option<&MaintenanceRule> {
        let folded = fold(text);
        self.rules.iter().find(|r| r.matches_folded(&folded))
    }

    /// Group key for a service record: the matched rule key, or the raw
    /// service type when no rule matches.
    pub fn canonical_key<'a>(&'a self, service_type: &'a str) -> &'a str {
        self.match_rule_name(service_type)
            .map(|r| r.key.as_str())
            .unwrap_or(service_type)
    }
}

impl Default for RuleTable {
    fn default() -> Self {
        // Matching is first-match-wins on substrings, so a rule whose alias
        // contains another rule's alias must come first: "filtro de aceite"
        // before "aceite", "líquido de frenos" before "frenos". Otherwise
        // "cambié el filtro de aceite" would resolve to the oil change.
        Self {
            rules: vec![
                MaintenanceRule::new(
                    "Filtro de aceite",
                    8000,
                    6,
                    &["filtro de aceite"],
                    Some("Cámbialo con el aceite"),
                ),
                MaintenanceRule::new(
                    "Cambio de aceite",
                    8000,
                    6,
                    &["aceite", "cambio de aceite"],
                    Some("Menor desgaste del motor"),
                ),
                MaintenanceRule::new(
                    "Rotación",
                    12000,
                    12,
                    &["rotación", "rotacion"],
                    Some("Desgaste uniforme de llantas"),
                ),
                MaintenanceRule::new("Filtro de aire", 12000, 12, &["filtro de aire"], None),
                MaintenanceRule::new(
                    "Líquido de frenos",
                    40000,
                    24,
                    &["líquido de frenos", "liquido de frenos", "dot4"],
                    None,
                ),
                MaintenanceRule::new(
                    "Pastillas de freno",
                    25000,
                    24,
                    &["pastillas", "frenos"],
                    None,
                ),
                MaintenanceRule::new("Filtro cabina", 15000, 12, &["filtro cabina", "cabina"], None),
                MaintenanceRule::new("Bujías", 60000, 48, &["bujías", "bujias"], None),
                MaintenanceRule::new("Coolant", 50000, 36, &["coolant", "refrigerante"], None),
                MaintenanceRule::new(
                    "Revisión general",
                    12000,
                    12,
                    &["revisión general", "revision general"],
                    None,
                ),
            ],
        }
    }
}
