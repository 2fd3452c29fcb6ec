//! Normalized skill registry entry.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value as JsonValue;

use crate::utils::format::title_from_id;
use crate::utils::text::normalize_id;

/// Declared risk of applying a skill.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    #[default]
    Low,
    Medium,
    High,
}

impl RiskLevel {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    /// Parse leniently; anything unrecognized is `Low`.
    #[must_use]
    pub fn parse_lenient(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "medium" | "med" => Self::Medium,
            "high" => Self::High,
            _ => Self::Low,
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for RiskLevel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Option::<JsonValue>::deserialize(deserializer)?;
        Ok(match value {
            Some(JsonValue::String(raw)) => Self::parse_lenient(&raw),
            _ => Self::Low,
        })
    }
}

/// A registry entry. Read-only for the duration of a selection run.
///
/// Every field decodes leniently: list fields accept a scalar or a list,
/// wrong-typed values fall back to their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Skill {
    #[serde(deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(deserialize_with = "lenient_string")]
    pub description: String,
    #[serde(deserialize_with = "lenient_version")]
    pub version: String,
    #[serde(deserialize_with = "lenient_set")]
    pub tags: BTreeSet<String>,
    #[serde(deserialize_with = "lenient_set")]
    pub domains: BTreeSet<String>,
    #[serde(deserialize_with = "lenient_set")]
    pub tech: BTreeSet<String>,
    #[serde(deserialize_with = "lenient_set")]
    pub role_affinity: BTreeSet<String>,
    #[serde(deserialize_with = "lenient_set")]
    pub provides: BTreeSet<String>,
    #[serde(deserialize_with = "lenient_list")]
    pub requires: Vec<String>,
    #[serde(deserialize_with = "lenient_list")]
    pub conflicts: Vec<String>,
    #[serde(deserialize_with = "lenient_bool")]
    pub guardrail: bool,
    pub risk_level: RiskLevel,
    #[serde(deserialize_with = "lenient_keywords")]
    pub keywords: BTreeSet<String>,
    #[serde(deserialize_with = "lenient_optional_string", skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,
    #[serde(deserialize_with = "lenient_optional_string", skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl Default for Skill {
    fn default() -> Self {
        Self {
            id: String::new(),
            name: String::new(),
            description: String::new(),
            version: Self::DEFAULT_VERSION.to_string(),
            tags: BTreeSet::new(),
            domains: BTreeSet::new(),
            tech: BTreeSet::new(),
            role_affinity: BTreeSet::new(),
            provides: BTreeSet::new(),
            requires: Vec::new(),
            conflicts: Vec::new(),
            guardrail: false,
            risk_level: RiskLevel::Low,
            keywords: BTreeSet::new(),
            last_updated: None,
            path: None,
        }
    }
}

impl Skill {
    pub const DEFAULT_VERSION: &'static str = "0.0.0";

    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
        .normalized()
    }

    /// Placeholder for an id that was requested but is not registered.
    #[must_use]
    pub fn placeholder(id: &str) -> Self {
        Self {
            id: id.to_string(),
            name: id.to_string(),
            ..Self::default()
        }
    }

    /// Decode one raw registry entry. Returns `None` only when the entry has
    /// no usable id.
    #[must_use]
    pub fn from_value(value: JsonValue) -> Option<Self> {
        if !value.is_object() {
            return None;
        }
        let skill: Self = serde_json::from_value(value).ok()?;
        let skill = skill.normalized();
        (!skill.id.is_empty()).then_some(skill)
    }

    /// Canonicalize ids (trimmed, lower-cased) and fill derived defaults.
    /// A derived name keeps the id's original spelling.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        if self.name.trim().is_empty() {
            self.name = title_from_id(self.id.trim());
        }
        self.id = normalize_id(&self.id);
        if self.version.trim().is_empty() {
            self.version = Self::DEFAULT_VERSION.to_string();
        }
        self.requires = clean_ids(self.requires);
        self.conflicts = clean_ids(self.conflicts);
        self
    }

    /// Text used to embed this skill when no precomputed vector exists.
    #[must_use]
    pub fn embedding_text(&self) -> String {
        let parts = [
            self.name.clone(),
            self.description.clone(),
            join(&self.tags),
            join(&self.domains),
            join(&self.tech),
        ];
        let text = parts
            .iter()
            .filter(|part| !part.is_empty())
            .cloned()
            .collect::<Vec<_>>()
            .join(" ");
        if text.trim().is_empty() {
            self.id.clone()
        } else {
            text
        }
    }
}

fn join(set: &BTreeSet<String>) -> String {
    set.iter().cloned().collect::<Vec<_>>().join(" ")
}

fn clean_ids(ids: Vec<String>) -> Vec<String> {
    let mut seen = BTreeSet::new();
    ids.into_iter()
        .map(|id| normalize_id(&id))
        .filter(|id| !id.is_empty() && seen.insert(id.clone()))
        .collect()
}

fn scalar_to_string(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::String(s) => Some(s.clone()),
        JsonValue::Number(n) => Some(n.to_string()),
        JsonValue::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn values_to_strings(value: Option<JsonValue>) -> Vec<String> {
    match value {
        Some(JsonValue::Array(items)) => items.iter().filter_map(scalar_to_string).collect(),
        Some(other) => scalar_to_string(&other).into_iter().collect(),
        None => Vec::new(),
    }
    .into_iter()
    .map(|item| item.trim().to_string())
    .filter(|item| !item.is_empty())
    .collect()
}

fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let value = Option::<JsonValue>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(scalar_to_string).unwrap_or_default())
}

fn lenient_optional_string<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    let value = Option::<JsonValue>::deserialize(deserializer)?;
    Ok(value
        .as_ref()
        .and_then(scalar_to_string)
        .filter(|s| !s.trim().is_empty()))
}

fn lenient_version<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let version = lenient_string(deserializer)?;
    Ok(if version.trim().is_empty() {
        Skill::DEFAULT_VERSION.to_string()
    } else {
        version
    })
}

fn lenient_list<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    let value = Option::<JsonValue>::deserialize(deserializer)?;
    Ok(values_to_strings(value))
}

fn lenient_set<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<BTreeSet<String>, D::Error> {
    let value = Option::<JsonValue>::deserialize(deserializer)?;
    Ok(values_to_strings(value)
        .into_iter()
        .map(|item| item.to_lowercase())
        .collect())
}

// Keywords keep their case; the tokenizer lower-cases them at scoring time.
fn lenient_keywords<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<BTreeSet<String>, D::Error> {
    let value = Option::<JsonValue>::deserialize(deserializer)?;
    Ok(values_to_strings(value).into_iter().collect())
}

fn lenient_bool<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    let value = Option::<JsonValue>::deserialize(deserializer)?;
    Ok(match value {
        Some(JsonValue::Bool(b)) => b,
        Some(JsonValue::String(s)) => matches!(s.trim().to_lowercase().as_str(), "true" | "yes" | "1"),
        Some(JsonValue::Number(n)) => n.as_i64().is_some_and(|n| n != 0),
        _ => false,
    })
}
