use serde::{Deserialize, Serialize};

/// Field-level contract for a record type coming back from the model.
/// Serde handles shape and types; `check` enforces the constraints serde
/// cannot express (non-empty strings, float ranges).
pub trait RecordSchema {
    /// Record name used in prompts, logs and errors.
    const KIND: &'static str;

    /// JSON shape description embedded in prompts and correction prompts.
    fn schema_hint() -> &'static str;

    fn check(&self) -> Result<(), String>;
}

/// A named, typed thing extracted from text, with a relevance score.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Entity {
    pub name: String,
    #[serde(rename = "type")]
    pub entity_type: String,
    pub importance: f64,
}

impl RecordSchema for Entity {
    const KIND: &'static str = "entity";

    fn schema_hint() -> &'static str {
        r#"[{"name": "string", "type": "string", "importance": number between 0 and 1}]"#
    }

    fn check(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("entity name must be non-empty".to_string());
        }
        check_unit_range("importance", self.importance)
    }
}

/// A directed, typed, weighted connection between two entities.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Relationship {
    pub source: String,
    pub target: String,
    pub relation_type: String,
    pub weight: f64,
}

impl RecordSchema for Relationship {
    const KIND: &'static str = "relationship";

    fn schema_hint() -> &'static str {
        r#"[{"source": "string", "target": "string", "relation_type": "string", "weight": number between 0 and 1}]"#
    }

    fn check(&self) -> Result<(), String> {
        if self.source.trim().is_empty() {
            return Err("relationship source must be non-empty".to_string());
        }
        if self.target.trim().is_empty() {
            return Err("relationship target must be non-empty".to_string());
        }
        check_unit_range("weight", self.weight)
    }
}

fn check_unit_range(field: &str, value: f64) -> Result<(), String> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(format!("{field} must be within [0, 1], got {value}"))
    }
}
