//! Entity-name canonicalization and duplicate merging.

use regex::Regex;
use std::collections::HashMap;
use std::sync::OnceLock;

use crate::schema::Entity;

fn whitespace_re() -> &'static Regex {
    static WHITESPACE: OnceLock<Regex> = OnceLock::new();
    WHITESPACE.get_or_init(|| Regex::new(r"\s+").unwrap())
}

/// Canonical comparison key for an entity name: trimmed, lowercased,
/// internal whitespace collapsed. Names are matched case-insensitively
/// everywhere in the pipeline.
pub fn normalize_name(name: &str) -> String {
    let lowered = name.trim().to_lowercase();
    whitespace_re().replace_all(&lowered, " ").into_owned()
}

/// Collapse entities that share a normalized name into a single record.
///
/// The first occurrence fixes the display name and the output position,
/// keeping order deterministic; a later duplicate with a higher importance
/// contributes its importance and type.
pub fn merge_entities(entities: Vec<Entity>) -> Vec<Entity> {
    let mut merged: Vec<Entity> = Vec::with_capacity(entities.len());
    let mut index_of: HashMap<String, usize> = HashMap::new();

    for entity in entities {
        let key = normalize_name(&entity.name);
        match index_of.get(&key) {
            Some(&idx) => {
                let existing = &mut merged[idx];
                if entity.importance > existing.importance {
                    existing.importance = entity.importance;
                    existing.entity_type = entity.entity_type;
                }
            }
            None => {
                index_of.insert(key, merged.len());
                merged.push(Entity {
                    name: entity.name.trim().to_string(),
                    ..entity
                });
            }
        }
    }

    merged
}
