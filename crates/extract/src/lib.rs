//! LLM-backed extraction of entities and relationships from free text.
//!
//! Two model calls per run: one for entities, one for relationships. Each
//! call goes through [`validate::call_validated`], which enforces the
//! JSON/schema contract with a single corrective retry.

pub mod llm;
pub mod normalizer;
pub mod prompt;
pub mod schema;
pub mod validate;

pub use llm::{ModelClient, ModelConfig, OpenAiClient, ProviderError};
pub use schema::{Entity, Relationship};
pub use validate::ExtractError;

use std::collections::HashMap;
use tracing::warn;

use normalizer::normalize_name;

/// Extract entities from `text`. The returned list has unique normalized
/// names; duplicates from the model are merged keeping the highest
/// importance.
pub async fn extract_entities(
    client: &dyn ModelClient,
    text: &str,
) -> Result<Vec<Entity>, ExtractError> {
    let user_prompt = prompt::build_entity_prompt(text);
    let entities: Vec<Entity> =
        validate::call_validated(client, prompt::ENTITY_SYSTEM_PROMPT, &user_prompt).await?;
    Ok(normalizer::merge_entities(entities))
}

/// Extract relationships between known `entities`. Records whose endpoints
/// do not resolve to a known entity name (case-insensitive) are dropped
/// with a warning; a partial relationship set never fails the step.
/// Self-loops are kept.
pub async fn extract_relationships(
    client: &dyn ModelClient,
    text: &str,
    entities: &[Entity],
) -> Result<Vec<Relationship>, ExtractError> {
    let entities_json =
        serde_json::to_string(entities).expect("entity list serializes to JSON");
    let user_prompt = prompt::build_relationship_prompt(text, &entities_json);
    let raw: Vec<Relationship> =
        validate::call_validated(client, prompt::RELATIONSHIP_SYSTEM_PROMPT, &user_prompt).await?;

    let canonical: HashMap<String, &str> = entities
        .iter()
        .map(|entity| (normalize_name(&entity.name), entity.name.as_str()))
        .collect();

    let mut kept = Vec::with_capacity(raw.len());
    for mut relationship in raw {
        let source = canonical.get(&normalize_name(&relationship.source));
        let target = canonical.get(&normalize_name(&relationship.target));
        match (source, target) {
            (Some(&source), Some(&target)) => {
                // Rewrite endpoints to canonical display names so graph
                // keys match exactly.
                relationship.source = source.to_string();
                relationship.target = target.to_string();
                let relation_type = relationship.relation_type.trim();
                relationship.relation_type = if relation_type.is_empty() {
                    "related".to_string()
                } else {
                    relation_type.to_string()
                };
                kept.push(relationship);
            }
            _ => warn!(
                source = %relationship.source,
                target = %relationship.target,
                "dropping relationship referencing unknown entity"
            ),
        }
    }

    Ok(kept)
}
