//! Prompt builders for the two extraction steps and the corrective retry.

pub const ENTITY_SYSTEM_PROMPT: &str = "You are an information extraction assistant. \
Extract entities from text. Return ONLY valid JSON. No prose.";

pub const RELATIONSHIP_SYSTEM_PROMPT: &str = "You are an assistant that maps relationships \
between known entities. Return ONLY valid JSON. No prose.";

pub fn build_entity_prompt(text: &str) -> String {
    format!(
        r#"Given the following text, list key entities as a JSON array of objects with
`name`, `type`, and `importance` (float 0-1). Use lowercase type labels
(e.g., "person", "organization"). Importance measures relevance to the text.

Text:
{text}

JSON array:"#
    )
}

pub fn build_relationship_prompt(text: &str, entities_json: &str) -> String {
    format!(
        r#"Using the provided original text and the list of entities, output a JSON array
of relationship objects. Each object must contain `source`, `target`,
`relation_type`, and `weight` (float 0-1). `source` and `target` must be names
from the entity list. Only include relationships explicitly supported by the text.

Text:
{text}

Entities:
{entities_json}

JSON array:"#
    )
}

/// The single corrective retry: show the model its own malformed output and
/// the expected shape.
pub fn build_correction_prompt(raw: &str, schema_hint: &str) -> String {
    format!(
        r#"Your previous response was not a valid JSON array matching the expected schema.

Previous response:
{raw}

Expected schema:
{schema_hint}

Respond with ONLY the corrected JSON array. No markdown, no code blocks, no commentary."#
    )
}
