//! Validated model calls: parse the response as a JSON array of records,
//! check every record against its schema, and on failure issue exactly one
//! corrective re-invocation before giving up. Bounding the retry at one
//! keeps latency and cost predictable.

use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::warn;

use crate::llm::{ModelClient, ProviderError};
use crate::prompt;
use crate::schema::RecordSchema;

#[derive(Debug, Error)]
pub enum ExtractError {
    /// Transport/provider failure, surfaced immediately without retry.
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// Output still failed JSON/schema validation after the corrective
    /// retry. Carries the original raw output for diagnostics.
    #[error("{kind} extraction produced invalid output after corrective retry: {reason}")]
    Invalid {
        kind: &'static str,
        reason: String,
        raw: String,
    },
}

/// Invoke the model and validate its output, with one corrective retry.
///
/// The first attempt uses `user_prompt` as-is. If its output fails to parse
/// or validate, the second (and last) attempt shows the model its own
/// malformed output together with the expected schema.
pub async fn call_validated<T>(
    client: &dyn ModelClient,
    system_prompt: &str,
    user_prompt: &str,
) -> Result<Vec<T>, ExtractError>
where
    T: DeserializeOwned + RecordSchema,
{
    let raw = client.complete(system_prompt, user_prompt).await?;

    let reason = match parse_records::<T>(&raw) {
        Ok(records) => return Ok(records),
        Err(reason) => reason,
    };

    warn!(
        kind = T::KIND,
        reason = %reason,
        "model output failed validation, issuing corrective retry"
    );

    let correction = prompt::build_correction_prompt(&raw, T::schema_hint());
    let corrected = client.complete(system_prompt, &correction).await?;

    match parse_records::<T>(&corrected) {
        Ok(records) => Ok(records),
        Err(reason) => Err(ExtractError::Invalid {
            kind: T::KIND,
            reason,
            raw,
        }),
    }
}

fn parse_records<T>(raw: &str) -> Result<Vec<T>, String>
where
    T: DeserializeOwned + RecordSchema,
{
    let cleaned = strip_code_fences(raw);
    let records: Vec<T> =
        serde_json::from_str(cleaned).map_err(|err| format!("invalid JSON: {err}"))?;
    for record in &records {
        record.check()?;
    }
    Ok(records)
}

/// Models often wrap JSON in a markdown code block despite instructions.
fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string ("json") up to the end of the opening line.
    let body = match rest.find('\n') {
        Some(pos) => &rest[pos + 1..],
        None => rest,
    };
    let body = body.trim_end();
    body.strip_suffix("```").unwrap_or(body).trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Entity;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StubClient {
        responses: Mutex<VecDeque<String>>,
        calls: AtomicUsize,
    }

    impl StubClient {
        fn new(responses: &[&str]) -> Self {
            Self {
                responses: Mutex::new(responses.iter().map(|s| s.to_string()).collect()),
                calls: AtomicUsize::new(0),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ModelClient for StubClient {
        async fn complete(&self, _system: &str, _user: &str) -> Result<String, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .ok_or(ProviderError::EmptyResponse)
        }
    }

    const VALID_ENTITIES: &str =
        r#"[{"name": "Google", "type": "organization", "importance": 0.9}]"#;

    #[tokio::test]
    async fn valid_first_attempt_makes_one_call() {
        let client = StubClient::new(&[VALID_ENTITIES]);
        let entities: Vec<Entity> = call_validated(&client, "sys", "user").await.unwrap();
        assert_eq!(entities.len(), 1);
        assert_eq!(client.call_count(), 1);
    }

    #[tokio::test]
    async fn malformed_then_valid_uses_exactly_one_retry() {
        let client = StubClient::new(&["this is not json", VALID_ENTITIES]);
        let entities: Vec<Entity> = call_validated(&client, "sys", "user").await.unwrap();
        assert_eq!(entities[0].name, "Google");
        assert_eq!(client.call_count(), 2);
    }

    #[tokio::test]
    async fn two_malformed_responses_fail_with_original_raw() {
        let client = StubClient::new(&["first garbage", "second garbage"]);
        let err = call_validated::<Entity>(&client, "sys", "user")
            .await
            .unwrap_err();
        match err {
            ExtractError::Invalid { raw, .. } => assert_eq!(raw, "first garbage"),
            other => panic!("expected Invalid, got {other:?}"),
        }
        assert_eq!(client.call_count(), 2);
    }

    #[tokio::test]
    async fn out_of_range_importance_triggers_corrective_retry() {
        let bad = r#"[{"name": "Google", "type": "organization", "importance": 2.0}]"#;
        let client = StubClient::new(&[bad, VALID_ENTITIES]);
        let entities: Vec<Entity> = call_validated(&client, "sys", "user").await.unwrap();
        assert_eq!(entities[0].importance, 0.9);
        assert_eq!(client.call_count(), 2);
    }

    #[tokio::test]
    async fn code_fenced_json_parses_on_first_attempt() {
        let fenced = format!("```json\n{VALID_ENTITIES}\n```");
        let client = StubClient::new(&[&fenced]);
        let entities: Vec<Entity> = call_validated(&client, "sys", "user").await.unwrap();
        assert_eq!(entities.len(), 1);
        assert_eq!(client.call_count(), 1);
    }

    #[tokio::test]
    async fn provider_error_is_not_retried() {
        let client = StubClient::new(&[]);
        let err = call_validated::<Entity>(&client, "sys", "user")
            .await
            .unwrap_err();
        assert!(matches!(err, ExtractError::Provider(_)));
        assert_eq!(client.call_count(), 1);
    }

    #[test]
    fn strip_code_fences_handles_plain_and_fenced_input() {
        assert_eq!(strip_code_fences("  [1]  "), "[1]");
        assert_eq!(strip_code_fences("```json\n[1]\n```"), "[1]");
        assert_eq!(strip_code_fences("```\n[1]\n```"), "[1]");
    }
}
