//! Orchestration of the text-to-graph pipeline.
//!
//! Strictly sequential: entities, then relationships, then graph, then
//! artifact. Entering each stage emits one progress event. Any extraction
//! or render failure is terminal for the run and nothing is written.

use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

use extract::{ExtractError, ModelClient};
use render::RenderError;

/// Pipeline stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    ExtractingEntities,
    ExtractingRelationships,
    BuildingGraph,
    Rendering,
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::ExtractingEntities => "extracting entities",
            Stage::ExtractingRelationships => "extracting relationships",
            Stage::BuildingGraph => "building graph",
            Stage::Rendering => "rendering",
            Stage::Done => "done",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Extract(#[from] ExtractError),
    #[error(transparent)]
    Render(#[from] RenderError),
}

#[derive(Debug)]
pub struct RunSummary {
    pub entities: usize,
    pub relationships: usize,
    pub output_path: PathBuf,
}

pub struct Pipeline<'a> {
    client: &'a dyn ModelClient,
}

impl<'a> Pipeline<'a> {
    pub fn new(client: &'a dyn ModelClient) -> Self {
        Self { client }
    }

    pub async fn run(
        &self,
        text: &str,
        output_path: &Path,
    ) -> Result<RunSummary, PipelineError> {
        enter(Stage::ExtractingEntities);
        let entities = extract::extract_entities(self.client, text).await?;
        info!(count = entities.len(), "entities extracted");

        enter(Stage::ExtractingRelationships);
        let relationships =
            extract::extract_relationships(self.client, text, &entities).await?;
        info!(count = relationships.len(), "relationships extracted");

        enter(Stage::BuildingGraph);
        let entity_graph = graph::build_graph(&entities, &relationships);

        enter(Stage::Rendering);
        render::render_html(&entity_graph, output_path)?;

        enter(Stage::Done);
        info!(path = %output_path.display(), "graph artifact written");

        Ok(RunSummary {
            entities: entities.len(),
            relationships: relationships.len(),
            output_path: output_path.to_path_buf(),
        })
    }
}

fn enter(stage: Stage) {
    info!(stage = %stage, "pipeline stage");
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use extract::ProviderError;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    struct StubClient {
        responses: Mutex<VecDeque<String>>,
    }

    impl StubClient {
        fn new(responses: &[&str]) -> Self {
            Self {
                responses: Mutex::new(responses.iter().map(|s| s.to_string()).collect()),
            }
        }
    }

    #[async_trait]
    impl ModelClient for StubClient {
        async fn complete(&self, _system: &str, _user: &str) -> Result<String, ProviderError> {
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .ok_or(ProviderError::EmptyResponse)
        }
    }

    const INPUT: &str = "In 2014, Google acquired DeepMind, a British AI company, \
to advance its artificial intelligence research.";

    const ENTITIES: &str = r#"[
        {"name": "Google", "type": "organization", "importance": 0.9},
        {"name": "DeepMind", "type": "organization", "importance": 0.8}
    ]"#;

    const RELATIONSHIPS: &str = r#"[
        {"source": "Google", "target": "DeepMind", "relation_type": "acquired", "weight": 0.9}
    ]"#;

    #[tokio::test]
    async fn end_to_end_run_writes_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("graph.html");

        let client = StubClient::new(&[ENTITIES, RELATIONSHIPS]);
        let summary = Pipeline::new(&client).run(INPUT, &path).await.unwrap();

        assert_eq!(summary.entities, 2);
        assert_eq!(summary.relationships, 1);
        assert!(path.exists());

        let html = std::fs::read_to_string(&path).unwrap();
        assert!(html.contains("Google"));
        assert!(html.contains("DeepMind"));
        assert!(html.contains("acquired"));
    }

    #[tokio::test]
    async fn malformed_first_response_recovers_via_corrective_retry() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("graph.html");

        let client = StubClient::new(&["not json at all", ENTITIES, RELATIONSHIPS]);
        let summary = Pipeline::new(&client).run(INPUT, &path).await.unwrap();

        assert_eq!(summary.entities, 2);
        assert!(path.exists());
    }

    #[tokio::test]
    async fn unrecovered_extraction_failure_leaves_no_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("graph.html");

        let client = StubClient::new(&["garbage", "still garbage"]);
        let err = Pipeline::new(&client).run(INPUT, &path).await.unwrap_err();

        assert!(matches!(
            err,
            PipelineError::Extract(ExtractError::Invalid { .. })
        ));
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn dropped_relationship_does_not_fail_the_run() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("graph.html");

        let relationships = r#"[
            {"source": "Google", "target": "DeepMind", "relation_type": "acquired", "weight": 0.9},
            {"source": "Google", "target": "Unknown Corp", "relation_type": "owns", "weight": 0.5}
        ]"#;
        let client = StubClient::new(&[ENTITIES, relationships]);
        let summary = Pipeline::new(&client).run(INPUT, &path).await.unwrap();

        assert_eq!(summary.relationships, 1);
        assert!(path.exists());
    }
}
