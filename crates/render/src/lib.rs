//! Rendering of an [`EntityGraph`] into a single self-contained HTML file.
//!
//! The artifact embeds the graph data as JSON plus a small canvas force
//! simulation (drag, hover, pan/zoom), so opening it needs no network
//! access. Layout happens in the browser; this crate only applies the
//! visual encoding and fills the template.

pub mod encode;

pub use encode::{edge_width, node_size};

use askama::Template;
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

use graph::EntityGraph;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to render HTML template: {0}")]
    Template(#[from] askama::Error),
    #[error("failed to serialize graph data: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Serialize)]
struct VisNode {
    id: usize,
    label: String,
    title: String,
    size: f64,
}

#[derive(Serialize)]
struct VisLink {
    source: usize,
    target: usize,
    label: String,
    title: String,
    width: f64,
}

#[derive(Serialize)]
struct VisData {
    nodes: Vec<VisNode>,
    links: Vec<VisLink>,
}

#[derive(Template)]
#[template(path = "graph.html")]
struct GraphTemplate<'a> {
    title: &'a str,
    graph_json: &'a str,
}

/// Write the interactive artifact to `output_path` in a single write.
pub fn render_html(graph: &EntityGraph, output_path: &Path) -> Result<(), RenderError> {
    let data = encode_graph(graph);
    let graph_json = serde_json::to_string(&data)?;

    let html = GraphTemplate {
        title: "Entity relationship graph",
        graph_json: &graph_json,
    }
    .render()?;

    std::fs::write(output_path, html).map_err(|source| RenderError::Io {
        path: output_path.to_path_buf(),
        source,
    })?;

    debug!(
        nodes = data.nodes.len(),
        links = data.links.len(),
        path = %output_path.display(),
        "wrote graph artifact"
    );
    Ok(())
}

fn encode_graph(graph: &EntityGraph) -> VisData {
    let mut index_of: HashMap<&str, usize> = HashMap::new();
    let nodes: Vec<VisNode> = graph
        .nodes()
        .enumerate()
        .map(|(id, node)| {
            index_of.insert(node.name.as_str(), id);
            VisNode {
                id,
                label: node.name.clone(),
                title: format!("{} ({})", node.name, node.entity_type),
                size: encode::node_size(node.importance),
            }
        })
        .collect();

    let links = graph
        .edges()
        .map(|(source, target, edge)| VisLink {
            source: index_of[source.name.as_str()],
            target: index_of[target.name.as_str()],
            label: edge.relation_type.clone(),
            title: format!("{} ({:.2})", edge.relation_type, edge.weight),
            width: encode::edge_width(edge.weight),
        })
        .collect();

    VisData { nodes, links }
}
