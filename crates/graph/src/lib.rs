//! In-memory directed graph built from extracted entities and
//! relationships. Construction is pure and deterministic: node and edge
//! order follows input order, so two runs over the same lists render
//! identically.

use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::HashMap;
use tracing::debug;

use extract::{Entity, Relationship};

/// Node attributes: one node per entity, keyed by name.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeData {
    pub name: String,
    pub entity_type: String,
    pub importance: f64,
}

/// Edge attributes: one directed edge per relationship.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeData {
    pub relation_type: String,
    pub weight: f64,
}

pub struct EntityGraph {
    graph: DiGraph<NodeData, EdgeData>,
    index_of: HashMap<String, NodeIndex>,
}

impl EntityGraph {
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &NodeData> {
        self.graph.node_weights()
    }

    /// Edges in insertion order, as (source, target, attributes).
    pub fn edges(&self) -> impl Iterator<Item = (&NodeData, &NodeData, &EdgeData)> {
        self.graph.edge_indices().map(|idx| {
            let (source, target) = self
                .graph
                .edge_endpoints(idx)
                .expect("edge index from edge_indices is valid");
            (&self.graph[source], &self.graph[target], &self.graph[idx])
        })
    }

    pub fn node(&self, name: &str) -> Option<&NodeData> {
        self.index_of.get(name).map(|&idx| &self.graph[idx])
    }
}

/// Build the graph. Duplicate entity names collapse to one node with
/// last-write-wins attributes; relationships referencing unknown names are
/// skipped (the extractor already warned about them).
pub fn build_graph(entities: &[Entity], relationships: &[Relationship]) -> EntityGraph {
    let mut graph = DiGraph::new();
    let mut index_of: HashMap<String, NodeIndex> = HashMap::new();

    for entity in entities {
        let data = NodeData {
            name: entity.name.clone(),
            entity_type: entity.entity_type.clone(),
            importance: entity.importance,
        };
        match index_of.get(&entity.name) {
            Some(&idx) => graph[idx] = data,
            None => {
                let idx = graph.add_node(data);
                index_of.insert(entity.name.clone(), idx);
            }
        }
    }

    for relationship in relationships {
        let (Some(&source), Some(&target)) = (
            index_of.get(&relationship.source),
            index_of.get(&relationship.target),
        ) else {
            debug!(
                source = %relationship.source,
                target = %relationship.target,
                "skipping edge with unknown endpoint"
            );
            continue;
        };
        graph.add_edge(
            source,
            target,
            EdgeData {
                relation_type: relationship.relation_type.clone(),
                weight: relationship.weight,
            },
        );
    }

    EntityGraph { graph, index_of }
}
