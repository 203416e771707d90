use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use super::{Contact, NodeKind, RelationGraph, ScoredEdge};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphPayload {
    #[serde(default)]
    pub nodes: Vec<PayloadNode>,
    #[serde(default)]
    pub edges: Vec<PayloadEdge>,
    #[serde(default)]
    pub max_score_hint: Option<f32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayloadNode {
    pub id: String,
    #[serde(default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub design: Option<String>,
    #[serde(default)]
    pub is_favorite: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayloadEdge {
    pub source_id: String,
    pub target_id: String,
    #[serde(default)]
    pub raw_score: Option<f32>,
}

pub fn load_contacts(path: &Path) -> Result<RelationGraph> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading contacts payload {}", path.display()))?;
    let payload: GraphPayload = serde_json::from_str(&text)
        .with_context(|| format!("parsing contacts payload {}", path.display()))?;
    build_graph(payload)
}

pub fn build_graph(payload: GraphPayload) -> Result<RelationGraph> {
    if let Some(hint) = payload.max_score_hint {
        log::debug!("payload hints max score {hint}; normalization stays subgraph-relative");
    }

    let mut nodes: HashMap<String, Contact> = HashMap::with_capacity(payload.nodes.len());
    let mut anchor_id = None;

    for node in payload.nodes {
        let kind = match node.kind.as_deref() {
            Some("anchor") => NodeKind::Anchor,
            _ => NodeKind::Contact,
        };
        if kind == NodeKind::Anchor {
            if anchor_id.is_some() {
                bail!("payload contains more than one anchor node");
            }
            anchor_id = Some(node.id.clone());
        }

        let label = node.label.unwrap_or_else(|| node.id.clone());
        if nodes
            .insert(
                node.id.clone(),
                Contact {
                    id: node.id.clone(),
                    kind,
                    label,
                    design: node.design,
                    is_favorite: node.is_favorite,
                },
            )
            .is_some()
        {
            log::warn!("duplicate node id {:?} in payload, keeping the last", node.id);
        }
    }

    let Some(anchor_id) = anchor_id else {
        bail!("payload contains no anchor node");
    };

    let mut edge_slots: HashMap<(String, String), usize> = HashMap::new();
    let mut edges: Vec<ScoredEdge> = Vec::with_capacity(payload.edges.len());
    for edge in payload.edges {
        if !nodes.contains_key(&edge.source_id) || !nodes.contains_key(&edge.target_id) {
            log::warn!(
                "dropping edge {} -> {}: endpoint not in node set",
                edge.source_id,
                edge.target_id
            );
            continue;
        }
        if edge.source_id == edge.target_id {
            log::warn!("dropping self-edge on {}", edge.source_id);
            continue;
        }

        let raw_score = edge.raw_score.unwrap_or(0.0).max(0.0);
        let key = (edge.source_id.clone(), edge.target_id.clone());
        match edge_slots.get(&key) {
            Some(&slot) => {
                edges[slot].raw_score = raw_score;
            }
            None => {
                edge_slots.insert(key, edges.len());
                edges.push(ScoredEdge {
                    source_id: edge.source_id,
                    target_id: edge.target_id,
                    raw_score,
                });
            }
        }
    }

    Ok(RelationGraph {
        nodes,
        edges,
        anchor_id,
    })
}

pub fn sample_graph() -> Result<RelationGraph> {
    let payload: GraphPayload = serde_json::from_str(include_str!("sample_contacts.json"))
        .context("parsing bundled sample payload")?;
    build_graph(payload)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(json: &str) -> GraphPayload {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn missing_raw_score_reads_as_zero() {
        let graph = build_graph(payload(
            r#"{
                "nodes": [{"id": "me", "kind": "anchor"}, {"id": "a"}],
                "edges": [{"sourceId": "me", "targetId": "a"}]
            }"#,
        ))
        .unwrap();
        assert_eq!(graph.edges.len(), 1);
        assert_eq!(graph.edges[0].raw_score, 0.0);
    }

    #[test]
    fn duplicate_edge_last_score_wins() {
        let graph = build_graph(payload(
            r#"{
                "nodes": [{"id": "me", "kind": "anchor"}, {"id": "a"}],
                "edges": [
                    {"sourceId": "me", "targetId": "a", "rawScore": 10},
                    {"sourceId": "me", "targetId": "a", "rawScore": 90}
                ]
            }"#,
        ))
        .unwrap();
        assert_eq!(graph.edges.len(), 1);
        assert_eq!(graph.edges[0].raw_score, 90.0);
    }

    #[test]
    fn malformed_edge_is_dropped_not_fatal() {
        let graph = build_graph(payload(
            r#"{
                "nodes": [{"id": "me", "kind": "anchor"}, {"id": "a"}],
                "edges": [
                    {"sourceId": "me", "targetId": "ghost", "rawScore": 5},
                    {"sourceId": "me", "targetId": "a", "rawScore": 5}
                ]
            }"#,
        ))
        .unwrap();
        assert_eq!(graph.edges.len(), 1);
        assert_eq!(graph.edges[0].target_id, "a");
    }

    #[test]
    fn zero_or_two_anchors_is_a_payload_error() {
        assert!(build_graph(payload(r#"{"nodes": [{"id": "a"}], "edges": []}"#)).is_err());
        assert!(build_graph(payload(
            r#"{"nodes": [
                {"id": "x", "kind": "anchor"},
                {"id": "y", "kind": "anchor"}
            ], "edges": []}"#,
        ))
        .is_err());
    }

    #[test]
    fn sample_graph_builds() {
        let graph = sample_graph().unwrap();
        assert!(graph.contact_count() >= 3);
        assert!(!graph.edges.is_empty());
    }
}
