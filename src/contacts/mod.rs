mod payload;

use std::collections::HashMap;

pub use payload::{build_graph, load_contacts, sample_graph, GraphPayload, PayloadEdge, PayloadNode};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeKind {
    Anchor,
    Contact,
}

#[derive(Clone, Debug)]
pub struct Contact {
    pub id: String,
    pub kind: NodeKind,
    pub label: String,
    pub design: Option<String>,
    pub is_favorite: bool,
}

#[derive(Clone, Debug)]
pub struct ScoredEdge {
    pub source_id: String,
    pub target_id: String,
    pub raw_score: f32,
}

pub struct RelationGraph {
    pub nodes: HashMap<String, Contact>,
    pub edges: Vec<ScoredEdge>,
    pub anchor_id: String,
}

#[derive(Clone, Debug, Default)]
pub struct VisibleGraph {
    pub contacts: Vec<Contact>,
    pub edges: Vec<ScoredEdge>,
}

impl RelationGraph {
    pub fn contact_count(&self) -> usize {
        self.nodes
            .values()
            .filter(|node| node.kind == NodeKind::Contact)
            .count()
    }

    pub fn view(&self, favorites_only: bool) -> VisibleGraph {
        let mut contacts = self
            .nodes
            .values()
            .filter(|node| node.id == self.anchor_id || !favorites_only || node.is_favorite)
            .cloned()
            .collect::<Vec<_>>();
        contacts.sort_by(|a, b| a.id.cmp(&b.id));

        let visible_ids = contacts
            .iter()
            .map(|contact| contact.id.as_str())
            .collect::<std::collections::HashSet<_>>();

        let edges = self
            .edges
            .iter()
            .filter(|edge| {
                visible_ids.contains(edge.source_id.as_str())
                    && visible_ids.contains(edge.target_id.as_str())
            })
            .cloned()
            .collect();

        VisibleGraph { contacts, edges }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph_with_favorites() -> RelationGraph {
        let payload: GraphPayload = serde_json::from_str(
            r#"{
                "nodes": [
                    {"id": "me", "kind": "anchor"},
                    {"id": "a", "label": "Aoi", "isFavorite": true},
                    {"id": "b", "label": "Ben", "isFavorite": false}
                ],
                "edges": [
                    {"sourceId": "me", "targetId": "a", "rawScore": 80},
                    {"sourceId": "me", "targetId": "b", "rawScore": 40}
                ]
            }"#,
        )
        .unwrap();
        build_graph(payload).unwrap()
    }

    #[test]
    fn favorites_view_drops_non_favorites_and_their_edges() {
        let graph = graph_with_favorites();
        let view = graph.view(true);
        assert_eq!(view.contacts.len(), 2);
        assert_eq!(view.edges.len(), 1);
        assert_eq!(view.edges[0].target_id, "a");
    }

    #[test]
    fn full_view_keeps_everything() {
        let graph = graph_with_favorites();
        let view = graph.view(false);
        assert_eq!(view.contacts.len(), 3);
        assert_eq!(view.edges.len(), 2);
    }
}
