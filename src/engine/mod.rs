mod camera;
mod forces;
mod geometry;
mod interaction;
mod planner;
mod score;
mod stabilize;

use std::collections::HashMap;

use eframe::egui::Vec2;

pub use camera::{Camera, MAX_SCALE, MIN_SCALE};
pub use geometry::{nearest_edge, EdgeCurve};
pub use interaction::{InteractionController, InteractionEvent, PressTarget};
pub use planner::RadialPlan;
pub use score::normalize_scores;

use crate::contacts::{NodeKind, VisibleGraph};
use forces::ForceParams;
use stabilize::{Stabilizer, Verdict};

pub const MIN_RADIUS: f32 = 100.0;
pub const MAX_RADIUS: f32 = 300.0;
pub const ANCHOR_RADIUS: f32 = 36.0;
// Half the diagonal of the card footprint.
pub const CONTACT_RADIUS: f32 = 55.6;

pub const TICK_BUDGET: u32 = 300;

const ALPHA_START: f32 = 1.0;
const ALPHA_RETAIN: f32 = 0.977;
const ALPHA_MIN: f32 = 0.001;
const CONVERGING_ALPHA: f32 = 0.05;

pub fn rest_length(normalized_score: f32) -> f32 {
    MIN_RADIUS + (1.0 - normalized_score) * (MAX_RADIUS - MIN_RADIUS)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LifecycleState {
    Seeded,
    Running,
    Converging,
    Locked,
}

impl LifecycleState {
    pub fn label(self) -> &'static str {
        match self {
            LifecycleState::Seeded => "seeded",
            LifecycleState::Running => "running",
            LifecycleState::Converging => "converging",
            LifecycleState::Locked => "locked",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LayoutMode {
    FullForce,
    RadialPulse,
}

#[derive(Clone, Copy, Debug)]
pub struct LayoutConfig {
    pub mode: LayoutMode,
    pub center: Vec2,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            mode: LayoutMode::FullForce,
            center: Vec2::ZERO,
        }
    }
}

pub struct SimNode {
    pub id: String,
    pub kind: NodeKind,
    pub label: String,
    pub is_favorite: bool,
    pub design: Option<String>,
    pub position: Vec2,
    pub velocity: Vec2,
    pub pinned: Option<Vec2>,
    // Set by the lock transition, not the user; only these pins are
    // released by a pulse re-heat.
    pub auto_pinned: bool,
    pub radius: f32,
    pub plan: Option<RadialPlan>,
}

pub struct SimEdge {
    pub source: usize,
    pub target: usize,
    pub raw_score: f32,
    pub normalized_score: f32,
    pub sort_rank: usize,
    pub rest_length: f32,
}

pub struct LayoutEngine {
    nodes: Vec<SimNode>,
    edges: Vec<SimEdge>,
    index_by_id: HashMap<String, usize>,
    anchor: usize,
    state: LifecycleState,
    ticks: u32,
    alpha: f32,
    config: LayoutConfig,
    params: Option<ForceParams>,
    stabilizer: Stabilizer,
    halted: bool,
    force_scratch: Vec<Vec2>,
}

impl LayoutEngine {
    pub fn new(
        view: VisibleGraph,
        prior_positions: &HashMap<String, Vec2>,
        config: LayoutConfig,
    ) -> Self {
        let mut nodes = view
            .contacts
            .into_iter()
            .map(|contact| {
                let radius = match contact.kind {
                    NodeKind::Anchor => ANCHOR_RADIUS,
                    NodeKind::Contact => CONTACT_RADIUS,
                };
                SimNode {
                    id: contact.id,
                    kind: contact.kind,
                    label: contact.label,
                    is_favorite: contact.is_favorite,
                    design: contact.design,
                    position: config.center,
                    velocity: Vec2::ZERO,
                    pinned: None,
                    auto_pinned: false,
                    radius,
                    plan: None,
                }
            })
            .collect::<Vec<_>>();

        let anchor = match nodes.iter().position(|node| node.kind == NodeKind::Anchor) {
            Some(index) => index,
            None => {
                log::warn!("visible graph has no anchor node, inserting one");
                nodes.push(SimNode {
                    id: "anchor".to_owned(),
                    kind: NodeKind::Anchor,
                    label: String::new(),
                    is_favorite: false,
                    design: None,
                    position: config.center,
                    velocity: Vec2::ZERO,
                    pinned: None,
                    auto_pinned: false,
                    radius: ANCHOR_RADIUS,
                    plan: None,
                });
                nodes.len() - 1
            }
        };
        nodes[anchor].pinned = Some(config.center);

        let index_by_id = nodes
            .iter()
            .enumerate()
            .map(|(index, node)| (node.id.clone(), index))
            .collect::<HashMap<_, _>>();

        let mut resolved = Vec::with_capacity(view.edges.len());
        for edge in &view.edges {
            let (Some(&source), Some(&target)) = (
                index_by_id.get(&edge.source_id),
                index_by_id.get(&edge.target_id),
            ) else {
                log::warn!(
                    "dropping edge {} -> {}: stale endpoint",
                    edge.source_id,
                    edge.target_id
                );
                continue;
            };
            resolved.push((source, target, edge.raw_score));
        }

        let raw_scores = resolved.iter().map(|&(_, _, raw)| raw).collect::<Vec<_>>();
        let normalized = score::normalize_scores(&raw_scores);
        let ranks = planner::sort_ranks(&raw_scores);

        let edges = resolved
            .iter()
            .zip(normalized.iter().zip(ranks.iter()))
            .map(|(&(source, target, raw_score), (&normalized_score, &sort_rank))| SimEdge {
                source,
                target,
                raw_score,
                normalized_score,
                sort_rank,
                rest_length: rest_length(normalized_score),
            })
            .collect::<Vec<_>>();

        planner::plan_contacts(&mut nodes, anchor, &edges);
        planner::seed_positions(&mut nodes, anchor, config.center, prior_positions);

        let mut engine = Self {
            nodes,
            edges,
            index_by_id,
            anchor,
            state: LifecycleState::Seeded,
            ticks: 0,
            alpha: ALPHA_START,
            config,
            params: Some(ForceParams::for_mode(config.mode)),
            stabilizer: Stabilizer::new(config.mode),
            halted: false,
            force_scratch: Vec::new(),
        };

        if engine.nodes.len() == 1 {
            engine.lock();
        }
        engine
    }

    pub fn step(&mut self) -> LifecycleState {
        if self.halted {
            return self.state;
        }

        match self.state {
            LifecycleState::Locked => {
                if let Some(pulse_alpha) = self.stabilizer.after_lock_step() {
                    self.reheat(pulse_alpha);
                }
                self.state
            }
            LifecycleState::Seeded => {
                self.state = LifecycleState::Running;
                self.tick()
            }
            LifecycleState::Running | LifecycleState::Converging => self.tick(),
        }
    }

    fn tick(&mut self) -> LifecycleState {
        if let Some(params) = self.params {
            forces::apply_tick(
                &mut self.nodes,
                &self.edges,
                self.anchor,
                self.config.center,
                self.alpha,
                params,
                &mut self.force_scratch,
            );
        }

        self.ticks += 1;
        self.alpha *= ALPHA_RETAIN;

        match self.stabilizer.evaluate(
            self.state,
            self.alpha,
            self.ticks,
            CONVERGING_ALPHA,
            ALPHA_MIN,
            TICK_BUDGET,
        ) {
            Verdict::Continue => {}
            Verdict::Converging => self.state = LifecycleState::Converging,
            Verdict::Lock => self.lock(),
        }
        self.state
    }

    fn lock(&mut self) {
        if self.state == LifecycleState::Locked {
            return;
        }

        forces::separate_overlaps(&mut self.nodes, 32);

        for node in &mut self.nodes {
            node.velocity = Vec2::ZERO;
            if node.kind == NodeKind::Contact && node.pinned.is_none() {
                node.pinned = Some(node.position);
                node.auto_pinned = true;
            }
        }

        self.params = None;
        self.state = LifecycleState::Locked;
        self.stabilizer.mark_locked();
        log::debug!(
            "layout locked after {} ticks (alpha {:.4})",
            self.ticks,
            self.alpha
        );
    }

    fn reheat(&mut self, pulse_alpha: f32) {
        for node in &mut self.nodes {
            if node.auto_pinned {
                node.pinned = None;
                node.auto_pinned = false;
            }
        }
        self.alpha = pulse_alpha;
        self.ticks = 0;
        self.params = Some(ForceParams::for_mode(self.config.mode));
        self.state = LifecycleState::Running;
        log::debug!("pulse re-heat at alpha {pulse_alpha:.2}");
    }

    pub fn shutdown(&mut self) {
        self.halted = true;
        self.params = None;
    }

    pub fn pin_node(&mut self, id: &str) {
        let Some(&index) = self.index_by_id.get(id) else {
            return;
        };
        if index == self.anchor {
            return;
        }
        let node = &mut self.nodes[index];
        node.pinned = Some(node.position);
        node.auto_pinned = false;
        node.velocity = Vec2::ZERO;
    }

    pub fn apply_drag(&mut self, id: &str, graph_point: Vec2) {
        let Some(&index) = self.index_by_id.get(id) else {
            return;
        };
        if index == self.anchor {
            return;
        }
        let node = &mut self.nodes[index];
        node.pinned = Some(graph_point);
        node.auto_pinned = false;
        node.position = graph_point;
        node.velocity = Vec2::ZERO;
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn mode(&self) -> LayoutMode {
        self.config.mode
    }

    pub fn ticks(&self) -> u32 {
        self.ticks
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    pub fn drag_disabled(&self) -> bool {
        self.stabilizer.drag_disabled()
    }

    pub fn is_settled(&self) -> bool {
        self.state == LifecycleState::Locked
    }

    pub fn nodes(&self) -> &[SimNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[SimEdge] {
        &self.edges
    }

    pub fn anchor_index(&self) -> usize {
        self.anchor
    }

    pub fn node_index(&self, id: &str) -> Option<usize> {
        self.index_by_id.get(id).copied()
    }

    pub fn position_map(&self) -> HashMap<String, Vec2> {
        self.nodes
            .iter()
            .map(|node| (node.id.clone(), node.position))
            .collect()
    }

    pub fn edge_curves(&self) -> Vec<EdgeCurve> {
        self.edges
            .iter()
            .map(|edge| {
                geometry::curve(
                    self.nodes.get(edge.source).map(|node| node.position),
                    self.nodes.get(edge.target).map(|node| node.position),
                    edge.sort_rank,
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contacts::{Contact, ScoredEdge};

    fn contact(id: &str) -> Contact {
        Contact {
            id: id.to_owned(),
            kind: NodeKind::Contact,
            label: id.to_owned(),
            design: None,
            is_favorite: false,
        }
    }

    fn star(scores: &[f32]) -> VisibleGraph {
        let mut contacts = vec![Contact {
            id: "me".to_owned(),
            kind: NodeKind::Anchor,
            label: "me".to_owned(),
            design: None,
            is_favorite: false,
        }];
        let mut edges = Vec::new();
        for (index, &score) in scores.iter().enumerate() {
            let id = format!("c{index}");
            contacts.push(contact(&id));
            edges.push(ScoredEdge {
                source_id: "me".to_owned(),
                target_id: id,
                raw_score: score,
            });
        }
        VisibleGraph { contacts, edges }
    }

    fn run_to_lock(engine: &mut LayoutEngine) {
        for _ in 0..TICK_BUDGET {
            if engine.step() == LifecycleState::Locked {
                return;
            }
        }
        panic!("engine did not lock within the tick budget");
    }

    #[test]
    fn engine_locks_within_tick_budget() {
        let mut engine = LayoutEngine::new(
            star(&[50.0, 75.0, 100.0]),
            &HashMap::new(),
            LayoutConfig::default(),
        );
        for _ in 0..TICK_BUDGET {
            engine.step();
        }
        assert_eq!(engine.state(), LifecycleState::Locked);
    }

    #[test]
    fn rest_lengths_track_intimacy() {
        let mut engine = LayoutEngine::new(
            star(&[50.0, 75.0, 100.0]),
            &HashMap::new(),
            LayoutConfig::default(),
        );
        run_to_lock(&mut engine);

        let anchor_pos = engine.nodes()[engine.anchor_index()].position;
        let expected = [300.0_f32, 200.0, 100.0];
        for (edge, expected) in engine.edges().iter().zip(expected) {
            assert_eq!(edge.rest_length, expected);
            let contact_pos = engine.nodes()[edge.target].position;
            let distance = (contact_pos - anchor_pos).length();
            assert!(
                (distance - expected).abs() < 15.0,
                "distance {distance} should be near {expected}"
            );
        }
    }

    #[test]
    fn post_lock_steps_never_move_nodes() {
        let mut engine = LayoutEngine::new(
            star(&[10.0, 20.0, 30.0, 40.0]),
            &HashMap::new(),
            LayoutConfig::default(),
        );
        run_to_lock(&mut engine);

        let before = engine.position_map();
        for _ in 0..50 {
            engine.step();
        }
        for (id, position) in engine.position_map() {
            assert_eq!(position, before[&id], "node {id} moved after lock");
        }
    }

    #[test]
    fn no_contact_overlap_at_lock() {
        // Equal scores put every contact on the same ring.
        let mut engine = LayoutEngine::new(
            star(&[60.0; 8]),
            &HashMap::new(),
            LayoutConfig::default(),
        );
        run_to_lock(&mut engine);

        let nodes = engine.nodes();
        for i in 0..nodes.len() {
            for j in (i + 1)..nodes.len() {
                if nodes[i].kind != NodeKind::Contact || nodes[j].kind != NodeKind::Contact {
                    continue;
                }
                let distance = (nodes[i].position - nodes[j].position).length();
                let min_distance = nodes[i].radius + nodes[j].radius;
                assert!(
                    distance >= min_distance - 0.5,
                    "contacts {i} and {j} overlap: {distance} < {min_distance}"
                );
            }
        }
    }

    #[test]
    fn empty_graph_is_immediately_locked() {
        let view = VisibleGraph {
            contacts: vec![Contact {
                id: "me".to_owned(),
                kind: NodeKind::Anchor,
                label: "me".to_owned(),
                design: None,
                is_favorite: false,
            }],
            edges: Vec::new(),
        };
        let engine = LayoutEngine::new(view, &HashMap::new(), LayoutConfig::default());
        assert_eq!(engine.state(), LifecycleState::Locked);
        assert_eq!(engine.nodes()[0].position, Vec2::ZERO);
    }

    #[test]
    fn drag_moves_only_the_dragged_node() {
        let mut engine = LayoutEngine::new(
            star(&[50.0, 75.0, 100.0]),
            &HashMap::new(),
            LayoutConfig::default(),
        );
        run_to_lock(&mut engine);

        let before = engine.position_map();
        engine.apply_drag("c0", Vec2::new(480.0, -310.0));
        engine.step();

        let after = engine.position_map();
        assert_eq!(after["c0"], Vec2::new(480.0, -310.0));
        for (id, position) in &after {
            if id != "c0" {
                assert_eq!(*position, before[id]);
            }
        }
    }

    #[test]
    fn anchor_is_never_draggable() {
        let mut engine = LayoutEngine::new(
            star(&[50.0]),
            &HashMap::new(),
            LayoutConfig::default(),
        );
        engine.apply_drag("me", Vec2::new(900.0, 900.0));
        assert_eq!(engine.nodes()[engine.anchor_index()].position, Vec2::ZERO);
    }

    #[test]
    fn full_force_stays_locked_but_pulse_mode_reheats() {
        let mut full = LayoutEngine::new(
            star(&[50.0, 80.0]),
            &HashMap::new(),
            LayoutConfig::default(),
        );
        run_to_lock(&mut full);
        for _ in 0..2_000 {
            assert_eq!(full.step(), LifecycleState::Locked);
        }

        let mut pulse = LayoutEngine::new(
            star(&[50.0, 80.0]),
            &HashMap::new(),
            LayoutConfig {
                mode: LayoutMode::RadialPulse,
                center: Vec2::ZERO,
            },
        );
        run_to_lock(&mut pulse);
        let reheated = (0..2_000).any(|_| pulse.step() == LifecycleState::Running);
        assert!(reheated, "pulse mode never re-heated");
    }

    #[test]
    fn shutdown_makes_stale_steps_no_ops() {
        let mut engine = LayoutEngine::new(
            star(&[50.0, 75.0]),
            &HashMap::new(),
            LayoutConfig::default(),
        );
        engine.step();
        let state = engine.state();
        let before = engine.position_map();
        engine.shutdown();
        for _ in 0..10 {
            assert_eq!(engine.step(), state);
        }
        for (id, position) in engine.position_map() {
            assert_eq!(position, before[&id]);
        }
    }

    #[test]
    fn filter_rebuild_preserves_prior_positions() {
        let mut engine = LayoutEngine::new(
            star(&[50.0, 75.0, 100.0]),
            &HashMap::new(),
            LayoutConfig::default(),
        );
        run_to_lock(&mut engine);
        let prior = engine.position_map();

        let mut view = star(&[50.0, 75.0, 100.0]);
        view.contacts.retain(|contact| contact.id != "c1");
        view.edges.retain(|edge| edge.target_id != "c1");
        engine.shutdown();
        let rebuilt = LayoutEngine::new(view, &prior, LayoutConfig::default());
        for node in rebuilt.nodes() {
            assert_eq!(node.position, prior[&node.id]);
        }
    }
}
