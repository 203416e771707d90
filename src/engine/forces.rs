use eframe::egui::{Vec2, vec2};

use super::{LayoutMode, SimEdge, SimNode};

#[derive(Clone, Copy)]
pub(super) struct ForceParams {
    pub link_strength: f32,
    pub repulsion: f32,
    pub repulsion_softening: f32,
    pub radial_strength: f32,
    pub center_pull: f32,
    pub collision_passes: usize,
    pub velocity_retain: f32,
    pub max_speed: f32,
}

impl ForceParams {
    pub(super) fn for_mode(mode: LayoutMode) -> Self {
        match mode {
            LayoutMode::FullForce => Self {
                link_strength: 0.09,
                repulsion: 2_600.0,
                repulsion_softening: 620.0,
                radial_strength: 0.02,
                center_pull: 0.0012,
                collision_passes: 2,
                velocity_retain: 0.6,
                max_speed: 24.0,
            },
            LayoutMode::RadialPulse => Self {
                link_strength: 0.12,
                repulsion: 0.0,
                repulsion_softening: 620.0,
                radial_strength: 0.0,
                center_pull: 0.0012,
                collision_passes: 2,
                velocity_retain: 0.6,
                max_speed: 24.0,
            },
        }
    }
}

pub(super) fn apply_tick(
    nodes: &mut [SimNode],
    edges: &[SimEdge],
    anchor: usize,
    center: Vec2,
    alpha: f32,
    params: ForceParams,
    forces: &mut Vec<Vec2>,
) {
    let node_count = nodes.len();
    forces.resize(node_count, Vec2::ZERO);
    forces.fill(Vec2::ZERO);

    for edge in edges {
        if edge.source >= node_count || edge.target >= node_count {
            continue;
        }
        let delta = nodes[edge.source].position - nodes[edge.target].position;
        let distance = delta.length();
        if distance <= 1e-4 {
            continue;
        }
        let direction = delta / distance;
        let correction = direction * ((distance - edge.rest_length) * params.link_strength);
        forces[edge.source] -= correction;
        forces[edge.target] += correction;
    }

    if params.repulsion > 0.0 {
        for i in 0..node_count {
            if i == anchor {
                continue;
            }
            for j in (i + 1)..node_count {
                if j == anchor {
                    continue;
                }
                let delta = nodes[i].position - nodes[j].position;
                let distance_sq = delta.length_sq();
                let direction = stable_direction(delta, i, j);
                let push =
                    direction * (params.repulsion / (distance_sq + params.repulsion_softening));
                forces[i] += push;
                forces[j] -= push;
            }
        }
    }

    for (index, node) in nodes.iter().enumerate() {
        if index == anchor {
            continue;
        }
        if params.radial_strength > 0.0
            && let Some(plan) = node.plan
        {
            let target = center + vec2(plan.angle.cos(), plan.angle.sin()) * plan.radius;
            forces[index] += (target - node.position) * params.radial_strength;
        }
        forces[index] -= (node.position - center) * params.center_pull;
    }

    for (index, node) in nodes.iter_mut().enumerate() {
        if let Some(pin) = node.pinned {
            node.position = pin;
            node.velocity = Vec2::ZERO;
            continue;
        }

        let mut velocity = (node.velocity + forces[index] * alpha) * params.velocity_retain;
        let speed_sq = velocity.length_sq();
        if speed_sq > params.max_speed * params.max_speed {
            velocity *= params.max_speed / speed_sq.sqrt();
        }
        node.velocity = velocity;
        node.position += velocity;
    }

    separate_overlaps(nodes, params.collision_passes);
}

pub(super) fn separate_overlaps(nodes: &mut [SimNode], passes: usize) {
    let node_count = nodes.len();
    for _ in 0..passes {
        let mut any_overlap = false;
        for i in 0..node_count {
            for j in (i + 1)..node_count {
                let min_distance = nodes[i].radius + nodes[j].radius;
                let delta = nodes[i].position - nodes[j].position;
                let distance = delta.length();
                if distance >= min_distance {
                    continue;
                }
                any_overlap = true;

                let direction = stable_direction(delta, i, j);
                let push = min_distance - distance;
                match (nodes[i].pinned.is_some(), nodes[j].pinned.is_some()) {
                    (true, true) => {}
                    (true, false) => nodes[j].position -= direction * push,
                    (false, true) => nodes[i].position += direction * push,
                    (false, false) => {
                        nodes[i].position += direction * (push * 0.5);
                        nodes[j].position -= direction * (push * 0.5);
                    }
                }
            }
        }
        if !any_overlap {
            break;
        }
    }
}

fn stable_direction(delta: Vec2, i: usize, j: usize) -> Vec2 {
    let distance = delta.length();
    if distance > 1e-4 {
        delta / distance
    } else {
        let angle = ((i as f32) * 0.618_034 + (j as f32) * 0.414_214) * std::f32::consts::TAU;
        vec2(angle.cos(), angle.sin())
    }
}
