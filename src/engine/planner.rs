use std::collections::HashMap;
use std::f32::consts::TAU;

use eframe::egui::{Vec2, vec2};

use crate::contacts::NodeKind;

use super::{rest_length, SimEdge, SimNode, MAX_RADIUS};

#[derive(Clone, Copy, Debug)]
pub struct RadialPlan {
    pub angle: f32,
    pub radius: f32,
}

pub(super) fn sort_ranks(raw_scores: &[f32]) -> Vec<usize> {
    let mut order = (0..raw_scores.len()).collect::<Vec<_>>();
    order.sort_by(|&a, &b| {
        raw_scores[b]
            .total_cmp(&raw_scores[a])
            .then(a.cmp(&b))
    });

    let mut ranks = vec![0; raw_scores.len()];
    for (rank, &edge_index) in order.iter().enumerate() {
        ranks[edge_index] = rank;
    }
    ranks
}

pub(super) fn plan_contacts(nodes: &mut [SimNode], anchor: usize, edges: &[SimEdge]) {
    let contact_count = nodes
        .iter()
        .filter(|node| node.kind == NodeKind::Contact)
        .count();
    if contact_count == 0 {
        return;
    }

    let slot_count = edges.len().max(contact_count);
    let mut slot_taken = vec![false; slot_count];
    let mut claim = |preferred: usize| -> usize {
        let mut slot = preferred % slot_count;
        while slot_taken[slot] {
            slot = (slot + 1) % slot_count;
        }
        slot_taken[slot] = true;
        slot
    };

    let mut by_rank = edges.iter().collect::<Vec<_>>();
    by_rank.sort_by_key(|edge| edge.sort_rank);

    for edge in by_rank {
        for endpoint in [edge.source, edge.target] {
            if endpoint == anchor || nodes[endpoint].plan.is_some() {
                continue;
            }
            let slot = claim(edge.sort_rank);
            nodes[endpoint].plan = Some(RadialPlan {
                angle: TAU * slot as f32 / slot_count as f32,
                radius: rest_length(edge.normalized_score),
            });
        }
    }

    for (index, node) in nodes.iter_mut().enumerate() {
        if index == anchor || node.kind != NodeKind::Contact || node.plan.is_some() {
            continue;
        }
        let slot = claim(0);
        node.plan = Some(RadialPlan {
            angle: TAU * slot as f32 / slot_count as f32,
            radius: MAX_RADIUS,
        });
    }
}

pub(super) fn seed_positions(
    nodes: &mut [SimNode],
    anchor: usize,
    center: Vec2,
    prior_positions: &HashMap<String, Vec2>,
) {
    for (index, node) in nodes.iter_mut().enumerate() {
        if index == anchor {
            node.position = center;
            continue;
        }
        if let Some(&prior) = prior_positions.get(&node.id) {
            node.position = prior;
            continue;
        }
        node.position = match node.plan {
            Some(plan) => center + vec2(plan.angle.cos(), plan.angle.sin()) * plan.radius,
            None => center + vec2(1.0, 0.0) * MAX_RADIUS,
        };
    }
}
