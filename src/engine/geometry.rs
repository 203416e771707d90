use eframe::egui::{Vec2, vec2};

const BASE_OFFSET: f32 = 12.0;
const RANK_STEP: f32 = 7.0;
const HIT_SAMPLES: usize = 16;

#[derive(Clone, Copy, Debug)]
pub struct EdgeCurve {
    pub start: Vec2,
    pub control: Vec2,
    pub end: Vec2,
}

impl EdgeCurve {
    pub fn is_degenerate(&self) -> bool {
        (self.end - self.start).length_sq() <= f32::EPSILON
    }

    pub fn point_at(&self, t: f32) -> Vec2 {
        let u = 1.0 - t;
        self.start * (u * u) + self.control * (2.0 * u * t) + self.end * (t * t)
    }
}

pub(super) fn curve(start: Option<Vec2>, end: Option<Vec2>, sort_rank: usize) -> EdgeCurve {
    let (start, end) = match (start, end) {
        (Some(start), Some(end)) => (start, end),
        (Some(point), None) | (None, Some(point)) => {
            return EdgeCurve {
                start: point,
                control: point,
                end: point,
            };
        }
        (None, None) => {
            return EdgeCurve {
                start: Vec2::ZERO,
                control: Vec2::ZERO,
                end: Vec2::ZERO,
            };
        }
    };

    let delta = end - start;
    let length = delta.length();
    let midpoint = start + delta * 0.5;
    if length <= 1e-4 {
        return EdgeCurve {
            start,
            control: midpoint,
            end,
        };
    }

    let perpendicular = vec2(-delta.y, delta.x) / length;
    let offset = BASE_OFFSET + sort_rank as f32 * RANK_STEP;
    EdgeCurve {
        start,
        control: midpoint + perpendicular * offset,
        end,
    }
}

pub fn nearest_edge(curves: &[EdgeCurve], point: Vec2, tolerance: f32) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (index, curve) in curves.iter().enumerate() {
        if curve.is_degenerate() {
            continue;
        }
        for sample in 0..=HIT_SAMPLES {
            let t = sample as f32 / HIT_SAMPLES as f32;
            let distance = (curve.point_at(t) - point).length();
            if distance <= tolerance && best.is_none_or(|(_, d)| distance < d) {
                best = Some((index, distance));
            }
        }
    }
    best.map(|(index, _)| index)
}
