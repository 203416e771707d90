use eframe::egui::Pos2;

use super::{Camera, LayoutEngine};

const CLICK_MAX_SECS: f64 = 0.3;
const CLICK_MAX_TRAVEL: f32 = 10.0;

#[derive(Clone, Debug, PartialEq)]
pub enum PressTarget {
    Node(String),
    Edge {
        source_id: String,
        target_id: String,
    },
    Background,
}

#[derive(Clone, Debug, PartialEq)]
pub enum InteractionEvent {
    NodeClicked(String),
    EdgeSelected {
        source_id: String,
        target_id: String,
    },
}

struct Press {
    target: PressTarget,
    start_time: f64,
    travel: f32,
    last_pos: Pos2,
}

#[derive(Default)]
pub struct InteractionController {
    press: Option<Press>,
    hovered: Option<String>,
}

fn is_click(elapsed_secs: f64, travel: f32) -> bool {
    elapsed_secs < CLICK_MAX_SECS && travel < CLICK_MAX_TRAVEL
}

impl InteractionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hover(&mut self, node_id: Option<&str>, engine: &mut LayoutEngine) {
        if let Some(id) = node_id
            && self.hovered.as_deref() != Some(id)
            && !engine.drag_disabled()
        {
            engine.pin_node(id);
        }
        self.hovered = node_id.map(str::to_owned);
    }

    pub fn pointer_down(
        &mut self,
        pos: Pos2,
        time: f64,
        target: PressTarget,
        engine: &mut LayoutEngine,
    ) {
        if let PressTarget::Node(id) = &target
            && !engine.drag_disabled()
        {
            engine.pin_node(id);
        }
        self.press = Some(Press {
            target,
            start_time: time,
            travel: 0.0,
            last_pos: pos,
        });
    }

    pub fn pointer_move(&mut self, pos: Pos2, camera: &Camera, engine: &mut LayoutEngine) {
        let Some(press) = self.press.as_mut() else {
            return;
        };
        press.travel += (pos - press.last_pos).length();
        press.last_pos = pos;

        if let PressTarget::Node(id) = &press.target
            && !engine.drag_disabled()
        {
            engine.apply_drag(id, camera.screen_to_graph(pos));
        }
    }

    pub fn pointer_up(
        &mut self,
        pos: Pos2,
        time: f64,
        _engine: &mut LayoutEngine,
    ) -> Option<InteractionEvent> {
        let mut press = self.press.take()?;
        press.travel += (pos - press.last_pos).length();

        if !is_click(time - press.start_time, press.travel) {
            return None;
        }
        match press.target {
            PressTarget::Node(id) => Some(InteractionEvent::NodeClicked(id)),
            PressTarget::Edge {
                source_id,
                target_id,
            } => Some(InteractionEvent::EdgeSelected {
                source_id,
                target_id,
            }),
            PressTarget::Background => None,
        }
    }

    pub fn is_dragging(&self) -> bool {
        matches!(
            self.press,
            Some(Press {
                target: PressTarget::Node(_),
                ..
            })
        )
    }
}
