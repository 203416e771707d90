use eframe::egui::{Pos2, Vec2};

pub const MIN_SCALE: f32 = 0.25;
pub const MAX_SCALE: f32 = 4.0;

#[derive(Clone, Copy, Debug)]
pub struct Camera {
    pub scale: f32,
    pub translate: Vec2,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            scale: 1.0,
            translate: Vec2::ZERO,
        }
    }
}

impl Camera {
    pub fn graph_to_screen(&self, graph: Vec2) -> Pos2 {
        (graph * self.scale + self.translate).to_pos2()
    }

    pub fn screen_to_graph(&self, screen: Pos2) -> Vec2 {
        (screen.to_vec2() - self.translate) / self.scale
    }

    pub fn set_scale(&mut self, scale: f32) {
        self.scale = scale.clamp(MIN_SCALE, MAX_SCALE);
    }

    pub fn zoom_about(&mut self, pointer: Pos2, factor: f32) {
        let graph_before = self.screen_to_graph(pointer);
        self.set_scale(self.scale * factor);
        self.translate = pointer.to_vec2() - graph_before * self.scale;
    }

    pub fn pan_by(&mut self, delta: Vec2) {
        self.translate += delta;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eframe::egui::{pos2, vec2};

    #[test]
    fn drag_coordinate_inversion() {
        let camera = Camera {
            scale: 2.0,
            translate: vec2(10.0, 10.0),
        };
        assert_eq!(camera.screen_to_graph(pos2(110.0, 110.0)), vec2(50.0, 50.0));
    }

    #[test]
    fn transforms_round_trip() {
        let camera = Camera {
            scale: 1.7,
            translate: vec2(-40.0, 220.0),
        };
        let graph = vec2(123.0, -45.0);
        let back = camera.screen_to_graph(camera.graph_to_screen(graph));
        assert!((back - graph).length() < 1e-3);
    }

    #[test]
    fn scale_clamps_at_the_bounds() {
        let mut camera = Camera::default();
        camera.set_scale(100.0);
        assert_eq!(camera.scale, MAX_SCALE);
        camera.set_scale(0.0);
        assert_eq!(camera.scale, MIN_SCALE);
    }

    #[test]
    fn zoom_about_keeps_the_pointer_fixed() {
        let mut camera = Camera {
            scale: 1.0,
            translate: vec2(300.0, 200.0),
        };
        let pointer = pos2(500.0, 350.0);
        let graph_before = camera.screen_to_graph(pointer);
        camera.zoom_about(pointer, 1.5);
        let screen_after = camera.graph_to_screen(graph_before);
        assert!((screen_after - pointer).length() < 1e-3);
    }
}
