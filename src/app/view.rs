use std::collections::HashSet;
use std::time::Duration;

use eframe::egui::{
    self, Align2, Color32, CornerRadius, FontId, Pos2, Rect, Sense, Stroke, StrokeKind, Ui,
    epaint::QuadraticBezierShape, vec2,
};
use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;

use crate::contacts::NodeKind;
use crate::engine::{nearest_edge, InteractionEvent, LayoutMode, PressTarget, ANCHOR_RADIUS};

use super::ViewModel;

pub(super) const CARD_WIDTH: f32 = 96.0;
pub(super) const CARD_HEIGHT: f32 = 56.0;

fn fuzzy_match(matcher: &SkimMatcherV2, text: &str, query: &str) -> bool {
    matcher
        .fuzzy_match(text, query)
        .or_else(|| matcher.fuzzy_match(&text.to_ascii_lowercase(), &query.to_ascii_lowercase()))
        .is_some()
}

fn design_color(design: Option<&str>) -> Color32 {
    match design {
        Some("sakura") => Color32::from_rgb(120, 72, 92),
        Some("indigo") => Color32::from_rgb(62, 70, 116),
        Some("moss") => Color32::from_rgb(64, 96, 70),
        Some("amber") => Color32::from_rgb(122, 96, 52),
        Some("slate") => Color32::from_rgb(70, 80, 92),
        _ => Color32::from_rgb(58, 62, 70),
    }
}

fn dim(color: Color32, factor: f32) -> Color32 {
    Color32::from_rgb(
        (color.r() as f32 * factor) as u8,
        (color.g() as f32 * factor) as u8,
        (color.b() as f32 * factor) as u8,
    )
}

impl ViewModel {
    pub(super) fn draw_graph(&mut self, ui: &mut Ui) {
        if self.graph_dirty {
            self.rebuild_engine(true);
        }

        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        let painter = ui.painter_at(rect);
        painter.rect_filled(rect, 0.0, Color32::from_rgb(19, 23, 29));

        if !self.camera_centered {
            self.camera.translate = rect.center().to_vec2();
            self.camera_centered = true;
        }

        self.handle_zoom(ui, rect, &response);
        if response.dragged_by(egui::PointerButton::Secondary)
            || response.dragged_by(egui::PointerButton::Middle)
        {
            self.camera.pan_by(response.drag_delta());
        }

        self.engine.step();
        if !self.engine.is_settled() || self.interaction.is_dragging() {
            ui.ctx().request_repaint();
        } else if self.engine.mode() == LayoutMode::RadialPulse {
            ui.ctx().request_repaint_after(Duration::from_millis(33));
        }

        let curves = self.engine.edge_curves();
        let pointer = ui.input(|input| input.pointer.hover_pos());
        let hovered_node = pointer.and_then(|pos| self.hit_node(pos));

        if hovered_node.is_some() {
            ui.output_mut(|output| output.cursor_icon = egui::CursorIcon::PointingHand);
        }
        self.interaction
            .hover(hovered_node.as_deref(), &mut self.engine);

        let (time, primary_pressed, primary_down, primary_released) = ui.input(|input| {
            (
                input.time,
                input.pointer.primary_pressed(),
                input.pointer.primary_down(),
                input.pointer.primary_released(),
            )
        });

        if primary_pressed
            && response.hovered()
            && let Some(pos) = pointer
        {
            let target = if let Some(id) = hovered_node.clone() {
                PressTarget::Node(id)
            } else {
                let tolerance = 10.0 / self.camera.scale.max(0.1);
                match nearest_edge(&curves, self.camera.screen_to_graph(pos), tolerance) {
                    Some(index) => {
                        let edge = &self.engine.edges()[index];
                        PressTarget::Edge {
                            source_id: self.engine.nodes()[edge.source].id.clone(),
                            target_id: self.engine.nodes()[edge.target].id.clone(),
                        }
                    }
                    None => PressTarget::Background,
                }
            };
            self.interaction
                .pointer_down(pos, time, target, &mut self.engine);
        }

        if primary_down
            && let Some(pos) = pointer
        {
            self.interaction
                .pointer_move(pos, &self.camera, &mut self.engine);
        }

        if primary_released {
            let pos = pointer.unwrap_or_else(|| rect.center());
            match self.interaction.pointer_up(pos, time, &mut self.engine) {
                Some(InteractionEvent::NodeClicked(id)) => {
                    self.selected_edge = None;
                    self.selected_contact =
                        (self.engine.node_index(&id) != Some(self.engine.anchor_index()))
                            .then_some(id);
                }
                Some(InteractionEvent::EdgeSelected {
                    source_id,
                    target_id,
                }) => {
                    log::info!("edge selected: {source_id} <-> {target_id}");
                    self.selected_contact = None;
                    self.selected_edge = Some((source_id, target_id));
                }
                None => {}
            }
        }

        let search_matches = self.search_matches();
        self.paint_edges(&painter, &curves);
        self.paint_nodes(&painter, hovered_node.as_deref(), search_matches.as_ref());
    }

    fn handle_zoom(&mut self, ui: &Ui, rect: Rect, response: &egui::Response) {
        if !response.hovered() {
            return;
        }
        let scroll = ui.input(|input| input.raw_scroll_delta.y);
        if scroll.abs() <= f32::EPSILON {
            return;
        }
        let pointer = ui
            .input(|input| input.pointer.hover_pos())
            .unwrap_or_else(|| rect.center());
        let factor = (1.0 + (scroll * 0.0018)).clamp(0.85, 1.15);
        self.camera.zoom_about(pointer, factor);
    }

    fn hit_node(&self, pointer: Pos2) -> Option<String> {
        let mut best: Option<(&str, f32)> = None;
        for node in self.engine.nodes() {
            let center = self.camera.graph_to_screen(node.position);
            let inside = match node.kind {
                NodeKind::Anchor => {
                    (pointer - center).length() <= ANCHOR_RADIUS * self.camera.scale
                }
                NodeKind::Contact => Rect::from_center_size(
                    center,
                    vec2(CARD_WIDTH, CARD_HEIGHT) * self.camera.scale,
                )
                .contains(pointer),
            };
            if !inside {
                continue;
            }
            let distance = (pointer - center).length();
            if best.is_none_or(|(_, d)| distance < d) {
                best = Some((node.id.as_str(), distance));
            }
        }
        best.map(|(id, _)| id.to_owned())
    }

    fn search_matches(&self) -> Option<HashSet<usize>> {
        let query = self.search.trim();
        if query.is_empty() {
            return None;
        }
        let matcher = SkimMatcherV2::default();
        Some(
            self.engine
                .nodes()
                .iter()
                .enumerate()
                .filter(|(_, node)| fuzzy_match(&matcher, &node.label, query))
                .map(|(index, _)| index)
                .collect(),
        )
    }

    fn paint_edges(&self, painter: &egui::Painter, curves: &[crate::engine::EdgeCurve]) {
        let width_scale = self.camera.scale.sqrt();
        for (edge, curve) in self.engine.edges().iter().zip(curves) {
            if curve.is_degenerate() {
                continue;
            }
            let is_selected = self.selected_edge.as_ref().is_some_and(|(a, b)| {
                self.engine.nodes()[edge.source].id == *a
                    && self.engine.nodes()[edge.target].id == *b
            });

            let (width, color) = if is_selected {
                (
                    (3.2 * width_scale).clamp(1.8, 6.0),
                    Color32::from_rgb(245, 206, 93),
                )
            } else {
                let alpha = 120 + (edge.normalized_score * 110.0) as u8;
                (
                    ((1.0 + edge.normalized_score * 2.4) * width_scale).clamp(0.6, 5.0),
                    Color32::from_rgba_unmultiplied(140, 150, 165, alpha),
                )
            };

            painter.add(QuadraticBezierShape::from_points_stroke(
                [
                    self.camera.graph_to_screen(curve.start),
                    self.camera.graph_to_screen(curve.control),
                    self.camera.graph_to_screen(curve.end),
                ],
                false,
                Color32::TRANSPARENT,
                Stroke::new(width, color),
            ));
        }
    }

    fn paint_nodes(
        &self,
        painter: &egui::Painter,
        hovered: Option<&str>,
        search_matches: Option<&HashSet<usize>>,
    ) {
        let scale = self.camera.scale;
        let font = FontId::proportional((12.0 * scale).clamp(9.0, 20.0));

        for (index, node) in self.engine.nodes().iter().enumerate() {
            let center = self.camera.graph_to_screen(node.position);
            let is_hovered = hovered == Some(node.id.as_str());
            let is_selected = self.selected_contact.as_deref() == Some(node.id.as_str());
            let is_match = search_matches.is_some_and(|matches| matches.contains(&index));
            let dimmed = search_matches.is_some() && !is_match;

            match node.kind {
                NodeKind::Anchor => {
                    painter.circle_filled(
                        center,
                        ANCHOR_RADIUS * scale,
                        Color32::from_rgb(88, 101, 164),
                    );
                    painter.circle_stroke(
                        center,
                        ANCHOR_RADIUS * scale,
                        Stroke::new(1.6, Color32::from_gray(210)),
                    );
                    painter.text(
                        center,
                        Align2::CENTER_CENTER,
                        &node.label,
                        font.clone(),
                        Color32::from_gray(240),
                    );
                }
                NodeKind::Contact => {
                    let card = Rect::from_center_size(
                        center,
                        vec2(CARD_WIDTH, CARD_HEIGHT) * scale,
                    );
                    let mut fill = design_color(node.design.as_deref());
                    if dimmed {
                        fill = dim(fill, 0.45);
                    }
                    painter.rect_filled(card, CornerRadius::same(6), fill);

                    let stroke = if is_selected {
                        Stroke::new(2.2, Color32::from_rgb(245, 206, 93))
                    } else if is_hovered {
                        Stroke::new(2.0, Color32::from_rgb(255, 164, 101))
                    } else if is_match {
                        Stroke::new(1.8, Color32::from_rgb(103, 196, 255))
                    } else {
                        Stroke::new(1.0, Color32::from_rgba_unmultiplied(15, 15, 15, 190))
                    };
                    painter.rect_stroke(card, CornerRadius::same(6), stroke, StrokeKind::Outside);

                    let label_color = if dimmed {
                        Color32::from_gray(140)
                    } else {
                        Color32::from_gray(238)
                    };
                    painter.text(center, Align2::CENTER_CENTER, &node.label, font.clone(), label_color);

                    if node.is_favorite {
                        painter.text(
                            card.right_top() + vec2(-6.0 * scale, 4.0 * scale),
                            Align2::RIGHT_TOP,
                            "★",
                            FontId::proportional((11.0 * scale).clamp(8.0, 18.0)),
                            Color32::from_rgb(245, 206, 93),
                        );
                    }
                }
            }
        }
    }
}
