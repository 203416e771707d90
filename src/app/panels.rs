use eframe::egui::{self, Ui};

use crate::engine::LayoutMode;

use super::ViewModel;

impl ViewModel {
    pub(super) fn side_panel(&mut self, ui: &mut Ui, can_reload: bool, reload_requested: &mut bool) {
        ui.add_space(6.0);
        ui.heading("meishi-map");
        ui.add_space(8.0);

        if can_reload && ui.button("Reload payload").clicked() {
            *reload_requested = true;
        }
        if ui.button("Reset layout").clicked() {
            self.rebuild_engine(false);
        }

        ui.add_space(8.0);
        ui.separator();

        let mut mode = self.mode;
        egui::ComboBox::from_label("Layout")
            .selected_text(match mode {
                LayoutMode::FullForce => "full force",
                LayoutMode::RadialPulse => "radial pulse",
            })
            .show_ui(ui, |ui| {
                ui.selectable_value(&mut mode, LayoutMode::FullForce, "full force");
                ui.selectable_value(&mut mode, LayoutMode::RadialPulse, "radial pulse");
            });
        if mode != self.mode {
            self.mode = mode;
            self.graph_dirty = true;
        }

        if ui
            .checkbox(&mut self.favorites_only, "Favorites only")
            .changed()
        {
            self.graph_dirty = true;
        }

        ui.add_space(4.0);
        ui.label("Search");
        ui.text_edit_singleline(&mut self.search);

        ui.add_space(8.0);
        ui.separator();
        ui.label(format!(
            "{} contacts, {} edges visible",
            self.engine.nodes().len().saturating_sub(1),
            self.engine.edges().len()
        ));
        ui.label(format!(
            "state: {}  tick {}  alpha {:.3}",
            self.engine.state().label(),
            self.engine.ticks(),
            self.engine.alpha()
        ));
        if self.engine.drag_disabled() {
            ui.label("layout frozen (drag disabled)");
        }
        ui.label(format!("{} contacts total", self.graph.contact_count()));

        ui.add_space(8.0);
        ui.separator();
        self.selection_details(ui);
    }

    fn selection_details(&mut self, ui: &mut Ui) {
        if let Some((source_id, target_id)) = self.selected_edge.clone() {
            ui.strong("Selected relationship");
            let source_label = self
                .graph
                .nodes
                .get(&source_id)
                .map_or(source_id.as_str(), |node| node.label.as_str());
            let target_label = self
                .graph
                .nodes
                .get(&target_id)
                .map_or(target_id.as_str(), |node| node.label.as_str());
            ui.label(format!("{source_label} - {target_label}"));

            let edge = self.engine.edges().iter().find(|edge| {
                self.engine.nodes()[edge.source].id == source_id
                    && self.engine.nodes()[edge.target].id == target_id
            });
            if let Some(edge) = edge {
                ui.label(format!(
                    "intimacy {:.0} (normalized {:.2}), rest length {:.0}",
                    edge.raw_score, edge.normalized_score, edge.rest_length
                ));
            }
            if ui.button("Clear selection").clicked() {
                self.selected_edge = None;
            }
            return;
        }

        if let Some(contact_id) = self.selected_contact.clone() {
            ui.strong("Selected contact");
            if let Some(contact) = self.graph.nodes.get(&contact_id) {
                ui.label(contact.label.as_str());
                if let Some(design) = &contact.design {
                    ui.label(format!("card design: {design}"));
                }
                if contact.is_favorite {
                    ui.label("★ favorite");
                }
            }
            if ui.button("Clear selection").clicked() {
                self.selected_contact = None;
            }
            return;
        }

        ui.weak("Click a card or an edge to inspect it.");
    }
}
