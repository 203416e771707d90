use std::path::{Path, PathBuf};

use eframe::egui::{self, Context};

use crate::contacts::{load_contacts, sample_graph, RelationGraph};
use crate::engine::{Camera, InteractionController, LayoutConfig, LayoutEngine, LayoutMode};

mod panels;
mod view;

pub struct MeishiMapApp {
    contacts_path: Option<PathBuf>,
    state: AppState,
}

enum AppState {
    Ready(Box<ViewModel>),
    Error(String),
}

struct ViewModel {
    graph: RelationGraph,
    favorites_only: bool,
    mode: LayoutMode,
    search: String,
    selected_contact: Option<String>,
    selected_edge: Option<(String, String)>,
    camera: Camera,
    camera_centered: bool,
    engine: LayoutEngine,
    interaction: InteractionController,
    graph_dirty: bool,
}

impl MeishiMapApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, contacts_path: Option<PathBuf>) -> Self {
        let state = Self::load(contacts_path.as_deref());
        Self {
            contacts_path,
            state,
        }
    }

    fn load(contacts_path: Option<&Path>) -> AppState {
        match contacts_path {
            Some(path) => match load_contacts(path) {
                Ok(graph) => AppState::Ready(Box::new(ViewModel::new(graph))),
                Err(error) => AppState::Error(format!("{error:#}")),
            },
            None => match sample_graph() {
                Ok(graph) => AppState::Ready(Box::new(ViewModel::new(graph))),
                Err(error) => AppState::Error(format!("{error:#}")),
            },
        }
    }
}

impl eframe::App for MeishiMapApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let mut reload_requested = false;

        match &mut self.state {
            AppState::Error(error) => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.heading("Failed to load contacts payload");
                    ui.add_space(6.0);
                    ui.label(error.as_str());
                    ui.add_space(10.0);
                    if ui.button("Retry").clicked() {
                        reload_requested = true;
                    }
                });
            }
            AppState::Ready(model) => {
                model.show(ctx, self.contacts_path.is_some(), &mut reload_requested);
            }
        }

        if reload_requested {
            self.state = Self::load(self.contacts_path.as_deref());
        }
    }
}

impl ViewModel {
    fn new(graph: RelationGraph) -> Self {
        let engine = LayoutEngine::new(
            graph.view(false),
            &std::collections::HashMap::new(),
            LayoutConfig::default(),
        );
        Self {
            graph,
            favorites_only: false,
            mode: LayoutMode::FullForce,
            search: String::new(),
            selected_contact: None,
            selected_edge: None,
            camera: Camera::default(),
            camera_centered: false,
            engine,
            interaction: InteractionController::new(),
            graph_dirty: false,
        }
    }

    fn rebuild_engine(&mut self, keep_positions: bool) {
        let prior = if keep_positions {
            self.engine.position_map()
        } else {
            std::collections::HashMap::new()
        };
        self.engine.shutdown();
        self.engine = LayoutEngine::new(
            self.graph.view(self.favorites_only),
            &prior,
            LayoutConfig {
                mode: self.mode,
                center: egui::Vec2::ZERO,
            },
        );
        self.interaction = InteractionController::new();
        self.graph_dirty = false;
    }

    fn show(&mut self, ctx: &Context, can_reload: bool, reload_requested: &mut bool) {
        egui::SidePanel::left("controls")
            .default_width(260.0)
            .show(ctx, |ui| {
                self.side_panel(ui, can_reload, reload_requested);
            });
        egui::CentralPanel::default().show(ctx, |ui| {
            self.draw_graph(ui);
        });
    }
}
