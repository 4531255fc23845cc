mod painter_surface;
mod trail_layer;

pub use painter_surface::PainterSurface;
pub use trail_layer::TrailLayer;

use penline_core::{
    build_effect, Catalog, CategoryFilter, ChatMessage, EffectKind, EngineConfig, Project, Role,
    Theme,
};
use tracing::info;

/// Portfolio window with the configured cursor effect drawn over it.
pub struct PortfolioApp {
    config: EngineConfig,
    catalog: Catalog,
    filter: CategoryFilter,
    selected: Option<String>,
    messages: Vec<ChatMessage>,
    trail: TrailLayer,
}

impl PortfolioApp {
    pub fn new(config: EngineConfig, catalog: Catalog) -> Self {
        let trail = TrailLayer::new(build_effect(&config));
        let messages = vec![ChatMessage::assistant(config.greeting.clone())];
        Self {
            config,
            catalog,
            filter: CategoryFilter::All,
            selected: None,
            messages,
            trail,
        }
    }

    pub fn theme(&self) -> Theme {
        self.config.theme
    }

    pub fn filter(&self) -> CategoryFilter {
        self.filter
    }

    pub fn set_filter(&mut self, filter: CategoryFilter) {
        self.filter = filter;
    }

    pub fn selected(&self) -> Option<&Project> {
        self.selected.as_deref().and_then(|id| self.catalog.get(id))
    }

    pub fn open_project(&mut self, id: &str) {
        if self.catalog.get(id).is_some() {
            info!("UI: open project {id}");
            self.selected = Some(id.to_string());
        }
    }

    pub fn set_effect(&mut self, effect: EffectKind) {
        if self.config.effect != effect {
            self.config.effect = effect;
            self.trail.replace_effect(build_effect(&self.config));
        }
    }

    pub fn effect_name(&self) -> &'static str {
        self.trail.effect_name()
    }

    /// Lays out one pass of the whole window.
    pub fn show(&mut self, ctx: &egui::Context) {
        ctx.set_visuals(match self.config.theme {
            Theme::Dark => egui::Visuals::dark(),
            Theme::Light => egui::Visuals::light(),
        });
        self.trail.collect_input(ctx);

        let mut hovering = false;
        let mut open_request: Option<String> = None;

        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading("Portfolio");
                ui.separator();
                hovering |= self.top_bar(ui);
            });
        });

        egui::SidePanel::right("guide").min_width(260.0).show(ctx, |ui| {
            ui.heading("Guide");
            ui.separator();
            for message in &self.messages {
                match message.role {
                    Role::User => {
                        ui.label(egui::RichText::new(&message.content).strong());
                    }
                    Role::Assistant => {
                        let reply = message.parsed();
                        ui.label(&reply.text);
                        for project in self.catalog.resolve(&reply) {
                            let response = ui.button(format!("View project: {}", project.title));
                            hovering |= response.hovered();
                            if response.clicked() {
                                open_request = Some(project.id.clone());
                            }
                        }
                    }
                }
                ui.add_space(8.0);
            }
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            let output = egui::ScrollArea::vertical().show(ui, |ui| {
                for project in self.catalog.filter(self.filter) {
                    let response = project_card(ui, project);
                    hovering |= response.hovered();
                    if response.clicked() {
                        open_request = Some(project.id.clone());
                    }
                    ui.add_space(12.0);
                }
            });
            self.trail.set_scroll(output.state.offset);
        });

        if let Some(id) = open_request {
            self.open_project(&id);
        }
        self.project_window(ctx);

        self.trail.set_hovering(hovering);
        self.trail.paint(ctx);
    }

    fn top_bar(&mut self, ui: &mut egui::Ui) -> bool {
        let theme_label = match self.config.theme {
            Theme::Dark => "Light mode",
            Theme::Light => "Dark mode",
        };
        let theme_button = ui.button(theme_label);
        if theme_button.clicked() {
            self.config.theme = self.config.theme.toggled();
            info!("UI: theme -> {:?}", self.config.theme);
        }

        let mut effect = self.config.effect;
        egui::ComboBox::from_id_salt("effect")
            .selected_text(self.trail.effect_name())
            .show_ui(ui, |ui| {
                ui.selectable_value(&mut effect, EffectKind::Pen, "pen");
                ui.selectable_value(&mut effect, EffectKind::Liquid, "liquid");
            });
        self.set_effect(effect);

        let mut filter = self.filter;
        egui::ComboBox::from_id_salt("category")
            .selected_text(filter.label())
            .show_ui(ui, |ui| {
                ui.selectable_value(&mut filter, CategoryFilter::All, CategoryFilter::All.label());
                for category in self.catalog.categories() {
                    let option = CategoryFilter::Only(category);
                    ui.selectable_value(&mut filter, option, option.label());
                }
            });
        self.filter = filter;

        theme_button.hovered()
    }

    fn project_window(&mut self, ctx: &egui::Context) {
        let Some(project) = self.selected.as_deref().and_then(|id| self.catalog.get(id)) else {
            return;
        };
        let mut open = true;
        egui::Window::new(&project.title)
            .open(&mut open)
            .collapsible(false)
            .default_width(480.0)
            .show(ctx, |ui| {
                ui.label(format!("{} · {}", project.category, project.year));
                ui.separator();
                let body = if project.full_description.is_empty() {
                    &project.description
                } else {
                    &project.full_description
                };
                ui.label(body);
                if !project.tools.is_empty() {
                    ui.add_space(6.0);
                    ui.label(format!("Tools: {}", project.tools.join(", ")));
                }
                ui.add_space(6.0);
                for image in std::iter::once(&project.thumbnail).chain(&project.images) {
                    ui.hyperlink(image);
                }
            });
        if !open {
            self.selected = None;
        }
    }
}

fn project_card(ui: &mut egui::Ui, project: &Project) -> egui::Response {
    ui.group(|ui| {
        ui.set_width(ui.available_width());
        ui.label(egui::RichText::new(&project.title).heading());
        ui.label(format!("{} · {}", project.category, project.year));
        ui.label(&project.description);
    })
    .response
    .interact(egui::Sense::click())
}

impl eframe::App for PortfolioApp {
    fn update(&mut self, context: &egui::Context, _frame: &mut eframe::Frame) {
        self.show(context);
    }
}

/// Opens the portfolio window and blocks until it is closed.
pub fn run(config: EngineConfig, catalog: Catalog) -> eframe::Result<()> {
    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Penline")
            .with_inner_size([1280.0, 800.0]),
        ..Default::default()
    };
    info!("UI: starting with {} projects", catalog.len());
    eframe::run_native(
        "Penline",
        native_options,
        Box::new(move |_creation_context| Ok(Box::new(PortfolioApp::new(config, catalog)))),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use penline_core::Category;

    const PROJECTS: &str = r#"[
        {"id": "velvet", "title": "Velvet Tea", "category": "Packaging Design",
         "description": "Tea boxes", "thumbnail": "velvet.png", "year": "2023"},
        {"id": "north_star", "title": "North Star", "category": "branding",
         "description": "Identity", "thumbnail": "north.png", "year": "2022"}
    ]"#;

    fn app() -> PortfolioApp {
        let config = EngineConfig {
            greeting: "Try [OPEN_PROJECT:velvet] first.".to_string(),
            ..EngineConfig::default()
        };
        PortfolioApp::new(config, Catalog::from_json(PROJECTS).unwrap())
    }

    fn pass(app: &mut PortfolioApp) {
        let ctx = egui::Context::default();
        let input = egui::RawInput {
            screen_rect: Some(egui::Rect::from_min_size(
                egui::Pos2::ZERO,
                egui::vec2(1024.0, 768.0),
            )),
            ..Default::default()
        };
        let _ = ctx.run(input, |ctx| app.show(ctx));
    }

    #[test]
    fn opening_unknown_projects_is_ignored() {
        let mut app = app();
        app.open_project("missing");
        assert!(app.selected().is_none());
        app.open_project("velvet");
        assert_eq!(app.selected().map(|p| p.title.as_str()), Some("Velvet Tea"));
    }

    #[test]
    fn switching_effects_swaps_the_layer() {
        let mut app = app();
        assert_eq!(app.effect_name(), "pen");
        app.set_effect(EffectKind::Liquid);
        assert_eq!(app.effect_name(), "liquid");
    }

    #[test]
    fn a_full_pass_lays_out_with_a_filter_and_open_window() {
        let mut app = app();
        app.set_filter(CategoryFilter::Only(Category::Branding));
        app.open_project("north_star");
        pass(&mut app);
        assert_eq!(app.filter(), CategoryFilter::Only(Category::Branding));
        assert!(app.selected().is_some());
        assert_eq!(app.theme(), Theme::Dark);
    }
}
