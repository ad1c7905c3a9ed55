use clustermap::{
    core::config::MapConfig,
    data::generator::PointGenerator,
    spatial::clustering::GridClusterer,
    surface::headless::HeadlessSurface,
    ui::{bounds_panel, MapView, ShellState, ViewShell},
    LogNavigator,
};

type Shell = ViewShell<HeadlessSurface, GridClusterer, LogNavigator>;

/// Standalone marker map viewer
fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = MapConfig::from_env().map_err(|e| anyhow::anyhow!("invalid configuration: {}", e))?;
    let width = config.surface_size.x as f32;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([width, 820.0])
            .with_title("clustermap"),
        ..Default::default()
    };

    eframe::run_native(
        "clustermap-app",
        options,
        Box::new(move |_cc| Box::new(ClustermapApp::new(config))),
    )
    .map_err(|e| anyhow::anyhow!("viewer exited with error: {}", e))?;

    Ok(())
}

struct ClustermapApp {
    shell: Shell,
    generator: PointGenerator,
    marker_count: usize,
}

impl ClustermapApp {
    fn new(config: MapConfig) -> Self {
        let generator = PointGenerator::new(config.generator.clone());
        let marker_count = config.marker_count;
        let points = generator.generate(marker_count);

        let shell = ViewShell::headless(config, GridClusterer::default(), LogNavigator::new(), points);
        if let ShellState::Degraded(message) = shell.state() {
            log::warn!("{}", message);
        }

        Self {
            shell,
            generator,
            marker_count,
        }
    }

    fn regenerate(&mut self) {
        let points = self.generator.generate(self.marker_count);
        if let Err(e) = self.shell.replace_points(points) {
            log::warn!("failed to replace markers: {}", e);
        }
    }
}

impl eframe::App for ClustermapApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label("Markers:");
                ui.add(egui::DragValue::new(&mut self.marker_count).clamp_range(0..=50_000));
                if ui.button("Regenerate").clicked() {
                    self.regenerate();
                }

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if let Some(surface) = self.shell.surface() {
                        let viewport = surface.viewport();
                        ui.label(format!(
                            "Center: {:.4}, {:.4} | Zoom: {:.2}",
                            viewport.center.lat, viewport.center.lng, viewport.zoom
                        ));
                    }
                    if let Some(url) = self.shell.navigator().last() {
                        ui.label(format!("Last opened: {}", url));
                    }
                });
            });
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.add(MapView::new(&mut self.shell));
            bounds_panel(ui, &self.shell);
        });
    }
}
