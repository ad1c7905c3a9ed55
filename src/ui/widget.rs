use crate::{
    core::{
        constants::{MARKER_ICON_SIZE, SURFACE_HEIGHT_PX},
        geo::{LatLng, Point},
    },
    input::InputEvent,
    navigation::Navigator,
    spatial::clustering::GridClusterer,
    surface::headless::HeadlessSurface,
    ui::shell::{ShellState, ViewShell, BOUNDS_HEADING},
};
use egui::{Align2, Color32, FontId, Pos2, Rect, Response, Sense, Stroke, Ui, Vec2, Widget};

/// Scroll distance (in points) that zooms by one level
const SCROLL_PER_ZOOM_LEVEL: f32 = 120.0;

#[derive(Debug, Clone)]
pub struct MapViewStyle {
    pub background_color: Color32,
    pub marker_fill: Color32,
    pub marker_stroke: Stroke,
    pub cluster_fill: Color32,
    pub cluster_text: Color32,
    pub degraded_background: Color32,
    pub degraded_text: Color32,
}

impl Default for MapViewStyle {
    fn default() -> Self {
        Self {
            background_color: Color32::from_rgb(230, 230, 230),
            marker_fill: Color32::from_rgb(234, 67, 53),
            marker_stroke: Stroke::new(1.0, Color32::from_rgb(165, 14, 14)),
            cluster_fill: Color32::from_rgb(26, 115, 232),
            cluster_text: Color32::WHITE,
            degraded_background: Color32::from_rgb(255, 200, 200),
            degraded_text: Color32::from_rgb(150, 0, 0),
        }
    }
}

/// The map region of a headless view shell as an egui widget.
///
/// Translates pointer input into surface events, pumps the shell and paints
/// clusters, markers and open popups.
///
/// ```rust,ignore
/// ui.add(MapView::new(&mut shell));
/// bounds_panel(ui, &shell);
/// ```
pub struct MapView<'a, N: Navigator> {
    shell: &'a mut ViewShell<HeadlessSurface, GridClusterer, N>,
    style: MapViewStyle,
    height: f32,
}

impl<'a, N: Navigator> MapView<'a, N> {
    pub fn new(shell: &'a mut ViewShell<HeadlessSurface, GridClusterer, N>) -> Self {
        Self {
            shell,
            style: MapViewStyle::default(),
            height: SURFACE_HEIGHT_PX as f32,
        }
    }

    pub fn style(mut self, style: MapViewStyle) -> Self {
        self.style = style;
        self
    }

    pub fn height(mut self, height: f32) -> Self {
        self.height = height;
        self
    }

    fn forward_input(&mut self, ui: &Ui, rect: Rect, response: &Response) {
        let local = |pos: Pos2| Point::new((pos.x - rect.min.x) as f64, (pos.y - rect.min.y) as f64);

        let size = Point::new(rect.width() as f64, rect.height() as f64);
        if self.shell.surface().map(|s| s.viewport().size) != Some(size) {
            self.shell.handle_input(&InputEvent::Resize { size });
        }

        if response.dragged() {
            let delta = response.drag_delta();
            if delta.length_sq() > 0.0 {
                self.shell.handle_input(&InputEvent::Drag {
                    delta: Point::new(delta.x as f64, delta.y as f64),
                });
            }
        }

        match response.hover_pos() {
            Some(pos) => {
                let scroll = ui.input(|i| i.raw_scroll_delta.y);
                if scroll.abs() > 0.1 {
                    self.shell.handle_input(&InputEvent::Scroll {
                        delta: (scroll / SCROLL_PER_ZOOM_LEVEL) as f64,
                        position: local(pos),
                    });
                }
                self.shell
                    .handle_input(&InputEvent::MouseMove { position: local(pos) });
            }
            None => {
                self.shell.handle_input(&InputEvent::MouseLeave);
            }
        }

        if response.clicked() {
            if let Some(pos) = response.interact_pointer_pos() {
                self.shell.click(local(pos));
            }
        }
    }

    fn paint(&mut self, ui: &Ui, rect: Rect) {
        let clusters = self.shell.sync_cluster_visibility();
        let Some(surface) = self.shell.surface() else {
            return;
        };

        let painter = ui.painter_at(rect);
        painter.rect_filled(rect, 0.0, self.style.background_color);

        let viewport = surface.viewport();
        let to_screen = |lat_lng: &LatLng| {
            let p = viewport.lat_lng_to_pixel(lat_lng);
            rect.min + Vec2::new(p.x as f32, p.y as f32)
        };

        for cluster in &clusters {
            let pos = to_screen(&cluster.center);
            if cluster.is_single() {
                self.paint_marker(&painter, pos);
            } else {
                let radius = cluster.icon_radius() as f32;
                painter.circle_filled(pos, radius, self.style.cluster_fill);
                painter.circle_stroke(pos, radius + 3.0, Stroke::new(3.0, self.style.cluster_fill.gamma_multiply(0.4)));
                painter.text(
                    pos,
                    Align2::CENTER_CENTER,
                    cluster.count().to_string(),
                    FontId::proportional(13.0),
                    self.style.cluster_text,
                );
            }
        }

        for popup in surface.open_popups() {
            let Some(anchor) = popup.anchor.and_then(|m| surface.marker_position(m)) else {
                continue;
            };
            let tip = to_screen(&anchor) - Vec2::new(0.0, MARKER_ICON_SIZE.1 as f32);
            popup.render_at_screen_pos(&painter, tip);
        }
    }

    /// Pin glyph with its tip on `anchor`
    fn paint_marker(&self, painter: &egui::Painter, anchor: Pos2) {
        let head_radius = (MARKER_ICON_SIZE.0 / 2.0) as f32 - 2.0;
        let head = anchor - Vec2::new(0.0, MARKER_ICON_SIZE.1 as f32 - head_radius - 2.0);
        painter.line_segment([head, anchor], Stroke::new(3.0, self.style.marker_stroke.color));
        painter.circle(head, head_radius, self.style.marker_fill, self.style.marker_stroke);
        painter.circle_filled(head, head_radius / 3.0, Color32::from_rgb(120, 10, 10));
    }

    fn paint_message(&self, ui: &Ui, rect: Rect, background: Color32, text: &str, color: Color32) {
        ui.painter().rect_filled(rect, 0.0, background);
        ui.painter().text(
            rect.center(),
            Align2::CENTER_CENTER,
            text,
            FontId::proportional(16.0),
            color,
        );
    }
}

impl<'a, N: Navigator> Widget for MapView<'a, N> {
    fn ui(mut self, ui: &mut Ui) -> Response {
        let desired_size = Vec2::new(ui.available_width(), self.height);
        let (rect, response) = ui.allocate_exact_size(desired_size, Sense::click_and_drag());

        match self.shell.state().clone() {
            ShellState::Degraded(message) => {
                self.paint_message(ui, rect, self.style.degraded_background, &message, self.style.degraded_text);
                return response;
            }
            ShellState::Loading => {
                self.shell.pump();
                self.paint_message(ui, rect, self.style.background_color, "Loading map...", Color32::from_gray(100));
                ui.ctx().request_repaint();
                return response;
            }
            ShellState::Live => {}
        }

        self.forward_input(ui, rect, &response);
        self.paint(ui, rect);

        if response.hovered() {
            ui.ctx().set_cursor_icon(if self.shell.surface().and_then(|s| s.hovered()).is_some() {
                egui::CursorIcon::PointingHand
            } else {
                egui::CursorIcon::Grab
            });
        }

        response
    }
}

/// The textual bounds block; draws nothing until bounds were computed
pub fn bounds_panel<S, C, N>(ui: &mut Ui, shell: &ViewShell<S, C, N>)
where
    S: crate::surface::MapSurface,
    C: crate::spatial::clustering::ClusterCapability,
    N: Navigator,
{
    let Some(bounds) = shell.bounds() else {
        return;
    };

    ui.add_space(10.0);
    ui.heading(BOUNDS_HEADING);
    for (label, value) in bounds.readout_lines() {
        ui.label(format!("{}: {}", label, value));
    }
}
