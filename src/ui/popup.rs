use crate::prelude::HashMap;
use crate::{
    core::constants::POPUP_CAPTION,
    data::GeoPoint,
    surface::{MarkerId, PopupId},
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The small formatted block a marker popup displays
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopupContent {
    pub title: String,
    pub lat: f64,
    pub lng: f64,
    pub caption: String,
}

impl PopupContent {
    pub fn for_point(point: &GeoPoint) -> Self {
        Self {
            title: point.title.clone(),
            lat: point.lat,
            lng: point.lng,
            caption: POPUP_CAPTION.to_string(),
        }
    }

    /// Lines in display order: bold title, coordinates, caption
    pub fn lines(&self) -> Vec<String> {
        vec![
            self.title.clone(),
            format!("lat: {}", self.lat),
            format!("lng: {}", self.lng),
            self.caption.clone(),
        ]
    }
}

impl fmt::Display for PopupContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.lines().join("\n"))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Popup {
    pub id: PopupId,
    pub content: PopupContent,
    /// Marker the popup is currently anchored to, set while visible
    pub anchor: Option<MarkerId>,
    pub visible: bool,
    /// Whether opening the popup moved input focus onto it
    pub focused: bool,
}

impl Popup {
    pub fn new(id: PopupId, content: PopupContent) -> Self {
        Self {
            id,
            content,
            anchor: None,
            visible: false,
            focused: false,
        }
    }

    pub fn show(&mut self, anchor: MarkerId, should_focus: bool) {
        self.anchor = Some(anchor);
        self.visible = true;
        self.focused = should_focus;
    }

    pub fn hide(&mut self) {
        self.visible = false;
        self.focused = false;
    }

    /// Draws the popup with its anchor tip at `anchor_pos` (screen coordinates)
    #[cfg(feature = "egui")]
    pub fn render_at_screen_pos(&self, painter: &egui::Painter, anchor_pos: egui::Pos2) {
        use egui::{Align2, Color32, FontId, Rect, Stroke, Vec2};

        if !self.visible {
            return;
        }

        let padding = 8.0;
        let line_height = 18.0;
        let lines = self.content.lines();
        let width = lines
            .iter()
            .map(|line| line.chars().count() as f32 * 7.5)
            .fold(120.0_f32, f32::max)
            + padding * 2.0;
        let height = lines.len() as f32 * line_height + padding * 2.0;

        let rect = Rect::from_min_size(
            anchor_pos - Vec2::new(width / 2.0, height + 10.0),
            Vec2::new(width, height),
        );
        painter.rect_filled(rect, 4.0, Color32::WHITE);
        painter.rect_stroke(rect, 4.0, Stroke::new(1.0, Color32::GRAY));

        for (i, line) in lines.iter().enumerate() {
            let font = if i == 0 {
                FontId::proportional(15.0)
            } else {
                FontId::proportional(13.0)
            };
            painter.text(
                rect.min + Vec2::new(padding, padding + i as f32 * line_height),
                Align2::LEFT_TOP,
                line,
                font,
                Color32::BLACK,
            );
        }
    }
}

/// Popups owned by a map surface
pub struct PopupManager {
    popups: HashMap<PopupId, Popup>,
}

impl PopupManager {
    pub fn new() -> Self {
        Self {
            popups: HashMap::default(),
        }
    }

    pub fn add_popup(&mut self, popup: Popup) {
        self.popups.insert(popup.id, popup);
    }

    pub fn remove_popup(&mut self, id: PopupId) -> Option<Popup> {
        self.popups.remove(&id)
    }

    pub fn get(&self, id: PopupId) -> Option<&Popup> {
        self.popups.get(&id)
    }

    /// Returns false when the popup does not exist
    pub fn show_popup(&mut self, id: PopupId, anchor: MarkerId, should_focus: bool) -> bool {
        match self.popups.get_mut(&id) {
            Some(popup) => {
                popup.show(anchor, should_focus);
                true
            }
            None => false,
        }
    }

    pub fn hide_popup(&mut self, id: PopupId) {
        if let Some(popup) = self.popups.get_mut(&id) {
            popup.hide();
        }
    }

    /// Visible popups ordered by id
    pub fn visible(&self) -> Vec<&Popup> {
        let mut visible: Vec<&Popup> = self.popups.values().filter(|p| p.visible).collect();
        visible.sort_by_key(|p| p.id);
        visible
    }

    pub fn len(&self) -> usize {
        self.popups.len()
    }

    pub fn visible_count(&self) -> usize {
        self.popups.values().filter(|p| p.visible).count()
    }
}

impl Default for PopupManager {
    fn default() -> Self {
        Self::new()
    }
}
