//! Status widgets: list index badges and the geocoding indicator.

use egui::{Color32, CornerRadius, Sense, Stroke, Ui, vec2};

use crate::buttons::centered_text;
use crate::{sizing, theme};

/// Rounded `#n` badge shown on list rows.
pub struct IndexBadge {
    index: usize,
    highlighted: bool,
}

impl IndexBadge {
    /// `index` is the 1-based display position.
    pub fn new(index: usize) -> Self {
        Self {
            index,
            highlighted: false,
        }
    }

    pub fn highlighted(mut self, highlighted: bool) -> Self {
        self.highlighted = highlighted;
        self
    }

    pub fn label(&self) -> String {
        format!("#{}", self.index)
    }

    pub fn show(self, ui: &mut Ui) {
        let label = self.label();
        let width = (label.len() as f32 * 7.0 + 12.0).max(sizing::MEDIUM);
        let (rect, _) = ui.allocate_exact_size(vec2(width, sizing::SMALL + 2.0), Sense::hover());
        if !ui.is_rect_visible(rect) {
            return;
        }
        let (bg, fg) = if self.highlighted {
            (theme::ACCENT, Color32::WHITE)
        } else {
            (theme::SELECTED_BG, theme::ACCENT)
        };
        ui.painter()
            .rect_filled(rect, CornerRadius::same(sizing::PANEL_RADIUS), bg);
        centered_text(ui, rect, &label, 11.0, fg);
    }
}

/// Pulsing dot plus spinner, shown while an address is loading.
pub fn loading_indicator(ui: &mut Ui) {
    let time = ui.input(|i| i.time);
    let (rect, _) = ui.allocate_exact_size(vec2(10.0, 10.0), Sense::hover());
    if ui.is_rect_visible(rect) {
        let phase = ((time * std::f64::consts::TAU).sin() * 0.5 + 0.5) as f32;
        let alpha = (80.0 + phase * 175.0) as u8;
        let color = Color32::from_rgba_unmultiplied(59, 130, 246, alpha);
        ui.painter().circle(rect.center(), 3.0 + phase, color, Stroke::NONE);
    }
    ui.add(egui::Spinner::new().size(12.0).color(theme::ACCENT));
    ui.ctx().request_repaint();
}
