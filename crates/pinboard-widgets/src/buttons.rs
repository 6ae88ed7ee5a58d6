//! Button components: filled action buttons, text buttons, close glyphs.

use egui::{Align2, Color32, CornerRadius, CursorIcon, FontId, Pos2, Sense, Stroke, StrokeKind, Ui, vec2};

use crate::{sizing, theme};

struct ButtonColors {
    fill: Color32,
    hover_fill: Color32,
    text: Color32,
    border: Option<Color32>,
}

fn filled_button(ui: &mut Ui, label: &str, colors: ButtonColors) -> bool {
    let galley = ui.painter().layout_no_wrap(
        label.to_string(),
        FontId::proportional(13.0),
        colors.text,
    );
    let size = vec2((galley.size().x + 24.0).max(64.0), sizing::MEDIUM + 4.0);
    let (rect, response) = ui.allocate_exact_size(size, Sense::click());

    if ui.is_rect_visible(rect) {
        let fill = if response.hovered() { colors.hover_fill } else { colors.fill };
        let radius = CornerRadius::same(sizing::CORNER_RADIUS + 2);
        ui.painter().rect_filled(rect, radius, fill);
        if let Some(border) = colors.border {
            ui.painter()
                .rect_stroke(rect, radius, Stroke::new(1.0, border), StrokeKind::Inside);
        }
        ui.painter()
            .galley(rect.center() - galley.size() / 2.0, galley, colors.text);
    }

    let clicked = response.clicked();
    response.on_hover_cursor(CursorIcon::PointingHand);
    clicked
}

/// Solid accent button for the main action of a dialog.
pub fn primary_btn(ui: &mut Ui, label: &str) -> bool {
    filled_button(
        ui,
        label,
        ButtonColors {
            fill: theme::ACCENT,
            hover_fill: Color32::from_rgb(37, 99, 235),
            text: Color32::WHITE,
            border: None,
        },
    )
}

/// Outlined neutral button.
pub fn secondary_btn(ui: &mut Ui, label: &str) -> bool {
    filled_button(
        ui,
        label,
        ButtonColors {
            fill: Color32::WHITE,
            hover_fill: theme::HOVER_BG,
            text: theme::TEXT,
            border: Some(theme::BORDER),
        },
    )
}

/// Solid red button for destructive confirmations.
pub fn danger_btn(ui: &mut Ui, label: &str) -> bool {
    filled_button(
        ui,
        label,
        ButtonColors {
            fill: theme::DANGER,
            hover_fill: Color32::from_rgb(220, 38, 38),
            text: Color32::WHITE,
            border: None,
        },
    )
}

/// A flat text button with optional color override.
pub struct TextButton<'a> {
    label: &'a str,
    color: Color32,
    shortcut: Option<&'a str>,
}

impl<'a> TextButton<'a> {
    /// Create a new text button.
    pub fn new(label: &'a str) -> Self {
        Self {
            label,
            color: theme::TEXT,
            shortcut: None,
        }
    }

    /// Render the label in the danger color.
    pub fn danger(mut self) -> Self {
        self.color = theme::DANGER;
        self
    }

    /// Add a shortcut hint.
    pub fn shortcut(mut self, shortcut: &'a str) -> Self {
        self.shortcut = Some(shortcut);
        self
    }

    /// Show the button and return true if clicked.
    pub fn show(self, ui: &mut Ui) -> bool {
        let galley = ui.painter().layout_no_wrap(
            self.label.to_string(),
            FontId::proportional(12.0),
            self.color,
        );
        let size = vec2(galley.size().x + 16.0, 24.0);
        let (rect, response) = ui.allocate_exact_size(size, Sense::click());

        if ui.is_rect_visible(rect) {
            let bg_color = if response.hovered() {
                theme::HOVER_BG
            } else {
                Color32::TRANSPARENT
            };
            ui.painter()
                .rect_filled(rect, CornerRadius::same(sizing::CORNER_RADIUS), bg_color);
            ui.painter().galley(
                Pos2::new(rect.left() + 8.0, rect.center().y - galley.size().y / 2.0),
                galley,
                self.color,
            );
        }

        let clicked = response.clicked();
        let response = response.on_hover_cursor(CursorIcon::PointingHand);
        if let Some(shortcut) = self.shortcut {
            response.on_hover_text(shortcut);
        }
        clicked
    }
}

/// A small square button drawing an × glyph.
pub struct CloseButton<'a> {
    tooltip: &'a str,
    hover_color: Color32,
}

impl<'a> CloseButton<'a> {
    pub fn new(tooltip: &'a str) -> Self {
        Self {
            tooltip,
            hover_color: theme::TEXT,
        }
    }

    /// Turn red on hover.
    pub fn danger(mut self) -> Self {
        self.hover_color = theme::DANGER;
        self
    }

    /// Show the button and return true if clicked.
    pub fn show(self, ui: &mut Ui) -> bool {
        let size = vec2(sizing::SMALL + 4.0, sizing::SMALL + 4.0);
        let (rect, response) = ui.allocate_exact_size(size, Sense::click());

        if ui.is_rect_visible(rect) {
            let (bg, fg) = if response.hovered() {
                (theme::HOVER_BG, self.hover_color)
            } else {
                (Color32::TRANSPARENT, theme::TEXT_MUTED)
            };
            ui.painter()
                .rect_filled(rect, CornerRadius::same(sizing::CORNER_RADIUS), bg);
            let c = rect.center();
            let r = 4.5;
            let stroke = Stroke::new(1.5, fg);
            ui.painter()
                .line_segment([c + vec2(-r, -r), c + vec2(r, r)], stroke);
            ui.painter()
                .line_segment([c + vec2(-r, r), c + vec2(r, -r)], stroke);
        }

        let clicked = response.clicked();
        response
            .on_hover_cursor(CursorIcon::PointingHand)
            .on_hover_text(self.tooltip);
        clicked
    }
}

/// Paint a label centered in a rect; shared by badge-like widgets.
pub(crate) fn centered_text(ui: &Ui, rect: egui::Rect, text: &str, size: f32, color: Color32) {
    ui.painter().text(
        rect.center(),
        Align2::CENTER_CENTER,
        text,
        FontId::proportional(size),
        color,
    );
}
