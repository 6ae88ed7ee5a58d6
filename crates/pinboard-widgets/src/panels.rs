//! Panel chrome: floating frames, the sheet grab handle and list headings.

use egui::{Color32, CornerRadius, CursorIcon, Frame, Margin, Sense, Stroke, Ui, epaint::Shadow, vec2};

use crate::{sizing, theme};

fn shadow(blur: u8, offset_y: i8, alpha: u8) -> Shadow {
    Shadow {
        spread: 0,
        blur,
        offset: [0, offset_y],
        color: Color32::from_black_alpha(alpha),
    }
}

/// Frame for the pin list sidebar and bottom sheet.
pub fn panel_frame() -> Frame {
    Frame::new()
        .fill(theme::PANEL_BG)
        .corner_radius(CornerRadius::same(sizing::PANEL_RADIUS))
        .stroke(Stroke::new(1.0, theme::BORDER))
        .shadow(shadow(8, 2, 15))
        .inner_margin(Margin::same(10))
}

/// Frame for the header bar floating over the map.
pub fn toolbar_frame() -> Frame {
    Frame::new()
        .fill(theme::PANEL_BG)
        .corner_radius(CornerRadius::same(sizing::PANEL_RADIUS))
        .stroke(Stroke::new(1.0, theme::BORDER))
        .shadow(shadow(6, 2, 10))
        .inner_margin(Margin::symmetric(14, 8))
}

/// Frame for the pin popup and modal dialogs.
pub fn dialog_frame() -> Frame {
    Frame::new()
        .fill(Color32::WHITE)
        .corner_radius(CornerRadius::same(sizing::PANEL_RADIUS + 4))
        .stroke(Stroke::new(1.0, theme::BORDER))
        .shadow(shadow(24, 8, 40))
        .inner_margin(Margin::same(20))
}

/// Grab bar at the top of the bottom sheet. Returns true when clicked.
pub fn sheet_handle(ui: &mut Ui) -> bool {
    let (rect, response) =
        ui.allocate_exact_size(vec2(ui.available_width(), 14.0), Sense::click());

    if ui.is_rect_visible(rect) {
        let color = if response.hovered() {
            theme::TEXT_MUTED
        } else {
            theme::BORDER
        };
        let bar = egui::Rect::from_center_size(rect.center(), vec2(40.0, 4.0));
        ui.painter().rect_filled(bar, CornerRadius::same(2), color);
    }

    let clicked = response.clicked();
    response.on_hover_cursor(CursorIcon::PointingHand);
    clicked
}

/// Small uppercase heading above a list.
pub fn section_label(ui: &mut Ui, text: &str) {
    ui.label(
        egui::RichText::new(text.to_uppercase())
            .size(10.0)
            .strong()
            .color(theme::TEXT_MUTED),
    );
}

/// Thin rule between a list heading and its rows.
pub fn divider(ui: &mut Ui) {
    let rect = ui.available_rect_before_wrap();
    let y = rect.top() + 4.0;
    ui.painter().hline(
        rect.left()..=rect.right(),
        y,
        Stroke::new(1.0, theme::BORDER),
    );
    ui.add_space(8.0);
}
