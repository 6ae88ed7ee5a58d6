//! UI components using egui: header, pin list, popup and dialogs.

use egui::{
    Align, Align2, Color32, Context, CornerRadius, Id, Layout, Order, Pos2, Rect, RichText,
    Sense, UiBuilder, Vec2,
};
use pinboard_core::{
    HighlightState, MarkerStyle, Pin, PinId, format_latitude, format_longitude, format_position,
};
use pinboard_widgets::{
    CloseButton, IndexBadge, TextButton, danger_btn, dialog_frame, divider, loading_indicator,
    panel_frame, primary_btn, secondary_btn, section_label, sheet_handle, sizing, theme,
    toolbar_frame,
};

use crate::shortcuts::ShortcutRegistry;

/// Below this width the list becomes a bottom sheet.
pub const WIDE_LAYOUT_MIN_WIDTH: f32 = 768.0;
const SIDEBAR_WIDTH: f32 = 360.0;
const ROW_HEIGHT: f32 = 58.0;
const HEADER_HEIGHT: f32 = 56.0;
const SHEET_PEEK_HEIGHT: f32 = 150.0;
/// Expanded bottom sheet, as a share of the window height.
const SHEET_EXPANDED_FRACTION: f32 = 0.6;

/// UI-only state that survives between frames.
#[derive(Debug, Default)]
pub struct UiState {
    /// Bottom sheet pulled up (narrow layout only).
    pub sheet_expanded: bool,
    pub shortcuts_open: bool,
    /// Row under the pointer last frame.
    list_hover: Option<PinId>,
}

/// Actions that can be triggered by the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiAction {
    /// Pointer entered a row, or left the list.
    HoverPin(Option<PinId>),
    /// Row tapped.
    SelectPin(PinId),
    DeletePin(PinId),
    /// Clear All pressed; asks for confirmation.
    RequestClear,
    ConfirmClear,
    CancelClear,
    ZoomIn,
    ZoomOut,
}

/// Floating popup describing the focused pin.
pub struct PopupView<'a> {
    pub pin: &'a Pin,
    /// 1-based.
    pub index: usize,
    /// Top of the marker icon in window points.
    pub anchor: Pos2,
}

/// Read-only snapshot of the board for one frame.
pub struct BoardView<'a> {
    pub pins: &'a [Pin],
    pub highlight: &'a HighlightState,
    pub clear_pending: bool,
    pub popup: Option<PopupView<'a>>,
}

/// Render all UI and return the triggered actions, in order.
pub fn render_ui(ctx: &Context, ui_state: &mut UiState, view: &BoardView) -> Vec<UiAction> {
    let mut actions = Vec::new();
    let screen = ctx.input(|i| i.content_rect());
    let wide = screen.width() >= WIDE_LAYOUT_MIN_WIDTH;

    actions.extend(render_header(ctx, view));

    let list = if wide {
        render_sidebar(ctx, view, screen)
    } else {
        render_bottom_sheet(ctx, ui_state, view, screen)
    };
    if list.hovered != ui_state.list_hover {
        ui_state.list_hover = list.hovered;
        actions.push(UiAction::HoverPin(list.hovered));
    }
    actions.extend(list.action);

    if let Some(popup) = &view.popup {
        render_popup(ctx, popup);
    }

    if view.clear_pending {
        actions.extend(render_clear_dialog(ctx, view.pins.len()));
    }

    if ui_state.shortcuts_open {
        render_shortcuts_modal(ctx, ui_state);
    }

    actions
}

/// Title, pin count and zoom.
fn render_header(ctx: &Context, view: &BoardView) -> Option<UiAction> {
    let mut action = None;

    egui::Area::new(Id::new("header"))
        .anchor(Align2::CENTER_TOP, Vec2::new(0.0, 12.0))
        .show(ctx, |ui| {
            toolbar_frame().show(ui, |ui| {
                ui.horizontal(|ui| {
                    ui.label(
                        RichText::new("Map Pinboard")
                            .size(16.0)
                            .strong()
                            .color(theme::TEXT),
                    );
                    ui.label(
                        RichText::new(pin_count_label(view.pins.len()))
                            .size(12.0)
                            .color(theme::TEXT_MUTED),
                    );
                    ui.add_space(12.0);

                    if TextButton::new("−").shortcut("-").show(ui) {
                        action = Some(UiAction::ZoomOut);
                    }
                    if TextButton::new("+").shortcut("+").show(ui) {
                        action = Some(UiAction::ZoomIn);
                    }
                });
            });
        });

    action
}

/// What the list reported this frame.
#[derive(Default)]
struct ListOutput {
    hovered: Option<PinId>,
    action: Option<UiAction>,
}

/// List title with Clear All on the right while there is something to clear.
fn list_heading(ui: &mut egui::Ui, title: &str, view: &BoardView) -> Option<UiAction> {
    let mut action = None;
    ui.horizontal(|ui| {
        section_label(ui, title);
        if !view.pins.is_empty() {
            ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                if TextButton::new("Clear All").danger().show(ui) {
                    action = Some(UiAction::RequestClear);
                }
            });
        }
    });
    action
}

fn render_sidebar(ctx: &Context, view: &BoardView, screen: Rect) -> ListOutput {
    let mut output = ListOutput::default();
    let top = 16.0 + HEADER_HEIGHT;
    let max_height = (screen.height() - top - 16.0).max(ROW_HEIGHT);

    egui::Area::new(Id::new("pin_sidebar"))
        .fixed_pos(Pos2::new(16.0, top))
        .show(ctx, |ui| {
            panel_frame().show(ui, |ui| {
                ui.set_width(SIDEBAR_WIDTH);
                let clear = list_heading(ui, "Pin lists", view);
                divider(ui);
                output = render_pin_list(ui, view, max_height - 48.0);
                output.action = output.action.or(clear);
            });
        });

    output
}

fn render_bottom_sheet(
    ctx: &Context,
    ui_state: &mut UiState,
    view: &BoardView,
    screen: Rect,
) -> ListOutput {
    let mut output = ListOutput::default();
    let height = if ui_state.sheet_expanded {
        (screen.height() * SHEET_EXPANDED_FRACTION).max(SHEET_PEEK_HEIGHT)
    } else {
        SHEET_PEEK_HEIGHT
    };

    egui::Area::new(Id::new("pin_sheet"))
        .anchor(Align2::LEFT_BOTTOM, Vec2::ZERO)
        .show(ctx, |ui| {
            panel_frame().show(ui, |ui| {
                ui.set_width(screen.width() - 16.0);
                if sheet_handle(ui) {
                    ui_state.sheet_expanded = !ui_state.sheet_expanded;
                }
                let clear = list_heading(ui, "Pin lists", view);
                let toggle = if ui_state.sheet_expanded {
                    "Hide list"
                } else {
                    "Show list"
                };
                ui.horizontal(|ui| {
                    ui.label(
                        RichText::new(pin_count_label(view.pins.len()))
                            .size(12.0)
                            .color(theme::TEXT_MUTED),
                    );
                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        if TextButton::new(toggle).show(ui) {
                            ui_state.sheet_expanded = !ui_state.sheet_expanded;
                        }
                    });
                });
                divider(ui);
                output = render_pin_list(ui, view, height - 72.0);
                output.action = output.action.or(clear);
            });
        });

    output
}

fn render_pin_list(ui: &mut egui::Ui, view: &BoardView, max_height: f32) -> ListOutput {
    let mut output = ListOutput::default();

    if view.pins.is_empty() {
        ui.add_space(8.0);
        ui.vertical_centered(|ui| {
            ui.label(RichText::new("No pins yet").size(13.0).color(theme::TEXT));
            ui.label(
                RichText::new("Click on the map to add a pin")
                    .size(12.0)
                    .color(theme::TEXT_MUTED),
            );
        });
        ui.add_space(8.0);
        return output;
    }

    egui::ScrollArea::vertical()
        .max_height(max_height.max(ROW_HEIGHT))
        .auto_shrink([false, true])
        .show(ui, |ui| {
            ui.spacing_mut().item_spacing = Vec2::new(0.0, 4.0);
            for (i, pin) in view.pins.iter().enumerate() {
                let row = render_pin_row(ui, pin, i + 1, view.highlight.marker_style(pin.id));
                if row.hovered {
                    output.hovered = Some(pin.id);
                }
                if row.deleted {
                    output.action = Some(UiAction::DeletePin(pin.id));
                } else if row.clicked && output.action.is_none() {
                    output.action = Some(UiAction::SelectPin(pin.id));
                }
            }
        });

    output
}

struct RowResponse {
    hovered: bool,
    clicked: bool,
    deleted: bool,
}

fn render_pin_row(ui: &mut egui::Ui, pin: &Pin, index: usize, style: MarkerStyle) -> RowResponse {
    let size = Vec2::new(ui.available_width(), ROW_HEIGHT);
    let (rect, response) = ui.allocate_exact_size(size, Sense::click());
    let hovered = response.contains_pointer();

    let bg = if style.highlighted {
        theme::SELECTED_BG
    } else if hovered {
        theme::HOVER_BG
    } else {
        Color32::TRANSPARENT
    };
    ui.painter()
        .rect_filled(rect, CornerRadius::same(sizing::CORNER_RADIUS), bg);

    let mut deleted = false;
    let mut row = ui.new_child(
        UiBuilder::new()
            .max_rect(rect.shrink2(Vec2::new(8.0, 6.0)))
            .layout(Layout::left_to_right(Align::Center)),
    );
    if style.faded {
        row.multiply_opacity(0.45);
    }

    IndexBadge::new(index)
        .highlighted(style.highlighted)
        .show(&mut row);
    row.add_space(8.0);

    let text_width = (row.available_width() - sizing::SMALL - 12.0).max(40.0);
    row.allocate_ui_with_layout(
        Vec2::new(text_width, ROW_HEIGHT - 12.0),
        Layout::top_down(Align::Min),
        |ui| {
            if pin.is_geocoding {
                ui.horizontal(|ui| {
                    loading_indicator(ui);
                    ui.label(
                        RichText::new(&pin.address)
                            .size(13.0)
                            .italics()
                            .color(theme::TEXT_MUTED),
                    );
                });
            } else {
                ui.add(
                    egui::Label::new(RichText::new(&pin.address).size(13.0).color(theme::TEXT))
                        .truncate(),
                );
            }
            ui.label(
                RichText::new(format!(
                    "{}  {}",
                    format_latitude(pin.lat),
                    format_longitude(pin.lng)
                ))
                .size(11.0)
                .monospace()
                .color(theme::TEXT_MUTED),
            );
        },
    );

    row.with_layout(Layout::right_to_left(Align::Center), |ui| {
        if CloseButton::new("Delete pin").danger().show(ui) {
            deleted = true;
        }
    });

    let clicked = response
        .on_hover_cursor(egui::CursorIcon::PointingHand)
        .clicked();

    RowResponse {
        hovered,
        clicked,
        deleted,
    }
}

fn render_popup(ctx: &Context, popup: &PopupView) {
    egui::Area::new(Id::new("pin_popup"))
        .fixed_pos(popup.anchor - Vec2::new(0.0, 6.0))
        .pivot(Align2::CENTER_BOTTOM)
        .order(Order::Foreground)
        .interactable(false)
        .show(ctx, |ui| {
            dialog_frame()
                .inner_margin(egui::Margin::same(10))
                .show(ui, |ui| {
                    ui.set_max_width(260.0);
                    ui.horizontal(|ui| {
                        IndexBadge::new(popup.index).highlighted(true).show(ui);
                        ui.label(RichText::new("Pin Location").size(13.0).strong());
                    });
                    ui.add_space(4.0);
                    if popup.pin.is_geocoding {
                        ui.label(
                            RichText::new(&popup.pin.address)
                                .size(12.0)
                                .italics()
                                .color(theme::TEXT_MUTED),
                        );
                    } else {
                        ui.label(RichText::new(&popup.pin.address).size(12.0).color(theme::TEXT));
                    }
                    ui.add_space(2.0);
                    ui.label(
                        RichText::new(popup.pin.position().to_decimal_string())
                            .size(11.0)
                            .monospace()
                            .color(theme::TEXT),
                    );
                    ui.label(
                        RichText::new(format_position(popup.pin.position()))
                            .size(11.0)
                            .monospace()
                            .color(theme::TEXT_MUTED),
                    );
                });
        });
}

fn render_clear_dialog(ctx: &Context, count: usize) -> Option<UiAction> {
    let mut action = None;

    // Backdrop
    egui::Area::new(Id::new("clear_dialog_backdrop"))
        .fixed_pos(Pos2::ZERO)
        .order(Order::Middle)
        .show(ctx, |ui| {
            let screen_rect = ctx.input(|i| i.content_rect());
            let response = ui.allocate_rect(screen_rect, Sense::click());
            ui.painter()
                .rect_filled(screen_rect, 0.0, Color32::from_black_alpha(80));
            if response.clicked() {
                action = Some(UiAction::CancelClear);
            }
        });

    egui::Area::new(Id::new("clear_dialog"))
        .anchor(Align2::CENTER_CENTER, Vec2::ZERO)
        .order(Order::Foreground)
        .show(ctx, |ui| {
            dialog_frame().show(ui, |ui| {
                ui.set_width(300.0);
                ui.label(
                    RichText::new("Clear all pins?")
                        .size(16.0)
                        .strong()
                        .color(theme::TEXT),
                );
                ui.add_space(8.0);
                ui.label(
                    RichText::new(format!(
                        "This removes {} from the map and the list. It cannot be undone.",
                        pin_count_label(count)
                    ))
                    .size(12.0)
                    .color(theme::TEXT_MUTED),
                );
                ui.add_space(16.0);
                ui.horizontal(|ui| {
                    if secondary_btn(ui, "Cancel") {
                        action = Some(UiAction::CancelClear);
                    }
                    if danger_btn(ui, "Clear All") {
                        action = Some(UiAction::ConfirmClear);
                    }
                });
            });
        });

    action
}

fn render_shortcuts_modal(ctx: &Context, ui_state: &mut UiState) {
    // Backdrop
    egui::Area::new(Id::new("shortcuts_backdrop"))
        .fixed_pos(Pos2::ZERO)
        .order(Order::Middle)
        .show(ctx, |ui| {
            let screen_rect = ctx.input(|i| i.content_rect());
            let response = ui.allocate_rect(screen_rect, Sense::click());
            ui.painter()
                .rect_filled(screen_rect, 0.0, Color32::from_black_alpha(80));
            if response.clicked() {
                ui_state.shortcuts_open = false;
            }
        });

    egui::Area::new(Id::new("shortcuts_modal"))
        .anchor(Align2::CENTER_CENTER, Vec2::ZERO)
        .order(Order::Foreground)
        .show(ctx, |ui| {
            dialog_frame().show(ui, |ui| {
                ui.set_width(360.0);
                ui.horizontal(|ui| {
                    ui.label(RichText::new("Keyboard Shortcuts").size(16.0).strong());
                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        if CloseButton::new("Close").show(ui) {
                            ui_state.shortcuts_open = false;
                        }
                    });
                });
                ui.add_space(12.0);
                for shortcut in ShortcutRegistry::all() {
                    ui.horizontal(|ui| {
                        ui.label(
                            RichText::new(shortcut.format())
                                .size(12.0)
                                .monospace()
                                .color(theme::ACCENT),
                        );
                        ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                            ui.label(
                                RichText::new(shortcut.description)
                                    .size(12.0)
                                    .color(theme::TEXT),
                            );
                        });
                    });
                }
                ui.add_space(12.0);
                if primary_btn(ui, "Got it") {
                    ui_state.shortcuts_open = false;
                }
            });
        });
}

fn pin_count_label(count: usize) -> String {
    match count {
        1 => "1 pin".to_string(),
        n => format!("{} pins", n),
    }
}
