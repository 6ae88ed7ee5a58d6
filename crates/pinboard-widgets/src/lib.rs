//! Reusable egui widget components with Tailwind-inspired styling.
//!
//! - **Buttons**: primary/secondary/danger buttons, text buttons, close glyph buttons
//! - **Panels**: panel, toolbar and dialog frames, the sheet handle, list headings
//! - **Status**: index badges, loading indicators

pub mod buttons;
pub mod panels;
pub mod status;

pub use buttons::{CloseButton, TextButton, danger_btn, primary_btn, secondary_btn};
pub use panels::{dialog_frame, divider, panel_frame, section_label, sheet_handle, toolbar_frame};
pub use status::{IndexBadge, loading_indicator};

/// Standard sizing constants used across widgets.
pub mod sizing {
    /// Small button size (close glyphs, badges)
    pub const SMALL: f32 = 20.0;
    /// Medium button size
    pub const MEDIUM: f32 = 28.0;
    /// Standard corner radius
    pub const CORNER_RADIUS: u8 = 4;
    /// Panel corner radius
    pub const PANEL_RADIUS: u8 = 8;
}

/// Standard colors used across widgets.
pub mod theme {
    use egui::Color32;

    /// Text color (dark gray)
    pub const TEXT: Color32 = Color32::from_rgb(60, 60, 60);
    /// Muted text color
    pub const TEXT_MUTED: Color32 = Color32::from_rgb(120, 120, 120);
    /// Border color
    pub const BORDER: Color32 = Color32::from_rgb(220, 220, 220);
    /// Selection/active color (blue)
    pub const ACCENT: Color32 = Color32::from_rgb(59, 130, 246);
    /// Destructive actions (red)
    pub const DANGER: Color32 = Color32::from_rgb(239, 68, 68);
    /// Hover background
    pub const HOVER_BG: Color32 = Color32::from_rgb(245, 245, 245);
    /// Selected background
    pub const SELECTED_BG: Color32 = Color32::from_rgb(235, 245, 255);
    /// Panel background
    pub const PANEL_BG: Color32 = Color32::from_rgba_premultiplied(250, 250, 252, 250);
}
