//! Map Pinboard Application
//!
//! The application shell providing windowing, input handling,
//! and integration of the map surface with the pin list.

mod app;
mod compositor;
mod event_handler;
mod shortcuts;
mod ui;
mod view_params;

pub use app::{App, AppConfig, AppError};
pub use shortcuts::{KeyAction, Shortcut, ShortcutRegistry};
pub use ui::{BoardView, PopupView, UiAction, UiState, render_ui};
pub use view_params::{ViewParams, parse_view_params};

#[cfg(target_arch = "wasm32")]
mod web;

#[cfg(target_arch = "wasm32")]
pub use web::run_wasm;
