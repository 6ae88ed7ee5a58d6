//! Map Pinboard Render Library
//!
//! Renderer abstraction for the map surface. The default implementation uses
//! Vello for GPU-accelerated rendering.

mod renderer;

#[cfg(feature = "vello-renderer")]
mod vello_impl;

pub use renderer::{MapPalette, RenderContext, Renderer};

#[cfg(feature = "vello-renderer")]
pub use vello_impl::VelloRenderer;
