//! Hover and selection state shared by the list and the map.
//!
//! Hover (pointer) and selection (tap) are two independent single slots.
//! Highlight and fade are derived from them on demand; nothing stores a
//! per-marker "open popup" flag that could be left behind.

use crate::pin::PinId;

/// Derived presentation of one pin.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MarkerStyle {
    /// Hovered or selected.
    pub highlighted: bool,
    /// Another pin is selected.
    pub faded: bool,
}

/// Effects of a hover change, to be applied in order: close `left`, then open `entered`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HoverTransition {
    pub left: Option<PinId>,
    pub entered: Option<PinId>,
}

impl HoverTransition {
    pub fn is_noop(&self) -> bool {
        self.left.is_none() && self.entered.is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HighlightState {
    hovered: Option<PinId>,
    selected: Option<PinId>,
}

impl HighlightState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hovered(&self) -> Option<PinId> {
        self.hovered
    }

    pub fn selected(&self) -> Option<PinId> {
        self.selected
    }

    /// Point the hover slot at `id`.
    ///
    /// Re-hovering the current pin is a no-op transition.
    pub fn set_hovered(&mut self, id: Option<PinId>) -> HoverTransition {
        if self.hovered == id {
            return HoverTransition::default();
        }
        let left = self.hovered.take();
        self.hovered = id;
        HoverTransition { left, entered: id }
    }

    /// Tap semantics: selecting the selected pin again clears selection,
    /// any other pin replaces it, `None` clears it.
    ///
    /// Returns the new selection.
    pub fn set_selected(&mut self, id: Option<PinId>) -> Option<PinId> {
        self.selected = match id {
            Some(id) if self.selected == Some(id) => None,
            other => other,
        };
        self.selected
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// Drop every reference to a pin that no longer exists.
    pub fn forget(&mut self, id: PinId) {
        if self.hovered == Some(id) {
            self.hovered = None;
        }
        if self.selected == Some(id) {
            self.selected = None;
        }
    }

    pub fn reset(&mut self) {
        self.hovered = None;
        self.selected = None;
    }

    pub fn is_highlighted(&self, id: PinId) -> bool {
        self.hovered == Some(id) || self.selected == Some(id)
    }

    pub fn is_faded(&self, id: PinId) -> bool {
        matches!(self.selected, Some(selected) if selected != id)
    }

    pub fn marker_style(&self, id: PinId) -> MarkerStyle {
        MarkerStyle {
            highlighted: self.is_highlighted(id),
            faded: self.is_faded(id),
        }
    }

    /// The pin whose popup should be open: hover wins over selection.
    pub fn focused(&self) -> Option<PinId> {
        self.hovered.or(self.selected)
    }
}
