//! Keyboard shortcut registry and key mapping.

use winit::keyboard::{Key, NamedKey};

/// A keyboard shortcut definition.
#[derive(Debug, Clone)]
pub struct Shortcut {
    pub key: &'static str,
    pub shift: bool,
    pub description: &'static str,
}

impl Shortcut {
    pub const fn new(key: &'static str, shift: bool, description: &'static str) -> Self {
        Self {
            key,
            shift,
            description,
        }
    }

    /// Format the shortcut for display (e.g., "Shift+/").
    pub fn format(&self) -> String {
        if self.shift {
            format!("Shift+{}", self.key)
        } else {
            self.key.to_string()
        }
    }
}

/// Registry of all keyboard shortcuts.
pub struct ShortcutRegistry;

impl ShortcutRegistry {
    /// Get all registered shortcuts.
    pub fn all() -> Vec<Shortcut> {
        vec![
            Shortcut::new("Escape", false, "Clear selection or cancel the current action"),
            Shortcut::new("Delete", false, "Delete the selected pin"),
            Shortcut::new("Backspace", false, "Delete the selected pin"),
            Shortcut::new("+", false, "Zoom in"),
            Shortcut::new("-", false, "Zoom out"),
            Shortcut::new("?", true, "Show keyboard shortcuts"),
        ]
    }

    /// Print all shortcuts to console.
    pub fn print_all() {
        println!("\n=== Keyboard Shortcuts ===");
        for shortcut in Self::all() {
            println!("  {:20} {}", shortcut.format(), shortcut.description);
        }
        println!();
    }
}

/// What a key press asks the board to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Escape,
    DeleteSelected,
    ZoomIn,
    ZoomOut,
    ToggleShortcuts,
}

impl KeyAction {
    pub fn from_key(key: &Key) -> Option<Self> {
        match key {
            Key::Named(NamedKey::Escape) => Some(Self::Escape),
            Key::Named(NamedKey::Delete | NamedKey::Backspace) => Some(Self::DeleteSelected),
            Key::Character(c) => match c.as_str() {
                "+" | "=" => Some(Self::ZoomIn),
                "-" | "_" => Some(Self::ZoomOut),
                "?" => Some(Self::ToggleShortcuts),
                _ => None,
            },
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format() {
        assert_eq!(Shortcut::new("Escape", false, "").format(), "Escape");
        assert_eq!(Shortcut::new("?", true, "").format(), "Shift+?");
    }

    #[test]
    fn test_key_mapping() {
        assert_eq!(
            KeyAction::from_key(&Key::Named(NamedKey::Escape)),
            Some(KeyAction::Escape)
        );
        assert_eq!(
            KeyAction::from_key(&Key::Named(NamedKey::Backspace)),
            Some(KeyAction::DeleteSelected)
        );
        assert_eq!(
            KeyAction::from_key(&Key::Character("=".into())),
            Some(KeyAction::ZoomIn)
        );
        assert_eq!(KeyAction::from_key(&Key::Character("x".into())), None);
    }
}
