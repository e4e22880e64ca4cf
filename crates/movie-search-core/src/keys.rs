/// Global shortcuts the session reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutAction {
    /// Focus the query field and clear it
    FocusSearch,
    /// Close the open detail pane
    CloseDetail,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyBindings {
    focus_search: String,
    close_detail: String,
}

impl KeyBindings {
    pub fn new(focus_search: impl Into<String>, close_detail: impl Into<String>) -> Self {
        Self {
            focus_search: focus_search.into(),
            close_detail: close_detail.into(),
        }
    }

    /// Maps a key code to its action. Codes compare case-insensitively, and
    /// the focus key is ignored while the query field already has focus.
    pub fn resolve(&self, code: &str, query_focused: bool) -> Option<ShortcutAction> {
        if code.eq_ignore_ascii_case(&self.close_detail) {
            Some(ShortcutAction::CloseDetail)
        } else if code.eq_ignore_ascii_case(&self.focus_search) && !query_focused {
            Some(ShortcutAction::FocusSearch)
        } else {
            None
        }
    }
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self::new("Enter", "Escape")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_bindings() {
        let keys = KeyBindings::default();
        assert_eq!(keys.resolve("escape", false), Some(ShortcutAction::CloseDetail));
        assert_eq!(keys.resolve("Escape", true), Some(ShortcutAction::CloseDetail));
        assert_eq!(keys.resolve("ENTER", false), Some(ShortcutAction::FocusSearch));
        assert_eq!(keys.resolve("a", false), None);
    }

    #[test]
    fn test_focus_ignored_while_typing() {
        let keys = KeyBindings::default();
        assert_eq!(keys.resolve("Enter", true), None);
    }
}
