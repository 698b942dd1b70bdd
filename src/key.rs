//! Key bindings for table navigation.
//!
//! A [`Binding`] ties one or more key presses to a help entry. Bindings can
//! be built directly from crossterm key codes or with the option-style
//! helpers, which accept key names such as `"left"`, `"pgdown"` or
//! `"ctrl+a"`:
//!
//! ```rust
//! use table_controls::key::{self, Binding};
//! use crossterm::event::{KeyCode, KeyModifiers};
//! use bubbletea_rs::KeyMsg;
//!
//! let next = Binding::new(vec![KeyCode::Right, KeyCode::PageDown]).with_help("→", "next page");
//! let all = key::new_binding(vec![
//!     key::with_keys_str(&["ctrl+a"]),
//!     key::with_help("ctrl+a", "select all"),
//! ]);
//!
//! let msg = KeyMsg { key: KeyCode::Char('a'), modifiers: KeyModifiers::CONTROL };
//! assert!(all.matches(&msg));
//! assert!(!next.matches(&msg));
//! ```

use bubbletea_rs::KeyMsg;
use crossterm::event::{KeyCode, KeyModifiers};

/// One key press: a key code plus modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyPress {
    /// The key.
    pub code: KeyCode,
    /// Held modifiers.
    pub modifiers: KeyModifiers,
}

impl KeyPress {
    /// Returns true if `msg` is this key press. Shift is ignored for
    /// character keys, since the character already reflects it.
    pub fn matches(&self, msg: &KeyMsg) -> bool {
        if self.code != msg.key {
            return false;
        }
        match self.code {
            KeyCode::Char(_) => {
                let relevant = !KeyModifiers::SHIFT;
                self.modifiers & relevant == msg.modifiers & relevant
            }
            _ => self.modifiers == msg.modifiers,
        }
    }
}

impl From<KeyCode> for KeyPress {
    fn from(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: KeyModifiers::NONE,
        }
    }
}

impl From<(KeyCode, KeyModifiers)> for KeyPress {
    fn from((code, modifiers): (KeyCode, KeyModifiers)) -> Self {
        Self { code, modifiers }
    }
}

/// Parses a key name such as `"left"`, `"q"` or `"ctrl+a"`.
///
/// Returns `None` for names that do not describe a key.
pub fn parse_key(name: &str) -> Option<KeyPress> {
    let mut modifiers = KeyModifiers::NONE;
    let mut rest = name;
    loop {
        if let Some(r) = rest.strip_prefix("ctrl+") {
            modifiers |= KeyModifiers::CONTROL;
            rest = r;
        } else if let Some(r) = rest.strip_prefix("alt+") {
            modifiers |= KeyModifiers::ALT;
            rest = r;
        } else if let Some(r) = rest.strip_prefix("shift+") {
            modifiers |= KeyModifiers::SHIFT;
            rest = r;
        } else {
            break;
        }
    }

    let code = match rest {
        "up" => KeyCode::Up,
        "down" => KeyCode::Down,
        "left" => KeyCode::Left,
        "right" => KeyCode::Right,
        "pgup" => KeyCode::PageUp,
        "pgdown" => KeyCode::PageDown,
        "home" => KeyCode::Home,
        "end" => KeyCode::End,
        "enter" => KeyCode::Enter,
        "esc" => KeyCode::Esc,
        "tab" => KeyCode::Tab,
        "backspace" => KeyCode::Backspace,
        "delete" => KeyCode::Delete,
        "space" | " " => KeyCode::Char(' '),
        _ => {
            let mut chars = rest.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => KeyCode::Char(c),
                _ => return None,
            }
        }
    };
    Some(KeyPress { code, modifiers })
}

/// Help text of a binding.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Help {
    /// Short key label, e.g. `"→/l"`.
    pub key: String,
    /// What the key does.
    pub desc: String,
}

/// A set of key presses that trigger one action.
#[derive(Debug, Clone, Default)]
pub struct Binding {
    keys: Vec<KeyPress>,
    help: Help,
    disabled: bool,
}

impl Binding {
    /// Creates a binding from key codes or `(code, modifiers)` pairs.
    pub fn new<K: Into<KeyPress>>(keys: Vec<K>) -> Self {
        Self {
            keys: keys.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Sets the help text (builder pattern).
    pub fn with_help(mut self, key: impl Into<String>, desc: impl Into<String>) -> Self {
        self.help = Help {
            key: key.into(),
            desc: desc.into(),
        };
        self
    }

    /// The bound key presses.
    pub fn keys(&self) -> &[KeyPress] {
        &self.keys
    }

    /// The help text.
    pub fn help(&self) -> &Help {
        &self.help
    }

    /// Returns true unless the binding is disabled or has no keys.
    pub fn enabled(&self) -> bool {
        !self.disabled && !self.keys.is_empty()
    }

    /// Enables or disables the binding.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.disabled = !enabled;
    }

    /// Returns true if the binding is enabled and `msg` is one of its keys.
    pub fn matches(&self, msg: &KeyMsg) -> bool {
        self.enabled() && self.keys.iter().any(|key| key.matches(msg))
    }
}

/// Option applied by [`new_binding`].
pub type BindingOpt = Box<dyn FnOnce(&mut Binding)>;

/// Creates a binding from a list of options.
pub fn new_binding(opts: Vec<BindingOpt>) -> Binding {
    let mut binding = Binding::default();
    for opt in opts {
        opt(&mut binding);
    }
    binding
}

/// Option: bind the named keys. Unknown names are skipped.
pub fn with_keys_str(names: &[&str]) -> BindingOpt {
    let keys: Vec<KeyPress> = names
        .iter()
        .filter_map(|name| {
            let key = parse_key(name);
            if key.is_none() {
                log::warn!("ignoring unknown key name `{name}`");
            }
            key
        })
        .collect();
    Box::new(move |binding| binding.keys = keys)
}

/// Option: set the help text.
pub fn with_help(key: impl Into<String>, desc: impl Into<String>) -> BindingOpt {
    let help = Help {
        key: key.into(),
        desc: desc.into(),
    };
    Box::new(move |binding| binding.help = help)
}

/// Option: start disabled.
pub fn with_disabled() -> BindingOpt {
    Box::new(|binding| binding.disabled = true)
}

/// Bindings a component exposes for help views.
pub trait KeyMap {
    /// Bindings for the one-line help.
    fn short_help(&self) -> Vec<&Binding>;

    /// Bindings for the expanded help, grouped in columns.
    fn full_help(&self) -> Vec<Vec<&Binding>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn msg(key: KeyCode, modifiers: KeyModifiers) -> KeyMsg {
        KeyMsg { key, modifiers }
    }

    #[test]
    fn test_parse_key_names() {
        assert_eq!(parse_key("left"), Some(KeyPress::from(KeyCode::Left)));
        assert_eq!(parse_key("pgdown"), Some(KeyPress::from(KeyCode::PageDown)));
        assert_eq!(parse_key("x"), Some(KeyPress::from(KeyCode::Char('x'))));
        assert_eq!(
            parse_key("ctrl+a"),
            Some(KeyPress::from((KeyCode::Char('a'), KeyModifiers::CONTROL)))
        );
        assert_eq!(parse_key("hyper"), None);
        assert_eq!(parse_key(""), None);
    }

    #[test]
    fn test_modifiers_must_match() {
        let binding = Binding::new(vec![(KeyCode::Char('a'), KeyModifiers::CONTROL)]);
        assert!(binding.matches(&msg(KeyCode::Char('a'), KeyModifiers::CONTROL)));
        assert!(!binding.matches(&msg(KeyCode::Char('a'), KeyModifiers::NONE)));
    }

    #[test]
    fn test_shift_is_ignored_for_characters() {
        let binding = Binding::new(vec![KeyCode::Char('A')]);
        assert!(binding.matches(&msg(KeyCode::Char('A'), KeyModifiers::SHIFT)));
    }

    #[test]
    fn test_disabled_binding_never_matches() {
        let mut binding = new_binding(vec![with_keys_str(&["right"]), with_disabled()]);
        assert!(!binding.matches(&msg(KeyCode::Right, KeyModifiers::NONE)));
        binding.set_enabled(true);
        assert!(binding.matches(&msg(KeyCode::Right, KeyModifiers::NONE)));
    }

    #[test]
    fn test_option_builder_sets_help() {
        let binding = new_binding(vec![with_keys_str(&["l", "bogus"]), with_help("l", "next")]);
        assert_eq!(binding.keys().len(), 1);
        assert_eq!(binding.help().desc, "next");
    }
}
