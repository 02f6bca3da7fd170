//! Host input decoding
//!
//! Translates crossterm key events into engine intents and host commands.
//! The engine itself never sees raw key events; it polls an attached
//! `InputSource`, which here is a queue the host pushes into.

use crate::game::{InputSource, Intent};
use crate::settings::Settings;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

/// What a key press means to the host loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostAction {
    /// Forwarded to the session
    Intent(Intent),
    Pause,
    Quit,
}

/// Key bindings resolved to key codes; supports multiple keys per action
#[derive(Debug, Clone)]
pub struct KeyMap {
    move_left: Vec<KeyCode>,
    move_right: Vec<KeyCode>,
    soft_drop: Vec<KeyCode>,
    hard_drop: Vec<KeyCode>,
    rotate: Vec<KeyCode>,
    pause: Vec<KeyCode>,
    quit: Vec<KeyCode>,
}

impl KeyMap {
    /// Parse a key string into a KeyCode
    fn parse_key(s: &str) -> KeyCode {
        match s.to_lowercase().as_str() {
            "left" => KeyCode::Left,
            "right" => KeyCode::Right,
            "up" => KeyCode::Up,
            "down" => KeyCode::Down,
            "space" => KeyCode::Char(' '),
            "enter" => KeyCode::Enter,
            "tab" => KeyCode::Tab,
            "esc" | "escape" => KeyCode::Esc,
            s if s.len() == 1 => KeyCode::Char(s.chars().next().unwrap()),
            _ => KeyCode::Char(' '), // fallback
        }
    }

    fn parse_keys(keys: &[String]) -> Vec<KeyCode> {
        keys.iter().map(|s| Self::parse_key(s)).collect()
    }

    /// Create a key map from settings
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            move_left: Self::parse_keys(&settings.keys.move_left),
            move_right: Self::parse_keys(&settings.keys.move_right),
            soft_drop: Self::parse_keys(&settings.keys.soft_drop),
            hard_drop: Self::parse_keys(&settings.keys.hard_drop),
            rotate: Self::parse_keys(&settings.keys.rotate),
            pause: Self::parse_keys(&settings.keys.pause),
            quit: Self::parse_keys(&settings.keys.quit),
        }
    }

    /// Decode a key event into a host action
    pub fn decode(&self, key: KeyEvent) -> Option<HostAction> {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Some(HostAction::Quit);
        }

        let code = normalize_key(key.code);
        if self.move_left.contains(&code) {
            Some(HostAction::Intent(Intent::MoveLeft))
        } else if self.move_right.contains(&code) {
            Some(HostAction::Intent(Intent::MoveRight))
        } else if self.soft_drop.contains(&code) {
            Some(HostAction::Intent(Intent::SoftDrop))
        } else if self.hard_drop.contains(&code) {
            Some(HostAction::Intent(Intent::HardDrop))
        } else if self.rotate.contains(&code) {
            Some(HostAction::Intent(Intent::Rotate))
        } else if self.pause.contains(&code) {
            Some(HostAction::Pause)
        } else if self.quit.contains(&code) {
            Some(HostAction::Quit)
        } else {
            None
        }
    }
}

impl Default for KeyMap {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

/// Normalize key codes for consistent matching
fn normalize_key(code: KeyCode) -> KeyCode {
    match code {
        KeyCode::Char(c) => KeyCode::Char(c.to_ascii_lowercase()),
        other => other,
    }
}

/// Shared intent queue: the host pushes decoded intents, the session drains
/// them through its attached `InputSource` on each `advance`
#[derive(Clone, Default)]
pub struct IntentQueue(Rc<RefCell<VecDeque<Intent>>>);

impl IntentQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, intent: Intent) {
        self.0.borrow_mut().push_back(intent);
    }

    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }
}

impl InputSource for IntentQueue {
    fn poll_intent(&mut self) -> Option<Intent> {
        self.0.borrow_mut().pop_front()
    }
}
