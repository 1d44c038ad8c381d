// THEORY:
// The `controls` module holds everything the user can change while the loop runs:
// - `ViewParams`: the three slider values, read fresh at the top of every tick.
// - `Toggles`: which of the four channel plots are drawn.
// - `KeyMap`: a dispatch table from key codes to `Action`s, kept apart from the
//   render loop so bindings can be inspected and tested on their own.

use crate::core_modules::scanline::Channel;
use std::collections::HashMap;

pub const KEY_ESC: i32 = 27;

/// Upper end of every slider.
pub const TRACKBAR_MAX: i32 = 100;

/// Slider values as fractions in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewParams {
    /// Which row to sample, as a fraction of the frame height.
    pub row: f64,
    /// Pixels of plot height per unit of intensity.
    pub scale: f64,
    /// Uniform display scale applied to the finished canvas.
    pub resize: f64,
}

impl ViewParams {
    /// Converts slider positions (0..=100) into fractions, clamping out-of-range values.
    pub fn from_percent(row: i32, scale: i32, resize: i32) -> Self {
        let fraction = |value: i32| value.clamp(0, TRACKBAR_MAX) as f64 / TRACKBAR_MAX as f64;
        Self {
            row: fraction(row),
            scale: fraction(scale),
            resize: fraction(resize),
        }
    }
}

impl Default for ViewParams {
    fn default() -> Self {
        Self::from_percent(70, 40, 100)
    }
}

/// Which channel plots are visible. All on by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Toggles {
    pub red: bool,
    pub green: bool,
    pub blue: bool,
    pub luma: bool,
}

impl Toggles {
    pub fn is_shown(&self, channel: Channel) -> bool {
        match channel {
            Channel::Red => self.red,
            Channel::Green => self.green,
            Channel::Blue => self.blue,
            Channel::Luma => self.luma,
        }
    }

    /// Flips one channel and returns its new visibility.
    pub fn toggle(&mut self, channel: Channel) -> bool {
        let flag = match channel {
            Channel::Red => &mut self.red,
            Channel::Green => &mut self.green,
            Channel::Blue => &mut self.blue,
            Channel::Luma => &mut self.luma,
        };
        *flag = !*flag;
        *flag
    }
}

impl Default for Toggles {
    fn default() -> Self {
        Self {
            red: true,
            green: true,
            blue: true,
            luma: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Write the current frame to the snapshot path.
    Save,
    /// Leave the loop.
    Quit,
    /// Show or hide one channel plot.
    Toggle(Channel),
}

#[derive(Debug, Clone)]
pub struct KeyMap {
    bindings: HashMap<i32, Action>,
}

impl KeyMap {
    pub fn empty() -> Self {
        Self {
            bindings: HashMap::new(),
        }
    }

    pub fn bind(&mut self, key: i32, action: Action) -> &mut Self {
        self.bindings.insert(key, action);
        self
    }

    /// Looks up a key code exactly as the viewer reported it. Negative codes mean no
    /// key was pressed.
    pub fn lookup(&self, key: i32) -> Option<Action> {
        if key < 0 {
            return None;
        }
        self.bindings.get(&key).copied()
    }

    /// The help text printed at start-up.
    pub fn menu() -> &'static str {
        "Press:\n\
         s            : to save image\n\
         r, g, b, or k: to show colors\n\
         q or ESC     : to quit"
    }
}

impl Default for KeyMap {
    fn default() -> Self {
        let mut map = Self::empty();
        map.bind('s' as i32, Action::Save)
            .bind('q' as i32, Action::Quit)
            .bind(KEY_ESC, Action::Quit)
            .bind('r' as i32, Action::Toggle(Channel::Red))
            .bind('g' as i32, Action::Toggle(Channel::Green))
            .bind('b' as i32, Action::Toggle(Channel::Blue))
            .bind('k' as i32, Action::Toggle(Channel::Luma));
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_sliders_become_fractions() {
        let params = ViewParams::from_percent(70, 40, 100);
        assert!((params.row - 0.7).abs() < 1e-12);
        assert!((params.scale - 0.4).abs() < 1e-12);
        assert_eq!(params.resize, 1.0);
        assert_eq!(ViewParams::default(), params);
    }

    #[test]
    fn slider_values_are_clamped() {
        let params = ViewParams::from_percent(-5, 250, 0);
        assert_eq!(params.row, 0.0);
        assert_eq!(params.scale, 1.0);
        assert_eq!(params.resize, 0.0);
    }

    #[test]
    fn toggles_start_on_and_flip() {
        let mut toggles = Toggles::default();
        assert!(Channel::ALL.iter().all(|c| toggles.is_shown(*c)));

        assert!(!toggles.toggle(Channel::Green));
        assert!(!toggles.is_shown(Channel::Green));
        assert!(toggles.is_shown(Channel::Red));
        assert!(toggles.toggle(Channel::Green));
    }

    #[test]
    fn default_bindings() {
        let keys = KeyMap::default();
        assert_eq!(keys.lookup('s' as i32), Some(Action::Save));
        assert_eq!(keys.lookup('q' as i32), Some(Action::Quit));
        assert_eq!(keys.lookup(KEY_ESC), Some(Action::Quit));
        assert_eq!(keys.lookup('r' as i32), Some(Action::Toggle(Channel::Red)));
        assert_eq!(keys.lookup('g' as i32), Some(Action::Toggle(Channel::Green)));
        assert_eq!(keys.lookup('b' as i32), Some(Action::Toggle(Channel::Blue)));
        assert_eq!(keys.lookup('k' as i32), Some(Action::Toggle(Channel::Luma)));
    }

    #[test]
    fn unbound_and_absent_keys_do_nothing() {
        let keys = KeyMap::default();
        assert_eq!(keys.lookup(-1), None);
        assert_eq!(keys.lookup('x' as i32), None);
        assert_eq!(keys.lookup('Q' as i32), None);
    }

    #[test]
    fn wide_key_codes_do_not_alias_bindings() {
        let keys = KeyMap::default();
        // XK_Menu shares its low byte with 'g'.
        assert_eq!(keys.lookup(0xFF67), None);
        assert_eq!(keys.lookup(0x10_0000 | 'q' as i32), None);
    }

    #[test]
    fn custom_bindings_override() {
        let mut keys = KeyMap::default();
        keys.bind('x' as i32, Action::Quit).bind('s' as i32, Action::Toggle(Channel::Luma));
        assert_eq!(keys.lookup('x' as i32), Some(Action::Quit));
        assert_eq!(keys.lookup('s' as i32), Some(Action::Toggle(Channel::Luma)));
    }
}
