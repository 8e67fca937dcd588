//! Input handling for UI.
//!
//! Two halves:
//! - [`InputState`] is filled by the host's input backend while it pumps
//!   device events. It only records raw facts.
//! - [`InputSnapshot`] is derived from it exactly once per frame by an
//!   [`InputTracker`] and is immutable afterwards. Every widget in the frame
//!   reads the same snapshot, so no widget sees input change mid-frame.

use crate::config::UiConfig;
use vellum_core::Vec2;

/// Mouse button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    /// Left mouse button.
    Left,
    /// Right mouse button.
    Right,
    /// Middle mouse button (scroll wheel click).
    Middle,
}

impl MouseButton {
    /// All tracked buttons.
    pub const ALL: [Self; 3] = [Self::Left, Self::Right, Self::Middle];

    /// Dense index, `0..3`.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Left => 0,
            Self::Right => 1,
            Self::Middle => 2,
        }
    }

    /// Returns the bit mask for a button.
    const fn mask(self) -> u8 {
        1 << self.index()
    }
}

/// Keyboard key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum Key {
    /// Escape key.
    Escape,
    /// Enter/Return key.
    Enter,
    /// Tab key.
    Tab,
    /// Backspace key.
    Backspace,
    /// Delete key.
    Delete,
    /// Arrow up.
    Up,
    /// Arrow down.
    Down,
    /// Arrow left.
    Left,
    /// Arrow right.
    Right,
    /// Home key.
    Home,
    /// End key.
    End,
    /// Page up.
    PageUp,
    /// Page down.
    PageDown,
    /// Space bar.
    Space,
    A, B, C, D, E, F, G, H, I, J, K, L, M,
    N, O, P, Q, R, S, T, U, V, W, X, Y, Z,
    Num0, Num1, Num2, Num3, Num4, Num5, Num6, Num7, Num8, Num9,
    F1, F2, F3, F4, F5, F6, F7, F8, F9, F10, F11, F12,
}

/// Modifier keys state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    /// Shift key is held.
    pub shift: bool,
    /// Control key is held.
    pub ctrl: bool,
    /// Alt key is held.
    pub alt: bool,
    /// Super/Command key is held.
    pub super_key: bool,
}

impl Modifiers {
    /// No modifier held.
    pub const NONE: Self = Self {
        shift: false,
        ctrl: false,
        alt: false,
        super_key: false,
    };

    /// Returns true if no modifier is held.
    #[must_use]
    pub const fn is_none(self) -> bool {
        !(self.shift || self.ctrl || self.alt || self.super_key)
    }
}

/// Raw input collected by the host between two frames.
#[derive(Debug, Clone, Default)]
pub struct InputState {
    /// Pointer position, `None` while the pointer is outside the surface.
    mouse_pos: Option<Vec2>,
    /// Mouse buttons pressed since the last frame.
    buttons_pressed: u8,
    /// Mouse buttons released since the last frame.
    buttons_released: u8,
    /// Mouse buttons currently held.
    buttons_down: u8,
    /// Mouse scroll delta (x, y), positive y scrolls up.
    scroll_delta: Vec2,
    /// Modifier keys state.
    modifiers: Modifiers,
    /// Keys pressed since the last frame.
    keys_pressed: Vec<Key>,
    /// Keys released since the last frame.
    keys_released: Vec<Key>,
    /// Keys currently held.
    keys_down: Vec<Key>,
    /// Text typed since the last frame.
    text_input: String,
}

impl InputState {
    /// Creates a new empty input state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears edge events after the frame that consumed them.
    ///
    /// Held buttons, held keys and pointer position persist.
    pub fn clear_events(&mut self) {
        self.buttons_pressed = 0;
        self.buttons_released = 0;
        self.scroll_delta = Vec2::ZERO;
        self.keys_pressed.clear();
        self.keys_released.clear();
        self.text_input.clear();
    }

    /// Updates mouse position.
    pub fn set_mouse_pos(&mut self, x: f32, y: f32) {
        self.mouse_pos = Some(Vec2::new(x, y));
    }

    /// Marks the pointer as having left the surface.
    pub fn clear_mouse_pos(&mut self) {
        self.mouse_pos = None;
    }

    /// Records a mouse button press.
    pub fn mouse_button_down(&mut self, button: MouseButton) {
        let mask = button.mask();
        self.buttons_pressed |= mask;
        self.buttons_down |= mask;
    }

    /// Records a mouse button release.
    pub fn mouse_button_up(&mut self, button: MouseButton) {
        let mask = button.mask();
        self.buttons_released |= mask;
        self.buttons_down &= !mask;
    }

    /// Records scroll input.
    pub fn scroll(&mut self, dx: f32, dy: f32) {
        self.scroll_delta.x += dx;
        self.scroll_delta.y += dy;
    }

    /// Replaces the modifier state.
    pub fn set_modifiers(&mut self, modifiers: Modifiers) {
        self.modifiers = modifiers;
    }

    /// Records a key press.
    pub fn key_down(&mut self, key: Key) {
        if !self.keys_down.contains(&key) {
            self.keys_pressed.push(key);
            self.keys_down.push(key);
        }
    }

    /// Records a key release.
    pub fn key_up(&mut self, key: Key) {
        self.keys_released.push(key);
        self.keys_down.retain(|&k| k != key);
    }

    /// Records text input.
    pub fn text(&mut self, text: &str) {
        self.text_input.push_str(text);
    }

    /// Returns the recorded pointer position.
    #[must_use]
    pub fn mouse_pos(&self) -> Option<Vec2> {
        self.mouse_pos
    }
}

/// Derived per-frame state of one mouse button.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ButtonState {
    /// Held at the end of the event batch.
    pub down: bool,
    /// Went down this frame.
    pub pressed: bool,
    /// Went up this frame.
    pub released: bool,
    /// This press completed a double-click.
    pub double_clicked: bool,
    /// Seconds held, or -1 when up.
    pub down_duration: f32,
    /// Pointer position at the last press.
    pub clicked_pos: Vec2,
    /// Largest squared distance from `clicked_pos` while held.
    pub drag_max_distance_sqr: f32,
}

impl Default for ButtonState {
    fn default() -> Self {
        Self {
            down: false,
            pressed: false,
            released: false,
            double_clicked: false,
            down_duration: -1.0,
            clicked_pos: Vec2::ZERO,
            drag_max_distance_sqr: 0.0,
        }
    }
}

/// Derived per-frame state of one key.
#[derive(Debug, Clone, Copy, PartialEq)]
struct KeyState {
    key: Key,
    down: bool,
    pressed: bool,
    released: bool,
    /// Seconds held, or -1 when up.
    down_duration: f32,
    /// `down_duration` of the previous frame.
    prev_down_duration: f32,
}

/// One frame's immutable view of the input.
#[derive(Debug, Clone)]
pub struct InputSnapshot {
    mouse_pos: Option<Vec2>,
    mouse_delta: Vec2,
    wheel: Vec2,
    modifiers: Modifiers,
    buttons: [ButtonState; 3],
    keys: Vec<KeyState>,
    text: String,
    time: f64,
    dt: f32,
    drag_threshold: f32,
    repeat_delay: f32,
    repeat_rate: f32,
}

impl Default for InputSnapshot {
    fn default() -> Self {
        let config = UiConfig::default();
        Self {
            mouse_pos: None,
            mouse_delta: Vec2::ZERO,
            wheel: Vec2::ZERO,
            modifiers: Modifiers::NONE,
            buttons: [ButtonState::default(); 3],
            keys: Vec::new(),
            text: String::new(),
            time: 0.0,
            dt: 0.0,
            drag_threshold: config.drag_threshold,
            repeat_delay: config.key_repeat_delay,
            repeat_rate: config.key_repeat_rate,
        }
    }
}

impl InputSnapshot {
    /// Pointer position, `None` when the pointer is not over the surface.
    #[must_use]
    pub fn mouse_pos(&self) -> Option<Vec2> {
        self.mouse_pos
    }

    /// Pointer movement since the previous frame.
    #[must_use]
    pub fn mouse_delta(&self) -> Vec2 {
        self.mouse_delta
    }

    /// Wheel movement this frame.
    #[must_use]
    pub fn wheel(&self) -> Vec2 {
        self.wheel
    }

    /// Modifier state.
    #[must_use]
    pub fn modifiers(&self) -> Modifiers {
        self.modifiers
    }

    /// Full derived state of a button.
    #[must_use]
    pub fn button(&self, button: MouseButton) -> &ButtonState {
        &self.buttons[button.index()]
    }

    /// Returns true if the mouse button is currently held.
    #[must_use]
    pub fn mouse_down(&self, button: MouseButton) -> bool {
        self.button(button).down
    }

    /// Returns true if the mouse button went down this frame.
    #[must_use]
    pub fn mouse_pressed(&self, button: MouseButton) -> bool {
        self.button(button).pressed
    }

    /// Returns true if the mouse button went up this frame.
    #[must_use]
    pub fn mouse_released(&self, button: MouseButton) -> bool {
        self.button(button).released
    }

    /// Returns true if this frame's press completed a double-click.
    #[must_use]
    pub fn mouse_double_clicked(&self, button: MouseButton) -> bool {
        self.button(button).double_clicked
    }

    /// Returns true if any button is held.
    #[must_use]
    pub fn any_mouse_down(&self) -> bool {
        self.buttons.iter().any(|b| b.down)
    }

    /// Returns true if the button is held and the pointer travelled at least
    /// `threshold` pixels from the press position.
    ///
    /// A negative threshold uses the configured default.
    #[must_use]
    pub fn is_mouse_dragging(&self, button: MouseButton, threshold: f32) -> bool {
        let state = self.button(button);
        if !state.down {
            return false;
        }
        let threshold = if threshold < 0.0 { self.drag_threshold } else { threshold };
        state.drag_max_distance_sqr >= threshold * threshold
    }

    /// Pointer offset from the press position while dragging, otherwise zero.
    #[must_use]
    pub fn mouse_drag_delta(&self, button: MouseButton, threshold: f32) -> Vec2 {
        match self.mouse_pos {
            Some(pos) if self.is_mouse_dragging(button, threshold) => pos - self.button(button).clicked_pos,
            _ => Vec2::ZERO,
        }
    }

    fn key(&self, key: Key) -> Option<&KeyState> {
        self.keys.iter().find(|k| k.key == key)
    }

    /// Returns true if the key is currently held.
    #[must_use]
    pub fn key_down(&self, key: Key) -> bool {
        self.key(key).is_some_and(|k| k.down)
    }

    /// Returns true if the key went down this frame.
    #[must_use]
    pub fn key_pressed(&self, key: Key) -> bool {
        self.key(key).is_some_and(|k| k.pressed)
    }

    /// Returns true if the key went down this frame or auto-repeated.
    #[must_use]
    pub fn key_pressed_repeat(&self, key: Key) -> bool {
        let Some(state) = self.key(key) else {
            return false;
        };
        if state.pressed {
            return true;
        }
        if !state.down {
            return false;
        }
        repeat_count(
            state.prev_down_duration,
            state.down_duration,
            self.repeat_delay,
            self.repeat_rate,
        ) > 0
    }

    /// Returns true if the key went up this frame.
    #[must_use]
    pub fn key_released(&self, key: Key) -> bool {
        self.key(key).is_some_and(|k| k.released)
    }

    /// Text typed this frame, with control characters removed.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Seconds since the tracker was created.
    #[must_use]
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Seconds since the previous frame.
    #[must_use]
    pub fn dt(&self) -> f32 {
        self.dt
    }
}

/// Number of typematic repeats between two hold durations.
fn repeat_count(t0: f32, t1: f32, delay: f32, rate: f32) -> u32 {
    if t1 <= delay || rate <= 0.0 {
        return 0;
    }
    // floor counts of repeat ticks passed, the first tick landing exactly at `delay`
    let ticks = |t: f32| -> i64 {
        if t < delay {
            -1
        } else {
            ((t - delay) / rate).floor() as i64
        }
    };
    u32::try_from((ticks(t1) - ticks(t0)).max(0)).unwrap_or(u32::MAX)
}

/// Derives snapshots from raw input, carrying the history needed for edges,
/// double-clicks, drags and key repeat.
#[derive(Debug, Clone)]
pub struct InputTracker {
    prev: InputSnapshot,
    last_click_time: [f64; 3],
    last_click_pos: [Vec2; 3],
    time: f64,
}

impl InputTracker {
    /// Smallest frame delta accepted; anything below is treated as invalid.
    pub const MIN_DT: f32 = 1.0e-5;

    /// Creates a tracker with no history.
    #[must_use]
    pub fn new() -> Self {
        Self {
            prev: InputSnapshot::default(),
            last_click_time: [f64::NEG_INFINITY; 3],
            last_click_pos: [Vec2::ZERO; 3],
            time: 0.0,
        }
    }

    /// Returns the snapshot produced by the last capture.
    #[must_use]
    pub fn last(&self) -> &InputSnapshot {
        &self.prev
    }

    /// Derives this frame's snapshot from `raw`.
    pub fn capture(&mut self, raw: &InputState, dt: f32, config: &UiConfig) -> InputSnapshot {
        let dt = if dt.is_finite() && dt >= Self::MIN_DT {
            dt
        } else {
            tracing::warn!(dt, "invalid frame delta, clamped");
            Self::MIN_DT
        };
        self.time += f64::from(dt);

        let mouse_pos = raw.mouse_pos.filter(|p| p.is_finite());
        if raw.mouse_pos.is_some() && mouse_pos.is_none() {
            tracing::warn!("non-finite pointer position ignored");
        }
        let mouse_delta = match (mouse_pos, self.prev.mouse_pos) {
            (Some(now), Some(before)) => now - before,
            _ => Vec2::ZERO,
        };
        let wheel = if raw.scroll_delta.is_finite() {
            raw.scroll_delta
        } else {
            tracing::warn!("non-finite wheel delta ignored");
            Vec2::ZERO
        };

        let mut buttons = [ButtonState::default(); 3];
        for button in MouseButton::ALL {
            buttons[button.index()] = self.capture_button(raw, button, mouse_pos, dt, config);
        }

        let keys = self.capture_keys(raw, dt);
        let text: String = raw.text_input.chars().filter(|c| !c.is_control()).collect();

        let snapshot = InputSnapshot {
            mouse_pos,
            mouse_delta,
            wheel,
            modifiers: raw.modifiers,
            buttons,
            keys,
            text,
            time: self.time,
            dt,
            drag_threshold: config.drag_threshold,
            repeat_delay: config.key_repeat_delay,
            repeat_rate: config.key_repeat_rate,
        };
        self.prev = snapshot.clone();
        snapshot
    }

    fn capture_button(
        &mut self,
        raw: &InputState,
        button: MouseButton,
        mouse_pos: Option<Vec2>,
        dt: f32,
        config: &UiConfig,
    ) -> ButtonState {
        let i = button.index();
        let prev = self.prev.buttons[i];
        let raw_down = raw.buttons_down & button.mask() != 0;
        let raw_pressed = raw.buttons_pressed & button.mask() != 0;
        let raw_released = raw.buttons_released & button.mask() != 0;

        let mut state = ButtonState {
            down: raw_down,
            pressed: raw_pressed || (raw_down && !prev.down),
            released: raw_released && (prev.down || raw_pressed) || (!raw_down && prev.down),
            double_clicked: false,
            down_duration: if raw_down {
                if prev.down_duration >= 0.0 && !raw_pressed {
                    prev.down_duration + dt
                } else {
                    0.0
                }
            } else {
                -1.0
            },
            clicked_pos: prev.clicked_pos,
            drag_max_distance_sqr: prev.drag_max_distance_sqr,
        };

        if state.pressed {
            let pos = mouse_pos.unwrap_or(prev.clicked_pos);
            let since_last = self.time - self.last_click_time[i];
            let travel = (pos - self.last_click_pos[i]).length();
            if since_last < f64::from(config.double_click_time) && travel < config.double_click_max_dist {
                state.double_clicked = true;
                // a third click starts a new pair
                self.last_click_time[i] = f64::NEG_INFINITY;
            } else {
                self.last_click_time[i] = self.time;
            }
            self.last_click_pos[i] = pos;
            state.clicked_pos = pos;
            state.drag_max_distance_sqr = 0.0;
        }

        if state.down || state.released {
            if let Some(pos) = mouse_pos {
                let travel = (pos - state.clicked_pos).length_squared();
                state.drag_max_distance_sqr = state.drag_max_distance_sqr.max(travel);
            }
        }

        state
    }

    fn capture_keys(&self, raw: &InputState, dt: f32) -> Vec<KeyState> {
        let mut keys: Vec<KeyState> = Vec::with_capacity(raw.keys_down.len() + raw.keys_released.len());
        let mut seen = |key: Key, keys: &mut Vec<KeyState>| {
            if keys.iter().any(|k| k.key == key) {
                return;
            }
            let prev = self.prev.key(key).copied();
            let prev_down = prev.is_some_and(|k| k.down);
            let prev_duration = prev.map_or(-1.0, |k| k.down_duration);
            let down = raw.keys_down.contains(&key);
            let raw_pressed = raw.keys_pressed.contains(&key);
            let pressed = raw_pressed || (down && !prev_down);
            let released = raw.keys_released.contains(&key) || (!down && prev_down);
            let down_duration = if down {
                if prev_duration >= 0.0 && !pressed {
                    prev_duration + dt
                } else {
                    0.0
                }
            } else {
                -1.0
            };
            keys.push(KeyState {
                key,
                down,
                pressed,
                released,
                down_duration,
                prev_down_duration: prev_duration,
            });
        };

        for &key in raw.keys_down.iter().chain(&raw.keys_pressed).chain(&raw.keys_released) {
            seen(key, &mut keys);
        }
        for prev in &self.prev.keys {
            if prev.down {
                seen(prev.key, &mut keys);
            }
        }
        keys
    }
}

impl Default for InputTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    fn capture(tracker: &mut InputTracker, raw: &mut InputState) -> InputSnapshot {
        let snap = tracker.capture(raw, DT, &UiConfig::default());
        raw.clear_events();
        snap
    }

    #[test]
    fn test_mouse_click() {
        let mut tracker = InputTracker::new();
        let mut input = InputState::new();
        input.set_mouse_pos(10.0, 10.0);

        input.mouse_button_down(MouseButton::Left);
        let snap = capture(&mut tracker, &mut input);
        assert!(snap.mouse_pressed(MouseButton::Left));
        assert!(snap.mouse_down(MouseButton::Left));

        let snap = capture(&mut tracker, &mut input);
        assert!(!snap.mouse_pressed(MouseButton::Left));
        assert!(snap.mouse_down(MouseButton::Left));

        input.mouse_button_up(MouseButton::Left);
        let snap = capture(&mut tracker, &mut input);
        assert!(snap.mouse_released(MouseButton::Left));
        assert!(!snap.mouse_down(MouseButton::Left));
    }

    #[test]
    fn test_press_and_release_in_one_frame() {
        let mut tracker = InputTracker::new();
        let mut input = InputState::new();
        input.set_mouse_pos(10.0, 10.0);

        input.mouse_button_down(MouseButton::Left);
        input.mouse_button_up(MouseButton::Left);
        let snap = capture(&mut tracker, &mut input);

        assert!(snap.mouse_pressed(MouseButton::Left));
        assert!(snap.mouse_released(MouseButton::Left));
        assert!(!snap.mouse_down(MouseButton::Left));
    }

    #[test]
    fn test_double_click() {
        let mut tracker = InputTracker::new();
        let mut input = InputState::new();
        input.set_mouse_pos(10.0, 10.0);

        input.mouse_button_down(MouseButton::Left);
        input.mouse_button_up(MouseButton::Left);
        let first = capture(&mut tracker, &mut input);
        assert!(!first.mouse_double_clicked(MouseButton::Left));

        input.mouse_button_down(MouseButton::Left);
        let second = capture(&mut tracker, &mut input);
        assert!(second.mouse_double_clicked(MouseButton::Left));
    }

    #[test]
    fn test_drag_threshold() {
        let mut tracker = InputTracker::new();
        let mut input = InputState::new();
        input.set_mouse_pos(0.0, 0.0);
        input.mouse_button_down(MouseButton::Left);
        capture(&mut tracker, &mut input);

        input.set_mouse_pos(3.0, 0.0);
        let snap = capture(&mut tracker, &mut input);
        assert!(!snap.is_mouse_dragging(MouseButton::Left, -1.0));
        assert_eq!(snap.mouse_delta(), Vec2::new(3.0, 0.0));

        input.set_mouse_pos(10.0, 0.0);
        let snap = capture(&mut tracker, &mut input);
        assert!(snap.is_mouse_dragging(MouseButton::Left, -1.0));
        assert_eq!(snap.mouse_drag_delta(MouseButton::Left, -1.0), Vec2::new(10.0, 0.0));

        // moving back keeps the max distance
        input.set_mouse_pos(0.0, 0.0);
        let snap = capture(&mut tracker, &mut input);
        assert!(snap.is_mouse_dragging(MouseButton::Left, -1.0));
    }

    #[test]
    fn test_key_repeat() {
        let mut tracker = InputTracker::new();
        let mut input = InputState::new();
        input.key_down(Key::Backspace);
        let snap = capture(&mut tracker, &mut input);
        assert!(snap.key_pressed_repeat(Key::Backspace));

        // held through the repeat delay: at least one repeat fires
        let mut repeats = 0;
        for _ in 0..60 {
            let snap = capture(&mut tracker, &mut input);
            assert!(!snap.key_pressed(Key::Backspace));
            if snap.key_pressed_repeat(Key::Backspace) {
                repeats += 1;
            }
        }
        assert!(repeats > 5, "expected typematic repeats, got {repeats}");

        input.key_up(Key::Backspace);
        let snap = capture(&mut tracker, &mut input);
        assert!(snap.key_released(Key::Backspace));
        assert!(!snap.key_down(Key::Backspace));
    }

    #[test]
    fn test_invalid_values_are_sanitized() {
        let mut tracker = InputTracker::new();
        let mut input = InputState::new();
        input.set_mouse_pos(f32::NAN, 4.0);
        input.scroll(f32::INFINITY, 0.0);
        input.text("a\u{7}b\n");

        let snap = tracker.capture(&input, -1.0, &UiConfig::default());
        assert_eq!(snap.mouse_pos(), None);
        assert_eq!(snap.wheel(), Vec2::ZERO);
        assert_eq!(snap.text(), "ab");
        assert!(snap.dt() > 0.0);
    }

    #[test]
    fn test_repeat_count() {
        assert_eq!(repeat_count(0.0, 0.1, 0.25, 0.05), 0);
        assert_eq!(repeat_count(0.24, 0.26, 0.25, 0.05), 1);
        assert_eq!(repeat_count(0.26, 0.27, 0.25, 0.05), 0);
        assert_eq!(repeat_count(0.29, 0.31, 0.25, 0.05), 1);
    }
}
