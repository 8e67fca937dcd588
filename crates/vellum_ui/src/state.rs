//! Persistent per-widget state.
//!
//! Widgets are re-declared every frame and own nothing between frames. The few
//! that need memory (open tree nodes, drag origins, text cursors, fades) keep a
//! small record here, keyed by their [`WidgetId`]. Records are created on first
//! use and evicted once they have gone untouched for a configured number of
//! frames.
//!
//! Lookups always go through the id, so a widget that opens a nested popup
//! mid-frame never holds a reference into the table across the call.

use crate::animation::Animation;
use std::collections::hash_map::Entry as MapEntry;
use std::collections::HashMap;
use vellum_core::{Vec2, WidgetId};

/// Open/closed flag of tree nodes and collapsing headers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ToggleState {
    /// Node is expanded.
    pub open: bool,
}

/// Values captured when a drag starts.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DragState {
    /// Widget value at the press.
    pub start_value: f32,
    /// Pointer position at the press.
    pub start_mouse: Vec2,
}

/// Cursor and selection of a text field.
///
/// Offsets are byte indices into the edited string and are always kept on
/// `char` boundaries.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TextEditState {
    /// Caret position.
    pub cursor: usize,
    /// Other end of the selection, if any.
    pub anchor: Option<usize>,
    /// Horizontal scroll of the visible text.
    pub scroll_x: f32,
}

fn floor_boundary(text: &str, mut index: usize) -> usize {
    index = index.min(text.len());
    while !text.is_char_boundary(index) {
        index -= 1;
    }
    index
}

fn prev_boundary(text: &str, index: usize) -> usize {
    text[..index].char_indices().next_back().map_or(0, |(i, _)| i)
}

fn next_boundary(text: &str, index: usize) -> usize {
    text[index..].chars().next().map_or(index, |c| index + c.len_utf8())
}

impl TextEditState {
    /// Pulls offsets back inside `text` and onto char boundaries.
    pub fn clamp(&mut self, text: &str) {
        self.cursor = floor_boundary(text, self.cursor);
        self.anchor = self.anchor.map(|a| floor_boundary(text, a));
    }

    /// Selected byte range, if non-empty.
    #[must_use]
    pub fn selection(&self) -> Option<(usize, usize)> {
        let anchor = self.anchor?;
        (anchor != self.cursor).then(|| (anchor.min(self.cursor), anchor.max(self.cursor)))
    }

    /// Selects the whole text.
    pub fn select_all(&mut self, text: &str) {
        self.anchor = Some(0);
        self.cursor = text.len();
    }

    /// Removes the selection. Returns true if anything was removed.
    pub fn delete_selection(&mut self, text: &mut String) -> bool {
        let Some((start, end)) = self.selection() else {
            self.anchor = None;
            return false;
        };
        text.replace_range(start..end, "");
        self.cursor = start;
        self.anchor = None;
        true
    }

    /// Inserts `input` at the caret, replacing the selection.
    ///
    /// Characters that would push the text past `max_len` bytes are dropped.
    /// Returns true if the text changed.
    pub fn insert(&mut self, text: &mut String, input: &str, max_len: usize) -> bool {
        let mut changed = self.delete_selection(text);
        for c in input.chars() {
            if text.len() + c.len_utf8() > max_len {
                break;
            }
            text.insert(self.cursor, c);
            self.cursor += c.len_utf8();
            changed = true;
        }
        changed
    }

    /// Deletes the selection or the character before the caret.
    pub fn backspace(&mut self, text: &mut String) -> bool {
        if self.delete_selection(text) {
            return true;
        }
        if self.cursor == 0 {
            return false;
        }
        let start = prev_boundary(text, self.cursor);
        text.replace_range(start..self.cursor, "");
        self.cursor = start;
        true
    }

    /// Deletes the selection or the character after the caret.
    pub fn delete(&mut self, text: &mut String) -> bool {
        if self.delete_selection(text) {
            return true;
        }
        if self.cursor >= text.len() {
            return false;
        }
        let end = next_boundary(text, self.cursor);
        text.replace_range(self.cursor..end, "");
        true
    }

    fn move_to(&mut self, index: usize, select: bool) {
        if select {
            self.anchor.get_or_insert(self.cursor);
        } else {
            self.anchor = None;
        }
        self.cursor = index;
    }

    /// Moves the caret one character left.
    pub fn move_left(&mut self, text: &str, select: bool) {
        match self.selection() {
            Some((start, _)) if !select => self.move_to(start, false),
            _ => self.move_to(prev_boundary(text, self.cursor), select),
        }
    }

    /// Moves the caret one character right.
    pub fn move_right(&mut self, text: &str, select: bool) {
        match self.selection() {
            Some((_, end)) if !select => self.move_to(end, false),
            _ => self.move_to(next_boundary(text, self.cursor), select),
        }
    }

    /// Moves the caret to the start.
    pub fn move_home(&mut self, select: bool) {
        self.move_to(0, select);
    }

    /// Moves the caret to the end.
    pub fn move_end(&mut self, text: &str, select: bool) {
        self.move_to(text.len(), select);
    }
}

/// A persistent record.
#[derive(Debug, Clone, PartialEq)]
pub enum WidgetState {
    /// See [`ToggleState`].
    Toggle(ToggleState),
    /// See [`DragState`].
    Drag(DragState),
    /// See [`TextEditState`].
    TextEdit(TextEditState),
    /// See [`Animation`].
    Anim(Animation),
}

impl WidgetState {
    /// Name of the record type, for diagnostics.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Toggle(_) => ToggleState::KIND,
            Self::Drag(_) => DragState::KIND,
            Self::TextEdit(_) => TextEditState::KIND,
            Self::Anim(_) => Animation::KIND,
        }
    }
}

/// Typed access to one [`WidgetState`] variant.
pub trait StateRecord: Sized + Default {
    /// Record type name.
    const KIND: &'static str;

    /// Wraps the record.
    fn into_state(self) -> WidgetState;

    /// Borrows the record if `state` holds this type.
    fn from_state(state: &WidgetState) -> Option<&Self>;

    /// Borrows the record, resetting `state` to a default record if it holds
    /// another type.
    fn coerce(state: &mut WidgetState) -> &mut Self;
}

macro_rules! state_record {
    ($ty:ty, $variant:ident, $kind:literal) => {
        impl StateRecord for $ty {
            const KIND: &'static str = $kind;

            fn into_state(self) -> WidgetState {
                WidgetState::$variant(self)
            }

            fn from_state(state: &WidgetState) -> Option<&Self> {
                match state {
                    WidgetState::$variant(record) => Some(record),
                    _ => None,
                }
            }

            fn coerce(state: &mut WidgetState) -> &mut Self {
                if !matches!(state, WidgetState::$variant(_)) {
                    *state = WidgetState::$variant(Self::default());
                }
                match state {
                    WidgetState::$variant(record) => record,
                    _ => unreachable!("record replaced above"),
                }
            }
        }
    };
}

state_record!(ToggleState, Toggle, "toggle");
state_record!(DragState, Drag, "drag");
state_record!(TextEditState, TextEdit, "text_edit");
state_record!(Animation, Anim, "animation");

#[derive(Debug, Clone)]
struct Entry {
    state: WidgetState,
    last_touched: u64,
}

/// Sparse id-keyed table of [`WidgetState`] records.
#[derive(Debug, Clone, Default)]
pub struct WidgetStateStore {
    entries: HashMap<WidgetId, Entry>,
    frame: u64,
}

impl WidgetStateStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if there are no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns true if `id` has a record.
    #[must_use]
    pub fn contains(&self, id: WidgetId) -> bool {
        self.entries.contains_key(&id)
    }

    /// Frame number that touches are stamped with.
    #[must_use]
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Sets the frame number for subsequent touches.
    pub fn begin_frame(&mut self, frame: u64) {
        self.frame = frame;
    }

    /// Frame `id` was last touched in.
    #[must_use]
    pub fn last_touched(&self, id: WidgetId) -> Option<u64> {
        self.entries.get(&id).map(|e| e.last_touched)
    }

    /// Reads a record without touching it.
    #[must_use]
    pub fn get<T: StateRecord>(&self, id: WidgetId) -> Option<&T> {
        self.entries.get(&id).and_then(|e| T::from_state(&e.state))
    }

    /// Returns the record for `id`, creating it with `init` if missing.
    ///
    /// A record of a different type under the same id is replaced.
    pub fn get_or_insert_with<T: StateRecord>(
        &mut self,
        id: WidgetId,
        init: impl FnOnce() -> T,
    ) -> &mut T {
        let frame = self.frame;
        let entry = match self.entries.entry(id) {
            MapEntry::Occupied(slot) => {
                let entry = slot.into_mut();
                if T::from_state(&entry.state).is_none() {
                    tracing::warn!(
                        %id,
                        found = entry.state.kind(),
                        requested = T::KIND,
                        "widget state replaced by a different record type"
                    );
                    entry.state = init().into_state();
                }
                entry
            }
            MapEntry::Vacant(slot) => slot.insert(Entry {
                state: init().into_state(),
                last_touched: frame,
            }),
        };
        entry.last_touched = frame;
        T::coerce(&mut entry.state)
    }

    /// Returns the record for `id`, creating a default one if missing.
    pub fn get_or_default<T: StateRecord>(&mut self, id: WidgetId) -> &mut T {
        self.get_or_insert_with(id, T::default)
    }

    /// Marks `id` as referenced this frame.
    pub fn touch(&mut self, id: WidgetId) {
        if let Some(entry) = self.entries.get_mut(&id) {
            entry.last_touched = self.frame;
        }
    }

    /// Removes a record.
    pub fn remove(&mut self, id: WidgetId) -> Option<WidgetState> {
        self.entries.remove(&id).map(|e| e.state)
    }

    /// Removes records untouched for `max_age` frames or more. Returns how
    /// many were removed.
    pub fn evict(&mut self, max_age: u64) -> usize {
        let before = self.entries.len();
        let frame = self.frame;
        self.entries
            .retain(|_, e| frame.saturating_sub(e.last_touched) < max_age);
        before - self.entries.len()
    }

    /// Removes every record.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
