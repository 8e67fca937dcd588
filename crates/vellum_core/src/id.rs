//! # Widget Identity
//!
//! Widgets are identified by a 64-bit hash of the ID-stack path plus a label or
//! integer salt. The same call site under the same nesting path produces the
//! same [`WidgetId`] every frame; the same label under a different path does
//! not.
//!
//! Collisions are NOT detected. Two calls that hash to the same id in one frame
//! are the same widget as far as hover/active tracking and persistent state are
//! concerned. Callers disambiguate siblings with `##suffix` labels or
//! [`IdStack::push_int`].
//!
//! ## Label conventions
//!
//! - `"Save##toolbar"` displays `Save`, hashes the whole string.
//! - `"Progress 42%###progress"` displays `Progress 42%`, hashes only
//!   `###progress`, so the id survives changes to the visible text.

/// FNV-1a 64-bit offset basis, used as the root seed.
const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
/// FNV-1a 64-bit prime.
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// Unique identifier for a widget.
///
/// `0` is reserved for "no widget" and is never produced by hashing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[repr(transparent)]
pub struct WidgetId(u64);

impl WidgetId {
    /// The null id: no widget.
    pub const NONE: Self = Self(0);

    /// Creates a widget id from a raw value.
    #[inline]
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw id value.
    #[inline]
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }

    /// Returns true for [`WidgetId::NONE`].
    #[inline]
    #[must_use]
    pub const fn is_none(self) -> bool {
        self.0 == 0
    }

    /// Returns true for any id other than [`WidgetId::NONE`].
    #[inline]
    #[must_use]
    pub const fn is_some(self) -> bool {
        self.0 != 0
    }

    /// Hashes `bytes` seeded by this id.
    #[must_use]
    pub fn combine_bytes(self, bytes: &[u8]) -> Self {
        let mut hash = self.0;
        for &byte in bytes {
            hash ^= u64::from(byte);
            hash = hash.wrapping_mul(FNV_PRIME);
        }
        // keep NONE out of the hash range
        Self(if hash == 0 { 1 } else { hash })
    }

    /// Hashes a label seeded by this id, honouring the `###` convention.
    #[must_use]
    pub fn combine_label(self, label: &str) -> Self {
        self.combine_bytes(hashed_part(label).as_bytes())
    }

    /// Hashes an integer salt seeded by this id.
    #[must_use]
    pub fn combine_int(self, n: u64) -> Self {
        self.combine_bytes(&n.to_le_bytes())
    }
}

impl std::fmt::Display for WidgetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:016X}", self.0)
    }
}

/// Returns the part of `label` that takes part in hashing.
#[must_use]
pub fn hashed_part(label: &str) -> &str {
    match label.find("###") {
        Some(pos) => &label[pos..],
        None => label,
    }
}

/// Returns the part of `label` that is meant to be displayed.
#[must_use]
pub fn display_part(label: &str) -> &str {
    match label.find("##") {
        Some(pos) => &label[..pos],
        None => label,
    }
}

/// LIFO stack of id seeds.
///
/// The bottom entry is the root seed and can never be popped.
#[derive(Debug, Clone)]
pub struct IdStack {
    /// Seeds, bottom first.
    seeds: Vec<WidgetId>,
}

impl IdStack {
    /// Creates a stack holding only the root seed.
    #[must_use]
    pub fn new() -> Self {
        let mut seeds = Vec::with_capacity(32);
        seeds.push(WidgetId(FNV_OFFSET_BASIS));
        Self { seeds }
    }

    /// Returns the current seed.
    #[inline]
    #[must_use]
    pub fn top(&self) -> WidgetId {
        self.seeds.last().copied().unwrap_or(WidgetId(FNV_OFFSET_BASIS))
    }

    /// Number of pushed entries, excluding the root.
    #[inline]
    #[must_use]
    pub fn depth(&self) -> usize {
        self.seeds.len() - 1
    }

    /// Id of `label` under the current seed.
    #[must_use]
    pub fn get_id(&self, label: &str) -> WidgetId {
        self.top().combine_label(label)
    }

    /// Id of integer `n` under the current seed.
    #[must_use]
    pub fn get_id_int(&self, n: u64) -> WidgetId {
        self.top().combine_int(n)
    }

    /// Pushes an already computed id as the new seed.
    pub fn push(&mut self, id: WidgetId) {
        self.seeds.push(id);
    }

    /// Pushes the id of `label` as the new seed.
    pub fn push_str(&mut self, label: &str) -> WidgetId {
        let id = self.get_id(label);
        self.seeds.push(id);
        id
    }

    /// Pushes the id of integer `n` as the new seed.
    pub fn push_int(&mut self, n: u64) -> WidgetId {
        let id = self.get_id_int(n);
        self.seeds.push(id);
        id
    }

    /// Pops the top seed. Returns `None` if only the root remains.
    pub fn pop(&mut self) -> Option<WidgetId> {
        if self.seeds.len() <= 1 {
            return None;
        }
        self.seeds.pop()
    }

    /// Drops every entry above `depth`.
    pub fn truncate(&mut self, depth: usize) {
        self.seeds.truncate(depth + 1);
    }
}

impl Default for IdStack {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_path_same_id() {
        let mut a = IdStack::new();
        let mut b = IdStack::new();
        a.push_str("window");
        b.push_str("window");

        assert_eq!(a.get_id("OK"), b.get_id("OK"));
    }

    #[test]
    fn test_different_path_different_id() {
        let mut stack = IdStack::new();
        stack.push_str("left");
        let left = stack.get_id("OK");
        stack.pop();
        stack.push_str("right");
        let right = stack.get_id("OK");

        assert_ne!(left, right);
    }

    #[test]
    fn test_int_salt_disambiguates() {
        let mut stack = IdStack::new();
        stack.push_int(0);
        let first = stack.get_id("Delete");
        stack.pop();
        stack.push_int(1);
        let second = stack.get_id("Delete");

        assert_ne!(first, second);
    }

    #[test]
    fn test_root_cannot_be_popped() {
        let mut stack = IdStack::new();
        assert_eq!(stack.pop(), None);
        assert_eq!(stack.depth(), 0);

        stack.push_str("a");
        stack.push_str("b");
        stack.truncate(0);
        assert_eq!(stack.depth(), 0);
    }

    #[test]
    fn test_triple_hash_ignores_display_text() {
        let stack = IdStack::new();
        assert_eq!(stack.get_id("Frame 1###fps"), stack.get_id("Frame 2###fps"));
        assert_ne!(stack.get_id("Save##a"), stack.get_id("Save##b"));
        assert_eq!(display_part("Save##a"), "Save");
        assert_eq!(display_part("Frame 1###fps"), "Frame 1");
    }

    #[test]
    fn test_order_sensitive() {
        let stack = IdStack::new();
        assert_ne!(stack.get_id("ab"), stack.get_id("ba"));
        assert!(stack.get_id("").is_some());
    }
}
