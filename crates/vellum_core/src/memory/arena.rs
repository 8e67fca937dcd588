//! # Generational Arena
//!
//! Slot storage with a free list. Slots are reused after removal; a generation
//! counter per slot invalidates handles to the previous occupant.

/// Handle to an object stored in an [`Arena`].
///
/// The handle is split into two parts:
/// - Index into the slot array
/// - Generation counter for detecting stale handles
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Handle {
    /// Slot index.
    index: u32,
    /// Generation of the slot when the handle was issued.
    generation: u32,
}

impl Handle {
    /// Returns the slot index.
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.index
    }

    /// Returns the generation.
    #[inline]
    #[must_use]
    pub const fn generation(self) -> u32 {
        self.generation
    }
}

/// One slot of the arena.
#[derive(Debug, Clone)]
struct Slot<T> {
    /// Bumped every time the slot is vacated.
    generation: u32,
    /// Occupant, if any.
    value: Option<T>,
}

/// A growable generational arena.
///
/// # Thread Safety
///
/// Not synchronized. The arena is owned by whatever owns the UI context and
/// is only touched from that thread.
///
/// # Example
///
/// ```rust
/// use vellum_core::Arena;
///
/// let mut arena = Arena::new();
/// let h = arena.insert("settings");
/// assert_eq!(arena.get(h), Some(&"settings"));
///
/// arena.remove(h);
/// assert!(arena.get(h).is_none());
/// ```
#[derive(Debug, Clone)]
pub struct Arena<T> {
    /// Slot storage.
    slots: Vec<Slot<T>>,
    /// Indices of vacant slots.
    free_list: Vec<u32>,
    /// Number of occupied slots.
    len: usize,
}

impl<T> Arena<T> {
    /// Creates an empty arena.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Creates an empty arena with room for `capacity` objects.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free_list: Vec::new(),
            len: 0,
        }
    }

    /// Returns the number of stored objects.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns true if nothing is stored.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Stores `value` and returns its handle.
    ///
    /// Reuses a vacant slot when one exists. O(1) amortized.
    pub fn insert(&mut self, value: T) -> Handle {
        self.len += 1;

        if let Some(index) = self.free_list.pop() {
            let slot = &mut self.slots[index as usize];
            slot.value = Some(value);
            return Handle {
                index,
                generation: slot.generation,
            };
        }

        let index = u32::try_from(self.slots.len()).unwrap_or(u32::MAX);
        self.slots.push(Slot {
            generation: 0,
            value: Some(value),
        });
        Handle { index, generation: 0 }
    }

    /// Removes and returns the object behind `handle`.
    ///
    /// Returns `None` if the handle is stale or was never issued.
    pub fn remove(&mut self, handle: Handle) -> Option<T> {
        let slot = self.slots.get_mut(handle.index as usize)?;
        if slot.generation != handle.generation {
            return None;
        }

        let value = slot.value.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free_list.push(handle.index);
        self.len -= 1;

        Some(value)
    }

    /// Returns true if `handle` refers to a live object.
    #[must_use]
    pub fn contains(&self, handle: Handle) -> bool {
        self.get(handle).is_some()
    }

    /// Gets a reference to a stored object.
    #[inline]
    #[must_use]
    pub fn get(&self, handle: Handle) -> Option<&T> {
        let slot = self.slots.get(handle.index as usize)?;
        if slot.generation != handle.generation {
            return None;
        }
        slot.value.as_ref()
    }

    /// Gets a mutable reference to a stored object.
    #[inline]
    pub fn get_mut(&mut self, handle: Handle) -> Option<&mut T> {
        let slot = self.slots.get_mut(handle.index as usize)?;
        if slot.generation != handle.generation {
            return None;
        }
        slot.value.as_mut()
    }

    /// Removes every object. Outstanding handles become stale.
    pub fn clear(&mut self) {
        self.free_list.clear();
        for (index, slot) in self.slots.iter_mut().enumerate().rev() {
            if slot.value.take().is_some() {
                slot.generation = slot.generation.wrapping_add(1);
            }
            self.free_list.push(u32::try_from(index).unwrap_or(u32::MAX));
        }
        self.len = 0;
    }

    /// Keeps only the objects for which `keep` returns true.
    pub fn retain(&mut self, mut keep: impl FnMut(Handle, &mut T) -> bool) {
        for index in 0..self.slots.len() {
            let slot = &mut self.slots[index];
            let handle = Handle {
                index: u32::try_from(index).unwrap_or(u32::MAX),
                generation: slot.generation,
            };
            let Some(value) = slot.value.as_mut() else {
                continue;
            };
            if !keep(handle, value) {
                slot.value = None;
                slot.generation = slot.generation.wrapping_add(1);
                self.free_list.push(handle.index);
                self.len -= 1;
            }
        }
    }

    /// Iterates over all stored objects.
    pub fn iter(&self) -> impl Iterator<Item = (Handle, &T)> {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.value.as_ref().map(|v| {
                (
                    Handle {
                        index: u32::try_from(index).unwrap_or(u32::MAX),
                        generation: slot.generation,
                    },
                    v,
                )
            })
        })
    }

    /// Iterates mutably over all stored objects.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Handle, &mut T)> {
        self.slots.iter_mut().enumerate().filter_map(|(index, slot)| {
            let generation = slot.generation;
            slot.value.as_mut().map(|v| {
                (
                    Handle {
                        index: u32::try_from(index).unwrap_or(u32::MAX),
                        generation,
                    },
                    v,
                )
            })
        })
    }
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Self::new()
    }
}
