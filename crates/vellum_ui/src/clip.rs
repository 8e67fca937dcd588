//! Nested clip rectangles.
//!
//! Every pushed rectangle is intersected with the current one, so the top of
//! the stack is always the effective clip of the whole nesting path.

use vellum_core::Rect;

/// How a rectangle relates to the current clip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipTest {
    /// Entirely visible.
    Inside,
    /// Partially visible.
    Partial,
    /// Not visible at all.
    Outside,
}

impl ClipTest {
    /// Classifies `rect` against `clip`.
    #[must_use]
    pub fn classify(rect: &Rect, clip: &Rect) -> Self {
        if rect.is_empty() || clip.is_empty() || !clip.intersects(rect) {
            Self::Outside
        } else if clip.contains_rect(rect) {
            Self::Inside
        } else {
            Self::Partial
        }
    }
}

/// LIFO stack of clip rectangles.
#[derive(Debug, Clone)]
pub struct ClipStack {
    /// Effective rectangles, bottom first.
    stack: Vec<Rect>,
    /// Used while the stack is empty.
    base: Rect,
}

impl ClipStack {
    /// Creates an empty stack that clips to `base`.
    #[must_use]
    pub fn new(base: Rect) -> Self {
        Self {
            stack: Vec::with_capacity(16),
            base,
        }
    }

    /// Resets to an empty stack clipping to `base`.
    pub fn reset(&mut self, base: Rect) {
        self.stack.clear();
        self.base = base;
    }

    /// Pushes `rect` intersected with the current clip.
    pub fn push(&mut self, rect: Rect) {
        let clipped = rect.clip_to(&self.current());
        self.stack.push(clipped);
    }

    /// Pops the top rectangle.
    pub fn pop(&mut self) -> Option<Rect> {
        self.stack.pop()
    }

    /// Current effective clip.
    #[must_use]
    pub fn current(&self) -> Rect {
        self.stack.last().copied().unwrap_or(self.base)
    }

    /// Number of pushed rectangles.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Drops everything above `depth`.
    pub fn truncate(&mut self, depth: usize) {
        self.stack.truncate(depth);
    }

    /// Classifies `rect` against the current clip.
    #[must_use]
    pub fn test(&self, rect: &Rect) -> ClipTest {
        ClipTest::classify(rect, &self.current())
    }
}

impl Default for ClipStack {
    fn default() -> Self {
        Self::new(Rect::EVERYTHING)
    }
}
