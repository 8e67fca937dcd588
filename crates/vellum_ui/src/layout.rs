//! Layout cursor for flowing widgets inside a container.
//!
//! Widgets are laid out top to bottom. Each placed item advances the cursor to
//! the start of the next line; [`LayoutCursor::same_line`] pulls it back up to
//! the right of the previous item.

use vellum_core::{Rect, Vec2};

/// Cursor state saved by [`LayoutCursor::begin_group`].
#[derive(Debug, Clone, Copy)]
struct GroupBackup {
    pos: Vec2,
    indent: f32,
    max_pos: Vec2,
    line_height: f32,
    prev_line_height: f32,
}

/// Per-container layout state.
#[derive(Debug, Clone)]
pub struct LayoutCursor {
    /// Top-left of the content, scroll already applied.
    origin: Vec2,
    /// Bottom-right limit used for the available region.
    region_max: Vec2,
    /// Where the next item goes.
    pos: Vec2,
    /// End of the previous item on its line.
    prev_line_pos: Vec2,
    /// Height of the line being built.
    line_height: f32,
    /// Height of the last completed line.
    prev_line_height: f32,
    /// Offset of new lines from `origin.x`.
    indent: f32,
    /// Furthest point reached by any item.
    max_pos: Vec2,
    /// Gap between items.
    spacing: Vec2,
    /// Bounding box of the last placed item.
    last_item: Rect,
    groups: Vec<GroupBackup>,
}

impl LayoutCursor {
    /// Creates a cursor starting at `origin`.
    #[must_use]
    pub fn new(origin: Vec2, region_max: Vec2, spacing: Vec2) -> Self {
        Self {
            origin,
            region_max,
            pos: origin,
            prev_line_pos: origin,
            line_height: 0.0,
            prev_line_height: 0.0,
            indent: 0.0,
            max_pos: origin,
            spacing,
            last_item: Rect::from_pos_size(origin, Vec2::ZERO),
            groups: Vec::new(),
        }
    }

    /// Current cursor position.
    #[must_use]
    pub fn pos(&self) -> Vec2 {
        self.pos
    }

    /// Moves the cursor explicitly.
    pub fn set_pos(&mut self, pos: Vec2) {
        self.pos = pos;
        self.max_pos = self.max_pos.max(pos);
    }

    /// Content origin.
    #[must_use]
    pub fn origin(&self) -> Vec2 {
        self.origin
    }

    /// Current indentation.
    #[must_use]
    pub fn indent_width(&self) -> f32 {
        self.indent
    }

    /// Height of the line being built.
    #[must_use]
    pub fn line_height(&self) -> f32 {
        self.line_height
    }

    /// Rectangle of the last placed item.
    #[must_use]
    pub fn last_item_rect(&self) -> Rect {
        self.last_item
    }

    /// Space left between the cursor and the bottom-right of the region.
    #[must_use]
    pub fn content_region_avail(&self) -> Vec2 {
        (self.region_max - self.pos).max(Vec2::ZERO)
    }

    /// Bottom-right limit of the region.
    #[must_use]
    pub fn region_max(&self) -> Vec2 {
        self.region_max
    }

    /// Extent of everything placed so far, relative to the origin.
    #[must_use]
    pub fn content_size(&self) -> Vec2 {
        (self.max_pos - self.origin).max(Vec2::ZERO)
    }

    /// Returns the rect an item of `size` would occupy, without placing it.
    #[must_use]
    pub fn peek(&self, size: Vec2) -> Rect {
        Rect::from_pos_size(self.pos, size)
    }

    /// Places an item of `size` at the cursor and advances to the next line.
    pub fn place(&mut self, size: Vec2) -> Rect {
        let rect = self.peek(size);
        self.advance(size);
        self.last_item = rect;
        rect
    }

    /// Advances past an item of `size` that was drawn at the cursor.
    fn advance(&mut self, size: Vec2) {
        let line_height = self.line_height.max(size.y);
        self.prev_line_pos = Vec2::new(self.pos.x + size.x, self.pos.y);
        self.pos = Vec2::new(
            self.origin.x + self.indent,
            self.pos.y + line_height + self.spacing.y,
        );
        self.max_pos = self.max_pos.max(Vec2::new(
            self.prev_line_pos.x,
            self.pos.y - self.spacing.y,
        ));
        self.prev_line_height = line_height;
        self.line_height = 0.0;
    }

    /// Puts the next item on the same line as the previous one.
    ///
    /// With `offset_from_start > 0` the item starts that far from the content
    /// origin; otherwise it follows the previous item after `spacing` pixels
    /// (negative `spacing` uses the default gap).
    pub fn same_line(&mut self, offset_from_start: f32, spacing: f32) {
        if offset_from_start > 0.0 {
            self.pos.x = self.origin.x + offset_from_start;
        } else {
            let spacing = if spacing < 0.0 { self.spacing.x } else { spacing };
            self.pos.x = self.prev_line_pos.x + spacing;
        }
        self.pos.y = self.prev_line_pos.y;
        self.line_height = self.prev_line_height;
    }

    /// Terminates the current line. An empty line is `empty_height` tall.
    pub fn new_line(&mut self, empty_height: f32) {
        let height = if self.line_height > 0.0 { 0.0 } else { empty_height };
        self.place(Vec2::new(0.0, height));
    }

    /// Adds vertical spacing.
    pub fn spacing(&mut self) {
        self.place(Vec2::ZERO);
    }

    /// Moves new lines `width` pixels to the right.
    pub fn indent(&mut self, width: f32) {
        self.indent += width;
        self.pos.x = self.origin.x + self.indent;
    }

    /// Reverts [`LayoutCursor::indent`].
    pub fn unindent(&mut self, width: f32) {
        self.indent -= width;
        self.pos.x = self.origin.x + self.indent;
    }

    /// Starts a group. Items inside wrap back to the group's left edge.
    pub fn begin_group(&mut self) {
        self.groups.push(GroupBackup {
            pos: self.pos,
            indent: self.indent,
            max_pos: self.max_pos,
            line_height: self.line_height,
            prev_line_height: self.prev_line_height,
        });
        self.indent = self.pos.x - self.origin.x;
        self.max_pos = self.pos;
        self.line_height = 0.0;
    }

    /// Ends the innermost group and places its bounding box as one item.
    ///
    /// Returns `None` if no group is open.
    pub fn end_group(&mut self) -> Option<Rect> {
        let backup = self.groups.pop()?;
        let max = self.max_pos.max(backup.pos);
        let bounds = Rect::from_min_max(backup.pos, max);

        self.pos = backup.pos;
        self.indent = backup.indent;
        self.max_pos = backup.max_pos.max(max);
        self.line_height = backup.line_height.max(bounds.height);
        self.prev_line_height = backup.prev_line_height;
        self.advance(bounds.size());
        self.last_item = bounds;
        Some(bounds)
    }

    /// Number of open groups.
    #[must_use]
    pub fn group_depth(&self) -> usize {
        self.groups.len()
    }

    /// Closes groups above `depth`.
    pub fn truncate_groups(&mut self, depth: usize) {
        while self.groups.len() > depth {
            self.end_group();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cursor() -> LayoutCursor {
        LayoutCursor::new(Vec2::new(10.0, 10.0), Vec2::new(210.0, 110.0), Vec2::new(8.0, 4.0))
    }

    #[test]
    fn test_vertical_flow() {
        let mut layout = cursor();
        let a = layout.place(Vec2::new(50.0, 20.0));
        let b = layout.place(Vec2::new(30.0, 10.0));

        assert_eq!(a, Rect::new(10.0, 10.0, 50.0, 20.0));
        assert_eq!(b, Rect::new(10.0, 34.0, 30.0, 10.0));
        assert_eq!(layout.content_size(), Vec2::new(50.0, 34.0));
    }

    #[test]
    fn test_same_line() {
        let mut layout = cursor();
        layout.place(Vec2::new(50.0, 20.0));
        layout.same_line(0.0, -1.0);
        let b = layout.place(Vec2::new(30.0, 10.0));
        // line height of the shared line is the taller item
        let c = layout.place(Vec2::new(10.0, 10.0));

        assert_eq!(b.x, 68.0);
        assert_eq!(b.y, 10.0);
        assert_eq!(c.y, 34.0);
    }

    #[test]
    fn test_indent() {
        let mut layout = cursor();
        layout.indent(21.0);
        assert_eq!(layout.place(Vec2::new(5.0, 5.0)).x, 31.0);
        layout.unindent(21.0);
        assert_eq!(layout.place(Vec2::new(5.0, 5.0)).x, 10.0);
    }

    #[test]
    fn test_group_is_one_item() {
        let mut layout = cursor();
        layout.begin_group();
        layout.place(Vec2::new(40.0, 10.0));
        layout.place(Vec2::new(60.0, 10.0));
        let bounds = layout.end_group().unwrap();
        layout.same_line(0.0, -1.0);
        let next = layout.place(Vec2::new(10.0, 10.0));

        assert_eq!(bounds, Rect::new(10.0, 10.0, 60.0, 24.0));
        assert_eq!(next.x, 78.0);
        assert_eq!(next.y, 10.0);
        assert_eq!(layout.end_group(), None);
    }

    #[test]
    fn test_avail_shrinks() {
        let mut layout = cursor();
        assert_eq!(layout.content_region_avail(), Vec2::new(200.0, 100.0));
        layout.place(Vec2::new(10.0, 46.0));
        assert_eq!(layout.content_region_avail(), Vec2::new(200.0, 50.0));
    }

    #[test]
    fn test_new_line_on_empty_line() {
        let mut layout = cursor();
        layout.new_line(13.0);
        assert_eq!(layout.pos().y, 27.0);
    }
}
