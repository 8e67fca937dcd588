//! Item placement, hover/active arbitration and drawing helpers.

use super::{Context, WidgetEvent};
use crate::clip::ClipTest;
use crate::draw::DrawList;
use crate::error::{StackKind, UiError};
use crate::font::TextureId;
use crate::input::MouseButton;
use crate::style::{Color, StyleColor};
use crate::window::Window;
use vellum_core::{Handle, Rect, Vec2, WidgetId};

/// Outcome of [`Context::button_behavior`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Interaction {
    /// Pointer is over the item and nothing occludes it.
    pub hovered: bool,
    /// Item is active and the button is still down.
    pub held: bool,
    /// Button was released over the item this frame.
    pub pressed: bool,
}

/// Clipped bounds of an item, recorded for next frame's occlusion test.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ItemRect {
    pub id: WidgetId,
    pub window: Handle,
    pub rect: Rect,
}

/// Why an item is or is not hovered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HoverTest {
    Outside,
    BlockedByActive,
    Occluded,
    Hovered,
}

/// The most recently submitted item.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LastItem {
    /// Id, `NONE` for plain items such as text.
    pub id: WidgetId,
    /// Bounding box.
    pub rect: Rect,
    /// Hover result.
    pub hovered: bool,
    /// Completely outside the current clip rect.
    pub clipped: bool,
}

impl Context {
    pub(crate) fn current_handle(&self) -> Option<Handle> {
        self.window_stack.last().map(|s| s.handle)
    }

    /// Window widgets are currently submitted to.
    #[must_use]
    pub fn current_window(&self) -> Option<&Window> {
        self.current_handle().and_then(|h| self.windows.get(h))
    }

    pub(crate) fn current_window_mut(&mut self) -> Option<&mut Window> {
        let handle = self.current_handle()?;
        self.windows.get_mut(handle)
    }

    /// Returns true if widget calls should return early: outside a frame, or
    /// in a collapsed window. Reports calls made outside a frame.
    pub fn skip_items(&self, what: &'static str) -> bool {
        if !self.in_frame {
            self.report(&UiError::OutsideFrame(what));
            return true;
        }
        self.current_window().map_or(true, |w| w.skip_items)
    }

    // ---------------------------------------------------------------------
    // Layout
    // ---------------------------------------------------------------------

    /// Places an item of `size` at the layout cursor and returns its rect.
    pub fn item_size(&mut self, size: Vec2) -> Rect {
        let Some(window) = self.current_window_mut() else {
            return Rect::ZERO;
        };
        window.write_accessed = true;
        let rect = window.cursor.place(size);
        let clipped = window.draw_list.clip_test(&rect) == ClipTest::Outside;
        self.last_item = LastItem {
            id: WidgetId::NONE,
            rect,
            hovered: false,
            clipped,
        };
        rect
    }

    /// Last submitted item.
    #[must_use]
    pub fn last_item(&self) -> LastItem {
        self.last_item
    }

    /// Returns true if the last item is hovered.
    #[must_use]
    pub fn is_item_hovered(&self) -> bool {
        self.last_item.hovered
    }

    /// Returns true if the last item is the active widget.
    #[must_use]
    pub fn is_item_active(&self) -> bool {
        self.last_item.id.is_some() && self.last_item.id == self.active_id
    }

    /// Returns true if `rect` is at least partially inside the current clip.
    #[must_use]
    pub fn is_rect_visible(&self, rect: Rect) -> bool {
        self.current_window()
            .is_some_and(|w| w.draw_list.clip_test(&rect) != ClipTest::Outside)
    }

    /// Cursor position in screen space.
    #[must_use]
    pub fn cursor_pos(&self) -> Vec2 {
        self.current_window().map_or(Vec2::ZERO, |w| w.cursor.pos())
    }

    /// Moves the cursor in screen space.
    pub fn set_cursor_pos(&mut self, pos: Vec2) {
        if let Some(window) = self.current_window_mut() {
            window.cursor.set_pos(pos);
        }
    }

    /// Space left in the current window's content region.
    #[must_use]
    pub fn content_region_avail(&self) -> Vec2 {
        self.current_window()
            .map_or(Vec2::ZERO, |w| w.cursor.content_region_avail())
    }

    /// Keeps the next item on the current line.
    pub fn same_line(&mut self) {
        self.same_line_with(0.0, -1.0);
    }

    /// [`Context::same_line`] with an explicit start offset or spacing.
    pub fn same_line_with(&mut self, offset_from_start: f32, spacing: f32) {
        if let Some(window) = self.current_window_mut() {
            window.cursor.same_line(offset_from_start, spacing);
        }
    }

    /// Ends the current line, or adds an empty one.
    pub fn new_line(&mut self) {
        let height = self.atlas.font.size;
        if let Some(window) = self.current_window_mut() {
            window.cursor.new_line(height);
        }
    }

    /// Adds vertical spacing.
    pub fn spacing(&mut self) {
        if let Some(window) = self.current_window_mut() {
            window.cursor.spacing();
        }
    }

    /// Indents following lines by the style's indent width.
    pub fn indent(&mut self) {
        let width = self.config.style.indent_spacing;
        if let Some(window) = self.current_window_mut() {
            window.cursor.indent(width);
        }
    }

    /// Reverts one [`Context::indent`].
    pub fn unindent(&mut self) {
        let width = self.config.style.indent_spacing;
        if let Some(window) = self.current_window_mut() {
            window.cursor.unindent(width);
        }
    }

    /// Starts a layout group; the group is placed as one item when it ends.
    pub fn begin_group(&mut self) {
        if let Some(window) = self.current_window_mut() {
            window.cursor.begin_group();
        }
    }

    /// Ends the innermost layout group.
    pub fn end_group(&mut self) {
        let floor = self.window_stack.last().map_or(0, |s| s.group_depth);
        let Some(window) = self.current_window_mut() else { return };
        if window.cursor.group_depth() <= floor {
            self.report(&UiError::StackUnderflow(StackKind::Group));
            return;
        }
        if let Some(rect) = window.cursor.end_group() {
            self.last_item = LastItem {
                rect,
                ..LastItem::default()
            };
        }
    }

    /// Runs `f` inside a layout group.
    pub fn group<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        self.begin_group();
        let result = f(self);
        self.end_group();
        result
    }

    /// Enters a tree level: indents and pushes `label` onto the id stack.
    pub fn tree_push(&mut self, label: &str) {
        self.indent();
        self.ids.push_str(label);
        self.tree_depth += 1;
    }

    /// Leaves the tree level entered last.
    pub fn tree_pop(&mut self) {
        let floor = self.window_stack.last().map_or(0, |s| s.tree_depth);
        if self.tree_depth <= floor {
            self.report(&UiError::StackUnderflow(StackKind::Tree));
            return;
        }
        self.tree_depth -= 1;
        self.unindent();
        self.pop_id();
    }

    /// Number of open tree levels.
    #[must_use]
    pub fn tree_depth(&self) -> usize {
        self.tree_depth
    }

    /// Width of the next framed widget. Non-positive values are relative to
    /// the available width.
    pub fn set_next_item_width(&mut self, width: f32) {
        self.next_item_width = Some(width);
    }

    /// Consumes the width set for the next item, or derives the default.
    pub fn calc_item_width(&mut self) -> f32 {
        let avail = self.content_region_avail().x;
        let width = match self.next_item_width.take() {
            Some(w) if w > 0.0 => w,
            Some(w) => avail + w,
            None => avail * self.config.style.item_width_ratio,
        };
        width.max(1.0).floor()
    }

    /// Size of `text` in the current font.
    #[must_use]
    pub fn text_size(&self, text: &str) -> Vec2 {
        self.atlas.font.calc_text_size(text)
    }

    /// Height of a framed widget.
    #[must_use]
    pub fn frame_height(&self) -> f32 {
        self.atlas.font.size + self.config.style.frame_padding.y * 2.0
    }

    // ---------------------------------------------------------------------
    // Hover / active
    // ---------------------------------------------------------------------

    /// Hover test for an item with id `id` covering `rect`.
    ///
    /// The pointer must be inside `rect` and the current clip rect, and the
    /// current window must be the hovered window. Among overlapping items the
    /// one submitted last wins: an item is occluded when an item submitted
    /// after it in the previous frame covers the pointer now. While another
    /// widget is active nothing else is hovered.
    pub fn item_hoverable(&mut self, rect: Rect, id: WidgetId) -> bool {
        self.hover_test(rect, id) == HoverTest::Hovered
    }

    fn hover_test(&mut self, rect: Rect, id: WidgetId) -> HoverTest {
        self.last_item.id = id;
        self.last_item.hovered = false;
        let Some(handle) = self.current_handle() else { return HoverTest::Outside };
        let Some(window) = self.windows.get(handle) else { return HoverTest::Outside };
        let visible = rect.clip_to(&window.draw_list.clip_rect());
        if id.is_some() {
            self.items.push(ItemRect {
                id,
                window: handle,
                rect: visible,
            });
        }
        let Some(mouse) = self.input.mouse_pos() else { return HoverTest::Outside };
        if self.hovered_window != Some(handle) || !visible.contains(mouse) {
            return HoverTest::Outside;
        }
        if id.is_some() {
            self.hover_candidates.push(id);
        }
        if self.active_id.is_some() && self.active_id != id {
            return HoverTest::BlockedByActive;
        }
        if self.is_occluded(id, handle, mouse) {
            return HoverTest::Occluded;
        }
        self.last_item.hovered = true;
        HoverTest::Hovered
    }

    /// Returns true if an item submitted after `id` in the previous frame,
    /// in the same window, covers `mouse`.
    fn is_occluded(&self, id: WidgetId, window: Handle, mouse: Vec2) -> bool {
        let prev = &self.prev_items;
        let Some(index) = prev.iter().rposition(|item| item.id == id) else {
            return false;
        };
        prev[index + 1..]
            .iter()
            .any(|item| item.window == window && item.id != id && item.rect.contains(mouse))
    }

    /// Standard press/hold/release logic for clickable items.
    ///
    /// A press over the item makes it active; it stays active while the
    /// button is held, wherever the pointer goes. Releasing over the item
    /// reports `pressed` and emits [`WidgetEvent::Clicked`].
    ///
    /// Items new this frame cannot be occluded yet. When several of them
    /// claim one press, the last one submitted takes the capture at the end
    /// of the frame.
    pub fn button_behavior(&mut self, rect: Rect, id: WidgetId) -> Interaction {
        let test = self.hover_test(rect, id);
        let hovered = test == HoverTest::Hovered;
        if self.input.mouse_pressed(MouseButton::Left) && id.is_some() {
            let contested = test == HoverTest::BlockedByActive && self.press_claims.contains(&self.active_id);
            if hovered || contested {
                self.press_claims.push(id);
            }
        }
        if hovered && self.input.mouse_pressed(MouseButton::Left) && self.set_active(id) {
            if let Some(mouse) = self.input.mouse_pos() {
                self.active_click_offset = mouse - rect.min();
            }
        }

        let mut pressed = false;
        if self.active_id == id && id.is_some() {
            self.keep_alive(id);
            if !self.input.mouse_down(MouseButton::Left) {
                pressed = hovered;
                if pressed {
                    self.events.push(WidgetEvent::Clicked(id));
                }
                self.clear_active();
            }
        }
        Interaction {
            hovered,
            held: self.active_id == id && id.is_some(),
            pressed,
        }
    }

    /// Hands a press claimed by several overlapping items to the last one.
    ///
    /// The earlier claimants lose their activation and click events; a
    /// capture they still hold moves to the winner.
    pub(crate) fn settle_press_claims(&mut self) {
        let Some((&winner, losers)) = self.press_claims.split_last() else { return };
        let losers: Vec<WidgetId> = losers.iter().copied().filter(|&id| id != winner).collect();
        if losers.is_empty() {
            return;
        }
        tracing::trace!(%winner, contested = losers.len(), "press settled on topmost item");
        self.events.retain(|event| match *event {
            WidgetEvent::Activated(id) | WidgetEvent::Clicked(id) | WidgetEvent::Deactivated(id) => {
                !losers.contains(&id)
            }
            _ => true,
        });
        if losers.contains(&self.active_id) {
            self.active_id = winner;
            self.active_alive = true;
            self.events.push(WidgetEvent::Activated(winner));
        }
    }

    /// Makes `id` the active widget.
    ///
    /// Fails while another widget is active.
    pub fn set_active(&mut self, id: WidgetId) -> bool {
        if id.is_none() {
            return false;
        }
        if self.active_id == id {
            self.active_alive = true;
            return true;
        }
        if self.active_id.is_some() {
            tracing::trace!(requested = %id, active = %self.active_id, "activation rejected");
            return false;
        }
        self.active_id = id;
        self.active_alive = true;
        self.events.push(WidgetEvent::Activated(id));
        true
    }

    /// Releases the active widget.
    pub fn clear_active(&mut self) {
        if self.active_id.is_some() {
            self.events.push(WidgetEvent::Deactivated(self.active_id));
            self.active_id = WidgetId::NONE;
        }
    }

    /// Keeps the active or focused widget alive for this frame. A widget
    /// that holds the capture but is not submitted is released at the end
    /// of the frame.
    pub fn keep_alive(&mut self, id: WidgetId) {
        if id.is_some() && id == self.active_id {
            self.active_alive = true;
        }
        if id.is_some() && id == self.focus_id {
            self.focus_alive = true;
        }
    }

    /// Active widget.
    #[must_use]
    pub fn active_id(&self) -> WidgetId {
        self.active_id
    }

    /// Pointer offset from the active item's top-left at activation.
    #[must_use]
    pub fn active_click_offset(&self) -> Vec2 {
        self.active_click_offset
    }

    /// Topmost hoverable item submitted so far this frame.
    #[must_use]
    pub fn hovered_id(&self) -> WidgetId {
        self.hover_candidates.last().copied().unwrap_or(WidgetId::NONE)
    }

    /// Window under the pointer.
    #[must_use]
    pub fn hovered_window(&self) -> Option<Handle> {
        self.hovered_window
    }

    /// Gives `id` keyboard focus.
    pub fn set_keyboard_focus(&mut self, id: WidgetId) {
        if self.focus_id != id {
            tracing::trace!(%id, "keyboard focus");
        }
        self.focus_id = id;
        self.focus_alive = true;
        self.focus_claimed = true;
    }

    /// Drops keyboard focus.
    pub fn clear_keyboard_focus(&mut self) {
        self.focus_id = WidgetId::NONE;
    }

    /// Widget with keyboard focus.
    #[must_use]
    pub fn focus_id(&self) -> WidgetId {
        self.focus_id
    }

    /// Stops the hovered window from scrolling with the wheel next frame.
    pub fn claim_mouse_wheel(&mut self) {
        self.wheel_claimed = true;
    }

    /// Records an event for the frame output.
    pub fn push_event(&mut self, event: WidgetEvent) {
        self.events.push(event);
    }

    // ---------------------------------------------------------------------
    // Clip rects and drawing
    // ---------------------------------------------------------------------

    /// Pushes a clip rect on the current window, intersected with the
    /// current clip.
    pub fn push_clip_rect(&mut self, rect: Rect) {
        if let Some(window) = self.current_window_mut() {
            window.draw_list.push_clip_rect(rect);
        }
    }

    /// Pops a clip rect pushed with [`Context::push_clip_rect`].
    pub fn pop_clip_rect(&mut self) {
        let floor = self.window_stack.last().map_or(0, |s| s.clip_depth);
        let Some(window) = self.current_window_mut() else { return };
        if window.draw_list.clip_depth() <= floor {
            self.report(&UiError::StackUnderflow(StackKind::Clip));
            return;
        }
        window.draw_list.pop_clip_rect();
    }

    /// Current clip rect.
    #[must_use]
    pub fn clip_rect(&self) -> Rect {
        self.current_window()
            .map_or(Rect::EVERYTHING, |w| w.draw_list.clip_rect())
    }

    /// Draw list of the current window.
    pub fn window_draw_list(&mut self) -> Option<&mut DrawList> {
        self.current_window_mut().map(|w| &mut w.draw_list)
    }

    /// Draw list rendered above every window.
    pub fn overlay_draw_list(&mut self) -> &mut DrawList {
        &mut self.overlay
    }

    /// Filled rectangle in the current window.
    pub fn add_rect_filled(&mut self, rect: Rect, color: Color) {
        if let Some(list) = self.window_draw_list() {
            list.add_rect_filled(rect, color);
        }
    }

    /// Rectangle outline in the current window.
    pub fn add_rect(&mut self, rect: Rect, color: Color, thickness: f32) {
        if let Some(list) = self.window_draw_list() {
            list.add_rect(rect, color, thickness);
        }
    }

    /// Line in the current window.
    pub fn add_line(&mut self, a: Vec2, b: Vec2, color: Color, thickness: f32) {
        if let Some(list) = self.window_draw_list() {
            list.add_line(a, b, color, thickness);
        }
    }

    /// Filled triangle in the current window.
    pub fn add_triangle_filled(&mut self, a: Vec2, b: Vec2, c: Vec2, color: Color) {
        if let Some(list) = self.window_draw_list() {
            list.add_triangle_filled(a, b, c, color);
        }
    }

    /// Filled circle in the current window.
    pub fn add_circle_filled(&mut self, center: Vec2, radius: f32, color: Color) {
        if let Some(list) = self.window_draw_list() {
            list.add_circle_filled(center, radius, color, 0);
        }
    }

    /// Textured quad in the current window.
    pub fn add_image(&mut self, texture: TextureId, rect: Rect, uv_min: Vec2, uv_max: Vec2, tint: Color) {
        if let Some(list) = self.window_draw_list() {
            list.add_image(texture, rect, uv_min, uv_max, tint);
        }
    }

    /// Text in the current window.
    pub fn add_text(&mut self, pos: Vec2, color: Color, text: &str) {
        let Some(handle) = self.current_handle() else { return };
        if let Some(window) = self.windows.get_mut(handle) {
            window.draw_list.add_text(&self.atlas.font, pos, color, text);
        }
    }

    /// Framed background with the style's frame border.
    pub fn render_frame(&mut self, rect: Rect, fill: Color) {
        let border = self.config.style.frame_border_size;
        let border_color = self.color(StyleColor::Border);
        self.add_rect_filled(rect, fill);
        if border > 0.0 {
            self.add_rect(rect, border_color, border);
        }
    }

    /// Text centered in `rect`, clipped to it.
    pub fn render_text_clipped(&mut self, rect: Rect, text: &str, align: Vec2) {
        let size = self.text_size(text);
        let pos = Vec2::new(
            rect.x + ((rect.width - size.x) * align.x).max(0.0),
            rect.y + ((rect.height - size.y) * align.y).max(0.0),
        );
        let color = self.color(StyleColor::Text);
        let overflows = size.x > rect.width || size.y > rect.height;
        if overflows {
            self.push_clip_rect(rect);
        }
        self.add_text(pos.floor(), color, text);
        if overflows {
            if let Some(window) = self.current_window_mut() {
                window.draw_list.pop_clip_rect();
            }
        }
    }

    /// Right-pointing (closed) or down-pointing (open) arrow in a square of
    /// side `size` at `pos`.
    pub fn render_arrow(&mut self, pos: Vec2, size: f32, open: bool, color: Color) {
        let center = pos + Vec2::splat(size * 0.5);
        let r = size * 0.3;
        let (a, b, c) = if open {
            (
                center + Vec2::new(-r, -r * 0.5),
                center + Vec2::new(r, -r * 0.5),
                center + Vec2::new(0.0, r * 0.75),
            )
        } else {
            (
                center + Vec2::new(-r * 0.5, -r),
                center + Vec2::new(r * 0.75, 0.0),
                center + Vec2::new(-r * 0.5, r),
            )
        };
        self.add_triangle_filled(a, b, c, color);
    }
}

#[cfg(test)]
mod tests {
    use crate::config::UiConfig;
    use crate::error::ErrorPolicy;
    use crate::font::{FontAtlas, TextureId};
    use crate::input::{InputState, MouseButton};
    use crate::window::WindowFlags;
    use crate::{Context, WidgetEvent};
    use vellum_core::{Rect, Vec2};

    fn context() -> Context {
        let config = UiConfig {
            error_policy: ErrorPolicy::Recover,
            ..UiConfig::default()
        };
        Context::new(config, FontAtlas::monospace(TextureId(1), 7.0, 13.0))
    }

    fn frame(ctx: &mut Context, input: &mut InputState, f: impl FnOnce(&mut Context)) {
        ctx.begin_frame(input, 1.0 / 60.0);
        ctx.set_next_window_pos(Vec2::new(0.0, 0.0), crate::Cond::Always);
        ctx.set_next_window_size(Vec2::new(300.0, 300.0), crate::Cond::Always);
        ctx.begin_window("Test", WindowFlags::NO_TITLE_BAR);
        f(ctx);
        ctx.end_window();
        ctx.end_frame();
    }

    #[test]
    fn test_press_release_clicks() {
        let mut ctx = context();
        let mut input = InputState::new();
        let rect = Rect::new(20.0, 20.0, 50.0, 20.0);
        let mut id = None;
        let mut run = |ctx: &mut Context, input: &mut InputState| {
            let mut result = Default::default();
            frame(ctx, input, |ctx| {
                let button = ctx.get_id("button");
                id = Some(button);
                result = ctx.button_behavior(rect, button);
            });
            result
        };

        // the window must exist for one frame before it can be hovered
        run(&mut ctx, &mut input);
        input.set_mouse_pos(30.0, 30.0);
        run(&mut ctx, &mut input);

        input.mouse_button_down(MouseButton::Left);
        let held = run(&mut ctx, &mut input);
        assert!(held.hovered && held.held && !held.pressed);

        input.mouse_button_up(MouseButton::Left);
        let released = run(&mut ctx, &mut input);
        assert!(released.pressed && !released.held);
        let id = id.unwrap();
        assert_eq!(ctx.output().events_for(id).collect::<Vec<_>>(), vec![
            WidgetEvent::Clicked(id),
            WidgetEvent::Deactivated(id)
        ]);
    }

    #[test]
    fn test_release_outside_does_not_click() {
        let mut ctx = context();
        let mut input = InputState::new();
        let rect = Rect::new(20.0, 20.0, 50.0, 20.0);
        let mut pressed = false;
        for step in 0..5 {
            match step {
                1 => input.set_mouse_pos(30.0, 30.0),
                2 => input.mouse_button_down(MouseButton::Left),
                3 => input.set_mouse_pos(200.0, 200.0),
                4 => input.mouse_button_up(MouseButton::Left),
                _ => {}
            }
            frame(&mut ctx, &mut input, |ctx| {
                let id = ctx.get_id("button");
                pressed |= ctx.button_behavior(rect, id).pressed;
            });
        }
        assert!(!pressed);
        assert!(ctx.output().active_id.is_none());
    }

    #[test]
    fn test_active_blocks_other_hover() {
        let mut ctx = context();
        let mut input = InputState::new();
        let a = Rect::new(20.0, 20.0, 50.0, 20.0);
        let b = Rect::new(100.0, 20.0, 50.0, 20.0);
        let mut b_hovered = true;
        for step in 0..4 {
            match step {
                1 => input.set_mouse_pos(30.0, 30.0),
                2 => input.mouse_button_down(MouseButton::Left),
                3 => input.set_mouse_pos(110.0, 30.0),
                _ => {}
            }
            frame(&mut ctx, &mut input, |ctx| {
                let id_a = ctx.get_id("a");
                let id_b = ctx.get_id("b");
                ctx.button_behavior(a, id_a);
                b_hovered = ctx.button_behavior(b, id_b).hovered;
            });
        }
        assert!(!b_hovered);
    }

    #[test]
    fn test_item_width() {
        let mut ctx = context();
        let mut input = InputState::new();
        frame(&mut ctx, &mut input, |ctx| {
            let avail = ctx.content_region_avail().x;
            ctx.set_next_item_width(100.0);
            assert_eq!(ctx.calc_item_width(), 100.0);
            ctx.set_next_item_width(-20.0);
            assert_eq!(ctx.calc_item_width(), (avail - 20.0).floor());
        });
    }
}
