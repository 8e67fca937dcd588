//! Windows, child regions, popups and tooltips.
//!
//! Every container is a [`Window`](crate::window::Window). Beginning one
//! pushes a scope that records the id, clip, group and tree depths; ending it
//! checks them, reports any imbalance and truncates back.

use super::{Context, OpenPopup, WindowScope};
use crate::error::{StackKind, UiError};
use crate::input::{Key, MouseButton};
use crate::layout::LayoutCursor;
use crate::state::DragState;
use crate::style::StyleColor;
use crate::window::{find_best_popup_pos, Cond, WindowFlags, ONCE_COLLAPSED, ONCE_POS, ONCE_SIZE};
use vellum_core::{display_part, Handle, Rect, Vec2};

/// Name of the shared tooltip window.
pub const TOOLTIP_WINDOW: &str = "##Tooltip";

const POPUP_FLAGS: WindowFlags = WindowFlags::POPUP
    .union(WindowFlags::NO_TITLE_BAR)
    .union(WindowFlags::NO_MOVE)
    .union(WindowFlags::NO_RESIZE)
    .union(WindowFlags::NO_COLLAPSE)
    .union(WindowFlags::ALWAYS_AUTO_RESIZE);

const TOOLTIP_FLAGS: WindowFlags = WindowFlags::TOOLTIP
    .union(WindowFlags::NO_INPUTS)
    .union(WindowFlags::NO_TITLE_BAR)
    .union(WindowFlags::NO_MOVE)
    .union(WindowFlags::NO_RESIZE)
    .union(WindowFlags::NO_COLLAPSE)
    .union(WindowFlags::ALWAYS_AUTO_RESIZE);

const CHILD_FLAGS: WindowFlags = WindowFlags::CHILD
    .union(WindowFlags::NO_TITLE_BAR)
    .union(WindowFlags::NO_MOVE)
    .union(WindowFlags::NO_RESIZE)
    .union(WindowFlags::NO_COLLAPSE);

impl Context {
    // ---------------------------------------------------------------------
    // Next-window data
    // ---------------------------------------------------------------------

    /// Position of the next window.
    pub fn set_next_window_pos(&mut self, pos: Vec2, cond: Cond) {
        self.next_window.pos = Some((pos, cond));
    }

    /// Size of the next window.
    pub fn set_next_window_size(&mut self, size: Vec2, cond: Cond) {
        self.next_window.size = Some((size, cond));
    }

    /// Collapsed state of the next window.
    pub fn set_next_window_collapsed(&mut self, collapsed: bool, cond: Cond) {
        self.next_window.collapsed = Some((collapsed, cond));
    }

    /// Focuses and raises the next window.
    pub fn set_next_window_focus(&mut self) {
        self.next_window.focus = true;
    }

    // ---------------------------------------------------------------------
    // Windows
    // ---------------------------------------------------------------------

    /// Begins a window. Returns false if its content is not visible
    /// (collapsed); [`Context::end_window`] must be called either way.
    ///
    /// Beginning a window a second time in the same frame appends to it.
    pub fn begin_window(&mut self, name: &str, flags: WindowFlags) -> bool {
        self.begin_window_ex(name, None, flags)
    }

    /// [`Context::begin_window`] with a close button that clears `open`.
    ///
    /// While `open` is false the window is hidden and the call returns false.
    pub fn begin_window_closable(&mut self, name: &str, open: &mut bool, flags: WindowFlags) -> bool {
        self.begin_window_ex(name, Some(open), flags)
    }

    /// Ends the window begun last.
    pub fn end_window(&mut self) {
        if self.check_end("end_window").is_some() {
            self.pop_window_scope();
        }
    }

    /// Runs `f` inside a window. `f` is skipped while the window is collapsed.
    pub fn window<R>(&mut self, name: &str, flags: WindowFlags, f: impl FnOnce(&mut Self) -> R) -> Option<R> {
        let visible = self.begin_window(name, flags);
        let result = visible.then(|| f(self));
        self.end_window();
        result
    }

    fn begin_window_ex(&mut self, name: &str, open: Option<&mut bool>, flags: WindowFlags) -> bool {
        if !self.in_frame {
            self.report(&UiError::OutsideFrame("begin_window"));
            return false;
        }
        let frame = self.frame;
        let next = std::mem::take(&mut self.next_window);
        let is_child = flags.contains(WindowFlags::CHILD);
        let parent = if is_child { self.current_handle() } else { None };
        let parent_clip = parent
            .and_then(|h| self.windows.get(h))
            .map(|w| w.draw_list.clip_rect());

        let handle = match self.windows.find_by_name(name) {
            Some(handle) => handle,
            None => self
                .windows
                .create(name, frame, self.atlas.texture, self.atlas.white_uv),
        };
        let Some(window) = self.windows.get(handle) else { return false };
        if window.active {
            return self.resume_window(handle);
        }

        let closed = matches!(open.as_deref(), Some(&false));
        let display = self.display_rect();
        let font_size = self.atlas.font.size;
        let style = &self.config.style;
        let padding = style.window_padding;
        let min_size = style.window_min_size;
        let has_title = !flags.contains(WindowFlags::NO_TITLE_BAR)
            && !flags.contains(WindowFlags::CHILD)
            && !flags.contains(WindowFlags::POPUP)
            && !flags.contains(WindowFlags::TOOLTIP);
        let title_h = if has_title { font_size + style.frame_padding.y * 2.0 } else { 0.0 };
        let is_root_normal = !is_child
            && !flags.contains(WindowFlags::POPUP)
            && !flags.contains(WindowFlags::TOOLTIP);

        let Some(w) = self.windows.get_mut(handle) else { return false };
        w.flags = flags;
        w.appearing = !w.was_active;
        w.active = true;
        w.last_active_frame = frame;
        w.parent = parent;
        w.title_bar_height = title_h;
        w.hidden_frames = w.hidden_frames.saturating_sub(1);
        if w.appearing && flags.contains(WindowFlags::POPUP) {
            w.reposition_frames = 2;
        }

        if let Some((pos, cond)) = next.pos {
            if w.cond_allows(cond, ONCE_POS) {
                w.pos = pos;
                w.once_used |= ONCE_POS;
            }
        }
        if let Some((size, cond)) = next.size {
            if w.cond_allows(cond, ONCE_SIZE) {
                w.size = size;
                w.once_used |= ONCE_SIZE;
                w.auto_fit_frames = 0;
            }
        }
        if let Some((collapsed, cond)) = next.collapsed {
            if w.cond_allows(cond, ONCE_COLLAPSED) {
                w.collapsed = collapsed;
                w.once_used |= ONCE_COLLAPSED;
            }
        }
        if !has_title {
            w.collapsed = false;
        }

        let always_fit = flags.contains(WindowFlags::ALWAYS_AUTO_RESIZE);
        if always_fit || w.auto_fit_frames > 0 {
            // the first fit uses no measured content yet
            if w.auto_fit_frames == 2 || (always_fit && w.appearing) {
                w.hidden_frames = w.hidden_frames.max(1);
            }
            w.auto_fit_frames = w.auto_fit_frames.saturating_sub(1);
            let fitted = w.content_size + padding * 2.0 + Vec2::new(0.0, title_h);
            w.size = fitted.min(display.size());
        }
        if is_root_normal {
            w.size = w.size.max(min_size);
        }

        if let Some((anchor, avoid)) = next.anchor {
            if flags.contains(WindowFlags::TOOLTIP) || w.reposition_frames > 0 {
                w.pos = find_best_popup_pos(anchor, w.size, display, avoid).0;
            }
        }
        w.reposition_frames = w.reposition_frames.saturating_sub(1);
        if closed {
            w.hidden_frames = w.hidden_frames.max(1);
        }
        w.draw_list.reset(parent_clip.unwrap_or(display));
        let window_id = w.id;
        let focus = next.focus || (w.appearing && is_root_normal);

        if let Some(parent) = parent {
            if let Some(p) = self.windows.get_mut(parent) {
                p.children.push(handle);
            }
            self.windows.detach_root(handle);
        } else {
            self.windows.attach_root(handle);
        }
        if focus && !closed {
            self.windows.focus(Some(handle));
        }

        self.window_stack.push(WindowScope {
            handle,
            id_depth: self.ids.depth(),
            clip_depth: 0,
            group_depth: 0,
            tree_depth: self.tree_depth,
            popup: flags.contains(WindowFlags::POPUP),
        });
        self.ids.push(window_id);

        if has_title && !closed {
            self.title_bar_behavior(handle, open);
        }
        if is_root_normal && !always_fit && !closed && !flags.contains(WindowFlags::NO_RESIZE) {
            self.resize_grip_behavior(handle);
        }
        self.update_window_geometry(handle, parent_clip);
        if !closed {
            self.scrollbar_behavior(handle);
            self.render_window_chrome(handle, next.border);
        }

        let spacing = self.config.style.item_spacing;
        let Some(w) = self.windows.get_mut(handle) else { return false };
        let content_clip = w.clip_rect;
        w.draw_list.push_clip_rect(content_clip);
        let origin = w.inner_rect.min() + padding - Vec2::new(0.0, w.scroll.y);
        let region_max = w.inner_rect.max() - padding;
        w.cursor = LayoutCursor::new(origin, region_max, spacing);
        w.skip_items = w.collapsed || closed;
        let clip_depth = w.draw_list.clip_depth();
        let visible = !w.skip_items;
        if let Some(scope) = self.window_stack.last_mut() {
            scope.clip_depth = clip_depth;
        }
        visible
    }

    /// Re-enters a window already begun this frame.
    fn resume_window(&mut self, handle: Handle) -> bool {
        let Some(w) = self.windows.get_mut(handle) else { return false };
        let clip = w.clip_rect;
        w.draw_list.push_clip_rect(clip);
        let scope = WindowScope {
            handle,
            id_depth: self.ids.depth(),
            clip_depth: w.draw_list.clip_depth(),
            group_depth: w.cursor.group_depth(),
            tree_depth: self.tree_depth,
            popup: w.flags.contains(WindowFlags::POPUP),
        };
        let (id, visible) = (w.id, !w.skip_items);
        self.window_stack.push(scope);
        self.ids.push(id);
        visible
    }

    fn title_bar_behavior(&mut self, handle: Handle, open: Option<&mut bool>) {
        let Some(w) = self.windows.get(handle) else { return };
        let (id, flags, title_rect) = (w.id, w.flags, w.title_bar_rect());
        let font_size = self.atlas.font.size;
        let frame_padding = self.config.style.frame_padding;
        let button_size = Vec2::splat(font_size);

        let drag = self.button_behavior(title_rect, id.combine_label("#MOVE"));
        let mut toggle = drag.hovered
            && self.input.mouse_double_clicked(MouseButton::Left)
            && !flags.contains(WindowFlags::NO_COLLAPSE);
        if !flags.contains(WindowFlags::NO_COLLAPSE) {
            let arrow = Rect::from_pos_size(title_rect.min() + frame_padding, button_size);
            toggle |= self.button_behavior(arrow, id.combine_label("#COLLAPSE")).pressed;
        }
        let mut close = false;
        if open.is_some() {
            let pos = Vec2::new(
                title_rect.right() - frame_padding.x - font_size,
                title_rect.y + frame_padding.y,
            );
            close = self
                .button_behavior(Rect::from_pos_size(pos, button_size), id.combine_label("#CLOSE"))
                .pressed;
        }

        let mouse = self.input.mouse_pos();
        let offset = self.active_click_offset;
        let Some(w) = self.windows.get_mut(handle) else { return };
        if drag.held && !flags.contains(WindowFlags::NO_MOVE) {
            if let Some(mouse) = mouse {
                w.pos = (mouse - offset).floor();
            }
        }
        if toggle {
            w.collapsed = !w.collapsed;
            tracing::trace!(window = %w.name, collapsed = w.collapsed, "window collapse toggled");
        }
        if close {
            if let Some(open) = open {
                *open = false;
            }
        }
    }

    fn resize_grip_behavior(&mut self, handle: Handle) {
        let Some(w) = self.windows.get(handle) else { return };
        if w.collapsed {
            return;
        }
        let grip = self.config.style.resize_grip_size;
        let min_size = self.config.style.window_min_size;
        let rect = Rect::from_pos_size(w.pos + w.size - Vec2::splat(grip), Vec2::splat(grip));
        let id = w.id.combine_label("#RESIZE");
        let inter = self.button_behavior(rect, id);
        if !inter.held {
            return;
        }
        let Some(mouse) = self.input.mouse_pos() else { return };
        let corner = mouse - self.active_click_offset + Vec2::splat(grip);
        if let Some(w) = self.windows.get_mut(handle) {
            w.size = (corner - w.pos).max(min_size).floor();
        }
    }

    fn update_window_geometry(&mut self, handle: Handle, parent_clip: Option<Rect>) {
        let style = &self.config.style;
        let (padding, scrollbar_size) = (style.window_padding, style.scrollbar_size);
        let Some(w) = self.windows.get_mut(handle) else { return };
        if let Some(target) = w.scroll_target.take() {
            w.scroll.y = target;
        }
        let title_h = w.title_bar_height;
        let inner_h = (w.size.y - title_h).max(0.0);
        let scroll_max_y = (w.content_size.y + padding.y * 2.0 - inner_h).max(0.0);
        w.scrollbar_y = !w.flags.contains(WindowFlags::NO_SCROLLBAR) && !w.collapsed && scroll_max_y > 0.0;
        let inner_w = if w.scrollbar_y { w.size.x - scrollbar_size } else { w.size.x };
        w.scroll_max = Vec2::new(0.0, scroll_max_y);
        w.scroll = Vec2::new(0.0, w.scroll.y.clamp(0.0, scroll_max_y));

        let inner = if w.collapsed {
            Rect::from_pos_size(Vec2::new(w.pos.x, w.pos.y + title_h), Vec2::ZERO)
        } else {
            Rect::new(w.pos.x, w.pos.y + title_h, inner_w.max(0.0), inner_h)
        };
        w.inner_rect = inner;
        let outer = w.outer_rect();
        match parent_clip {
            Some(clip) => {
                w.clip_rect = inner.clip_to(&clip);
                w.hit_rect = outer.clip_to(&clip);
            }
            None => {
                w.clip_rect = inner;
                w.hit_rect = outer;
            }
        }
    }

    /// Vertical scrollbar: dragging the thumb scrolls proportionally, a click
    /// on the track pages.
    fn scrollbar_behavior(&mut self, handle: Handle) {
        let Some(w) = self.windows.get(handle) else { return };
        if !w.scrollbar_y {
            return;
        }
        let style = &self.config.style;
        let track = Rect::new(
            w.inner_rect.right(),
            w.inner_rect.y,
            style.scrollbar_size,
            w.inner_rect.height,
        );
        let total = w.content_size.y + style.window_padding.y * 2.0;
        let thumb_h = (track.height * (track.height / total.max(1.0))).clamp(style.grab_min_size, track.height);
        let travel = (track.height - thumb_h).max(1.0);
        let (scroll, scroll_max, page) = (w.scroll.y, w.scroll_max.y, w.inner_rect.height);
        let thumb_y = track.y + travel * (scroll / scroll_max.max(1.0));
        let id = w.id.combine_label("#SCROLLY");

        let inter = self.button_behavior(track, id);
        if !inter.held {
            return;
        }
        let Some(mouse) = self.input.mouse_pos() else { return };
        let mut scroll = scroll;
        if self.input.mouse_pressed(MouseButton::Left) {
            if mouse.y < thumb_y {
                scroll = (scroll - page).max(0.0);
            } else if mouse.y >= thumb_y + thumb_h {
                scroll = (scroll + page).min(scroll_max);
            }
            *self.state.get_or_default::<DragState>(id) = DragState {
                start_value: scroll,
                start_mouse: mouse,
            };
        }
        let drag = *self.state.get_or_default::<DragState>(id);
        scroll = drag.start_value + (mouse.y - drag.start_mouse.y) * (scroll_max / travel);
        if let Some(w) = self.windows.get_mut(handle) {
            w.scroll.y = scroll.clamp(0.0, scroll_max).floor();
        }
    }

    fn render_window_chrome(&mut self, handle: Handle, child_border: bool) {
        let focused_root = self.windows.focused();
        let is_focused = focused_root == Some(self.windows.root_of(handle));
        let active_id = self.active_id;
        let style = &self.config.style;
        let font = &self.atlas.font;
        let Some(w) = self.windows.get_mut(handle) else { return };
        let flags = w.flags;
        let outer = w.outer_rect();
        let title_rect = w.title_bar_rect();

        if !w.collapsed && !flags.contains(WindowFlags::NO_BACKGROUND) {
            let bg = if flags.contains(WindowFlags::CHILD) {
                StyleColor::ChildBg
            } else if flags.contains(WindowFlags::POPUP) || flags.contains(WindowFlags::TOOLTIP) {
                StyleColor::PopupBg
            } else {
                StyleColor::WindowBg
            };
            let body = Rect::from_min_max(Vec2::new(outer.x, title_rect.bottom()), outer.max());
            w.draw_list.add_rect_filled(body, style.color(bg));
        }

        if w.title_bar_height > 0.0 {
            let slot = if is_focused { StyleColor::TitleBgActive } else { StyleColor::TitleBg };
            w.draw_list.add_rect_filled(title_rect, style.color(slot));
            let mut text_x = title_rect.x + style.frame_padding.x;
            if !flags.contains(WindowFlags::NO_COLLAPSE) {
                let center = title_rect.min() + style.frame_padding + Vec2::splat(font.size * 0.5);
                let r = font.size * 0.3;
                let text = style.color(StyleColor::Text);
                if w.collapsed {
                    w.draw_list.add_triangle_filled(
                        center + Vec2::new(-r * 0.5, -r),
                        center + Vec2::new(r * 0.75, 0.0),
                        center + Vec2::new(-r * 0.5, r),
                        text,
                    );
                } else {
                    w.draw_list.add_triangle_filled(
                        center + Vec2::new(-r, -r * 0.5),
                        center + Vec2::new(r, -r * 0.5),
                        center + Vec2::new(0.0, r * 0.75),
                        text,
                    );
                }
                text_x += font.size + style.item_inner_spacing.x;
            }
            w.draw_list.push_clip_rect(title_rect);
            w.draw_list.add_text(
                font,
                Vec2::new(text_x, title_rect.y + style.frame_padding.y),
                style.color(StyleColor::Text),
                display_part(&w.name),
            );
            w.draw_list.pop_clip_rect();
        }

        if w.scrollbar_y {
            let track = Rect::new(w.inner_rect.right(), w.inner_rect.y, style.scrollbar_size, w.inner_rect.height);
            let total = w.content_size.y + style.window_padding.y * 2.0;
            let thumb_h = (track.height * (track.height / total.max(1.0))).clamp(style.grab_min_size, track.height);
            let travel = track.height - thumb_h;
            let thumb_y = track.y + travel * (w.scroll.y / w.scroll_max.y.max(1.0));
            w.draw_list.add_rect_filled(track, style.color(StyleColor::ScrollbarBg));
            w.draw_list.add_rect_filled(
                Rect::new(track.x + 2.0, thumb_y, (track.width - 4.0).max(1.0), thumb_h),
                style.color(StyleColor::ScrollbarGrab),
            );
        }

        let resizable = !flags.contains(WindowFlags::NO_RESIZE)
            && !flags.contains(WindowFlags::ALWAYS_AUTO_RESIZE)
            && !flags.contains(WindowFlags::CHILD)
            && !flags.contains(WindowFlags::POPUP)
            && !flags.contains(WindowFlags::TOOLTIP);
        if resizable && !w.collapsed {
            let corner = outer.max();
            let grip = style.resize_grip_size;
            let resizing = active_id.is_some() && active_id == w.id.combine_label("#RESIZE");
            let color = style.color(StyleColor::ResizeGrip);
            let color = if resizing { color.with_alpha(0.9) } else { color };
            w.draw_list.add_triangle_filled(
                corner,
                corner - Vec2::new(grip, 0.0),
                corner - Vec2::new(0.0, grip),
                color,
            );
        }

        let bordered = !flags.contains(WindowFlags::CHILD) || child_border;
        if bordered && style.window_border_size > 0.0 && !flags.contains(WindowFlags::NO_BACKGROUND) {
            w.draw_list.add_rect(outer, style.color(StyleColor::Border), style.window_border_size);
        }
    }

    /// Checks that the top window may be ended by `call` and returns it.
    fn check_end(&mut self, call: &'static str) -> Option<Handle> {
        if self.window_stack.len() <= 1 {
            self.report(&UiError::StackUnderflow(StackKind::Window));
            return None;
        }
        let handle = self.current_handle()?;
        let window = self.windows.get(handle)?;
        let expected = if window.flags.contains(WindowFlags::CHILD) {
            "end_child"
        } else if window.flags.contains(WindowFlags::POPUP) {
            "end_popup"
        } else if window.flags.contains(WindowFlags::TOOLTIP) {
            "end_tooltip"
        } else {
            "end_window"
        };
        if expected != call {
            let error = UiError::WindowMismatch {
                window: window.name.clone(),
                expected,
                found: call,
            };
            self.report(&error);
        }
        Some(handle)
    }

    /// Pops the top window scope, restoring every stack to its entry depth.
    pub(crate) fn pop_window_scope(&mut self) {
        let Some(scope) = self.window_stack.pop() else { return };
        let mut errors = Vec::new();
        if let Some(w) = self.windows.get_mut(scope.handle) {
            let mut check = |stack: StackKind, expected: usize, found: usize| {
                if expected != found {
                    errors.push(UiError::StackImbalance {
                        stack,
                        scope: w.name.clone(),
                        expected,
                        found,
                    });
                }
            };
            check(StackKind::Tree, scope.tree_depth, self.tree_depth);
            check(StackKind::Group, scope.group_depth, w.cursor.group_depth());
            check(StackKind::Clip, scope.clip_depth, w.draw_list.clip_depth());
            check(StackKind::Id, scope.id_depth + 1, self.ids.depth());

            w.cursor.truncate_groups(scope.group_depth);
            w.draw_list.truncate_clips(scope.clip_depth);
            w.draw_list.pop_clip_rect();
            if !w.skip_items {
                w.content_size = w.cursor.content_size();
            }
        }
        self.tree_depth = scope.tree_depth;
        self.ids.truncate(scope.id_depth);
        for error in &errors {
            self.report(error);
        }
    }

    // ---------------------------------------------------------------------
    // Window queries
    // ---------------------------------------------------------------------

    /// Returns true if the pointer is over the current window.
    #[must_use]
    pub fn is_window_hovered(&self) -> bool {
        self.hovered_window.is_some() && self.hovered_window == self.current_handle()
    }

    /// Returns true on the first frame the current window is shown.
    #[must_use]
    pub fn is_window_appearing(&self) -> bool {
        self.current_window().is_some_and(|w| w.appearing)
    }

    /// Returns true if the current window is collapsed.
    #[must_use]
    pub fn is_window_collapsed(&self) -> bool {
        self.current_window().is_some_and(|w| w.collapsed)
    }

    /// Position of the current window.
    #[must_use]
    pub fn window_pos(&self) -> Vec2 {
        self.current_window().map_or(Vec2::ZERO, |w| w.pos)
    }

    /// Size of the current window.
    #[must_use]
    pub fn window_size(&self) -> Vec2 {
        self.current_window().map_or(Vec2::ZERO, |w| w.size)
    }

    // ---------------------------------------------------------------------
    // Scrolling
    // ---------------------------------------------------------------------

    /// Vertical scroll of the current window.
    #[must_use]
    pub fn scroll_y(&self) -> f32 {
        self.current_window().map_or(0.0, |w| w.scroll.y)
    }

    /// Largest vertical scroll of the current window.
    #[must_use]
    pub fn scroll_max_y(&self) -> f32 {
        self.current_window().map_or(0.0, |w| w.scroll_max.y)
    }

    /// Scrolls the current window next frame.
    pub fn set_scroll_y(&mut self, scroll: f32) {
        if let Some(w) = self.current_window_mut() {
            w.scroll_target = Some(scroll.max(0.0));
        }
    }

    /// Scrolls so the cursor line sits at `ratio` of the visible height
    /// (0 top, 0.5 center, 1 bottom) next frame.
    pub fn set_scroll_here_y(&mut self, ratio: f32) {
        let padding = self.config.style.window_padding.y;
        if let Some(w) = self.current_window_mut() {
            let content_y = w.cursor.pos().y - w.cursor.origin().y;
            let target = content_y + padding - ratio.clamp(0.0, 1.0) * w.inner_rect.height;
            w.scroll_target = Some(target.max(0.0));
        }
    }

    /// Scrolls the hovered window with the wheel, bubbling to the parent
    /// when the window cannot scroll.
    pub(crate) fn scroll_hovered_window(&mut self) {
        let wheel = self.input.wheel().y;
        if wheel == 0.0 || self.prev_wheel_claimed {
            return;
        }
        let step = self.atlas.font.size * self.config.wheel_scroll_lines;
        let mut target = self.hovered_window;
        while let Some(handle) = target {
            let Some(w) = self.windows.get_mut(handle) else { break };
            if !w.flags.contains(WindowFlags::NO_SCROLL_WITH_MOUSE) && w.scroll_max.y > 0.0 {
                w.scroll.y = (w.scroll.y - wheel * step).clamp(0.0, w.scroll_max.y).floor();
                return;
            }
            target = w.parent;
        }
    }

    // ---------------------------------------------------------------------
    // Child regions
    // ---------------------------------------------------------------------

    /// Begins a scrollable child region at the cursor.
    ///
    /// A non-positive size component is relative to the available space.
    /// [`Context::end_child`] must be called either way.
    pub fn begin_child(&mut self, name: &str, size: Vec2, border: bool) -> bool {
        let Some(parent) = self.current_window() else {
            self.report(&UiError::OutsideFrame("begin_child"));
            return false;
        };
        let full_name = format!("{}/{}", parent.name, name);
        let avail = parent.cursor.content_region_avail();
        let pos = parent.cursor.pos();
        let resolve = |requested: f32, avail: f32| {
            if requested > 0.0 {
                requested
            } else {
                (avail + requested).max(4.0)
            }
        };
        let size = Vec2::new(resolve(size.x, avail.x), resolve(size.y, avail.y)).floor();
        self.next_window.pos = Some((pos, Cond::Always));
        self.next_window.size = Some((size, Cond::Always));
        self.next_window.border = border;
        self.begin_window_ex(&full_name, None, CHILD_FLAGS)
    }

    /// Ends a child region and places it as an item in the parent.
    pub fn end_child(&mut self) {
        let Some(handle) = self.check_end("end_child") else { return };
        let child = self
            .windows
            .get(handle)
            .map(|w| (w.is_child(), w.size));
        self.pop_window_scope();
        if let Some((true, size)) = child {
            self.item_size(size);
        }
    }

    /// Runs `f` inside a child region.
    pub fn child<R>(&mut self, name: &str, size: Vec2, border: bool, f: impl FnOnce(&mut Self) -> R) -> Option<R> {
        let visible = self.begin_child(name, size, border);
        let result = visible.then(|| f(self));
        self.end_child();
        result
    }

    // ---------------------------------------------------------------------
    // Popups
    // ---------------------------------------------------------------------

    /// Opens the popup `label` at the current nesting level, closing any
    /// other popup open at this level or above.
    pub fn open_popup(&mut self, label: &str) {
        let id = self.get_id(label);
        let level = self.begin_popup_stack.len();
        let open_pos = self.input.mouse_pos().unwrap_or_else(|| self.cursor_pos());
        if self.open_popups.get(level).is_some_and(|p| p.id == id) {
            self.open_popups.truncate(level + 1);
            return;
        }
        self.open_popups.truncate(level);
        self.open_popups.push(OpenPopup {
            id,
            window: None,
            open_pos,
        });
        tracing::debug!(popup = label, level, "popup opened");
    }

    /// Returns true if the popup `label` is open at the current level.
    #[must_use]
    pub fn is_popup_open(&self, label: &str) -> bool {
        let id = self.get_id(label);
        self.open_popups
            .get(self.begin_popup_stack.len())
            .is_some_and(|p| p.id == id)
    }

    /// Begins the popup `label` if it is open. Call [`Context::end_popup`]
    /// only when this returns true.
    pub fn begin_popup(&mut self, label: &str) -> bool {
        if !self.is_popup_open(label) {
            self.next_window = Default::default();
            return false;
        }
        let level = self.begin_popup_stack.len();
        let Some(popup) = self.open_popups.get(level).copied() else { return false };
        let name = format!("##Popup_{:016x}", popup.id.raw());
        let anchor = popup.open_pos;
        let avoid = Rect::from_min_max(anchor - Vec2::splat(8.0), anchor + Vec2::splat(8.0));
        self.next_window.anchor = Some((anchor, avoid));
        self.begin_popup_stack.push(popup.id);
        self.begin_window_ex(&name, None, POPUP_FLAGS);
        let handle = self.current_handle();
        if let Some(entry) = self.open_popups.get_mut(level) {
            entry.window = handle;
        }
        true
    }

    /// Ends a popup begun with [`Context::begin_popup`].
    pub fn end_popup(&mut self) {
        if self.check_end("end_popup").is_some() {
            self.begin_popup_stack.pop();
            self.pop_window_scope();
        }
    }

    /// Runs `f` inside the popup `label` if it is open.
    pub fn popup<R>(&mut self, label: &str, f: impl FnOnce(&mut Self) -> R) -> Option<R> {
        if !self.begin_popup(label) {
            return None;
        }
        let result = f(self);
        self.end_popup();
        Some(result)
    }

    /// Closes the popup being built and every popup above it.
    pub fn close_current_popup(&mut self) {
        let in_popup = self.window_stack.last().is_some_and(|s| s.popup);
        let level = self.begin_popup_stack.len();
        if !in_popup || level == 0 {
            return;
        }
        tracing::debug!(level, "popup closed");
        self.open_popups.truncate(level - 1);
    }

    /// Number of open popups.
    #[must_use]
    pub fn open_popup_count(&self) -> usize {
        self.open_popups.len()
    }

    /// Closes the popups above the one the pointer pressed in, or all of
    /// them when the press landed outside every popup.
    pub(crate) fn close_popups_over_window(&mut self, pressed_in: Option<Handle>) {
        if self.open_popups.is_empty() {
            return;
        }
        let root = pressed_in.map(|h| self.windows.root_of(h));
        let keep = root.map_or(0, |root| {
            self.open_popups
                .iter()
                .rposition(|p| p.window == Some(root))
                .map_or(0, |index| index + 1)
        });
        if keep < self.open_popups.len() {
            tracing::debug!(closed = self.open_popups.len() - keep, "popups closed by click");
            self.open_popups.truncate(keep);
        }
    }

    /// Escape closes the topmost popup.
    pub(crate) fn close_popup_on_escape(&mut self) {
        if self.input.key_pressed(Key::Escape) && self.open_popups.pop().is_some() {
            tracing::debug!("popup closed by escape");
        }
    }

    // ---------------------------------------------------------------------
    // Tooltips
    // ---------------------------------------------------------------------

    /// Shows `text` in a tooltip next to the pointer this frame.
    ///
    /// The tooltip is built from the deferred queue, after every window.
    pub fn set_tooltip(&mut self, text: impl Into<String>) {
        let text = text.into();
        self.defer(move |ctx| {
            ctx.begin_tooltip();
            crate::widget::text(ctx, &text);
            ctx.end_tooltip();
        });
    }

    /// Begins the tooltip window. Content submitted until
    /// [`Context::end_tooltip`] is shown next to the pointer.
    pub fn begin_tooltip(&mut self) -> bool {
        let mouse = self.input.mouse_pos().unwrap_or(Vec2::ZERO);
        let offset = self.config.style.tooltip_offset;
        let avoid = Rect::from_min_max(mouse - Vec2::new(16.0, 8.0), mouse + offset);
        self.next_window.anchor = Some((mouse, avoid));
        self.begin_window_ex(TOOLTIP_WINDOW, None, TOOLTIP_FLAGS)
    }

    /// Ends the tooltip window.
    pub fn end_tooltip(&mut self) {
        if self.check_end("end_tooltip").is_some() {
            self.pop_window_scope();
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::config::UiConfig;
    use crate::error::ErrorPolicy;
    use crate::font::{FontAtlas, TextureId};
    use crate::input::{InputState, MouseButton};
    use crate::window::{Cond, WindowFlags};
    use crate::{Context, StackDepths};
    use vellum_core::Vec2;

    fn context() -> Context {
        let config = UiConfig {
            error_policy: ErrorPolicy::Recover,
            ..UiConfig::default()
        };
        Context::new(config, FontAtlas::monospace(TextureId(1), 7.0, 13.0))
    }

    #[test]
    fn test_unbalanced_window_is_closed_at_end_frame() {
        let mut ctx = context();
        let mut input = InputState::new();
        ctx.begin_frame(&mut input, 0.016);
        ctx.begin_window("Left open", WindowFlags::NONE);
        ctx.push_id("also open");
        ctx.end_frame();
        assert_eq!(ctx.stack_depths(), StackDepths::default());
    }

    #[test]
    fn test_end_window_underflow_is_ignored() {
        let mut ctx = context();
        let mut input = InputState::new();
        ctx.begin_frame(&mut input, 0.016);
        ctx.end_window();
        assert_eq!(ctx.stack_depths().window, 1);
        ctx.end_frame();
    }

    #[test]
    fn test_cond_first_use_ever() {
        let mut ctx = context();
        let mut input = InputState::new();
        for pos in [Vec2::new(10.0, 10.0), Vec2::new(50.0, 50.0)] {
            ctx.begin_frame(&mut input, 0.016);
            ctx.set_next_window_pos(pos, Cond::FirstUseEver);
            ctx.begin_window("W", WindowFlags::NONE);
            assert_eq!(ctx.window_pos(), Vec2::new(10.0, 10.0));
            ctx.end_window();
            ctx.end_frame();
        }
    }

    #[test]
    fn test_child_region_places_item() {
        let mut ctx = context();
        let mut input = InputState::new();
        ctx.begin_frame(&mut input, 0.016);
        ctx.set_next_window_size(Vec2::new(300.0, 300.0), Cond::Always);
        ctx.begin_window("Parent", WindowFlags::NO_TITLE_BAR);
        let start = ctx.cursor_pos();
        ctx.begin_child("list", Vec2::new(0.0, 100.0), true);
        assert_eq!(ctx.window_size(), Vec2::new(284.0, 100.0));
        assert_eq!(ctx.window_pos(), start);
        ctx.end_child();
        assert_eq!(ctx.last_item().rect.height, 100.0);
        ctx.end_window();
        ctx.end_frame();
        assert!(ctx.windows().find_by_name("Parent/list").is_some());
    }

    #[test]
    fn test_popup_open_and_close_by_click_outside() {
        let mut ctx = context();
        let mut input = InputState::new();
        let mut shown = Vec::new();
        for step in 0..4 {
            if step == 2 {
                input.set_mouse_pos(1000.0, 700.0);
                input.mouse_button_down(MouseButton::Left);
            }
            ctx.begin_frame(&mut input, 0.016);
            ctx.begin_window("Host", WindowFlags::NONE);
            if step == 0 {
                ctx.open_popup("menu");
            }
            shown.push(ctx.popup("menu", |ctx| crate::widget::text(ctx, "item")).is_some());
            ctx.end_window();
            ctx.end_frame();
        }
        assert_eq!(shown, vec![true, true, false, false]);
    }
}
