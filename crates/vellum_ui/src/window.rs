//! Window registry and z-order.
//!
//! Windows live in an [`Arena`] and refer to each other by [`Handle`]: a child
//! stores its parent's handle, a parent lists its children's handles for the
//! current frame. Nothing owns anything else, so there are no ownership cycles
//! between windows and their draw lists.

use crate::draw::DrawList;
use crate::font::TextureId;
use crate::layout::LayoutCursor;
use std::collections::HashMap;
use std::ops::BitOr;
use vellum_core::{Arena, Handle, IdStack, Rect, Vec2, WidgetId};

/// Window behaviour flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WindowFlags(u32);

impl WindowFlags {
    /// No flags.
    pub const NONE: Self = Self(0);
    /// No title bar (also disables moving by title and collapsing).
    pub const NO_TITLE_BAR: Self = Self(1 << 0);
    /// No resize grip.
    pub const NO_RESIZE: Self = Self(1 << 1);
    /// Title bar drag does not move the window.
    pub const NO_MOVE: Self = Self(1 << 2);
    /// Never show a scrollbar.
    pub const NO_SCROLLBAR: Self = Self(1 << 3);
    /// Wheel scrolling passes through to the parent.
    pub const NO_SCROLL_WITH_MOUSE: Self = Self(1 << 4);
    /// No collapse arrow; title double-click does nothing.
    pub const NO_COLLAPSE: Self = Self(1 << 5);
    /// Size follows the content of the previous frame.
    pub const ALWAYS_AUTO_RESIZE: Self = Self(1 << 6);
    /// No background fill or border.
    pub const NO_BACKGROUND: Self = Self(1 << 7);
    /// Never hovered; the pointer passes through.
    pub const NO_INPUTS: Self = Self(1 << 8);
    /// Clicking does not raise the window.
    pub const NO_BRING_TO_FRONT_ON_FOCUS: Self = Self(1 << 9);
    /// Set on windows created by `begin_child`.
    pub const CHILD: Self = Self(1 << 24);
    /// Set on windows created by `begin_popup`.
    pub const POPUP: Self = Self(1 << 25);
    /// Set on the tooltip window.
    pub const TOOLTIP: Self = Self(1 << 26);

    /// Returns true if every flag in `other` is set.
    #[inline]
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Flags set in either operand.
    #[inline]
    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Sets the flags in `other`.
    #[inline]
    pub fn insert(&mut self, other: Self) {
        self.0 |= other.0;
    }

    /// Clears the flags in `other`.
    #[inline]
    pub fn remove(&mut self, other: Self) {
        self.0 &= !other.0;
    }
}

impl BitOr for WindowFlags {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

/// When a `set_next_window_*` value is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cond {
    /// Every frame.
    #[default]
    Always,
    /// The first time per window and property.
    Once,
    /// Only on the frame the window is created.
    FirstUseEver,
    /// On frames where the window becomes visible after being hidden.
    Appearing,
}

/// Stacking layer. Later layers always draw above earlier ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Layer {
    /// Regular windows.
    Normal,
    /// Popups.
    Popup,
    /// The tooltip.
    Tooltip,
}

impl Layer {
    /// Layer implied by window flags.
    #[must_use]
    pub fn of(flags: WindowFlags) -> Self {
        if flags.contains(WindowFlags::TOOLTIP) {
            Self::Tooltip
        } else if flags.contains(WindowFlags::POPUP) {
            Self::Popup
        } else {
            Self::Normal
        }
    }
}

/// Bits of [`Window::once_used`].
pub(crate) const ONCE_POS: u8 = 1 << 0;
pub(crate) const ONCE_SIZE: u8 = 1 << 1;
pub(crate) const ONCE_COLLAPSED: u8 = 1 << 2;

/// A top-level window, child region, popup or tooltip.
#[derive(Debug, Clone)]
pub struct Window {
    /// Full name, also the source of [`Window::id`].
    pub name: String,
    /// Hash of the name.
    pub id: WidgetId,
    /// Flags passed to the last begin.
    pub flags: WindowFlags,
    /// Top-left corner.
    pub pos: Vec2,
    /// Expanded size.
    pub size: Vec2,
    /// Content extent measured in the previous frame.
    pub content_size: Vec2,
    /// Current scroll offset.
    pub scroll: Vec2,
    /// Largest allowed scroll offset this frame.
    pub scroll_max: Vec2,
    /// Scroll requested for the next frame.
    pub(crate) scroll_target: Option<f32>,
    /// Only the title bar is shown.
    pub collapsed: bool,
    /// Outer rect clipped by the parent, used for hit testing next frame.
    pub hit_rect: Rect,
    /// Content area, inside title bar and scrollbar.
    pub inner_rect: Rect,
    /// Clip rect for content.
    pub clip_rect: Rect,
    /// Height of the title bar (0 without one).
    pub title_bar_height: f32,
    /// Window of a child region.
    pub parent: Option<Handle>,
    /// Children begun this frame, in order.
    pub children: Vec<Handle>,
    /// Referenced this frame.
    pub active: bool,
    /// Referenced last frame.
    pub was_active: bool,
    /// Became active this frame after at least one frame without reference.
    pub appearing: bool,
    /// Frames left to skip rendering and hit testing.
    pub hidden_frames: u8,
    /// Frame number of the last reference.
    pub last_active_frame: u64,
    /// Frame number of creation.
    pub created_frame: u64,
    /// Something was laid out this frame.
    pub write_accessed: bool,
    /// Content will skip drawing (collapsed or clipped away).
    pub skip_items: bool,
    /// Vertical scrollbar shown this frame.
    pub scrollbar_y: bool,
    /// Popup position is recomputed while non-zero.
    pub(crate) reposition_frames: u8,
    /// Size is fitted to the content while non-zero.
    pub(crate) auto_fit_frames: u8,
    /// `Cond::Once` properties already applied.
    pub(crate) once_used: u8,
    /// Geometry.
    pub draw_list: DrawList,
    /// Layout state of the content area.
    pub cursor: LayoutCursor,
}

impl Window {
    fn new(name: &str, id: WidgetId, frame: u64, atlas: TextureId, white_uv: Vec2) -> Self {
        Self {
            name: name.to_owned(),
            id,
            flags: WindowFlags::NONE,
            pos: Vec2::new(60.0, 60.0),
            size: Vec2::ZERO,
            content_size: Vec2::ZERO,
            scroll: Vec2::ZERO,
            scroll_max: Vec2::ZERO,
            scroll_target: None,
            collapsed: false,
            hit_rect: Rect::ZERO,
            inner_rect: Rect::ZERO,
            clip_rect: Rect::ZERO,
            title_bar_height: 0.0,
            parent: None,
            children: Vec::new(),
            active: false,
            was_active: false,
            appearing: false,
            hidden_frames: 0,
            last_active_frame: frame,
            created_frame: frame,
            write_accessed: false,
            skip_items: false,
            scrollbar_y: false,
            reposition_frames: 0,
            auto_fit_frames: 2,
            once_used: 0,
            draw_list: DrawList::new(atlas, white_uv),
            cursor: LayoutCursor::new(Vec2::ZERO, Vec2::ZERO, Vec2::ZERO),
        }
    }

    /// Rect covering the title bar.
    #[must_use]
    pub fn title_bar_rect(&self) -> Rect {
        Rect::from_pos_size(self.pos, Vec2::new(self.size.x, self.title_bar_height))
    }

    /// Rect drawn this frame: the title bar only when collapsed.
    #[must_use]
    pub fn outer_rect(&self) -> Rect {
        if self.collapsed {
            self.title_bar_rect()
        } else {
            Rect::from_pos_size(self.pos, self.size)
        }
    }

    /// Stacking layer.
    #[must_use]
    pub fn layer(&self) -> Layer {
        Layer::of(self.flags)
    }

    /// Returns true for child regions.
    #[must_use]
    pub fn is_child(&self) -> bool {
        self.flags.contains(WindowFlags::CHILD)
    }

    /// Returns true if a `Cond` allows applying a property this frame.
    pub(crate) fn cond_allows(&self, cond: Cond, once_bit: u8) -> bool {
        match cond {
            Cond::Always => true,
            Cond::Once => self.once_used & once_bit == 0,
            Cond::FirstUseEver => self.created_frame == self.last_active_frame && !self.was_active,
            Cond::Appearing => self.appearing,
        }
    }

    /// Returns true if the window draws and takes input this frame.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.active && self.hidden_frames == 0
    }
}

/// Id of a window name. Independent of the id stack.
#[must_use]
pub fn window_id(name: &str) -> WidgetId {
    IdStack::new().get_id(name)
}

/// Owns every window and their stacking order.
#[derive(Debug, Default)]
pub struct WindowManager {
    windows: Arena<Window>,
    by_id: HashMap<WidgetId, Handle>,
    /// Root windows, back to front.
    order: Vec<Handle>,
    focused: Option<Handle>,
}

impl WindowManager {
    /// Creates an empty manager.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of windows, active or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.windows.len()
    }

    /// Returns true if there are no windows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    /// Looks a window up by id.
    #[must_use]
    pub fn find(&self, id: WidgetId) -> Option<Handle> {
        self.by_id.get(&id).copied()
    }

    /// Looks a window up by name.
    #[must_use]
    pub fn find_by_name(&self, name: &str) -> Option<Handle> {
        self.find(window_id(name))
    }

    /// Borrows a window.
    #[must_use]
    pub fn get(&self, handle: Handle) -> Option<&Window> {
        self.windows.get(handle)
    }

    /// Mutably borrows a window.
    pub fn get_mut(&mut self, handle: Handle) -> Option<&mut Window> {
        self.windows.get_mut(handle)
    }

    /// Creates a window.
    pub fn create(&mut self, name: &str, frame: u64, atlas: TextureId, white_uv: Vec2) -> Handle {
        let id = window_id(name);
        let handle = self.windows.insert(Window::new(name, id, frame, atlas, white_uv));
        self.by_id.insert(id, handle);
        tracing::debug!(window = name, %id, "window created");
        handle
    }

    /// Registers a root window in the stacking order, on top of its layer.
    pub fn attach_root(&mut self, handle: Handle) {
        if !self.order.contains(&handle) {
            self.order.push(handle);
            self.sort_layers();
        }
    }

    /// Removes a window from the root order (it became a child).
    pub fn detach_root(&mut self, handle: Handle) {
        self.order.retain(|&h| h != handle);
    }

    fn sort_layers(&mut self) {
        let windows = &self.windows;
        self.order
            .sort_by_key(|&h| windows.get(h).map_or(Layer::Normal, Window::layer));
    }

    /// Topmost ancestor of `handle`.
    #[must_use]
    pub fn root_of(&self, mut handle: Handle) -> Handle {
        while let Some(parent) = self.windows.get(handle).and_then(|w| w.parent) {
            handle = parent;
        }
        handle
    }

    /// Raises the root of `handle` to the top of its layer.
    pub fn bring_to_front(&mut self, handle: Handle) {
        let root = self.root_of(handle);
        self.order.retain(|&h| h != root);
        self.order.push(root);
        self.sort_layers();
    }

    /// Focuses the root of `handle`, raising it unless it opts out.
    pub fn focus(&mut self, handle: Option<Handle>) {
        let root = handle.map(|h| self.root_of(h));
        self.focused = root;
        if let Some(root) = root {
            let raise = self
                .windows
                .get(root)
                .is_some_and(|w| !w.flags.contains(WindowFlags::NO_BRING_TO_FRONT_ON_FOCUS));
            if raise {
                self.bring_to_front(root);
            }
        }
    }

    /// Focused root window.
    #[must_use]
    pub fn focused(&self) -> Option<Handle> {
        self.focused
    }

    /// Root windows back to front.
    #[must_use]
    pub fn order(&self) -> &[Handle] {
        &self.order
    }

    /// Visible windows back to front, each root followed by its children.
    #[must_use]
    pub fn display_order(&self) -> Vec<Handle> {
        fn visit(windows: &Arena<Window>, handle: Handle, out: &mut Vec<Handle>) {
            let Some(window) = windows.get(handle) else { return };
            if !window.is_visible() {
                return;
            }
            out.push(handle);
            for &child in &window.children {
                visit(windows, child, out);
            }
        }
        let mut out = Vec::with_capacity(self.windows.len());
        for &root in &self.order {
            visit(&self.windows, root, &mut out);
        }
        out
    }

    /// Front-most window accepting input under `pos`, using the rects of the
    /// last completed frame.
    #[must_use]
    pub fn hit_test(&self, pos: Vec2) -> Option<Handle> {
        self.display_order().into_iter().rev().find(|&h| {
            self.windows.get(h).is_some_and(|w| {
                !w.flags.contains(WindowFlags::NO_INPUTS) && w.hit_rect.contains(pos)
            })
        })
    }

    /// Starts a frame: every window becomes unreferenced until begun again.
    pub fn begin_frame(&mut self) {
        for (_, window) in self.windows.iter_mut() {
            window.was_active = window.active;
            window.active = false;
            window.write_accessed = false;
            window.children.clear();
        }
    }

    /// Drops the geometry and open groups of an abandoned frame.
    pub fn discard_frame(&mut self) {
        for (_, window) in self.windows.iter_mut() {
            window.draw_list.reset(Rect::EVERYTHING);
            window.cursor.truncate_groups(0);
        }
    }

    /// Destroys windows unreferenced for `reap_frames` frames. 0 disables.
    pub fn reap(&mut self, frame: u64, reap_frames: u64) -> usize {
        if reap_frames == 0 {
            return 0;
        }
        let mut reaped = Vec::new();
        self.windows.retain(|handle, w| {
            let keep = frame.saturating_sub(w.last_active_frame) < reap_frames;
            if !keep {
                tracing::debug!(window = %w.name, "window reaped");
                reaped.push((handle, w.id));
            }
            keep
        });
        for (handle, id) in &reaped {
            self.by_id.remove(id);
            self.order.retain(|h| h != handle);
            if self.focused == Some(*handle) {
                self.focused = None;
            }
        }
        reaped.len()
    }
}

/// Side of the avoided rect a popup was placed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlacementDir {
    /// Right of the avoided rect.
    Right,
    /// Below it.
    Down,
    /// Above it.
    Up,
    /// Left of it.
    Left,
}

/// Position for a window of `size` near `ref_pos` that stays inside `outer`
/// without covering `avoid`.
///
/// Sides are tried right, down, up, left. When none fits, the position is
/// clamped into `outer`.
#[must_use]
pub fn find_best_popup_pos(ref_pos: Vec2, size: Vec2, outer: Rect, avoid: Rect) -> (Vec2, Option<PlacementDir>) {
    // min() first so an oversized window sticks to the top-left of `outer`
    let base = ref_pos.min(outer.max() - size).max(outer.min());
    for dir in [PlacementDir::Right, PlacementDir::Down, PlacementDir::Up, PlacementDir::Left] {
        let avail_w = match dir {
            PlacementDir::Left => avoid.x - outer.x,
            PlacementDir::Right => outer.right() - avoid.right(),
            _ => outer.width,
        };
        let avail_h = match dir {
            PlacementDir::Up => avoid.y - outer.y,
            PlacementDir::Down => outer.bottom() - avoid.bottom(),
            _ => outer.height,
        };
        if avail_w < size.x || avail_h < size.y {
            continue;
        }
        let x = match dir {
            PlacementDir::Left => avoid.x - size.x,
            PlacementDir::Right => avoid.right(),
            _ => base.x,
        };
        let y = match dir {
            PlacementDir::Up => avoid.y - size.y,
            PlacementDir::Down => avoid.bottom(),
            _ => base.y,
        };
        return (Vec2::new(x, y), Some(dir));
    }
    (base, None)
}
