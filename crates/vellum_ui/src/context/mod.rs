//! The frame context.
//!
//! [`Context`] holds everything that lives across widget calls: the input
//! snapshot, the id stack, windows, persistent widget state and hover/active
//! arbitration. It is an ordinary value passed by `&mut`; nothing is global,
//! so a process may run any number of independent contexts.
//!
//! ## Frame lifecycle
//!
//! ```text
//! begin_frame ─► input snapshot ─► widget calls ─► deferred calls ─► end_frame
//!                                    │                                  │
//!                          ids / layout / state                 FrameOutput
//! ```

mod containers;
mod interact;

pub use containers::TOOLTIP_WINDOW;
pub use interact::{Interaction, LastItem};
use interact::ItemRect;

use crate::config::UiConfig;
use crate::draw::{DrawData, DrawList};
use crate::error::{StackKind, UiError};
use crate::font::{Font, FontAtlas};
use crate::input::{InputSnapshot, InputState, InputTracker, MouseButton};
use crate::state::WidgetStateStore;
use crate::style::{Color, Style, StyleColor};
use crate::window::{Cond, WindowFlags, WindowManager};
use std::collections::VecDeque;
use vellum_core::{Handle, IdStack, Rect, Vec2, WidgetId};

/// Name of the window that hosts widgets submitted outside any window.
pub const FALLBACK_WINDOW: &str = "Debug##Default";

/// Something that happened to a widget this frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidgetEvent {
    /// The widget became the active widget.
    Activated(WidgetId),
    /// The widget stopped being the active widget.
    Deactivated(WidgetId),
    /// Press and release both landed on the widget.
    Clicked(WidgetId),
    /// The widget modified the value it edits.
    Changed(WidgetId),
}

impl WidgetEvent {
    /// Widget the event belongs to.
    #[must_use]
    pub const fn id(self) -> WidgetId {
        match self {
            Self::Activated(id) | Self::Deactivated(id) | Self::Clicked(id) | Self::Changed(id) => id,
        }
    }
}

/// Result of a frame.
#[derive(Debug, Clone, Default)]
pub struct FrameOutput {
    /// Geometry to render, back to front.
    pub draw_data: DrawData,
    /// Widget events in the order they happened.
    pub events: Vec<WidgetEvent>,
    /// Topmost widget under the pointer.
    pub hovered_id: WidgetId,
    /// Widget holding the pointer capture at the end of the frame.
    pub active_id: WidgetId,
    /// The pointer is over a window or captured by a widget.
    pub want_capture_mouse: bool,
    /// A widget has keyboard focus.
    pub want_capture_keyboard: bool,
    /// A text field is being edited.
    pub want_text_input: bool,
    /// Index of the frame that produced this output.
    pub frame_index: u64,
}

impl FrameOutput {
    /// Events of one widget.
    pub fn events_for(&self, id: WidgetId) -> impl Iterator<Item = WidgetEvent> + '_ {
        self.events.iter().copied().filter(move |e| e.id() == id)
    }
}

/// Depth of every context stack, for balance checks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StackDepths {
    /// Pushed ids, window ids included.
    pub id: usize,
    /// Clip rects pushed on the current window.
    pub clip: usize,
    /// Begun windows, the fallback window included.
    pub window: usize,
    /// Open layout groups in the current window.
    pub group: usize,
    /// Open tree nodes.
    pub tree: usize,
}

type Deferred = Box<dyn FnOnce(&mut Context)>;

/// Entry of the window stack, with the depths to restore on exit.
#[derive(Debug, Clone, Copy)]
pub(crate) struct WindowScope {
    pub handle: Handle,
    pub id_depth: usize,
    pub clip_depth: usize,
    pub group_depth: usize,
    pub tree_depth: usize,
    pub popup: bool,
}

/// Values queued by `set_next_window_*` for the next begin.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct NextWindowData {
    pub pos: Option<(Vec2, Cond)>,
    pub size: Option<(Vec2, Cond)>,
    pub collapsed: Option<(bool, Cond)>,
    pub focus: bool,
    /// Reference point and rect to avoid, for popups and tooltips.
    pub anchor: Option<(Vec2, Rect)>,
    pub border: bool,
}

/// An entry of the open popup stack.
#[derive(Debug, Clone, Copy)]
pub(crate) struct OpenPopup {
    pub id: WidgetId,
    pub window: Option<Handle>,
    pub open_pos: Vec2,
}

/// Immediate-mode UI context.
pub struct Context {
    config: UiConfig,
    atlas: FontAtlas,
    display_size: Vec2,
    frame: u64,
    in_frame: bool,

    tracker: InputTracker,
    input: InputSnapshot,

    ids: IdStack,
    windows: WindowManager,
    window_stack: Vec<WindowScope>,
    next_window: NextWindowData,
    tree_depth: usize,
    fallback: Option<Handle>,

    state: WidgetStateStore,

    hovered_window: Option<Handle>,
    /// Hoverable items under the pointer this frame, in submission order.
    hover_candidates: Vec<WidgetId>,
    /// Every identified item submitted this frame, in submission order.
    items: Vec<ItemRect>,
    /// Same list from the previous frame, used to detect occlusion.
    prev_items: Vec<ItemRect>,
    /// Items that took or contested this frame's left press, in submission order.
    press_claims: Vec<WidgetId>,
    active_id: WidgetId,
    active_alive: bool,
    /// Pointer offset from the active item's top-left at activation.
    active_click_offset: Vec2,
    focus_id: WidgetId,
    focus_alive: bool,
    focus_claimed: bool,
    wheel_claimed: bool,
    prev_wheel_claimed: bool,
    last_item: LastItem,
    next_item_width: Option<f32>,

    open_popups: Vec<OpenPopup>,
    begin_popup_stack: Vec<WidgetId>,

    deferred: VecDeque<Deferred>,
    events: Vec<WidgetEvent>,
    overlay: DrawList,
    output: FrameOutput,
}

impl Context {
    /// Creates a context.
    ///
    /// Out-of-range config values are replaced, see [`UiConfig::sanitized`].
    #[must_use]
    pub fn new(config: UiConfig, atlas: FontAtlas) -> Self {
        let overlay = DrawList::new(atlas.texture, atlas.white_uv);
        Self {
            config: config.sanitized(),
            atlas,
            display_size: Vec2::new(1280.0, 720.0),
            frame: 0,
            in_frame: false,
            tracker: InputTracker::new(),
            input: InputSnapshot::default(),
            ids: IdStack::new(),
            windows: WindowManager::new(),
            window_stack: Vec::with_capacity(8),
            next_window: NextWindowData::default(),
            tree_depth: 0,
            fallback: None,
            state: WidgetStateStore::new(),
            hovered_window: None,
            hover_candidates: Vec::with_capacity(16),
            items: Vec::with_capacity(64),
            prev_items: Vec::with_capacity(64),
            press_claims: Vec::new(),
            active_id: WidgetId::NONE,
            active_alive: false,
            active_click_offset: Vec2::ZERO,
            focus_id: WidgetId::NONE,
            focus_alive: false,
            focus_claimed: false,
            wheel_claimed: false,
            prev_wheel_claimed: false,
            last_item: LastItem::default(),
            next_item_width: None,
            open_popups: Vec::new(),
            begin_popup_stack: Vec::new(),
            deferred: VecDeque::new(),
            events: Vec::with_capacity(16),
            overlay,
            output: FrameOutput::default(),
        }
    }

    /// Configuration.
    #[must_use]
    pub fn config(&self) -> &UiConfig {
        &self.config
    }

    /// Style in use.
    #[must_use]
    pub fn style(&self) -> &Style {
        &self.config.style
    }

    /// Mutable style, for hosts that theme at runtime.
    pub fn style_mut(&mut self) -> &mut Style {
        &mut self.config.style
    }

    /// Palette lookup.
    #[must_use]
    pub fn color(&self, slot: StyleColor) -> Color {
        self.config.style.color(slot)
    }

    /// Font in use.
    #[must_use]
    pub fn font(&self) -> &Font {
        &self.atlas.font
    }

    /// Font atlas in use.
    #[must_use]
    pub fn atlas(&self) -> &FontAtlas {
        &self.atlas
    }

    /// Size of the host surface in logical pixels.
    #[must_use]
    pub fn display_size(&self) -> Vec2 {
        self.display_size
    }

    /// Sets the size of the host surface.
    pub fn set_display_size(&mut self, size: Vec2) {
        self.display_size = size.max(Vec2::ZERO);
    }

    pub(crate) fn display_rect(&self) -> Rect {
        Rect::from_pos_size(Vec2::ZERO, self.display_size)
    }

    /// Index of the current (or last) frame. The first frame is 1.
    #[must_use]
    pub fn frame_index(&self) -> u64 {
        self.frame
    }

    /// Returns true between `begin_frame` and `end_frame`.
    #[must_use]
    pub fn in_frame(&self) -> bool {
        self.in_frame
    }

    /// This frame's input.
    #[must_use]
    pub fn input(&self) -> &InputSnapshot {
        &self.input
    }

    /// Persistent widget state.
    #[must_use]
    pub fn state(&self) -> &WidgetStateStore {
        &self.state
    }

    /// Mutable persistent widget state.
    pub fn state_mut(&mut self) -> &mut WidgetStateStore {
        &mut self.state
    }

    /// Window registry.
    #[must_use]
    pub fn windows(&self) -> &WindowManager {
        &self.windows
    }

    /// Output of the last finished frame.
    #[must_use]
    pub fn output(&self) -> &FrameOutput {
        &self.output
    }

    /// Current depth of every stack.
    #[must_use]
    pub fn stack_depths(&self) -> StackDepths {
        let window = self.current_handle().and_then(|h| self.windows.get(h));
        StackDepths {
            id: self.ids.depth(),
            clip: window.map_or(0, |w| w.draw_list.clip_depth()),
            window: self.window_stack.len(),
            group: window.map_or(0, |w| w.cursor.group_depth()),
            tree: self.tree_depth,
        }
    }

    pub(crate) fn report(&self, error: &UiError) {
        self.config.error_policy.report(error);
    }

    // ---------------------------------------------------------------------
    // Frame lifecycle
    // ---------------------------------------------------------------------

    /// Starts a frame.
    ///
    /// Takes the input snapshot and consumes the edge events of `input`;
    /// held buttons and keys carry over to the next frame.
    pub fn begin_frame(&mut self, input: &mut InputState, dt: f32) {
        if self.in_frame {
            self.report(&UiError::FrameAlreadyStarted);
            self.abort_frame();
        }
        self.frame += 1;
        self.in_frame = true;
        self.input = self.tracker.capture(input, dt, &self.config);
        input.clear_events();

        self.state.begin_frame(self.frame);
        self.ids.truncate(0);
        self.window_stack.clear();
        self.next_window = NextWindowData::default();
        self.tree_depth = 0;
        self.begin_popup_stack.clear();
        self.events.clear();
        self.hover_candidates.clear();
        self.items.clear();
        self.press_claims.clear();
        self.active_alive = false;
        self.focus_alive = false;
        self.focus_claimed = false;
        self.prev_wheel_claimed = std::mem::take(&mut self.wheel_claimed);
        self.last_item = LastItem::default();
        self.next_item_width = None;
        let display = self.display_rect();
        self.overlay.reset(display);

        // hit test against the windows of the last frame before they reset
        self.hovered_window = self.input.mouse_pos().and_then(|p| self.windows.hit_test(p));
        self.windows.begin_frame();

        if MouseButton::ALL.iter().any(|&b| self.input.mouse_pressed(b)) {
            self.close_popups_over_window(self.hovered_window);
            if self.active_id.is_none() {
                self.windows.focus(self.hovered_window);
            }
        }
        self.close_popup_on_escape();
        self.scroll_hovered_window();

        self.set_next_window_size(Vec2::new(400.0, 400.0), Cond::FirstUseEver);
        self.begin_window(FALLBACK_WINDOW, WindowFlags::NONE);
        self.fallback = self.current_handle();
    }

    /// Finishes the frame and returns its output.
    pub fn end_frame(&mut self) -> &FrameOutput {
        if !self.in_frame {
            self.report(&UiError::FrameNotStarted);
            return &self.output;
        }

        self.unwind_windows("frame");
        self.flush_deferred();
        self.unwind_windows("deferred calls");
        self.end_fallback_window();

        if self.ids.depth() != 0 {
            self.report(&UiError::StackImbalance {
                stack: StackKind::Id,
                scope: "frame".into(),
                expected: 0,
                found: self.ids.depth(),
            });
            self.ids.truncate(0);
        }

        self.settle_press_claims();
        if self.active_id.is_some() && !self.active_alive {
            tracing::debug!(id = %self.active_id, "active widget not submitted, released");
            self.clear_active();
        }
        let pressed = MouseButton::ALL.iter().any(|&b| self.input.mouse_pressed(b));
        if self.focus_id.is_some() && (!self.focus_alive || (pressed && !self.focus_claimed)) {
            self.focus_id = WidgetId::NONE;
        }

        let evicted = self.state.evict(self.config.state_eviction_frames);
        let reaped = self.windows.reap(self.frame, self.config.window_reap_frames);
        self.build_output();

        tracing::trace!(
            frame = self.frame,
            vertices = self.output.draw_data.vertex_count(),
            commands = self.output.draw_data.commands.len(),
            events = self.output.events.len(),
            evicted,
            reaped,
            "frame finished"
        );

        std::mem::swap(&mut self.prev_items, &mut self.items);
        self.in_frame = false;
        &self.output
    }

    /// Discards the frame under construction.
    ///
    /// Stacks are emptied and draw lists cleared so the next `begin_frame`
    /// starts clean. The output of the previous frame stays available.
    pub fn abort_frame(&mut self) {
        if !self.in_frame {
            return;
        }
        tracing::debug!(frame = self.frame, "frame aborted");
        self.window_stack.clear();
        self.ids.truncate(0);
        self.tree_depth = 0;
        self.begin_popup_stack.clear();
        self.deferred.clear();
        self.events.clear();
        self.next_window = NextWindowData::default();
        self.windows.discard_frame();
        let display = self.display_rect();
        self.overlay.reset(display);
        self.hover_candidates.clear();
        self.items.clear();
        self.press_claims.clear();
        self.in_frame = false;
    }

    /// Ends every window above the fallback window, reporting each.
    fn unwind_windows(&mut self, scope: &str) {
        if self.window_stack.len() > 1 {
            self.report(&UiError::StackImbalance {
                stack: StackKind::Window,
                scope: scope.to_owned(),
                expected: 1,
                found: self.window_stack.len(),
            });
            while self.window_stack.len() > 1 {
                self.pop_window_scope();
            }
        }
    }

    fn end_fallback_window(&mut self) {
        if self.window_stack.len() == 1 {
            self.pop_window_scope();
        }
        // an untouched fallback window is not shown
        if let Some(window) = self.fallback.and_then(|h| self.windows.get_mut(h)) {
            window.hidden_frames = u8::from(!window.write_accessed);
        }
    }

    fn build_output(&mut self) {
        let order = self.windows.display_order();
        let output = &mut self.output;
        output.draw_data.clear();
        for handle in order {
            if let Some(window) = self.windows.get(handle) {
                output.draw_data.append(&window.draw_list);
            }
        }
        output.draw_data.append(&self.overlay);

        output.events.clear();
        output.events.append(&mut self.events);
        output.hovered_id = self.hover_candidates.last().copied().unwrap_or(WidgetId::NONE);
        output.active_id = self.active_id;
        output.want_capture_mouse = self.hovered_window.is_some() || self.active_id.is_some();
        output.want_capture_keyboard = self.focus_id.is_some();
        output.want_text_input = self.focus_id.is_some();
        output.frame_index = self.frame;
    }

    // ---------------------------------------------------------------------
    // Ids
    // ---------------------------------------------------------------------

    /// Id of `label` under the current id stack.
    #[must_use]
    pub fn get_id(&self, label: &str) -> WidgetId {
        self.ids.get_id(label)
    }

    /// Id of integer `n` under the current id stack.
    #[must_use]
    pub fn get_id_int(&self, n: u64) -> WidgetId {
        self.ids.get_id_int(n)
    }

    /// Pushes `label` onto the id stack.
    pub fn push_id(&mut self, label: &str) -> WidgetId {
        self.ids.push_str(label)
    }

    /// Pushes integer `n` onto the id stack.
    pub fn push_id_int(&mut self, n: u64) -> WidgetId {
        self.ids.push_int(n)
    }

    /// Pops the id stack. Popping past the current window's own id is
    /// reported and ignored.
    pub fn pop_id(&mut self) {
        let floor = self.window_stack.last().map_or(0, |s| s.id_depth + 1);
        if self.ids.depth() <= floor {
            self.report(&UiError::StackUnderflow(StackKind::Id));
            return;
        }
        self.ids.pop();
    }

    /// Runs `f` with `label` pushed onto the id stack.
    pub fn with_id<R>(&mut self, label: &str, f: impl FnOnce(&mut Self) -> R) -> R {
        let depth = self.ids.depth();
        self.ids.push_str(label);
        let result = f(self);
        self.restore_id_depth(depth, label);
        result
    }

    /// Runs `f` with integer `n` pushed onto the id stack.
    pub fn with_id_int<R>(&mut self, n: u64, f: impl FnOnce(&mut Self) -> R) -> R {
        let depth = self.ids.depth();
        self.ids.push_int(n);
        let result = f(self);
        self.restore_id_depth(depth, "with_id_int");
        result
    }

    fn restore_id_depth(&mut self, depth: usize, scope: &str) {
        if self.ids.depth() != depth + 1 {
            self.report(&UiError::StackImbalance {
                stack: StackKind::Id,
                scope: scope.to_owned(),
                expected: depth + 1,
                found: self.ids.depth(),
            });
        }
        self.ids.truncate(depth);
    }

    // ---------------------------------------------------------------------
    // Deferred calls
    // ---------------------------------------------------------------------

    /// Queues `call` to run before the frame is finalized.
    ///
    /// Calls queued while the queue is being flushed run in the same flush,
    /// up to `max_deferred_calls` in total.
    pub fn defer(&mut self, call: impl FnOnce(&mut Context) + 'static) {
        self.deferred.push_back(Box::new(call));
    }

    /// Number of calls waiting in the deferred queue.
    #[must_use]
    pub fn deferred_len(&self) -> usize {
        self.deferred.len()
    }

    fn flush_deferred(&mut self) {
        let limit = self.config.max_deferred_calls;
        let mut ran = 0usize;
        while let Some(call) = self.deferred.pop_front() {
            if ran >= limit {
                tracing::warn!(
                    dropped = self.deferred.len() + 1,
                    limit,
                    "deferred call limit reached"
                );
                self.deferred.clear();
                break;
            }
            call(self);
            ran += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorPolicy;
    use crate::font::TextureId;

    fn context() -> Context {
        let config = UiConfig {
            error_policy: ErrorPolicy::Recover,
            ..UiConfig::default()
        };
        Context::new(config, FontAtlas::monospace(TextureId(1), 7.0, 13.0))
    }

    #[test]
    fn test_empty_frame() {
        let mut ctx = context();
        let mut input = InputState::new();
        ctx.begin_frame(&mut input, 1.0 / 60.0);
        assert_eq!(ctx.stack_depths().window, 1);
        let output = ctx.end_frame();

        assert_eq!(output.frame_index, 1);
        // the unused fallback window draws nothing
        assert!(output.draw_data.is_empty());
        assert_eq!(ctx.stack_depths(), StackDepths::default());
    }

    #[test]
    fn test_deferred_calls_run_in_order() {
        let mut ctx = context();
        let mut input = InputState::new();
        ctx.begin_frame(&mut input, 1.0 / 60.0);
        ctx.defer(|ctx| {
            ctx.push_id("first");
            ctx.defer(|ctx| ctx.pop_id());
        });
        assert_eq!(ctx.deferred_len(), 1);
        ctx.end_frame();
        assert_eq!(ctx.deferred_len(), 0);
        assert_eq!(ctx.stack_depths().id, 0);
    }

    #[test]
    fn test_deferred_limit() {
        fn requeue(ctx: &mut Context) {
            ctx.defer(requeue);
        }
        let mut ctx = context();
        ctx.config.max_deferred_calls = 8;
        let mut input = InputState::new();
        ctx.begin_frame(&mut input, 1.0 / 60.0);
        ctx.defer(requeue);
        ctx.end_frame();
        assert_eq!(ctx.deferred_len(), 0);
    }

    #[test]
    fn test_abort_leaves_clean_stacks() {
        let mut ctx = context();
        let mut input = InputState::new();
        ctx.begin_frame(&mut input, 1.0 / 60.0);
        ctx.begin_window("Open", WindowFlags::NONE);
        ctx.push_id("dangling");
        ctx.abort_frame();

        assert!(!ctx.in_frame());
        assert_eq!(ctx.stack_depths(), StackDepths::default());
        ctx.begin_frame(&mut input, 1.0 / 60.0);
        ctx.end_frame();
    }

    #[test]
    fn test_double_begin_recovers() {
        let mut ctx = context();
        let mut input = InputState::new();
        ctx.begin_frame(&mut input, 1.0 / 60.0);
        ctx.begin_frame(&mut input, 1.0 / 60.0);
        assert_eq!(ctx.frame_index(), 2);
        ctx.end_frame();
        // end without begin is reported and ignored
        assert_eq!(ctx.end_frame().frame_index, 2);
    }
}
