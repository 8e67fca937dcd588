//! # Vellum UI
//!
//! Immediate-mode UI frame core. The application re-declares its whole
//! interface every frame; the context turns those calls into:
//! - stable widget identity and persistent per-id state
//! - flow layout, clipping and hover/active arbitration
//! - one ordered, batched vertex/index buffer per frame
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                         FRAME PIPELINE                        │
//! ├──────────────────────────────────────────────────────────────┤
//! │  InputState → begin_frame → widget calls → end_frame → Draw  │
//! │      ↓             ↓             ↓             ↓        Data │
//! │  raw events    snapshot    ids / layout   deferred, evict    │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Rendering, windowing and font rasterization stay with the host: it feeds
//! input into an [`InputState`], describes its font with a [`FontAtlas`] and
//! draws the [`DrawData`] found in each [`FrameOutput`].
//!
//! ## Example
//!
//! ```rust
//! use vellum_ui::{widget, Context, FontAtlas, InputState, TextureId, UiConfig, WindowFlags};
//!
//! let mut ctx = Context::new(UiConfig::default(), FontAtlas::monospace(TextureId(1), 7.0, 13.0));
//! let mut input = InputState::new();
//! let mut volume = 0.5;
//!
//! ctx.begin_frame(&mut input, 1.0 / 60.0);
//! ctx.window("Settings", WindowFlags::NONE, |ctx| {
//!     widget::text(ctx, "Audio");
//!     widget::slider_float(ctx, "Volume", &mut volume, 0.0, 1.0);
//!     widget::button(ctx, "Apply")
//! });
//! let output = ctx.end_frame();
//! assert_eq!(output.frame_index, 1);
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod animation;
pub mod clip;
pub mod config;
pub mod context;
pub mod draw;
pub mod error;
pub mod font;
pub mod input;
pub mod layout;
pub mod state;
pub mod style;
pub mod widget;
pub mod window;

pub use animation::{Animation, Easing};
pub use clip::{ClipStack, ClipTest};
pub use config::UiConfig;
pub use context::{
    Context, FrameOutput, Interaction, LastItem, StackDepths, WidgetEvent, FALLBACK_WINDOW, TOOLTIP_WINDOW,
};
pub use draw::{DrawCommand, DrawData, DrawList, DrawVertex};
pub use error::{ErrorPolicy, StackKind, UiError, UiResult};
pub use font::{Font, FontAtlas, Glyph, TextureId};
pub use input::{ButtonState, InputSnapshot, InputState, Key, Modifiers, MouseButton};
pub use layout::LayoutCursor;
pub use state::{DragState, StateRecord, TextEditState, ToggleState, WidgetState, WidgetStateStore};
pub use style::{Color, Style, StyleColor};
pub use window::{Cond, Layer, Window, WindowFlags, WindowManager};

pub use vellum_core::{Rect, Vec2, WidgetId};
