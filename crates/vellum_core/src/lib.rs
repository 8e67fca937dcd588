//! # Vellum Core
//!
//! The leaf primitives of the Vellum immediate-mode UI:
//! - Stable widget identity ([`WidgetId`], [`IdStack`])
//! - Frame-relative geometry ([`Vec2`], [`Rect`])
//! - Generational arena storage ([`Arena`], [`Handle`])
//!
//! ## Example
//!
//! ```rust
//! use vellum_core::IdStack;
//!
//! let mut ids = IdStack::new();
//! ids.push_str("Settings");
//! let ok = ids.get_id("OK");
//! assert_eq!(ok, ids.get_id("OK"));
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod geometry;
pub mod id;
pub mod memory;

pub use geometry::{Rect, Vec2};
pub use id::{display_part, hashed_part, IdStack, WidgetId};
pub use memory::{Arena, Handle};
