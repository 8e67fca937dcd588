//! # Memory Management
//!
//! Generational arena storage.
//!
//! ## Design Philosophy
//!
//! Objects that reference each other (windows and their child windows) hold
//! [`Handle`]s instead of references. A handle to a removed slot is detected
//! by its generation and resolves to `None`; it never aliases a newer object.

mod arena;

pub use arena::{Arena, Handle};
