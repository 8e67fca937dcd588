//! Built-in widgets.
//!
//! Every widget is a free function over [`Context`](crate::Context): it
//! derives its id from the label, places itself at the layout cursor, runs
//! the shared hover/press logic and draws into the current window. Labels
//! follow the id convention of [`vellum_core::IdStack`]: text after `"##"`
//! is hashed but not shown, and text after `"###"` is the whole id.
//!
//! Widgets that edit a value take it by `&mut` and return true on the frame
//! the value changed.

mod basic;
mod slider;
mod text_input;
mod tree;

pub use basic::{
    button, checkbox, dummy, image, invisible_button, label_text, progress_bar, radio_button, selectable,
    separator, small_button, text, text_colored, text_disabled,
};
pub use slider::{drag_float, slider_float, slider_int};
pub use text_input::{input_text, input_text_with_limit};
pub use tree::{collapsing_header, tree_node, tree_pop};
