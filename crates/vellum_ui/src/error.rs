//! # UI Error Types
//!
//! The frame core never hands a recoverable error back to widget code. The
//! variants below describe programming errors (reported through
//! [`ErrorPolicy`]) and configuration failures (returned from loading).

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Which of the context's stacks an imbalance was detected on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackKind {
    /// The widget ID stack.
    Id,
    /// The clip rectangle stack.
    Clip,
    /// The window/container stack.
    Window,
    /// The layout group stack.
    Group,
    /// The tree-node indent stack.
    Tree,
}

impl std::fmt::Display for StackKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Id => "id",
            Self::Clip => "clip",
            Self::Window => "window",
            Self::Group => "group",
            Self::Tree => "tree",
        };
        f.write_str(name)
    }
}

/// Errors that can occur in the UI system.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum UiError {
    /// A container was exited with a different stack depth than it was entered with.
    #[error("unbalanced {stack} stack in '{scope}': expected depth {expected}, found {found}")]
    StackImbalance {
        /// The stack that is out of balance.
        stack: StackKind,
        /// Container or scope where it was detected.
        scope: String,
        /// Depth recorded at entry.
        expected: usize,
        /// Depth found at exit.
        found: usize,
    },

    /// Pop on a stack that has nothing left to pop in the current scope.
    #[error("pop on empty {0} stack")]
    StackUnderflow(StackKind),

    /// `begin_frame` called while a frame is already open.
    #[error("begin_frame called twice without end_frame")]
    FrameAlreadyStarted,

    /// `end_frame` called without a matching `begin_frame`.
    #[error("end_frame called without begin_frame")]
    FrameNotStarted,

    /// A widget or container call was made outside begin_frame/end_frame.
    #[error("'{0}' called outside of a frame")]
    OutsideFrame(&'static str),

    /// A window was ended with the call of another container kind.
    #[error("window '{window}' must be ended with {expected}, not {found}")]
    WindowMismatch {
        /// Window at the top of the stack.
        window: String,
        /// Call matching the window's kind.
        expected: &'static str,
        /// Call that was made.
        found: &'static str,
    },

    /// Invalid configuration file.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Configuration file could not be read.
    #[error("failed to read configuration '{path}': {reason}")]
    ConfigIo {
        /// Path that was read.
        path: String,
        /// OS error text.
        reason: String,
    },
}

/// Result type for fallible UI operations (configuration loading).
pub type UiResult<T> = Result<T, UiError>;

/// What the context does when it detects a programming error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorPolicy {
    /// Panic with the error text. Default with debug assertions.
    Panic,
    /// Log with `tracing::error!`, force the stacks back into balance and continue.
    Recover,
}

impl Default for ErrorPolicy {
    fn default() -> Self {
        if cfg!(debug_assertions) {
            Self::Panic
        } else {
            Self::Recover
        }
    }
}

impl ErrorPolicy {
    /// Reports `error` according to the policy.
    ///
    /// Returns normally only under [`ErrorPolicy::Recover`].
    ///
    /// # Panics
    ///
    /// Under [`ErrorPolicy::Panic`].
    pub fn report(self, error: &UiError) {
        match self {
            Self::Panic => panic!("vellum programming error: {error}"),
            Self::Recover => tracing::error!(%error, "programming error recovered"),
        }
    }
}
