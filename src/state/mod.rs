//! UI state machine (pure).
//!
//! All state transitions are plain method calls testable without a
//! terminal.

pub mod log_view;

// Re-export for convenience
pub use log_view::LogView;
