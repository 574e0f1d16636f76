//! Domain model types (pure).
//!
//! All types in this module are plain data with no I/O.

pub mod error;
pub mod record;
pub mod styled_text;

// Re-export for convenience
pub use error::{AppError, SourceError, TailError};
pub use record::{Record, RecordKind};
pub use styled_text::StyledText;
