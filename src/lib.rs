//! podtail
//!
//! Headless core for following a Kubernetes pod's log.
//!
//! - [`tailer`] keeps a tail session alive across the short-lived follow
//!   connections the platform hands out, dropping the lines each reconnect
//!   re-sends and flagging real gaps.
//! - [`view_state`] lays records out as styled lines and addresses them by
//!   global line number, re-indexing only from the entry that changed.
//! - [`state`] adds cursor, scrolling and search on top for a log pane.

pub mod config;
pub mod logging;
pub mod model;
pub mod parser;
pub mod source;
pub mod state;
pub mod tailer;
pub mod view_state;

#[cfg(test)]
mod test_harness;
