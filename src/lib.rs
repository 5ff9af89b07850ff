//! Playback session tracking for audio CDs.
//!
//! Builds a table of contents from a [`transport::Transport`], looks up album
//! and track titles from a CDDB server, and runs a polling state machine
//! that follows the drive position and stops at track boundaries.

pub mod cd;
pub mod cddb;
pub mod config;
pub mod player;
pub mod session;
pub mod toc;
pub mod transport;
pub mod util;

pub use player::{PlaybackSnapshot, PlaybackStatus, SessionEvent};
pub use session::Session;
pub use toc::TableOfContents;
