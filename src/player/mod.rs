pub mod error;
pub mod events;
pub mod monitor;
pub mod state;

pub use events::SessionEvent;
pub use monitor::{PlaybackMonitor, TickOutcome};
pub use state::{PlaybackSnapshot, PlaybackState, PlaybackStatus, TrackListing};
