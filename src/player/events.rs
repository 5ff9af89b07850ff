use crate::cd::time::TimeCode;
use crate::cddb::error::MetadataError;
use crate::cddb::models::DiscMetadata;
use crate::player::state::PlaybackStatus;
use crate::toc::TableOfContents;
use std::sync::Arc;

/// Notifications published to presentation code.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    StateChanged(PlaybackStatus),
    PositionChanged { track: u8, position: TimeCode },
    TocReady(Arc<TableOfContents>),
    /// The table of contents could not be read; carries the drive error.
    TocFailed(String),
    MetadataReady {
        disc_id: String,
        metadata: Arc<DiscMetadata>,
    },
    MetadataFailed {
        disc_id: String,
        error: Arc<MetadataError>,
    },
}
