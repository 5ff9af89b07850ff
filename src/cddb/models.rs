#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackMetadata {
    /// 1-based track number.
    pub number: u8,
    pub title: String,
}

impl TrackMetadata {
    pub fn fallback(number: u8) -> Self {
        Self {
            number,
            title: format!("Track {number}"),
        }
    }
}

/// Album details as returned by the metadata service. Track order follows
/// the reply.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscMetadata {
    pub album: String,
    pub artist: String,
    pub tracks: Vec<TrackMetadata>,
}

impl DiscMetadata {
    pub fn is_empty(&self) -> bool {
        self.album.is_empty() && self.artist.is_empty() && self.tracks.is_empty()
    }

    pub fn track(&self, number: u8) -> TrackMetadata {
        lookup_track(self, number)
    }
}

/// The entry for `number`, or a generated "Track N" entry when the service
/// did not name it.
pub fn lookup_track(metadata: &DiscMetadata, number: u8) -> TrackMetadata {
    metadata
        .tracks
        .iter()
        .find(|track| track.number == number)
        .cloned()
        .unwrap_or_else(|| TrackMetadata::fallback(number))
}
