use crate::cd::time::{FrameCount, TimeCode};
use crate::cd::{FRAMES_PER_SECOND, MAX_TRACKS};
use crate::transport::Transport;
use crate::transport::error::{TransportError, TransportResult};
use log::debug;

const DISC_ID_DELIMITER: char = '-';

/// Layout of a loaded disc: where each track starts and how long the disc is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableOfContents {
    track_start_frames: Vec<FrameCount>,
    total_length_frames: FrameCount,
    disc_id: String,
}

impl TableOfContents {
    pub fn new(
        track_start_frames: Vec<FrameCount>,
        total_length_frames: FrameCount,
    ) -> TransportResult<Self> {
        let Some(&last_start) = track_start_frames.last() else {
            return Err(TransportError::InvalidToc("disc has no tracks".to_string()));
        };

        if track_start_frames.len() > MAX_TRACKS as usize {
            return Err(TransportError::InvalidToc(format!(
                "{} tracks exceed the maximum of {MAX_TRACKS}",
                track_start_frames.len()
            )));
        }

        if let Some(pair) = track_start_frames.windows(2).find(|pair| pair[0] >= pair[1]) {
            return Err(TransportError::InvalidToc(format!(
                "track starts are not increasing: {} then {}",
                pair[0], pair[1]
            )));
        }

        if total_length_frames <= last_start {
            return Err(TransportError::InvalidToc(format!(
                "total length {total_length_frames} ends before the last track starts at {last_start}"
            )));
        }

        let disc_id = disc_id(&track_start_frames, total_length_frames);

        Ok(Self {
            track_start_frames,
            total_length_frames,
            disc_id,
        })
    }

    /// Reads the layout of the disc currently in `transport`.
    ///
    /// Any failing query aborts the build; there is no partial result.
    pub fn build<T: Transport + ?Sized>(transport: &mut T) -> TransportResult<Self> {
        let track_count = transport.track_count()?;
        debug!("Disc reports {track_count} tracks");

        let track_start_frames = (1..=track_count)
            .map(|track| transport.track_start(track).map(|time| time.to_frames()))
            .collect::<TransportResult<Vec<_>>>()?;

        let total_length_frames = transport.total_length()?.to_frames();

        let toc = Self::new(track_start_frames, total_length_frames)?;
        debug!("Built table of contents with disc id {}", toc.disc_id);

        Ok(toc)
    }

    pub fn track_count(&self) -> u8 {
        self.track_start_frames.len() as u8
    }

    pub fn track_start_frames(&self) -> &[FrameCount] {
        &self.track_start_frames
    }

    pub fn total_length_frames(&self) -> FrameCount {
        self.total_length_frames
    }

    /// Total length in whole seconds, truncated.
    pub fn total_length_seconds(&self) -> u32 {
        self.total_length_frames / FRAMES_PER_SECOND
    }

    pub fn total_length(&self) -> TimeCode {
        TimeCode::from_frames(self.total_length_frames)
    }

    pub fn disc_id(&self) -> &str {
        &self.disc_id
    }

    pub fn contains_track(&self, track: u8) -> bool {
        track >= 1 && track <= self.track_count()
    }

    pub fn track_start(&self, track: u8) -> Option<FrameCount> {
        let index = (track as usize).checked_sub(1)?;
        self.track_start_frames.get(index).copied()
    }

    /// First frame after `track`: the next track's start, or the end of the
    /// disc for the last track.
    pub fn track_end(&self, track: u8) -> Option<FrameCount> {
        if !self.contains_track(track) {
            return None;
        }

        Some(
            self.track_start_frames
                .get(track as usize)
                .copied()
                .unwrap_or(self.total_length_frames),
        )
    }

    pub fn track_length(&self, track: u8) -> Option<FrameCount> {
        Some(self.track_end(track)? - self.track_start(track)?)
    }
}

/// Lookup key for a disc layout: track count, total length and every track
/// start joined with `-`.
///
/// This is not the checksum based id real CDDB servers index by.
pub fn disc_id(track_start_frames: &[FrameCount], total_length_frames: FrameCount) -> String {
    let mut id = format!(
        "{}{DISC_ID_DELIMITER}{total_length_frames}",
        track_start_frames.len()
    );

    for start in track_start_frames {
        id.push(DISC_ID_DELIMITER);
        id.push_str(&start.to_string());
    }

    id
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::testing::FakeTransport;

    fn toc(starts: &[FrameCount], total: FrameCount) -> TableOfContents {
        TableOfContents::new(starts.to_vec(), total).unwrap()
    }

    #[test]
    fn build_reads_every_track_start() {
        let mut transport = FakeTransport::with_layout(&[150, 14672, 27367], 41000);

        let toc = TableOfContents::build(&mut transport).unwrap();

        assert_eq!(toc.track_count(), 3);
        assert_eq!(toc.track_start_frames(), &[150, 14672, 27367]);
        assert_eq!(toc.total_length_frames(), 41000);
        assert_eq!(toc.total_length_seconds(), 546);
        assert_eq!(toc.disc_id(), "3-41000-150-14672-27367");
    }

    #[test]
    fn build_fails_fast_on_transport_error() {
        let mut transport = FakeTransport::with_layout(&[0, 1000, 2500], 4000);
        transport.fail("track_start");

        assert!(matches!(
            TableOfContents::build(&mut transport),
            Err(TransportError::CommandRejected { .. })
        ));
        assert_eq!(transport.calls(), vec!["track_count", "track_start 1"]);
    }

    #[test]
    fn rejects_impossible_layouts() {
        assert!(TableOfContents::new(vec![], 100).is_err());
        assert!(TableOfContents::new(vec![0, 1000, 1000], 4000).is_err());
        assert!(TableOfContents::new(vec![0, 2000, 1000], 4000).is_err());
        assert!(TableOfContents::new(vec![0, 1000], 1000).is_err());
        assert!(TableOfContents::new((0..100).collect(), 4000).is_err());
    }

    #[test]
    fn disc_id_is_deterministic() {
        assert_eq!(
            toc(&[0, 1000, 2500], 4000).disc_id(),
            toc(&[0, 1000, 2500], 4000).disc_id()
        );
    }

    #[test]
    fn disc_id_changes_with_any_field() {
        let base = toc(&[0, 1000, 2500], 4000);

        for other in [
            toc(&[0, 1001, 2500], 4000),
            toc(&[0, 1000, 2499], 4000),
            toc(&[1, 1000, 2500], 4000),
            toc(&[0, 1000, 2500], 4001),
            toc(&[0, 1000], 4000),
            toc(&[0, 1000, 2500, 3000], 4000),
        ] {
            assert_ne!(base.disc_id(), other.disc_id());
        }
    }

    #[test]
    fn track_bounds() {
        let toc = toc(&[0, 1000, 2500], 4000);

        assert_eq!(toc.track_start(1), Some(0));
        assert_eq!(toc.track_end(1), Some(1000));
        assert_eq!(toc.track_end(2), Some(2500));
        assert_eq!(toc.track_end(3), Some(4000));
        assert_eq!(toc.track_length(3), Some(1500));
        assert_eq!(toc.track_start(0), None);
        assert_eq!(toc.track_end(4), None);
        assert!(!toc.contains_track(0));
        assert!(toc.contains_track(3));
    }
}
