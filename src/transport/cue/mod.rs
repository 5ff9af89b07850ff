use crate::cd::time::{FrameCount, TimeCode};
use crate::cd::{FRAMES_PER_SECOND, MAX_TRACKS, SECTOR_SIZE};
use crate::transport::Transport;
use crate::transport::cue::error::CueError;
use crate::transport::cue::models::{CueSheet, FileType, TrackType};
use crate::transport::cue::parser::CueParser;
use crate::transport::error::{TransportError, TransportResult};
use log::debug;
use std::path::Path;
use std::time::Instant;

pub mod error;
pub mod models;
pub mod parser;

/// A [`Transport`] backed by a CUE sheet and its raw image.
///
/// Nothing is decoded: the play position advances with the wall clock,
/// which is enough to drive a playback session without a physical drive.
#[derive(Debug, Default)]
pub struct CueTransport {
    disc: Option<LoadedDisc>,
    clock: PlayClock,
}

#[derive(Debug)]
struct LoadedDisc {
    track_starts: Vec<FrameCount>,
    total_length: FrameCount,
}

#[derive(Debug, Default, Clone, Copy)]
enum PlayClock {
    #[default]
    Idle,
    Running {
        origin: FrameCount,
        started: Instant,
    },
    Held {
        at: FrameCount,
    },
}

impl CueTransport {
    pub fn new() -> Self {
        Self::default()
    }

    fn disc(&self) -> TransportResult<&LoadedDisc> {
        self.disc.as_ref().ok_or(TransportError::NoDisc)
    }

    fn position_frames(&self) -> Option<FrameCount> {
        let total_length = self.disc.as_ref()?.total_length;

        match self.clock {
            PlayClock::Idle => None,
            PlayClock::Running { origin, started } => {
                let elapsed = started.elapsed().as_millis() * FRAMES_PER_SECOND as u128 / 1000;
                let position = (origin as u128 + elapsed).min(total_length as u128);
                Some(position as FrameCount)
            }
            PlayClock::Held { at } => Some(at),
        }
    }
}

impl LoadedDisc {
    fn from_sheet(sheet: &CueSheet, image_len: u64) -> TransportResult<Self> {
        if sheet.tracks.is_empty() {
            return Err(CueError::NoTracks.into());
        }
        if sheet.tracks.len() > MAX_TRACKS as usize {
            return Err(TransportError::InvalidToc(format!(
                "{} tracks in CUE sheet",
                sheet.tracks.len()
            )));
        }

        if let Some(track) = sheet
            .tracks
            .iter()
            .find(|track| track.track_type != TrackType::Audio)
        {
            return Err(CueError::DataTrack {
                track: track.number,
                track_type: track.track_type,
            }
            .into());
        }

        let track_starts = sheet
            .tracks
            .iter()
            .map(|track| {
                track
                    .start()
                    .map(|time| time.to_frames())
                    .ok_or(CueError::MissingIndex(track.number))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let sectors = image_len / SECTOR_SIZE as u64;
        let total_length = FrameCount::try_from(sectors).map_err(|_| {
            TransportError::InvalidToc(format!("image holds {sectors} sectors"))
        })?;

        Ok(Self {
            track_starts,
            total_length,
        })
    }

    fn track_start(&self, track: u8) -> TransportResult<FrameCount> {
        let index = (track as usize)
            .checked_sub(1)
            .ok_or(TransportError::InvalidTrack(track))?;

        self.track_starts
            .get(index)
            .copied()
            .ok_or(TransportError::InvalidTrack(track))
    }
}

impl Transport for CueTransport {
    fn open(&mut self, drive: &str) -> TransportResult<()> {
        let cue_path = Path::new(drive);
        let sheet = CueParser::new(cue_path).parse()?;

        let image = match sheet.files.as_slice() {
            [] => return Err(CueError::NoFileReferenced.into()),
            [file] => file,
            files => return Err(CueError::MultipleFilesUnsupported(files.len()).into()),
        };

        if image.file_type != FileType::Binary {
            return Err(CueError::UnsupportedFileType(image.file_type).into());
        }

        let cue_dir = cue_path.parent().unwrap_or(Path::new("."));
        let image_path = cue_dir.join(&image.filename);
        let image_len = std::fs::metadata(&image_path)?.len();

        debug!("Opened {cue_path:?} with image {image_path:?} ({image_len} bytes)");

        self.disc = Some(LoadedDisc::from_sheet(&sheet, image_len)?);
        self.clock = PlayClock::Idle;

        Ok(())
    }

    fn track_count(&mut self) -> TransportResult<u8> {
        Ok(self.disc()?.track_starts.len() as u8)
    }

    fn track_start(&mut self, track: u8) -> TransportResult<TimeCode> {
        Ok(TimeCode::from_frames(self.disc()?.track_start(track)?))
    }

    fn total_length(&mut self) -> TransportResult<TimeCode> {
        Ok(TimeCode::from_frames(self.disc()?.total_length))
    }

    fn current_position(&mut self) -> TransportResult<Option<TimeCode>> {
        self.disc()?;
        Ok(self.position_frames().map(TimeCode::from_frames))
    }

    fn play(&mut self, track: u8) -> TransportResult<()> {
        let origin = self.disc()?.track_start(track)?;

        self.clock = PlayClock::Running {
            origin,
            started: Instant::now(),
        };

        Ok(())
    }

    fn pause(&mut self) -> TransportResult<()> {
        self.disc()?;

        match self.position_frames() {
            Some(at) if matches!(self.clock, PlayClock::Running { .. }) => {
                self.clock = PlayClock::Held { at };
                Ok(())
            }
            _ => Err(TransportError::CommandRejected {
                command: "pause".to_string(),
                reason: "not playing".to_string(),
            }),
        }
    }

    fn resume(&mut self) -> TransportResult<()> {
        self.disc()?;

        match self.clock {
            PlayClock::Held { at } => {
                self.clock = PlayClock::Running {
                    origin: at,
                    started: Instant::now(),
                };
                Ok(())
            }
            _ => Err(TransportError::CommandRejected {
                command: "resume".to_string(),
                reason: "not paused".to_string(),
            }),
        }
    }

    fn stop(&mut self) -> TransportResult<()> {
        self.clock = PlayClock::Idle;
        Ok(())
    }

    fn eject(&mut self) -> TransportResult<()> {
        self.clock = PlayClock::Idle;
        self.disc = None;
        Ok(())
    }
}
