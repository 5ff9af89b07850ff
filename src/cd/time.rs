use crate::cd::error::{ConversionError, ConversionResult};
use crate::cd::{FRAMES_PER_MINUTE, FRAMES_PER_SECOND, MAX_TRACKS, SECONDS_PER_MINUTE};
use std::fmt::Display;
use std::str::FromStr;

/// Linear frame offset from the start of the disc.
pub type FrameCount = u32;

/// Placeholder shown when there is no position to display.
pub const NO_POSITION: &str = "--:--:--";
const NO_POSITION_SHORT: &str = "--:--";

/// A minute:second:frame position, the disc's native time unit.
///
/// Always holds `seconds < 60` and `frames < 75`, and always fits into a
/// [`FrameCount`]. Compare positions through [`TimeCode::to_frames`]; the
/// derived ordering is field-wise and agrees with it only because the
/// invariants hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct TimeCode {
    minutes: u32,
    seconds: u8,
    frames: u8,
}

/// A [`TimeCode`] reported together with the track it belongs to (`TT:MM:SS:FF`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TrackTimeCode {
    pub track: u8,
    pub time: TimeCode,
}

/// How a [`TimeCode`] is rendered for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeFormat {
    /// `MM:SS:FF`
    #[default]
    WithFrames,
    /// `MM:SS`
    WithoutFrames,
}

impl TimeCode {
    pub fn new(minutes: u32, seconds: u32, frames: u32) -> ConversionResult<Self> {
        if seconds >= SECONDS_PER_MINUTE {
            return Err(ConversionError::SecondsOutOfRange(seconds));
        }
        if frames >= FRAMES_PER_SECOND {
            return Err(ConversionError::FramesOutOfRange(frames));
        }

        minutes
            .checked_mul(FRAMES_PER_MINUTE)
            .and_then(|m| m.checked_add(seconds * FRAMES_PER_SECOND + frames))
            .ok_or(ConversionError::Overflow { minutes })?;

        Ok(Self {
            minutes,
            seconds: seconds as u8,
            frames: frames as u8,
        })
    }

    pub fn minutes(&self) -> u32 {
        self.minutes
    }

    pub fn seconds(&self) -> u8 {
        self.seconds
    }

    pub fn frames(&self) -> u8 {
        self.frames
    }

    pub fn to_frames(&self) -> FrameCount {
        self.frames as u32
            + self.seconds as u32 * FRAMES_PER_SECOND
            + self.minutes * FRAMES_PER_MINUTE
    }

    pub fn from_frames(frames: FrameCount) -> Self {
        let total_seconds = frames / FRAMES_PER_SECOND;

        Self {
            minutes: total_seconds / SECONDS_PER_MINUTE,
            seconds: (total_seconds % SECONDS_PER_MINUTE) as u8,
            frames: (frames % FRAMES_PER_SECOND) as u8,
        }
    }

    pub fn format(&self, format: TimeFormat) -> String {
        match format {
            TimeFormat::WithFrames => {
                format!("{:02}:{:02}:{:02}", self.minutes, self.seconds, self.frames)
            }
            TimeFormat::WithoutFrames => format!("{:02}:{:02}", self.minutes, self.seconds),
        }
    }
}

impl Display for TimeCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.format(TimeFormat::WithFrames))
    }
}

impl FromStr for TimeCode {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse(s)
    }
}

impl Display for TrackTimeCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}:{}", self.track, self.time)
    }
}

impl FromStr for TrackTimeCode {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fields = split_fields(s)?;
        let [track, minutes, seconds, frames] = fields[..] else {
            return Err(ConversionError::InvalidFieldCount(s.to_string()));
        };

        if track == 0 || track > MAX_TRACKS as u32 {
            return Err(ConversionError::TrackOutOfRange(track));
        }

        Ok(Self {
            track: track as u8,
            time: TimeCode::new(minutes, seconds, frames)?,
        })
    }
}

pub fn to_frames(time: TimeCode) -> FrameCount {
    time.to_frames()
}

pub fn from_frames(frames: FrameCount) -> TimeCode {
    TimeCode::from_frames(frames)
}

/// Parses `MM:SS:FF`, or the track-prefixed `TT:MM:SS:FF` drives report in
/// which case the track is validated and then dropped.
pub fn parse(text: &str) -> ConversionResult<TimeCode> {
    let fields = split_fields(text)?;

    match fields[..] {
        [minutes, seconds, frames] => TimeCode::new(minutes, seconds, frames),
        [_, _, _, _] => Ok(text.parse::<TrackTimeCode>()?.time),
        _ => Err(ConversionError::InvalidFieldCount(text.to_string())),
    }
}

/// Renders an optional position, falling back to a dashed placeholder.
pub fn format_position(position: Option<TimeCode>, format: TimeFormat) -> String {
    match (position, format) {
        (Some(time), _) => time.format(format),
        (None, TimeFormat::WithFrames) => NO_POSITION.to_string(),
        (None, TimeFormat::WithoutFrames) => NO_POSITION_SHORT.to_string(),
    }
}

fn split_fields(text: &str) -> ConversionResult<Vec<u32>> {
    let text = text.trim();
    let parts: Vec<&str> = text.split(':').collect();

    if parts.len() != 3 && parts.len() != 4 {
        return Err(ConversionError::InvalidFieldCount(text.to_string()));
    }

    parts
        .into_iter()
        .map(|part| {
            // u32::from_str accepts a leading '+', the drive never sends one
            if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                return Err(ConversionError::InvalidField {
                    text: text.to_string(),
                    field: part.to_string(),
                });
            }
            part.parse::<u32>().map_err(|_| ConversionError::InvalidField {
                text: text.to_string(),
                field: part.to_string(),
            })
        })
        .collect()
}
