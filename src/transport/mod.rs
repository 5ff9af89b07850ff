use crate::cd::time::TimeCode;
use crate::transport::error::TransportResult;

pub mod cue;
pub mod error;

#[cfg(test)]
pub(crate) mod testing;

/// Command surface of a disc drive.
///
/// Implementations are driven by one caller at a time, which is why every
/// method takes `&mut self`. Time codes are absolute positions from the
/// start of the disc.
pub trait Transport: Send {
    /// Opens the given drive (a drive letter, device node or image path).
    fn open(&mut self, drive: &str) -> TransportResult<()>;

    fn track_count(&mut self) -> TransportResult<u8>;

    fn track_start(&mut self, track: u8) -> TransportResult<TimeCode>;

    fn total_length(&mut self) -> TransportResult<TimeCode>;

    /// Current play position, `None` when the drive is not playing anything.
    fn current_position(&mut self) -> TransportResult<Option<TimeCode>>;

    /// Seeks to the start of `track` and starts playing.
    fn play(&mut self, track: u8) -> TransportResult<()>;

    fn pause(&mut self) -> TransportResult<()>;

    fn resume(&mut self) -> TransportResult<()>;

    fn stop(&mut self) -> TransportResult<()>;

    fn eject(&mut self) -> TransportResult<()>;
}
