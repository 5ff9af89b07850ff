pub mod error;
pub mod time;

pub const FRAMES_PER_SECOND: u32 = 75;
pub const SECONDS_PER_MINUTE: u32 = 60;
pub const FRAMES_PER_MINUTE: u32 = FRAMES_PER_SECOND * SECONDS_PER_MINUTE;

/// Raw bytes of one audio sector (one frame) in a .bin image.
pub const SECTOR_SIZE: usize = 2352;

/// Highest track number a Red Book disc can carry.
pub const MAX_TRACKS: u8 = 99;
