use crate::cd::time::TimeCode;

#[derive(Debug, Clone)]
pub struct CueSheet {
    pub files: Vec<CueFile>,
    pub tracks: Vec<CueTrack>,
}

#[derive(Debug, Clone)]
pub struct CueFile {
    pub filename: String,
    pub file_type: FileType,
}

#[derive(Debug, Clone)]
pub struct CueTrack {
    pub number: u8,
    pub track_type: TrackType,
    pub indices: Vec<Index>,
}

impl CueTrack {
    /// Where playback of the track begins: INDEX 01, or the first index the
    /// sheet lists when there is no INDEX 01.
    pub fn start(&self) -> Option<TimeCode> {
        self.indices
            .iter()
            .find(|index| index.number == 1)
            .or_else(|| self.indices.first())
            .map(|index| index.position)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Index {
    pub number: u8,
    pub position: TimeCode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackType {
    Audio,
    CdG,
    Mode1_2048,
    Mode1_2352,
    Mode2_2336,
    Mode2_2352,
    CdI2336,
    CdI2352,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    Binary,
    Motorola,
    Aiff,
    Wave,
    Mp3,
}
