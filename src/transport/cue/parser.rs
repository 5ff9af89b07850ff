use crate::cd::time;
use crate::transport::cue::error::{CueError, CueResult};
use crate::transport::cue::models::{CueFile, CueSheet, CueTrack, FileType, Index, TrackType};
use std::path::{Path, PathBuf};

pub struct CueParser {
    cue_path: PathBuf,
}

impl CueParser {
    pub fn new(cue_path: impl AsRef<Path>) -> Self {
        Self {
            cue_path: cue_path.as_ref().to_path_buf(),
        }
    }

    pub fn parse(&self) -> CueResult<CueSheet> {
        let data = std::fs::read_to_string(&self.cue_path)?;
        parse_cue_sheet(&data)
    }
}

pub fn parse_cue_sheet(data: &str) -> CueResult<CueSheet> {
    let mut cue_sheet = CueSheet {
        files: Vec::new(),
        tracks: Vec::new(),
    };

    let mut current_track: Option<CueTrack> = None;

    for line in data.lines() {
        let line = line.trim();

        if line.is_empty() || line.starts_with("REM") {
            continue;
        }

        let parts: Vec<&str> = line.split_whitespace().collect();

        match parts[0] {
            "FILE" => {
                let filename = extract_quoted_string(line)?;
                let file_type = parse_file_type(field(&parts, parts.len() - 1, "FILE", line)?)?;

                cue_sheet.files.push(CueFile {
                    filename,
                    file_type,
                });
            }
            "TRACK" => {
                if let Some(track) = current_track.take() {
                    cue_sheet.tracks.push(track);
                }

                let number = field(&parts, 1, "TRACK", line)?.parse::<u8>()?;
                let track_type = parse_track_type(field(&parts, 2, "TRACK", line)?)?;

                current_track = Some(CueTrack {
                    number,
                    track_type,
                    indices: Vec::new(),
                });
            }
            "INDEX" => {
                if let Some(track) = &mut current_track {
                    let number = field(&parts, 1, "INDEX", line)?.parse::<u8>()?;
                    let position = time::parse(field(&parts, 2, "INDEX", line)?)?;

                    track.indices.push(Index { number, position });
                }
            }
            _ => {}
        }
    }

    if let Some(track) = current_track {
        cue_sheet.tracks.push(track);
    }

    Ok(cue_sheet)
}

fn field<'a>(
    parts: &[&'a str],
    position: usize,
    keyword: &'static str,
    line: &str,
) -> CueResult<&'a str> {
    // position 0 is the keyword itself
    match parts.get(position) {
        Some(value) if position > 0 => Ok(value),
        _ => Err(CueError::MissingField {
            keyword,
            line: line.to_string(),
        }),
    }
}

fn extract_quoted_string(line: &str) -> CueResult<String> {
    let (Some(start), Some(end)) = (line.find('"'), line.rfind('"')) else {
        return Err(CueError::InvalidQuotedString(line.to_string()));
    };
    if start >= end {
        return Err(CueError::InvalidQuotedString(line.to_string()));
    }

    Ok(line[start + 1..end].to_string())
}

fn parse_file_type(type_str: &str) -> CueResult<FileType> {
    match type_str {
        "BINARY" => Ok(FileType::Binary),
        "MOTOROLA" => Ok(FileType::Motorola),
        "AIFF" => Ok(FileType::Aiff),
        "WAVE" => Ok(FileType::Wave),
        "MP3" => Ok(FileType::Mp3),
        _ => Err(CueError::InvalidFileType(type_str.to_string())),
    }
}

fn parse_track_type(type_str: &str) -> CueResult<TrackType> {
    match type_str {
        "AUDIO" => Ok(TrackType::Audio),
        "CDG" => Ok(TrackType::CdG),
        "MODE1/2048" => Ok(TrackType::Mode1_2048),
        "MODE1/2352" => Ok(TrackType::Mode1_2352),
        "MODE2/2336" => Ok(TrackType::Mode2_2336),
        "MODE2/2352" => Ok(TrackType::Mode2_2352),
        "CDI/2336" => Ok(TrackType::CdI2336),
        "CDI/2352" => Ok(TrackType::CdI2352),
        _ => Err(CueError::InvalidTrackType(type_str.to_string())),
    }
}
