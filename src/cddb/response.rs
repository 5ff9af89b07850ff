use crate::cddb::error::{MetadataError, MetadataResult};
use crate::cddb::models::{DiscMetadata, TrackMetadata};
use lazy_static::lazy_static;
use log::debug;
use regex::Regex;

/// Exact match, the only status a reply is parsed for.
pub const STATUS_EXACT_MATCH: u16 = 200;

const ARTIST_ALBUM_SEPARATOR: &str = " / ";

lazy_static! {
    static ref STATUS_RE: Regex = Regex::new(r"^(?P<code>\d{3})(?:\s+(?P<message>.*))?$").unwrap();
    static ref TRACK_TITLE_RE: Regex = Regex::new(r"^TTITLE(?P<index>\d+)=(?P<title>.*)$").unwrap();
}

/// Parses a CDDB reply.
///
/// The first line carries the status code; anything but 200 is returned as
/// [`MetadataError::ProtocolError`]. On 200 the second line holds
/// `artist / album` and every `TTITLE<n>=<title>` line after it names track
/// `n + 1`.
pub fn parse_response(body: &str) -> MetadataResult<DiscMetadata> {
    let mut lines = body.lines();

    let status_line = lines
        .next()
        .ok_or_else(|| MetadataError::ParseError("empty reply".to_string()))?;
    let (code, message) = parse_status_line(status_line)?;

    if code != STATUS_EXACT_MATCH {
        return Err(MetadataError::ProtocolError { code, message });
    }

    let heading = lines
        .next()
        .ok_or_else(|| MetadataError::ParseError("reply has no artist / album line".to_string()))?;

    let mut metadata = DiscMetadata::default();

    let mut parts = heading.trim().split(ARTIST_ALBUM_SEPARATOR);
    if let (Some(artist), Some(album)) = (parts.next(), parts.next()) {
        metadata.artist = artist.to_string();
        metadata.album = album.to_string();
    } else {
        debug!("Reply heading has no artist / album separator: {heading:?}");
    }

    for line in lines {
        let Some(captures) = TRACK_TITLE_RE.captures(line.trim_end()) else {
            continue;
        };

        let index = &captures["index"];
        let number = index
            .parse::<u8>()
            .ok()
            .and_then(|index| index.checked_add(1))
            .ok_or_else(|| MetadataError::ParseError(format!("track index out of range: {index}")))?;

        metadata.tracks.push(TrackMetadata {
            number,
            title: captures["title"].trim().to_string(),
        });
    }

    Ok(metadata)
}

fn parse_status_line(line: &str) -> MetadataResult<(u16, String)> {
    let line = line.trim();
    let captures = STATUS_RE
        .captures(line)
        .ok_or_else(|| MetadataError::ParseError(format!("invalid status line: {line:?}")))?;

    let code = captures["code"]
        .parse::<u16>()
        .map_err(|_| MetadataError::ParseError(format!("invalid status code: {line:?}")))?;
    let message = captures
        .name("message")
        .map(|m| m.as_str().to_string())
        .unwrap_or_default();

    Ok((code, message))
}
