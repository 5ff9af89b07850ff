use clap::Parser;
use std::path::PathBuf;

/// Prints the table of contents and disc id of a CUE sheet image.
#[derive(Parser, Debug, Clone, Eq, PartialEq)]
pub struct TocCommand {
    /// CUE sheet describing the disc image
    #[arg(value_name = "INPUT_CUE")]
    pub input_cue: PathBuf,
}

/// Looks up album and track titles for a disc image.
#[derive(Parser, Debug, Clone, Eq, PartialEq)]
pub struct LookupCommand {
    /// CUE sheet describing the disc image
    #[arg(value_name = "INPUT_CUE")]
    pub input_cue: PathBuf,

    /// CDDB server to query, overrides CD_DECK_CDDB_URL
    #[arg(long, short = 's', value_name = "URL")]
    pub server: Option<String>,
}

/// Plays a track of a disc image until it ends or Ctrl-C is pressed.
#[derive(Parser, Debug, Clone, Eq, PartialEq)]
pub struct PlayCommand {
    /// CUE sheet describing the disc image
    #[arg(value_name = "INPUT_CUE")]
    pub input_cue: PathBuf,

    /// Track to play, starting at 1
    #[arg(value_name = "TRACK", default_value_t = 1)]
    pub track: u8,

    /// CDDB server to query, overrides CD_DECK_CDDB_URL
    #[arg(long, short = 's', value_name = "URL")]
    pub server: Option<String>,

    /// Milliseconds between position polls, overrides CD_DECK_POLL_INTERVAL_MS
    #[arg(long, value_name = "MILLIS", value_parser = clap::value_parser!(u64).range(1..))]
    pub poll_interval_ms: Option<u64>,

    /// Check for the end of the track on every Nth position change,
    /// overrides CD_DECK_BOUNDARY_CHECK_EVERY
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u32).range(1..))]
    pub boundary_check_every: Option<u32>,
}
