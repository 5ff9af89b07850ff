use crate::commands::disc::{LookupCommand, PlayCommand, TocCommand};
use crate::commands::{Cli, Commands};
use anyhow::{Result, bail};
use cd_deck::cd::time::{TimeCode, TimeFormat};
use cd_deck::cddb::CddbClient;
use cd_deck::config::{CddbConfig, MonitorConfig};
use cd_deck::player::PlaybackStatus;
use cd_deck::toc::TableOfContents;
use cd_deck::transport::Transport;
use cd_deck::transport::cue::CueTransport;
use cd_deck::{Session, SessionEvent};
use clap::Parser;
use log::{info, warn};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;

mod commands;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Toc(cmd) => print_toc(cmd)?,
        Commands::Lookup(cmd) => lookup(cmd).await?,
        Commands::Play(cmd) => play(cmd).await?,
    }

    Ok(())
}

fn cddb_config(server: Option<String>) -> Result<CddbConfig> {
    let mut config = CddbConfig::from_env()?;
    if let Some(server) = server {
        config.server_url = server;
    }
    Ok(config)
}

fn read_toc(cue: &Path) -> Result<TableOfContents> {
    let mut transport = CueTransport::new();
    transport.open(&cue.to_string_lossy())?;
    Ok(TableOfContents::build(&mut transport)?)
}

fn print_toc(cmd: TocCommand) -> Result<()> {
    let toc = read_toc(&cmd.input_cue)?;

    println!("Disc id: {}", toc.disc_id());
    println!("Length:  {}", toc.total_length().format(TimeFormat::WithoutFrames));
    for track in 1..=toc.track_count() {
        let start = toc.track_start(track).unwrap_or_default();
        let length = toc.track_length(track).unwrap_or_default();
        println!(
            "{track:>2}  {}  {}",
            TimeCode::from_frames(start),
            TimeCode::from_frames(length).format(TimeFormat::WithoutFrames)
        );
    }

    Ok(())
}

async fn lookup(cmd: LookupCommand) -> Result<()> {
    let toc = read_toc(&cmd.input_cue)?;
    let client = CddbClient::new(cddb_config(cmd.server)?)?;

    info!("Looking up disc {}", toc.disc_id());
    let metadata = client.fetch(&toc).await?;

    println!("{} / {}", metadata.artist, metadata.album);
    for track in 1..=toc.track_count() {
        println!("{track:>2}  {}", cd_deck::cddb::lookup_track(&metadata, track).title);
    }

    Ok(())
}

async fn play(cmd: PlayCommand) -> Result<()> {
    let client = CddbClient::new(cddb_config(cmd.server)?)?;
    let mut monitor_config = MonitorConfig::from_env()?;
    if let Some(millis) = cmd.poll_interval_ms {
        monitor_config.poll_interval = Duration::from_millis(millis);
    }
    if let Some(every) = cmd.boundary_check_every {
        monitor_config.boundary_check_threshold = every;
    }

    let session = Arc::new(Session::new(CueTransport::new(), client, monitor_config));
    let mut events = session.subscribe();

    let toc = session.reload(&cmd.input_cue.to_string_lossy()).await?;
    if !toc.contains_track(cmd.track) {
        bail!(
            "Track {} is not on this disc, it has {} tracks",
            cmd.track,
            toc.track_count()
        );
    }

    session.play(cmd.track).await?;
    let poller = session.spawn_poller();

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted, stopping playback");
                session.stop().await?;
                break;
            }
            event = events.recv() => match event {
                Ok(SessionEvent::StateChanged(PlaybackStatus::Stopped)) => {
                    info!("Playback stopped");
                    break;
                }
                Ok(SessionEvent::StateChanged(status)) => info!("Now {status}"),
                Ok(SessionEvent::PositionChanged { track, position }) => {
                    let title = session.snapshot().await.track(track).title;
                    info!("{track:>2} {title} {position}");
                }
                Ok(SessionEvent::MetadataReady { metadata, .. }) => {
                    info!("{} / {}", metadata.artist, metadata.album);
                }
                Ok(SessionEvent::MetadataFailed { error, .. }) => {
                    warn!("Using generated track titles: {error}");
                }
                Ok(SessionEvent::TocReady(_) | SessionEvent::TocFailed(_)) => {}
                Err(RecvError::Lagged(skipped)) => warn!("Skipped {skipped} session events"),
                Err(RecvError::Closed) => break,
            }
        }
    }

    poller.abort();

    Ok(())
}
