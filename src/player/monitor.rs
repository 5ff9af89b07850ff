use crate::cd::time::TimeCode;
use crate::cddb::models::DiscMetadata;
use crate::config::MonitorConfig;
use crate::player::error::{MonitorError, MonitorResult};
use crate::player::events::SessionEvent;
use crate::player::state::{PlaybackSnapshot, PlaybackState, PlaybackStatus};
use crate::toc::TableOfContents;
use crate::transport::Transport;
use crate::transport::error::TransportResult;
use log::{debug, error, info, warn};
use std::sync::Arc;
use tokio::sync::broadcast;

/// What a single [`PlaybackMonitor::tick`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Not playing, nothing polled.
    Idle,
    /// The drive reported no position.
    NoPosition,
    /// Same position as the previous tick.
    Unchanged,
    /// Reading the position failed; state is untouched.
    Failed,
    Advanced { track: u8, position: TimeCode },
    /// The end of the track was reached and playback stopped.
    TrackEnded { track: u8 },
}

/// Owns the playback state of one drive and every command sent to it.
pub struct PlaybackMonitor<T: Transport> {
    transport: T,
    toc: Option<Arc<TableOfContents>>,
    metadata: Option<Arc<DiscMetadata>>,
    state: PlaybackState,
    config: MonitorConfig,
    events: broadcast::Sender<SessionEvent>,
}

impl<T: Transport> PlaybackMonitor<T> {
    pub fn new(
        transport: T,
        config: MonitorConfig,
        events: broadcast::Sender<SessionEvent>,
    ) -> Self {
        Self {
            transport,
            toc: None,
            metadata: None,
            state: PlaybackState::default(),
            config,
            events,
        }
    }

    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    pub fn status(&self) -> PlaybackStatus {
        self.state.status
    }

    pub fn toc(&self) -> Option<&Arc<TableOfContents>> {
        self.toc.as_ref()
    }

    pub fn metadata(&self) -> Option<&Arc<DiscMetadata>> {
        self.metadata.as_ref()
    }

    pub fn snapshot(&self) -> PlaybackSnapshot {
        PlaybackSnapshot {
            state: self.state.clone(),
            toc: self.toc.clone(),
            metadata: self.metadata.clone(),
        }
    }

    /// Opens `drive` and reads the table of contents of the disc inside.
    pub fn open(&mut self, drive: &str) -> TransportResult<Arc<TableOfContents>> {
        self.discard_disc();

        if let Err(err) = self.transport.open(drive) {
            error!("Could not open drive {drive}: {err}");
            self.emit(SessionEvent::TocFailed(err.to_string()));
            return Err(err);
        }

        self.load_toc()
    }

    /// Drops everything known about the current disc and reads its table of
    /// contents again.
    pub fn reload_toc(&mut self) -> TransportResult<Arc<TableOfContents>> {
        self.discard_disc();
        self.load_toc()
    }

    /// Stores metadata fetched for `disc_id`. Returns `false` and drops it if
    /// another disc has been loaded since.
    pub fn attach_metadata(&mut self, disc_id: &str, metadata: Arc<DiscMetadata>) -> bool {
        if !self.is_current_disc(disc_id) {
            return false;
        }

        self.metadata = Some(metadata);
        true
    }

    pub fn is_current_disc(&self, disc_id: &str) -> bool {
        self.toc.as_ref().is_some_and(|toc| toc.disc_id() == disc_id)
    }

    pub fn play(&mut self, track: u8) -> MonitorResult<()> {
        let toc = self.toc.as_ref().ok_or(MonitorError::NoDisc)?;
        if !toc.contains_track(track) {
            return Err(MonitorError::TrackOutOfRange {
                track,
                track_count: toc.track_count(),
            });
        }

        if !self.state.status.is_stopped() {
            self.transport.stop()?;

            if let Err(err) = self.transport.play(track) {
                warn!("Could not switch to track {track}: {err}");
                self.enter_stopped();
                return Err(err.into());
            }
        } else {
            self.transport.play(track)?;
        }

        info!("Playing track {track}");
        self.state.clear_positions();
        self.set_status(PlaybackStatus::Playing { track });

        Ok(())
    }

    pub fn pause(&mut self) -> MonitorResult<()> {
        let PlaybackStatus::Playing { track } = self.state.status else {
            return Err(self.invalid_transition("pause"));
        };

        self.transport.pause()?;
        self.set_status(PlaybackStatus::Paused { track });

        Ok(())
    }

    pub fn resume(&mut self) -> MonitorResult<()> {
        let PlaybackStatus::Paused { track } = self.state.status else {
            return Err(self.invalid_transition("resume"));
        };

        self.transport.resume()?;
        self.set_status(PlaybackStatus::Playing { track });

        Ok(())
    }

    /// Stops playback. Stopping while already stopped does nothing.
    pub fn stop(&mut self) -> MonitorResult<()> {
        if self.state.status.is_stopped() {
            return Ok(());
        }

        self.transport.stop()?;
        self.enter_stopped();

        Ok(())
    }

    pub fn eject(&mut self) -> MonitorResult<()> {
        self.stop()?;
        self.transport.eject()?;

        info!("Disc ejected");
        self.toc = None;
        self.metadata = None;

        Ok(())
    }

    /// One poll of the drive position. Only does work while playing.
    ///
    /// Errors never escape: a failed read leaves the state as it was.
    pub fn tick(&mut self) -> TickOutcome {
        let PlaybackStatus::Playing { track } = self.state.status else {
            return TickOutcome::Idle;
        };

        let position = match self.transport.current_position() {
            Ok(Some(position)) => position,
            Ok(None) => return TickOutcome::NoPosition,
            Err(err) => {
                warn!("Could not read drive position: {err}");
                return TickOutcome::Failed;
            }
        };

        let frames = position.to_frames();
        if self.state.last_position == Some(frames) {
            return TickOutcome::Unchanged;
        }

        self.state.current_position = Some(frames);
        self.emit(SessionEvent::PositionChanged { track, position });

        self.state.boundary_check_counter += 1;
        if self.state.boundary_check_counter >= self.config.boundary_check_threshold.max(1) {
            self.state.boundary_check_counter = 0;

            let track_end = self.toc.as_ref().and_then(|toc| toc.track_end(track));
            if let Some(track_end) = track_end.filter(|end| frames >= *end) {
                debug!("Position {frames} reached end of track {track} at {track_end}");

                match self.transport.stop() {
                    Ok(()) => {
                        info!("Track {track} finished");
                        self.enter_stopped();
                        return TickOutcome::TrackEnded { track };
                    }
                    Err(err) => warn!("Could not stop at end of track {track}: {err}"),
                }
            }
        }

        self.state.last_position = Some(frames);

        TickOutcome::Advanced { track, position }
    }

    fn load_toc(&mut self) -> TransportResult<Arc<TableOfContents>> {
        match TableOfContents::build(&mut self.transport) {
            Ok(toc) => {
                let toc = Arc::new(toc);
                info!(
                    "Loaded disc {} with {} tracks ({})",
                    toc.disc_id(),
                    toc.track_count(),
                    toc.total_length()
                );

                self.toc = Some(Arc::clone(&toc));
                self.emit(SessionEvent::TocReady(Arc::clone(&toc)));

                Ok(toc)
            }
            Err(err) => {
                error!("Could not read table of contents: {err}");
                self.emit(SessionEvent::TocFailed(err.to_string()));
                Err(err)
            }
        }
    }

    fn discard_disc(&mut self) {
        if !self.state.status.is_stopped() {
            if let Err(err) = self.transport.stop() {
                warn!("Could not stop drive before reloading: {err}");
            }
        }

        self.toc = None;
        self.metadata = None;
        self.enter_stopped();
    }

    fn enter_stopped(&mut self) {
        if self.state.status.is_stopped() {
            self.state.clear_positions();
            return;
        }

        self.state.reset();
        self.emit(SessionEvent::StateChanged(PlaybackStatus::Stopped));
    }

    fn set_status(&mut self, status: PlaybackStatus) {
        self.state.transition(status);
        self.emit(SessionEvent::StateChanged(status));
    }

    fn invalid_transition(&self, command: &'static str) -> MonitorError {
        MonitorError::InvalidTransition {
            command,
            status: self.state.status,
        }
    }

    fn emit(&self, event: SessionEvent) {
        // nobody listening is fine
        let _ = self.events.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::error::TransportError;
    use crate::transport::testing::FakeTransport;
    use tokio::sync::broadcast::Receiver;
    use tokio::sync::broadcast::error::TryRecvError;

    fn monitor_with(
        threshold: u32,
    ) -> (
        PlaybackMonitor<FakeTransport>,
        FakeTransport,
        Receiver<SessionEvent>,
    ) {
        let transport = FakeTransport::with_layout(&[0, 1000, 2500], 4000);
        let (events, receiver) = broadcast::channel(64);
        let config = MonitorConfig {
            boundary_check_threshold: threshold,
            ..MonitorConfig::default()
        };

        let mut monitor = PlaybackMonitor::new(transport.clone(), config, events);
        monitor.open("D:").unwrap();

        (monitor, transport, receiver)
    }

    fn drain(receiver: &mut Receiver<SessionEvent>) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        loop {
            match receiver.try_recv() {
                Ok(event) => events.push(event),
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => return events,
                Err(TryRecvError::Lagged(_)) => continue,
            }
        }
    }

    #[test]
    fn open_loads_toc_and_notifies() {
        let (monitor, transport, mut receiver) = monitor_with(5);

        assert_eq!(monitor.toc().unwrap().disc_id(), "3-4000-0-1000-2500");
        assert_eq!(monitor.status(), PlaybackStatus::Stopped);
        assert_eq!(transport.calls()[0], "open D:");
        assert!(matches!(
            drain(&mut receiver).as_slice(),
            [SessionEvent::TocReady(_)]
        ));
    }

    #[test]
    fn open_failure_leaves_no_toc() {
        let transport = FakeTransport::with_layout(&[0, 1000], 4000);
        transport.fail("total_length");
        let (events, mut receiver) = broadcast::channel(16);

        let mut monitor = PlaybackMonitor::new(transport, MonitorConfig::default(), events);

        assert!(monitor.open("D:").is_err());
        assert!(monitor.toc().is_none());
        assert!(matches!(
            drain(&mut receiver).as_slice(),
            [SessionEvent::TocFailed(_)]
        ));
        assert!(matches!(monitor.play(1), Err(MonitorError::NoDisc)));
    }

    #[test]
    fn play_pause_resume_stop() {
        let (mut monitor, transport, mut receiver) = monitor_with(5);
        drain(&mut receiver);

        monitor.play(3).unwrap();
        assert_eq!(monitor.status(), PlaybackStatus::Playing { track: 3 });

        monitor.pause().unwrap();
        assert_eq!(monitor.status(), PlaybackStatus::Paused { track: 3 });

        monitor.resume().unwrap();
        assert_eq!(monitor.status(), PlaybackStatus::Playing { track: 3 });

        monitor.stop().unwrap();
        assert_eq!(monitor.status(), PlaybackStatus::Stopped);

        let calls = transport.calls();
        assert_eq!(&calls[calls.len() - 4..], ["play 3", "pause", "resume", "stop"]);

        let statuses: Vec<PlaybackStatus> = drain(&mut receiver)
            .into_iter()
            .filter_map(|event| match event {
                SessionEvent::StateChanged(status) => Some(status),
                _ => None,
            })
            .collect();
        assert_eq!(
            statuses,
            vec![
                PlaybackStatus::Playing { track: 3 },
                PlaybackStatus::Paused { track: 3 },
                PlaybackStatus::Playing { track: 3 },
                PlaybackStatus::Stopped,
            ]
        );
    }

    #[test]
    fn invalid_commands_do_not_reach_the_drive() {
        let (mut monitor, transport, _receiver) = monitor_with(5);
        let calls_before = transport.calls().len();

        assert!(matches!(
            monitor.pause(),
            Err(MonitorError::InvalidTransition { command: "pause", .. })
        ));
        assert!(matches!(
            monitor.resume(),
            Err(MonitorError::InvalidTransition { command: "resume", .. })
        ));
        assert!(matches!(
            monitor.play(4),
            Err(MonitorError::TrackOutOfRange {
                track: 4,
                track_count: 3
            })
        ));
        assert!(matches!(
            monitor.play(0),
            Err(MonitorError::TrackOutOfRange { track: 0, .. })
        ));
        monitor.stop().unwrap();

        assert_eq!(transport.calls().len(), calls_before);
    }

    #[test]
    fn transport_failure_keeps_previous_state() {
        let (mut monitor, transport, _receiver) = monitor_with(5);

        transport.fail("play");
        assert!(matches!(
            monitor.play(1),
            Err(MonitorError::TransportError(TransportError::CommandRejected { .. }))
        ));
        assert_eq!(monitor.status(), PlaybackStatus::Stopped);

        transport.heal();
        monitor.play(1).unwrap();

        transport.fail("pause");
        assert!(monitor.pause().is_err());
        assert_eq!(monitor.status(), PlaybackStatus::Playing { track: 1 });

        transport.fail("stop");
        assert!(monitor.stop().is_err());
        assert_eq!(monitor.status(), PlaybackStatus::Playing { track: 1 });
    }

    #[test]
    fn tick_reports_position_changes_once() {
        let (mut monitor, transport, mut receiver) = monitor_with(5);
        monitor.play(1).unwrap();
        drain(&mut receiver);

        transport.queue_position(75);
        transport.queue_position(75);
        transport.queue_position(150);

        assert_eq!(
            monitor.tick(),
            TickOutcome::Advanced {
                track: 1,
                position: TimeCode::from_frames(75)
            }
        );
        assert_eq!(monitor.tick(), TickOutcome::Unchanged);
        assert!(matches!(monitor.tick(), TickOutcome::Advanced { .. }));
        assert_eq!(monitor.state().current_position, Some(150));
        assert_eq!(monitor.state().last_position, Some(150));

        let positions: Vec<u32> = drain(&mut receiver)
            .into_iter()
            .filter_map(|event| match event {
                SessionEvent::PositionChanged { track: 1, position } => Some(position.to_frames()),
                _ => None,
            })
            .collect();
        assert_eq!(positions, vec![75, 150]);
    }

    #[test]
    fn tick_is_idle_unless_playing() {
        let (mut monitor, transport, _receiver) = monitor_with(1);
        transport.queue_position(10);

        assert_eq!(monitor.tick(), TickOutcome::Idle);

        monitor.play(1).unwrap();
        monitor.pause().unwrap();
        assert_eq!(monitor.tick(), TickOutcome::Idle);
        assert!(!transport.calls().contains(&"current_position".to_string()));
    }

    #[test]
    fn tick_survives_drive_errors() {
        let (mut monitor, transport, _receiver) = monitor_with(1);
        monitor.play(2).unwrap();

        transport.queue_result(Err(TransportError::InvalidTimeCode(
            crate::cd::error::ConversionError::FramesOutOfRange(80),
        )));
        assert_eq!(monitor.tick(), TickOutcome::Failed);

        transport.queue_result(Ok(None));
        assert_eq!(monitor.tick(), TickOutcome::NoPosition);

        transport.fail("current_position");
        assert_eq!(monitor.tick(), TickOutcome::Failed);
        assert_eq!(monitor.status(), PlaybackStatus::Playing { track: 2 });
        assert_eq!(monitor.state().current_position, None);
    }

    #[test]
    fn stops_at_next_track_start() {
        let (mut monitor, transport, _receiver) = monitor_with(1);
        monitor.play(2).unwrap();

        transport.queue_position(2499);
        assert!(matches!(monitor.tick(), TickOutcome::Advanced { .. }));
        assert_eq!(monitor.status(), PlaybackStatus::Playing { track: 2 });

        transport.queue_position(2500);
        assert_eq!(monitor.tick(), TickOutcome::TrackEnded { track: 2 });
        assert_eq!(monitor.status(), PlaybackStatus::Stopped);
        assert_eq!(monitor.state().current_position, None);
        assert_eq!(monitor.state().last_position, None);
        assert_eq!(transport.calls().last().unwrap(), "stop");
    }

    #[test]
    fn first_track_stops_at_second_track_start() {
        let (mut monitor, transport, _receiver) = monitor_with(1);
        monitor.play(1).unwrap();

        transport.queue_position(1000);
        assert_eq!(monitor.tick(), TickOutcome::TrackEnded { track: 1 });
    }

    #[test]
    fn last_track_stops_at_total_length() {
        let (mut monitor, transport, _receiver) = monitor_with(1);
        monitor.play(3).unwrap();

        transport.queue_position(3999);
        assert!(matches!(monitor.tick(), TickOutcome::Advanced { .. }));

        transport.queue_position(4000);
        assert_eq!(monitor.tick(), TickOutcome::TrackEnded { track: 3 });
    }

    #[test]
    fn boundary_is_checked_every_nth_position_change() {
        let (mut monitor, transport, _receiver) = monitor_with(3);
        monitor.play(1).unwrap();

        transport.queue_position(1001);
        transport.queue_position(1002);
        assert!(matches!(monitor.tick(), TickOutcome::Advanced { .. }));
        assert!(matches!(monitor.tick(), TickOutcome::Advanced { .. }));
        assert_eq!(monitor.state().boundary_check_counter, 2);

        transport.queue_position(1003);
        assert_eq!(monitor.tick(), TickOutcome::TrackEnded { track: 1 });
        assert_eq!(monitor.state().boundary_check_counter, 0);
    }

    #[test]
    fn failed_auto_stop_keeps_playing() {
        let (mut monitor, transport, _receiver) = monitor_with(1);
        monitor.play(1).unwrap();
        transport.fail("stop");

        transport.queue_position(1200);
        assert!(matches!(monitor.tick(), TickOutcome::Advanced { .. }));
        assert_eq!(monitor.status(), PlaybackStatus::Playing { track: 1 });
    }

    #[test]
    fn reload_discards_disc_state() {
        let (mut monitor, transport, _receiver) = monitor_with(1);
        monitor.play(2).unwrap();
        transport.queue_position(1100);
        monitor.tick();

        let disc_id = monitor.toc().unwrap().disc_id().to_string();
        assert!(monitor.attach_metadata(&disc_id, Arc::new(DiscMetadata::default())));

        transport.drive().starts = vec![0, 3000];
        let toc = monitor.reload_toc().unwrap();

        assert_eq!(monitor.status(), PlaybackStatus::Stopped);
        assert_eq!(monitor.state().current_position, None);
        assert!(monitor.metadata().is_none());
        assert_eq!(toc.track_count(), 2);
        assert!(!monitor.attach_metadata(&disc_id, Arc::new(DiscMetadata::default())));
        assert!(monitor.is_current_disc(toc.disc_id()));
    }

    #[test]
    fn eject_drops_disc() {
        let (mut monitor, transport, _receiver) = monitor_with(5);
        monitor.play(1).unwrap();

        monitor.eject().unwrap();

        assert_eq!(monitor.status(), PlaybackStatus::Stopped);
        assert!(monitor.toc().is_none());
        let calls = transport.calls();
        assert_eq!(&calls[calls.len() - 2..], ["stop", "eject"]);
    }

    #[test]
    fn play_switches_tracks_while_playing() {
        let (mut monitor, transport, _receiver) = monitor_with(5);
        monitor.play(1).unwrap();
        monitor.play(3).unwrap();

        assert_eq!(
            transport.calls().iter().rev().take(3).rev().collect::<Vec<_>>(),
            vec!["play 1", "stop", "play 3"]
        );
        assert_eq!(monitor.status(), PlaybackStatus::Playing { track: 3 });
        assert_eq!(monitor.snapshot().now_playing().unwrap().title, "Track 3");
    }

    #[test]
    fn failed_track_switch_leaves_the_drive_stopped() {
        let (mut monitor, transport, mut receiver) = monitor_with(5);
        monitor.play(1).unwrap();
        transport.queue_position(100);
        monitor.tick();
        drain(&mut receiver);

        transport.fail("play");
        assert!(matches!(
            monitor.play(3),
            Err(MonitorError::TransportError(TransportError::CommandRejected { .. }))
        ));

        let calls = transport.calls();
        assert_eq!(&calls[calls.len() - 2..], ["stop", "play 3"]);
        assert_eq!(monitor.status(), PlaybackStatus::Stopped);
        assert_eq!(monitor.state().current_position, None);
        assert!(matches!(
            drain(&mut receiver).as_slice(),
            [SessionEvent::StateChanged(PlaybackStatus::Stopped)]
        ));
        assert_eq!(monitor.tick(), TickOutcome::Idle);
    }
}
