use crate::cd::time::{FrameCount, TimeCode};
use crate::transport::Transport;
use crate::transport::error::{TransportError, TransportResult};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

/// Scripted drive shared between a test and the code under test.
#[derive(Debug, Clone, Default)]
pub(crate) struct FakeTransport {
    drive: Arc<Mutex<FakeDrive>>,
}

#[derive(Debug, Default)]
pub(crate) struct FakeDrive {
    pub starts: Vec<FrameCount>,
    pub total: FrameCount,
    pub positions: VecDeque<TransportResult<Option<TimeCode>>>,
    pub calls: Vec<String>,
    pub failing: Vec<&'static str>,
    pub position_delay: Option<Duration>,
}

impl FakeTransport {
    pub fn with_layout(starts: &[FrameCount], total: FrameCount) -> Self {
        let transport = Self::default();
        {
            let mut drive = transport.drive();
            drive.starts = starts.to_vec();
            drive.total = total;
        }
        transport
    }

    pub fn drive(&self) -> MutexGuard<'_, FakeDrive> {
        self.drive.lock().unwrap()
    }

    pub fn queue_position(&self, frames: FrameCount) {
        self.drive()
            .positions
            .push_back(Ok(Some(TimeCode::from_frames(frames))));
    }

    pub fn queue_result(&self, result: TransportResult<Option<TimeCode>>) {
        self.drive().positions.push_back(result);
    }

    pub fn fail(&self, command: &'static str) {
        self.drive().failing.push(command);
    }

    pub fn heal(&self) {
        self.drive().failing.clear();
    }

    pub fn calls(&self) -> Vec<String> {
        self.drive().calls.clone()
    }

    fn command(&mut self, command: &'static str, call: String) -> TransportResult<()> {
        let mut drive = self.drive();
        drive.calls.push(call);

        if drive.failing.contains(&command) {
            return Err(TransportError::CommandRejected {
                command: command.to_string(),
                reason: "scripted failure".to_string(),
            });
        }

        Ok(())
    }
}

impl Transport for FakeTransport {
    fn open(&mut self, drive: &str) -> TransportResult<()> {
        self.command("open", format!("open {drive}"))
    }

    fn track_count(&mut self) -> TransportResult<u8> {
        self.command("track_count", "track_count".to_string())?;
        Ok(self.drive().starts.len() as u8)
    }

    fn track_start(&mut self, track: u8) -> TransportResult<TimeCode> {
        self.command("track_start", format!("track_start {track}"))?;
        let drive = self.drive();
        let start = (track as usize)
            .checked_sub(1)
            .and_then(|index| drive.starts.get(index))
            .ok_or(TransportError::InvalidTrack(track))?;
        Ok(TimeCode::from_frames(*start))
    }

    fn total_length(&mut self) -> TransportResult<TimeCode> {
        self.command("total_length", "total_length".to_string())?;
        Ok(TimeCode::from_frames(self.drive().total))
    }

    fn current_position(&mut self) -> TransportResult<Option<TimeCode>> {
        self.command("current_position", "current_position".to_string())?;

        let (delay, next) = {
            let mut drive = self.drive();
            (drive.position_delay, drive.positions.pop_front())
        };
        if let Some(delay) = delay {
            std::thread::sleep(delay);
        }

        next.unwrap_or(Ok(None))
    }

    fn play(&mut self, track: u8) -> TransportResult<()> {
        self.command("play", format!("play {track}"))
    }

    fn pause(&mut self) -> TransportResult<()> {
        self.command("pause", "pause".to_string())
    }

    fn resume(&mut self) -> TransportResult<()> {
        self.command("resume", "resume".to_string())
    }

    fn stop(&mut self) -> TransportResult<()> {
        self.command("stop", "stop".to_string())
    }

    fn eject(&mut self) -> TransportResult<()> {
        self.command("eject", "eject".to_string())
    }
}
