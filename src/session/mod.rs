use crate::cddb::MetadataProvider;
use crate::cddb::models::DiscMetadata;
use crate::config::MonitorConfig;
use crate::player::events::SessionEvent;
use crate::player::monitor::{PlaybackMonitor, TickOutcome};
use crate::player::state::{PlaybackSnapshot, TrackListing};
use crate::session::error::SessionResult;
use crate::toc::TableOfContents;
use crate::transport::Transport;
use log::{debug, info, warn};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::{Mutex, broadcast};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

pub mod error;

const EVENT_CAPACITY: usize = 256;

/// A playback session on one drive.
///
/// Drive commands and ticks run on the blocking pool, one at a time, behind
/// the monitor lock. Metadata lookups run as separate tasks; loading another
/// disc aborts the pending one.
pub struct Session<T: Transport + 'static, M: MetadataProvider> {
    monitor: Arc<Mutex<PlaybackMonitor<T>>>,
    provider: Arc<M>,
    events: broadcast::Sender<SessionEvent>,
    tick_in_flight: Arc<AtomicBool>,
    metadata_task: Mutex<Option<JoinHandle<()>>>,
    config: MonitorConfig,
}

/// Marks a tick as running until dropped.
struct TickGuard {
    in_flight: Arc<AtomicBool>,
}

impl TickGuard {
    fn acquire(in_flight: &Arc<AtomicBool>) -> Option<Self> {
        in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()?;

        Some(Self {
            in_flight: Arc::clone(in_flight),
        })
    }
}

impl Drop for TickGuard {
    fn drop(&mut self) {
        self.in_flight.store(false, Ordering::Release);
    }
}

impl<T: Transport + 'static, M: MetadataProvider> Session<T, M> {
    pub fn new(transport: T, provider: M, config: MonitorConfig) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let monitor = PlaybackMonitor::new(transport, config, events.clone());

        Self {
            monitor: Arc::new(Mutex::new(monitor)),
            provider: Arc::new(provider),
            events,
            tick_in_flight: Arc::new(AtomicBool::new(false)),
            metadata_task: Mutex::new(None),
            config,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    pub async fn snapshot(&self) -> PlaybackSnapshot {
        self.monitor.lock().await.snapshot()
    }

    pub async fn track_listing(&self) -> Vec<TrackListing> {
        self.snapshot().await.track_listing()
    }

    /// Loads the disc in `drive` and starts looking up its metadata in the
    /// background.
    pub async fn reload(&self, drive: &str) -> SessionResult<Arc<TableOfContents>> {
        self.cancel_metadata_fetch().await;

        let drive = drive.to_string();
        let toc = self.with_monitor(move |monitor| monitor.open(&drive)).await??;

        self.spawn_metadata_fetch(Arc::clone(&toc)).await;

        Ok(toc)
    }

    pub async fn play(&self, track: u8) -> SessionResult<()> {
        Ok(self.with_monitor(move |monitor| monitor.play(track)).await??)
    }

    pub async fn pause(&self) -> SessionResult<()> {
        Ok(self.with_monitor(|monitor| monitor.pause()).await??)
    }

    pub async fn resume(&self) -> SessionResult<()> {
        Ok(self.with_monitor(|monitor| monitor.resume()).await??)
    }

    pub async fn stop(&self) -> SessionResult<()> {
        Ok(self.with_monitor(|monitor| monitor.stop()).await??)
    }

    /// Ejects the disc. The pending lookup is only cancelled once the drive
    /// has let go of the disc.
    pub async fn eject(&self) -> SessionResult<()> {
        self.with_monitor(|monitor| monitor.eject()).await??;
        self.cancel_metadata_fetch().await;
        Ok(())
    }

    /// Polls the drive once. Returns `None` when the previous tick is still
    /// running, in which case this one is dropped.
    pub async fn tick(&self) -> SessionResult<Option<TickOutcome>> {
        let Some(guard) = TickGuard::acquire(&self.tick_in_flight) else {
            debug!("Previous tick still running, dropping this one");
            return Ok(None);
        };

        let outcome = self
            .with_monitor(move |monitor| {
                let _guard = guard;
                monitor.tick()
            })
            .await?;

        Ok(Some(outcome))
    }

    /// Starts the periodic poll loop. Abort the returned handle to end it.
    pub fn spawn_poller(self: &Arc<Self>) -> JoinHandle<()> {
        let session = Arc::clone(self);

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(session.config.poll_interval);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                interval.tick().await;

                let session = Arc::clone(&session);
                tokio::spawn(async move {
                    if let Err(err) = session.tick().await {
                        warn!("Position poll failed: {err}");
                    }
                });
            }
        })
    }

    async fn with_monitor<R, F>(&self, f: F) -> SessionResult<R>
    where
        F: FnOnce(&mut PlaybackMonitor<T>) -> R + Send + 'static,
        R: Send + 'static,
    {
        let monitor = Arc::clone(&self.monitor);

        let result = tokio::task::spawn_blocking(move || {
            let mut monitor = monitor.blocking_lock();
            f(&mut monitor)
        })
        .await?;

        Ok(result)
    }

    async fn cancel_metadata_fetch(&self) {
        if let Some(task) = self.metadata_task.lock().await.take() {
            task.abort();
        }
    }

    async fn spawn_metadata_fetch(&self, toc: Arc<TableOfContents>) {
        let provider = Arc::clone(&self.provider);
        let monitor = Arc::clone(&self.monitor);
        let events = self.events.clone();

        let task = tokio::spawn(async move {
            let disc_id = toc.disc_id().to_string();
            let result = provider.fetch(&toc).await;

            let mut monitor = monitor.lock().await;
            match result {
                Ok(metadata) => {
                    let metadata = Arc::new(metadata);
                    if !monitor.attach_metadata(&disc_id, Arc::clone(&metadata)) {
                        debug!("Discarding metadata for replaced disc {disc_id}");
                        return;
                    }

                    info!(
                        "Found metadata for disc {disc_id}: {} - {}",
                        metadata.artist, metadata.album
                    );
                    let _ = events.send(SessionEvent::MetadataReady { disc_id, metadata });
                }
                Err(err) => {
                    if !monitor.attach_metadata(&disc_id, Arc::new(DiscMetadata::default())) {
                        debug!("Discarding failed lookup for replaced disc {disc_id}");
                        return;
                    }

                    warn!("Metadata lookup for disc {disc_id} failed: {err}");
                    let _ = events.send(SessionEvent::MetadataFailed {
                        disc_id,
                        error: Arc::new(err),
                    });
                }
            }
        });

        if let Some(previous) = self.metadata_task.lock().await.replace(task) {
            previous.abort();
        }
    }
}

impl<T: Transport + 'static, M: MetadataProvider> Drop for Session<T, M> {
    fn drop(&mut self) {
        if let Some(task) = self.metadata_task.get_mut().take() {
            task.abort();
        }
    }
}
