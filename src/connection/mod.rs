//! Connection lifecycle over the three telemetry regions.
//!
//! [`AccTelemetry`] is the single entry and exit point: `connect()` attaches
//! all three regions and starts their polling loops, `stop()` closes the
//! notification gate and cancels them. Per-region updates fan out over
//! broadcast channels; the graphics stream additionally drives game-status
//! transition events.


use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures::Stream;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::BroadcastStream;
use tracing::{info, warn};

use crate::channel::{SharedMemoryChannel, TelemetryChannel};
use crate::poller::{Observer, Poller, StreamEvent};
use crate::records::{GraphicsSnapshot, PhysicsSnapshot, StaticInfoSnapshot};
use crate::status::{ConnectionStatus, GameStatus, GameStatusTracker, StatusCell};
use crate::{Result, TelemetryError};

/// Sampling intervals for the three regions.
///
/// Applied when `connect()` is called; changing intervals on an established
/// connection has no effect until the next stop/connect cycle. Intervals
/// must be positive; zero is clamped to one millisecond.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollIntervals {
    /// Physics region interval. Default 16ms.
    pub physics: Duration,
    /// Graphics region interval. Default 100ms.
    pub graphics: Duration,
    /// Static-info region interval. Default 5s.
    pub static_info: Duration,
}

impl Default for PollIntervals {
    fn default() -> Self {
        Self {
            physics: Duration::from_millis(16),
            graphics: Duration::from_millis(100),
            static_info: Duration::from_millis(5000),
        }
    }
}

impl PollIntervals {
    fn clamped(self) -> Self {
        const MIN: Duration = Duration::from_millis(1);
        if self.physics < MIN || self.graphics < MIN || self.static_info < MIN {
            warn!("sub-millisecond polling interval clamped to 1ms");
        }
        Self {
            physics: self.physics.max(MIN),
            graphics: self.graphics.max(MIN),
            static_info: self.static_info.max(MIN),
        }
    }
}

type SharedChannel<T> = Arc<dyn TelemetryChannel<Snapshot = T>>;

/// Connection to Assetto Corsa Competizione shared-memory telemetry.
///
/// Subscribe before calling [`connect`](AccTelemetry::connect); events are
/// delivered on the polling threads' context, in strict sampling order per
/// region. No ordering holds across regions.
pub struct AccTelemetry {
    status: Arc<StatusCell>,
    intervals: PollIntervals,
    physics: SharedChannel<PhysicsSnapshot>,
    graphics: SharedChannel<GraphicsSnapshot>,
    static_info: SharedChannel<StaticInfoSnapshot>,
    physics_tx: broadcast::Sender<StreamEvent<PhysicsSnapshot>>,
    graphics_tx: broadcast::Sender<StreamEvent<GraphicsSnapshot>>,
    static_info_tx: broadcast::Sender<StreamEvent<StaticInfoSnapshot>>,
    game_status: Arc<GameStatusTracker>,
    active: Mutex<Vec<Poller>>,
}

impl AccTelemetry {
    /// Connection over the live shared-memory regions with default intervals.
    pub fn new() -> Self {
        Self::with_intervals(PollIntervals::default())
    }

    /// Connection over the live shared-memory regions.
    pub fn with_intervals(intervals: PollIntervals) -> Self {
        Self::from_channels(
            Arc::new(SharedMemoryChannel::<PhysicsSnapshot>::new()),
            Arc::new(SharedMemoryChannel::<GraphicsSnapshot>::new()),
            Arc::new(SharedMemoryChannel::<StaticInfoSnapshot>::new()),
            intervals,
        )
    }

    pub(crate) fn from_channels(
        physics: SharedChannel<PhysicsSnapshot>,
        graphics: SharedChannel<GraphicsSnapshot>,
        static_info: SharedChannel<StaticInfoSnapshot>,
        intervals: PollIntervals,
    ) -> Self {
        let (physics_tx, _) = broadcast::channel(256);
        let (graphics_tx, _) = broadcast::channel(64);
        let (static_info_tx, _) = broadcast::channel(16);
        let (game_status_tx, _) = broadcast::channel(16);

        Self {
            status: Arc::new(StatusCell::new(ConnectionStatus::Disconnected)),
            intervals: intervals.clamped(),
            physics,
            graphics,
            static_info,
            physics_tx,
            graphics_tx,
            static_info_tx,
            game_status: Arc::new(GameStatusTracker::new(game_status_tx)),
            active: Mutex::new(Vec::new()),
        }
    }

    /// Attach all three regions and start polling.
    ///
    /// Attaches in order physics, graphics, static-info. If any region is
    /// missing, everything already attached is released, game status is
    /// forced to `Off`, and the call fails with
    /// [`TelemetryError::RegionNotFound`]; partial connection is not a
    /// supported state. On success all three polling loops are running and
    /// the status is `Connected`.
    ///
    /// Calling while already connected fails with `AlreadyConnected`.
    /// Reconnecting immediately after `stop()` can observe handles the loops
    /// have not yet released; loops detach at their next interval boundary,
    /// so allow the longest interval to elapse before reconnecting.
    pub fn connect(&self) -> Result<()> {
        let mut active = self.active.lock().unwrap_or_else(|e| e.into_inner());
        if self.status.load() != ConnectionStatus::Disconnected || !active.is_empty() {
            return Err(TelemetryError::AlreadyConnected);
        }

        self.status.store(ConnectionStatus::Connecting);
        info!("connecting to shared memory");

        if let Err(e) = self
            .physics
            .attach()
            .and_then(|_| self.graphics.attach())
            .and_then(|_| self.static_info.attach())
        {
            warn!(error = %e, "connect failed, releasing partial state");
            self.release_all();
            return Err(e);
        }

        match self.spawn_pollers() {
            Ok(pollers) => {
                active.extend(pollers);
                self.status.store(ConnectionStatus::Connected);
                info!("connected, polling all three regions");
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "failed to start polling loops");
                self.release_all();
                Err(e)
            }
        }
    }

    /// Close the gate and cancel all polling loops.
    ///
    /// The status flips to `Disconnected` before the loops observe
    /// cancellation, so a loop may complete further read cycles after this
    /// returns; those samples are suppressed by the gate, never notified.
    /// Cancellation is fire-and-forget; each loop releases its region handle
    /// at its next interval boundary. Calling while not connected is a no-op.
    pub fn stop(&self) {
        self.status.store(ConnectionStatus::Disconnected);
        let mut active = self.active.lock().unwrap_or_else(|e| e.into_inner());
        if active.is_empty() {
            return;
        }
        info!(loops = active.len(), "stopping telemetry polling");
        for poller in active.drain(..) {
            poller.cancel();
        }
    }

    /// Aggregate connection status.
    pub fn status(&self) -> ConnectionStatus {
        self.status.load()
    }

    /// Whether the connection is fully established.
    pub fn is_running(&self) -> bool {
        self.status.load() == ConnectionStatus::Connected
    }

    /// Last game status derived from the graphics stream.
    pub fn game_status(&self) -> GameStatus {
        self.game_status.current()
    }

    /// One-shot read of the physics region, bypassing the polling path.
    pub fn read_physics(&self) -> Result<PhysicsSnapshot> {
        self.physics.read_snapshot()
    }

    /// One-shot read of the graphics region, bypassing the polling path.
    pub fn read_graphics(&self) -> Result<GraphicsSnapshot> {
        self.graphics.read_snapshot()
    }

    /// One-shot read of the static-info region, bypassing the polling path.
    pub fn read_static_info(&self) -> Result<StaticInfoSnapshot> {
        self.static_info.read_snapshot()
    }

    /// Subscribe to physics updates.
    pub fn subscribe_physics(&self) -> broadcast::Receiver<StreamEvent<PhysicsSnapshot>> {
        self.physics_tx.subscribe()
    }

    /// Subscribe to graphics updates.
    pub fn subscribe_graphics(&self) -> broadcast::Receiver<StreamEvent<GraphicsSnapshot>> {
        self.graphics_tx.subscribe()
    }

    /// Subscribe to static-info updates.
    pub fn subscribe_static_info(&self) -> broadcast::Receiver<StreamEvent<StaticInfoSnapshot>> {
        self.static_info_tx.subscribe()
    }

    /// Subscribe to game-status transitions (one event per distinct change).
    pub fn subscribe_game_status(&self) -> broadcast::Receiver<GameStatus> {
        self.game_status.subscribe()
    }

    /// Physics updates as a stream. Slow consumers skip lagged events.
    pub fn physics_updates(&self) -> impl Stream<Item = StreamEvent<PhysicsSnapshot>> + 'static {
        BroadcastStream::new(self.physics_tx.subscribe()).filter_map(|event| event.ok())
    }

    /// Graphics updates as a stream. Slow consumers skip lagged events.
    pub fn graphics_updates(&self) -> impl Stream<Item = StreamEvent<GraphicsSnapshot>> + 'static {
        BroadcastStream::new(self.graphics_tx.subscribe()).filter_map(|event| event.ok())
    }

    /// Static-info updates as a stream.
    pub fn static_info_updates(
        &self,
    ) -> impl Stream<Item = StreamEvent<StaticInfoSnapshot>> + 'static {
        BroadcastStream::new(self.static_info_tx.subscribe()).filter_map(|event| event.ok())
    }

    /// Game-status transitions as a stream.
    pub fn game_status_updates(&self) -> impl Stream<Item = GameStatus> + 'static {
        BroadcastStream::new(self.game_status.subscribe()).filter_map(|event| event.ok())
    }

    fn spawn_pollers(&self) -> Result<Vec<Poller>> {
        // Game-status derivation runs on the graphics polling thread, before
        // the graphics snapshot itself is re-broadcast.
        let tracker = Arc::clone(&self.game_status);
        let observer: Observer<GraphicsSnapshot> =
            Box::new(move |snapshot| tracker.observe(snapshot.game_status()));

        let mut pollers: Vec<Poller> = Vec::with_capacity(3);
        let spawn_step = |poller: Result<Poller>, pollers: &mut Vec<Poller>| match poller {
            Ok(p) => {
                pollers.push(p);
                Ok(())
            }
            Err(e) => {
                // A loop that never starts leaves its siblings running;
                // cancel them before reporting the failure.
                for started in pollers.drain(..) {
                    started.cancel();
                }
                Err(e)
            }
        };

        spawn_step(
            Poller::spawn(
                Arc::clone(&self.physics),
                self.intervals.physics,
                Arc::clone(&self.status),
                self.physics_tx.clone(),
                None,
            ),
            &mut pollers,
        )?;
        spawn_step(
            Poller::spawn(
                Arc::clone(&self.graphics),
                self.intervals.graphics,
                Arc::clone(&self.status),
                self.graphics_tx.clone(),
                Some(observer),
            ),
            &mut pollers,
        )?;
        spawn_step(
            Poller::spawn(
                Arc::clone(&self.static_info),
                self.intervals.static_info,
                Arc::clone(&self.status),
                self.static_info_tx.clone(),
                None,
            ),
            &mut pollers,
        )?;
        Ok(pollers)
    }

    /// Connect-failure cleanup: release every handle and force game status
    /// off. Partial connection is not a supported state.
    fn release_all(&self) {
        self.physics.detach();
        self.graphics.detach();
        self.static_info.detach();
        self.game_status.force(GameStatus::Off);
        self.status.store(ConnectionStatus::Disconnected);
    }
}

impl Default for AccTelemetry {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for AccTelemetry {
    fn drop(&mut self) {
        self.stop();
    }
}
