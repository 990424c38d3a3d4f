//! Connection and game status tracking.
//!
//! [`ConnectionStatus`] is the notification gate shared between the lifecycle
//! manager (single writer) and the three polling threads (readers). The cell
//! uses relaxed atomics on purpose: readers only need the latest observed
//! value, and reacting one interval late to a status change is within the
//! cancellation contract.
//!
//! [`GameStatus`] is derived from the graphics stream. The tracker broadcasts
//! a change exactly once per distinct transition; equal consecutive samples
//! never re-notify.

use std::sync::Mutex;
use std::sync::atomic::{AtomicU8, Ordering};

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::debug;

/// Aggregate connection state, mutated only by [`AccTelemetry`].
///
/// [`AccTelemetry`]: crate::AccTelemetry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConnectionStatus {
    Disconnected,
    Connecting,
    Connected,
}

/// Single-writer, multi-reader atomic cell holding a [`ConnectionStatus`].
///
/// Pollers read this on every sample to decide whether to emit; staleness of
/// up to one interval is acceptable, so all accesses are `Relaxed`.
#[derive(Debug)]
pub(crate) struct StatusCell(AtomicU8);

const STATUS_DISCONNECTED: u8 = 0;
const STATUS_CONNECTING: u8 = 1;
const STATUS_CONNECTED: u8 = 2;

impl StatusCell {
    pub(crate) fn new(status: ConnectionStatus) -> Self {
        Self(AtomicU8::new(Self::encode(status)))
    }

    pub(crate) fn load(&self) -> ConnectionStatus {
        match self.0.load(Ordering::Relaxed) {
            STATUS_CONNECTING => ConnectionStatus::Connecting,
            STATUS_CONNECTED => ConnectionStatus::Connected,
            _ => ConnectionStatus::Disconnected,
        }
    }

    pub(crate) fn store(&self, status: ConnectionStatus) {
        self.0.store(Self::encode(status), Ordering::Relaxed);
    }

    fn encode(status: ConnectionStatus) -> u8 {
        match status {
            ConnectionStatus::Disconnected => STATUS_DISCONNECTED,
            ConnectionStatus::Connecting => STATUS_CONNECTING,
            ConnectionStatus::Connected => STATUS_CONNECTED,
        }
    }
}

/// Game status as published in the graphics record's `status` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameStatus {
    Off,
    Replay,
    Live,
    Pause,
}

impl GameStatus {
    /// Map the raw `status` field onto a [`GameStatus`].
    ///
    /// Values outside the published enum indicate a schema mismatch, which
    /// this crate does not validate; they map to `Off`.
    pub fn from_raw(raw: i32) -> Self {
        match raw {
            1 => GameStatus::Replay,
            2 => GameStatus::Live,
            3 => GameStatus::Pause,
            _ => GameStatus::Off,
        }
    }
}

impl From<i32> for GameStatus {
    fn from(raw: i32) -> Self {
        GameStatus::from_raw(raw)
    }
}

impl std::fmt::Display for GameStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            GameStatus::Off => "off",
            GameStatus::Replay => "replay",
            GameStatus::Live => "live",
            GameStatus::Pause => "pause",
        };
        f.write_str(name)
    }
}

/// Tracks the last-known game status and broadcasts transitions.
///
/// `observe` is called from the graphics polling thread for every sample;
/// `force` is called by the lifecycle manager on the connect-failure path.
/// Both send at most once per distinct transition.
#[derive(Debug)]
pub(crate) struct GameStatusTracker {
    current: Mutex<GameStatus>,
    tx: broadcast::Sender<GameStatus>,
}

impl GameStatusTracker {
    pub(crate) fn new(tx: broadcast::Sender<GameStatus>) -> Self {
        Self { current: Mutex::new(GameStatus::Off), tx }
    }

    pub(crate) fn subscribe(&self) -> broadcast::Receiver<GameStatus> {
        self.tx.subscribe()
    }

    /// Current last-known status.
    pub(crate) fn current(&self) -> GameStatus {
        *self.current.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Compare `status` with the last-known value; broadcast on change only.
    pub(crate) fn observe(&self, status: GameStatus) {
        let mut current = self.current.lock().unwrap_or_else(|e| e.into_inner());
        if *current == status {
            return;
        }
        debug!(from = %*current, to = %status, "game status changed");
        *current = status;
        // Errors only mean no subscriber is listening right now
        let _ = self.tx.send(status);
    }

    /// Force a status, broadcasting if it differs from the last-known value.
    pub(crate) fn force(&self, status: GameStatus) {
        self.observe(status);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_cell_round_trips_all_states() {
        let cell = StatusCell::new(ConnectionStatus::Disconnected);
        assert_eq!(cell.load(), ConnectionStatus::Disconnected);

        cell.store(ConnectionStatus::Connecting);
        assert_eq!(cell.load(), ConnectionStatus::Connecting);

        cell.store(ConnectionStatus::Connected);
        assert_eq!(cell.load(), ConnectionStatus::Connected);

        cell.store(ConnectionStatus::Disconnected);
        assert_eq!(cell.load(), ConnectionStatus::Disconnected);
    }

    #[test]
    fn raw_game_status_mapping() {
        assert_eq!(GameStatus::from_raw(0), GameStatus::Off);
        assert_eq!(GameStatus::from_raw(1), GameStatus::Replay);
        assert_eq!(GameStatus::from_raw(2), GameStatus::Live);
        assert_eq!(GameStatus::from_raw(3), GameStatus::Pause);
        // Out-of-range values are a schema mismatch; fold to Off
        assert_eq!(GameStatus::from_raw(-1), GameStatus::Off);
        assert_eq!(GameStatus::from_raw(42), GameStatus::Off);
    }

    #[tokio::test]
    async fn tracker_notifies_once_per_transition() {
        let (tx, mut rx) = broadcast::channel(16);
        let tracker = GameStatusTracker::new(tx);

        // [A, A, A, B, B, C] must yield exactly two notifications
        for status in [
            GameStatus::Off,
            GameStatus::Off,
            GameStatus::Off,
            GameStatus::Live,
            GameStatus::Live,
            GameStatus::Pause,
        ] {
            tracker.observe(status);
        }

        assert_eq!(rx.recv().await.unwrap(), GameStatus::Live);
        assert_eq!(rx.recv().await.unwrap(), GameStatus::Pause);
        assert!(matches!(rx.try_recv(), Err(broadcast::error::TryRecvError::Empty)));
        assert_eq!(tracker.current(), GameStatus::Pause);
    }

    #[test]
    fn tracker_initial_state_is_off_and_not_broadcast() {
        let (tx, mut rx) = broadcast::channel(16);
        let tracker = GameStatusTracker::new(tx);

        assert_eq!(tracker.current(), GameStatus::Off);
        tracker.force(GameStatus::Off);
        assert!(matches!(rx.try_recv(), Err(broadcast::error::TryRecvError::Empty)));
    }
}
