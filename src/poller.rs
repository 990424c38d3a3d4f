//! Polling loop driving one telemetry channel.
//!
//! Each region gets its own dedicated, long-running thread so a slow read in
//! one region can never delay another region's schedule. The loop reads a
//! snapshot, broadcasts it if the connection-status gate is open, sleeps for
//! its interval, and only then observes cancellation: worst-case stop latency
//! is one read plus one full interval.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use crate::channel::TelemetryChannel;
use crate::status::{ConnectionStatus, StatusCell};
use crate::{Result, TelemetryError};

/// One event on a region's update stream.
///
/// Faults are terminal: the loop broadcasts exactly one `Fault` and then
/// stops sampling that region. Other regions are unaffected.
#[derive(Debug, Clone)]
pub enum StreamEvent<T> {
    /// A decoded snapshot, produced fresh on every successful read.
    Snapshot(T),
    /// The loop hit an unrecoverable read or decode failure and terminated.
    Fault(Arc<TelemetryError>),
}

/// Per-sample hook run on the polling thread before the snapshot is
/// broadcast. The lifecycle manager uses this to derive game-status
/// transitions from the graphics stream.
pub(crate) type Observer<T> = Box<dyn FnMut(&T) + Send>;

/// Handle to one running polling loop.
///
/// Spawning consumes its inputs, so a loop can never be started twice.
/// Cancellation is cooperative and observed at interval boundaries only.
pub(crate) struct Poller {
    cancel: CancellationToken,
}

impl Poller {
    /// Spawn a polling thread over `channel`.
    ///
    /// The channel must already be attached; the loop never emits before a
    /// successful attach because an unattached read faults immediately. After
    /// observing cancellation the loop detaches the channel and exits.
    pub(crate) fn spawn<C>(
        channel: Arc<C>,
        interval: Duration,
        gate: Arc<StatusCell>,
        events: broadcast::Sender<StreamEvent<C::Snapshot>>,
        mut observer: Option<Observer<C::Snapshot>>,
    ) -> Result<Self>
    where
        C: TelemetryChannel + ?Sized,
    {
        let label = channel.label();
        let thread_name = format!("acc-{label}");
        let cancel = CancellationToken::new();
        let cancel_loop = cancel.clone();

        std::thread::Builder::new()
            .name(thread_name.clone())
            .spawn(move || {
                info!(region = label, interval_ms = interval.as_millis() as u64, "poller started");
                let mut sample_count = 0u64;

                loop {
                    match channel.read_snapshot() {
                        Ok(snapshot) => {
                            sample_count += 1;
                            // Gate: a closed connection suppresses notification
                            // even when the handle is still attached.
                            if gate.load() != ConnectionStatus::Disconnected {
                                if let Some(observer) = observer.as_mut() {
                                    observer(&snapshot);
                                }
                                trace!(region = label, sample = sample_count, "snapshot");
                                // Send errors only mean nobody is subscribed
                                let _ = events.send(StreamEvent::Snapshot(snapshot));
                            } else {
                                trace!(region = label, "gate closed, sample suppressed");
                            }
                        }
                        Err(e) if cancel_loop.is_cancelled() => {
                            // Shutdown already requested; a failing read on
                            // the way out is not a fault worth surfacing.
                            debug!(region = label, error = %e, "read failed during shutdown");
                            break;
                        }
                        Err(e) => {
                            // Terminal for this region's stream; never
                            // busy-loop on a broken channel or crash the
                            // process.
                            warn!(region = label, error = %e, "poller terminating on read failure");
                            let _ = events.send(StreamEvent::Fault(Arc::new(e)));
                            break;
                        }
                    }

                    std::thread::sleep(interval);
                    if cancel_loop.is_cancelled() {
                        debug!(region = label, "poller observed cancellation");
                        break;
                    }
                }

                channel.detach();
                info!(region = label, samples = sample_count, "poller stopped");
            })
            .map_err(|e| TelemetryError::spawn_failed(thread_name, e))?;

        Ok(Self { cancel })
    }

    /// Request cancellation; the loop observes it at its next interval
    /// boundary. Fire-and-forget, never blocks.
    pub(crate) fn cancel(&self) {
        self.cancel.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::ScriptedChannel;
    use tokio::time::timeout;

    const TICK: Duration = Duration::from_millis(1);
    const WAIT: Duration = Duration::from_secs(2);

    fn open_gate() -> Arc<StatusCell> {
        Arc::new(StatusCell::new(ConnectionStatus::Connected))
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn delivers_snapshots_in_sampling_order() {
        let channel = Arc::new(ScriptedChannel::with_script("physics", vec![1u32, 2, 3]));
        channel.attach().unwrap();
        let (tx, mut rx) = broadcast::channel(1024);

        let poller = Poller::spawn(channel, TICK, open_gate(), tx, None).unwrap();

        let mut seen = Vec::new();
        while seen.len() < 3 {
            match timeout(WAIT, rx.recv()).await.expect("poller stalled").unwrap() {
                StreamEvent::Snapshot(n) => seen.push(n),
                StreamEvent::Fault(e) => panic!("unexpected fault: {e}"),
            }
        }
        assert_eq!(seen, vec![1, 2, 3]);
        poller.cancel();
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn closed_gate_suppresses_notifications() {
        let channel = Arc::new(ScriptedChannel::with_script("physics", vec![1u32, 2, 3]));
        channel.attach().unwrap();
        let gate = Arc::new(StatusCell::new(ConnectionStatus::Disconnected));
        let (tx, mut rx) = broadcast::channel(16);

        let poller = Poller::spawn(channel, TICK, gate, tx, None).unwrap();

        // Several intervals pass; the gate keeps every sample suppressed
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(matches!(rx.try_recv(), Err(broadcast::error::TryRecvError::Empty)));
        poller.cancel();
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn read_failure_faults_once_then_terminates() {
        // Unattached channel: first read fails, loop must fault and stop
        let channel = Arc::new(ScriptedChannel::<u32>::with_script("graphics", vec![]));
        let (tx, mut rx) = broadcast::channel(16);

        let _poller = Poller::spawn(channel.clone(), TICK, open_gate(), tx, None).unwrap();

        match timeout(WAIT, rx.recv()).await.expect("no fault surfaced").unwrap() {
            StreamEvent::Fault(e) => {
                assert!(matches!(*e, TelemetryError::NotConnected));
            }
            StreamEvent::Snapshot(_) => panic!("expected a fault"),
        }
        // Stream closes after the fault: sender dropped by the exiting thread
        assert!(matches!(
            timeout(WAIT, rx.recv()).await.expect("stream did not close"),
            Err(broadcast::error::RecvError::Closed)
        ));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn cancellation_stops_sampling_and_detaches() {
        let channel = Arc::new(ScriptedChannel::with_script("static info", vec![7u32]));
        channel.attach().unwrap();
        let (tx, mut rx) = broadcast::channel(64);

        let poller = Poller::spawn(channel.clone(), TICK, open_gate(), tx, None).unwrap();

        // Let it run, then cancel and wait out the interval boundary
        let _ = timeout(WAIT, rx.recv()).await.expect("poller never produced");
        poller.cancel();
        tokio::time::sleep(Duration::from_millis(100)).await;

        // Loop exited: channel detached and sender dropped
        assert!(!channel.is_attached());
        loop {
            match rx.try_recv() {
                Ok(_) | Err(broadcast::error::TryRecvError::Lagged(_)) => continue,
                Err(broadcast::error::TryRecvError::Closed) => break,
                Err(broadcast::error::TryRecvError::Empty) => {
                    panic!("stream still open after cancellation")
                }
            }
        }
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn configured_interval_governs_sampling_rate() {
        const WINDOW: Duration = Duration::from_millis(300);
        const FAST: Duration = Duration::from_millis(5);
        const SLOW: Duration = Duration::from_millis(25);

        let fast_channel = Arc::new(ScriptedChannel::with_script("physics", vec![0u32]));
        let slow_channel = Arc::new(ScriptedChannel::with_script("graphics", vec![0u32]));
        fast_channel.attach().unwrap();
        slow_channel.attach().unwrap();
        let (fast_tx, mut fast_rx) = broadcast::channel(1024);
        let (slow_tx, mut slow_rx) = broadcast::channel(1024);

        let fast = Poller::spawn(fast_channel, FAST, open_gate(), fast_tx, None).unwrap();
        let slow = Poller::spawn(slow_channel, SLOW, open_gate(), slow_tx, None).unwrap();
        tokio::time::sleep(WINDOW).await;
        fast.cancel();
        slow.cancel();

        let drain = |rx: &mut broadcast::Receiver<StreamEvent<u32>>| {
            let mut n = 0usize;
            while let Ok(event) = rx.try_recv() {
                if matches!(event, StreamEvent::Snapshot(_)) {
                    n += 1;
                }
            }
            n
        };
        let fast_count = drain(&mut fast_rx);
        let slow_count = drain(&mut slow_rx);

        // One sample per interval plus the immediate first read. Sleep only
        // ever oversleeps, so counts may run under the ideal (61 and 13 here)
        // but never far over it; a loop that ignored its interval would blow
        // the upper bound or collapse the ratio.
        assert!(
            (15..=75).contains(&fast_count),
            "5ms poller produced {fast_count} samples in 300ms"
        );
        assert!(
            (4..=15).contains(&slow_count),
            "25ms poller produced {slow_count} samples in 300ms"
        );
        assert!(
            fast_count >= 2 * slow_count,
            "sample counts did not scale with interval: {fast_count} vs {slow_count}"
        );
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn observer_runs_before_broadcast() {
        let channel = Arc::new(ScriptedChannel::with_script("graphics", vec![5u32]));
        channel.attach().unwrap();
        let (tx, mut rx) = broadcast::channel(16);
        let (seen_tx, mut seen_rx) = tokio::sync::mpsc::unbounded_channel();

        let observer: Observer<u32> = Box::new(move |n| {
            let _ = seen_tx.send(*n);
        });
        let poller =
            Poller::spawn(channel, TICK, open_gate(), tx, Some(observer)).unwrap();

        let observed = timeout(WAIT, seen_rx.recv()).await.expect("observer never ran").unwrap();
        assert_eq!(observed, 5);
        match timeout(WAIT, rx.recv()).await.unwrap().unwrap() {
            StreamEvent::Snapshot(n) => assert_eq!(n, 5),
            StreamEvent::Fault(e) => panic!("unexpected fault: {e}"),
        }
        poller.cancel();
    }
}
