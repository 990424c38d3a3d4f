//! Shared test helpers.
//!
//! [`ScriptedChannel`] is the deterministic stand-in for a live
//! [`SharedMemoryChannel`](crate::SharedMemoryChannel): it serves a scripted
//! sequence of snapshots instead of mapping OS memory, so polling and
//! lifecycle behavior can be verified without the game and without wall-clock
//! assertions.

#![cfg(any(test, feature = "benchmark"))]

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::channel::TelemetryChannel;
use crate::records::TelemetryRecord;
use crate::{Result, TelemetryError};

/// Deterministic channel double.
///
/// Serves scripted snapshots in order; once the script is exhausted it keeps
/// returning the last snapshot (a live region also re-reads the same record
/// until the game writes a new one). Reading while unattached fails with
/// `NotConnected`, exactly like the live channel.
pub struct ScriptedChannel<T> {
    label: &'static str,
    missing: bool,
    attached: AtomicBool,
    script: Mutex<VecDeque<T>>,
    last: Mutex<Option<T>>,
}

impl<T: Clone + Send + 'static> ScriptedChannel<T> {
    /// Channel that attaches successfully and serves `script` in order.
    pub fn with_script(label: &'static str, script: Vec<T>) -> Self {
        Self {
            label,
            missing: false,
            attached: AtomicBool::new(false),
            script: Mutex::new(script.into()),
            last: Mutex::new(None),
        }
    }

    /// Channel whose region does not exist: every attach fails `RegionNotFound`.
    pub fn missing(label: &'static str) -> Self {
        Self {
            label,
            missing: true,
            attached: AtomicBool::new(false),
            script: Mutex::new(VecDeque::new()),
            last: Mutex::new(None),
        }
    }

    pub fn is_attached(&self) -> bool {
        self.attached.load(Ordering::SeqCst)
    }

    /// Append more snapshots to the script.
    pub fn push(&self, snapshot: T) {
        self.script.lock().unwrap_or_else(|e| e.into_inner()).push_back(snapshot);
    }
}

impl<T: Clone + Send + Sync + 'static> TelemetryChannel for ScriptedChannel<T> {
    type Snapshot = T;

    fn label(&self) -> &'static str {
        self.label
    }

    fn attach(&self) -> Result<()> {
        if self.missing {
            return Err(TelemetryError::region_not_found(self.label));
        }
        if self.attached.swap(true, Ordering::SeqCst) {
            return Err(TelemetryError::already_attached(self.label));
        }
        Ok(())
    }

    fn read_snapshot(&self) -> Result<T> {
        if !self.is_attached() {
            return Err(TelemetryError::NotConnected);
        }
        let next = self.script.lock().unwrap_or_else(|e| e.into_inner()).pop_front();
        let mut last = self.last.lock().unwrap_or_else(|e| e.into_inner());
        match next {
            Some(snapshot) => {
                *last = Some(snapshot.clone());
                Ok(snapshot)
            }
            None => last.clone().ok_or_else(|| {
                TelemetryError::decode_failure(self.label, "script exhausted with no snapshot")
            }),
        }
    }

    fn detach(&self) {
        self.attached.store(false, Ordering::SeqCst);
    }
}

/// An all-zero record of any fixed layout, for building scripted snapshots.
pub fn zeroed_record<T: TelemetryRecord>() -> T {
    T::decode(&vec![0u8; T::SIZE]).expect("zero buffer always decodes")
}
