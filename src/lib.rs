//! Typed access to Assetto Corsa Competizione shared-memory telemetry.
//!
//! Trackside attaches to the three shared-memory regions the game publishes
//! (physics, graphics, static session info) and exposes them two ways:
//! one-shot reads of the current values, and continuous update streams
//! sampled on dedicated per-region polling threads.
//!
//! # Features
//!
//! - **Live Telemetry**: real-time streaming from the game on Windows
//! - **Typed Records**: fixed-layout snapshots decoded per region
//! - **Derived Game Status**: one broadcast per distinct status transition
//! - **Lossy by Design**: sampling at configurable intervals, independent of
//!   the game's own update rate
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use trackside::{AccTelemetry, StreamEvent};
//!
//! #[tokio::main]
//! async fn main() -> trackside::Result<()> {
//!     let telemetry = AccTelemetry::new();
//!     let mut physics = telemetry.subscribe_physics();
//!
//!     telemetry.connect()?;
//!     while let Ok(StreamEvent::Snapshot(snapshot)) = physics.recv().await {
//!         println!("{} km/h, gear {}", snapshot.speed_kmh, snapshot.display_gear());
//!     }
//!     telemetry.stop();
//!     Ok(())
//! }
//! ```
//!
//! Subscribe before calling `connect()`; updates are delivered on the polling
//! threads' context, in strict sampling order per region. Missed samples are
//! not replayed; the game updates the regions faster than most consumers
//! want to sample them.

// Core types and error handling
pub mod brake_bias;
mod error;
pub mod records;
mod status;
#[cfg(any(test, feature = "benchmark"))]
pub mod test_utils;

// Polling and lifecycle
mod channel;
pub mod connection;
pub mod poller;

// Platform-specific modules
#[cfg(windows)]
pub mod windows;

// Core exports
pub use channel::{SharedMemoryChannel, TelemetryChannel};
pub use connection::{AccTelemetry, PollIntervals};
pub use error::{Result, TelemetryError};
pub use poller::StreamEvent;
pub use records::{
    GraphicsSnapshot, PhysicsSnapshot, StaticInfoSnapshot, TelemetryRecord,
};
pub use status::{ConnectionStatus, GameStatus};

// Windows memory exports
#[cfg(windows)]
pub use windows::MappedRegion;
