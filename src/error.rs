//! Error types for shared-memory telemetry.
//!
//! All errors implement the `std::error::Error` trait and carry enough
//! context to tell a missing simulation apart from a broken one.
//!
//! ## Error Categories
//!
//! - **Connection Errors**: the shared-memory region is missing, or an
//!   operation was invoked without an active connection
//! - **Decode Errors**: a mapped view could not be decoded into the expected
//!   fixed-size record
//! - **Windows API Errors**: platform-specific mapping failures
//!
//! Connect-time failures are synchronous and caller-visible; steady-state
//! per-sample failures are stream-local and surface as [`StreamEvent::Fault`]
//! events without taking down unrelated regions.
//!
//! [`StreamEvent::Fault`]: crate::poller::StreamEvent::Fault

use thiserror::Error;

#[cfg(windows)]
use windows_core as core;

/// Result type alias for telemetry operations.
pub type Result<T, E = TelemetryError> = std::result::Result<T, E>;

/// Main error type for telemetry operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum TelemetryError {
    #[error(
        "shared memory region '{region}' not found - is Assetto Corsa Competizione running?"
    )]
    RegionNotFound { region: String },

    #[error("not connected to shared memory, call connect() first")]
    NotConnected,

    #[error("telemetry connection is already established")]
    AlreadyConnected,

    #[error("shared memory region '{region}' is already attached")]
    AlreadyAttached { region: String },

    #[error("failed to decode {region} record: {details}")]
    Decode { region: String, details: String },

    #[error("failed to spawn '{name}' polling thread")]
    Spawn {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{feature} is only available on {required_platform}")]
    UnsupportedPlatform { feature: String, required_platform: String },

    #[error("Windows API error: {operation}")]
    #[cfg(windows)]
    WindowsApi {
        operation: String,
        #[source]
        source: core::Error,
    },
}

impl TelemetryError {
    /// Returns whether this error is potentially recoverable through retry.
    ///
    /// A missing region clears itself once the simulation starts publishing;
    /// everything else requires caller intervention.
    pub fn is_retryable(&self) -> bool {
        match self {
            TelemetryError::RegionNotFound { .. } => true,
            TelemetryError::NotConnected => false,
            TelemetryError::AlreadyConnected => false,
            TelemetryError::AlreadyAttached { .. } => false,
            TelemetryError::Decode { .. } => false,
            TelemetryError::Spawn { .. } => false,
            TelemetryError::UnsupportedPlatform { .. } => false,
            #[cfg(windows)]
            TelemetryError::WindowsApi { .. } => true,
        }
    }

    /// Helper constructor for missing-region errors.
    pub fn region_not_found(region: impl Into<String>) -> Self {
        TelemetryError::RegionNotFound { region: region.into() }
    }

    /// Helper constructor for re-attach violations.
    pub fn already_attached(region: impl Into<String>) -> Self {
        TelemetryError::AlreadyAttached { region: region.into() }
    }

    /// Helper constructor for decode failures.
    pub fn decode_failure(region: impl Into<String>, details: impl Into<String>) -> Self {
        TelemetryError::Decode { region: region.into(), details: details.into() }
    }

    /// Helper constructor for thread spawn failures.
    pub fn spawn_failed(name: impl Into<String>, source: std::io::Error) -> Self {
        TelemetryError::Spawn { name: name.into(), source }
    }

    /// Helper constructor for unsupported platform errors.
    pub fn unsupported_platform(
        feature: impl Into<String>,
        required_platform: impl Into<String>,
    ) -> Self {
        TelemetryError::UnsupportedPlatform {
            feature: feature.into(),
            required_platform: required_platform.into(),
        }
    }

    /// Helper constructor for Windows API errors.
    #[cfg(windows)]
    pub fn windows_api_error(operation: impl Into<String>, source: core::Error) -> Self {
        TelemetryError::WindowsApi { operation: operation.into(), source }
    }
}
