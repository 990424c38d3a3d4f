//! Fixed-layout telemetry records published by the simulation.
//!
//! Each region holds one fixed-size, fixed-offset binary structure defined by
//! the publishing process. The layout is a contract, not something this crate
//! negotiates: little-endian fixed-width fields, `#[repr(C)]`, decoded with a
//! length-checked unaligned read.
//!
//! # Known limitation
//!
//! Nothing here validates the schema version. If an incompatible game build
//! publishes a region with a different layout, decoded values are garbage;
//! callers who need to guard against that should check the `sm_version` field
//! of the static-info record against the version they were built for.

mod graphics;
mod physics;
mod static_info;

pub use graphics::GraphicsSnapshot;
pub use physics::PhysicsSnapshot;
pub use static_info::StaticInfoSnapshot;

use crate::{Result, TelemetryError};

/// A fixed-size record decodable from the start of a shared-memory region.
///
/// Implementors are plain `#[repr(C)]` structs in which every bit pattern is
/// a valid value (no enums, no references, no padding-sensitive types).
pub trait TelemetryRecord: Copy + Send + Sync + 'static {
    /// Name of the shared-memory region this record is published in.
    const REGION_NAME: &'static str;

    /// Short label used in logs and error messages.
    const LABEL: &'static str;

    /// Number of bytes read from the start of the region.
    const SIZE: usize = std::mem::size_of::<Self>();

    /// Decode one snapshot from a mapped view.
    ///
    /// Fails with [`TelemetryError::Decode`] if the view is shorter than
    /// [`Self::SIZE`]; never returns a partially-decoded value.
    fn decode(bytes: &[u8]) -> Result<Self> {
        decode_record(bytes)
    }
}

/// Length-checked unaligned read of a `#[repr(C)]` record.
pub(crate) fn decode_record<T: TelemetryRecord>(bytes: &[u8]) -> Result<T> {
    if bytes.len() < T::SIZE {
        return Err(TelemetryError::decode_failure(
            T::LABEL,
            format!("truncated view: {} bytes, record needs {}", bytes.len(), T::SIZE),
        ));
    }
    // SAFETY: the length check above guarantees T::SIZE readable bytes, and
    // TelemetryRecord implementors are repr(C) structs of integer and float
    // fields for which every bit pattern is valid.
    Ok(unsafe { std::ptr::read_unaligned(bytes.as_ptr() as *const T) })
}

/// Convert a fixed UTF-16 buffer to a `String`, stopping at the first NUL.
pub(crate) fn widestr(buf: &[u16]) -> String {
    let end = buf.iter().position(|&c| c == 0).unwrap_or(buf.len());
    String::from_utf16_lossy(&buf[..end])
}
