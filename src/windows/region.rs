//! Read-only view over one named shared-memory region.

use std::ptr::NonNull;
use tracing::{debug, trace};
use windows::Win32::Foundation::{CloseHandle, ERROR_FILE_NOT_FOUND, HANDLE};
use windows::Win32::System::Memory::{
    FILE_MAP_READ, MEMORY_BASIC_INFORMATION, MEMORY_MAPPED_VIEW_ADDRESS, MapViewOfFile,
    OpenFileMappingW, UnmapViewOfFile, VirtualQuery,
};
use windows::core::PCWSTR;

use crate::{Result, TelemetryError};

/// A mapped view over one named shared-memory region, read-only.
///
/// The handle is owned exclusively; dropping it unmaps the view and closes
/// the mapping. The source region is never written.
pub struct MappedRegion {
    mapping: HANDLE,
    base: NonNull<u8>,
    len: usize,
}

impl MappedRegion {
    /// Open an existing named region for reading.
    ///
    /// Fails with [`TelemetryError::RegionNotFound`] when the region does not
    /// currently exist, which means the game is not running or has not
    /// published it yet. No retry happens here; retry policy belongs to the
    /// caller.
    pub fn open(name: &str) -> Result<Self> {
        trace!(region = name, "opening shared memory region");

        let mapping = unsafe {
            let wide_name = wide_string(name);
            OpenFileMappingW(FILE_MAP_READ.0, false, PCWSTR::from_raw(wide_name.as_ptr()))
                .map_err(|e| {
                    if e.code() == ERROR_FILE_NOT_FOUND.to_hresult() {
                        TelemetryError::region_not_found(name)
                    } else {
                        TelemetryError::windows_api_error("OpenFileMappingW", e)
                    }
                })?
        };

        let base = unsafe {
            let ptr = MapViewOfFile(mapping, FILE_MAP_READ, 0, 0, 0);
            match NonNull::new(ptr.Value as *mut u8) {
                Some(base) => base,
                None => {
                    let win_err = windows::core::Error::from_thread();
                    let _ = CloseHandle(mapping);
                    return Err(TelemetryError::windows_api_error("MapViewOfFile", win_err));
                }
            }
        };

        // The mapping call above asked for the whole region; query the view
        // for its actual length so decoders can detect truncation.
        let len = unsafe {
            let mut info = MEMORY_BASIC_INFORMATION::default();
            let written = VirtualQuery(
                Some(base.as_ptr() as *const _),
                &mut info,
                std::mem::size_of::<MEMORY_BASIC_INFORMATION>(),
            );
            if written == 0 {
                let win_err = windows::core::Error::from_thread();
                let addr = MEMORY_MAPPED_VIEW_ADDRESS { Value: base.as_ptr() as *mut _ };
                let _ = UnmapViewOfFile(addr);
                let _ = CloseHandle(mapping);
                return Err(TelemetryError::windows_api_error("VirtualQuery", win_err));
            }
            info.RegionSize
        };

        debug!(region = name, len, "mapped shared memory region");
        Ok(Self { mapping, base, len })
    }

    /// The current contents of the view.
    ///
    /// The game writes the region concurrently; callers take an instantaneous
    /// snapshot by decoding a fixed-size prefix of this slice.
    pub fn bytes(&self) -> &[u8] {
        // SAFETY: base points at a live read-only mapping of self.len bytes,
        // valid until Drop unmaps it.
        unsafe { std::slice::from_raw_parts(self.base.as_ptr(), self.len) }
    }

    /// View length in bytes.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl Drop for MappedRegion {
    fn drop(&mut self) {
        unsafe {
            let addr = MEMORY_MAPPED_VIEW_ADDRESS { Value: self.base.as_ptr() as *mut _ };
            let _ = UnmapViewOfFile(addr);
            let _ = CloseHandle(self.mapping);
        }
    }
}

// SAFETY: MappedRegion only holds a mapping handle and a pointer into a
// read-only view; both are safe to move and share across threads.
unsafe impl Send for MappedRegion {}
unsafe impl Sync for MappedRegion {}

/// Convert string to null-terminated wide string for Windows APIs
fn wide_string(s: &str) -> Vec<u16> {
    use std::ffi::OsStr;
    use std::os::windows::ffi::OsStrExt;
    OsStr::new(s).encode_wide().chain(std::iter::once(0)).collect()
}
