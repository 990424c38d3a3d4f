//! Graphics record (`Local\acpmf_graphics`), refreshed once per rendered frame.

use super::{TelemetryRecord, widestr};
use crate::GameStatus;

/// One decoded sample of the graphics region.
///
/// Numeric fields come first so the record has no interior padding; the
/// formatted lap-time strings sit at the tail. Lap times are also available
/// as integer milliseconds (`i_*` fields), which is what timing code should
/// use.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GraphicsSnapshot {
    /// Incremented by the game on every graphics step.
    pub packet_id: i32,
    /// Raw game status; see [`GraphicsSnapshot::game_status`].
    pub status: i32,
    /// 0 = unknown, 1 = practice, 2 = qualify, 3 = race, 4 = hotlap, ...
    pub session_type: i32,
    pub completed_laps: i32,
    /// Race position, 1-based.
    pub position: i32,
    /// Current lap time in milliseconds.
    pub i_current_time: i32,
    /// Last lap time in milliseconds.
    pub i_last_time: i32,
    /// Best lap time in milliseconds.
    pub i_best_time: i32,
    /// Seconds left in the session, counting down.
    pub session_time_left: f32,
    /// Metres travelled since the session started.
    pub distance_traveled: f32,
    /// 1 while the car is in the pit lane.
    pub is_in_pit: i32,
    /// 0-based sector index of the car's current position.
    pub current_sector_index: i32,
    /// Last sector time in milliseconds.
    pub last_sector_time: i32,
    pub number_of_laps: i32,
    current_time: [u16; 15],
    last_time: [u16; 15],
    best_time: [u16; 15],
}

impl TelemetryRecord for GraphicsSnapshot {
    const REGION_NAME: &'static str = "Local\\acpmf_graphics";
    const LABEL: &'static str = "graphics";
}

impl GraphicsSnapshot {
    /// Typed view of the raw `status` field.
    pub fn game_status(&self) -> GameStatus {
        GameStatus::from_raw(self.status)
    }

    /// Current lap time as formatted by the game, e.g. `1:43.123`.
    pub fn current_time(&self) -> String {
        widestr(&self.current_time)
    }

    /// Last lap time as formatted by the game.
    pub fn last_time(&self) -> String {
        widestr(&self.last_time)
    }

    /// Best lap time as formatted by the game.
    pub fn best_time(&self) -> String {
        widestr(&self.best_time)
    }
}
