//! Static session record (`Local\acpmf_static`), refreshed on session changes.

use super::{TelemetryRecord, widestr};

/// One decoded sample of the static-info region.
///
/// Values here change only between sessions, which is why the default
/// polling interval for this region is measured in seconds. String fields
/// are fixed UTF-16 buffers exposed through accessor methods.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StaticInfoSnapshot {
    pub number_of_sessions: i32,
    pub num_cars: i32,
    pub sector_count: i32,
    pub max_rpm: i32,
    /// Tank capacity in litres.
    pub max_fuel: f32,
    pub penalties_enabled: i32,
    /// Fuel consumption multiplier.
    pub aid_fuel_rate: f32,
    /// Tyre wear multiplier.
    pub aid_tire_rate: f32,
    pub pit_window_start: i32,
    pub pit_window_end: i32,
    sm_version: [u16; 15],
    ac_version: [u16; 15],
    car_model: [u16; 33],
    track: [u16; 33],
    player_name: [u16; 33],
    player_surname: [u16; 33],
    player_nick: [u16; 33],
}

impl TelemetryRecord for StaticInfoSnapshot {
    const REGION_NAME: &'static str = "Local\\acpmf_static";
    const LABEL: &'static str = "static info";
}

impl StaticInfoSnapshot {
    /// Shared-memory layout version published by the game.
    pub fn sm_version(&self) -> String {
        widestr(&self.sm_version)
    }

    /// Game version.
    pub fn ac_version(&self) -> String {
        widestr(&self.ac_version)
    }

    /// Car model key, e.g. `audi_r8_lms`. This is the key used by the
    /// brake-bias correction table.
    pub fn car_model(&self) -> String {
        widestr(&self.car_model)
    }

    /// Track key, e.g. `monza`.
    pub fn track(&self) -> String {
        widestr(&self.track)
    }

    pub fn player_name(&self) -> String {
        widestr(&self.player_name)
    }

    pub fn player_surname(&self) -> String {
        widestr(&self.player_surname)
    }

    pub fn player_nick(&self) -> String {
        widestr(&self.player_nick)
    }
}
