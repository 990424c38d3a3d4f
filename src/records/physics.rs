//! Physics record (`Local\acpmf_physics`), refreshed at the physics tick.

use super::TelemetryRecord;

/// One decoded sample of the physics region.
///
/// Four-element wheel arrays are ordered front-left, front-right, rear-left,
/// rear-right. `brake_bias` is the raw in-game value; apply
/// [`corrected`](crate::brake_bias::corrected) with the car model from the
/// static-info record to get the value shown on the dash.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhysicsSnapshot {
    /// Incremented by the game on every physics step.
    pub packet_id: i32,
    /// Throttle input, 0.0..=1.0.
    pub gas: f32,
    /// Brake input, 0.0..=1.0.
    pub brake: f32,
    /// Fuel on board in litres.
    pub fuel: f32,
    /// 0 = reverse, 1 = neutral, 2 = first, ...
    pub gear: i32,
    pub rpm: i32,
    /// Steering input, -1.0..=1.0.
    pub steer_angle: f32,
    pub speed_kmh: f32,
    /// Velocity vector in world coordinates, m/s.
    pub velocity: [f32; 3],
    /// Acceleration in G, lateral / vertical / longitudinal.
    pub g_force: [f32; 3],
    pub wheel_slip: [f32; 4],
    /// Tyre pressure in psi.
    pub wheel_pressure: [f32; 4],
    /// Tyre core temperature in Celsius.
    pub tyre_core_temp: [f32; 4],
    pub brake_temp: [f32; 4],
    /// Front brake bias, 0.0..=1.0, raw (uncorrected) value.
    pub brake_bias: f32,
    /// TC intervention, 0.0..=1.0.
    pub tc: f32,
    /// ABS intervention, 0.0..=1.0.
    pub abs: f32,
    pub air_temp: f32,
    pub road_temp: f32,
    /// 1 while the engine is running.
    pub is_engine_running: i32,
}

impl TelemetryRecord for PhysicsSnapshot {
    const REGION_NAME: &'static str = "Local\\acpmf_physics";
    const LABEL: &'static str = "physics";
}

impl PhysicsSnapshot {
    /// Gear as displayed on the dash: `R`, `N`, `1`...
    pub fn display_gear(&self) -> String {
        match self.gear {
            0 => "R".to_string(),
            1 => "N".to_string(),
            n => (n - 1).to_string(),
        }
    }
}
