//! ACC shared memory access
//!
//! This module provides direct access to the shared-memory regions Assetto
//! Corsa Competizione publishes (`Local\acpmf_physics`, `Local\acpmf_graphics`,
//! `Local\acpmf_static`).
//!
//! # Design Philosophy
//!
//! - **Direct Memory Access**: map the game's regions read-only without
//!   abstraction layers between the view and the decoder
//! - **Layout Alignment**: the record layouts are the game's contract; this
//!   module never validates or negotiates them
//! - **Minimal API Surface**: open, read, drop

mod region;

pub use region::MappedRegion;
