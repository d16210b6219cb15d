// src/lib.rs
//! NMEA Relay Library
//!
//! Generates NMEA 0183 sentences from a telemetry schedule, writes them to a
//! serial device and relays the device's replies back to the console.

pub mod config;
pub mod display;
pub mod error;
pub mod gps;
pub mod session;
pub mod telemetry;

// Re-export main types for convenience
pub use config::RelayConfig;
pub use error::{RelayError, Result};
pub use gps::{SatelliteObservation, SentenceKind, TelemetrySample};
pub use session::{RelaySession, SessionReport, SessionState, SessionTiming, TransmitPlan};
pub use telemetry::TelemetrySchedule;
