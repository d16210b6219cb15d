// src/gps/mod.rs
//! Navigation data and NMEA sentence generation

pub mod coordinate;
pub mod data;
pub mod nmea;

pub use coordinate::{Axis, GeoCoordinate, NmeaCoordinate};
pub use data::{FixProfile, GllStatus, SatelliteObservation, SentenceKind, TelemetrySample};
