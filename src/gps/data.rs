// src/gps/data.rs
//! Navigation data structures fed into the sentence encoder

use crate::error::{RelayError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The sentence kinds this relay knows how to generate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE", try_from = "String")]
pub enum SentenceKind {
    Rmc, // Recommended minimum position/velocity
    Vtg, // Course and speed over ground
    Gga, // Fix data
    Gsa, // DOP and active satellites
    Gsv, // Satellites in view
    Gll, // Geographic position
}

impl SentenceKind {
    pub fn all() -> &'static [SentenceKind] {
        &[
            SentenceKind::Rmc,
            SentenceKind::Vtg,
            SentenceKind::Gga,
            SentenceKind::Gsa,
            SentenceKind::Gsv,
            SentenceKind::Gll,
        ]
    }

    /// Three-letter mnemonic as written on the wire.
    ///
    /// VTG goes out as `GVT`; the downstream device expects that spelling.
    pub fn mnemonic(&self) -> &'static str {
        match self {
            SentenceKind::Rmc => "RMC",
            SentenceKind::Vtg => "GVT",
            SentenceKind::Gga => "GGA",
            SentenceKind::Gsa => "GSA",
            SentenceKind::Gsv => "GSV",
            SentenceKind::Gll => "GLL",
        }
    }
}

impl fmt::Display for SentenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SentenceKind::Rmc => "RMC",
            SentenceKind::Vtg => "VTG",
            SentenceKind::Gga => "GGA",
            SentenceKind::Gsa => "GSA",
            SentenceKind::Gsv => "GSV",
            SentenceKind::Gll => "GLL",
        };
        f.write_str(name)
    }
}

impl FromStr for SentenceKind {
    type Err = RelayError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_uppercase().as_str() {
            "RMC" | "GPRMC" => Ok(SentenceKind::Rmc),
            "VTG" | "GPVTG" | "GVT" | "GPGVT" => Ok(SentenceKind::Vtg),
            "GGA" | "GPGGA" => Ok(SentenceKind::Gga),
            "GSA" | "GPGSA" => Ok(SentenceKind::Gsa),
            "GSV" | "GPGSV" => Ok(SentenceKind::Gsv),
            "GLL" | "GPGLL" => Ok(SentenceKind::Gll),
            other => Err(RelayError::Config(format!("Unknown sentence kind: {}", other))),
        }
    }
}

impl TryFrom<String> for SentenceKind {
    type Error = RelayError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

/// One satellite entry of a GSV sentence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SatelliteObservation {
    pub prn: u8,
    pub elevation: u8, // degrees
    pub azimuth: u16,  // degrees
    pub snr: u8,       // dB-Hz
}

impl SatelliteObservation {
    pub fn new(prn: u8, elevation: u8, azimuth: u16, snr: u8) -> Self {
        Self {
            prn,
            elevation,
            azimuth,
            snr,
        }
    }
}

/// Status and mode letters closing a GLL sentence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GllStatus {
    pub status: char, // A=active, V=void
    pub mode: char,   // A=autonomous, M=manual, ...
}

impl Default for GllStatus {
    fn default() -> Self {
        Self {
            status: 'A',
            mode: 'A',
        }
    }
}

/// One entry of the telemetry schedule
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TelemetrySample {
    pub latitude: f64,
    pub longitude: f64,
    pub speed_knots: f64,
    pub course: f64,
}

impl TelemetrySample {
    pub fn new(latitude: f64, longitude: f64, speed_knots: f64, course: f64) -> Self {
        Self {
            latitude,
            longitude,
            speed_knots,
            course,
        }
    }
}

/// Fix quality figures that stay constant across a schedule.
///
/// Samples only carry position and motion; everything else a sentence needs
/// comes from here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FixProfile {
    pub magnetic_variation: f64,
    pub fix_quality: u8,
    pub satellites_used: u8,
    pub hdop: f64,
    pub pdop: f64,
    pub altitude: f64,
    pub geoidal_separation: f64,
    pub selection_mode: char,
    pub fix_type: u8,
    pub active_prns: Vec<u8>,
    pub satellites_in_view: Vec<SatelliteObservation>,
}

impl Default for FixProfile {
    fn default() -> Self {
        Self {
            magnetic_variation: 13.4,
            fix_quality: 1,
            satellites_used: 8,
            hdop: 1.2,
            pdop: 1.8,
            altitude: 150.0,
            geoidal_separation: -34.0,
            selection_mode: 'A',
            fix_type: 3,
            active_prns: vec![1, 2, 3],
            satellites_in_view: vec![
                SatelliteObservation::new(1, 45, 120, 40),
                SatelliteObservation::new(2, 30, 200, 35),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vtg_mnemonic_quirk() {
        assert_eq!(SentenceKind::Vtg.mnemonic(), "GVT");
        assert_eq!(SentenceKind::Vtg.to_string(), "VTG");
    }

    #[test]
    fn test_sentence_kind_from_str() {
        assert_eq!("rmc".parse::<SentenceKind>().unwrap(), SentenceKind::Rmc);
        assert_eq!("GPGVT".parse::<SentenceKind>().unwrap(), SentenceKind::Vtg);
        assert_eq!(" gsv ".parse::<SentenceKind>().unwrap(), SentenceKind::Gsv);
        assert!("ZDA".parse::<SentenceKind>().is_err());
    }

    #[test]
    fn test_sentence_kind_serde() {
        let json = serde_json::to_string(&SentenceKind::Gga).unwrap();
        assert_eq!(json, "\"GGA\"");
        let kind: SentenceKind = serde_json::from_str("\"GLL\"").unwrap();
        assert_eq!(kind, SentenceKind::Gll);

        let kinds: Vec<SentenceKind> = serde_json::from_str(r#"["gga", "gpgvt"]"#).unwrap();
        assert_eq!(kinds, vec![SentenceKind::Gga, SentenceKind::Vtg]);
        assert!(serde_json::from_str::<SentenceKind>("\"zda\"").is_err());
    }

    #[test]
    fn test_gll_status_default() {
        let status = GllStatus::default();
        assert_eq!(status.status, 'A');
        assert_eq!(status.mode, 'A');
    }
}
