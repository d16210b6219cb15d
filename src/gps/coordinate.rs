// src/gps/coordinate.rs
//! Decimal degrees to NMEA degrees/minutes conversion

use std::fmt;

/// Which axis a coordinate lies on; decides padding and hemisphere letters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Latitude,
    Longitude,
}

impl Axis {
    fn degree_width(&self) -> usize {
        match self {
            Axis::Latitude => 2,
            Axis::Longitude => 3,
        }
    }

    fn hemispheres(&self) -> (char, char) {
        match self {
            Axis::Latitude => ('N', 'S'),
            Axis::Longitude => ('E', 'W'),
        }
    }
}

/// A signed decimal-degree value on one axis
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoCoordinate {
    pub value: f64,
    pub axis: Axis,
}

impl GeoCoordinate {
    pub fn latitude(value: f64) -> Self {
        Self {
            value,
            axis: Axis::Latitude,
        }
    }

    pub fn longitude(value: f64) -> Self {
        Self {
            value,
            axis: Axis::Longitude,
        }
    }

    /// Split into unsigned degrees, minutes and hemisphere letter.
    ///
    /// The sign only survives in the hemisphere letter; zero counts as positive.
    pub fn to_nmea(&self) -> NmeaCoordinate {
        let magnitude = self.value.abs();
        let degrees = magnitude.floor();
        let minutes = (magnitude - degrees) * 60.0;
        let (positive, negative) = self.axis.hemispheres();

        NmeaCoordinate {
            degrees: degrees as u32,
            minutes,
            hemisphere: if self.value >= 0.0 { positive } else { negative },
            axis: self.axis,
        }
    }
}

/// Degrees/minutes form ready to be written into a sentence
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NmeaCoordinate {
    pub degrees: u32,
    pub minutes: f64,
    pub hemisphere: char,
    pub axis: Axis,
}

impl NmeaCoordinate {
    /// Rebuild signed decimal degrees
    pub fn to_decimal(&self) -> f64 {
        let value = self.degrees as f64 + self.minutes / 60.0;
        match self.hemisphere {
            'S' | 'W' => -value,
            _ => value,
        }
    }

    pub fn hemisphere_field(&self) -> String {
        self.hemisphere.to_string()
    }
}

/// `DDMM.MMMM` for latitude, `DDDMM.MMMM` for longitude
impl fmt::Display for NmeaCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut degrees = self.degrees;
        let mut minutes = format!("{:07.4}", self.minutes);

        // 59.99996 rounds up to "60.0000"; carry into the degrees instead
        if minutes.starts_with("60") {
            degrees += 1;
            minutes = format!("{:07.4}", 0.0);
        }

        write!(f, "{:0width$}{}", degrees, minutes, width = self.axis.degree_width())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(field: &str, hemisphere: &str) -> f64 {
        let raw: f64 = field.parse().unwrap();
        let degrees = (raw / 100.0).floor();
        let value = degrees + (raw - degrees * 100.0) / 60.0;
        if hemisphere == "S" || hemisphere == "W" {
            -value
        } else {
            value
        }
    }

    #[test]
    fn test_positive_latitude() {
        let coord = GeoCoordinate::latitude(51.22521374836571).to_nmea();
        assert_eq!(coord.degrees, 51);
        assert_eq!(coord.hemisphere, 'N');
        assert_eq!(coord.to_string(), "5113.5128");
    }

    #[test]
    fn test_positive_longitude() {
        let coord = GeoCoordinate::longitude(33.19309502652848).to_nmea();
        assert_eq!(coord.degrees, 33);
        assert_eq!(coord.hemisphere, 'E');
        assert_eq!(coord.to_string(), "03311.5857");
    }

    #[test]
    fn test_negative_latitude() {
        let coord = GeoCoordinate::latitude(-10.5).to_nmea();
        assert_eq!(coord.degrees, 10);
        assert!((coord.minutes - 30.0).abs() < 1e-9);
        assert_eq!(coord.hemisphere, 'S');
        assert_eq!(coord.to_string(), "1030.0000");
    }

    #[test]
    fn test_negative_longitude() {
        let coord = GeoCoordinate::longitude(-122.25).to_nmea();
        assert_eq!(coord.hemisphere, 'W');
        assert_eq!(coord.to_string(), "12215.0000");
    }

    #[test]
    fn test_zero_is_positive() {
        assert_eq!(GeoCoordinate::latitude(0.0).to_nmea().hemisphere, 'N');
        assert_eq!(GeoCoordinate::longitude(0.0).to_nmea().hemisphere, 'E');
        assert_eq!(GeoCoordinate::longitude(0.0).to_nmea().to_string(), "00000.0000");
    }

    #[test]
    fn test_small_minutes_are_padded() {
        // 5.5 minutes must not collapse into the degree digits
        let coord = GeoCoordinate::latitude(51.0 + 5.5 / 60.0).to_nmea();
        assert_eq!(coord.to_string(), "5105.5000");
    }

    #[test]
    fn test_minutes_carry_into_degrees() {
        let coord = GeoCoordinate::latitude(44.999_999_9).to_nmea();
        assert_eq!(coord.to_string(), "4500.0000");
    }

    #[test]
    fn test_round_trip_within_precision() {
        // minutes carry 4 decimals, so 0.00005 minutes is the worst-case error
        let tolerance = 0.000_05 / 60.0 + 1e-10;

        let mut lat = -90.0;
        while lat <= 90.0 {
            let coord = GeoCoordinate::latitude(lat).to_nmea();
            let back = decode(&coord.to_string(), &coord.hemisphere_field());
            assert!((back - lat).abs() <= tolerance, "lat {} came back as {}", lat, back);
            assert!((coord.to_decimal() - lat).abs() < 1e-9);
            lat += 0.731_137;
        }

        let mut lon = -180.0;
        while lon <= 180.0 {
            let coord = GeoCoordinate::longitude(lon).to_nmea();
            let back = decode(&coord.to_string(), &coord.hemisphere_field());
            assert!((back - lon).abs() <= tolerance, "lon {} came back as {}", lon, back);
            lon += 1.377_713;
        }
    }
}
