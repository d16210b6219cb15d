// src/gps/nmea.rs
//! NMEA 0183 sentence generation
//!
//! Every generator is pure: it formats the fields it is given, checksums the
//! payload and returns a `$...*CS\r\n` line. Nothing is validated; time and
//! date strings go through untouched and out-of-range numbers are formatted
//! as given.

use super::coordinate::GeoCoordinate;
use super::data::{GllStatus, SatelliteObservation, SentenceKind};

/// Talker prefix for every generated sentence
pub const TALKER_ID: &str = "GP";

/// PRN slots in a GSA sentence
pub const GSA_PRN_SLOTS: usize = 12;

/// Satellite groups in a GSV sentence
pub const GSV_SATELLITE_SLOTS: usize = 4;

/// XOR of every payload byte (the text between `$` and `*`)
pub fn checksum(payload: &str) -> u8 {
    payload.bytes().fold(0u8, |acc, b| acc ^ b)
}

/// Render a checksum as uppercase hex.
///
/// Not zero-padded: values below 0x10 come out as a single digit, which is
/// what the receiving device has always been sent.
pub fn checksum_hex(value: u8) -> String {
    format!("{:X}", value)
}

/// Join the fields behind the talker/mnemonic, checksum and terminate
fn assemble(kind: SentenceKind, fields: &[String]) -> String {
    let mut payload = format!("{}{}", TALKER_ID, kind.mnemonic());
    for field in fields {
        payload.push(',');
        payload.push_str(field);
    }

    let cs = checksum(&payload);
    format!("${}*{}\r\n", payload, checksum_hex(cs))
}

fn one_decimal(value: f64) -> String {
    format!("{:.1}", value)
}

/// Four fields: latitude, N/S, longitude, E/W
fn position_fields(lat: f64, lon: f64) -> [String; 4] {
    let lat = GeoCoordinate::latitude(lat).to_nmea();
    let lon = GeoCoordinate::longitude(lon).to_nmea();
    [
        lat.to_string(),
        lat.hemisphere_field(),
        lon.to_string(),
        lon.hemisphere_field(),
    ]
}

/// Generate a GPRMC (recommended minimum) sentence
pub fn generate_gprmc(
    utc_time: &str,
    lat: f64,
    lon: f64,
    speed_knots: f64,
    course: f64,
    date: &str,
    mag_var: f64,
) -> String {
    let mut fields = vec![utc_time.to_string(), "A".to_string()];
    fields.extend(position_fields(lat, lon));
    fields.extend([
        one_decimal(speed_knots),
        one_decimal(course),
        date.to_string(),
        one_decimal(mag_var),
        "A".to_string(),
    ]);
    assemble(SentenceKind::Rmc, &fields)
}

/// Generate the course/speed sentence, sent as `$GPGVT`
pub fn generate_gpvtg(
    timestamp: &str,
    course_true: f64,
    course_magnetic: f64,
    speed_knots: f64,
) -> String {
    let fields = [
        timestamp.to_string(),
        one_decimal(course_true),
        one_decimal(course_magnetic),
        one_decimal(speed_knots),
    ];
    assemble(SentenceKind::Vtg, &fields)
}

/// Generate a GPGGA (fix data) sentence
#[allow(clippy::too_many_arguments)]
pub fn generate_gpgga(
    utc_time: &str,
    lat: f64,
    lon: f64,
    fix_quality: u8,
    num_sats: u8,
    hdop: f64,
    altitude: f64,
    geoidal_sep: f64,
) -> String {
    let mut fields = vec![utc_time.to_string()];
    fields.extend(position_fields(lat, lon));
    fields.extend([
        fix_quality.to_string(),
        num_sats.to_string(),
        one_decimal(hdop),
        one_decimal(altitude),
        "M".to_string(),
        one_decimal(geoidal_sep),
        "M".to_string(),
        // DGPS age, DGPS station id, trailing empty field
        String::new(),
        String::new(),
        String::new(),
    ]);
    assemble(SentenceKind::Gga, &fields)
}

/// Generate a GPGSA (DOP and active satellites) sentence.
///
/// Only the first 12 PRNs are used; unused slots stay empty.
pub fn generate_gpgsa(mode: char, fix_type: u8, prn_list: &[u8], pdop: f64) -> String {
    let mut fields = vec![mode.to_string(), fix_type.to_string()];
    fields.extend(
        (0..GSA_PRN_SLOTS).map(|i| prn_list.get(i).map(|prn| prn.to_string()).unwrap_or_default()),
    );
    // HDOP and VDOP are left empty
    fields.extend([one_decimal(pdop), String::new(), String::new()]);
    assemble(SentenceKind::Gsa, &fields)
}

/// Generate a GPGSV (satellites in view) sentence.
///
/// Always four satellite groups of four sub-fields; extra observations are
/// dropped, missing ones render as empty sub-fields.
pub fn generate_gpgsv(
    total_msgs: u8,
    msg_num: u8,
    total_svs: u8,
    satellite_data: &[SatelliteObservation],
) -> String {
    let mut fields = vec![total_msgs.to_string(), msg_num.to_string(), total_svs.to_string()];
    for slot in 0..GSV_SATELLITE_SLOTS {
        match satellite_data.get(slot) {
            Some(sat) => fields.extend([
                sat.prn.to_string(),
                sat.elevation.to_string(),
                sat.azimuth.to_string(),
                sat.snr.to_string(),
            ]),
            None => fields.extend(std::iter::repeat(String::new()).take(4)),
        }
    }
    assemble(SentenceKind::Gsv, &fields)
}

/// Generate a GPGLL (geographic position) sentence
pub fn generate_gpgll(lat: f64, lon: f64, utc_time: &str, status: GllStatus) -> String {
    let mut fields = position_fields(lat, lon).to_vec();
    fields.extend([
        utc_time.to_string(),
        status.status.to_string(),
        status.mode.to_string(),
        String::new(),
    ]);
    assemble(SentenceKind::Gll, &fields)
}
