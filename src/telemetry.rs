// src/telemetry.rs
//! Telemetry schedule driving the transmit loop

use crate::{
    error::{RelayError, Result},
    gps::{nmea, FixProfile, GllStatus, SentenceKind, TelemetrySample},
};
use chrono::{DateTime, Utc};

/// Iterations run by the built-in schedule
pub const DEFAULT_ITERATIONS: usize = 16;

/// Ordered sample pool plus the number of transmit iterations.
///
/// Iteration `i` uses sample `i % pool.len()`, so a schedule longer than the
/// pool wraps around to the start.
#[derive(Debug, Clone, PartialEq)]
pub struct TelemetrySchedule {
    samples: Vec<TelemetrySample>,
    iterations: usize,
}

impl TelemetrySchedule {
    pub fn new(samples: Vec<TelemetrySample>, iterations: usize) -> Result<Self> {
        if samples.is_empty() {
            return Err(RelayError::Config(
                "Telemetry schedule needs at least one sample".to_string(),
            ));
        }
        Ok(Self { samples, iterations })
    }

    /// Ten samples heading north-east out of 51.2252N 33.1931E
    pub fn default_track() -> Self {
        let samples = (0..10)
            .map(|i| {
                let step = i as f64;
                TelemetrySample::new(
                    51.22521374836571 + step * 0.0012,
                    33.19309502652848 + step * 0.0017,
                    10.2 + step * 0.4,
                    23.5 + step * 1.5,
                )
            })
            .collect();

        Self {
            samples,
            iterations: DEFAULT_ITERATIONS,
        }
    }

    pub fn samples(&self) -> &[TelemetrySample] {
        &self.samples
    }

    pub fn iterations(&self) -> usize {
        self.iterations
    }

    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    /// Pool index used by a given iteration
    pub fn index_at(&self, iteration: usize) -> usize {
        iteration % self.samples.len()
    }

    pub fn sample_at(&self, iteration: usize) -> &TelemetrySample {
        &self.samples[self.index_at(iteration)]
    }

    /// Every sample in transmit order
    pub fn iter(&self) -> impl Iterator<Item = &TelemetrySample> + '_ {
        (0..self.iterations).map(move |i| self.sample_at(i))
    }
}

impl Default for TelemetrySchedule {
    fn default() -> Self {
        Self::default_track()
    }
}

/// `HHMMSS.SSS`
pub fn format_time(at: &DateTime<Utc>) -> String {
    at.format("%H%M%S%.3f").to_string()
}

/// `DDMMYY`
pub fn format_date(at: &DateTime<Utc>) -> String {
    at.format("%d%m%y").to_string()
}

/// Encode one sample into the configured sentence kinds, in order.
///
/// GSV may produce several sentences when more than four satellites are in
/// view; all other kinds produce exactly one.
pub fn render_sample(
    sample: &TelemetrySample,
    kinds: &[SentenceKind],
    profile: &FixProfile,
    at: &DateTime<Utc>,
) -> Vec<String> {
    let time = format_time(at);
    let date = format_date(at);
    let mut sentences = Vec::with_capacity(kinds.len());

    for kind in kinds {
        match kind {
            SentenceKind::Rmc => sentences.push(nmea::generate_gprmc(
                &time,
                sample.latitude,
                sample.longitude,
                sample.speed_knots,
                sample.course,
                &date,
                profile.magnetic_variation,
            )),
            SentenceKind::Vtg => sentences.push(nmea::generate_gpvtg(
                &time,
                sample.course,
                sample.course - profile.magnetic_variation,
                sample.speed_knots,
            )),
            SentenceKind::Gga => sentences.push(nmea::generate_gpgga(
                &time,
                sample.latitude,
                sample.longitude,
                profile.fix_quality,
                profile.satellites_used,
                profile.hdop,
                profile.altitude,
                profile.geoidal_separation,
            )),
            SentenceKind::Gsa => sentences.push(nmea::generate_gpgsa(
                profile.selection_mode,
                profile.fix_type,
                &profile.active_prns,
                profile.pdop,
            )),
            SentenceKind::Gsv => sentences.extend(render_gsv(profile)),
            SentenceKind::Gll => sentences.push(nmea::generate_gpgll(
                sample.latitude,
                sample.longitude,
                &time,
                GllStatus::default(),
            )),
        }
    }

    sentences
}

fn render_gsv(profile: &FixProfile) -> Vec<String> {
    let in_view = &profile.satellites_in_view;
    let total_svs = in_view.len().min(u8::MAX as usize) as u8;

    if in_view.is_empty() {
        return vec![nmea::generate_gpgsv(1, 1, 0, &[])];
    }

    let chunks: Vec<_> = in_view.chunks(nmea::GSV_SATELLITE_SLOTS).collect();
    let total_msgs = chunks.len().min(u8::MAX as usize) as u8;
    chunks
        .iter()
        .enumerate()
        .map(|(i, chunk)| nmea::generate_gpgsv(total_msgs, (i + 1) as u8, total_svs, chunk))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gps::SatelliteObservation;
    use chrono::TimeZone;

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 7, 20, 10, 23, 40).unwrap()
    }

    #[test]
    fn test_empty_pool_rejected() {
        assert!(TelemetrySchedule::new(Vec::new(), 4).is_err());
    }

    #[test]
    fn test_wraparound_order() {
        let schedule = TelemetrySchedule::default_track();
        assert_eq!(schedule.samples().len(), 10);
        assert_eq!(schedule.iterations(), 16);

        let order: Vec<usize> = (0..schedule.iterations()).map(|i| schedule.index_at(i)).collect();
        assert_eq!(order, vec![0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 0, 1, 2, 3, 4, 5]);
        assert_eq!(schedule.iter().count(), 16);
        assert_eq!(schedule.sample_at(12), &schedule.samples()[2]);
    }

    #[test]
    fn test_default_track_starts_at_reference_point() {
        let schedule = TelemetrySchedule::default_track();
        let first = schedule.samples()[0];
        assert_eq!(first.latitude, 51.22521374836571);
        assert_eq!(first.longitude, 33.19309502652848);
        assert_eq!(first.speed_knots, 10.2);
        assert_eq!(first.course, 23.5);
    }

    #[test]
    fn test_time_and_date_format() {
        let at = fixed_time();
        assert_eq!(format_time(&at), "102340.000");
        assert_eq!(format_date(&at), "200724");
    }

    #[test]
    fn test_render_matches_reference_sentences() {
        let sample = TelemetrySchedule::default_track().samples()[0];
        let sentences = render_sample(
            &sample,
            SentenceKind::all(),
            &FixProfile::default(),
            &fixed_time(),
        );

        assert_eq!(sentences.len(), 6);
        assert!(sentences[0]
            .starts_with("$GPRMC,102340.000,A,5113.5128,N,03311.5857,E,10.2,23.5,200724,13.4,A*"));
        assert!(sentences[1].starts_with("$GPGVT,102340.000,23.5,10.1,10.2*"));
        assert!(sentences[2]
            .starts_with("$GPGGA,102340.000,5113.5128,N,03311.5857,E,1,8,1.2,150.0,M,-34.0,M,,,*"));
        assert!(sentences[3].starts_with("$GPGSA,A,3,1,2,3,,,,,,,,,,1.8,,*"));
        assert!(sentences[4].starts_with("$GPGSV,1,1,2,1,45,120,40,2,30,200,35,,,,,,,,*"));
        assert!(sentences[5].starts_with("$GPGLL,5113.5128,N,03311.5857,E,102340.000,A,A,*"));
    }

    #[test]
    fn test_render_only_requested_kinds() {
        let sample = TelemetrySample::new(-10.5, 20.0, 5.0, 90.0);
        let sentences = render_sample(
            &sample,
            &[SentenceKind::Gll, SentenceKind::Rmc],
            &FixProfile::default(),
            &fixed_time(),
        );
        assert_eq!(sentences.len(), 2);
        assert!(sentences[0].starts_with("$GPGLL,1030.0000,S,"));
        assert!(sentences[1].starts_with("$GPRMC,"));
    }

    #[test]
    fn test_gsv_splits_into_messages() {
        let profile = FixProfile {
            satellites_in_view: (1..=6)
                .map(|prn| SatelliteObservation::new(prn, 20, 90, 30))
                .collect(),
            ..FixProfile::default()
        };
        let sentences = render_sample(
            &TelemetrySample::new(0.0, 0.0, 0.0, 0.0),
            &[SentenceKind::Gsv],
            &profile,
            &fixed_time(),
        );
        assert_eq!(sentences.len(), 2);
        assert!(sentences[0].starts_with("$GPGSV,2,1,6,1,20,90,30,"));
        assert!(sentences[1].starts_with("$GPGSV,2,2,6,5,20,90,30,6,20,90,30,,,,,,,,*"));
    }

    #[test]
    fn test_gsv_with_nothing_in_view() {
        let profile = FixProfile {
            satellites_in_view: Vec::new(),
            ..FixProfile::default()
        };
        let sentences = render_sample(
            &TelemetrySample::new(0.0, 0.0, 0.0, 0.0),
            &[SentenceKind::Gsv],
            &profile,
            &fixed_time(),
        );
        assert_eq!(sentences.len(), 1);
        assert!(sentences[0].starts_with("$GPGSV,1,1,0,,,,,,,,,,,,,,,,*"));
    }
}
