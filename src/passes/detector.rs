use crate::ephemeris::{EphemerisWindow, SatelliteTrack};
use crate::visibility::{elevation_deg, ground_distance_km, is_visible, slant_range_km, StationLocation};

use super::types::Pass;

/// Scan every satellite track in the window and return all passes, sorted
/// ascending by start time.
///
/// A pass ends at the timestamp of the first sample where visibility is lost,
/// not the last visible instant; duration is therefore overstated by up to
/// one sample interval. This matches the deployed behavior and changing it
/// needs product sign-off.
///
/// A pass still open at the last sample is closed at that sample's timestamp.
/// Such passes touch the window boundary and may continue beyond it; callers
/// should treat them as provisional and re-detect once a wider window is
/// loaded.
pub fn detect_passes(
    window: &EphemerisWindow,
    station: &StationLocation,
    min_elevation_deg: f64,
) -> Vec<Pass> {
    let mut passes = Vec::new();

    for (sat_id, track) in window.tracks() {
        detect_for_track(sat_id, track, station, min_elevation_deg, &mut passes);
    }

    passes.sort_by_key(|p| p.start);
    passes
}

fn detect_for_track(
    sat_id: &str,
    track: &SatelliteTrack,
    station: &StationLocation,
    min_elevation_deg: f64,
    passes: &mut Vec<Pass>,
) {
    let radius_km = track.meta.reception_radius_km;

    let mut on_pass = false;
    let mut pass_start = None;
    let mut min_range = f64::INFINITY;
    let mut max_el = 0.0f64;

    for sample in &track.samples {
        let ground = ground_distance_km(
            station.latitude_deg,
            station.longitude_deg,
            sample.latitude_deg,
            sample.longitude_deg,
        );
        let range = slant_range_km(
            station.latitude_deg,
            station.longitude_deg,
            sample.latitude_deg,
            sample.longitude_deg,
            sample.altitude_km,
        );
        let el = elevation_deg(ground, sample.altitude_km);

        let in_range = is_visible(range, el, radius_km, min_elevation_deg);

        if in_range && !on_pass {
            on_pass = true;
            pass_start = Some(sample.timestamp);
            min_range = range;
            max_el = el;
        } else if in_range && on_pass {
            if range < min_range {
                min_range = range;
            }
            if el > max_el {
                max_el = el;
            }
        } else if !in_range && on_pass {
            // Visibility ended somewhere between the previous sample and this
            // one; the current timestamp marks when it was observed lost.
            on_pass = false;
            passes.push(Pass {
                sat_id: sat_id.to_string(),
                name: track.meta.name.clone(),
                start: pass_start.take().expect("open pass has a start"),
                end: sample.timestamp,
                max_elevation_deg: max_el.round() as i32,
                min_range_km: min_range.round() as i32,
            });
            min_range = f64::INFINITY;
            max_el = 0.0;
        }
    }

    // Window boundary close for a still-open pass. A pass opening on the very
    // last sample has no duration to report and is dropped; it will reappear
    // when a wider window is loaded.
    if on_pass {
        if let (Some(start), Some(last)) = (pass_start, track.samples.last()) {
            if last.timestamp <= start {
                return;
            }
            passes.push(Pass {
                sat_id: sat_id.to_string(),
                name: track.meta.name.clone(),
                start,
                end: last.timestamp,
                max_elevation_deg: max_el.round() as i32,
                min_range_km: min_range.round() as i32,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ephemeris::{PositionSample, SatelliteMeta, SatelliteTrack};
    use chrono::{DateTime, TimeZone, Utc};
    use std::collections::BTreeMap;

    const STATION: StationLocation = StationLocation {
        latitude_deg: 50.0,
        longitude_deg: 10.0,
    };

    fn at(ts: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(ts, 0).unwrap()
    }

    /// Build a track whose samples alternate between overhead (visible) and
    /// the far side of the planet (not visible) according to `pattern`.
    fn window_from_pattern(pattern: &[bool]) -> EphemerisWindow {
        let samples = pattern
            .iter()
            .enumerate()
            .map(|(i, visible)| PositionSample {
                timestamp: at(i as i64 * 60),
                latitude_deg: if *visible { 50.0 } else { -50.0 },
                longitude_deg: if *visible { 10.0 } else { -170.0 },
                altitude_km: 600.0,
            })
            .collect();

        let mut sats = BTreeMap::new();
        sats.insert(
            "25544".to_string(),
            SatelliteTrack {
                meta: SatelliteMeta {
                    name: "ISS".into(),
                    reception_radius_km: 1500.0,
                },
                samples,
            },
        );
        EphemerisWindow::new(sats).unwrap()
    }

    #[test]
    fn single_pass_with_exclusive_end() {
        // Visible at t=60..=180, lost at t=240.
        let window = window_from_pattern(&[false, true, true, true, false, false]);
        let passes = detect_passes(&window, &STATION, 5.0);
        assert_eq!(passes.len(), 1);
        let p = &passes[0];
        assert_eq!(p.start, at(60));
        assert_eq!(p.end, at(240));
        assert_eq!(p.sat_id, "25544");
        assert_eq!(p.name, "ISS");
        assert_eq!(p.max_elevation_deg, 90);
        assert_eq!(p.min_range_km, 600);
        assert!(p.start < p.end);
    }

    #[test]
    fn pass_open_at_window_end_closes_at_last_sample() {
        let window = window_from_pattern(&[false, false, true, true]);
        let passes = detect_passes(&window, &STATION, 5.0);
        assert_eq!(passes.len(), 1);
        assert_eq!(passes[0].start, at(120));
        assert_eq!(passes[0].end, at(180));
    }

    #[test]
    fn continuously_visible_window_yields_one_full_span_pass() {
        let window = window_from_pattern(&[true, true, true, true, true]);
        let passes = detect_passes(&window, &STATION, 5.0);
        assert_eq!(passes.len(), 1);
        assert_eq!(passes[0].start, at(0));
        assert_eq!(passes[0].end, at(240));
    }

    #[test]
    fn multiple_passes_are_separated() {
        let window = window_from_pattern(&[true, false, true, true, false, true]);
        let passes = detect_passes(&window, &STATION, 5.0);
        // The pass opening on the final sample has no duration and is dropped.
        assert_eq!(passes.len(), 2);
        assert_eq!(passes[0].start, at(0));
        assert_eq!(passes[0].end, at(60));
        assert_eq!(passes[1].start, at(120));
        assert_eq!(passes[1].end, at(240));
        assert!(passes.iter().all(|p| p.start < p.end));
    }

    #[test]
    fn never_visible_yields_no_passes() {
        let window = window_from_pattern(&[false, false, false]);
        assert!(detect_passes(&window, &STATION, 5.0).is_empty());
    }

    #[test]
    fn detection_is_idempotent() {
        let window = window_from_pattern(&[false, true, true, false, true, false]);
        let a = detect_passes(&window, &STATION, 5.0);
        let b = detect_passes(&window, &STATION, 5.0);
        assert_eq!(a, b);
        assert!(a.iter().all(|p| p.start < p.end));
    }

    #[test]
    fn result_is_sorted_across_satellites() {
        let mk_track = |offset: i64| SatelliteTrack {
            meta: SatelliteMeta {
                name: format!("SAT{offset}"),
                reception_radius_km: 1500.0,
            },
            samples: vec![
                PositionSample {
                    timestamp: at(offset),
                    latitude_deg: 50.0,
                    longitude_deg: 10.0,
                    altitude_km: 600.0,
                },
                PositionSample {
                    timestamp: at(offset + 60),
                    latitude_deg: -50.0,
                    longitude_deg: -170.0,
                    altitude_km: 600.0,
                },
            ],
        };

        let mut sats = BTreeMap::new();
        sats.insert("zulu".to_string(), mk_track(0));
        sats.insert("alpha".to_string(), mk_track(600));
        let window = EphemerisWindow::new(sats).unwrap();

        let passes = detect_passes(&window, &STATION, 5.0);
        assert_eq!(passes.len(), 2);
        assert!(passes[0].start < passes[1].start);
        assert_eq!(passes[0].sat_id, "zulu");
    }
}
