use crate::geo::rhumb::nm_to_meters;
use crate::geo::{find_position, GeoPosition};
use crate::leeway::SearchObjectProfile;
use crate::prelude::SarResult;
use crate::sar_interface::{hours_between, DriftResult, SarHeader, WeatherSample};
use chrono::{DateTime, Utc};
use log::{debug, warn};

/// Which leeway tracks the integrator lays out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriftTracks {
    /// Single downwind track (Rapid Response).
    Downwind,
    /// Downwind plus the two divergence limits (Datum Point).
    Divergent,
}

/// Hours each weather sample is in force between LKP and CSS. Timestamps
/// are clamped into `[lkp_time, css_time]`.
pub fn valid_durations(
    weather: &[WeatherSample],
    lkp_time: DateTime<Utc>,
    css_time: DateTime<Utc>,
) -> Vec<f64> {
    let clamp = |time: DateTime<Utc>| time.max(lkp_time).min(css_time);
    let last = weather.len().saturating_sub(1);
    weather
        .iter()
        .enumerate()
        .scan(lkp_time, |start, (index, sample)| {
            let hours = if index == last {
                hours_between(*start, css_time)
            } else {
                let current = clamp(sample.timestamp);
                let next = clamp(weather[index + 1].timestamp);
                *start = next;
                hours_between(current, next)
            };
            if hours < 0.0 {
                warn!(
                    "weather sample at {} has negative validity {:.3} h, clamped to zero",
                    sample.timestamp, hours
                );
            }
            Some(hours.max(0.0))
        })
        .collect()
}

fn displace(origin: GeoPosition, heading_deg: f64, distance_nm: f64) -> GeoPosition {
    if distance_nm == 0.0 {
        origin
    } else {
        find_position(origin, heading_deg, nm_to_meters(distance_nm))
    }
}

struct DriftLeg {
    current: GeoPosition,
    downwind: GeoPosition,
    spread: Option<(GeoPosition, GeoPosition)>,
}

fn advance(
    origin: GeoPosition,
    sample: &WeatherSample,
    hours: f64,
    profile: &SearchObjectProfile,
    tracks: DriftTracks,
) -> DriftLeg {
    let current = displace(origin, sample.twc_heading_deg, sample.twc_speed_knots * hours);
    let leeway_nm = profile.leeway_speed(sample.leeway_speed_knots) * hours;
    let downwind = displace(current, sample.downwind_heading_deg, leeway_nm);
    let spread = match tracks {
        DriftTracks::Downwind => None,
        DriftTracks::Divergent => Some((
            displace(
                current,
                sample.downwind_heading_deg - profile.divergence_deg,
                leeway_nm,
            ),
            displace(
                current,
                sample.downwind_heading_deg + profile.divergence_deg,
                leeway_nm,
            ),
        )),
    };
    debug!(
        "drift leg {:.3} h: current {} leeway {:.3} nm -> {}",
        hours, current, leeway_nm, downwind
    );
    DriftLeg {
        current,
        downwind,
        spread,
    }
}

/// Chains current and leeway displacement over every weather sample,
/// starting at the LKP. Each leg starts from the previous downwind position.
pub fn integrate(header: &SarHeader, tracks: DriftTracks) -> SarResult<DriftResult> {
    let profile = header.search_object()?;
    let valid_hours = valid_durations(&header.weather, header.lkp_time, header.css_time);

    let legs: Vec<DriftLeg> = header
        .weather
        .iter()
        .zip(valid_hours.iter())
        .scan(header.lkp, |origin, (sample, &hours)| {
            let leg = advance(*origin, sample, hours, &profile, tracks);
            *origin = leg.downwind;
            Some(leg)
        })
        .collect();

    let (min_positions, max_positions): (Vec<GeoPosition>, Vec<GeoPosition>) =
        legs.iter().filter_map(|leg| leg.spread).unzip();

    Ok(DriftResult {
        current_positions: legs.iter().map(|leg| leg.current).collect(),
        downwind_positions: legs.iter().map(|leg| leg.downwind).collect(),
        min_positions,
        max_positions,
        valid_hours,
    })
}
