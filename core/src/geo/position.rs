use crate::prelude::{SarError, SarResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// WGS84 latitude/longitude in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPosition {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPosition {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Rejects non-finite or out-of-range coordinates.
    pub fn validate(&self, label: &str) -> SarResult<()> {
        if !self.latitude.is_finite() || !self.longitude.is_finite() {
            return Err(SarError::invalid(format!("{} is not a finite position", label)));
        }
        if self.latitude.abs() > 90.0 {
            return Err(SarError::invalid(format!(
                "{} latitude {} outside [-90, 90]",
                label, self.latitude
            )));
        }
        if self.longitude.abs() > 180.0 {
            return Err(SarError::invalid(format!(
                "{} longitude {} outside [-180, 180]",
                label, self.longitude
            )));
        }
        Ok(())
    }
}

impl fmt::Display for GeoPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ns = if self.latitude >= 0.0 { 'N' } else { 'S' };
        let ew = if self.longitude >= 0.0 { 'E' } else { 'W' };
        let lat = self.latitude.abs();
        let lon = self.longitude.abs();
        write!(
            f,
            "{:02}°{:06.3}'{} {:03}°{:06.3}'{}",
            lat.trunc() as u32,
            lat.fract() * 60.0,
            ns,
            lon.trunc() as u32,
            lon.fract() * 60.0,
            ew
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_rejects_out_of_range_latitude() {
        assert!(GeoPosition::new(91.0, 0.0).validate("lkp").is_err());
        assert!(GeoPosition::new(f64::NAN, 0.0).validate("lkp").is_err());
        assert!(GeoPosition::new(56.0, 12.0).validate("lkp").is_ok());
    }

    #[test]
    fn display_uses_degrees_and_minutes() {
        let text = GeoPosition::new(56.5, -12.25).to_string();
        assert_eq!(text, "56°30.000'N 012°15.000'W");
    }
}
