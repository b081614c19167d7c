//! Geographic coordinate type and the haversine distance.
//!
//! Coordinates are kept in `f64`: indoor POIs sit a few metres apart, and the
//! planner compares sums of many short distances, so single precision would
//! turn near-ties into coin flips.

/// A WGS-84 coordinate in decimal degrees.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    /// Mean Earth radius in kilometres.
    pub const EARTH_RADIUS_KM: f64 = 6_371.0;

    #[inline]
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Haversine great-circle distance in metres.
    ///
    /// Symmetric and non-negative; `p.distance_m(p) == 0.0`.  Ends with a
    /// square-then-root step that can move the last bit; stored baselines
    /// depend on it.
    pub fn distance_m(self, other: GeoPoint) -> f64 {
        let d_lat = (other.lat - self.lat).to_radians();
        let d_lon = (other.lon - self.lon).to_radians();

        let a = (d_lat / 2.0).sin() * (d_lat / 2.0).sin()
            + self.lat.to_radians().cos()
                * other.lat.to_radians().cos()
                * (d_lon / 2.0).sin()
                * (d_lon / 2.0).sin();

        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
        let metres = Self::EARTH_RADIUS_KM * c * 1000.0;

        metres.powi(2).sqrt()
    }
}

impl std::fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lat, self.lon)
    }
}
