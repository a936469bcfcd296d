//! Campus geofence evaluation.
//!
//! Decides whether a coordinate falls inside one of the configured campus
//! zones using great-circle distance. Zone order matters: the first zone
//! whose radius contains the coordinate wins, with no distance-based
//! tie-break across zones.

use serde::Serialize;

/// Mean Earth radius in meters, as used by the haversine formula.
const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// A named circular campus zone.
#[derive(Debug, Clone, Serialize)]
pub struct Zone {
    pub name: String,
    pub lat: f64,
    pub lng: f64,
    pub radius_m: f64,
}

impl Zone {
    pub fn new(name: impl Into<String>, lat: f64, lng: f64, radius_m: f64) -> Self {
        Self {
            name: name.into(),
            lat,
            lng,
            radius_m,
        }
    }
}

/// The default campus zones.
pub fn campus_zones() -> Vec<Zone> {
    vec![
        Zone::new("Gedung Dewi Sartika UPNVJ", -6.31628, 106.79463, 70.0),
        Zone::new("Fakultas Ilmu Komputer UPNVJ", -6.31605, 106.79496, 70.0),
    ]
}

/// Outcome of a geofence check.
#[derive(Debug, Clone, PartialEq)]
pub enum GeofenceOutcome {
    /// Inside the named zone.
    Zone(String),
    /// The allow-all override is active: eligible, but no specific zone.
    OverrideAllowed,
    /// Outside every configured zone.
    Outside,
}

/// Geofence evaluator over a fixed zone list.
///
/// The `allow_all` override is deliberately an explicit constructor argument
/// rather than ambient state; when active it takes precedence over geometry.
#[derive(Debug, Clone)]
pub struct Geofence {
    zones: Vec<Zone>,
    allow_all: bool,
}

impl Geofence {
    pub fn new(zones: Vec<Zone>, allow_all: bool) -> Self {
        Self { zones, allow_all }
    }

    /// Evaluator over the default campus zones, with the override taken from
    /// configuration.
    pub fn from_config() -> Self {
        Self::new(campus_zones(), util::config::allow_all_locations())
    }

    /// Locates a coordinate: first zone (in configured order) whose distance
    /// from center is within its radius wins.
    pub fn locate(&self, lat: f64, lng: f64) -> GeofenceOutcome {
        if self.allow_all {
            return GeofenceOutcome::OverrideAllowed;
        }

        for zone in &self.zones {
            let distance = haversine_distance_m(lat, lng, zone.lat, zone.lng);
            if distance <= zone.radius_m {
                return GeofenceOutcome::Zone(zone.name.clone());
            }
        }
        GeofenceOutcome::Outside
    }
}

/// Great-circle distance between two coordinates in meters.
pub fn haversine_distance_m(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lng = (lng2 - lng1).to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_M * c
}
