pub mod data;
pub mod graph;
pub mod router;
pub mod spatial;

use serde::{Deserialize, Serialize};

use crate::spatial::sphere::{self, ACCURACY, EARTH_RADIUS};

pub use crate::graph::pathfinder::RouteResult;
pub use crate::router::{RelayRouter, RouteStrategy, Router};

/// Capability set shared by the source, the target and every relay.
///
/// `visible` must be symmetric: the graph builders evaluate it in one
/// direction only and reuse the answer for the reverse pair. `distance`
/// must be symmetric and never negative; the shortest-path search cuts
/// branches as soon as their partial length exceeds the best route found.
pub trait Locate {
    fn name(&self) -> &str;
    fn visible(&self, other: &Self) -> bool;
    fn distance(&self, other: &Self) -> f64;
}

/// Spherical input coordinates in degrees and kilometres above the surface.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct GeoPosition {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub altitude: f64,
}

/// A named location on or above the obstructing sphere.
///
/// The Cartesian position is derived once at construction. Zero-altitude
/// positions are lifted by [`ACCURACY`], so every `Location` lies strictly
/// outside the sphere as long as the altitude is not negative.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct Location {
    name: String,
    geo: GeoPosition,
    #[serde(skip)]
    pos: [f64; 3],
}

impl Location {
    pub fn new(name: impl Into<String>, geo: GeoPosition) -> Self {
        let pos = sphere::to_cartesian(
            geo.latitude,
            geo.longitude,
            geo.altitude,
            EARTH_RADIUS,
            ACCURACY,
        );
        Location {
            name: name.into(),
            geo,
            pos,
        }
    }

    pub fn geo(&self) -> GeoPosition {
        self.geo
    }

    /// Position in the Cartesian frame of [`sphere::to_cartesian`].
    pub fn pos(&self) -> [f64; 3] {
        self.pos
    }
}

impl Locate for Location {
    fn name(&self) -> &str {
        &self.name
    }

    fn visible(&self, other: &Location) -> bool {
        sphere::visible(self.pos, other.pos, EARTH_RADIUS)
    }

    fn distance(&self, other: &Location) -> f64 {
        sphere::distance(self.pos, other.pos)
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    fn at(name: &str, latitude: f64, longitude: f64, altitude: f64) -> Location {
        Location::new(
            name,
            GeoPosition {
                latitude,
                longitude,
                altitude,
            },
        )
    }

    #[test]
    fn location_projects_once_and_measures() {
        let a = at("A", 0.0, 0.0, 100.0);
        let b = at("B", 0.0, 0.0, 300.0);
        assert_eq!(a.name(), "A");
        assert_approx_eq!(a.pos()[0], EARTH_RADIUS + 100.0, 1e-9);
        assert_approx_eq!(a.distance(&b), 200.0, 1e-9);
        assert!(a.visible(&b));
    }

    #[test]
    fn distance_is_symmetric_and_non_negative() {
        let points = [
            at("A", 0.0, 0.0, 0.0),
            at("B", -33.5, 151.2, 550.0),
            at("C", 89.0, -179.0, 20000.0),
        ];
        for a in &points {
            assert_eq!(a.distance(a), 0.0);
            for b in &points {
                assert!(a.distance(b) >= 0.0);
                assert_eq!(a.distance(b), b.distance(a));
            }
        }
    }

    #[test]
    fn antipodal_locations_are_hidden() {
        let a = at("A", 0.0, 0.0, 400.0);
        let b = at("B", 0.0, 180.0, 400.0);
        assert!(!a.visible(&b));
        assert!(!b.visible(&a));
    }
}
