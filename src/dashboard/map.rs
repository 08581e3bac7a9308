//! Regional map markers.
//!
//! One marker per registered location. A location analysed during this
//! session shows its latest recorded probability; the rest show a simulated
//! value drawn from the session RNG. Marker colors use the map's own
//! three-color scheme, which is coarser than the four threat levels.

use rand::{Rng, RngCore};
use serde::Serialize;

use crate::history::ThreatHistory;
use crate::locations::{LocationRegistry, MAP_CENTER};

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MarkerColor {
    Red,
    Orange,
    Green,
}

impl MarkerColor {
    /// `>= 75` red, `>= 50` orange, else green.
    pub fn for_threat(threat: f64) -> Self {
        if threat >= 75.0 {
            MarkerColor::Red
        } else if threat >= 50.0 {
            MarkerColor::Orange
        } else {
            MarkerColor::Green
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MapMarker {
    pub key: &'static str,
    pub lat: f64,
    pub lon: f64,
    pub tooltip: &'static str,
    pub popup: String,
    pub threat: f64,
    pub color: MarkerColor,
    /// True when `threat` comes from a recorded analysis.
    pub recorded: bool,
}

/// Map payload: center plus markers.
#[derive(Debug, Clone, Serialize)]
pub struct MapView {
    pub center: (f64, f64),
    pub zoom: u8,
    pub markers: Vec<MapMarker>,
}

impl MapView {
    pub fn new(markers: Vec<MapMarker>) -> Self {
        Self {
            center: MAP_CENTER,
            zoom: 6,
            markers,
        }
    }
}

pub fn build_markers(
    registry: &LocationRegistry,
    history: &ThreatHistory,
    rng: &mut dyn RngCore,
) -> Vec<MapMarker> {
    registry
        .iter()
        .map(|loc| {
            let (threat, recorded) = match history.latest_for(loc.name) {
                Some(entry) => (entry.probability, true),
                None => (rng.gen_range(0..100) as f64, false),
            };
            MapMarker {
                key: loc.key,
                lat: loc.lat,
                lon: loc.lon,
                tooltip: loc.name,
                popup: format!("{}<br>Threat: {}%", loc.name, threat),
                threat,
                color: MarkerColor::for_threat(threat),
                recorded,
            }
        })
        .collect()
}
