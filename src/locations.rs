//! # Location Registry
//!
//! The ten fixed analysis targets across the North-East Indian states.
//! Read-only at runtime; order is stable and drives batch runs, map
//! markers and CLI listings.

use serde::Serialize;

use crate::{NetraError, NetraResult};

/// A selectable analysis target.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LocationRecord {
    /// Registry key, e.g. `Kohima_NH29`.
    pub key: &'static str,
    /// Display name.
    pub name: &'static str,
    /// Administrative region.
    pub state: &'static str,
    pub lat: f64,
    pub lon: f64,
}

impl LocationRecord {
    /// "26.1061°N, 91.5859°E"
    pub fn coordinates(&self) -> String {
        format!("{:.4}°N, {:.4}°E", self.lat, self.lon)
    }
}

const NE_LOCATIONS: [LocationRecord; 10] = [
    LocationRecord {
        key: "Guwahati_Airport",
        name: "Guwahati Airport Road, Assam",
        state: "Assam",
        lat: 26.1061,
        lon: 91.5859,
    },
    LocationRecord {
        key: "Imphal_City",
        name: "Imphal City Center, Manipur",
        state: "Manipur",
        lat: 24.8170,
        lon: 93.9368,
    },
    LocationRecord {
        key: "Kohima_NH29",
        name: "Kohima NH-29, Nagaland",
        state: "Nagaland",
        lat: 25.6747,
        lon: 94.1078,
    },
    LocationRecord {
        key: "Shillong_Bypass",
        name: "Shillong Bypass, Meghalaya",
        state: "Meghalaya",
        lat: 25.5788,
        lon: 91.8933,
    },
    LocationRecord {
        key: "Agartala_Station",
        name: "Agartala Station, Tripura",
        state: "Tripura",
        lat: 23.8315,
        lon: 91.2868,
    },
    LocationRecord {
        key: "Itanagar_Zero",
        name: "Itanagar Zero Point, Arunachal Pradesh",
        state: "Arunachal Pradesh",
        lat: 27.0844,
        lon: 93.6053,
    },
    LocationRecord {
        key: "Aizawl_NH54",
        name: "Aizawl NH-54, Mizoram",
        state: "Mizoram",
        lat: 23.7271,
        lon: 92.7176,
    },
    LocationRecord {
        key: "Dimapur_Junction",
        name: "Dimapur Junction, Nagaland",
        state: "Nagaland",
        lat: 25.9097,
        lon: 93.7267,
    },
    LocationRecord {
        key: "Silchar_Medical",
        name: "Silchar Medical Road, Assam",
        state: "Assam",
        lat: 24.8333,
        lon: 92.7789,
    },
    LocationRecord {
        key: "Tinsukia_Border",
        name: "Tinsukia Border, Assam",
        state: "Assam",
        lat: 27.4900,
        lon: 95.3600,
    },
];

/// Map center used by the regional view.
pub const MAP_CENTER: (f64, f64) = (26.0, 92.5);

/// Static lookup over [`LocationRecord`]s.
#[derive(Debug, Clone, Copy)]
pub struct LocationRegistry {
    records: &'static [LocationRecord],
}

impl Default for LocationRegistry {
    fn default() -> Self {
        Self::north_east()
    }
}

impl LocationRegistry {
    /// The built-in North-East registry.
    pub fn north_east() -> Self {
        Self {
            records: &NE_LOCATIONS,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &'static LocationRecord> {
        self.records.iter()
    }

    pub fn all(&self) -> &'static [LocationRecord] {
        self.records
    }

    pub fn get(&self, key: &str) -> Option<&'static LocationRecord> {
        self.records.iter().find(|r| r.key == key)
    }

    /// Like [`get`](Self::get), failing with [`NetraError::UnknownLocation`].
    pub fn lookup(&self, key: &str) -> NetraResult<&'static LocationRecord> {
        self.get(key)
            .ok_or_else(|| NetraError::UnknownLocation(key.to_string()))
    }

    /// Distinct state names, sorted.
    pub fn states(&self) -> Vec<&'static str> {
        let mut states: Vec<&'static str> = self.records.iter().map(|r| r.state).collect();
        states.sort_unstable();
        states.dedup();
        states
    }
}
