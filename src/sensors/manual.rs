//! Manual sensor controls.
//!
//! Mirrors the slider panel of the live analysis page: every channel starts
//! at 50 and the operator moves the ones they care about. Also parses the
//! compact `kind=value,kind=value` form accepted on the command line.

use crate::locations::LocationRecord;
use crate::{NetraError, NetraResult, SensorKind, SensorReading};

use super::SensorSource;

/// Slider default.
pub const DEFAULT_SLIDER_VALUE: f64 = 50.0;

/// Operator-set values. Unset channels keep the slider default.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ManualSensors {
    reading: SensorReading,
}

impl Default for ManualSensors {
    fn default() -> Self {
        Self {
            reading: SensorReading::uniform(DEFAULT_SLIDER_VALUE),
        }
    }
}

impl ManualSensors {
    pub fn new(reading: SensorReading) -> Self {
        Self { reading }
    }

    /// Move one slider.
    pub fn set(&mut self, kind: SensorKind, value: f64) -> &mut Self {
        self.reading = self.reading.with(kind, value);
        self
    }

    /// Apply a `fume=80,metal=72.5` list on top of the current values.
    pub fn apply_spec(&mut self, spec: &str) -> NetraResult<&mut Self> {
        for part in spec.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let (name, value) = part.split_once('=').ok_or_else(|| {
                NetraError::Config(format!("Expected kind=value, got '{}'", part))
            })?;
            let kind: SensorKind = name.parse()?;
            let value: f64 = value.trim().parse().map_err(|_| {
                NetraError::Config(format!("Sensor {} has non-numeric value '{}'", kind, value))
            })?;
            self.set(kind, value);
        }
        Ok(self)
    }

    pub fn reading(&self) -> SensorReading {
        self.reading
    }
}

impl SensorSource for ManualSensors {
    fn name(&self) -> &str {
        "manual"
    }

    /// Manual controls ignore the location; the same values apply everywhere.
    fn read(&mut self, _location: &LocationRecord) -> SensorReading {
        self.reading
    }
}
