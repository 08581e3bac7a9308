//! Sensor source abstraction.
//!
//! Readings reach the scorer from one of two places: manual controls
//! (sliders on the live analysis page, flags on the CLI) or the random
//! generator used by batch runs. Both sit behind [`SensorSource`] so the
//! batch workflow does not care which one it is driving.

pub mod manual;
pub mod random;

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::locations::LocationRecord;
use crate::SensorReading;

pub use manual::ManualSensors;
pub use random::RandomSensors;

/// Produces one reading per location visited.
pub trait SensorSource {
    fn name(&self) -> &str;
    fn read(&mut self, location: &LocationRecord) -> SensorReading;
}

/// Seeded RNG when a seed is configured, entropy otherwise.
pub fn session_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => {
            log::info!("[SENSORS] Using fixed RNG seed {}", seed);
            StdRng::seed_from_u64(seed)
        }
        None => StdRng::from_entropy(),
    }
}
