//! Synthetic patient records
//!
//! This module provides the patient record type and the generator that fills
//! a dataset with bounded random vitals. Generation runs only on the
//! coordinator; workers see records exclusively through the group's scatter.
//!
//! # Generation bounds
//!
//! - Height: (1.5, 2.5] meters
//! - Weight: (50, 150] kilograms
//! - Heart rate: [60, 100] beats per minute
//!
//! Consumers must not rely on these bounds. BMI computation validates only
//! what it needs (positive height and weight) so a dataset from another
//! source is handled without re-generating.

use rand::Rng;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;
use std::time::{SystemTime, UNIX_EPOCH};

/// Default number of records per generated dataset
pub const NUM_PATIENTS: usize = 50;

/// Minimum generated heart rate (bpm)
pub const MIN_HEART_RATE: u32 = 60;
/// Maximum generated heart rate (bpm)
pub const MAX_HEART_RATE: u32 = 100;

/// One synthetic patient record
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PatientRecord {
    /// Height in meters
    pub height_m: f64,
    /// Weight in kilograms
    pub weight_kg: f64,
    /// Heart rate in beats per minute
    pub heart_rate: u32,
}

impl PatientRecord {
    /// Body mass index, or `None` when the record cannot be measured
    ///
    /// Only non-positive height or weight disqualifies a record; values
    /// outside the generation bounds are still computed.
    pub fn bmi(&self) -> Option<f64> {
        if self.height_m <= 0.0 || self.weight_kg <= 0.0 {
            return None;
        }
        Some(self.weight_kg / (self.height_m * self.height_m))
    }
}

/// Generator for synthetic patient datasets
///
/// Uses the xoshiro256++ PRNG seeded once at construction. The same seed
/// reproduces the same dataset, which the scenario tests rely on.
pub struct PatientGenerator {
    rng: Xoshiro256PlusPlus,
}

impl PatientGenerator {
    /// Create a generator seeded from wall-clock time
    pub fn new() -> Self {
        let seed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0);
        Self::with_seed(seed)
    }

    /// Create a generator with a specific seed
    ///
    /// Useful for reproducible runs and tests.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: Xoshiro256PlusPlus::seed_from_u64(seed),
        }
    }

    /// Fill a fresh dataset of `count` records
    ///
    /// Each call replaces the previous dataset wholesale; records are never
    /// mutated in place.
    pub fn generate(&mut self, count: usize) -> Vec<PatientRecord> {
        (0..count)
            .map(|_| PatientRecord {
                // gen::<f64>() is [0, 1), so subtracting keeps the lower
                // bound open and the upper bound reachable.
                height_m: 2.5 - self.rng.gen::<f64>(),
                weight_kg: 150.0 - self.rng.gen::<f64>() * 100.0,
                heart_rate: self.rng.gen_range(MIN_HEART_RATE..=MAX_HEART_RATE),
            })
            .collect()
    }
}

impl Default for PatientGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_count() {
        let mut gen = PatientGenerator::with_seed(42);
        assert_eq!(gen.generate(NUM_PATIENTS).len(), NUM_PATIENTS);
        assert_eq!(gen.generate(0).len(), 0);
    }

    #[test]
    fn test_generate_bounds() {
        for seed in [0, 1, 42, 12345, u64::MAX] {
            let mut gen = PatientGenerator::with_seed(seed);
            for record in gen.generate(1000) {
                assert!(
                    record.height_m > 1.5 && record.height_m <= 2.5,
                    "height {} out of bounds",
                    record.height_m
                );
                assert!(
                    record.weight_kg > 50.0 && record.weight_kg <= 150.0,
                    "weight {} out of bounds",
                    record.weight_kg
                );
                assert!(record.heart_rate >= MIN_HEART_RATE);
                assert!(record.heart_rate <= MAX_HEART_RATE);
            }
        }
    }

    #[test]
    fn test_generate_seeded_deterministic() {
        let mut gen1 = PatientGenerator::with_seed(12345);
        let mut gen2 = PatientGenerator::with_seed(12345);

        // Same seed should produce the same dataset
        assert_eq!(gen1.generate(NUM_PATIENTS), gen2.generate(NUM_PATIENTS));
    }

    #[test]
    fn test_bmi_formula() {
        let record = PatientRecord {
            height_m: 1.8,
            weight_kg: 75.0,
            heart_rate: 70,
        };
        let bmi = record.bmi().unwrap();
        assert!((bmi - 75.0 / (1.8 * 1.8)).abs() < 1e-9);
    }

    #[test]
    fn test_bmi_rejects_non_positive_dimensions() {
        let mut record = PatientRecord {
            height_m: 0.0,
            weight_kg: 75.0,
            heart_rate: 70,
        };
        assert_eq!(record.bmi(), None);

        record.height_m = 1.8;
        record.weight_kg = -1.0;
        assert_eq!(record.bmi(), None);
    }

    #[test]
    fn test_bmi_outside_generation_bounds() {
        // Consumption-time validation must not assume the generator's bounds
        let record = PatientRecord {
            height_m: 0.4,
            weight_kg: 300.0,
            heart_rate: 180,
        };
        assert!(record.bmi().is_some());
    }
}
