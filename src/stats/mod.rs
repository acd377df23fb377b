//! Dataset-wide aggregate metrics
//!
//! The coordinator owns the full dataset, so today's reduction is local. The
//! partial sum is mergeable regardless, so a partitioned variant can have
//! each rank reduce its shard and merge the partials without changing the
//! interface.

use crate::patient::PatientRecord;

/// Mergeable partial sum of heart rates
///
/// # Usage
///
/// 1. `record()` each local record (or build with `from_records`)
/// 2. `merge()` partials from other ranks, if any
/// 3. `mean()` for the final value
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HeartRateSum {
    total_bpm: u64,
    records: usize,
}

impl HeartRateSum {
    /// Create an empty sum
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the partial sum for a slice of records
    pub fn from_records(records: &[PatientRecord]) -> Self {
        let mut sum = Self::new();
        for record in records {
            sum.record(record);
        }
        sum
    }

    /// Fold one record into the sum
    pub fn record(&mut self, record: &PatientRecord) {
        self.total_bpm += u64::from(record.heart_rate);
        self.records += 1;
    }

    /// Fold another rank's partial sum into this one
    pub fn merge(&mut self, other: &HeartRateSum) {
        self.total_bpm += other.total_bpm;
        self.records += other.records;
    }

    /// Number of records folded in so far
    pub fn len(&self) -> usize {
        self.records
    }

    /// Whether any records have been folded in
    pub fn is_empty(&self) -> bool {
        self.records == 0
    }

    /// Arithmetic mean, or `None` when no records have been recorded
    ///
    /// The dispatcher's generated-data guard keeps the `None` case
    /// unreachable in the interactive loop.
    pub fn mean(&self) -> Option<f64> {
        if self.records == 0 {
            return None;
        }
        Some(self.total_bpm as f64 / self.records as f64)
    }
}

/// Average heart rate across a whole dataset
pub fn average_heart_rate(records: &[PatientRecord]) -> Option<f64> {
    HeartRateSum::from_records(records).mean()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patient::{PatientGenerator, MAX_HEART_RATE, MIN_HEART_RATE, NUM_PATIENTS};

    fn record(heart_rate: u32) -> PatientRecord {
        PatientRecord {
            height_m: 1.8,
            weight_kg: 80.0,
            heart_rate,
        }
    }

    #[test]
    fn test_empty_sum_has_no_mean() {
        assert_eq!(HeartRateSum::new().mean(), None);
        assert_eq!(average_heart_rate(&[]), None);
    }

    #[test]
    fn test_mean_exact() {
        let records = [record(60), record(70), record(80)];
        let avg = average_heart_rate(&records).unwrap();
        assert!((avg - 70.0).abs() < 1e-9);
    }

    #[test]
    fn test_generated_average_within_heart_rate_range() {
        for seed in [0, 7, 99, 4242] {
            let mut gen = PatientGenerator::with_seed(seed);
            let dataset = gen.generate(NUM_PATIENTS);
            let avg = average_heart_rate(&dataset).unwrap();
            assert!(avg >= f64::from(MIN_HEART_RATE));
            assert!(avg <= f64::from(MAX_HEART_RATE));
        }
    }

    #[test]
    fn test_merged_partials_match_full_reduction() {
        let mut gen = PatientGenerator::with_seed(1);
        let dataset = gen.generate(NUM_PATIENTS);

        // Reduce each shard separately, then merge
        let mut merged = HeartRateSum::new();
        for shard in dataset.chunks(10) {
            merged.merge(&HeartRateSum::from_records(shard));
        }

        assert_eq!(merged.len(), dataset.len());
        assert_eq!(merged.mean(), average_heart_rate(&dataset));
    }
}
