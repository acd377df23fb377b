//! Per-shard BMI computation
//!
//! Each member runs this over the shard it received from the group's
//! scatter. Outcomes come back as a lazy, single-pass iterator so the caller
//! decides how to report them; nothing is printed here.
//!
//! # Partition arithmetic
//!
//! Shards are `total / group_size` records each. When the group size does
//! not divide the dataset evenly, the tail records are never scattered and
//! never reported - `dropped_records` makes that count explicit so callers
//! and tests can account for it instead of guessing.

use crate::patient::PatientRecord;

/// Outcome of processing one record of a shard
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BmiOutcome {
    /// A computed BMI, tagged with the 1-based dataset-wide patient number
    Computed { patient: usize, bmi: f64 },
    /// A record that failed validation, tagged with its 0-based index
    /// within the shard
    Invalid { local_index: usize },
}

/// Number of records each rank owns for one distribution round
pub fn shard_len(total: usize, group_size: usize) -> usize {
    total / group_size
}

/// Records at the tail of the dataset that no rank receives
pub fn dropped_records(total: usize, group_size: usize) -> usize {
    total - shard_len(total, group_size) * group_size
}

/// Compute BMI for every record of one rank's shard
///
/// Returns a lazy iterator, one outcome per record in shard order. A record
/// with non-positive height or weight yields a validation failure and
/// processing continues with the next record. The global patient number is
/// `rank * shard_len + local_index + 1`.
pub fn compute_shard_bmi(
    shard: &[PatientRecord],
    rank: usize,
    shard_len: usize,
) -> impl Iterator<Item = BmiOutcome> + '_ {
    shard
        .iter()
        .enumerate()
        .map(move |(local_index, record)| match record.bmi() {
            Some(bmi) => BmiOutcome::Computed {
                patient: rank * shard_len + local_index + 1,
                bmi,
            },
            None => BmiOutcome::Invalid { local_index },
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(height_m: f64, weight_kg: f64) -> PatientRecord {
        PatientRecord {
            height_m,
            weight_kg,
            heart_rate: 70,
        }
    }

    #[test]
    fn test_shard_len_even_split() {
        assert_eq!(shard_len(50, 1), 50);
        assert_eq!(shard_len(50, 5), 10);
        assert_eq!(shard_len(50, 10), 5);
        assert_eq!(shard_len(50, 50), 1);
    }

    #[test]
    fn test_dropped_records() {
        // Even splits drop nothing
        for group_size in [1, 2, 5, 10, 25, 50] {
            assert_eq!(dropped_records(50, group_size), 0);
        }
        // Uneven splits drop the tail
        assert_eq!(dropped_records(50, 7), 1);
        assert_eq!(dropped_records(50, 3), 2);
        // More ranks than records: everything is dropped
        assert_eq!(dropped_records(50, 60), 50);
    }

    #[test]
    fn test_bmi_matches_formula() {
        let shard = [record(1.8, 75.0), record(2.0, 100.0)];
        let outcomes: Vec<_> = compute_shard_bmi(&shard, 0, 2).collect();

        match outcomes[0] {
            BmiOutcome::Computed { patient, bmi } => {
                assert_eq!(patient, 1);
                assert!((bmi - 75.0 / (1.8 * 1.8)).abs() < 1e-9);
            }
            _ => panic!("Expected a computed BMI"),
        }
        match outcomes[1] {
            BmiOutcome::Computed { patient, bmi } => {
                assert_eq!(patient, 2);
                assert!((bmi - 100.0 / (2.0 * 2.0)).abs() < 1e-9);
            }
            _ => panic!("Expected a computed BMI"),
        }
    }

    #[test]
    fn test_global_index_offset_by_rank() {
        let shard = vec![record(1.7, 70.0); 10];
        let patients: Vec<usize> = compute_shard_bmi(&shard, 3, 10)
            .map(|outcome| match outcome {
                BmiOutcome::Computed { patient, .. } => patient,
                _ => panic!("Expected a computed BMI"),
            })
            .collect();

        // Rank 3 with shards of 10 owns patients 31..=40
        assert_eq!(patients, (31..=40).collect::<Vec<_>>());
    }

    #[test]
    fn test_invalid_record_yields_single_failure() {
        let shard = [record(1.8, 75.0), record(0.0, 75.0), record(1.9, 80.0)];
        let outcomes: Vec<_> = compute_shard_bmi(&shard, 0, 3).collect();

        assert_eq!(outcomes.len(), 3);
        assert_eq!(outcomes[1], BmiOutcome::Invalid { local_index: 1 });
        // Processing continued past the invalid record
        assert!(matches!(outcomes[2], BmiOutcome::Computed { patient: 3, .. }));
    }

    #[test]
    fn test_negative_weight_is_invalid() {
        let shard = [record(1.8, -5.0)];
        let outcomes: Vec<_> = compute_shard_bmi(&shard, 0, 1).collect();
        assert_eq!(outcomes, vec![BmiOutcome::Invalid { local_index: 0 }]);
    }

    #[test]
    fn test_empty_shard_yields_nothing() {
        assert_eq!(compute_shard_bmi(&[], 0, 0).count(), 0);
    }
}
