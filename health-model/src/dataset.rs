//! Synthetic training data and the train/test split.

use crate::error::TrainError;
use crate::features::HealthRecord;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;

const AGE_RANGE: std::ops::Range<i64> = 18..90;
const WEIGHT_RANGE: std::ops::Range<f64> = 45.0..120.0;
const BODY_TEMP_MEAN: f64 = 36.8;
const BODY_TEMP_STD: f64 = 0.4;
const BP_SYSTOLIC_RANGE: std::ops::Range<i64> = 90..180;
const CHOLESTEROL_RANGE: std::ops::Range<i64> = 120..280;

/// In-memory feature matrix with aligned class labels.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    /// Feature matrix, row-major.
    pub x: Vec<Vec<f64>>,
    /// Labels aligned with `x`.
    pub y: Vec<u8>,
}

impl Dataset {
    pub fn from_records(records: &[HealthRecord]) -> Self {
        Self {
            x: records.iter().map(|r| r.features().0.to_vec()).collect(),
            y: records.iter().map(HealthRecord::label).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Check shape invariants and return the feature count.
    pub fn validate(&self) -> Result<usize, TrainError> {
        if self.x.is_empty() || self.y.is_empty() {
            return Err(TrainError::EmptyDataset);
        }
        if self.x.len() != self.y.len() {
            return Err(TrainError::LengthMismatch {
                rows: self.x.len(),
                labels: self.y.len(),
            });
        }
        let expected = self.x[0].len();
        for (row, values) in self.x.iter().enumerate() {
            if values.len() != expected || expected == 0 {
                return Err(TrainError::RaggedRow {
                    row,
                    expected,
                    got: values.len(),
                });
            }
        }
        Ok(expected)
    }

    fn subset(&self, indices: &[usize]) -> Self {
        Self {
            x: indices.iter().map(|&i| self.x[i].clone()).collect(),
            y: indices.iter().map(|&i| self.y[i]).collect(),
        }
    }
}

/// Draw `n` records from the fixed synthetic distribution.
///
/// Each feature column is sampled in full before the next one, so the same
/// seed always yields the same records.
pub fn synthesize_records(n: usize, seed: u64) -> Vec<HealthRecord> {
    let mut rng = StdRng::seed_from_u64(seed);

    let age: Vec<f64> = (0..n)
        .map(|_| rng.gen_range(AGE_RANGE) as f64)
        .collect();
    let weight: Vec<f64> = (0..n).map(|_| rng.gen_range(WEIGHT_RANGE)).collect();
    let body_temp: Vec<f64> = (0..n)
        .map(|_| BODY_TEMP_MEAN + BODY_TEMP_STD * rng.sample::<f64, _>(StandardNormal))
        .collect();
    let bp_systolic: Vec<f64> = (0..n)
        .map(|_| rng.gen_range(BP_SYSTOLIC_RANGE) as f64)
        .collect();
    let cholesterol: Vec<f64> = (0..n)
        .map(|_| rng.gen_range(CHOLESTEROL_RANGE) as f64)
        .collect();

    (0..n)
        .map(|i| HealthRecord {
            age: age[i],
            weight: weight[i],
            body_temp: body_temp[i],
            bp_systolic: bp_systolic[i],
            cholesterol: cholesterol[i],
        })
        .collect()
}

/// Shuffle with `seed` and cut off `ceil(len * test_fraction)` rows for testing.
///
/// Returns `(train, test)`.
pub fn train_test_split(dataset: &Dataset, test_fraction: f64, seed: u64) -> (Dataset, Dataset) {
    let n = dataset.len();
    let fraction = test_fraction.clamp(0.0, 1.0);
    let n_test = ((n as f64) * fraction).ceil() as usize;

    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let (test_idx, train_idx) = indices.split_at(n_test.min(n));
    (dataset.subset(train_idx), dataset.subset(test_idx))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::N_FEATURES;

    #[test]
    fn test_synthesis_is_deterministic() {
        assert_eq!(synthesize_records(50, 42), synthesize_records(50, 42));
        assert_ne!(synthesize_records(50, 42), synthesize_records(50, 7));
    }

    #[test]
    fn test_synthesis_respects_ranges() {
        for r in synthesize_records(500, 42) {
            assert!((18.0..90.0).contains(&r.age));
            assert_eq!(r.age.fract(), 0.0);
            assert!((45.0..120.0).contains(&r.weight));
            assert!((90.0..180.0).contains(&r.bp_systolic));
            assert!((120.0..280.0).contains(&r.cholesterol));
            assert!(r.body_temp.is_finite());
        }
    }

    #[test]
    fn test_body_temp_is_centered() {
        let records = synthesize_records(2000, 42);
        let mean = records.iter().map(|r| r.body_temp).sum::<f64>() / records.len() as f64;
        assert!((mean - 36.8).abs() < 0.05, "mean body temp {mean}");
    }

    #[test]
    fn test_dataset_labels_follow_rule() {
        let records = synthesize_records(200, 1);
        let dataset = Dataset::from_records(&records);
        assert!(dataset.x.iter().all(|row| row.len() == N_FEATURES));
        for (record, label) in records.iter().zip(&dataset.y) {
            assert_eq!(record.label(), *label);
        }
    }

    #[test]
    fn test_split_sizes() {
        let dataset = Dataset::from_records(&synthesize_records(1000, 42));
        let (train, test) = train_test_split(&dataset, 0.2, 42);
        assert_eq!(train.len(), 800);
        assert_eq!(test.len(), 200);
    }

    #[test]
    fn test_split_rounds_test_size_up() {
        let dataset = Dataset::from_records(&synthesize_records(11, 42));
        let (train, test) = train_test_split(&dataset, 0.2, 42);
        assert_eq!(test.len(), 3);
        assert_eq!(train.len(), 8);
    }

    #[test]
    fn test_split_is_reproducible() {
        let dataset = Dataset::from_records(&synthesize_records(100, 42));
        assert_eq!(
            train_test_split(&dataset, 0.2, 42),
            train_test_split(&dataset, 0.2, 42)
        );
    }

    #[test]
    fn test_validate_rejects_bad_shapes() {
        assert!(matches!(
            Dataset::default().validate(),
            Err(TrainError::EmptyDataset)
        ));

        let mismatched = Dataset {
            x: vec![vec![1.0], vec![2.0]],
            y: vec![0],
        };
        assert!(matches!(
            mismatched.validate(),
            Err(TrainError::LengthMismatch { rows: 2, labels: 1 })
        ));

        let ragged = Dataset {
            x: vec![vec![1.0, 2.0], vec![3.0]],
            y: vec![0, 1],
        };
        assert!(matches!(
            ragged.validate(),
            Err(TrainError::RaggedRow { row: 1, .. })
        ));
    }
}
