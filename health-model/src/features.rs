//! Feature schema shared by training and inference.

use serde::{Deserialize, Serialize};

/// Number of features the classifier consumes.
pub const N_FEATURES: usize = 5;

/// Feature names in the order the classifier expects them.
pub const FEATURE_NAMES: [&str; N_FEATURES] =
    ["age", "weight", "body_temp", "bp_systolic", "cholesterol"];

/// Systolic blood pressure above which a record is labelled at risk.
pub const BP_SYSTOLIC_LIMIT: f64 = 140.0;
/// Total cholesterol above which a record is labelled at risk.
pub const CHOLESTEROL_LIMIT: f64 = 240.0;
/// Body temperature above which a record is labelled at risk.
pub const BODY_TEMP_LIMIT: f64 = 37.5;

/// Ordered feature tuple, see [`FEATURE_NAMES`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector(pub [f64; N_FEATURES]);

impl FeatureVector {
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }
}

/// One patient observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HealthRecord {
    pub age: f64,
    pub weight: f64,
    pub body_temp: f64,
    pub bp_systolic: f64,
    pub cholesterol: f64,
}

impl HealthRecord {
    /// Ground-truth label: any one threshold breached marks the record at risk.
    pub fn at_risk(&self) -> bool {
        self.bp_systolic > BP_SYSTOLIC_LIMIT
            || self.cholesterol > CHOLESTEROL_LIMIT
            || self.body_temp > BODY_TEMP_LIMIT
    }

    /// Label as a class value: 1 for at risk, 0 otherwise.
    pub fn label(&self) -> u8 {
        u8::from(self.at_risk())
    }

    pub fn features(&self) -> FeatureVector {
        FeatureVector([
            self.age,
            self.weight,
            self.body_temp,
            self.bp_systolic,
            self.cholesterol,
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn healthy() -> HealthRecord {
        HealthRecord {
            age: 30.0,
            weight: 70.0,
            body_temp: 36.6,
            bp_systolic: 110.0,
            cholesterol: 180.0,
        }
    }

    #[test]
    fn test_healthy_record() {
        assert!(!healthy().at_risk());
        assert_eq!(healthy().label(), 0);
    }

    #[test]
    fn test_each_threshold_marks_at_risk() {
        let bp = HealthRecord {
            bp_systolic: 141.0,
            ..healthy()
        };
        let chol = HealthRecord {
            cholesterol: 241.0,
            ..healthy()
        };
        let temp = HealthRecord {
            body_temp: 37.6,
            ..healthy()
        };

        assert!(bp.at_risk());
        assert!(chol.at_risk());
        assert!(temp.at_risk());
    }

    #[test]
    fn test_thresholds_are_strict() {
        let boundary = HealthRecord {
            bp_systolic: 140.0,
            cholesterol: 240.0,
            body_temp: 37.5,
            ..healthy()
        };
        assert!(!boundary.at_risk());
    }

    #[test]
    fn test_age_and_weight_do_not_affect_label() {
        let extreme = HealthRecord {
            age: 89.0,
            weight: 119.0,
            ..healthy()
        };
        assert_eq!(extreme.label(), 0);
    }

    #[test]
    fn test_feature_order_matches_names() {
        let record = healthy();
        assert_eq!(
            record.features().as_slice(),
            &[30.0, 70.0, 36.6, 110.0, 180.0]
        );
        assert_eq!(FEATURE_NAMES[2], "body_temp");
    }
}
