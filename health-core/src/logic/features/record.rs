//! Feature Record - the single model input row
//!
//! Holds the 21 cardiotocogram measurements in layout order. Values are
//! stored untouched: no clamping, no normalization, no range checks.

use std::collections::HashMap;

use serde::ser::{Serialize, SerializeMap, Serializer};

use super::layout::{default_values, feature_index, FEATURE_COUNT, FEATURE_LAYOUT};
use crate::error::FeatureError;

// ============================================================================
// FEATURE RECORD
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureRecord {
    values: [f64; FEATURE_COUNT],
}

impl FeatureRecord {
    /// Record with every feature at its documented default
    pub fn defaults() -> Self {
        Self { values: default_values() }
    }

    pub fn from_values(values: [f64; FEATURE_COUNT]) -> Self {
        Self { values }
    }

    /// Build from an ordered slice; the slice must hold exactly 21 values
    pub fn from_slice(values: &[f64]) -> Result<Self, FeatureError> {
        let values: [f64; FEATURE_COUNT] = values
            .try_into()
            .map_err(|_| FeatureError::WrongLength {
                expected: FEATURE_COUNT,
                actual: values.len(),
            })?;
        Ok(Self { values })
    }

    /// Build from named values.
    ///
    /// Features not present keep their default, the same way an untouched
    /// form input does. Unknown names are rejected, all of them reported.
    pub fn from_named(named: &HashMap<String, f64>) -> Result<Self, FeatureError> {
        let mut record = Self::defaults();
        let mut unknown: Vec<String> = named
            .iter()
            .filter(|(name, value)| !record.set_by_name(name, **value))
            .map(|(name, _)| name.clone())
            .collect();

        if unknown.is_empty() {
            return Ok(record);
        }
        unknown.sort();
        Err(FeatureError::UnknownFeatures(unknown))
    }

    pub fn values(&self) -> &[f64; FEATURE_COUNT] {
        &self.values
    }

    pub fn get(&self, index: usize) -> Option<f64> {
        self.values.get(index).copied()
    }

    pub fn get_by_name(&self, name: &str) -> Option<f64> {
        feature_index(name).and_then(|i| self.get(i))
    }

    pub fn set(&mut self, index: usize, value: f64) {
        if index < FEATURE_COUNT {
            self.values[index] = value;
        }
    }

    pub fn set_by_name(&mut self, name: &str, value: f64) -> bool {
        if let Some(index) = feature_index(name) {
            self.set(index, value);
            true
        } else {
            false
        }
    }

    /// `(name, value)` pairs in layout order
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, f64)> + '_ {
        FEATURE_LAYOUT
            .iter()
            .zip(self.values.iter())
            .map(|(spec, value)| (spec.name, *value))
    }

    /// Row as fed to the ONNX graph (float32 input)
    pub fn to_row_f32(&self) -> [f32; FEATURE_COUNT] {
        self.values.map(|v| v as f32)
    }

    pub fn to_log_entry(&self) -> serde_json::Value {
        serde_json::json!({
            "feature_version": super::layout::FEATURE_VERSION,
            "layout_hash": super::layout::layout_hash(),
            "features": self,
        })
    }
}

impl Default for FeatureRecord {
    fn default() -> Self {
        Self::defaults()
    }
}

impl From<[f64; FEATURE_COUNT]> for FeatureRecord {
    fn from(values: [f64; FEATURE_COUNT]) -> Self {
        Self::from_values(values)
    }
}

/// Serializes as a map keyed by column name, in layout order
impl Serialize for FeatureRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(FEATURE_COUNT))?;
        for (name, value) in self.iter() {
            map.serialize_entry(name, &value)?;
        }
        map.end()
    }
}

// ============================================================================
// BUILDER PATTERN
// ============================================================================

/// Builder for creating FeatureRecord with named setters.
/// Starts from the documented defaults.
pub struct FeatureRecordBuilder {
    record: FeatureRecord,
}

macro_rules! feature_setters {
    ($($method:ident => $index:expr),* $(,)?) => {
        $(
            pub fn $method(mut self, value: f64) -> Self {
                self.record.set($index, value);
                self
            }
        )*
    };
}

impl FeatureRecordBuilder {
    pub fn new() -> Self {
        Self { record: FeatureRecord::defaults() }
    }

    feature_setters! {
        baseline_value => 0,
        accelerations => 1,
        fetal_movement => 2,
        uterine_contractions => 3,
        light_decelerations => 4,
        severe_decelerations => 5,
        prolongued_decelerations => 6,
        abnormal_short_term_variability => 7,
        mean_value_of_short_term_variability => 8,
        percentage_of_time_with_abnormal_long_term_variability => 9,
        mean_value_of_long_term_variability => 10,
        histogram_width => 11,
        histogram_min => 12,
        histogram_max => 13,
        histogram_number_of_peaks => 14,
        histogram_number_of_zeroes => 15,
        histogram_mode => 16,
        histogram_mean => 17,
        histogram_median => 18,
        histogram_variance => 19,
        histogram_tendency => 20,
    }

    /// Set feature by column name; unknown names are ignored
    pub fn set(mut self, name: &str, value: f64) -> Self {
        self.record.set_by_name(name, value);
        self
    }

    pub fn build(self) -> FeatureRecord {
        self.record
    }
}

impl Default for FeatureRecordBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// TESTS
// ============================================================================
