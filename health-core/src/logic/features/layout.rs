//! Feature Layout - Centralized Feature Definition
//!
//! **CRITICAL: This file controls the feature schema**
//!
//! The classifier has no schema validation of its own: it reads a row of
//! 21 numbers positionally. A reordered or renamed entry here silently
//! produces meaningless predictions.
//!
//! ## Rules (NEVER break these):
//! 1. Add feature → increment FEATURE_VERSION
//! 2. Change order → increment FEATURE_VERSION
//! 3. Remove feature → increment FEATURE_VERSION

use crc32fast::Hasher;
use serde::Serialize;

// ============================================================================
// FEATURE VERSION
// ============================================================================

/// Current feature layout version
/// MUST be incremented when layout changes
pub const FEATURE_VERSION: u8 = 1;

// ============================================================================
// FEATURE SPEC
// ============================================================================

/// One input slot of the cardiotocogram form
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FeatureSpec {
    /// Column name the classifier was trained with
    pub name: &'static str,
    /// Human readable label shown next to the input
    pub label: &'static str,
    /// Value the input starts with
    pub default: f64,
    /// Decimal digits shown by the input (2 or 4)
    pub precision: usize,
    /// Tooltip text
    pub help: &'static str,
}

impl FeatureSpec {
    const fn new(
        name: &'static str,
        label: &'static str,
        default: f64,
        precision: usize,
        help: &'static str,
    ) -> Self {
        Self { name, label, default, precision, help }
    }

    /// Render a value at this feature's display precision
    pub fn format_value(&self, value: f64) -> String {
        format!("{:.*}", self.precision, value)
    }

    /// Increment for an HTML number input (`0.01` or `0.0001`)
    pub fn step(&self) -> String {
        if self.precision == 0 {
            return "1".to_string();
        }
        format!("0.{}1", "0".repeat(self.precision - 1))
    }
}

// ============================================================================
// FEATURE LAYOUT (Authoritative source)
// ============================================================================

/// Total number of features
/// IMPORTANT: Must match FEATURE_LAYOUT.len()!
pub const FEATURE_COUNT: usize = 21;

/// Features in exact order the classifier expects them
/// This is the SINGLE SOURCE OF TRUTH for feature layout
pub const FEATURE_LAYOUT: [FeatureSpec; FEATURE_COUNT] = [
    // === Heart rate / events (0-6) ===
    FeatureSpec::new("baseline value", "Baseline Value", 120.0, 2,
        "The baseline fetal heart rate in beats per minute (bpm)."),
    FeatureSpec::new("accelerations", "Accelerations", 0.0, 4,
        "Number of accelerations observed."),
    FeatureSpec::new("fetal_movement", "Fetal Movement", 0.0, 4,
        "Frequency of fetal movements observed."),
    FeatureSpec::new("uterine_contractions", "Uterine Contractions", 0.0, 4,
        "Number of uterine contractions observed."),
    FeatureSpec::new("light_decelerations", "Light Decelerations", 0.0, 4,
        "Number of light decelerations observed."),
    FeatureSpec::new("severe_decelerations", "Severe Decelerations", 0.0, 4,
        "Number of severe decelerations observed."),
    FeatureSpec::new("prolongued_decelerations", "Prolongued Decelerations", 0.0, 4,
        "Number of prolonged decelerations observed."),

    // === Variability (7-10) ===
    FeatureSpec::new("abnormal_short_term_variability", "Abnormal Short Term Variability", 73.0, 2,
        "Abnormal short term variability measurement."),
    FeatureSpec::new("mean_value_of_short_term_variability", "Mean Value of Short Term Variability", 0.5, 2,
        "Mean value of short term variability."),
    FeatureSpec::new("percentage_of_time_with_abnormal_long_term_variability",
        "Percentage of Time with Abnormal Long Term Variability", 43.0, 2,
        "Percentage of time with abnormal long term variability."),
    FeatureSpec::new("mean_value_of_long_term_variability", "Mean Value of Long Term Variability", 0.0, 2,
        "Mean value of long term variability."),

    // === Histogram (11-20) ===
    FeatureSpec::new("histogram_width", "Histogram Width", 0.0, 2,
        "Width of the histogram."),
    FeatureSpec::new("histogram_min", "Histogram Min", 62.0, 2,
        "Minimum value in the histogram."),
    FeatureSpec::new("histogram_max", "Histogram Max", 126.0, 2,
        "Maximum value in the histogram."),
    FeatureSpec::new("histogram_number_of_peaks", "Histogram Number of Peaks", 2.0, 2,
        "Number of peaks in the histogram."),
    FeatureSpec::new("histogram_number_of_zeroes", "Histogram Number of Zeroes", 0.0, 2,
        "Number of zeroes in the histogram."),
    FeatureSpec::new("histogram_mode", "Histogram Mode", 120.0, 2,
        "Mode of the histogram."),
    FeatureSpec::new("histogram_mean", "Histogram Mean", 137.0, 2,
        "Mean of the histogram."),
    FeatureSpec::new("histogram_median", "Histogram Median", 121.0, 2,
        "Median of the histogram."),
    FeatureSpec::new("histogram_variance", "Histogram Variance", 73.0, 2,
        "Variance of the histogram."),
    FeatureSpec::new("histogram_tendency", "Histogram Tendency", 1.0, 2,
        "Tendency of the histogram."),
];

/// Default value of every feature, in layout order
pub fn default_values() -> [f64; FEATURE_COUNT] {
    FEATURE_LAYOUT.map(|spec| spec.default)
}

/// Feature names in layout order
pub fn feature_names() -> impl Iterator<Item = &'static str> {
    FEATURE_LAYOUT.iter().map(|spec| spec.name)
}

// ============================================================================
// LAYOUT HASH
// ============================================================================

/// Compute CRC32 hash of the feature layout
/// Reported alongside model metadata and engine status
pub fn compute_layout_hash() -> u32 {
    let mut hasher = Hasher::new();

    hasher.update(&[FEATURE_VERSION]);

    for name in feature_names() {
        hasher.update(name.as_bytes());
        hasher.update(&[0]); // Separator
    }

    hasher.finalize()
}

pub fn layout_hash() -> u32 {
    compute_layout_hash()
}

// ============================================================================
// LAYOUT INFO
// ============================================================================

/// Complete layout information for serialization/logging
#[derive(Debug, Clone, Serialize)]
pub struct LayoutInfo {
    pub version: u8,
    pub hash: u32,
    pub feature_count: usize,
    pub features: Vec<FeatureSpec>,
}

impl LayoutInfo {
    pub fn current() -> Self {
        Self {
            version: FEATURE_VERSION,
            hash: layout_hash(),
            feature_count: FEATURE_COUNT,
            features: FEATURE_LAYOUT.to_vec(),
        }
    }
}

impl Default for LayoutInfo {
    fn default() -> Self {
        Self::current()
    }
}

// ============================================================================
// FEATURE INDEX LOOKUP
// ============================================================================

/// Get feature index by name (O(n) but features are few)
pub fn feature_index(name: &str) -> Option<usize> {
    FEATURE_LAYOUT.iter().position(|spec| spec.name == name)
}

// ============================================================================
// TESTS
// ============================================================================
