//! The fixed transaction schema shared by training and serving.
//!
//! Column order here is the order of every feature vector the scaler and the
//! classifier ever see. Changing it invalidates all persisted artifacts.

pub const NUM_FEATURES: usize = 30;

/// Name of the binary target column in labeled data (1 = fraud).
pub const LABEL_COLUMN: &str = "Class";

pub const FEATURE_NAMES: [&str; NUM_FEATURES] = [
    "Time", "V1", "V2", "V3", "V4", "V5", "V6", "V7", "V8", "V9", "V10",
    "V11", "V12", "V13", "V14", "V15", "V16", "V17", "V18", "V19", "V20",
    "V21", "V22", "V23", "V24", "V25", "V26", "V27", "V28", "Amount",
];

/// Position of a feature in the schema order.
pub fn feature_index(name: &str) -> Option<usize> {
    FEATURE_NAMES.iter().position(|&f| f == name)
}

/// Owned copy of the feature names, as stored inside artifacts.
pub fn feature_names() -> Vec<String> {
    FEATURE_NAMES.iter().map(|f| f.to_string()).collect()
}

/// True when `names` is exactly the schema, in order.
pub fn matches_schema(names: &[String]) -> bool {
    names.len() == NUM_FEATURES && names.iter().zip(FEATURE_NAMES).all(|(a, b)| a == b)
}
