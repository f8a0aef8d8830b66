//! Compatibility predictor.
//!
//! A closed-form stand-in for the on-device classifier: interest overlap,
//! a Big Five personality blend and a same-location flag are combined into
//! one score and squashed through a sigmoid into a probability.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{BridgeError, Result};

/// Feature keys in the order the classifier expects them.
pub const FEATURE_KEYS: [&str; 11] = [
    "Adventure",
    "Anime",
    "Creative",
    "Fantasy",
    "Tech",
    "agreeableness",
    "conscientiousness",
    "extraversion",
    "neuroticism",
    "openness",
    "same_location",
];

const INTEREST_WEIGHT: f64 = 0.3;
const PERSONALITY_WEIGHT: f64 = 0.6;
const LOCATION_WEIGHT: f64 = 0.1;
/// Personality traits are scored on a 0-5 scale
const TRAIT_SCALE: f64 = 5.0;
const SIGMOID_STEEPNESS: f64 = 6.0;

/// Inputs to the predictor. Missing features count as 0.0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CompatibilityFeatures {
    #[serde(rename = "Adventure", default)]
    pub adventure: f64,
    #[serde(rename = "Anime", default)]
    pub anime: f64,
    #[serde(rename = "Creative", default)]
    pub creative: f64,
    #[serde(rename = "Fantasy", default)]
    pub fantasy: f64,
    #[serde(rename = "Tech", default)]
    pub tech: f64,
    #[serde(default)]
    pub agreeableness: f64,
    #[serde(default)]
    pub conscientiousness: f64,
    #[serde(default)]
    pub extraversion: f64,
    #[serde(default)]
    pub neuroticism: f64,
    #[serde(default)]
    pub openness: f64,
    #[serde(default)]
    pub same_location: f64,
}

impl CompatibilityFeatures {
    /// Parses a JSON object of feature name to number. Unknown keys are
    /// ignored; anything that is not an object of numbers is rejected.
    pub fn from_json(json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json).map_err(|_| bad_features())?;
        let object = value.as_object().ok_or_else(bad_features)?;

        if FEATURE_KEYS
            .iter()
            .filter_map(|key| object.get(*key))
            .any(|v| !v.is_number())
        {
            return Err(bad_features());
        }

        serde_json::from_value(value).map_err(|_| bad_features())
    }

    /// Features as a vector, in `FEATURE_KEYS` order.
    pub fn to_vector(&self) -> [f64; 11] {
        [
            self.adventure,
            self.anime,
            self.creative,
            self.fantasy,
            self.tech,
            self.agreeableness,
            self.conscientiousness,
            self.extraversion,
            self.neuroticism,
            self.openness,
            self.same_location,
        ]
    }

    fn interest_score(&self) -> f64 {
        (self.adventure + self.anime + self.creative + self.fantasy + self.tech) / 5.0
    }

    // Lower neuroticism is better, so it enters inverted.
    fn personality_score(&self) -> f64 {
        (self.agreeableness * 0.25
            + self.conscientiousness * 0.2
            + self.extraversion * 0.2
            + self.openness * 0.2
            + (TRAIT_SCALE - self.neuroticism) * 0.15)
            / TRAIT_SCALE
    }
}

fn bad_features() -> BridgeError {
    BridgeError::InvalidFeatures("Bad features".to_string())
}

/// Probability in (0, 1) that two people are compatible.
pub fn predict(features: &CompatibilityFeatures) -> f64 {
    let combined = features.interest_score() * INTEREST_WEIGHT
        + features.personality_score() * PERSONALITY_WEIGHT
        + features.same_location * LOCATION_WEIGHT;
    let clamped = combined.clamp(0.0, 1.0);
    1.0 / (1.0 + (-(clamped - 0.5) * SIGMOID_STEEPNESS).exp())
}

/// Parses `json` and predicts in one step.
pub fn predict_json(json: &str) -> Result<f64> {
    Ok(predict(&CompatibilityFeatures::from_json(json)?))
}
