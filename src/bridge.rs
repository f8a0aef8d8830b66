//! Operations behind the JNI entry points, expressed over plain Rust types.
//!
//! The `ffi` module only converts Java values and raises exceptions; all
//! behavior lives here so it can be exercised without a JVM.

use once_cell::sync::Lazy;
use tracing::{debug, warn};

use crate::compat;
use crate::error::{BridgeError, Result};
use crate::llm::{ModelEngine, PLACEHOLDER_RESPONSE};

static ENGINE: Lazy<ModelEngine> = Lazy::new(ModelEngine::new);

/// The process-wide engine shared by every JNI call.
pub fn engine() -> &'static ModelEngine {
    &ENGINE
}

/// Entry points that can fail, used to phrase exception messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Initialize,
    Generate,
    Status,
    Cleanup,
    PredictCompatibility,
}

impl Operation {
    /// Message for the Java exception raised when this operation fails.
    pub fn failure_message(self, err: &BridgeError) -> String {
        match (self, err) {
            (_, BridgeError::ModelNotInitialized) => err.to_string(),
            (_, BridgeError::InvalidFeatures(msg)) => msg.clone(),
            (Operation::Initialize, _) => format!("Failed to initialize model: {}", err),
            (Operation::Generate, _) => format!("Failed to generate response: {}", err),
            (Operation::Status, _) => format!("Failed to read model status: {}", err),
            (Operation::Cleanup, _) => format!("Failed to release model: {}", err),
            (Operation::PredictCompatibility, _) => {
                format!("Error calculating compatibility: {}", err)
            }
        }
    }
}

/// The original `generate` contract: always returns a string. A null
/// prompt is treated as empty; any failure degrades to the placeholder.
pub fn generate(engine: &ModelEngine, prompt: Option<&str>) -> String {
    let prompt = prompt.unwrap_or_default();
    debug!(prompt_len = prompt.len(), "generate");
    match engine.generate(prompt) {
        Ok(text) => text,
        Err(e) => {
            warn!(error = %e, "Generation failed, returning placeholder response");
            PLACEHOLDER_RESPONSE.to_string()
        }
    }
}

/// Loads the model at `model_path`. Returns `true` on success.
pub fn initialize(engine: &ModelEngine, model_path: Option<&str>) -> Result<bool> {
    let model_path = model_path
        .ok_or_else(|| BridgeError::InvalidModelPath("modelPath is null".to_string()))?;
    engine.initialize(model_path)?;
    Ok(true)
}

pub fn generate_with_limit(
    engine: &ModelEngine,
    prompt: Option<&str>,
    max_tokens: i32,
) -> Result<String> {
    engine.generate_with_limit(prompt.unwrap_or_default(), max_tokens)
}

/// Model status serialized as the JSON object the plugin resolves with.
pub fn model_status_json(engine: &ModelEngine) -> Result<String> {
    Ok(serde_json::to_string(&engine.status()?)?)
}

pub fn cleanup(engine: &ModelEngine) -> Result<()> {
    engine.cleanup()?;
    Ok(())
}

pub fn predict_compatibility(features_json: Option<&str>) -> Result<f64> {
    let json = features_json.ok_or_else(|| BridgeError::InvalidFeatures("Bad features".to_string()))?;
    compat::predict_json(json)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_messages() {
        let err = BridgeError::ModelNotInitialized;
        assert_eq!(Operation::Generate.failure_message(&err), "Model not initialized");

        let err = BridgeError::InvalidModelPath("/nope.gguf".into());
        assert_eq!(
            Operation::Initialize.failure_message(&err),
            "Failed to initialize model: invalid model path: /nope.gguf"
        );

        let err = BridgeError::Generation("decode".into());
        assert_eq!(
            Operation::Generate.failure_message(&err),
            "Failed to generate response: generation failed: decode"
        );

        let err = BridgeError::InvalidFeatures("Bad features".into());
        assert_eq!(Operation::PredictCompatibility.failure_message(&err), "Bad features");
    }

    #[test]
    fn test_generate_null_prompt_on_fresh_engine() {
        let engine = ModelEngine::new();
        assert_eq!(generate(&engine, None), "Generated response");
    }

    #[test]
    fn test_initialize_null_path() {
        let engine = ModelEngine::new();
        assert!(matches!(
            initialize(&engine, None),
            Err(BridgeError::InvalidModelPath(_))
        ));
    }

    #[test]
    fn test_predict_null_features() {
        assert!(matches!(
            predict_compatibility(None),
            Err(BridgeError::InvalidFeatures(_))
        ));
    }
}
