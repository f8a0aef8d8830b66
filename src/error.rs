use thiserror::Error;

use crate::gguf::GgufError;

/// Errors produced anywhere below the JNI boundary.
///
/// The `ffi` layer turns these into Java exceptions (or, for the plain
/// `generate` entry point, into the placeholder response).
#[derive(Debug, Error)]
pub enum BridgeError {
    /// A generation or status call needed a model but none is attached
    #[error("Model not initialized")]
    ModelNotInitialized,

    /// The model path is empty, missing or not a regular file
    #[error("invalid model path: {0}")]
    InvalidModelPath(String),

    /// The inference library refused to load the model
    #[error("model load failed: {0}")]
    ModelLoad(String),

    /// Tokenization, decoding or sampling failed
    #[error("generation failed: {0}")]
    Generation(String),

    /// Compatibility features were not a JSON object of numbers
    #[error("{0}")]
    InvalidFeatures(String),

    #[error(transparent)]
    Gguf(#[from] GgufError),

    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("JNI error: {0}")]
    Jni(#[from] jni::errors::Error),

    /// A lock was poisoned by a panicking thread
    #[error("engine state poisoned: {0}")]
    Poisoned(String),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl BridgeError {
    /// Fully qualified (slash separated) Java exception class for this error.
    pub fn java_exception_class(&self) -> &'static str {
        match self {
            BridgeError::InvalidFeatures(_) => "java/lang/IllegalArgumentException",
            _ => "java/lang/IllegalStateException",
        }
    }
}

impl<T> From<std::sync::PoisonError<T>> for BridgeError {
    fn from(err: std::sync::PoisonError<T>) -> Self {
        BridgeError::Poisoned(err.to_string())
    }
}

pub type Result<T, E = BridgeError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_initialized_message_matches_plugin() {
        assert_eq!(BridgeError::ModelNotInitialized.to_string(), "Model not initialized");
    }

    #[test]
    fn test_exception_classes() {
        assert_eq!(
            BridgeError::InvalidFeatures("Bad features".into()).java_exception_class(),
            "java/lang/IllegalArgumentException"
        );
        assert_eq!(
            BridgeError::Generation("eos".into()).java_exception_class(),
            "java/lang/IllegalStateException"
        );
    }

    #[test]
    fn test_poison_converts() {
        let lock = std::sync::Mutex::new(0);
        let _ = std::panic::catch_unwind(|| {
            let _guard = lock.lock().unwrap();
            panic!("boom");
        });
        let err: BridgeError = lock.lock().unwrap_err().into();
        assert!(matches!(err, BridgeError::Poisoned(_)));
    }
}
