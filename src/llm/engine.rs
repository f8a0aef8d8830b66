use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::config::Settings;
use crate::error::{BridgeError, Result};
use crate::gguf::{self, GgufHeader};
use crate::llm::backend::{PlaceholderGenerator, TextGenerator};

/// Builds the generator for a model file that already passed the GGUF probe.
pub type GeneratorLoader =
    Box<dyn Fn(&Path, &Settings) -> Result<Box<dyn TextGenerator>> + Send + Sync>;

/// Snapshot of the engine returned to the JVM as JSON.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelStatus {
    pub loaded: bool,
    /// Size of the model file in bytes, 0 when nothing is loaded
    pub model_size: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub architecture: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context_length: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backend: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loaded_at: Option<DateTime<Utc>>,
}

impl ModelStatus {
    fn unloaded() -> Self {
        Self {
            loaded: false,
            model_size: 0,
            model_name: None,
            architecture: None,
            context_length: None,
            backend: None,
            session_id: None,
            loaded_at: None,
        }
    }
}

struct LoadedModel {
    session_id: String,
    path: PathBuf,
    size_bytes: u64,
    header: GgufHeader,
    settings: Settings,
    generator: Box<dyn TextGenerator>,
    loaded_at: DateTime<Utc>,
}

/// Owns the lifecycle of the single model the bridge serves.
///
/// Lifecycle changes take the write lock; generation and status reads share
/// the read lock, so a model cannot be released under a running generation.
pub struct ModelEngine {
    state: RwLock<Option<LoadedModel>>,
    loader: GeneratorLoader,
    fallback: PlaceholderGenerator,
}

impl Default for ModelEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ModelEngine {
    /// Engine that loads models with the backend compiled into this build.
    pub fn new() -> Self {
        Self::with_loader(Box::new(default_loader))
    }

    /// Engine with a custom generator factory.
    pub fn with_loader(loader: GeneratorLoader) -> Self {
        Self {
            state: RwLock::new(None),
            loader,
            fallback: PlaceholderGenerator,
        }
    }

    /// Validates and loads the model at `model_path`, replacing any model
    /// already attached. On failure the previous state is kept.
    pub fn initialize(&self, model_path: &str) -> Result<ModelStatus> {
        if model_path.trim().is_empty() {
            return Err(BridgeError::InvalidModelPath("empty model path".to_string()));
        }
        let path = PathBuf::from(model_path);

        let file_meta = fs::metadata(&path)
            .map_err(|e| BridgeError::InvalidModelPath(format!("{}: {}", path.display(), e)))?;
        if !file_meta.is_file() {
            return Err(BridgeError::InvalidModelPath(format!(
                "{} is not a file",
                path.display()
            )));
        }

        let header = gguf::read_header(&path)?;
        let settings = Settings::load(path.parent())?;
        crate::logging::init(&settings.logging);

        let generator = (self.loader)(&path, &settings)?;

        let loaded = LoadedModel {
            session_id: Uuid::new_v4().to_string(),
            path,
            size_bytes: file_meta.len(),
            header,
            settings,
            generator,
            loaded_at: Utc::now(),
        };

        info!(
            session_id = %loaded.session_id,
            path = %loaded.path.display(),
            size_bytes = loaded.size_bytes,
            backend = loaded.generator.name(),
            "Model initialized"
        );
        let status = status_of(&loaded);

        let mut state = self.state.write()?;
        if let Some(previous) = state.replace(loaded) {
            info!(session_id = %previous.session_id, "Replaced previously loaded model");
        }
        Ok(status)
    }

    /// Returns true if a model is attached.
    pub fn is_loaded(&self) -> bool {
        self.state.read().map(|s| s.is_some()).unwrap_or(false)
    }

    /// Generates with the configured token limit, or returns the placeholder
    /// response when no model is attached.
    pub fn generate(&self, prompt: &str) -> Result<String> {
        let state = self.state.read()?;
        match state.as_ref() {
            Some(model) => model
                .generator
                .generate(prompt, model.settings.inference.max_tokens),
            None => self.fallback.generate(prompt, 0),
        }
    }

    /// Generates with an explicit token limit. A limit of zero or less means
    /// the configured default; limits beyond the context window are clamped.
    pub fn generate_with_limit(&self, prompt: &str, max_tokens: i32) -> Result<String> {
        let state = self.state.read()?;
        let model = state.as_ref().ok_or(BridgeError::ModelNotInitialized)?;

        let inference = &model.settings.inference;
        let limit = if max_tokens <= 0 {
            inference.max_tokens
        } else {
            (max_tokens as usize).min(inference.context_size.saturating_sub(1).max(1))
        };

        model.generator.generate(prompt, limit)
    }

    pub fn status(&self) -> Result<ModelStatus> {
        let state = self.state.read()?;
        Ok(state.as_ref().map(status_of).unwrap_or_else(ModelStatus::unloaded))
    }

    /// Releases the attached model. Returns whether anything was released.
    pub fn cleanup(&self) -> Result<bool> {
        let mut state = self.state.write()?;
        match state.take() {
            Some(model) => {
                info!(session_id = %model.session_id, "Model released");
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

fn status_of(model: &LoadedModel) -> ModelStatus {
    ModelStatus {
        loaded: true,
        model_size: model.size_bytes,
        model_name: model.header.name().map(str::to_string),
        architecture: model.header.architecture().map(str::to_string),
        context_length: model.header.context_length(),
        backend: Some(model.generator.name().to_string()),
        session_id: Some(model.session_id.clone()),
        loaded_at: Some(model.loaded_at),
    }
}

#[cfg(feature = "llama")]
fn default_loader(path: &Path, settings: &Settings) -> Result<Box<dyn TextGenerator>> {
    let generator = crate::llm::llama::LlamaGenerator::load(path, settings)?;
    Ok(Box::new(generator))
}

#[cfg(not(feature = "llama"))]
fn default_loader(path: &Path, _settings: &Settings) -> Result<Box<dyn TextGenerator>> {
    tracing::warn!(
        path = %path.display(),
        "Built without the `llama` feature; attaching the placeholder generator"
    );
    Ok(Box::new(PlaceholderGenerator))
}
