// Configuration for the bridge, layered from defaults, an optional file next
// to the model and environment variables.
use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

mod tier;

pub use tier::{ModelTier, TierPreset};

/// Name of the optional settings file looked up in the model's directory
pub const CONFIG_FILE_NAME: &str = "llama_module.toml";

/// Prefix for environment overrides, e.g. `LLAMA_MODULE_INFERENCE__MAX_TOKENS=64`
pub const ENV_PREFIX: &str = "LLAMA_MODULE";

const DEFAULT_MAX_TOKENS: i64 = 100;
const DEFAULT_CONTEXT_SIZE: i64 = 2048;
const DEFAULT_TEMPERATURE: f64 = 0.7;
const DEFAULT_THREADS: i64 = 4;

/// Configuration for model inference parameters
#[derive(Debug, Deserialize, Clone)]
pub struct InferenceConfig {
    /// Maximum number of tokens to generate when the caller gives no limit
    pub max_tokens: usize,
    /// Size of the context window for inference
    pub context_size: usize,
    /// Controls randomness in generation (0.0-1.0)
    pub temperature: f32,
    /// CPU threads handed to llama.cpp
    pub threads: u32,
    /// Layers to offload to the GPU (0 = CPU only)
    pub n_gpu_layers: u32,
    pub use_mmap: bool,
    pub use_mlock: bool,
    /// When set, the tier's limits replace `max_tokens` and `context_size`
    pub tier: Option<ModelTier>,
}

/// Configuration for application logging
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// Log level (debug, info, warn, error)
    pub level: String,
    /// Optional directory for daily rolling log files
    pub file: Option<PathBuf>,
}

/// Main settings struct that contains all configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub inference: InferenceConfig,
    pub logging: LoggingConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            inference: InferenceConfig {
                max_tokens: DEFAULT_MAX_TOKENS as usize,
                context_size: DEFAULT_CONTEXT_SIZE as usize,
                temperature: DEFAULT_TEMPERATURE as f32,
                threads: DEFAULT_THREADS as u32,
                n_gpu_layers: 0,
                use_mmap: true,
                use_mlock: false,
                tier: None,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                file: None,
            },
        }
    }
}

impl Settings {
    /// Loads settings in the following order of precedence (highest to lowest):
    /// 1. Environment variables prefixed with `LLAMA_MODULE_` (`__` between levels)
    /// 2. `llama_module.toml` in `model_dir`, if present
    /// 3. Built-in defaults
    pub fn load(model_dir: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with_env(model_dir, environment())
    }

    fn load_with_env(model_dir: Option<&Path>, env: Environment) -> Result<Self, ConfigError> {
        let mut builder = Config::builder()
            .set_default("inference.max_tokens", DEFAULT_MAX_TOKENS)?
            .set_default("inference.context_size", DEFAULT_CONTEXT_SIZE)?
            .set_default("inference.temperature", DEFAULT_TEMPERATURE)?
            .set_default("inference.threads", DEFAULT_THREADS)?
            .set_default("inference.n_gpu_layers", 0i64)?
            .set_default("inference.use_mmap", true)?
            .set_default("inference.use_mlock", false)?
            .set_default("logging.level", "info")?;

        if let Some(dir) = model_dir {
            let local_config = dir.join(CONFIG_FILE_NAME);
            builder = builder.add_source(File::from(local_config).required(false));
        }

        let settings = builder
            .add_source(env)
            .build()?
            .try_deserialize::<Settings>()?
            .apply_tier();

        settings.validate()?;
        Ok(settings)
    }

    fn apply_tier(mut self) -> Self {
        if let Some(tier) = self.inference.tier {
            let preset = tier.preset();
            self.inference.max_tokens = preset.max_tokens;
            self.inference.context_size = preset.context_window;
        }
        self
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.inference.temperature) {
            return Err(ConfigError::Message(format!(
                "Temperature must be between 0.0 and 1.0, got: {}",
                self.inference.temperature
            )));
        }

        if self.inference.max_tokens == 0 {
            return Err(ConfigError::Message("max_tokens must be greater than 0".to_string()));
        }

        if self.inference.context_size == 0 {
            return Err(ConfigError::Message("context_size must be greater than 0".to_string()));
        }

        if self.inference.max_tokens >= self.inference.context_size {
            return Err(ConfigError::Message(format!(
                "max_tokens ({}) must be smaller than context_size ({})",
                self.inference.max_tokens, self.inference.context_size
            )));
        }

        match self.logging.level.to_lowercase().as_str() {
            "error" | "warn" | "info" | "debug" | "trace" => Ok(()),
            _ => Err(ConfigError::Message(format!(
                "Invalid logging level: {}. Must be one of: error, warn, info, debug, trace",
                self.logging.level
            ))),
        }
    }
}

fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}
