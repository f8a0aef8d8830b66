use std::path::Path;

use llama_cpp::standard_sampler::{SamplerStage, StandardSampler};
use llama_cpp::{LlamaModel, LlamaParams, SessionParams};
use tracing::{debug, info, warn};

use crate::config::Settings;
use crate::error::{BridgeError, Result};
use crate::llm::backend::TextGenerator;

/// Text generation through llama.cpp.
///
/// The model weights are loaded once; every call gets a fresh session so
/// prompts from different callers never share a KV cache.
pub struct LlamaGenerator {
    model: LlamaModel,
    session_params: SessionParams,
    temperature: f32,
}

impl LlamaGenerator {
    pub fn load(model_path: &Path, settings: &Settings) -> Result<Self> {
        let inference = &settings.inference;
        let llama_params = LlamaParams {
            n_gpu_layers: inference.n_gpu_layers,
            use_mmap: inference.use_mmap,
            use_mlock: inference.use_mlock,
            ..Default::default()
        };
        info!(
            path = %model_path.display(),
            n_gpu_layers = inference.n_gpu_layers,
            use_mmap = inference.use_mmap,
            use_mlock = inference.use_mlock,
            "Loading model via llama_cpp"
        );
        let model = LlamaModel::load_from_file(model_path, llama_params)
            .map_err(|e| BridgeError::ModelLoad(e.to_string()))?;

        let session_params = SessionParams {
            n_ctx: inference.context_size as u32,
            n_batch: 512,
            n_threads: inference.threads,
            ..Default::default()
        };

        Ok(Self {
            model,
            session_params,
            temperature: inference.temperature,
        })
    }
}

impl TextGenerator for LlamaGenerator {
    fn name(&self) -> &str {
        "llama.cpp"
    }

    fn generate(&self, prompt: &str, max_tokens: usize) -> Result<String> {
        let mut session = self
            .model
            .create_session(self.session_params.clone())
            .map_err(|e| BridgeError::Generation(format!("failed to create session: {}", e)))?;

        session
            .advance_context(prompt)
            .map_err(|e| BridgeError::Generation(format!("failed to advance context: {}", e)))?;
        debug!(prompt_len = prompt.len(), "Context advanced with prompt");

        let sampler = StandardSampler::new_softmax(
            vec![SamplerStage::Temperature(self.temperature)],
            1,
        );
        let completions = session
            .start_completing_with(sampler, max_tokens)
            .map_err(|e| BridgeError::Generation(e.to_string()))?;

        let mut response = String::new();
        let mut generated = 0usize;
        for token in completions {
            response.push_str(&self.model.token_to_piece(token));
            generated += 1;
            if generated >= max_tokens {
                warn!("Reached max token limit ({}) during generation", max_tokens);
                break;
            }
        }

        info!(tokens = generated, "Completion finished");
        Ok(response)
    }
}
