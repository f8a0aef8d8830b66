#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use llama_module::config::Settings;
use llama_module::error::{BridgeError, Result};
use llama_module::gguf::GGUF_MAGIC;
use llama_module::llm::{GeneratorLoader, TextGenerator};

fn push_string(buf: &mut Vec<u8>, s: &str) {
    buf.extend_from_slice(&(s.len() as u64).to_le_bytes());
    buf.extend_from_slice(s.as_bytes());
}

/// Writes a version 3 GGUF file holding only string metadata and a few
/// padding bytes where tensor data would start.
pub fn write_gguf(dir: &Path, file_name: &str, metadata: &[(&str, &str)]) -> PathBuf {
    let mut buf = Vec::new();
    buf.extend_from_slice(&GGUF_MAGIC.to_le_bytes());
    buf.extend_from_slice(&3u32.to_le_bytes());
    buf.extend_from_slice(&0u64.to_le_bytes());
    buf.extend_from_slice(&(metadata.len() as u64).to_le_bytes());
    for (key, value) in metadata {
        push_string(&mut buf, key);
        buf.extend_from_slice(&8u32.to_le_bytes());
        push_string(&mut buf, value);
    }
    buf.extend_from_slice(&[0u8; 32]);

    let path = dir.join(file_name);
    fs::write(&path, buf).unwrap();
    path
}

/// A small Phi-2 style model file.
pub fn write_phi_model(dir: &Path) -> PathBuf {
    write_gguf(
        dir,
        "phi-2.Q4_K_M.gguf",
        &[
            ("general.architecture", "phi2"),
            ("general.name", "Phi 2"),
            ("phi2.context_length", "2048"),
        ],
    )
}

/// Replies with `prompt|max_tokens` so tests can see what reached the backend.
pub struct EchoGenerator;

impl TextGenerator for EchoGenerator {
    fn name(&self) -> &str {
        "echo"
    }

    fn generate(&self, prompt: &str, max_tokens: usize) -> Result<String> {
        Ok(format!("{}|{}", prompt, max_tokens))
    }
}

/// Fails every generation.
pub struct BrokenGenerator;

impl TextGenerator for BrokenGenerator {
    fn name(&self) -> &str {
        "broken"
    }

    fn generate(&self, _prompt: &str, _max_tokens: usize) -> Result<String> {
        Err(BridgeError::Generation("decode failed".to_string()))
    }
}

fn load_echo(_path: &Path, _settings: &Settings) -> Result<Box<dyn TextGenerator>> {
    Ok(Box::new(EchoGenerator))
}

fn load_broken(_path: &Path, _settings: &Settings) -> Result<Box<dyn TextGenerator>> {
    Ok(Box::new(BrokenGenerator))
}

fn refuse_load(path: &Path, _settings: &Settings) -> Result<Box<dyn TextGenerator>> {
    Err(BridgeError::ModelLoad(format!("cannot load {}", path.display())))
}

pub fn echo_loader() -> GeneratorLoader {
    Box::new(load_echo)
}

pub fn broken_loader() -> GeneratorLoader {
    Box::new(load_broken)
}

pub fn refusing_loader() -> GeneratorLoader {
    Box::new(refuse_load)
}
