//! # llama_module
//!
//! Native library loaded by the JVM (`System.loadLibrary("llama_module")`)
//! that forwards prompts to a local llama.cpp model and scores profile
//! compatibility.
//!
//! ## Layers
//!
//! - `ffi`: `extern "system"` JNI symbols. Converts Java values, raises
//!   exceptions, keeps panics from crossing the boundary.
//! - `bridge`: the operations themselves over Rust types, plus the
//!   process-wide engine.
//! - `llm`: model lifecycle (`ModelEngine`) and the `TextGenerator` backends.
//!   The llama.cpp backend is behind the `llama` cargo feature; without it a
//!   placeholder generator answers every prompt with `"Generated response"`.
//! - `gguf`: header probe that rejects non-model files before loading.
//! - `compat`: compatibility predictor.
//! - `config`, `logging`, `error`: settings, tracing setup and error types.

pub mod bridge;
pub mod compat;
pub mod config;
pub mod error;
pub mod ffi;
pub mod gguf;
pub mod llm;
pub mod logging;

pub use error::{BridgeError, Result};
pub use llm::{ModelEngine, ModelStatus, PLACEHOLDER_RESPONSE};
