pub mod backend;
pub mod engine;
#[cfg(feature = "llama")]
pub mod llama;

pub use backend::{PlaceholderGenerator, TextGenerator, PLACEHOLDER_RESPONSE};
pub use engine::{GeneratorLoader, ModelEngine, ModelStatus};
#[cfg(feature = "llama")]
pub use llama::LlamaGenerator;
