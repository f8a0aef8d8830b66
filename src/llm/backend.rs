use crate::error::Result;

/// Reply returned whenever no inference library is attached.
pub const PLACEHOLDER_RESPONSE: &str = "Generated response";

/// Something that turns a prompt into a completion.
///
/// Implementations are shared between JVM threads, so they must be
/// `Send + Sync` and do their own locking if decoding mutates state.
pub trait TextGenerator: Send + Sync {
    /// Short backend name for status reports and logs
    fn name(&self) -> &str;

    /// Generates at most `max_tokens` tokens continuing `prompt`.
    fn generate(&self, prompt: &str, max_tokens: usize) -> Result<String>;
}

/// Generator used until a real model is attached, and in builds without
/// the `llama` feature. The prompt is ignored.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlaceholderGenerator;

impl TextGenerator for PlaceholderGenerator {
    fn name(&self) -> &str {
        "placeholder"
    }

    fn generate(&self, _prompt: &str, _max_tokens: usize) -> Result<String> {
        Ok(PLACEHOLDER_RESPONSE.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_ignores_input() {
        let generator = PlaceholderGenerator;
        for prompt in ["hello", "", "こんにちは 👋", "\0"] {
            assert_eq!(generator.generate(prompt, 10).unwrap(), PLACEHOLDER_RESPONSE);
        }
        assert_eq!(generator.generate("hello", 0).unwrap(), "Generated response");
    }
}
