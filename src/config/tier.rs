use serde::{Deserialize, Serialize};

/// Model size presets, picked from what the device can afford.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelTier {
    /// ~400 MB models for quick replies on constrained devices
    Instant,
    /// ~800 MB models for general chat
    Balanced,
    /// ~1.2 GB models for longer conversations
    Premium,
}

/// Generation limits that come with a tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TierPreset {
    pub max_tokens: usize,
    pub context_window: usize,
    /// Approximate memory the model needs once loaded, in MB
    pub ram_required_mb: u64,
}

impl ModelTier {
    pub fn preset(self) -> TierPreset {
        match self {
            ModelTier::Instant => TierPreset {
                max_tokens: 50,
                context_window: 1024,
                ram_required_mb: 600,
            },
            ModelTier::Balanced => TierPreset {
                max_tokens: 100,
                context_window: 2048,
                ram_required_mb: 1000,
            },
            ModelTier::Premium => TierPreset {
                max_tokens: 150,
                context_window: 4096,
                ram_required_mb: 1400,
            },
        }
    }

    /// Picks the largest tier the device can run comfortably.
    pub fn select(ram_mb: u64, gpu: bool, slow_connection: bool) -> Self {
        if ram_mb < 2000 || slow_connection {
            return ModelTier::Instant;
        }
        if ram_mb < 6000 || !gpu {
            return ModelTier::Balanced;
        }
        ModelTier::Premium
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_low_memory_or_slow_link_gets_instant() {
        assert_eq!(ModelTier::select(1500, true, false), ModelTier::Instant);
        assert_eq!(ModelTier::select(8000, true, true), ModelTier::Instant);
    }

    #[test]
    fn test_mid_range_gets_balanced() {
        assert_eq!(ModelTier::select(4000, true, false), ModelTier::Balanced);
        assert_eq!(ModelTier::select(8000, false, false), ModelTier::Balanced);
    }

    #[test]
    fn test_large_device_with_gpu_gets_premium() {
        assert_eq!(ModelTier::select(6000, true, false), ModelTier::Premium);
        assert_eq!(ModelTier::Premium.preset().context_window, 4096);
    }
}
