use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The magic number that identifies GGUF files
pub const GGUF_MAGIC: u32 = 0x46554747; // "GGUF" in ASCII

/// Highest container version this probe understands
pub const MAX_SUPPORTED_VERSION: u32 = 3;

/// Arrays longer than this keep only their first elements
pub const ARRAY_PREVIEW_LEN: usize = 8;

/// GGUF metadata value types that can be stored in a GGUF file
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum GgufValue {
    /// String value type for text data
    String(String),
    /// All integer widths, widened to i64
    Int(i64),
    /// Both float widths, widened to f64
    Float(f64),
    Bool(bool),
    /// Leading elements of an array plus its total length
    Array(Vec<GgufValue>, u64),
}

impl GgufValue {
    /// Attempts to convert the value to an integer
    pub fn as_int(&self) -> Option<i64> {
        match self {
            GgufValue::Int(i) => Some(*i),
            GgufValue::Float(f) => Some(*f as i64),
            GgufValue::String(s) => s.parse().ok(),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            GgufValue::String(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for GgufValue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            GgufValue::String(s) => write!(f, "{}", s),
            GgufValue::Int(i) => write!(f, "{}", i),
            GgufValue::Float(fl) => write!(f, "{}", fl),
            GgufValue::Bool(b) => write!(f, "{}", b),
            GgufValue::Array(items, total) => {
                let shown = items.iter().map(|v| v.to_string()).collect::<Vec<_>>().join(", ");
                if (items.len() as u64) < *total {
                    write!(f, "[{} ... out of {}]", shown, total)
                } else {
                    write!(f, "[{}]", shown)
                }
            }
        }
    }
}

/// Value type identifiers from the GGUF format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GgufValueType {
    Uint8 = 0,
    Int8 = 1,
    Uint16 = 2,
    Int16 = 3,
    Uint32 = 4,
    Int32 = 5,
    Float32 = 6,
    Bool = 7,
    String = 8,
    Array = 9,
    Uint64 = 10,
    Int64 = 11,
    Float64 = 12,
}

impl TryFrom<u32> for GgufValueType {
    type Error = GgufError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Ok(match value {
            0 => GgufValueType::Uint8,
            1 => GgufValueType::Int8,
            2 => GgufValueType::Uint16,
            3 => GgufValueType::Int16,
            4 => GgufValueType::Uint32,
            5 => GgufValueType::Int32,
            6 => GgufValueType::Float32,
            7 => GgufValueType::Bool,
            8 => GgufValueType::String,
            9 => GgufValueType::Array,
            10 => GgufValueType::Uint64,
            11 => GgufValueType::Int64,
            12 => GgufValueType::Float64,
            other => {
                return Err(GgufError::InvalidFormat(format!("Unknown value type: {}", other)))
            }
        })
    }
}

/// Custom error types for GGUF operations
#[derive(Debug, Error)]
pub enum GgufError {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("not a GGUF file (magic {0:#010x})")]
    InvalidMagic(u32),
    #[error("unsupported GGUF version {0}")]
    UnsupportedVersion(u32),
    #[error("Invalid GGUF format: {0}")]
    InvalidFormat(String),
    #[error("Metadata key not found: {0}")]
    MetadataNotFound(String),
}

/// Everything in a GGUF file that precedes the tensor infos.
#[derive(Debug, Clone, Serialize)]
pub struct GgufHeader {
    pub version: u32,
    pub tensor_count: u64,
    pub metadata: BTreeMap<String, GgufValue>,
}

impl GgufHeader {
    pub fn get(&self, key: &str) -> Result<&GgufValue, GgufError> {
        self.metadata
            .get(key)
            .ok_or_else(|| GgufError::MetadataNotFound(key.to_string()))
    }

    /// `general.name`, if present
    pub fn name(&self) -> Option<&str> {
        self.metadata.get("general.name").and_then(GgufValue::as_str)
    }

    /// `general.architecture`, if present (e.g. "llama", "phi2", "gemma2")
    pub fn architecture(&self) -> Option<&str> {
        self.metadata.get("general.architecture").and_then(GgufValue::as_str)
    }

    /// Training context length, stored under `<arch>.context_length`
    pub fn context_length(&self) -> Option<u64> {
        let arch = self.architecture()?;
        self.metadata
            .get(&format!("{}.context_length", arch))
            .and_then(GgufValue::as_int)
            .and_then(|v| u64::try_from(v).ok())
    }
}
