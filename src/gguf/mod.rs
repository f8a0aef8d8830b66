//! Minimal GGUF probe.
//!
//! Only the header and the metadata key/value section are read. This is
//! enough to reject files that are not models and to report the model's
//! name, architecture and context length before handing the path to the
//! inference library.

mod reader;
mod types;

pub use reader::{parse_header, read_header};
pub use types::{GgufError, GgufHeader, GgufValue, GgufValueType, GGUF_MAGIC};
