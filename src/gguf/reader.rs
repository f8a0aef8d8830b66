use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::Path;

use byteorder::{LittleEndian, ReadBytesExt};
use tracing::debug;

use super::types::{
    GgufError, GgufHeader, GgufValue, GgufValueType, ARRAY_PREVIEW_LEN, GGUF_MAGIC,
    MAX_SUPPORTED_VERSION,
};

/// Strings longer than this mean the file is corrupt
const MAX_STRING_LEN: u64 = 64 * 1024 * 1024;

/// Reads the header and metadata of the GGUF file at `path`.
pub fn read_header<P: AsRef<Path>>(path: P) -> Result<GgufHeader, GgufError> {
    let file = File::open(path.as_ref())?;
    let mut reader = BufReader::new(file);
    let header = parse_header(&mut reader)?;
    debug!(
        path = %path.as_ref().display(),
        version = header.version,
        tensors = header.tensor_count,
        keys = header.metadata.len(),
        "Read GGUF header"
    );
    Ok(header)
}

/// Parses a GGUF header from any seekable byte source.
pub fn parse_header<R: Read + Seek>(reader: &mut R) -> Result<GgufHeader, GgufError> {
    let magic = reader.read_u32::<LittleEndian>()?;
    if magic != GGUF_MAGIC {
        return Err(GgufError::InvalidMagic(magic));
    }

    let version = reader.read_u32::<LittleEndian>()?;
    if version == 0 || version > MAX_SUPPORTED_VERSION {
        return Err(GgufError::UnsupportedVersion(version));
    }

    let tensor_count = read_len(reader, version)?;
    let metadata_count = read_len(reader, version)?;

    let mut metadata = BTreeMap::new();
    for _ in 0..metadata_count {
        let key = read_string(reader, version)?;
        let value_type = GgufValueType::try_from(reader.read_u32::<LittleEndian>()?)?;
        let value = read_value(reader, value_type, version)?;
        metadata.insert(key, value);
    }

    Ok(GgufHeader {
        version,
        tensor_count,
        metadata,
    })
}

// Version 1 used 32-bit counts and string lengths; later versions use 64-bit.
fn read_len<R: Read>(reader: &mut R, version: u32) -> Result<u64, GgufError> {
    Ok(if version >= 2 {
        reader.read_u64::<LittleEndian>()?
    } else {
        reader.read_u32::<LittleEndian>()? as u64
    })
}

fn read_string<R: Read>(reader: &mut R, version: u32) -> Result<String, GgufError> {
    let len = read_len(reader, version)?;
    if len > MAX_STRING_LEN {
        return Err(GgufError::InvalidFormat(format!("string length {} too large", len)));
    }
    let mut buffer = vec![0u8; len as usize];
    reader.read_exact(&mut buffer)?;
    String::from_utf8(buffer)
        .map_err(|e| GgufError::InvalidFormat(format!("Invalid UTF-8 in string: {}", e)))
}

fn skip_string<R: Read + Seek>(reader: &mut R, version: u32) -> Result<(), GgufError> {
    let len = read_len(reader, version)?;
    let offset = i64::try_from(len)
        .map_err(|_| GgufError::InvalidFormat(format!("string length {} too large", len)))?;
    reader.seek(SeekFrom::Current(offset))?;
    Ok(())
}

fn fixed_size(value_type: GgufValueType) -> Option<u64> {
    match value_type {
        GgufValueType::Uint8 | GgufValueType::Int8 | GgufValueType::Bool => Some(1),
        GgufValueType::Uint16 | GgufValueType::Int16 => Some(2),
        GgufValueType::Uint32 | GgufValueType::Int32 | GgufValueType::Float32 => Some(4),
        GgufValueType::Uint64 | GgufValueType::Int64 | GgufValueType::Float64 => Some(8),
        GgufValueType::String | GgufValueType::Array => None,
    }
}

fn read_value<R: Read + Seek>(
    reader: &mut R,
    value_type: GgufValueType,
    version: u32,
) -> Result<GgufValue, GgufError> {
    Ok(match value_type {
        GgufValueType::Uint8 => GgufValue::Int(reader.read_u8()? as i64),
        GgufValueType::Int8 => GgufValue::Int(reader.read_i8()? as i64),
        GgufValueType::Uint16 => GgufValue::Int(reader.read_u16::<LittleEndian>()? as i64),
        GgufValueType::Int16 => GgufValue::Int(reader.read_i16::<LittleEndian>()? as i64),
        GgufValueType::Uint32 => GgufValue::Int(reader.read_u32::<LittleEndian>()? as i64),
        GgufValueType::Int32 => GgufValue::Int(reader.read_i32::<LittleEndian>()? as i64),
        GgufValueType::Uint64 => {
            let value = reader.read_u64::<LittleEndian>()?;
            GgufValue::Int(i64::try_from(value).map_err(|_| {
                GgufError::InvalidFormat(format!("uint64 value {} out of range", value))
            })?)
        }
        GgufValueType::Int64 => GgufValue::Int(reader.read_i64::<LittleEndian>()?),
        GgufValueType::Float32 => GgufValue::Float(reader.read_f32::<LittleEndian>()? as f64),
        GgufValueType::Float64 => GgufValue::Float(reader.read_f64::<LittleEndian>()?),
        GgufValueType::Bool => GgufValue::Bool(reader.read_u8()? != 0),
        GgufValueType::String => GgufValue::String(read_string(reader, version)?),
        GgufValueType::Array => read_array(reader, version)?,
    })
}

/// Reads an array, keeping only a short preview. Vocabulary arrays hold
/// hundreds of thousands of entries and are not needed before loading.
/// Arrays of arrays are rejected, as llama.cpp does.
fn read_array<R: Read + Seek>(reader: &mut R, version: u32) -> Result<GgufValue, GgufError> {
    let element_type = GgufValueType::try_from(reader.read_u32::<LittleEndian>()?)?;
    if element_type == GgufValueType::Array {
        return Err(GgufError::InvalidFormat("nested arrays are not supported".to_string()));
    }
    let count = read_len(reader, version)?;
    let preview = count.min(ARRAY_PREVIEW_LEN as u64);

    let mut items = Vec::with_capacity(preview as usize);
    for _ in 0..preview {
        items.push(read_value(reader, element_type, version)?);
    }

    let remaining = count - preview;
    match fixed_size(element_type) {
        Some(size) => {
            let skip = remaining
                .checked_mul(size)
                .and_then(|bytes| i64::try_from(bytes).ok())
                .ok_or_else(|| GgufError::InvalidFormat(format!("array length {} too large", count)))?;
            reader.seek(SeekFrom::Current(skip))?;
        }
        None => {
            for _ in 0..remaining {
                skip_string(reader, version)?;
            }
        }
    }

    Ok(GgufValue::Array(items, count))
}
