//! Decodes the contents of `<DataArray>` elements
//!
//! Binary arrays are stored as a header followed by the data. Without
//! compression the header holds a single integer, the number of bytes.
//! With zlib compression it holds `[nblock, block_size, last_block_size,
//! compressed_size_0, ..., compressed_size_(nblock-1)]`. The integer type
//! of the header is given by the `header_type` attribute of `VTKFile`.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use flate2::read::ZlibDecoder;
use std::io::Read;

/// Defines the numeric types of VTK arrays
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NumberType {
    Int8,
    UInt8,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Int64,
    UInt64,
    Float32,
    Float64,
}

impl NumberType {
    /// Parses the `type` attribute of a DataArray
    pub fn from_vtk(name: &str) -> Option<Self> {
        match name {
            "Int8" | "Char" => Some(NumberType::Int8),
            "UInt8" | "UnsignedChar" => Some(NumberType::UInt8),
            "Int16" | "Short" => Some(NumberType::Int16),
            "UInt16" | "UnsignedShort" => Some(NumberType::UInt16),
            "Int32" | "Int" => Some(NumberType::Int32),
            "UInt32" | "UnsignedInt" => Some(NumberType::UInt32),
            "Int64" | "Long" | "LongLong" | "IdType" => Some(NumberType::Int64),
            "UInt64" | "UnsignedLong" | "UnsignedLongLong" => Some(NumberType::UInt64),
            "Float32" | "Float" => Some(NumberType::Float32),
            "Float64" | "Double" => Some(NumberType::Float64),
            _ => None,
        }
    }

    /// Returns the size in bytes of one value
    pub fn size(self) -> usize {
        match self {
            NumberType::Int8 | NumberType::UInt8 => 1,
            NumberType::Int16 | NumberType::UInt16 => 2,
            NumberType::Int32 | NumberType::UInt32 | NumberType::Float32 => 4,
            NumberType::Int64 | NumberType::UInt64 | NumberType::Float64 => 8,
        }
    }

    /// Converts raw bytes into values
    fn decode(self, bytes: &[u8], big_endian: bool) -> Vec<f64> {
        bytes
            .chunks_exact(self.size())
            .map(|c| self.decode_one(c, big_endian))
            .collect()
    }

    /// Converts the bytes of a single value
    fn decode_one(self, c: &[u8], big_endian: bool) -> f64 {
        macro_rules! conv {
            ($t:ty, $n:expr) => {{
                let mut buf = [0u8; $n];
                buf.copy_from_slice(c);
                if big_endian {
                    <$t>::from_be_bytes(buf) as f64
                } else {
                    <$t>::from_le_bytes(buf) as f64
                }
            }};
        }
        match self {
            NumberType::Int8 => conv!(i8, 1),
            NumberType::UInt8 => conv!(u8, 1),
            NumberType::Int16 => conv!(i16, 2),
            NumberType::UInt16 => conv!(u16, 2),
            NumberType::Int32 => conv!(i32, 4),
            NumberType::UInt32 => conv!(u32, 4),
            NumberType::Int64 => conv!(i64, 8),
            NumberType::UInt64 => conv!(u64, 8),
            NumberType::Float32 => conv!(f32, 4),
            NumberType::Float64 => conv!(f64, 8),
        }
    }
}

/// Holds the file-wide settings required to decode binary arrays
#[derive(Clone, Copy, Debug)]
pub struct BinaryLayout {
    /// Big endian byte order
    pub big_endian: bool,

    /// Uses 8-byte (UInt64) instead of 4-byte (UInt32) header integers
    pub header_u64: bool,

    /// The arrays are compressed with zlib
    pub compressed: bool,
}

impl BinaryLayout {
    /// Returns the default layout: little endian, UInt32 header, no compression
    pub fn new() -> Self {
        BinaryLayout {
            big_endian: false,
            header_u64: false,
            compressed: false,
        }
    }

    /// Returns the size of one header integer
    fn header_size(&self) -> usize {
        if self.header_u64 {
            8
        } else {
            4
        }
    }

    /// Reads the i-th header integer
    fn header_value(&self, bytes: &[u8], i: usize) -> Result<usize, String> {
        let size = self.header_size();
        let start = i.checked_mul(size).ok_or_else(corrupt_header)?;
        let chunk = bytes
            .get(start..start + size)
            .ok_or_else(|| "binary data array header is truncated".to_string())?;
        let kind = if self.header_u64 {
            NumberType::UInt64
        } else {
            NumberType::UInt32
        };
        Ok(kind.decode_one(chunk, self.big_endian) as usize)
    }
}

/// Decodes an ASCII data array
pub fn decode_ascii(text: &str, kind: NumberType) -> Result<Vec<f64>, String> {
    let integer = !matches!(kind, NumberType::Float32 | NumberType::Float64);
    text.split_ascii_whitespace()
        .map(|word| {
            let value = word
                .parse::<f64>()
                .map_err(|_| format!("cannot parse '{}' as a number", word))?;
            if integer && value.fract() != 0.0 {
                return Err(format!("expected an integer but found '{}'", word));
            }
            Ok(value)
        })
        .collect()
}

/// Decodes a base64 data array (inline binary or appended with base64 encoding)
///
/// Only the characters needed by this array are consumed; thus `text` may
/// extend past the end of the array (appended data).
pub fn decode_base64(text: &str, kind: NumberType, layout: &BinaryLayout) -> Result<Vec<f64>, String> {
    let text: String = text.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    let bytes = if layout.compressed {
        base64_compressed_payload(&text, layout)?
    } else {
        base64_plain_payload(&text, layout)?
    };
    check_multiple(&bytes, kind)?;
    Ok(kind.decode(&bytes, layout.big_endian))
}

/// Decodes an appended raw data array starting at its offset
pub fn decode_raw(bytes: &[u8], kind: NumberType, layout: &BinaryLayout) -> Result<Vec<f64>, String> {
    let payload = if layout.compressed {
        let nblock = layout.header_value(bytes, 0)?;
        let header_len = nblock
            .checked_add(3)
            .and_then(|n| n.checked_mul(layout.header_size()))
            .ok_or_else(corrupt_header)?;
        let header = bytes
            .get(..header_len)
            .ok_or_else(|| "binary data array header is truncated".to_string())?;
        inflate_blocks(header, &bytes[header_len..], layout)?
    } else {
        let nbyte = layout.header_value(bytes, 0)?;
        let start = layout.header_size();
        let end = start.checked_add(nbyte).ok_or_else(corrupt_header)?;
        bytes
            .get(start..end)
            .ok_or_else(|| "binary data array is truncated".to_string())?
            .to_vec()
    };
    check_multiple(&payload, kind)?;
    Ok(kind.decode(&payload, layout.big_endian))
}

/// Returns the message for header values that overflow when combined
fn corrupt_header() -> String {
    "binary data array header is corrupt".to_string()
}

/// Returns the number of base64 characters encoding `nbyte` bytes
fn base64_len(nbyte: usize) -> Result<usize, String> {
    nbyte
        .checked_add(2)
        .and_then(|n| (n / 3).checked_mul(4))
        .ok_or_else(corrupt_header)
}

/// Decodes a base64 chunk
fn base64_decode(text: &str) -> Result<Vec<u8>, String> {
    BASE64
        .decode(text)
        .map_err(|e| format!("invalid base64 data array: {}", e))
}

/// Returns the slice `text[start..end]` or an error if the data is truncated
fn slice(text: &str, start: usize, end: usize) -> Result<&str, String> {
    text.get(start..end)
        .ok_or_else(|| "base64 data array is truncated".to_string())
}

/// Decodes an uncompressed base64 array
///
/// Writers either encode the header and the data together or separately.
/// A padded header chunk indicates the latter.
fn base64_plain_payload(text: &str, layout: &BinaryLayout) -> Result<Vec<u8>, String> {
    let hsize = layout.header_size();
    let hlen = base64_len(hsize)?;
    let header_chunk = slice(text, 0, hlen)?;
    if header_chunk.ends_with('=') {
        let header = base64_decode(header_chunk)?;
        let nbyte = layout.header_value(&header, 0)?;
        let end = hlen.checked_add(base64_len(nbyte)?).ok_or_else(corrupt_header)?;
        let data = base64_decode(slice(text, hlen, end)?)?;
        data.get(..nbyte)
            .map(|d| d.to_vec())
            .ok_or_else(|| "binary data array is truncated".to_string())
    } else {
        let first = base64_decode(header_chunk)?;
        let nbyte = layout.header_value(&first, 0)?;
        let total = hsize.checked_add(nbyte).ok_or_else(corrupt_header)?;
        let all = base64_decode(slice(text, 0, base64_len(total)?)?)?;
        all.get(hsize..total)
            .map(|d| d.to_vec())
            .ok_or_else(|| "binary data array is truncated".to_string())
    }
}

/// Decodes a zlib-compressed base64 array (header and data are encoded separately)
fn base64_compressed_payload(text: &str, layout: &BinaryLayout) -> Result<Vec<u8>, String> {
    let hsize = layout.header_size();
    let first = base64_decode(slice(text, 0, base64_len(hsize)?)?)?;
    let nblock = layout.header_value(&first, 0)?;
    let header_len = nblock
        .checked_add(3)
        .and_then(|n| n.checked_mul(hsize))
        .ok_or_else(corrupt_header)?;
    let hlen = base64_len(header_len)?;
    let header = base64_decode(slice(text, 0, hlen)?)?;
    let mut compressed_size: usize = 0;
    for b in 0..nblock {
        let size = layout.header_value(&header, 3 + b)?;
        compressed_size = compressed_size.checked_add(size).ok_or_else(corrupt_header)?;
    }
    let end = hlen.checked_add(base64_len(compressed_size)?).ok_or_else(corrupt_header)?;
    let data = base64_decode(slice(text, hlen, end)?)?;
    inflate_blocks(&header, &data, layout)
}

/// Decompresses all blocks described by the header
fn inflate_blocks(header: &[u8], data: &[u8], layout: &BinaryLayout) -> Result<Vec<u8>, String> {
    let nblock = layout.header_value(header, 0)?;
    let block_size = layout.header_value(header, 1)?;
    let last_block_size = layout.header_value(header, 2)?;
    let expected = if nblock == 0 {
        Some(0)
    } else if last_block_size == 0 {
        nblock.checked_mul(block_size)
    } else {
        (nblock - 1)
            .checked_mul(block_size)
            .and_then(|n| n.checked_add(last_block_size))
    }
    .ok_or_else(corrupt_header)?;
    let mut payload = Vec::new();
    let mut start: usize = 0;
    for b in 0..nblock {
        let size = layout.header_value(header, 3 + b)?;
        let end = start.checked_add(size).ok_or_else(corrupt_header)?;
        let block = data
            .get(start..end)
            .ok_or_else(|| "compressed data array is truncated".to_string())?;
        let mut decoder = ZlibDecoder::new(block);
        decoder
            .read_to_end(&mut payload)
            .map_err(|e| format!("cannot decompress data array: {}", e))?;
        start = end;
    }
    if payload.len() != expected {
        return Err(format!(
            "decompressed data array has {} bytes but the header announces {}",
            payload.len(),
            expected
        ));
    }
    Ok(payload)
}

/// Checks that the number of bytes is a multiple of the value size
fn check_multiple(bytes: &[u8], kind: NumberType) -> Result<(), String> {
    if bytes.len() % kind.size() != 0 {
        return Err(format!(
            "binary data array has {} bytes, which is not a multiple of {}",
            bytes.len(),
            kind.size()
        ));
    }
    Ok(())
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::{decode_ascii, decode_base64, decode_raw, BinaryLayout, NumberType};
    use base64::engine::general_purpose::STANDARD as BASE64;
    use base64::Engine as _;
    use flate2::write::ZlibEncoder;
    use flate2::Compression;
    use std::io::Write;

    fn f64_bytes(values: &[f64]) -> Vec<u8> {
        values.iter().flat_map(|v| v.to_le_bytes()).collect()
    }

    #[test]
    fn number_type_works() {
        assert_eq!(NumberType::from_vtk("Float64"), Some(NumberType::Float64));
        assert_eq!(NumberType::from_vtk("Int32"), Some(NumberType::Int32));
        assert_eq!(NumberType::from_vtk("String"), None);
        assert_eq!(NumberType::UInt8.size(), 1);
        assert_eq!(NumberType::Int64.size(), 8);
    }

    #[test]
    fn decode_ascii_works() {
        let values = decode_ascii(" 0.5 1e-3\n -2 ", NumberType::Float64).unwrap();
        assert_eq!(values, &[0.5, 1e-3, -2.0]);
        assert_eq!(
            decode_ascii("1 x", NumberType::Float32).err(),
            Some("cannot parse 'x' as a number".to_string())
        );
        assert_eq!(
            decode_ascii("1 2.5", NumberType::Int32).err(),
            Some("expected an integer but found '2.5'".to_string())
        );
    }

    #[test]
    fn decode_base64_handles_joint_and_separate_encoding() {
        let values = [1.5, -2.25, 1e10];
        let data = f64_bytes(&values);
        let header = (data.len() as u32).to_le_bytes();
        let layout = BinaryLayout::new();

        // header and data encoded together
        let mut joint = header.to_vec();
        joint.extend(&data);
        let text = BASE64.encode(&joint);
        assert_eq!(decode_base64(&text, NumberType::Float64, &layout).unwrap(), values);

        // header and data encoded separately (padded header chunk)
        let text = format!("{}{}", BASE64.encode(header), BASE64.encode(&data));
        assert_eq!(decode_base64(&text, NumberType::Float64, &layout).unwrap(), values);

        // trailing characters (appended data) are ignored
        let text = format!("{}{}AAAA", BASE64.encode(header), BASE64.encode(&data));
        assert_eq!(decode_base64(&text, NumberType::Float64, &layout).unwrap(), values);
    }

    #[test]
    fn decode_base64_compressed_works() {
        let values: Vec<f64> = (0..100).map(|i| i as f64 * 0.5).collect();
        let data = f64_bytes(&values);
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&data).unwrap();
        let compressed = encoder.finish().unwrap();
        let mut header = Vec::new();
        for v in [1u64, data.len() as u64, data.len() as u64, compressed.len() as u64] {
            header.extend(v.to_le_bytes());
        }
        let layout = BinaryLayout {
            big_endian: false,
            header_u64: true,
            compressed: true,
        };
        let text = format!("{}{}", BASE64.encode(&header), BASE64.encode(&compressed));
        assert_eq!(decode_base64(&text, NumberType::Float64, &layout).unwrap(), values);

        let mut raw = header.clone();
        raw.extend(&compressed);
        assert_eq!(decode_raw(&raw, NumberType::Float64, &layout).unwrap(), values);
    }

    #[test]
    fn decode_raw_works() {
        let ints: Vec<u8> = [3i32, -1, 7].iter().flat_map(|v| v.to_be_bytes()).collect();
        let mut raw = (ints.len() as u32).to_be_bytes().to_vec();
        raw.extend(&ints);
        raw.extend([0xff, 0xff]); // next array
        let layout = BinaryLayout {
            big_endian: true,
            header_u64: false,
            compressed: false,
        };
        assert_eq!(decode_raw(&raw, NumberType::Int32, &layout).unwrap(), &[3.0, -1.0, 7.0]);
        assert_eq!(
            decode_raw(&raw[..8], NumberType::Int32, &layout).err(),
            Some("binary data array is truncated".to_string())
        );
    }

    #[test]
    fn decode_base64_captures_corrupt_headers() {
        let layout = BinaryLayout {
            big_endian: false,
            header_u64: true,
            compressed: false,
        };
        let text = BASE64.encode(u64::MAX.to_le_bytes());
        assert_eq!(
            decode_base64(&text, NumberType::Float64, &layout).err(),
            Some("binary data array header is corrupt".to_string())
        );

        let layout = BinaryLayout {
            big_endian: false,
            header_u64: true,
            compressed: true,
        };
        assert_eq!(
            decode_base64(&text, NumberType::Float64, &layout).err(),
            Some("binary data array header is corrupt".to_string())
        );
    }

    #[test]
    fn decode_raw_captures_corrupt_headers() {
        let layout = BinaryLayout {
            big_endian: false,
            header_u64: true,
            compressed: true,
        };
        let header = |values: &[u64]| -> Vec<u8> { values.iter().flat_map(|v| v.to_le_bytes()).collect() };

        // the number of blocks overflows the header length
        assert_eq!(
            decode_raw(&header(&[u64::MAX, 8, 0, 0]), NumberType::Float64, &layout).err(),
            Some("binary data array header is corrupt".to_string())
        );

        // the announced size overflows
        assert_eq!(
            decode_raw(&header(&[2, u64::MAX, 0, 0, 0]), NumberType::Float64, &layout).err(),
            Some("binary data array header is corrupt".to_string())
        );

        // a huge block size is reported without allocating it
        assert!(decode_raw(&header(&[1, 1 << 62, 0, 0]), NumberType::Float64, &layout).is_err());

        // the data size overflows (uncompressed)
        let layout = BinaryLayout::new();
        let mut bytes = u32::MAX.to_le_bytes().to_vec();
        bytes.extend([0; 8]);
        assert_eq!(
            decode_raw(&bytes, NumberType::Float64, &layout).err(),
            Some("binary data array is truncated".to_string())
        );
    }
}
