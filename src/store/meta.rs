use std::path::Path;

use anyhow::Context as _;

use crate::foundation::error::{UmiError, UmiResult};

/// Byte order of a multi-byte element.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Endian {
    Little,
    Big,
}

/// Scalar element kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Kind {
    Bool,
    Int,
    UInt,
    Float,
}

/// Parsed NumPy-style dtype string (`<f8`, `|u1`, ...).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct DType {
    pub(crate) kind: Kind,
    pub(crate) size: usize,
    pub(crate) endian: Endian,
}

impl DType {
    pub(crate) fn parse(s: &str) -> UmiResult<Self> {
        let mut chars = s.chars();
        let (order, kind, size) = match (chars.next(), chars.next()) {
            (Some(o), Some(k)) => (o, k, chars.as_str()),
            _ => return Err(UmiError::store(format!("malformed dtype '{s}'"))),
        };
        let endian = match order {
            '<' | '|' => Endian::Little,
            '>' => Endian::Big,
            _ => return Err(UmiError::store(format!("malformed dtype '{s}'"))),
        };
        let size: usize = size
            .parse()
            .map_err(|_| UmiError::store(format!("malformed dtype '{s}'")))?;
        let kind = match (kind, size) {
            ('b', 1) => Kind::Bool,
            ('i', 1 | 2 | 4 | 8) => Kind::Int,
            ('u', 1 | 2 | 4 | 8) => Kind::UInt,
            ('f', 4 | 8) => Kind::Float,
            _ => return Err(UmiError::unsupported(format!("dtype '{s}'"))),
        };
        Ok(Self { kind, size, endian })
    }

    fn bytes<const N: usize>(&self, b: &[u8]) -> [u8; N] {
        let mut out = [0u8; N];
        out.copy_from_slice(&b[..N]);
        if self.endian == Endian::Big {
            out.reverse();
        }
        out
    }

    /// Decode one element as `f64`. `b` must hold at least `size` bytes.
    pub(crate) fn element_f64(&self, b: &[u8]) -> f64 {
        match (self.kind, self.size) {
            (Kind::Float, 4) => f64::from(f32::from_le_bytes(self.bytes::<4>(b))),
            (Kind::Float, _) => f64::from_le_bytes(self.bytes::<8>(b)),
            (Kind::Int | Kind::UInt | Kind::Bool, _) => self.element_i128(b) as f64,
        }
    }

    fn element_i128(&self, b: &[u8]) -> i128 {
        match (self.kind, self.size) {
            (Kind::Int, 1) => i128::from(b[0] as i8),
            (Kind::Int, 2) => i128::from(i16::from_le_bytes(self.bytes::<2>(b))),
            (Kind::Int, 4) => i128::from(i32::from_le_bytes(self.bytes::<4>(b))),
            (Kind::Int, _) => i128::from(i64::from_le_bytes(self.bytes::<8>(b))),
            (_, 1) => i128::from(b[0]),
            (_, 2) => i128::from(u16::from_le_bytes(self.bytes::<2>(b))),
            (_, 4) => i128::from(u32::from_le_bytes(self.bytes::<4>(b))),
            (_, _) => i128::from(u64::from_le_bytes(self.bytes::<8>(b))),
        }
    }

    /// Decode one integer element as `i64`.
    pub(crate) fn element_i64(&self, b: &[u8]) -> UmiResult<i64> {
        if self.kind == Kind::Float {
            return Err(UmiError::store("expected an integer array, found floats"));
        }
        i64::try_from(self.element_i128(b))
            .map_err(|_| UmiError::store("integer element does not fit in i64"))
    }

    /// Decode a packed buffer of elements as `f64`.
    pub(crate) fn decode_f64(&self, bytes: &[u8]) -> Vec<f64> {
        bytes
            .chunks_exact(self.size)
            .map(|b| self.element_f64(b))
            .collect()
    }

    /// Decode a packed buffer of integer elements as `i64`.
    pub(crate) fn decode_i64(&self, bytes: &[u8]) -> UmiResult<Vec<i64>> {
        bytes
            .chunks_exact(self.size)
            .map(|b| self.element_i64(b))
            .collect()
    }

    /// Encode a JSON `fill_value` into one element; `None` for `null`.
    fn encode_fill(&self, v: &serde_json::Value) -> UmiResult<Option<Vec<u8>>> {
        use serde_json::Value;

        let mut out = match (self.kind, v) {
            (_, Value::Null) => return Ok(None),
            (Kind::Float, Value::String(s)) => {
                let x = match s.as_str() {
                    "NaN" => f64::NAN,
                    "Infinity" => f64::INFINITY,
                    "-Infinity" => f64::NEG_INFINITY,
                    _ => return Err(UmiError::store(format!("bad float fill_value '{s}'"))),
                };
                self.float_bytes(x)
            }
            (Kind::Float, Value::Number(n)) => self.float_bytes(n.as_f64().unwrap_or(0.0)),
            (Kind::Bool, Value::Bool(b)) => vec![u8::from(*b)],
            (Kind::Int | Kind::UInt | Kind::Bool, Value::Number(n)) => {
                let x = n
                    .as_i64()
                    .map(i128::from)
                    .or_else(|| n.as_u64().map(i128::from))
                    .ok_or_else(|| UmiError::store(format!("bad integer fill_value {n}")))?;
                x.to_le_bytes()[..self.size].to_vec()
            }
            _ => return Err(UmiError::store(format!("bad fill_value {v}"))),
        };
        if self.endian == Endian::Big {
            out.reverse();
        }
        Ok(Some(out))
    }

    fn float_bytes(&self, x: f64) -> Vec<u8> {
        if self.size == 4 {
            (x as f32).to_le_bytes().to_vec()
        } else {
            x.to_le_bytes().to_vec()
        }
    }
}

/// `compressor` entry of `.zarray`.
#[derive(Clone, Debug, PartialEq, serde::Deserialize)]
pub(crate) struct CompressorConfig {
    /// numcodecs codec id (`blosc`, `lz4`, `imagecodecs_jpeg`, ...).
    pub(crate) id: String,
    #[serde(flatten)]
    pub(crate) params: serde_json::Map<String, serde_json::Value>,
}

fn default_order() -> String {
    "C".to_string()
}

#[derive(Debug, serde::Deserialize)]
struct RawArrayMeta {
    zarr_format: u32,
    shape: Vec<u64>,
    chunks: Vec<u64>,
    dtype: serde_json::Value,
    #[serde(default)]
    compressor: Option<CompressorConfig>,
    #[serde(default)]
    fill_value: serde_json::Value,
    #[serde(default = "default_order")]
    order: String,
    #[serde(default)]
    filters: Option<Vec<serde_json::Value>>,
    #[serde(default)]
    dimension_separator: Option<String>,
}

/// Validated Zarr v2 array metadata.
#[derive(Clone, Debug)]
pub(crate) struct ArrayMeta {
    pub(crate) shape: Vec<u64>,
    pub(crate) chunks: Vec<u64>,
    pub(crate) dtype: DType,
    pub(crate) compressor: Option<CompressorConfig>,
    /// One encoded element, or `None` when the fill value is `null`.
    pub(crate) fill: Option<Vec<u8>>,
    pub(crate) separator: char,
    /// Decoded size of one chunk.
    pub(crate) chunk_bytes: usize,
    /// Size of one frame-axis row inside a chunk.
    pub(crate) chunk_row_bytes: usize,
    /// Size of one frame-axis row of the whole array.
    pub(crate) row_bytes: usize,
}

/// Product of `dims` times `item`, rejected when it cannot be allocated.
fn byte_count(dims: &[u64], item: usize, what: &str) -> UmiResult<usize> {
    let too_large = || UmiError::store(format!("{what} {dims:?} is too large to address"));
    let mut n = item;
    for &d in dims {
        let d = usize::try_from(d).map_err(|_| too_large())?;
        n = n.checked_mul(d).ok_or_else(too_large)?;
    }
    if isize::try_from(n).is_err() {
        return Err(too_large());
    }
    Ok(n)
}

impl ArrayMeta {
    /// Read and validate `<dir>/.zarray`.
    pub(crate) fn read(dir: &Path) -> UmiResult<Self> {
        let path = dir.join(".zarray");
        let bytes = std::fs::read(&path)
            .with_context(|| format!("read array metadata '{}'", path.display()))?;
        Self::parse(&bytes).map_err(|e| match e {
            UmiError::Store(m) => UmiError::store(format!("{}: {m}", path.display())),
            UmiError::Unsupported(m) => {
                UmiError::unsupported(format!("{m} in '{}'", path.display()))
            }
            other => other,
        })
    }

    pub(crate) fn parse(bytes: &[u8]) -> UmiResult<Self> {
        let raw: RawArrayMeta = serde_json::from_slice(bytes)
            .map_err(|e| UmiError::store(format!("invalid .zarray json: {e}")))?;

        if raw.zarr_format != 2 {
            return Err(UmiError::unsupported(format!("zarr_format {}", raw.zarr_format)));
        }
        if raw.shape.len() != raw.chunks.len() {
            return Err(UmiError::store(format!(
                "shape has {} dims but chunks has {}",
                raw.shape.len(),
                raw.chunks.len()
            )));
        }
        if raw.chunks.contains(&0) {
            return Err(UmiError::store("chunk sizes must be > 0"));
        }
        if raw.order != "C" {
            return Err(UmiError::unsupported(format!("memory order '{}'", raw.order)));
        }
        if raw.filters.as_ref().is_some_and(|f| !f.is_empty()) {
            return Err(UmiError::unsupported("array filters"));
        }
        let dtype = match &raw.dtype {
            serde_json::Value::String(s) => DType::parse(s)?,
            other => return Err(UmiError::unsupported(format!("structured dtype {other}"))),
        };
        let separator = match raw.dimension_separator.as_deref() {
            None | Some(".") => '.',
            Some("/") => '/',
            Some(other) => {
                return Err(UmiError::store(format!("invalid dimension_separator '{other}'")));
            }
        };
        let fill = dtype.encode_fill(&raw.fill_value)?;

        let chunk_bytes = byte_count(&raw.chunks, dtype.size, "chunks")?;
        let chunk_row = raw.chunks.get(1..).unwrap_or_default();
        let chunk_row_bytes = byte_count(chunk_row, dtype.size, "chunk row")?;
        let row_bytes = byte_count(raw.shape.get(1..).unwrap_or_default(), dtype.size, "row")?;

        Ok(Self {
            shape: raw.shape,
            chunks: raw.chunks,
            dtype,
            compressor: raw.compressor,
            fill,
            separator,
            chunk_bytes,
            chunk_row_bytes,
            row_bytes,
        })
    }

    /// Number of elements in one chunk.
    pub(crate) fn chunk_elems(&self) -> usize {
        self.chunk_bytes / self.dtype.size
    }

    /// Storage key of a chunk, e.g. `3.0.0.0`.
    pub(crate) fn chunk_key(&self, coords: &[u64]) -> String {
        if coords.is_empty() {
            return "0".to_string();
        }
        let parts: Vec<String> = coords.iter().map(|c| c.to_string()).collect();
        parts.join(&self.separator.to_string())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/store/meta.rs"]
mod tests;
