use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::foundation::error::{UmiError, UmiResult};
use crate::store::codec::decode_chunk;
use crate::store::meta::{ArrayMeta, DType};

/// Decoded chunks of the current frame-axis chunk row.
///
/// `None` marks a chunk that is absent on disk and has no fill value.
#[derive(Debug, Default)]
struct ChunkRowCache {
    row: Option<u64>,
    chunks: HashMap<Vec<u64>, Option<Arc<Vec<u8>>>>,
}

/// One Zarr v2 array opened for row-wise reads along its first (frame) axis.
#[derive(Debug)]
pub(crate) struct ZarrArray {
    name: String,
    dir: PathBuf,
    meta: ArrayMeta,
    cache: ChunkRowCache,
}

impl ZarrArray {
    /// Open `<root>/<name>` (e.g. `data/robot0_eef_pos`).
    pub(crate) fn open(root: &Path, name: &str) -> UmiResult<Self> {
        let dir = name
            .split('/')
            .fold(root.to_path_buf(), |p, part| p.join(part));
        let meta = ArrayMeta::read(&dir)?;
        if meta.shape.is_empty() {
            return Err(UmiError::store(format!("array '{name}' is 0-dimensional")));
        }
        tracing::debug!(
            array = name,
            shape = ?meta.shape,
            chunks = ?meta.chunks,
            compressor = meta.compressor.as_ref().map(|c| c.id.as_str()).unwrap_or("none"),
            "opened array"
        );
        Ok(Self {
            name: name.to_string(),
            dir,
            meta,
            cache: ChunkRowCache::default(),
        })
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn shape(&self) -> &[u64] {
        &self.meta.shape
    }

    pub(crate) fn dtype(&self) -> DType {
        self.meta.dtype
    }

    /// Length of the frame axis.
    pub(crate) fn len(&self) -> u64 {
        self.meta.shape[0]
    }

    /// Shape of one row (frame axis removed).
    pub(crate) fn row_shape(&self) -> Vec<usize> {
        self.meta.shape[1..].iter().map(|&d| d as usize).collect()
    }

    /// Raw bytes of row `p`, or `None` when a needed chunk is absent and there is no fill value.
    pub(crate) fn read_row(&mut self, p: u64) -> UmiResult<Option<Vec<u8>>> {
        if p >= self.len() {
            return Err(UmiError::store(format!(
                "row {} is out of bounds for '{}' with {} rows",
                p,
                self.name,
                self.len()
            )));
        }

        let c0 = p / self.meta.chunks[0];
        let local0 = (p % self.meta.chunks[0]) as usize;
        if self.cache.row != Some(c0) {
            self.cache.chunks.clear();
            self.cache.row = Some(c0);
        }

        let item = self.meta.dtype.size;
        let row_shape: Vec<u64> = self.meta.shape[1..].to_vec();
        let chunk_tail: Vec<u64> = self.meta.chunks[1..].to_vec();
        let chunk_row_bytes = self.meta.chunk_row_bytes;
        let grid: Vec<u64> = row_shape
            .iter()
            .zip(&chunk_tail)
            .map(|(&s, &c)| s.div_ceil(c))
            .collect();

        let mut out = vec![0u8; self.meta.row_bytes];
        for g in GridIter::new(&grid) {
            let mut coords = Vec::with_capacity(g.len() + 1);
            coords.push(c0);
            coords.extend_from_slice(&g);
            let Some(chunk) = self.chunk(&coords)? else {
                return Ok(None);
            };
            let chunk_row = &chunk[local0 * chunk_row_bytes..][..chunk_row_bytes];

            if grid.iter().all(|&n| n == 1) && chunk_tail == row_shape {
                out.copy_from_slice(chunk_row);
                continue;
            }

            let origin: Vec<u64> = g.iter().zip(&chunk_tail).map(|(&i, &c)| i * c).collect();
            let extent: Vec<u64> = origin
                .iter()
                .zip(row_shape.iter().zip(&chunk_tail))
                .map(|(&o, (&s, &c))| c.min(s - o))
                .collect();
            copy_region(
                chunk_row,
                &chunk_tail,
                &mut out,
                &row_shape,
                &origin,
                &extent,
                item,
            );
        }
        Ok(Some(out))
    }

    /// Row `p` decoded as `f64` values.
    pub(crate) fn read_row_f64(&mut self, p: u64) -> UmiResult<Option<Vec<f64>>> {
        let dtype = self.meta.dtype;
        Ok(self.read_row(p)?.map(|b| dtype.decode_f64(&b)))
    }

    /// Every element of the array as `i64`, in C order.
    pub(crate) fn read_all_i64(&mut self) -> UmiResult<Vec<i64>> {
        let dtype = self.meta.dtype;
        let mut out = Vec::new();
        for p in 0..self.len() {
            let row = self
                .read_row(p)?
                .ok_or_else(|| UmiError::store(format!("'{}' row {} is missing", self.name, p)))?;
            out.extend(dtype.decode_i64(&row)?);
        }
        Ok(out)
    }

    fn chunk(&mut self, coords: &[u64]) -> UmiResult<Option<Arc<Vec<u8>>>> {
        if let Some(hit) = self.cache.chunks.get(coords) {
            return Ok(hit.clone());
        }
        let loaded = self.load_chunk(coords)?;
        self.cache.chunks.insert(coords.to_vec(), loaded.clone());
        Ok(loaded)
    }

    fn load_chunk(&self, coords: &[u64]) -> UmiResult<Option<Arc<Vec<u8>>>> {
        let key = self.meta.chunk_key(coords);
        let path = key
            .split('/')
            .fold(self.dir.clone(), |p, part| p.join(part));
        let expected = self.meta.chunk_bytes;

        let stored = match std::fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(array = %self.name, chunk = %key, "chunk absent, using fill value");
                return Ok(self
                    .meta
                    .fill
                    .as_ref()
                    .map(|fill| Arc::new(fill.repeat(self.meta.chunk_elems()))));
            }
            Err(e) => {
                return Err(anyhow::Error::new(e)
                    .context(format!("read chunk '{}'", path.display()))
                    .into());
            }
        };

        let decoded = decode_chunk(
            self.meta.compressor.as_ref(),
            &stored,
            &self.meta.chunks,
            expected,
        )
        .map_err(|e| match e {
            UmiError::Store(m) => UmiError::store(format!("{} chunk {}: {m}", self.name, key)),
            UmiError::Unsupported(m) => UmiError::unsupported(format!("{m} in '{}'", self.name)),
            other => other,
        })?;
        tracing::debug!(array = %self.name, chunk = %key, bytes = decoded.len(), "loaded chunk");
        Ok(Some(Arc::new(decoded)))
    }
}

/// Copy the part of one chunk row that overlaps the output row.
///
/// `origin`/`extent` describe the overlap in row coordinates; the chunk row is laid out with
/// `chunk_tail` dims and the output with `row_shape` dims, both C order.
fn copy_region(
    src: &[u8],
    chunk_tail: &[u64],
    dst: &mut [u8],
    row_shape: &[u64],
    origin: &[u64],
    extent: &[u64],
    item: usize,
) {
    let ndim = extent.len();
    let run = extent[ndim - 1] as usize * item;
    let outer = &extent[..ndim - 1];
    for idx in GridIter::new(outer) {
        let mut s_off = 0usize;
        let mut d_off = 0usize;
        for d in 0..ndim {
            let i = if d + 1 < ndim { idx[d] } else { 0 };
            s_off = s_off * chunk_tail[d] as usize + i as usize;
            d_off = d_off * row_shape[d] as usize + (origin[d] + i) as usize;
        }
        let (s_off, d_off) = (s_off * item, d_off * item);
        dst[d_off..d_off + run].copy_from_slice(&src[s_off..s_off + run]);
    }
}

/// Odometer over every multi-index `< extent`. An empty extent yields one empty index; any zero
/// dimension yields nothing.
struct GridIter {
    extent: Vec<u64>,
    cur: Vec<u64>,
    done: bool,
}

impl GridIter {
    fn new(extent: &[u64]) -> Self {
        Self {
            extent: extent.to_vec(),
            cur: vec![0; extent.len()],
            done: extent.contains(&0),
        }
    }
}

impl Iterator for GridIter {
    type Item = Vec<u64>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let item = self.cur.clone();
        self.done = true;
        for d in (0..self.extent.len()).rev() {
            self.cur[d] += 1;
            if self.cur[d] < self.extent[d] {
                self.done = false;
                break;
            }
            self.cur[d] = 0;
        }
        Some(item)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/store/array.rs"]
mod tests;
