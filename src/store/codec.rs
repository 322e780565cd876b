//! Chunk decompression for the numcodecs subset found in UMI datasets.
//!
//! Supported: no compressor, `blosc` with the lz4/lz4hc inner codec (byte shuffle or none),
//! numcodecs `lz4`, and single-frame `imagecodecs_{jpeg,png,webp,jpegxl}` image chunks.

use anyhow::Context as _;

use crate::foundation::error::{UmiError, UmiResult};
use crate::store::meta::CompressorConfig;

const BLOSC_HEADER_LEN: usize = 16;
const BLOSC_MAX_SPLITS: usize = 16;

const BLOSC_DOSHUFFLE: u8 = 0x01;
const BLOSC_MEMCPYED: u8 = 0x02;
const BLOSC_DOBITSHUFFLE: u8 = 0x04;
const BLOSC_NOSPLIT: u8 = 0x10;

const BLOSC_LZ4_FORMAT: u8 = 1;

/// Decode one stored chunk into its raw C-order bytes.
///
/// `chunk_shape` is the array's chunk shape; `expected_len` the decoded byte length.
pub(crate) fn decode_chunk(
    compressor: Option<&CompressorConfig>,
    stored: &[u8],
    chunk_shape: &[u64],
    expected_len: usize,
) -> UmiResult<Vec<u8>> {
    let decoded = match compressor.map(|c| c.id.as_str()) {
        None => stored.to_vec(),
        Some("blosc") => {
            let cname = compressor
                .and_then(|c| c.params.get("cname"))
                .and_then(|v| v.as_str());
            if let Some(cname) = cname
                && !matches!(cname, "lz4" | "lz4hc")
            {
                return Err(UmiError::unsupported(format!(
                    "blosc cname '{cname}' (only lz4 and lz4hc are supported)"
                )));
            }
            blosc_decompress(stored)?
        }
        Some("lz4") => lz4_flex::block::decompress_size_prepended(stored)
            .context("decompress lz4 chunk")?,
        Some("imagecodecs_jpeg" | "imagecodecs_png" | "imagecodecs_webp") => {
            decode_image_chunk(stored, chunk_shape, ImageCodec::Native)?
        }
        Some("imagecodecs_jpegxl") => decode_image_chunk(stored, chunk_shape, ImageCodec::JpegXl)?,
        Some(other) => return Err(UmiError::unsupported(format!("compressor '{other}'"))),
    };
    if decoded.len() != expected_len {
        return Err(UmiError::store(format!(
            "decoded chunk has {} bytes, expected {}",
            decoded.len(),
            expected_len
        )));
    }
    Ok(decoded)
}

fn read_u32_le(b: &[u8], at: usize) -> UmiResult<u32> {
    b.get(at..at + 4)
        .map(|s| u32::from_le_bytes([s[0], s[1], s[2], s[3]]))
        .ok_or_else(|| UmiError::store("truncated blosc frame"))
}

/// Decompress a Blosc1 frame.
pub(crate) fn blosc_decompress(src: &[u8]) -> UmiResult<Vec<u8>> {
    if src.len() < BLOSC_HEADER_LEN {
        return Err(UmiError::store("truncated blosc header"));
    }
    let flags = src[2];
    let typesize = usize::from(src[3]).max(1);
    let nbytes = read_u32_le(src, 4)? as usize;
    let blocksize = read_u32_le(src, 8)? as usize;
    let cbytes = read_u32_le(src, 12)? as usize;
    if cbytes > src.len() {
        return Err(UmiError::store(format!(
            "blosc frame claims {} bytes but only {} are stored",
            cbytes,
            src.len()
        )));
    }

    if flags & BLOSC_MEMCPYED != 0 {
        return src
            .get(BLOSC_HEADER_LEN..BLOSC_HEADER_LEN + nbytes)
            .map(<[u8]>::to_vec)
            .ok_or_else(|| UmiError::store("truncated memcpyed blosc frame"));
    }
    if flags & BLOSC_DOBITSHUFFLE != 0 && typesize > 1 {
        return Err(UmiError::unsupported("blosc bitshuffle"));
    }
    let compformat = (flags & 0xe0) >> 5;
    if compformat != BLOSC_LZ4_FORMAT {
        return Err(UmiError::unsupported(format!(
            "blosc inner codec #{compformat} (only lz4 is supported)"
        )));
    }
    if nbytes == 0 {
        return Ok(Vec::new());
    }
    if blocksize == 0 {
        return Err(UmiError::store("blosc blocksize is zero"));
    }

    let dont_split = flags & BLOSC_NOSPLIT != 0;
    let shuffled = flags & BLOSC_DOSHUFFLE != 0 && typesize > 1;
    let leftover = nbytes % blocksize;
    let nblocks = nbytes / blocksize + usize::from(leftover > 0);

    let mut out = Vec::with_capacity(nbytes);
    for b in 0..nblocks {
        let leftover_block = b + 1 == nblocks && leftover > 0;
        let bsize = if leftover_block { leftover } else { blocksize };
        let mut at = read_u32_le(src, BLOSC_HEADER_LEN + 4 * b)? as usize;

        let nsplits = if !dont_split && !leftover_block && typesize <= BLOSC_MAX_SPLITS {
            typesize
        } else {
            1
        };
        let neblock = bsize / nsplits;

        let mut block = Vec::with_capacity(bsize);
        for _ in 0..nsplits {
            let split_len = read_u32_le(src, at)? as usize;
            at += 4;
            let data = src
                .get(at..at + split_len)
                .ok_or_else(|| UmiError::store("truncated blosc block"))?;
            at += split_len;
            if split_len == neblock {
                block.extend_from_slice(data);
            } else {
                let dec = lz4_flex::block::decompress(data, neblock)
                    .context("decompress blosc lz4 block")?;
                if dec.len() != neblock {
                    return Err(UmiError::store("blosc block decompressed to wrong size"));
                }
                block.extend_from_slice(&dec);
            }
        }
        if block.len() != bsize {
            return Err(UmiError::store("blosc block size mismatch"));
        }

        if shuffled {
            out.extend_from_slice(&unshuffle(&block, typesize));
        } else {
            out.extend_from_slice(&block);
        }
    }
    Ok(out)
}

/// Undo Blosc's byte shuffle: byte `i` of every element is stored contiguously.
///
/// Trailing bytes that do not fill a whole element are stored verbatim.
pub(crate) fn unshuffle(src: &[u8], typesize: usize) -> Vec<u8> {
    let n = src.len() / typesize;
    let mut out = vec![0u8; src.len()];
    for i in 0..typesize {
        for j in 0..n {
            out[j * typesize + i] = src[i * n + j];
        }
    }
    let tail = n * typesize;
    out[tail..].copy_from_slice(&src[tail..]);
    out
}

/// Decoder behind an `imagecodecs_*` chunk.
#[derive(Clone, Copy, Debug)]
enum ImageCodec {
    /// Formats the `image` crate reads directly (jpeg, png, webp).
    Native,
    JpegXl,
}

fn decode_image_chunk(
    stored: &[u8],
    chunk_shape: &[u64],
    image_codec: ImageCodec,
) -> UmiResult<Vec<u8>> {
    let (frames, h, w, c) = match *chunk_shape {
        [n, h, w] => (n, h, w, 1),
        [n, h, w, c] => (n, h, w, c),
        _ => {
            return Err(UmiError::unsupported(format!(
                "image codec on a {}-d chunk",
                chunk_shape.len()
            )));
        }
    };
    if frames != 1 {
        return Err(UmiError::unsupported("image codec chunks must hold exactly one frame"));
    }

    let img = match image_codec {
        ImageCodec::Native => image::load_from_memory(stored).context("decode image chunk")?,
        ImageCodec::JpegXl => {
            let decoder = jxl_oxide::integration::JxlDecoder::new(stored)
                .map_err(|e| UmiError::store(format!("read jpeg-xl chunk: {e}")))?;
            image::DynamicImage::from_decoder(decoder)
                .map_err(|e| UmiError::store(format!("decode jpeg-xl chunk: {e}")))?
        }
    };
    if u64::from(img.width()) != w || u64::from(img.height()) != h {
        return Err(UmiError::store(format!(
            "image chunk is {}x{}, array expects {}x{}",
            img.width(),
            img.height(),
            w,
            h
        )));
    }
    let raw = match c {
        1 => img.to_luma8().into_raw(),
        3 => img.to_rgb8().into_raw(),
        4 => img.to_rgba8().into_raw(),
        other => {
            return Err(UmiError::unsupported(format!("{other}-channel image chunks")));
        }
    };
    Ok(raw)
}

#[cfg(test)]
#[path = "../../tests/unit/store/codec.rs"]
mod tests;
