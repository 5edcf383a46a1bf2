//! Parsers for the IDX binary container used by MNIST and its derivatives.
//!
//! # IDX3 image file layout
//! ```text
//! bytes  0-3:   0x00000803  (magic: uint8 data, 3 dimensions)
//! bytes  4-7:   N           (number of images, big-endian u32)
//! bytes  8-11:  rows        (image height in pixels, big-endian u32)
//! bytes 12-15:  cols        (image width in pixels, big-endian u32)
//! bytes 16..:   N * rows * cols bytes, row-major, uint8
//! ```
//!
//! # IDX1 label file layout
//! ```text
//! bytes  0-3:   0x00000801  (magic: uint8 data, 1 dimension)
//! bytes  4-7:   N           (number of labels, big-endian u32)
//! bytes  8..:   N bytes, each a class index
//! ```

use crate::error::{NnError, Result};

pub const IDX3_MAGIC: u32 = 0x0000_0803;
pub const IDX1_MAGIC: u32 = 0x0000_0801;

/// A parsed IDX3 image file; `pixels` borrows from the input buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdxImages<'a> {
    pub count: usize,
    pub rows: usize,
    pub cols: usize,
    pub pixels: &'a [u8],
}

impl<'a> IdxImages<'a> {
    pub fn pixels_per_image(&self) -> usize {
        self.rows * self.cols
    }

    /// Raw bytes of image `i`.
    pub fn image(&self, i: usize) -> &'a [u8] {
        let n = self.pixels_per_image();
        &self.pixels[i * n..(i + 1) * n]
    }
}

fn read_u32(bytes: &[u8], offset: usize) -> u32 {
    u32::from_be_bytes([
        bytes[offset], bytes[offset + 1], bytes[offset + 2], bytes[offset + 3],
    ])
}

pub fn parse_idx3(bytes: &[u8]) -> Result<IdxImages<'_>> {
    if bytes.len() < 16 {
        return Err(NnError::Dataset(format!(
            "IDX image file too short: expected at least 16 header bytes, got {}",
            bytes.len()
        )));
    }
    let magic = read_u32(bytes, 0);
    if magic != IDX3_MAGIC {
        return Err(NnError::Dataset(format!(
            "IDX image file magic number mismatch: expected {:#010x}, got {:#010x}",
            IDX3_MAGIC, magic
        )));
    }

    let count = read_u32(bytes, 4) as usize;
    let rows = read_u32(bytes, 8) as usize;
    let cols = read_u32(bytes, 12) as usize;

    let data_len = rows
        .checked_mul(cols)
        .and_then(|n| n.checked_mul(count))
        .ok_or_else(|| {
            NnError::Dataset(format!(
                "IDX image file: {} images of {}x{} pixels overflows usize",
                count, rows, cols
            ))
        })?;

    let available = bytes.len() - 16;
    if available < data_len {
        return Err(NnError::Dataset(format!(
            "IDX image file truncated: header declares {} images of {}x{} pixels \
             ({} data bytes), but only {} bytes follow the header",
            count, rows, cols, data_len, available
        )));
    }

    Ok(IdxImages {
        count,
        rows,
        cols,
        pixels: &bytes[16..16 + data_len],
    })
}

pub fn parse_idx1(bytes: &[u8]) -> Result<&[u8]> {
    if bytes.len() < 8 {
        return Err(NnError::Dataset(format!(
            "IDX label file too short: expected at least 8 header bytes, got {}",
            bytes.len()
        )));
    }
    let magic = read_u32(bytes, 0);
    if magic != IDX1_MAGIC {
        return Err(NnError::Dataset(format!(
            "IDX label file magic number mismatch: expected {:#010x}, got {:#010x}",
            IDX1_MAGIC, magic
        )));
    }

    let count = read_u32(bytes, 4) as usize;
    let available = bytes.len() - 8;
    if available < count {
        return Err(NnError::Dataset(format!(
            "IDX label file truncated: header declares {} labels, but only {} bytes follow the header",
            count, available
        )));
    }
    Ok(&bytes[8..8 + count])
}

/// Encodes an IDX3 image file; the inverse of `parse_idx3`.
pub fn encode_idx3(rows: usize, cols: usize, images: &[Vec<u8>]) -> Vec<u8> {
    let mut out = Vec::with_capacity(16 + images.len() * rows * cols);
    out.extend_from_slice(&IDX3_MAGIC.to_be_bytes());
    out.extend_from_slice(&(images.len() as u32).to_be_bytes());
    out.extend_from_slice(&(rows as u32).to_be_bytes());
    out.extend_from_slice(&(cols as u32).to_be_bytes());
    for image in images {
        out.extend_from_slice(image);
    }
    out
}

/// Encodes an IDX1 label file; the inverse of `parse_idx1`.
pub fn encode_idx1(labels: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(8 + labels.len());
    out.extend_from_slice(&IDX1_MAGIC.to_be_bytes());
    out.extend_from_slice(&(labels.len() as u32).to_be_bytes());
    out.extend_from_slice(labels);
    out
}
