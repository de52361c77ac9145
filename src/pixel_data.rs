// Copyright (c) 2023 Jean-Daniel Michaud
//
// Permission is hereby granted, free of charge, to any person obtaining a copy
// of this software and associated documentation files (the "Software"), to deal
// in the Software without restriction, including without limitation the rights
// to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
// copies of the Software, and to permit persons to whom the Software is
// furnished to do so, subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included in all
// copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
// FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
// AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
// LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
// OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
// SOFTWARE.

use log::debug;

use crate::element::elements;
use crate::error::HeaderError;
use crate::misc::validate_header;
use crate::tags::{Columns, PixelData, Rows};

pub const DEFAULT_DIMENSION: u16 = 512;

/// Native signed 16 bits samples, row major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
  pub data: Vec<i16>,
  pub rows: u16,
  pub cols: u16,
}

impl PixelBuffer {
  pub fn new(data: Vec<i16>, rows: u16, cols: u16) -> Self {
    PixelBuffer { data, rows, cols }
  }

  pub fn pixel_count(&self) -> usize {
    self.rows as usize * self.cols as usize
  }

  /// False when the samples do not cover `rows * cols`, rendering then stops early.
  pub fn is_complete(&self) -> bool {
    self.data.len() >= self.pixel_count()
  }
}

/// Dimensions assumed when the file has no usable Rows or Columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelDataOptions {
  pub default_rows: u16,
  pub default_cols: u16,
}

impl Default for PixelDataOptions {
  fn default() -> Self {
    PixelDataOptions { default_rows: DEFAULT_DIMENSION, default_cols: DEFAULT_DIMENSION }
  }
}

pub fn decode_samples(bytes: &[u8]) -> Vec<i16> {
  bytes
    .chunks_exact(2)
    .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
    .collect()
}

pub fn parse_pixel_data(buffer: &[u8]) -> Result<Option<PixelBuffer>, HeaderError> {
  parse_pixel_data_with(buffer, &PixelDataOptions::default())
}

/**
 * Locate Rows, Columns and the native PixelData of a DICOM buffer.
 * `Ok(None)` means there is nothing to preview: no PixelData at all, or an
 * encapsulated (compressed) one.
 */
pub fn parse_pixel_data_with(buffer: &[u8], options: &PixelDataOptions)
  -> Result<Option<PixelBuffer>, HeaderError> {
  validate_header(buffer)?;

  let mut rows = None;
  let mut cols = None;
  let mut samples = None;
  for element in elements(buffer).filter(|e| e.is_top_level()) {
    if element.is(&Rows) {
      rows = element.value_as_u16().or(rows);
    } else if element.is(&Columns) {
      cols = element.value_as_u16().or(cols);
    } else if element.is(&PixelData) {
      if element.undefined_length {
        debug!("encapsulated pixel data at {:#x} is not supported", element.value_offset);
        return Ok(None);
      }
      samples = Some(decode_samples(element.value));
      break;
    }
  }

  let Some(data) = samples else {
    debug!("no pixel data found");
    return Ok(None);
  };
  let pixels = PixelBuffer::new(
    data,
    rows.unwrap_or(options.default_rows),
    cols.unwrap_or(options.default_cols),
  );
  if !pixels.is_complete() {
    debug!("{} samples for a {}x{} image", pixels.data.len(), pixels.cols, pixels.rows);
  }
  Ok(Some(pixels))
}
