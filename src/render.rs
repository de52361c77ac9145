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

//! Min/max windowing of the samples into an opaque RGBA grayscale raster.

use crate::pixel_data::PixelBuffer;

pub const CHANNELS: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrayscaleRaster {
  pub width: u16,
  pub height: u16,
  /// RGBA, row major, `width * height * 4` bytes.
  pub data: Vec<u8>,
}

impl GrayscaleRaster {
  pub fn pixel(&self, x: u16, y: u16) -> Option<[u8; 4]> {
    if x >= self.width || y >= self.height {
      return None;
    }
    let start = (y as usize * self.width as usize + x as usize) * CHANNELS;
    let bytes = self.data.get(start..start + CHANNELS)?;
    bytes.try_into().ok()
  }
}

/// Observed (min, max) of the samples, `None` when there are none.
pub fn sample_range(samples: &[i16]) -> Option<(i16, i16)> {
  if samples.is_empty() {
    return None;
  }
  Some(samples.iter().fold((i16::MAX, i16::MIN), |(min, max), &sample| {
    (min.min(sample), max.max(sample))
  }))
}

/**
 * Fill `raster` with the normalized samples, stopping at whichever of the
 * samples, `rows * cols` or the raster runs out first. Pixels past that point
 * are left untouched, so the raster should be cleared beforehand.
 * Returns the number of pixels written.
 */
pub fn render_grayscale_into(pixels: &PixelBuffer, raster: &mut [u8]) -> usize {
  let Some((min, max)) = sample_range(&pixels.data) else {
    return 0;
  };
  let min = min as i32;
  // A flat image would divide by zero
  let range = match max as i32 - min {
    0 => 1,
    range => range,
  };

  let count = pixels
    .data
    .len()
    .min(pixels.pixel_count())
    .min(raster.len() / CHANNELS);
  for (sample, rgba) in pixels.data[..count].iter().zip(raster.chunks_exact_mut(CHANNELS)) {
    let gray = ((*sample as i32 - min) * 255 / range) as u8;
    rgba.copy_from_slice(&[gray, gray, gray, 255]);
  }
  count
}

/// Render into a freshly allocated raster of `cols x rows` pixels.
pub fn render_grayscale(pixels: &PixelBuffer) -> GrayscaleRaster {
  let mut data = vec![0u8; pixels.pixel_count() * CHANNELS];
  render_grayscale_into(pixels, &mut data);
  GrayscaleRaster { width: pixels.cols, height: pixels.rows, data }
}
