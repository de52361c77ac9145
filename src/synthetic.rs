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

//! Writer for small little-endian DICOM files, used to produce test inputs and
//! the phantom written by the `generate` tool.

use crate::element::UNDEFINED_LENGTH;
use crate::misc::{MAGIC, PREAMBLE_LENGTH};

const EXPLICIT_VR_LITTLE_ENDIAN: &str = "1.2.840.10008.1.2.1";
const CT_IMAGE_STORAGE: &str = "1.2.840.10008.5.1.4.1.1.2";
const UID_ROOT: &str = "1.2.826.0.1.3680043.8.498";

#[derive(Debug, Default, Clone)]
pub struct FileBuilder {
  buffer: Vec<u8>,
}

impl FileBuilder {
  /// Starts with the zeroed preamble and the DICM prefix.
  pub fn new() -> Self {
    let mut buffer = vec![0u8; PREAMBLE_LENGTH];
    buffer.extend_from_slice(MAGIC);
    FileBuilder { buffer }
  }

  /// Starts with nothing, to build the content of an item for instance.
  pub fn empty() -> Self {
    FileBuilder { buffer: vec![] }
  }

  fn tag(mut self, group: u16, element: u16) -> Self {
    self.buffer.extend_from_slice(&group.to_le_bytes());
    self.buffer.extend_from_slice(&element.to_le_bytes());
    self
  }

  /**
   * Appends an explicit VR element, the value is written as is.
   * Panics if the value of a short form VR does not fit on 16 bits.
   */
  pub fn explicit(self, group: u16, element: u16, vr: &str, value: &[u8]) -> Self {
    let mut builder = self.tag(group, element);
    builder.buffer.extend_from_slice(vr.as_bytes());
    if ["OB", "OW", "OF", "SQ", "UT", "UN"].contains(&vr) {
      builder.buffer.extend_from_slice(&[0, 0]);
      builder.buffer.extend_from_slice(&(value.len() as u32).to_le_bytes());
    } else {
      let length = u16::try_from(value.len())
        .unwrap_or_else(|_| panic!("{} bytes do not fit a {} element", value.len(), vr));
      builder.buffer.extend_from_slice(&length.to_le_bytes());
    }
    builder.buffer.extend_from_slice(value);
    builder
  }

  /// Appends a text element padded to an even length, with a NUL for UIs.
  pub fn explicit_text(self, group: u16, element: u16, vr: &str, text: &str) -> Self {
    let mut value = text.as_bytes().to_vec();
    if value.len() % 2 == 1 {
      value.push(if vr == "UI" { 0 } else { b' ' });
    }
    self.explicit(group, element, vr, &value)
  }

  pub fn explicit_u16(self, group: u16, element: u16, value: u16) -> Self {
    self.explicit(group, element, "US", &value.to_le_bytes())
  }

  pub fn implicit(self, group: u16, element: u16, value: &[u8]) -> Self {
    let mut builder = self.tag(group, element);
    builder.buffer.extend_from_slice(&(value.len() as u32).to_le_bytes());
    builder.buffer.extend_from_slice(value);
    builder
  }

  /// Native pixel data as an OW element of little-endian samples.
  pub fn pixel_data(self, samples: &[i16]) -> Self {
    let bytes: Vec<u8> = samples.iter().flat_map(|s| s.to_le_bytes()).collect();
    self.explicit(0x7FE0, 0x0010, "OW", &bytes)
  }

  /// Pixel data with an undefined length: empty offset table then one item per fragment.
  pub fn encapsulated_pixel_data(self, fragments: &[&[u8]]) -> Self {
    let mut builder = self.undefined(0x7FE0, 0x0010, "OB").implicit(0xFFFE, 0xE000, &[]);
    for fragment in fragments {
      builder = builder.implicit(0xFFFE, 0xE000, fragment);
    }
    builder.sequence_end()
  }

  fn undefined(self, group: u16, element: u16, vr: &str) -> Self {
    let mut builder = self.tag(group, element);
    builder.buffer.extend_from_slice(vr.as_bytes());
    builder.buffer.extend_from_slice(&[0, 0]);
    builder.buffer.extend_from_slice(&UNDEFINED_LENGTH.to_le_bytes());
    builder
  }

  pub fn sequence_start(self, group: u16, element: u16) -> Self {
    self.undefined(group, element, "SQ")
  }

  pub fn item_start(self) -> Self {
    let mut builder = self.tag(0xFFFE, 0xE000);
    builder.buffer.extend_from_slice(&UNDEFINED_LENGTH.to_le_bytes());
    builder
  }

  pub fn item_end(self) -> Self {
    self.implicit(0xFFFE, 0xE00D, &[])
  }

  pub fn sequence_end(self) -> Self {
    self.implicit(0xFFFE, 0xE0DD, &[])
  }

  pub fn raw(mut self, bytes: &[u8]) -> Self {
    self.buffer.extend_from_slice(bytes);
    self
  }

  pub fn build(self) -> Vec<u8> {
    self.buffer
  }
}

/// Sample value of the circular CT-like phantom at a normalized distance from the center.
fn phantom_sample(distance: f32) -> i16 {
  let mut value = 0;
  if distance < 0.8 {
    value = 400; // internal tissue
  }
  if distance < 0.75 {
    value = 200; // soft tissue
  }
  if distance > 0.8 && distance < 0.85 {
    value = 1000; // bone ring
  }
  if distance < 0.2 {
    value = 800; // organ
  }
  if distance < 0.1 {
    value = -500; // air
  }
  value
}

fn linspace(index: u16, count: u16) -> f32 {
  if count < 2 {
    0.0
  } else {
    -1.0 + 2.0 * index as f32 / (count - 1) as f32
  }
}

pub fn phantom_samples(rows: u16, cols: u16) -> Vec<i16> {
  let mut samples = Vec::with_capacity(rows as usize * cols as usize);
  for row in 0..rows {
    let y = linspace(row, rows);
    for col in 0..cols {
      let x = linspace(col, cols);
      samples.push(phantom_sample((x * x + y * y).sqrt()));
    }
  }
  samples
}

/**
 * A complete explicit VR little endian CT file: file meta information, the
 * patient/study/series identification and a signed 16 bits phantom image.
 */
pub fn phantom(rows: u16, cols: u16) -> Vec<u8> {
  let sop_instance_uid = format!("{}.2.{}.{}", UID_ROOT, rows, cols);
  let meta = FileBuilder::empty()
    .explicit(0x0002, 0x0001, "OB", &[0, 1])
    .explicit_text(0x0002, 0x0002, "UI", CT_IMAGE_STORAGE)
    .explicit_text(0x0002, 0x0003, "UI", &sop_instance_uid)
    .explicit_text(0x0002, 0x0010, "UI", EXPLICIT_VR_LITTLE_ENDIAN)
    .explicit_text(0x0002, 0x0012, "UI", &format!("{}.1", UID_ROOT))
    .build();

  FileBuilder::new()
    .explicit(0x0002, 0x0000, "UL", &(meta.len() as u32).to_le_bytes())
    .raw(&meta)
    .explicit_text(0x0008, 0x0016, "UI", CT_IMAGE_STORAGE)
    .explicit_text(0x0008, 0x0018, "UI", &sop_instance_uid)
    .explicit_text(0x0008, 0x0020, "DA", "20240101")
    .explicit_text(0x0008, 0x0030, "TM", "120000")
    .explicit_text(0x0008, 0x0060, "CS", "CT")
    .explicit_text(0x0008, 0x0070, "LO", "TestManufacturer")
    .explicit_text(0x0008, 0x1030, "LO", "CT Chest Study")
    .explicit_text(0x0008, 0x103E, "LO", "Axial CT")
    .explicit_text(0x0010, 0x0010, "PN", "John^Doe")
    .explicit_text(0x0010, 0x0020, "LO", "123456")
    .explicit_text(0x0010, 0x0030, "DA", "19900101")
    .explicit_text(0x0010, 0x0040, "CS", "M")
    .explicit_text(0x0018, 0x0050, "DS", "1.25")
    .explicit_text(0x0020, 0x000D, "UI", &format!("{}.3", UID_ROOT))
    .explicit_text(0x0020, 0x000E, "UI", &format!("{}.4", UID_ROOT))
    .explicit_text(0x0020, 0x0011, "IS", "1")
    .explicit_text(0x0020, 0x0013, "IS", "1")
    .explicit_u16(0x0028, 0x0002, 1)
    .explicit_text(0x0028, 0x0004, "CS", "MONOCHROME2")
    .explicit_u16(0x0028, 0x0010, rows)
    .explicit_u16(0x0028, 0x0011, cols)
    .explicit_text(0x0028, 0x0030, "DS", "0.625\\0.625")
    .explicit_u16(0x0028, 0x0100, 16)
    .explicit_u16(0x0028, 0x0101, 16)
    .explicit_u16(0x0028, 0x0102, 15)
    .explicit_u16(0x0028, 0x0103, 1)
    .pixel_data(&phantom_samples(rows, cols))
    .build()
}
