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

//! Lazy walk over the data elements following the preamble.
//!
//! Both the metadata scanner and the pixel data locator consume this iterator,
//! there is no other place where element headers are decoded.
//!
//! https://dicom.nema.org/dicom/2013/output/chtml/part05/chapter_7.html#sect_7.1.2

use core::str::from_utf8;
use log::{debug, trace};

use crate::misc::DATA_SET_OFFSET;
use crate::tags::{ItemDelimitationItem, SequenceDelimitationItem, Tag};

pub const UNDEFINED_LENGTH: u32 = 0xFFFFFFFF;

// These VRs have 2 reserved bytes after the VR and their length on 4 bytes.
const LONG_FORM_VRS: [&[u8; 2]; 6] = [b"OB", b"OW", b"OF", b"SQ", b"UT", b"UN"];

/// Value representation as found in an explicit VR element header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Vr(pub [u8; 2]);

impl Vr {
  pub fn as_str(&self) -> &str {
    from_utf8(&self.0).unwrap_or("??")
  }

  pub fn is_long_form(&self) -> bool {
    LONG_FORM_VRS.contains(&&self.0)
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Element<'a> {
  pub group: u16,
  pub element: u16,
  /// `None` when the element was read with the implicit VR layout.
  pub vr: Option<Vr>,
  // Position of the value in the buffer, after the VR and length
  pub value_offset: usize,
  // Always 0 for an undefined length, the walk continues inside the value
  pub value_length: usize,
  pub undefined_length: bool,
  /// Nesting level, 0 for the top level data set.
  pub depth: usize,
  pub value: &'a [u8],
}

impl<'a> Element<'a> {
  pub fn is(&self, tag: &Tag) -> bool {
    tag.matches(self.group, self.element)
  }

  pub fn is_top_level(&self) -> bool {
    self.depth == 0
  }

  pub fn vr_str(&self) -> &str {
    self.vr.as_ref().map(Vr::as_str).unwrap_or("--")
  }

  /// The value as a little-endian u16, only if it is exactly 2 bytes long.
  pub fn value_as_u16(&self) -> Option<u16> {
    let bytes: [u8; 2] = self.value.try_into().ok()?;
    Some(u16::from_le_bytes(bytes))
  }

  /// The value as a little-endian u32, only if it is exactly 4 bytes long.
  pub fn value_as_u32(&self) -> Option<u32> {
    let bytes: [u8; 4] = self.value.try_into().ok()?;
    Some(u32::from_le_bytes(bytes))
  }

  /// The value as text: invalid UTF-8 sequences are replaced, NULs removed and
  /// surrounding whitespace trimmed.
  pub fn value_as_text(&self) -> String {
    String::from_utf8_lossy(self.value)
      .replace(char::from(0), "")
      .trim()
      .to_string()
  }
}

fn read_u16(buffer: &[u8], offset: usize) -> u16 {
  u16::from_le_bytes([buffer[offset], buffer[offset + 1]])
}

fn read_u32(buffer: &[u8], offset: usize) -> u32 {
  u32::from_le_bytes([
    buffer[offset],
    buffer[offset + 1],
    buffer[offset + 2],
    buffer[offset + 3],
  ])
}

/**
 * Walk the elements of a buffer whose header was already validated.
 */
pub fn elements(buffer: &[u8]) -> ElementIter<'_> {
  ElementIter::at(buffer, DATA_SET_OFFSET)
}

pub struct ElementIter<'a> {
  buffer: &'a [u8],
  offset: usize,
  depth: usize,
  truncated: bool,
  done: bool,
}

impl<'a> ElementIter<'a> {
  pub fn at(buffer: &'a [u8], offset: usize) -> Self {
    ElementIter { buffer, offset, depth: 0, truncated: false, done: false }
  }

  /// True once the walk stopped on an element overrunning the buffer.
  pub fn is_truncated(&self) -> bool {
    self.truncated
  }

  pub fn offset(&self) -> usize {
    self.offset
  }

  fn truncate(&mut self, group: u16, element: u16, end: Option<usize>) -> Option<Element<'a>> {
    debug!(
      "element ({:04x},{:04x}) at {:#x} ends at {} past the buffer end ({:#x}), stopping",
      group,
      element,
      self.offset,
      end.map(|end| format!("{:#x}", end)).unwrap_or_else(|| "an offset".to_string()),
      self.buffer.len(),
    );
    self.truncated = true;
    self.done = true;
    None
  }
}

impl<'a> Iterator for ElementIter<'a> {
  type Item = Element<'a>;

  fn next(&mut self) -> Option<Element<'a>> {
    let buffer = self.buffer;
    let offset = self.offset;
    // A minimal element header is 8 bytes long
    if self.done || offset + 8 >= buffer.len() {
      self.done = true;
      return None;
    }

    let group = read_u16(buffer, offset);
    let element = read_u16(buffer, offset + 2);
    // Heuristic: two uppercase letters where the VR would be means explicit VR.
    // Items and delimiters never carry a VR.
    let explicit = group != 0xFFFE
      && buffer[offset + 4].is_ascii_uppercase()
      && buffer[offset + 5].is_ascii_uppercase();

    let (vr, length, value_offset) = if explicit {
      let vr = Vr([buffer[offset + 4], buffer[offset + 5]]);
      if vr.is_long_form() {
        if offset + 12 > buffer.len() {
          return self.truncate(group, element, Some(offset + 12));
        }
        (Some(vr), read_u32(buffer, offset + 8), offset + 12)
      } else {
        (Some(vr), read_u16(buffer, offset + 6) as u32, offset + 8)
      }
    } else {
      (None, read_u32(buffer, offset + 4), offset + 8)
    };

    if length == UNDEFINED_LENGTH {
      // Sequences, items and encapsulated pixel data: walk into the content
      // until the matching delimiter brings the depth back.
      let depth = self.depth;
      debug!("({:04x},{:04x}) has an undefined length at {:#x}, entering depth {}",
        group, element, offset, depth + 1);
      self.depth += 1;
      self.offset = value_offset;
      return Some(Element {
        group,
        element,
        vr,
        value_offset,
        value_length: 0,
        undefined_length: true,
        depth,
        value: &buffer[value_offset..value_offset],
      });
    }

    let next_offset = match value_offset.checked_add(length as usize) {
      Some(next_offset) if next_offset <= buffer.len() => next_offset,
      end => return self.truncate(group, element, end),
    };

    if ItemDelimitationItem.matches(group, element) || SequenceDelimitationItem.matches(group, element) {
      self.depth = self.depth.saturating_sub(1);
    }

    trace!("({:04x},{:04x}) {} {} bytes at {:#x}",
      group, element, vr.as_ref().map(Vr::as_str).unwrap_or("--"), length, value_offset);

    self.offset = next_offset;
    Some(Element {
      group,
      element,
      vr,
      value_offset,
      value_length: length as usize,
      undefined_length: false,
      depth: self.depth,
      value: &buffer[value_offset..next_offset],
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::synthetic::FileBuilder;
  use crate::tags::{Item, PixelData, Rows};

  #[test]
  fn explicit_short_form_element() {
    let buffer = FileBuilder::new().explicit_u16(0x0028, 0x0010, 256).build();
    let found: Vec<_> = elements(&buffer).collect();
    assert_eq!(found.len(), 1);
    let rows = found[0];
    assert!(rows.is(&Rows));
    assert_eq!(rows.vr, Some(Vr(*b"US")));
    assert_eq!(rows.value_offset, 140);
    assert_eq!(rows.value_length, 2);
    assert_eq!(rows.value_as_u16(), Some(256));
  }

  #[test]
  fn explicit_long_form_element() {
    let buffer = FileBuilder::new()
      .explicit(0x0009, 0x0010, "OB", &[1, 2, 3, 4])
      .explicit_u16(0x0028, 0x0011, 7)
      .build();
    let found: Vec<_> = elements(&buffer).collect();
    assert_eq!(found.len(), 2);
    assert_eq!(found[0].vr_str(), "OB");
    assert_eq!(found[0].value_offset, 144);
    assert_eq!(found[0].value, &[1, 2, 3, 4]);
    assert_eq!(found[1].value_as_u16(), Some(7));
  }

  #[test]
  fn implicit_element() {
    let buffer = FileBuilder::new()
      .implicit(0x0028, 0x0010, &512u16.to_le_bytes())
      .implicit(0x0010, 0x0020, b"ID42")
      .build();
    let found: Vec<_> = elements(&buffer).collect();
    assert_eq!(found.len(), 2);
    assert_eq!(found[0].vr, None);
    assert_eq!(found[0].value_offset, 140);
    assert_eq!(found[0].value_as_u16(), Some(512));
    assert_eq!(found[1].value_as_text(), "ID42");
  }

  #[test]
  fn overrunning_element_stops_the_walk() {
    let mut buffer = FileBuilder::new()
      .explicit_u16(0x0028, 0x0010, 4)
      .explicit(0x7FE0, 0x0010, "OW", &[0; 8])
      .build();
    buffer.truncate(buffer.len() - 2);
    let mut iter = elements(&buffer);
    assert!(iter.next().is_some());
    assert_eq!(iter.next(), None);
    assert!(iter.is_truncated());
    assert_eq!(iter.next(), None);
  }

  #[test]
  fn overrunning_long_form_header_stops_the_walk() {
    // The buffer ends 10 bytes into an OW header, before its 32 bits length
    let buffer = FileBuilder::new()
      .explicit_text(0x0010, 0x0010, "PN", "Doe^John")
      .raw(&[0xE0, 0x7F, 0x10, 0x00, b'O', b'W', 0x00, 0x00, 0x04, 0x00])
      .build();
    let mut iter = elements(&buffer);
    assert_eq!(iter.by_ref().count(), 1);
    assert!(iter.is_truncated());

    let metadata = crate::metadata::parse_metadata(&buffer).unwrap();
    assert_eq!(metadata.text("patientName"), Some("Doe^John"));
    assert!(metadata.is_truncated());
  }

  #[test]
  fn short_tail_ends_the_walk_without_truncation() {
    let mut buffer = FileBuilder::new().explicit_u16(0x0028, 0x0010, 4).build();
    buffer.extend_from_slice(&[0x28, 0x00, 0x11, 0x00, b'U', b'S', 0x02, 0x00]);
    let mut iter = elements(&buffer);
    assert_eq!(iter.by_ref().count(), 1);
    assert!(!iter.is_truncated());
  }

  #[test]
  fn empty_values_still_advance() {
    let buffer = FileBuilder::new()
      .explicit(0x0010, 0x0010, "PN", b"")
      .explicit(0x0010, 0x0020, "LO", b"")
      .explicit_u16(0x0028, 0x0010, 1)
      .build();
    assert_eq!(elements(&buffer).count(), 3);
  }

  #[test]
  fn undefined_length_sequences_are_walked_into() {
    let buffer = FileBuilder::new()
      .sequence_start(0x0088, 0x0200)
      .item_start()
      .explicit_u16(0x0028, 0x0010, 64)
      .item_end()
      .sequence_end()
      .explicit_u16(0x0028, 0x0010, 512)
      .build();
    let found: Vec<_> = elements(&buffer).collect();
    let depths: Vec<_> = found.iter().map(|e| e.depth).collect();
    assert_eq!(depths, vec![0, 1, 2, 1, 0, 0]);
    assert!(found[0].undefined_length);
    assert!(found[1].is(&Item));
    let top_level_rows: Vec<_> = found
      .iter()
      .filter(|e| e.is_top_level() && e.is(&Rows))
      .filter_map(|e| e.value_as_u16())
      .collect();
    assert_eq!(top_level_rows, vec![512]);
  }

  #[test]
  fn defined_length_items_are_skipped_whole() {
    let inner = FileBuilder::empty().explicit_u16(0x0028, 0x0010, 64).build();
    let buffer = FileBuilder::new()
      .sequence_start(0x0088, 0x0200)
      .implicit(0xFFFE, 0xE000, &inner)
      .sequence_end()
      .explicit_u16(0x0028, 0x0010, 512)
      .build();
    let depths: Vec<_> = elements(&buffer).map(|e| e.depth).collect();
    assert_eq!(depths, vec![0, 1, 0, 0]);
  }

  #[test]
  fn item_lengths_looking_like_a_vr_are_not_mistaken() {
    // An item of 0x4141 bytes would read as "AA" with the heuristic alone
    let mut buffer = FileBuilder::new().sequence_start(0x0088, 0x0200).build();
    buffer.extend_from_slice(&[0xFE, 0xFF, 0x00, 0xE0, 0x41, 0x41, 0x00, 0x00]);
    buffer.extend(std::iter::repeat(0).take(0x4141));
    let found: Vec<_> = elements(&buffer).collect();
    assert_eq!(found.len(), 2);
    assert_eq!(found[1].vr, None);
    assert_eq!(found[1].value_length, 0x4141);
  }

  #[test]
  fn encapsulated_pixel_data_is_reported_with_an_undefined_length() {
    let buffer = FileBuilder::new()
      .explicit_u16(0x0028, 0x0010, 2)
      .encapsulated_pixel_data(&[&[1, 2, 3, 4]])
      .build();
    let pixel_data = elements(&buffer).find(|e| e.is(&PixelData));
    assert!(matches!(pixel_data, Some(e) if e.undefined_length && e.value.is_empty()));
  }

  #[test]
  fn text_values_are_cleaned() {
    let buffer = FileBuilder::new()
      .explicit(0x0010, 0x0010, "PN", b" Doe^John\0\0 ")
      .explicit(0x0010, 0x0020, "LO", b"\xffAB")
      .build();
    let found: Vec<_> = elements(&buffer).collect();
    assert_eq!(found[0].value_as_text(), "Doe^John");
    assert_eq!(found[1].value_as_text(), "\u{FFFD}AB");
  }

  #[test]
  fn numeric_decoding_requires_the_exact_length() {
    let buffer = FileBuilder::new()
      .explicit(0x0028, 0x0010, "US", &[1, 0, 0, 0])
      .explicit(0x0002, 0x0000, "UL", &[1, 0])
      .build();
    let found: Vec<_> = elements(&buffer).collect();
    assert_eq!(found[0].value_as_u16(), None);
    assert_eq!(found[0].value_as_u32(), Some(1));
    assert_eq!(found[1].value_as_u32(), None);
  }
}
