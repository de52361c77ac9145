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

#![allow(non_upper_case_globals)]

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tag {
  pub group: u16,
  pub element: u16,
  pub name: &'static str,
}

impl Tag {
  pub fn matches(&self, group: u16, element: u16) -> bool {
    self.group == group && self.element == element
  }
}

pub const Rows: Tag = Tag { group: 0x0028, element: 0x0010, name: "Rows" };
pub const Columns: Tag = Tag { group: 0x0028, element: 0x0011, name: "Columns" };
pub const PixelData: Tag = Tag { group: 0x7FE0, element: 0x0010, name: "PixelData" };
pub const Item: Tag = Tag { group: 0xFFFE, element: 0xE000, name: "Item" };
pub const ItemDelimitationItem: Tag = Tag {
  group: 0xFFFE,
  element: 0xE00D,
  name: "ItemDelimitationItem",
};
pub const SequenceDelimitationItem: Tag = Tag {
  group: 0xFFFE,
  element: 0xE0DD,
  name: "SequenceDelimitationItem",
};

/// How the value bytes of a recognized tag are turned into a metadata value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldDecoder {
  /// UTF-8 text, NUL bytes removed and surrounding whitespace trimmed.
  Text,
  /// Little-endian u16, only when the value is exactly 2 bytes long.
  U16,
  /// Little-endian u32, only when the value is exactly 4 bytes long.
  U32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagDescriptor {
  pub group: u16,
  pub element: u16,
  pub field_name: &'static str,
  pub decoder: FieldDecoder,
}

const fn field(group: u16, element: u16, field_name: &'static str, decoder: FieldDecoder)
  -> TagDescriptor {
  TagDescriptor { group, element, field_name, decoder }
}

// Sorted by (group, element), `lookup` relies on it.
pub static ALLOWLIST: [TagDescriptor; 28] = [
  field(0x0002, 0x0000, "metaGroupLength", FieldDecoder::U32),
  field(0x0002, 0x0010, "transferSyntaxUid", FieldDecoder::Text),
  field(0x0008, 0x0016, "sopClassUid", FieldDecoder::Text),
  field(0x0008, 0x0018, "sopInstanceUid", FieldDecoder::Text),
  field(0x0008, 0x0020, "studyDate", FieldDecoder::Text),
  field(0x0008, 0x0030, "studyTime", FieldDecoder::Text),
  field(0x0008, 0x0060, "modality", FieldDecoder::Text),
  field(0x0008, 0x0070, "manufacturer", FieldDecoder::Text),
  field(0x0008, 0x1030, "studyDesc", FieldDecoder::Text),
  field(0x0008, 0x103E, "seriesDesc", FieldDecoder::Text),
  field(0x0010, 0x0010, "patientName", FieldDecoder::Text),
  field(0x0010, 0x0020, "patientId", FieldDecoder::Text),
  field(0x0010, 0x0030, "patientBirthDate", FieldDecoder::Text),
  field(0x0010, 0x0040, "patientSex", FieldDecoder::Text),
  field(0x0018, 0x0050, "sliceThickness", FieldDecoder::Text),
  field(0x0020, 0x000D, "studyInstanceUid", FieldDecoder::Text),
  field(0x0020, 0x000E, "seriesInstanceUid", FieldDecoder::Text),
  field(0x0020, 0x0011, "seriesNumber", FieldDecoder::Text),
  field(0x0020, 0x0013, "instanceNumber", FieldDecoder::Text),
  field(0x0028, 0x0002, "samplesPerPixel", FieldDecoder::U16),
  field(0x0028, 0x0004, "photometricInterpretation", FieldDecoder::Text),
  field(0x0028, 0x0010, "rows", FieldDecoder::U16),
  field(0x0028, 0x0011, "cols", FieldDecoder::U16),
  field(0x0028, 0x0030, "pixelSpacing", FieldDecoder::Text),
  field(0x0028, 0x0100, "bitsAllocated", FieldDecoder::U16),
  field(0x0028, 0x0101, "bitsStored", FieldDecoder::U16),
  field(0x0028, 0x0102, "highBit", FieldDecoder::U16),
  field(0x0028, 0x0103, "pixelRepresentation", FieldDecoder::U16),
];

pub fn lookup(group: u16, element: u16) -> Option<&'static TagDescriptor> {
  ALLOWLIST
    .binary_search_by_key(&(group, element), |d| (d.group, d.element))
    .ok()
    .map(|index| &ALLOWLIST[index])
}

pub fn lookup_by_name(field_name: &str) -> Option<&'static TagDescriptor> {
  ALLOWLIST.iter().find(|d| d.field_name == field_name)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn allowlist_is_sorted_and_unique() {
    assert!(ALLOWLIST
      .windows(2)
      .all(|w| (w[0].group, w[0].element) < (w[1].group, w[1].element)));
  }

  #[test]
  fn field_names_are_unique() {
    for descriptor in ALLOWLIST.iter() {
      assert_eq!(lookup_by_name(descriptor.field_name), Some(descriptor));
    }
  }

  #[test]
  fn lookup_finds_every_entry() {
    for descriptor in ALLOWLIST.iter() {
      assert_eq!(lookup(descriptor.group, descriptor.element), Some(descriptor));
    }
    assert_eq!(lookup(0x0028, 0x0010).map(|d| d.field_name), Some("rows"));
    assert_eq!(lookup(0x0008, 0x103E).map(|d| d.field_name), Some("seriesDesc"));
  }

  #[test]
  fn unknown_tags_are_not_recognized() {
    assert_eq!(lookup(0x7FE0, 0x0010), None);
    assert_eq!(lookup(0x0009, 0x0010), None);
  }

  #[test]
  fn well_known_tags() {
    assert!(PixelData.matches(0x7FE0, 0x0010));
    assert!(!Rows.matches(Columns.group, Columns.element));
  }
}
