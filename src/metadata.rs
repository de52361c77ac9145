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

use std::collections::BTreeMap;
use std::fmt;

use log::debug;
#[cfg(feature = "serde")]
use serde::Serialize;

use crate::element::{elements, Element};
use crate::error::HeaderError;
use crate::misc::validate_header;
use crate::tags::{lookup, FieldDecoder, TagDescriptor};

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize), serde(untagged))]
pub enum MetadataValue {
  Text(String),
  Integer(u32),
}

impl fmt::Display for MetadataValue {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    match self {
      MetadataValue::Text(value) => write!(f, "{}", value),
      MetadataValue::Integer(value) => write!(f, "{}", value),
    }
  }
}

impl MetadataValue {
  pub fn as_text(&self) -> Option<&str> {
    match self {
      MetadataValue::Text(value) => Some(value),
      MetadataValue::Integer(_) => None,
    }
  }

  pub fn as_integer(&self) -> Option<u32> {
    match self {
      MetadataValue::Integer(value) => Some(*value),
      MetadataValue::Text(_) => None,
    }
  }
}

/// Recognized fields found in a file. Absent fields are never filled in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize), serde(transparent))]
pub struct Metadata {
  fields: BTreeMap<&'static str, MetadataValue>,
  #[cfg_attr(feature = "serde", serde(skip))]
  truncated: bool,
}

impl Metadata {
  pub fn get(&self, field_name: &str) -> Option<&MetadataValue> {
    self.fields.get(field_name)
  }

  pub fn text(&self, field_name: &str) -> Option<&str> {
    self.get(field_name).and_then(MetadataValue::as_text)
  }

  pub fn integer(&self, field_name: &str) -> Option<u32> {
    self.get(field_name).and_then(MetadataValue::as_integer)
  }

  pub fn len(&self) -> usize {
    self.fields.len()
  }

  pub fn is_empty(&self) -> bool {
    self.fields.is_empty()
  }

  pub fn iter(&self) -> impl Iterator<Item = (&'static str, &MetadataValue)> + '_ {
    self.fields.iter().map(|(name, value)| (*name, value))
  }

  /// True if the scan stopped early on an element running past the end of the buffer.
  pub fn is_truncated(&self) -> bool {
    self.truncated
  }
}

pub fn decode_field(descriptor: &TagDescriptor, element: &Element) -> Option<MetadataValue> {
  match descriptor.decoder {
    FieldDecoder::Text => Some(MetadataValue::Text(element.value_as_text())),
    FieldDecoder::U16 => element.value_as_u16().map(|v| MetadataValue::Integer(v as u32)),
    FieldDecoder::U32 => element.value_as_u32().map(MetadataValue::Integer),
  }
}

/**
 * Extract the recognized fields of a DICOM buffer.
 * A buffer cut in the middle of an element gives the fields read before the cut.
 */
pub fn parse_metadata(buffer: &[u8]) -> Result<Metadata, HeaderError> {
  validate_header(buffer)?;

  let mut metadata = Metadata::default();
  let mut iter = elements(buffer);
  for element in iter.by_ref() {
    if !element.is_top_level() || element.undefined_length {
      continue;
    }
    let Some(descriptor) = lookup(element.group, element.element) else {
      continue;
    };
    match decode_field(descriptor, &element) {
      Some(value) => {
        metadata.fields.insert(descriptor.field_name, value);
      }
      None => debug!(
        "{} ({:04x},{:04x}) has an unexpected length of {}, ignored",
        descriptor.field_name, element.group, element.element, element.value_length
      ),
    }
  }
  metadata.truncated = iter.is_truncated();
  Ok(metadata)
}
