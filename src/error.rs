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

use std::error::Error;
use std::fmt;

/// Reason a buffer was rejected before any element was read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderError {
  /// Shorter than the 128 bytes preamble plus the magic word.
  TooShort { length: usize },
  /// Long enough, but bytes 128..132 are not `DICM`.
  BadMagic,
}

impl HeaderError {
  /// Short machine readable reason, as reported to the preview layer.
  pub fn reason(&self) -> &'static str {
    match self {
      HeaderError::TooShort { .. } => "too_short",
      HeaderError::BadMagic => "bad_magic",
    }
  }
}

impl fmt::Display for HeaderError {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    match self {
      HeaderError::TooShort { length } => write!(
        f,
        "Not a DICOM file: {} bytes is too short for a preamble and a DICM prefix",
        length
      ),
      HeaderError::BadMagic => write!(f, "Not a DICOM file: DICM prefix not found"),
    }
  }
}

impl Error for HeaderError {}

#[derive(Debug)]
pub struct DicomError {
  pub details: String,
}

impl DicomError {
  pub fn new(msg: &str) -> DicomError {
    DicomError {
      details: msg.to_string(),
    }
  }
}

impl fmt::Display for DicomError {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    write!(f, "{}", self.details)
  }
}

impl Error for DicomError {}

impl From<HeaderError> for DicomError {
  fn from(err: HeaderError) -> Self {
    DicomError::new(&err.to_string())
  }
}
