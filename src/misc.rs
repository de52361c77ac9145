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

use crate::error::HeaderError;

/// Size of the leading preamble, its content is ignored.
pub const PREAMBLE_LENGTH: usize = 128;
pub const MAGIC: &[u8; 4] = b"DICM";
/// Offset of the first data element, right after the preamble and the magic word.
pub const DATA_SET_OFFSET: usize = PREAMBLE_LENGTH + MAGIC.len();

/**
 * Check the buffer starts with a 128 bytes preamble followed by `DICM`.
 * Must pass before any element of the buffer is interpreted.
 */
pub fn validate_header(buffer: &[u8]) -> Result<(), HeaderError> {
  if buffer.len() < DATA_SET_OFFSET {
    return Err(HeaderError::TooShort { length: buffer.len() });
  }
  if &buffer[PREAMBLE_LENGTH..DATA_SET_OFFSET] != MAGIC {
    return Err(HeaderError::BadMagic);
  }
  Ok(())
}

pub fn has_dicom_header(buffer: &[u8]) -> bool {
  validate_header(buffer).is_ok()
}

/**
 * Check if a file is a DICOM file.
 * Imperfect heuristic for now, only the header is looked at.
 */
pub fn is_dicom_file(file_path: &str) -> bool {
  match std::fs::read(file_path) {
    Ok(buf) => is_dicom(&buf),
    Err(_) => false,
  }
}

pub fn is_dicom(buffer: &[u8]) -> bool {
  has_dicom_header(buffer)
}
