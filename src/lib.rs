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

//! Decoder for the DICOM files shown in a preview: header check, a fixed set of
//! metadata fields, native 16 bits pixel data and its grayscale rendering.
//!
//! Every entry point takes the whole file content and keeps no state between
//! calls.
//!
//! ```
//! use dcmpreview::synthetic::phantom;
//! use dcmpreview::{parse_metadata, parse_pixel_data, render_grayscale};
//!
//! let buffer = phantom(64, 32);
//! let metadata = parse_metadata(&buffer).unwrap();
//! assert_eq!(metadata.text("modality"), Some("CT"));
//!
//! let pixels = parse_pixel_data(&buffer).unwrap().expect("native pixel data");
//! let raster = render_grayscale(&pixels);
//! assert_eq!(raster.data.len(), 64 * 32 * 4);
//! ```

pub mod element;
pub mod error;
pub mod metadata;
pub mod misc;
pub mod pixel_data;
pub mod render;
pub mod synthetic;
pub mod tags;

pub use error::{DicomError, HeaderError};
pub use metadata::{parse_metadata, Metadata, MetadataValue};
pub use misc::validate_header;
pub use pixel_data::{parse_pixel_data, parse_pixel_data_with, PixelBuffer, PixelDataOptions};
pub use render::{render_grayscale, render_grayscale_into, GrayscaleRaster};
