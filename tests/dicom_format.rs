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

use rstest::rstest;

use dcmpreview::synthetic::{phantom, phantom_samples, FileBuilder};
use dcmpreview::{
  parse_metadata, parse_pixel_data, render_grayscale, validate_header, HeaderError, MetadataValue,
  PixelBuffer,
};

fn ramp(count: usize) -> Vec<i16> {
  (0..count).map(|i| (i * 32767 / (count - 1)) as i16).collect()
}

fn metadata_only() -> FileBuilder {
  FileBuilder::new()
    .explicit_text(0x0008, 0x0020, "DA", "20230615")
    .explicit_text(0x0008, 0x0060, "CS", "MR")
    .explicit_text(0x0008, 0x103E, "LO", "Sagittal T2")
    .explicit_text(0x0010, 0x0010, "PN", "Roe^Richard")
    .explicit_text(0x0010, 0x0020, "LO", "PID-001")
    .explicit_text(0x0020, 0x0013, "IS", "12")
    .explicit_u16(0x0028, 0x0010, 256)
    .explicit_u16(0x0028, 0x0011, 128)
}

#[rstest]
#[case(0, Err(HeaderError::TooShort { length: 0 }))]
#[case(100, Err(HeaderError::TooShort { length: 100 }))]
#[case(131, Err(HeaderError::TooShort { length: 131 }))]
fn short_buffers(#[case] length: usize, #[case] expected: Result<(), HeaderError>) {
  let buffer = vec![0u8; length];
  assert_eq!(validate_header(&buffer), expected);
}

#[rstest]
#[case(*b"DICM", Ok(()))]
#[case(*b"DICX", Err(HeaderError::BadMagic))]
#[case(*b"PK\x03\x04", Err(HeaderError::BadMagic))]
fn magic_word(#[case] magic: [u8; 4], #[case] expected: Result<(), HeaderError>) {
  let mut buffer = vec![0u8; 132];
  buffer[128..132].copy_from_slice(&magic);
  assert_eq!(validate_header(&buffer), expected);
}

#[test]
fn pixel_data_round_trip() {
  let samples = ramp(256 * 128);
  let buffer = FileBuilder::new()
    .explicit_u16(0x0028, 0x0010, 256)
    .explicit_u16(0x0028, 0x0011, 128)
    .pixel_data(&samples)
    .build();
  let pixels = parse_pixel_data(&buffer).unwrap().expect("pixel data");
  assert_eq!(pixels.rows, 256);
  assert_eq!(pixels.cols, 128);
  assert_eq!(pixels.data, samples);
}

#[test]
fn ramp_renders_monotonically_from_black_to_white() {
  let pixels = PixelBuffer::new(ramp(64 * 64), 64, 64);
  let raster = render_grayscale(&pixels);
  assert_eq!((raster.width, raster.height), (64, 64));
  let gray: Vec<u8> = raster.data.chunks_exact(4).map(|rgba| rgba[0]).collect();
  assert_eq!(gray.first(), Some(&0));
  assert_eq!(gray.last(), Some(&255));
  assert!(gray.windows(2).all(|w| w[0] <= w[1]));
  assert!(raster.data.chunks_exact(4).all(|rgba| rgba[3] == 255));
}

#[test]
fn flat_image_renders_without_division_by_zero() {
  let raster = render_grayscale(&PixelBuffer::new(vec![1234; 16 * 8], 16, 8));
  assert!(raster.data.chunks_exact(4).all(|rgba| rgba[..3] == [0, 0, 0]));
}

#[test]
fn truncated_file_keeps_the_fields_read_so_far() {
  let mut buffer = metadata_only().pixel_data(&ramp(100)).build();
  buffer.truncate(buffer.len() - 50);
  let metadata = parse_metadata(&buffer).unwrap();
  assert!(metadata.is_truncated());
  assert_eq!(metadata.text("patientName"), Some("Roe^Richard"));
  assert_eq!(metadata.integer("cols"), Some(128));
  assert_eq!(parse_pixel_data(&buffer), Ok(None));
}

#[test]
fn metadata_without_pixel_data() {
  let buffer = metadata_only().build();
  let metadata = parse_metadata(&buffer).unwrap();
  let expected = [
    ("cols", MetadataValue::Integer(128)),
    ("instanceNumber", MetadataValue::Text("12".to_string())),
    ("modality", MetadataValue::Text("MR".to_string())),
    ("patientId", MetadataValue::Text("PID-001".to_string())),
    ("patientName", MetadataValue::Text("Roe^Richard".to_string())),
    ("rows", MetadataValue::Integer(256)),
    ("seriesDesc", MetadataValue::Text("Sagittal T2".to_string())),
    ("studyDate", MetadataValue::Text("20230615".to_string())),
  ];
  let found: Vec<_> = metadata.iter().map(|(name, value)| (name, value.clone())).collect();
  assert_eq!(found, expected.to_vec());
  assert_eq!(parse_pixel_data(&buffer), Ok(None));
}

#[test]
fn parsing_is_idempotent() {
  let buffer = phantom(32, 32);
  let first = parse_metadata(&buffer).unwrap();
  let second = parse_metadata(&buffer).unwrap();
  assert_eq!(first, second);
  assert_eq!(parse_pixel_data(&buffer), parse_pixel_data(&buffer));
}

#[test]
fn phantom_file_end_to_end() {
  let buffer = phantom(48, 40);
  let metadata = parse_metadata(&buffer).unwrap();
  assert_eq!(metadata.text("patientName"), Some("John^Doe"));
  assert_eq!(metadata.text("transferSyntaxUid"), Some("1.2.840.10008.1.2.1"));
  assert_eq!(metadata.text("pixelSpacing"), Some("0.625\\0.625"));
  assert_eq!(metadata.integer("pixelRepresentation"), Some(1));
  assert_eq!(metadata.integer("metaGroupLength").map(|l| l > 0), Some(true));

  let pixels = parse_pixel_data(&buffer).unwrap().expect("pixel data");
  assert_eq!((pixels.rows, pixels.cols), (48, 40));
  assert_eq!(pixels.data, phantom_samples(48, 40));

  let raster = render_grayscale(&pixels);
  // -500 is the darkest sample, 1000 the brightest
  let gray: Vec<u8> = raster.data.chunks_exact(4).map(|rgba| rgba[0]).collect();
  for (sample, value) in pixels.data.iter().zip(gray) {
    match sample {
      -500 => assert_eq!(value, 0),
      1000 => assert_eq!(value, 255),
      _ => assert!(value > 0 && value < 255),
    }
  }
}

#[test]
fn implicit_vr_file() {
  let samples: Vec<u8> = [10i16, -10, 20, -20].iter().flat_map(|s| s.to_le_bytes()).collect();
  let buffer = FileBuilder::new()
    .implicit(0x0010, 0x0010, b"Implicit^Pat")
    .implicit(0x0028, 0x0010, &2u16.to_le_bytes())
    .implicit(0x0028, 0x0011, &2u16.to_le_bytes())
    .implicit(0x7FE0, 0x0010, &samples)
    .build();
  assert_eq!(parse_metadata(&buffer).unwrap().text("patientName"), Some("Implicit^Pat"));
  assert_eq!(parse_pixel_data(&buffer), Ok(Some(PixelBuffer::new(vec![10, -10, 20, -20], 2, 2))));
}
