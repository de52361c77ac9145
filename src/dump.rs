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
use std::path::PathBuf;

use clap::Parser;

use dcmpreview::element::{elements, Element};
use dcmpreview::error::DicomError;
use dcmpreview::metadata::decode_field;
use dcmpreview::misc::validate_header;
use dcmpreview::tags::{lookup, Item, ItemDelimitationItem, PixelData, SequenceDelimitationItem};

mod logging;

use crate::logging::init_logger;

#[derive(Debug, Parser)]
/// A dcmdump like listing of the elements as the preview decoder walks them
struct Opt {
  /// DICOM input file to be dumped
  filepath: PathBuf,
  /// Log more, repeat for even more
  #[arg(short, long, action = clap::ArgAction::Count)]
  verbose: u8,
}

// Hexadecimal preview of a binary value, cut after 64 characters.
fn hex_preview(bytes: &[u8]) -> String {
  let mut result = String::with_capacity(40);
  let mut it = bytes.iter().peekable();
  while let Some(n) = it.next() {
    result.push_str(&format!("{:02x}", n));
    if result.len() >= 64 {
      result.replace_range(64.., "...");
      break;
    }
    if it.peek().is_some() {
      result.push('\\');
    }
  }
  result
}

//                                 (value,  name)
fn describe(element: &Element) -> (String, &'static str) {
  for tag in [&Item, &ItemDelimitationItem, &SequenceDelimitationItem] {
    if element.is(tag) {
      return (format!("({})", tag.name), tag.name);
    }
  }
  if element.is(&PixelData) {
    let value = if element.undefined_length {
      "(encapsulated pixel data)".to_string()
    } else {
      format!("(native pixel data, {} samples)", element.value_length / 2)
    };
    return (value, PixelData.name);
  }
  if element.undefined_length {
    return ("(Sequence with undefined length)".to_string(), "Unknown Tag & Data");
  }
  match lookup(element.group, element.element) {
    Some(descriptor) => {
      let value = match decode_field(descriptor, element) {
        Some(value) => {
          let mut display_value = value.to_string();
          if display_value.chars().count() > 66 {
            display_value = display_value.chars().take(66).collect::<String>() + "...";
          }
          format!("[{}]", display_value)
        }
        None => "(unexpected length)".to_string(),
      };
      (value, descriptor.field_name)
    }
    None if element.value.is_empty() => ("(no value available)".to_string(), "Unknown Tag & Data"),
    None => (hex_preview(element.value), "Unknown Tag & Data"),
  }
}

fn main() -> Result<(), Box<dyn Error>> {
  let opt = Opt::parse();
  init_logger(opt.verbose);

  let buffer = std::fs::read(&opt.filepath)?;
  if let Err(e) = validate_header(&buffer) {
    return Err(Box::new(DicomError::new(&format!("{}: {}", opt.filepath.display(), e))));
  }

  println!();
  println!("# Dicom-File-Format");
  println!();

  let mut header = true;
  println!("# Dicom-Meta-Information-Header");
  let mut iter = elements(&buffer);
  for element in iter.by_ref() {
    if header && element.group > 0x0002 {
      header = false;
      println!();
      println!("# Dicom-Data-Set");
    }
    let (value, name) = describe(&element);
    let length = if element.undefined_length {
      "u/l".to_string()
    } else {
      format!("{}", element.value_length)
    };
    println!("{}({:04x},{:04x}) {} {: <40} # {: >5} {}",
      " ".repeat(element.depth * 2), element.group, element.element, element.vr_str(),
      value, length, name);
  }
  if iter.is_truncated() {
    println!("# Truncated element at {:#x}, file size is {:#x}", iter.offset(), buffer.len());
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use dcmpreview::synthetic::FileBuilder;

  #[test]
  fn hex_preview_is_cut() {
    assert_eq!(hex_preview(&[0x01, 0xab]), "01\\ab");
    assert!(hex_preview(&[0xff; 100]).ends_with("..."));
  }

  #[test]
  fn recognized_elements_show_their_field() {
    let buffer = FileBuilder::new()
      .explicit_text(0x0008, 0x0060, "CS", "CT")
      .pixel_data(&[1, 2, 3])
      .build();
    let described: Vec<_> = elements(&buffer).map(|e| describe(&e)).collect();
    assert_eq!(described[0], ("[CT]".to_string(), "modality"));
    assert_eq!(described[1], ("(native pixel data, 3 samples)".to_string(), "PixelData"));
  }
}
