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
use std::path::{Path, PathBuf};

use clap::Parser;
use image::RgbaImage;
use log::{info, warn};
use serde_json::{json, Map, Value};

use dcmpreview::error::DicomError;
use dcmpreview::metadata::{Metadata, MetadataValue};
use dcmpreview::render::{render_grayscale, sample_range, GrayscaleRaster};
use dcmpreview::{parse_metadata, parse_pixel_data_with};

mod config;
mod logging;

use crate::config::get_config;
use crate::logging::init_logger;

#[derive(Debug, Parser)]
/// Print the metadata of a DICOM file as JSON and render its pixel data
struct Opt {
  /// DICOM input file
  filepath: PathBuf,
  /// Write the grayscale rendering of the pixel data to this PNG file
  #[arg(long)]
  png: Option<PathBuf>,
  /// Print every recognized field, not only the configured ones
  #[arg(short, long)]
  all_fields: bool,
  /// Configuration file, see config.yaml
  #[arg(short, long)]
  config: Option<PathBuf>,
  /// Log more, repeat for even more
  #[arg(short, long, action = clap::ArgAction::Count)]
  verbose: u8,
}

fn to_json(value: &MetadataValue) -> Value {
  match value {
    MetadataValue::Text(text) => Value::from(text.as_str()),
    MetadataValue::Integer(integer) => Value::from(*integer),
  }
}

// The configured fields found in the file, in the configuration order.
fn configured_fields(metadata: &Metadata, fields: &[String]) -> Map<String, Value> {
  fields
    .iter()
    .filter_map(|field| metadata.get(field).map(|value| (field.clone(), to_json(value))))
    .collect()
}

fn save_png(raster: GrayscaleRaster, path: &Path) -> Result<(), Box<dyn Error>> {
  let (width, height) = (raster.width as u32, raster.height as u32);
  let image = RgbaImage::from_raw(width, height, raster.data)
    .ok_or_else(|| DicomError::new(&format!("raster does not fit a {}x{} image", width, height)))?;
  image.save(path)?;
  Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
  let opt = Opt::parse();
  init_logger(opt.verbose);
  let config = get_config(&opt.config)?;

  let buffer = std::fs::read(&opt.filepath)?;
  let metadata = match parse_metadata(&buffer) {
    Ok(metadata) => metadata,
    Err(e) => {
      println!("{}", json!({ "error": e.reason() }));
      return Err(Box::new(DicomError::new(&format!("{}: {}", opt.filepath.display(), e))));
    }
  };
  if metadata.is_truncated() {
    warn!("{} is truncated, metadata may be incomplete", opt.filepath.display());
  }
  let fields: Map<String, Value> = if opt.all_fields {
    metadata.iter().map(|(name, value)| (name.to_string(), to_json(value))).collect()
  } else {
    configured_fields(&metadata, &config.fields)
  };
  if fields.is_empty() {
    eprintln!("No Metadata Found");
  }
  println!("{}", serde_json::to_string_pretty(&fields)?);

  match parse_pixel_data_with(&buffer, &config.pixel_data_options())? {
    None => eprintln!("No Pixel Data"),
    Some(pixels) => {
      if !pixels.is_complete() {
        warn!("{} samples for {}x{} pixels, the image will be partial",
          pixels.data.len(), pixels.cols, pixels.rows);
      }
      if let Some((min, max)) = sample_range(&pixels.data) {
        info!("{}x{} pixels, samples in [{}, {}]", pixels.cols, pixels.rows, min, max);
      }
      if let Some(png) = &opt.png {
        save_png(render_grayscale(&pixels), png)?;
        info!("rendering written to {}", png.display());
      }
    }
  }
  Ok(())
}
