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

use std::collections::HashMap;
use std::error::Error;
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use clap::Parser;
use log::{info, warn};
use walkdir::WalkDir;

use dcmpreview::misc::is_dicom;
use dcmpreview::parse_metadata;

mod config;
mod logging;

use crate::config::get_config;
use crate::logging::init_logger;

const ESC: char = 27u8 as char;

fn path_is_folder(path: &str) -> Result<PathBuf, String> {
  let path_buf = PathBuf::from(path);
  if !path_buf.exists() {
    return Err(format!("{} does not exists", path));
  }
  if !path_buf.is_dir() {
    return Err(format!("{} is not a folder", path));
  }
  Ok(path_buf)
}

#[derive(Debug, Parser)]
/// Index the preview metadata of every DICOM file of a folder as CSV
struct Opt {
  #[arg(short, long, value_parser = path_is_folder)]
  input_path: PathBuf,
  /// Write the index to this file instead of stdout
  #[arg(long)]
  csv_output: Option<PathBuf>,
  /// Configuration file, the `fields` entry selects the columns
  #[arg(short, long)]
  config: Option<PathBuf>,
  /// Log more, repeat for even more
  #[arg(short, long, action = clap::ArgAction::Count)]
  verbose: u8,
}

trait IndexStore {
  fn write(&mut self, data: &HashMap<String, String>) -> Result<(), Box<dyn Error>>;
}

struct CsvIndexStore<W: Write> {
  writer: W,
  fields: Vec<String>,
}

fn quote(value: &str) -> String {
  format!("\"{}\"", value.replace('"', "\"\""))
}

impl<W: Write> CsvIndexStore<W> {
  fn new(mut writer: W, fields: Vec<String>) -> Result<Self, io::Error> {
    let header = fields.iter().map(|s| quote(s)).collect::<Vec<String>>().join(",");
    writeln!(writer, "{},\"filepath\"", header)?;
    Ok(CsvIndexStore { writer, fields })
  }
}

impl<W: Write> IndexStore for CsvIndexStore<W> {
  fn write(&mut self, data: &HashMap<String, String>) -> Result<(), Box<dyn Error>> {
    let undefined = "undefined".to_string();
    for field in &self.fields {
      write!(self.writer, "{},", quote(data.get(field).unwrap_or(&undefined)))?;
    }
    writeln!(self.writer, "{}", quote(data.get("filepath").unwrap_or(&undefined)))?;
    Ok(())
  }
}

// Row of the index for one file, `None` if it is not a DICOM file.
fn index_file(buffer: &[u8], filepath: &Path, fields: &[String]) -> Option<HashMap<String, String>> {
  if !is_dicom(buffer) {
    return None;
  }
  let metadata = parse_metadata(buffer).ok()?;
  if metadata.is_truncated() {
    warn!("{} is truncated", filepath.display());
  }
  let mut data = HashMap::<String, String>::new();
  // We want the filepath in the index by default
  data.insert("filepath".to_string(), filepath.to_string_lossy().to_string());
  for field in fields {
    if let Some(value) = metadata.get(field) {
      data.insert(field.to_string(), value.to_string());
    }
  }
  Some(data)
}

fn walk(input_path: &Path, f: &mut dyn FnMut(&Path)) -> Result<usize, Box<dyn Error>> {
  let mut count = 0;
  for result in WalkDir::new(input_path) {
    let entry = result?;
    let filepath = entry.path();
    let wheel = "-\\|/";
    if filepath.is_file() {
      f(filepath);
      let w = wheel.as_bytes()[count / 10 % 4] as char;
      eprint!("{}[2K\r{} {}", ESC, w, filepath.display());
      count += 1;
    }
  }
  eprintln!("{}[2K\r{} files found", ESC, count);
  Ok(count)
}

fn main() -> Result<(), Box<dyn Error>> {
  let opt = Opt::parse();
  init_logger(opt.verbose);
  let config = get_config(&opt.config)?;

  let writer = if let Some(csv_output) = &opt.csv_output {
    Box::new(File::create(csv_output)?) as Box<dyn Write>
  } else {
    Box::new(io::stdout()) as Box<dyn Write>
  };
  let mut index_store = CsvIndexStore::new(writer, config.fields.clone())?;
  let mut indexed = 0;
  walk(&opt.input_path, &mut |filepath: &Path| {
    let buffer = match std::fs::read(filepath) {
      Ok(buffer) => buffer,
      Err(e) => {
        warn!("{}: {}", filepath.display(), e);
        return;
      }
    };
    if let Some(data) = index_file(&buffer, filepath, &config.fields) {
      match index_store.write(&data) {
        Ok(()) => indexed += 1,
        Err(e) => warn!("{}: {}", filepath.display(), e),
      }
    }
  })?;
  info!("{} DICOM files indexed", indexed);
  Ok(())
}
