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
use log::info;

use dcmpreview::synthetic::phantom;

mod logging;

use crate::logging::init_logger;

#[derive(Debug, Parser)]
/// Write a synthetic CT phantom as an explicit VR little endian DICOM file
struct Opt {
  /// Output file
  output: PathBuf,
  #[arg(long, default_value_t = 512)]
  rows: u16,
  #[arg(long, default_value_t = 512)]
  cols: u16,
  /// Log more, repeat for even more
  #[arg(short, long, action = clap::ArgAction::Count)]
  verbose: u8,
}

fn main() -> Result<(), Box<dyn Error>> {
  let opt = Opt::parse();
  init_logger(opt.verbose);
  let buffer = phantom(opt.rows, opt.cols);
  std::fs::write(&opt.output, &buffer)?;
  info!("{} bytes written to {}", buffer.len(), opt.output.display());
  Ok(())
}
