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

#![allow(dead_code)]

use std::env;
use std::error::Error;
use std::path::{Path, PathBuf};

use dcmpreview::pixel_data::{PixelDataOptions, DEFAULT_DIMENSION};
use dcmpreview::tags::lookup_by_name;
use log::{info, warn};
use serde::Deserialize;

const DEFAULT_CONFIG: &str = include_str!("../config.yaml");

#[derive(Deserialize, Debug)]
pub struct PixelDataConfig {
  pub default_rows: u16,
  pub default_cols: u16,
}

impl Default for PixelDataConfig {
  fn default() -> Self {
    PixelDataConfig { default_rows: DEFAULT_DIMENSION, default_cols: DEFAULT_DIMENSION }
  }
}

#[derive(Deserialize, Debug)]
pub struct Config {
  pub fields: Vec<String>,
  #[serde(default)]
  pub pixel_data: PixelDataConfig,
}

impl Config {
  pub fn pixel_data_options(&self) -> PixelDataOptions {
    PixelDataOptions {
      default_rows: self.pixel_data.default_rows,
      default_cols: self.pixel_data.default_cols,
    }
  }
}

#[derive(Debug, PartialEq)]
pub enum ConfigProvenance {
  Default,
  XdgPath(PathBuf),
  CustomPath(PathBuf),
}

fn is_file_not_empty<P: AsRef<Path>>(path: P) -> bool {
  match std::fs::metadata(path) {
    Ok(metadata) => metadata.is_file() && metadata.len() > 0,
    Err(..) => false,
  }
}

fn xdg_config_path() -> Option<PathBuf> {
  let base = env::var("XDG_CONFIG_HOME")
    .map(PathBuf::from)
    .or_else(|_| env::var("HOME").map(|home| Path::new(&home).join(".config")))
    .ok()?;
  Some(base.join(env!("CARGO_PKG_NAME")).join("config.yaml"))
}

pub fn parse_config(content: &str) -> Result<Config, Box<dyn Error>> {
  let config: Config = serde_yaml::from_str(content)?;
  for field in config.fields.iter().filter(|f| lookup_by_name(f).is_none()) {
    warn!("{} is not a recognized metadata field, it will always be undefined", field);
  }
  Ok(config)
}

// Get the config file from the command line option --config
// Otherwise get it from XDG_CONFIG_HOME
// Otherwise use the embedded one.
pub fn get_config(config_path: &Option<PathBuf>) -> Result<Config, Box<dyn Error>> {
  let (content, provenance) = if let Some(config_file) = config_path {
    match std::fs::read_to_string(config_file) {
      Ok(content) => (content, ConfigProvenance::CustomPath(config_file.clone())),
      Err(e) => Err(format!("error: {e}: {}", config_file.display()))?,
    }
  } else {
    match xdg_config_path().filter(|path| is_file_not_empty(path)) {
      Some(path) => match std::fs::read_to_string(&path) {
        Ok(content) => (content, ConfigProvenance::XdgPath(path)),
        Err(e) => Err(format!("error: {e}: {}", path.display()))?,
      },
      None => (DEFAULT_CONFIG.to_string(), ConfigProvenance::Default),
    }
  };
  info!("using configuration {:?}", provenance);
  parse_config(&content)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn embedded_config_is_valid() {
    let config = parse_config(DEFAULT_CONFIG).unwrap();
    assert!(config.fields.iter().all(|f| lookup_by_name(f).is_some()));
    assert_eq!(config.pixel_data_options(), PixelDataOptions::default());
  }

  #[test]
  fn pixel_data_section_is_optional() {
    let config = parse_config("fields: [modality]").unwrap();
    assert_eq!(config.fields, vec!["modality".to_string()]);
    assert_eq!(config.pixel_data.default_rows, 512);
  }

  #[test]
  fn a_missing_custom_file_is_an_error() {
    assert!(get_config(&Some(PathBuf::from("/does/not/exist.yaml"))).is_err());
  }
}
