/*
    MartyPC
    https://github.com/dbalsom/martypc

    Copyright 2022-2025 Daniel Balsom

    Permission is hereby granted, free of charge, to any person obtaining a
    copy of this software and associated documentation files (the “Software”),
    to deal in the Software without restriction, including without limitation
    the rights to use, copy, modify, merge, publish, distribute, sublicense,
    and/or sell copies of the Software, and to permit persons to whom the
    Software is furnished to do so, subject to the following conditions:

    The above copyright notice and this permission notice shall be included in
    all copies or substantial portions of the Software.

    THE SOFTWARE IS PROVIDED “AS IS”, WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
    IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
    FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
    AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
    LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING
    FROM, OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER
    DEALINGS IN THE SOFTWARE.

    --------------------------------------------------------------------------

    config.rs

    Card configuration, deserialized from the [incolor] table of a TOML
    configuration file.

*/

use std::{
    path::{Path, PathBuf},
    str::FromStr,
};

use serde::Deserialize;

use crate::error::InColorError;

/// Default host CPU clock: a 4.77MHz PC/XT.
pub const DEFAULT_CLOCK_HZ: f64 = 4_772_727.0;

/// Identity of the host chipset. Only used to select firmware workarounds.
#[derive(Copy, Clone, Debug, Default, Deserialize, PartialEq, Eq)]
pub enum HostChipset {
    #[default]
    Generic,
    I440fx,
}

impl FromStr for HostChipset {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, String>
    where
        Self: Sized,
    {
        match s {
            "Generic" => Ok(HostChipset::Generic),
            "I440fx" => Ok(HostChipset::I440fx),
            _ => Err("Bad value for chipset".to_string()),
        }
    }
}

/// Size of the memory window claimed at power-on. Software can change it later through the
/// configuration switch.
#[derive(Copy, Clone, Debug, Default, Deserialize, PartialEq, Eq)]
pub enum MemoryWindow {
    Half,
    #[default]
    Full,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct InColorConfig {
    pub chipset: HostChipset,
    pub clock_hz: f64,
    pub font_rom: Option<PathBuf>,
    pub trace_file: Option<PathBuf>,
    pub palette_extension: bool,
    pub memory_window: MemoryWindow,
}

impl Default for InColorConfig {
    fn default() -> Self {
        Self {
            chipset: HostChipset::Generic,
            clock_hz: DEFAULT_CLOCK_HZ,
            font_rom: None,
            trace_file: None,
            palette_extension: false,
            memory_window: MemoryWindow::Full,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFileParams {
    #[serde(default)]
    incolor: InColorConfig,
}

impl InColorConfig {
    /// Parse a configuration from TOML text. A missing [incolor] table yields the defaults.
    pub fn from_toml_str(toml_text: &str) -> Result<Self, InColorError> {
        let params: ConfigFileParams = toml::from_str(toml_text)?;
        Ok(params.incolor)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, InColorError> {
        let toml_text = std::fs::read_to_string(path.as_ref()).map_err(|source| InColorError::ConfigIo {
            path: path.as_ref().to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&toml_text)
    }
}
