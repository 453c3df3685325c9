use crate::export::palette::PaletteColor;
use crate::scene::Rgb;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info};

pub const DEFAULT_CONFIG_FILE: &str = "picocad_export.ron";

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct ExportConfig {
    /// Zoom level stored in the project header.
    pub zoom: u32,

    /// Background used when the source has no world color.
    pub background: [u8; 3],

    /// Color picoCAD renders as transparent.
    pub alpha_color: PaletteColor,

    /// Face color for meshes without a material.
    pub fallback_color: PaletteColor,

    /// Decimal places of positions and vertices.
    pub vertex_precision: usize,

    /// Decimal places of texture coordinates.
    pub uv_precision: usize,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            zoom: 16,
            background: [0, 0, 0],
            alpha_color: PaletteColor::Black,
            fallback_color: PaletteColor::LightGray,
            vertex_precision: 1,
            uv_precision: 1,
        }
    }
}

impl ExportConfig {
    /// Loads an explicitly given config file, or `picocad_export.ron` from the working
    /// directory if it exists.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load_file(path),
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::load_file(Path::new(DEFAULT_CONFIG_FILE))
            }
            None => {
                debug!("No config file found, using defaults.");
                Ok(Self::default())
            }
        }
    }

    fn load_file(path: &Path) -> Result<Self> {
        let config_str = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
        let config = Self::parse(&config_str)
            .with_context(|| format!("Failed to parse config file '{}'", path.display()))?;
        info!("Loaded config from '{}'.", path.display());
        Ok(config)
    }

    pub fn parse(config_str: &str) -> Result<Self> {
        Ok(ron::de::from_str(config_str)?)
    }

    pub fn background(&self) -> Rgb {
        Rgb::from(self.background)
    }
}
