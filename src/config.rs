use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::fs;
use anyhow::{Context, Result};

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub input: InputConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct InputConfig {
    /// ZCTA polygons, `.shp` or `.geojson`
    pub geometry: PathBuf,
    #[serde(default = "default_id_column")]
    pub id_column: String,
    /// Numeric ids are zero-padded to this many digits
    #[serde(default = "default_id_width")]
    pub id_width: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct OutputConfig {
    #[serde(default = "default_kml_path")]
    pub kml_path: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_id_column() -> String {
    "ZCTA5CE10".to_string()
}

fn default_id_width() -> usize {
    5
}

fn default_kml_path() -> PathBuf {
    PathBuf::from("static/matched_zctas.kml")
}

fn default_port() -> u16 {
    5000
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { kml_path: default_kml_path() }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: default_port() }
    }
}

impl AppConfig {
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(content)
            .with_context(|| "Failed to parse TOML configuration")?;
        Ok(config)
    }
}
