use anyhow::{Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::errors::AppError;
use crate::file_utils::FileManager;
use crate::render::BoxColor;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Folder holding the annotated images, looked up by file name
    #[serde(default = "default_image_dir")]
    pub image_dir: PathBuf,

    /// JSON file with the annotation list
    #[serde(default = "default_annotation_file")]
    pub annotation_file: PathBuf,

    /// Where the PDF report is written
    #[serde(default = "default_output_file")]
    pub output_file: PathBuf,

    /// Maximum number of annotations taken from the start of the list
    #[serde(default = "default_max_images")]
    pub max_images: usize,

    /// Image settings
    #[serde(default)]
    pub image: ImageConfig,

    /// Append skipped records to `<output stem>.issues.log`
    #[serde(default = "default_true")]
    pub write_issues_log: bool,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Image processing settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ImageConfig {
    /// Decode, annotate, resize and re-encode images.
    /// When disabled, image files are embedded exactly as found on disk.
    #[serde(default = "default_true")]
    pub processing: bool,

    /// Images wider than this many pixels are downsampled
    #[serde(default = "default_image_max_pixel_width")]
    pub max_pixel_width: u32,

    /// JPEG quality used when re-encoding (1-100)
    #[serde(default = "default_jpeg_quality")]
    pub jpeg_quality: u8,

    /// Bounding box outline colour: a colour name or `#rrggbb`
    #[serde(default = "default_bbox_color")]
    pub bbox_color: String,

    /// Bounding box outline width in pixels
    #[serde(default = "default_bbox_line_width")]
    pub bbox_line_width: u32,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            processing: true,
            max_pixel_width: default_image_max_pixel_width(),
            jpeg_quality: default_jpeg_quality(),
            bbox_color: default_bbox_color(),
            bbox_line_width: default_bbox_line_width(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_image_dir() -> PathBuf {
    PathBuf::from("test_assets/annotated")
}

fn default_annotation_file() -> PathBuf {
    PathBuf::from("annotations/annotations.json")
}

fn default_output_file() -> PathBuf {
    PathBuf::from("annotated_images.pdf")
}

fn default_max_images() -> usize {
    100
}

fn default_image_max_pixel_width() -> u32 {
    1200
}

fn default_jpeg_quality() -> u8 {
    80
}

fn default_bbox_color() -> String {
    "red".to_string()
}

fn default_bbox_line_width() -> u32 {
    5
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load the configuration file, or write the defaults to it when it does not exist yet
    pub fn load_or_create<P: AsRef<Path>>(config_path: P) -> Result<Self> {
        let config_path = config_path.as_ref();

        if config_path.exists() {
            let file = File::open(config_path)
                .with_context(|| format!("Failed to open config file: {}", config_path.display()))?;

            let reader = BufReader::new(file);
            let config: Config = serde_json::from_reader(reader)
                .with_context(|| format!("Failed to parse config file: {}", config_path.display()))?;

            return Ok(config);
        }

        warn!("Config file not found at '{}', creating default config.", config_path.display());

        let config = Config::default();
        let config_json = serde_json::to_string_pretty(&config)
            .context("Failed to serialize default config to JSON")?;

        FileManager::write_atomically(config_path, config_json.as_bytes())
            .with_context(|| format!("Failed to write default config to file: {}", config_path.display()))?;

        Ok(config)
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<(), AppError> {
        if self.max_images == 0 {
            return Err(AppError::Config("max_images must be at least 1".to_string()));
        }

        if self.image.max_pixel_width == 0 {
            return Err(AppError::Config("image.max_pixel_width must be at least 1".to_string()));
        }

        if !(1..=100).contains(&self.image.jpeg_quality) {
            return Err(AppError::Config(format!(
                "image.jpeg_quality must be between 1 and 100, got {}",
                self.image.jpeg_quality
            )));
        }

        if self.image.bbox_line_width == 0 {
            return Err(AppError::Config("image.bbox_line_width must be at least 1".to_string()));
        }

        self.image.bbox_color.parse::<BoxColor>()
            .map_err(|e| AppError::Config(format!("image.bbox_color: {}", e)))?;

        if self.output_file.as_os_str().is_empty() {
            return Err(AppError::Config("output_file must not be empty".to_string()));
        }

        Ok(())
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            image_dir: default_image_dir(),
            annotation_file: default_annotation_file(),
            output_file: default_output_file(),
            max_images: default_max_images(),
            image: ImageConfig::default(),
            write_issues_log: true,
            log_level: LogLevel::default(),
        }
    }
}
