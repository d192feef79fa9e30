/*!
 * Common test utilities for the annodoc test suite
 */

#![allow(dead_code)]

use anyhow::Result;
use image::{ImageFormat, Rgb, RgbImage};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use annodoc::app_config::Config;

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a test file with the given content in the specified directory
pub fn create_test_file(dir: &Path, filename: &str, content: &str) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// Creates a solid-colour test image; the format follows the file extension
pub fn create_test_image(dir: &Path, filename: &str, width: u32, height: u32) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    let image = RgbImage::from_pixel(width, height, Rgb([240, 240, 240]));
    let format = ImageFormat::from_path(&file_path)?;
    image.save_with_format(&file_path, format)?;
    Ok(file_path)
}

/// Writes the given records as an annotation list
pub fn write_annotations(dir: &Path, filename: &str, records: &[Value]) -> Result<PathBuf> {
    let content = serde_json::to_string_pretty(&Value::Array(records.to_vec()))?;
    create_test_file(dir, filename, &content)
}

/// Builds a minimal annotation record
pub fn annotation(image_path: &str, bbox: Value) -> Value {
    serde_json::json!({
        "image_id": image_path.rsplit('/').next().unwrap_or(image_path),
        "image_path": image_path,
        "task_type": "vqa",
        "bbox": bbox,
    })
}

/// Config pointing at a test workspace: `<dir>/images`, `<dir>/annotations.json`, `<dir>/report.pdf`
pub fn test_config(dir: &Path) -> Config {
    let mut config = Config::default();
    config.image_dir = dir.join("images");
    config.annotation_file = dir.join("annotations.json");
    config.output_file = dir.join("report.pdf");
    config
}

/// Creates the images folder of a test workspace
pub fn create_image_dir(dir: &Path) -> Result<PathBuf> {
    let image_dir = dir.join("images");
    fs::create_dir_all(&image_dir)?;
    Ok(image_dir)
}

/// Number of pages of a written PDF
pub fn pdf_page_count(path: &Path) -> Result<usize> {
    let document = lopdf::Document::load(path)?;
    Ok(document.get_pages().len())
}
