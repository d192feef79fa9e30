/*!
 * Per-annotation rendering.
 *
 * Turns one `AnnotationRecord` into a `RenderedRecord`: the located image
 * (boxes drawn, downscaled and re-encoded when image processing is enabled)
 * plus the caption and wrapped JSON text that accompany it in the report.
 *
 * Every failure that concerns a single record comes back as a `SkipReason`;
 * every failure that concerns a single box is recorded in
 * `RenderedRecord::skipped_boxes`. Neither aborts the run.
 */

pub mod image_ops;
pub mod text_layout;

use log::debug;
use std::path::{Path, PathBuf};

use crate::annotations::AnnotationRecord;
use crate::app_config::ImageConfig;
use crate::errors::{BoxError, SkipReason};
use crate::file_utils::FileManager;

pub use image_ops::{BoxColor, EmbeddedFormat, EncodedImage, PixelColor};

/// Whether images are processed or embedded as found on disk.
///
/// Resolved once at startup; the renderer only branches on this value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImagingMode {
    /// Decode, draw boxes, downscale and re-encode as JPEG
    Full,
    /// Embed the original file; no boxes, no resizing, no compression
    Passthrough,
}

impl ImagingMode {
    pub fn from_config(config: &ImageConfig) -> Self {
        if config.processing {
            Self::Full
        } else {
            Self::Passthrough
        }
    }
}

// @struct: Settings the renderer needs for every record
#[derive(Debug, Clone)]
pub struct RenderSettings {
    pub max_pixel_width: u32,
    pub jpeg_quality: u8,
    pub bbox_color: BoxColor,
    pub bbox_line_width: u32,
    /// Characters per line of the annotation text column
    pub text_columns: usize,
}

impl RenderSettings {
    pub fn from_config(config: &ImageConfig, text_columns: usize) -> anyhow::Result<Self> {
        Ok(Self {
            max_pixel_width: config.max_pixel_width,
            jpeg_quality: config.jpeg_quality,
            bbox_color: config.bbox_color.parse()?,
            bbox_line_width: config.bbox_line_width,
            text_columns,
        })
    }
}

/// A box entry that was not drawn
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedBox {
    /// 0-based index inside the record's `bbox` list
    pub index: usize,
    pub reason: BoxError,
}

// @struct: Everything the document needs for one annotation
#[derive(Debug, Clone)]
pub struct RenderedRecord {
    /// 1-based position in the annotation list
    pub position: usize,
    pub image_path: PathBuf,
    pub image: EncodedImage,
    pub caption: String,
    pub text_lines: Vec<String>,
    pub skipped_boxes: Vec<SkippedBox>,
}

// @struct: Renders records against one image folder
pub struct RecordRenderer {
    image_dir: PathBuf,
    settings: RenderSettings,
    mode: ImagingMode,
}

impl RecordRenderer {
    pub fn new<P: AsRef<Path>>(image_dir: P, settings: RenderSettings, mode: ImagingMode) -> Self {
        Self {
            image_dir: image_dir.as_ref().to_path_buf(),
            settings,
            mode,
        }
    }

    pub fn mode(&self) -> ImagingMode {
        self.mode
    }

    /// Locate the record's image inside the image folder
    pub fn locate_image(&self, record: &AnnotationRecord) -> Result<PathBuf, SkipReason> {
        if record.fields().is_none() {
            return Err(SkipReason::NotAnObject);
        }
        let file_name = record.image_file_name().ok_or(SkipReason::MissingImagePath)?;
        FileManager::resolve_image(&self.image_dir, file_name).map_err(SkipReason::MissingImage)
    }

    /// Render one record, or explain why it has to be skipped
    pub fn render(&self, record: &AnnotationRecord) -> Result<RenderedRecord, SkipReason> {
        let image_path = self.locate_image(record)?;

        let (image, skipped_boxes) = match self.mode {
            ImagingMode::Full => self.process_image(record, &image_path)?,
            ImagingMode::Passthrough => (image_ops::load_passthrough(&image_path)?, Vec::new()),
        };

        debug!(
            "Rendered annotation {} ({}x{} px, {} bytes)",
            record.position(),
            image.width,
            image.height,
            image.data.len()
        );

        let text = text_layout::format_record_json(record.as_value());
        Ok(RenderedRecord {
            position: record.position(),
            image_path,
            image,
            caption: format!("Annotation {}:", record.position()),
            text_lines: text_layout::wrap_text(&text, self.settings.text_columns),
            skipped_boxes,
        })
    }

    fn process_image(&self, record: &AnnotationRecord, image_path: &Path) -> Result<(EncodedImage, Vec<SkippedBox>), SkipReason> {
        let mut rgb = image_ops::open_rgb(image_path)?;
        let mut skipped_boxes = Vec::new();

        if let Some(boxes) = record.bounding_boxes() {
            let height = rgb.height();
            for (index, parsed) in boxes.into_iter().enumerate() {
                match parsed.and_then(|bbox| bbox.to_draw_rect(height)) {
                    Ok(rect) => image_ops::draw_box_outline(
                        &mut rgb,
                        rect,
                        self.settings.bbox_color,
                        self.settings.bbox_line_width,
                    ),
                    Err(reason) => skipped_boxes.push(SkippedBox { index, reason }),
                }
            }
        }

        let rgb = image_ops::downscale_to_width(rgb, self.settings.max_pixel_width);
        let encoded = image_ops::encode_jpeg(&rgb, self.settings.jpeg_quality)?;
        Ok((encoded, skipped_boxes))
    }
}
