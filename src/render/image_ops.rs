/*!
 * Raster operations on a single annotation image: box outlines, downscaling
 * and JPEG encoding, plus the passthrough loader used when image processing
 * is disabled.
 */

use anyhow::anyhow;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{ImageDecoder, ImageFormat, ImageReader, Rgb, RgbImage};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect;
use log::debug;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use crate::annotations::DrawRect;
use crate::errors::SkipReason;

// @struct: Outline colour for bounding boxes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoxColor(pub Rgb<u8>);

impl BoxColor {
    pub fn rgb(&self) -> Rgb<u8> {
        self.0
    }
}

impl Default for BoxColor {
    fn default() -> Self {
        Self(Rgb([255, 0, 0]))
    }
}

impl FromStr for BoxColor {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        let name = s.trim().to_lowercase();

        if let Some(hex) = name.strip_prefix('#') {
            if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
                return Err(anyhow!("Invalid hex colour: {}", s));
            }
            let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16);
            return Ok(Self(Rgb([channel(0)?, channel(2)?, channel(4)?])));
        }

        let rgb = match name.as_str() {
            "red" => [255, 0, 0],
            "green" => [0, 128, 0],
            "lime" => [0, 255, 0],
            "blue" => [0, 0, 255],
            "yellow" => [255, 255, 0],
            "orange" => [255, 165, 0],
            "cyan" => [0, 255, 255],
            "magenta" => [255, 0, 255],
            "black" => [0, 0, 0],
            "white" => [255, 255, 255],
            _ => return Err(anyhow!("Unknown colour name: {}", s)),
        };
        Ok(Self(Rgb(rgb)))
    }
}

/// Colour model of embedded pixel data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelColor {
    Gray,
    Rgb,
}

/// How the bytes of an `EncodedImage` are stored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbeddedFormat {
    /// A complete JPEG file
    Jpeg,
    /// Uncompressed 8-bit samples, row-major
    Raw,
}

// @struct: Image bytes ready to be placed in the document
#[derive(Debug, Clone)]
pub struct EncodedImage {
    pub width: u32,
    pub height: u32,
    pub color: PixelColor,
    pub format: EmbeddedFormat,
    pub data: Vec<u8>,
}

/// Draw an outline of `line_width` pixels along the inside of `rect`.
///
/// Each unit of width is one more ring, inset by one pixel. Edges are clipped
/// to the image first, so the cost depends on the image size and not on how
/// far the box reaches outside it.
pub fn draw_box_outline(image: &mut RgbImage, rect: DrawRect, color: BoxColor, line_width: u32) {
    for ring in 0..line_width {
        let Ok(inset) = i32::try_from(ring) else { break };
        let Some(ring_rect) = rect.inset(inset) else { break };
        draw_clipped_ring(image, ring_rect, color);
    }
}

/// Draw the four one-pixel edges of `rect` that fall inside the image
fn draw_clipped_ring(image: &mut RgbImage, rect: DrawRect, color: BoxColor) {
    let (width, height) = (i64::from(image.width()), i64::from(image.height()));
    let (x_min, y_min) = (i64::from(rect.x_min), i64::from(rect.y_min));
    let (x_max, y_max) = (i64::from(rect.x_max), i64::from(rect.y_max));

    let x_from = x_min.max(0);
    let x_to = x_max.min(width - 1);
    let y_from = y_min.max(0);
    let y_to = y_max.min(height - 1);
    if x_from > x_to || y_from > y_to {
        return;
    }

    let inside_x = |x: i64| (0..width).contains(&x);
    let inside_y = |y: i64| (0..height).contains(&y);

    for y in [y_min, y_max] {
        if inside_y(y) {
            fill_span(image, (x_from, y), (x_to, y), color);
        }
    }
    for x in [x_min, x_max] {
        if inside_x(x) {
            fill_span(image, (x, y_from), (x, y_to), color);
        }
    }
}

/// Fill the inclusive span between two in-image points
fn fill_span(image: &mut RgbImage, from: (i64, i64), to: (i64, i64), color: BoxColor) {
    let (Ok(x), Ok(y)) = (i32::try_from(from.0), i32::try_from(from.1)) else { return };
    let (Ok(span_width), Ok(span_height)) = (u32::try_from(to.0 - from.0 + 1), u32::try_from(to.1 - from.1 + 1)) else {
        return;
    };
    if span_width == 0 || span_height == 0 {
        return;
    }
    draw_filled_rect_mut(image, Rect::at(x, y).of_size(span_width, span_height), color.rgb());
}

/// Shrink `image` to `max_width` pixels wide, keeping the aspect ratio.
///
/// Images already narrow enough are returned unchanged.
pub fn downscale_to_width(image: RgbImage, max_width: u32) -> RgbImage {
    if image.width() <= max_width {
        return image;
    }

    let new_height = (u64::from(max_width) * u64::from(image.height()) / u64::from(image.width())).max(1) as u32;
    image::imageops::resize(&image, max_width, new_height, FilterType::Lanczos3)
}

/// Encode as baseline JPEG at the given quality
pub fn encode_jpeg(image: &RgbImage, quality: u8) -> Result<EncodedImage, SkipReason> {
    let mut data = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut data, quality);
    encoder
        .encode_image(image)
        .map_err(|e| SkipReason::Encode(e.to_string()))?;

    Ok(EncodedImage {
        width: image.width(),
        height: image.height(),
        color: PixelColor::Rgb,
        format: EmbeddedFormat::Jpeg,
        data,
    })
}

/// Open and decode an image as 8-bit RGB
pub fn open_rgb(path: &Path) -> Result<RgbImage, SkipReason> {
    let image = image::open(path).map_err(|e| SkipReason::Decode(e.to_string()))?;
    Ok(image.to_rgb8())
}

/// Load an image for embedding without touching its pixels.
///
/// JPEG files are embedded byte for byte; only their header is read. Other
/// formats have no direct PDF representation, so they are decoded to raw
/// samples at their original size.
pub fn load_passthrough(path: &Path) -> Result<EncodedImage, SkipReason> {
    let decode_error = |e: image::ImageError| SkipReason::Decode(e.to_string());

    let reader = ImageReader::open(path)
        .map_err(|e| SkipReason::Decode(e.to_string()))?
        .with_guessed_format()
        .map_err(|e| SkipReason::Decode(e.to_string()))?;

    if reader.format() == Some(ImageFormat::Jpeg) {
        let data = fs::read(path).map_err(|e| SkipReason::Decode(e.to_string()))?;

        // Only grayscale and YCbCr/RGB JPEGs map onto a DCTDecode image as-is
        let color = match jpeg_component_count(&data) {
            Some(1) => Some(PixelColor::Gray),
            Some(3) => Some(PixelColor::Rgb),
            count => {
                debug!(
                    "{} has {:?} colour components, embedding decoded RGB instead",
                    path.display(),
                    count
                );
                None
            }
        };

        if let Some(color) = color {
            let decoder = reader.into_decoder().map_err(decode_error)?;
            let (width, height) = decoder.dimensions();
            return Ok(EncodedImage { width, height, color, format: EmbeddedFormat::Jpeg, data });
        }
    }

    let rgb = reader.decode().map_err(decode_error)?.to_rgb8();
    Ok(EncodedImage {
        width: rgb.width(),
        height: rgb.height(),
        color: PixelColor::Rgb,
        format: EmbeddedFormat::Raw,
        data: rgb.into_raw(),
    })
}

/// Number of colour components declared in the first JPEG frame header.
///
/// Walks the marker segments up to the first SOFn marker. Returns `None` when
/// the data ends before a frame header is found.
pub fn jpeg_component_count(data: &[u8]) -> Option<u8> {
    if !data.starts_with(&[0xFF, 0xD8]) {
        return None;
    }

    let mut pos = 2;
    while pos + 4 <= data.len() {
        if data[pos] != 0xFF {
            return None;
        }
        let marker = data[pos + 1];
        // Fill bytes before a marker
        if marker == 0xFF {
            pos += 1;
            continue;
        }
        // Standalone markers carry no length
        if marker == 0x01 || (0xD0..=0xD7).contains(&marker) {
            pos += 2;
            continue;
        }

        let length = usize::from(u16::from_be_bytes([data[pos + 2], data[pos + 3]]));
        let is_frame_header = (0xC0..=0xCF).contains(&marker) && !matches!(marker, 0xC4 | 0xC8 | 0xCC);
        if is_frame_header {
            // length(2) precision(1) height(2) width(2) components(1)
            return data.get(pos + 9).copied();
        }
        if marker == 0xDA || length < 2 {
            return None;
        }
        pos += 2 + length;
    }

    None
}
