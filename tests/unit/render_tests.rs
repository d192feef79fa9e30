/*!
 * Tests for rendering single annotation records
 */

use anyhow::Result;
use serde_json::json;
use std::fs;
use std::path::Path;
use std::time::{Duration, Instant};

use annodoc::annotations::AnnotationRecord;
use annodoc::app_config::ImageConfig;
use annodoc::errors::{BoxError, SkipReason};
use annodoc::render::{EmbeddedFormat, ImagingMode, RecordRenderer, RenderSettings};
use crate::common;

const COLUMNS: usize = 65;

fn renderer(image_dir: &Path, mode: ImagingMode) -> Result<RecordRenderer> {
    let settings = RenderSettings::from_config(&ImageConfig::default(), COLUMNS)?;
    Ok(RecordRenderer::new(image_dir, settings, mode))
}

#[test]
fn test_render_withValidRecord_shouldProduceJpegCaptionAndText() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    common::create_test_image(temp_dir.path(), "street.png", 100, 100)?;
    let record = AnnotationRecord::new(3, common::annotation("some/where/street.png", json!([[10, 10, 50, 50]])));

    let rendered = renderer(temp_dir.path(), ImagingMode::Full)?.render(&record)?;

    assert_eq!(rendered.position, 3);
    assert_eq!(rendered.caption, "Annotation 3:");
    assert_eq!(rendered.image_path, temp_dir.path().join("street.png"));
    assert_eq!(rendered.image.format, EmbeddedFormat::Jpeg);
    assert_eq!((rendered.image.width, rendered.image.height), (100, 100));
    assert!(rendered.image.data.starts_with(&[0xFF, 0xD8]));
    assert!(rendered.skipped_boxes.is_empty());
    assert_eq!(rendered.text_lines.first().map(String::as_str), Some("{"));
    assert_eq!(rendered.text_lines.last().map(String::as_str), Some("}"));

    Ok(())
}

#[test]
fn test_render_withWideImage_shouldDownscaleToMaxWidth() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    common::create_test_image(temp_dir.path(), "wide.png", 2400, 1200)?;
    let record = AnnotationRecord::new(1, common::annotation("wide.png", json!([])));

    let rendered = renderer(temp_dir.path(), ImagingMode::Full)?.render(&record)?;

    assert_eq!((rendered.image.width, rendered.image.height), (1200, 600));

    Ok(())
}

#[test]
fn test_render_withMalformedBoxes_shouldSkipOnlyThoseBoxes() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    common::create_test_image(temp_dir.path(), "boxes.png", 60, 60)?;
    let record = AnnotationRecord::new(
        1,
        common::annotation("boxes.png", json!([[1, 2, 3], [5, 5, 20, 20], ["a", 1, 2, 3]])),
    );

    let rendered = renderer(temp_dir.path(), ImagingMode::Full)?.render(&record)?;

    assert_eq!(rendered.skipped_boxes.len(), 2);
    assert_eq!(rendered.skipped_boxes[0].index, 0);
    assert_eq!(rendered.skipped_boxes[0].reason, BoxError::WrongArity(3));
    assert_eq!(rendered.skipped_boxes[1].index, 2);

    Ok(())
}

#[test]
fn test_render_withMissingImage_shouldSkipRecord() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let record = AnnotationRecord::new(1, common::annotation("gone.jpg", json!([])));

    let result = renderer(temp_dir.path(), ImagingMode::Full)?.render(&record);

    assert_eq!(result.err(), Some(SkipReason::MissingImage(temp_dir.path().join("gone.jpg"))));

    Ok(())
}

#[test]
fn test_render_withoutImagePath_shouldSkipRecord() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let renderer = renderer(temp_dir.path(), ImagingMode::Full)?;

    let no_path = AnnotationRecord::new(1, json!({"image_id": "x"}));
    assert_eq!(renderer.render(&no_path).err(), Some(SkipReason::MissingImagePath));

    let not_object = AnnotationRecord::new(2, json!([1, 2, 3]));
    assert_eq!(renderer.render(&not_object).err(), Some(SkipReason::NotAnObject));

    Ok(())
}

#[test]
fn test_render_withCorruptImage_shouldReportDecodeFailure() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    common::create_test_file(temp_dir.path(), "broken.jpg", "this is not a jpeg")?;
    let record = AnnotationRecord::new(1, common::annotation("broken.jpg", json!([])));

    let result = renderer(temp_dir.path(), ImagingMode::Full)?.render(&record);

    assert!(matches!(result, Err(SkipReason::Decode(_))));

    Ok(())
}

#[test]
fn test_render_inPassthroughMode_shouldEmbedJpegBytesUnchanged() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_image(temp_dir.path(), "photo.jpg", 2000, 100)?;
    let record = AnnotationRecord::new(1, common::annotation("photo.jpg", json!([[0, 0, 10, 10]])));

    let rendered = renderer(temp_dir.path(), ImagingMode::Passthrough)?.render(&record)?;

    assert_eq!(rendered.image.format, EmbeddedFormat::Jpeg);
    assert_eq!((rendered.image.width, rendered.image.height), (2000, 100));
    assert_eq!(rendered.image.data, fs::read(&path)?);
    assert!(rendered.skipped_boxes.is_empty());

    Ok(())
}

#[test]
fn test_render_inPassthroughMode_withPng_shouldEmbedRawSamples() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    common::create_test_image(temp_dir.path(), "diagram.png", 30, 20)?;
    let record = AnnotationRecord::new(1, common::annotation("diagram.png", json!([])));

    let rendered = renderer(temp_dir.path(), ImagingMode::Passthrough)?.render(&record)?;

    assert_eq!(rendered.image.format, EmbeddedFormat::Raw);
    assert_eq!(rendered.image.data.len(), 30 * 20 * 3);

    Ok(())
}

#[test]
fn test_render_withLongText_shouldKeepEveryLineWithinColumns() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    common::create_test_image(temp_dir.path(), "long.png", 10, 10)?;
    let long_answer = "Jalan raya ini sibuk dengan kenderaan pada waktu pagi. ".repeat(8);
    let mut value = common::annotation("long.png", json!([]));
    value["answer_ms"] = json!(long_answer);
    let record = AnnotationRecord::new(1, value);

    let rendered = renderer(temp_dir.path(), ImagingMode::Full)?.render(&record)?;

    assert!(rendered.text_lines.len() > 10);
    assert!(rendered.text_lines.iter().all(|line| line.chars().count() <= COLUMNS));

    Ok(())
}

#[test]
fn test_render_withBoxSpanningWholeI32Range_shouldRenderRecord() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    common::create_test_image(temp_dir.path(), "full_range.png", 100, 100)?;
    let record = AnnotationRecord::new(
        1,
        common::annotation("full_range.png", json!([[-2147483648i64, 0, 2147483647i64, 10]])),
    );

    let rendered = renderer(temp_dir.path(), ImagingMode::Full)?.render(&record)?;

    assert!(rendered.skipped_boxes.is_empty());
    assert_eq!((rendered.image.width, rendered.image.height), (100, 100));

    Ok(())
}

#[test]
fn test_render_withHugeInRangeBox_shouldFinishQuickly() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    common::create_test_image(temp_dir.path(), "huge_box.png", 100, 100)?;
    let record = AnnotationRecord::new(
        1,
        common::annotation("huge_box.png", json!([[0, 0, 2000000000, 10], [-2000000000, -5, 50, 2000000000]])),
    );
    let renderer = renderer(temp_dir.path(), ImagingMode::Full)?;

    let start = Instant::now();
    let rendered = renderer.render(&record)?;

    assert!(rendered.skipped_boxes.is_empty());
    assert!(start.elapsed() < Duration::from_secs(5), "took {:?}", start.elapsed());

    Ok(())
}
