/*!
 * End-to-end tests for exporting annotations to a PDF report
 */

use anyhow::Result;
use serde_json::json;
use std::fs;

use annodoc::app_controller::Controller;
use annodoc::errors::SkipReason;
use crate::common;

/// Test the controller initialization with default config
#[test]
fn test_controller_initialization_withDefaultConfig_shouldSucceed() -> Result<()> {
    let controller = Controller::new_for_test()?;
    assert_eq!(controller.config().max_images, 100);
    Ok(())
}

/// Test that an invalid configuration is rejected up front
#[test]
fn test_controller_withInvalidConfig_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let mut config = common::test_config(temp_dir.path());
    config.image.jpeg_quality = 0;

    assert!(Controller::with_config(config).is_err());
    Ok(())
}

/// A single record with one box produces a one-page report
#[test]
fn test_runExport_withSingleAnnotation_shouldWriteOnePagePdf() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let image_dir = common::create_image_dir(temp_dir.path())?;
    common::create_test_image(&image_dir, "img-001.jpg", 100, 100)?;
    common::write_annotations(
        temp_dir.path(),
        "annotations.json",
        &[common::annotation("path/to/img-001.jpg", json!([[10, 10, 50, 50]]))],
    )?;

    let controller = Controller::with_config(common::test_config(temp_dir.path()))?;
    let report = controller.run_export()?;

    assert_eq!(report.selected, 1);
    assert_eq!(report.rendered, vec![1]);
    assert!(report.skipped.is_empty());
    assert_eq!(report.pages, 1);
    assert!(report.bytes_written > 0);

    let pdf_path = temp_dir.path().join("report.pdf");
    assert_eq!(report.output_file, pdf_path);
    assert!(fs::read(&pdf_path)?.starts_with(b"%PDF-"));
    assert_eq!(common::pdf_page_count(&pdf_path)?, 1);

    Ok(())
}

/// A missing image skips that record only
#[test]
fn test_runExport_withMissingImage_shouldSkipRecordAndKeepOthers() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let image_dir = common::create_image_dir(temp_dir.path())?;
    common::create_test_image(&image_dir, "first.png", 80, 60)?;
    common::create_test_image(&image_dir, "third.jpg", 60, 80)?;
    common::write_annotations(
        temp_dir.path(),
        "annotations.json",
        &[
            common::annotation("first.png", json!([[0, 0, 20, 20]])),
            common::annotation("second.jpg", json!([[0, 0, 20, 20]])),
            common::annotation("third.jpg", json!([])),
        ],
    )?;

    let controller = Controller::with_config(common::test_config(temp_dir.path()))?;
    let report = controller.run_export()?;

    assert_eq!(report.rendered, vec![1, 3]);
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].position, 2);
    assert_eq!(report.skipped[0].reason, SkipReason::MissingImage(image_dir.join("second.jpg")));
    assert_eq!(common::pdf_page_count(&temp_dir.path().join("report.pdf"))?, 2);

    // Skipped records are written next to the report
    let issues = fs::read_to_string(temp_dir.path().join("report.issues.log"))?;
    assert!(issues.contains("annotation 2"));
    assert!(issues.contains("second.jpg"));

    Ok(())
}

/// A malformed box is skipped while the record is still rendered
#[test]
fn test_runExport_withThreeNumberBox_shouldStillRenderRecord() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let image_dir = common::create_image_dir(temp_dir.path())?;
    common::create_test_image(&image_dir, "boxes.png", 100, 100)?;
    common::write_annotations(
        temp_dir.path(),
        "annotations.json",
        &[common::annotation("boxes.png", json!([[1, 2, 3], [10, 10, 40, 40]]))],
    )?;

    let controller = Controller::with_config(common::test_config(temp_dir.path()))?;
    let report = controller.run_export()?;

    assert_eq!(report.rendered, vec![1]);
    assert_eq!(report.skipped_boxes, 1);
    assert!(!temp_dir.path().join("report.issues.log").exists());

    Ok(())
}

/// Only the first max_images records are considered
#[test]
fn test_runExport_withMaxImages_shouldTakeFromStartOfList() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let image_dir = common::create_image_dir(temp_dir.path())?;
    let mut records = Vec::new();
    for i in 0..5 {
        let name = format!("img-{}.png", i);
        common::create_test_image(&image_dir, &name, 40, 30)?;
        records.push(common::annotation(&name, json!([])));
    }
    common::write_annotations(temp_dir.path(), "annotations.json", &records)?;

    let mut config = common::test_config(temp_dir.path());
    config.max_images = 3;
    let report = Controller::with_config(config)?.run_export()?;

    assert_eq!(report.selected, 3);
    assert_eq!(report.rendered, vec![1, 2, 3]);
    assert_eq!(common::pdf_page_count(&temp_dir.path().join("report.pdf"))?, 3);

    Ok(())
}

/// Nothing renderable still yields a valid single-page document
#[test]
fn test_runExport_withNoRenderableRecords_shouldWriteBlankPage() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    common::create_image_dir(temp_dir.path())?;
    common::write_annotations(
        temp_dir.path(),
        "annotations.json",
        &[json!("just a string"), json!({"image_id": "no-path"})],
    )?;

    let mut config = common::test_config(temp_dir.path());
    config.write_issues_log = false;
    let report = Controller::with_config(config)?.run_export()?;

    assert!(report.rendered.is_empty());
    assert_eq!(report.skipped.len(), 2);
    assert_eq!(report.skipped[0].reason, SkipReason::NotAnObject);
    assert_eq!(report.skipped[1].reason, SkipReason::MissingImagePath);
    assert_eq!(common::pdf_page_count(&temp_dir.path().join("report.pdf"))?, 1);
    assert!(!temp_dir.path().join("report.issues.log").exists());

    Ok(())
}

/// Images are embedded unmodified when processing is disabled
#[test]
fn test_runExport_withProcessingDisabled_shouldEmbedOriginalJpeg() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let image_dir = common::create_image_dir(temp_dir.path())?;
    let original = common::create_test_image(&image_dir, "photo.jpg", 64, 48)?;
    common::write_annotations(
        temp_dir.path(),
        "annotations.json",
        &[common::annotation("photo.jpg", json!([[0, 0, 10, 10]]))],
    )?;

    let mut config = common::test_config(temp_dir.path());
    config.image.processing = false;
    let report = Controller::with_config(config)?.run_export()?;
    assert_eq!(report.rendered, vec![1]);

    let original_bytes = fs::read(&original)?;
    let document = lopdf::Document::load(temp_dir.path().join("report.pdf"))?;
    let embedded = document.objects.values().any(|object| match object.as_stream() {
        Ok(stream) => stream.content == original_bytes,
        Err(_) => false,
    });
    assert!(embedded, "the original JPEG bytes should be embedded as-is");

    Ok(())
}

/// A missing annotation file aborts the export
#[test]
fn test_runExport_withMissingAnnotationFile_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let controller = Controller::with_config(common::test_config(temp_dir.path()))?;

    let result = controller.run_export();

    assert!(result.is_err());
    assert!(!temp_dir.path().join("report.pdf").exists());

    Ok(())
}
