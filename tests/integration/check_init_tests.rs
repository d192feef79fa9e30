/*!
 * Integration tests for the check and init commands
 */

use anyhow::Result;
use serde_json::json;
use std::fs;

use annodoc::annotations;
use annodoc::app_controller::Controller;
use annodoc::errors::SkipReason;
use crate::common;

#[test]
fn test_check_withMixedFolder_shouldReportMissingAndUnreferenced() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let image_dir = common::create_image_dir(temp_dir.path())?;
    common::create_test_image(&image_dir, "used.png", 10, 10)?;
    common::create_test_image(&image_dir, "spare.png", 10, 10)?;
    common::create_test_file(&image_dir, "readme.txt", "not an image")?;
    common::write_annotations(
        temp_dir.path(),
        "annotations.json",
        &[
            common::annotation("a/b/used.png", json!([])),
            common::annotation("missing.png", json!([])),
        ],
    )?;

    let report = Controller::with_config(common::test_config(temp_dir.path()))?.check()?;

    assert_eq!(report.total, 2);
    assert_eq!(report.resolved, vec![(1, image_dir.join("used.png"))]);
    assert_eq!(report.missing.len(), 1);
    assert_eq!(report.missing[0].position, 2);
    assert_eq!(report.missing[0].reason, SkipReason::MissingImage(image_dir.join("missing.png")));
    assert_eq!(report.unreferenced, vec![image_dir.join("spare.png")]);

    // Checking never writes a report
    assert!(!temp_dir.path().join("report.pdf").exists());

    Ok(())
}

#[test]
fn test_check_withMissingImageFolder_shouldReportEverythingMissing() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    common::write_annotations(
        temp_dir.path(),
        "annotations.json",
        &[common::annotation("x.jpg", json!([]))],
    )?;

    let report = Controller::with_config(common::test_config(temp_dir.path()))?.check()?;

    assert!(report.resolved.is_empty());
    assert_eq!(report.missing.len(), 1);
    assert!(report.unreferenced.is_empty());

    Ok(())
}

#[test]
fn test_initAnnotationFile_withNoFile_shouldCreateEmptyList() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let mut config = common::test_config(temp_dir.path());
    config.annotation_file = temp_dir.path().join("annotations").join("annotations.json");
    let controller = Controller::with_config(config.clone())?;

    assert!(controller.init_annotation_file()?);
    assert_eq!(fs::read_to_string(&config.annotation_file)?.trim(), "[]");
    assert!(annotations::load_annotations(&config.annotation_file)?.is_empty());

    // A second init leaves the file alone
    assert!(!controller.init_annotation_file()?);

    Ok(())
}

#[test]
fn test_initAnnotationFile_withExistingRecords_shouldKeepThem() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::write_annotations(
        temp_dir.path(),
        "annotations.json",
        &[common::annotation("a.jpg", json!([[1, 2, 3, 4]]))],
    )?;
    let before = fs::read_to_string(&path)?;

    let controller = Controller::with_config(common::test_config(temp_dir.path()))?;

    assert!(!controller.init_annotation_file()?);
    assert_eq!(fs::read_to_string(&path)?, before);

    Ok(())
}

#[test]
fn test_initAnnotationFile_withBrokenFile_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    common::create_test_file(temp_dir.path(), "annotations.json", "[{")?;

    let controller = Controller::with_config(common::test_config(temp_dir.path()))?;

    assert!(controller.init_annotation_file().is_err());

    Ok(())
}

#[test]
fn test_passthroughNotice_onlyWhenProcessingDisabled_shouldBeSome() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let mut config = common::test_config(temp_dir.path());

    assert_eq!(Controller::with_config(config.clone())?.passthrough_notice(), None);

    config.image.processing = false;
    let controller = Controller::with_config(config)?;
    assert!(controller.passthrough_notice().is_some_and(|notice| notice.contains("embedded as-is")));

    Ok(())
}
