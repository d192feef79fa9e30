/*!
 * # annodoc - Annotation report exporter
 *
 * A Rust library for turning a JSON list of image annotations into a
 * paginated PDF report.
 *
 * ## Features
 *
 * - Load and save annotation lists (JSON array of records)
 * - Locate each record's image in a flat image folder
 * - Draw bounding boxes given in bottom-left-origin coordinates
 * - Downscale and JPEG-compress images before embedding
 * - Pretty-print each record as wrapped monospaced JSON
 * - One page block per annotation, skipped records never abort a run
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `annotations`: Annotation records, bounding boxes and the JSON store
 * - `render`: Per-annotation rendering:
 *   - `render::image_ops`: Box outlines, resizing, JPEG encoding
 *   - `render::text_layout`: JSON formatting and column wrapping
 * - `document`: Page layout and PDF output:
 *   - `document::geometry`: Page size, margins and text styles
 *   - `document::assembler`: Flow layout of records onto pages
 *   - `document::pdf`: PDF serialization
 * - `file_utils`: File system operations
 * - `app_controller`: Main application controller
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod annotations;
pub mod app_config;
pub mod app_controller;
pub mod document;
pub mod errors;
pub mod file_utils;
pub mod render;

// Re-export main types for easier usage
pub use annotations::{AnnotationRecord, BoundingBox, DrawRect};
pub use app_config::Config;
pub use app_controller::{CheckReport, Controller, ExportReport, SkippedRecord};
pub use errors::{AnnotationError, AppError, BoxError, DocumentError, SkipReason};
pub use render::{ImagingMode, RecordRenderer, RenderSettings, RenderedRecord};
