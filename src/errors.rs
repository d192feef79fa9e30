/*!
 * Error types for the annodoc application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 */

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when loading or saving the annotation file
#[derive(Error, Debug)]
pub enum AnnotationError {
    /// The annotation file does not exist
    #[error("Annotation file not found at {}", .0.display())]
    NotFound(PathBuf),

    /// The file exists but could not be read or written
    #[error("Failed to access annotation file {}: {source}", path.display())]
    Io {
        /// Path of the annotation file
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The file content is not valid JSON
    #[error("Could not decode JSON from {}: {source}", path.display())]
    Parse {
        /// Path of the annotation file
        path: PathBuf,
        /// Underlying JSON error
        #[source]
        source: serde_json::Error,
    },

    /// The annotation list could not be turned back into JSON
    #[error("Could not encode annotations for {}: {source}", path.display())]
    Serialize {
        /// Path the annotations were going to be written to
        path: PathBuf,
        /// Underlying JSON error
        #[source]
        source: serde_json::Error,
    },

    /// The top-level JSON value is not a list of annotations
    #[error("Expected a JSON array of annotations in {}", .0.display())]
    NotAnArray(PathBuf),
}

/// Reasons a single bounding box is skipped while the record is still rendered
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BoxError {
    /// The box is not a list of exactly four values
    #[error("expected 4 coordinates, found {0}")]
    WrongArity(usize),

    /// The box entry is not a list at all
    #[error("expected a list of coordinates, found {0}")]
    NotAList(String),

    /// One of the coordinates is not a number
    #[error("coordinate {0} is not a number")]
    NotNumeric(String),

    /// A coordinate does not fit the drawing surface's integer range
    #[error("coordinate {0} is outside the drawable range")]
    OutOfRange(f64),
}

/// Reasons a whole annotation record is left out of the report
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SkipReason {
    /// The list entry is not a JSON object
    #[error("entry is not a JSON object")]
    NotAnObject,

    /// The record has no usable `image_path`
    #[error("record has no image_path")]
    MissingImagePath,

    /// The referenced image is not present in the image folder
    #[error("image file not found at {}", .0.display())]
    MissingImage(PathBuf),

    /// The image could not be opened or decoded
    #[error("could not decode image: {0}")]
    Decode(String),

    /// The processed image could not be encoded for embedding
    #[error("could not encode image: {0}")]
    Encode(String),
}

/// Errors that can occur while building or writing the output document
#[derive(Error, Debug)]
pub enum DocumentError {
    /// The PDF object model could not be serialized
    #[error("PDF assembly failed: {0}")]
    Encode(String),

    /// Writing the document to disk failed
    #[error("Failed to write document to {}: {source}", path.display())]
    Write {
        /// Output path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from loading annotations
    #[error("Annotation error: {0}")]
    Annotation(#[from] AnnotationError),

    /// Error from document assembly
    #[error("Document error: {0}")]
    Document(#[from] DocumentError),

    /// Invalid configuration value
    #[error("Configuration error: {0}")]
    Config(String),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
