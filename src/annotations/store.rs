use log::debug;
use serde_json::Value;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use crate::annotations::record::AnnotationRecord;
use crate::errors::AnnotationError;
use crate::file_utils::FileManager;

// @module: Loading and saving the annotation list

/// Load the annotation list from `path`.
///
/// The whole file is parsed up front; either every record is returned, in
/// file order, or the load fails.
pub fn load_annotations<P: AsRef<Path>>(path: P) -> Result<Vec<AnnotationRecord>, AnnotationError> {
    let path = path.as_ref();

    let content = fs::read_to_string(path).map_err(|source| {
        if source.kind() == ErrorKind::NotFound {
            AnnotationError::NotFound(path.to_path_buf())
        } else {
            AnnotationError::Io { path: path.to_path_buf(), source }
        }
    })?;

    parse_annotations(&content).map_err(|err| match err {
        ParseFailure::Json(source) => AnnotationError::Parse { path: path.to_path_buf(), source },
        ParseFailure::NotAnArray => AnnotationError::NotAnArray(path.to_path_buf()),
    })
}

/// Load the annotation list, treating a missing file as an empty list.
///
/// This is how the labelling tool starts a fresh session. A file that exists
/// but cannot be parsed is still an error.
pub fn load_or_empty<P: AsRef<Path>>(path: P) -> Result<Vec<AnnotationRecord>, AnnotationError> {
    match load_annotations(&path) {
        Err(AnnotationError::NotFound(missing)) => {
            debug!("No annotation file at {}, starting empty", missing.display());
            Ok(Vec::new())
        }
        other => other,
    }
}

/// Write the annotation list as 2-space indented JSON.
///
/// The file is replaced atomically so an interrupted save keeps the old list.
pub fn save_annotations<P: AsRef<Path>>(path: P, records: &[AnnotationRecord]) -> Result<(), AnnotationError> {
    let path = path.as_ref();
    let io_error = |source| AnnotationError::Io { path: path.to_path_buf(), source };

    let mut content = serde_json::to_vec_pretty(records)
        .map_err(|source| AnnotationError::Serialize { path: path.to_path_buf(), source })?;
    content.push(b'\n');

    FileManager::write_atomically(path, &content).map_err(io_error)?;
    debug!("Saved {} annotations to {}", records.len(), path.display());
    Ok(())
}

enum ParseFailure {
    Json(serde_json::Error),
    NotAnArray,
}

fn parse_annotations(content: &str) -> Result<Vec<AnnotationRecord>, ParseFailure> {
    let value: Value = serde_json::from_str(content).map_err(ParseFailure::Json)?;
    match value {
        Value::Array(entries) => Ok(entries
            .into_iter()
            .enumerate()
            .map(|(index, entry)| AnnotationRecord::new(index + 1, entry))
            .collect()),
        _ => Err(ParseFailure::NotAnArray),
    }
}
