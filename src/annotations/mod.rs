/*!
 * Annotation data: the record model, bounding boxes and the JSON store.
 *
 * - `record`: one annotation entry with lenient typed accessors
 * - `bbox`: bottom-left-origin boxes and their raster conversion
 * - `store`: loading and saving the annotation list
 */

pub mod bbox;
pub mod record;
pub mod store;

pub use bbox::{BoundingBox, DrawRect};
pub use record::{AnnotationMetadata, AnnotationRecord, Difficulty, LanguagePair, Split, TaskType};
pub use store::{load_annotations, load_or_empty, save_annotations};
