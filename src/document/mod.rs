/*!
 * The output document: page geometry, flow layout of rendered records, and
 * PDF serialization.
 */

pub mod assembler;
pub mod geometry;
pub mod pdf;

pub use assembler::{Block, DocumentAssembler, LaidOutDocument, Page, PageItem};
pub use geometry::{PageGeometry, StandardFont, TextStyle};
pub use pdf::{render_pdf, write_pdf};
