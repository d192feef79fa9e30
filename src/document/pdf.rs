/*!
 * Serialization of a laid-out report to PDF.
 *
 * The object graph is built by hand with lopdf: one catalog, one page tree,
 * the two base-14 fonts shared by every page, and one image XObject per
 * rendered record. JPEG data is embedded as-is (`DCTDecode`); raw samples
 * and content streams are Flate-compressed.
 */

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream, StringFormat};
use std::path::Path;

use crate::document::assembler::{LaidOutDocument, PageItem};
use crate::document::geometry::StandardFont;
use crate::errors::DocumentError;
use crate::file_utils::FileManager;
use crate::render::{EmbeddedFormat, EncodedImage, PixelColor};

const PDF_VERSION: &str = "1.5";
const PRODUCER: &str = concat!("annodoc ", env!("CARGO_PKG_VERSION"));

/// Build the PDF file in memory
pub fn render_pdf(document: &LaidOutDocument, title: &str) -> Result<Vec<u8>, DocumentError> {
    let mut doc = Document::with_version(PDF_VERSION);
    let pages_id = doc.new_object_id();

    let fonts = font_resources(&mut doc);
    let image_ids: Vec<ObjectId> = document
        .images
        .iter()
        .map(|image| doc.add_object(image_stream(image)))
        .collect();

    let mut page_ids = Vec::with_capacity(document.pages.len());
    for page in &document.pages {
        let mut operations = Vec::new();
        let mut xobjects = Dictionary::new();

        for item in &page.items {
            match item {
                PageItem::Image { image_index, x, y, width, height } => {
                    let name = format!("Im{}", image_index);
                    operations.push(Operation::new("q", vec![]));
                    operations.push(Operation::new(
                        "cm",
                        vec![
                            (*width).into(),
                            Object::Integer(0),
                            Object::Integer(0),
                            (*height).into(),
                            (*x).into(),
                            (*y).into(),
                        ],
                    ));
                    operations.push(Operation::new("Do", vec![Object::Name(name.as_bytes().to_vec())]));
                    operations.push(Operation::new("Q", vec![]));
                    xobjects.set(name, image_ids[*image_index]);
                }
                PageItem::Text { font, size, x, y, text } => {
                    operations.push(Operation::new("BT", vec![]));
                    operations.push(Operation::new(
                        "Tf",
                        vec![Object::Name(font.resource_name().as_bytes().to_vec()), (*size).into()],
                    ));
                    operations.push(Operation::new("Td", vec![(*x).into(), (*y).into()]));
                    operations.push(Operation::new(
                        "Tj",
                        vec![Object::String(text.as_bytes().to_vec(), StringFormat::Hexadecimal)],
                    ));
                    operations.push(Operation::new("ET", vec![]));
                }
            }
        }

        let content = Content { operations }
            .encode()
            .map_err(|e| DocumentError::Encode(e.to_string()))?;
        let content_id = doc.add_object(Stream::new(dictionary! {}, content));

        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                document.geometry.width.into(),
                document.geometry.height.into(),
            ],
            "Contents" => content_id,
            "Resources" => dictionary! {
                "Font" => fonts.clone(),
                "XObject" => xobjects,
            },
        });
        page_ids.push(page_id);
    }

    let kids: Vec<Object> = page_ids.iter().map(|id| Object::Reference(*id)).collect();
    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => kids,
        "Count" => Object::Integer(page_ids.len() as i64),
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    let info_id = doc.add_object(dictionary! {
        "Title" => Object::string_literal(title),
        "Producer" => Object::string_literal(PRODUCER),
    });
    doc.trailer.set("Root", catalog_id);
    doc.trailer.set("Info", info_id);

    doc.compress();

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer)
        .map_err(|e| DocumentError::Encode(e.to_string()))?;
    Ok(buffer)
}

/// Build the PDF and replace `path` with it.
///
/// Nothing is written unless the whole document was built successfully.
pub fn write_pdf<P: AsRef<Path>>(document: &LaidOutDocument, title: &str, path: P) -> Result<usize, DocumentError> {
    let path = path.as_ref();
    let bytes = render_pdf(document, title)?;

    FileManager::write_atomically(path, &bytes).map_err(|source| DocumentError::Write {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(bytes.len())
}

fn font_resources(doc: &mut Document) -> Dictionary {
    let mut fonts = Dictionary::new();
    for font in [StandardFont::HelveticaBold, StandardFont::Courier] {
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => font.base_font(),
            "Encoding" => "WinAnsiEncoding",
        });
        fonts.set(font.resource_name(), font_id);
    }
    fonts
}

fn image_stream(image: &EncodedImage) -> Stream {
    let color_space = match image.color {
        PixelColor::Gray => "DeviceGray",
        PixelColor::Rgb => "DeviceRGB",
    };

    let mut dict = dictionary! {
        "Type" => "XObject",
        "Subtype" => "Image",
        "Width" => Object::Integer(i64::from(image.width)),
        "Height" => Object::Integer(i64::from(image.height)),
        "ColorSpace" => color_space,
        "BitsPerComponent" => Object::Integer(8),
    };

    match image.format {
        EmbeddedFormat::Jpeg => {
            dict.set("Filter", "DCTDecode");
            Stream::new(dict, image.data.clone()).with_compression(false)
        }
        EmbeddedFormat::Raw => Stream::new(dict, image.data.clone()),
    }
}
