use log::debug;

use crate::document::geometry::{PageGeometry, POINTS_PER_INCH, StandardFont, TextStyle};
use crate::render::{EncodedImage, RenderedRecord};

// @module: Flow layout of rendered records onto pages

/// Gap between an image and its caption
const IMAGE_SPACING: f32 = 0.2 * POINTS_PER_INCH;
/// Gap after the annotation text
const TEXT_SPACING: f32 = 0.1 * POINTS_PER_INCH;
/// Trailing gap after the last record
const TRAILING_SPACING: f32 = 0.5 * POINTS_PER_INCH;

/// One unit of flowing content
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    /// Index into the document's image list, with the drawn size in points
    Image { image_index: usize, width: f32, height: f32 },
    Spacer(f32),
    Heading(String),
    Preformatted(Vec<String>),
    PageBreak,
}

/// Something drawn at a fixed position on a page (PDF coordinates, origin bottom-left)
#[derive(Debug, Clone, PartialEq)]
pub enum PageItem {
    Image { image_index: usize, x: f32, y: f32, width: f32, height: f32 },
    Text { font: StandardFont, size: f32, x: f32, y: f32, text: String },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub items: Vec<PageItem>,
}

impl Page {
    /// Text runs on this page, top to bottom
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.items.iter().filter_map(|item| match item {
            PageItem::Text { text, .. } => Some(text.as_str()),
            PageItem::Image { .. } => None,
        })
    }

    /// Indices of the images drawn on this page
    pub fn image_indices(&self) -> impl Iterator<Item = usize> {
        self.items.iter().filter_map(|item| match item {
            PageItem::Image { image_index, .. } => Some(*image_index),
            PageItem::Text { .. } => None,
        })
    }
}

// @struct: Paginated document, ready to be serialized
#[derive(Debug, Clone)]
pub struct LaidOutDocument {
    pub geometry: PageGeometry,
    pub pages: Vec<Page>,
    pub images: Vec<EncodedImage>,
}

// @struct: Collects rendered records in order and lays them out
pub struct DocumentAssembler {
    geometry: PageGeometry,
    heading_style: TextStyle,
    body_style: TextStyle,
    blocks: Vec<Block>,
    images: Vec<EncodedImage>,
    record_count: usize,
}

impl DocumentAssembler {
    pub fn new(geometry: PageGeometry) -> Self {
        Self {
            geometry,
            heading_style: TextStyle::heading(),
            body_style: TextStyle::annotation_body(),
            blocks: Vec::new(),
            images: Vec::new(),
            record_count: 0,
        }
    }

    /// Number of records added so far
    pub fn record_count(&self) -> usize {
        self.record_count
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Append one record's page block. Records are separated by page breaks.
    pub fn add_record(&mut self, record: RenderedRecord) {
        if self.record_count > 0 {
            self.blocks.push(Block::PageBreak);
        }

        // One image pixel is drawn as one point before fitting
        let (width, height) = self
            .geometry
            .fit_image(record.image.width as f32, record.image.height as f32);

        let image_index = self.images.len();
        self.images.push(record.image);

        self.blocks.push(Block::Image { image_index, width, height });
        self.blocks.push(Block::Spacer(IMAGE_SPACING));
        self.blocks.push(Block::Heading(record.caption));
        self.blocks.push(Block::Preformatted(record.text_lines));
        self.blocks.push(Block::Spacer(TEXT_SPACING));

        self.record_count += 1;
    }

    /// Lay out all blocks. The result always has at least one page.
    pub fn finish(mut self) -> LaidOutDocument {
        if self.record_count > 0 {
            self.blocks.push(Block::Spacer(TRAILING_SPACING));
        }

        let mut paginator = Paginator::new(self.geometry);
        for block in &self.blocks {
            match block {
                Block::Image { image_index, width, height } => paginator.place_image(*image_index, *width, *height),
                Block::Spacer(height) => paginator.place_spacer(*height),
                Block::Heading(text) => paginator.place_heading(text, &self.heading_style),
                Block::Preformatted(lines) => paginator.place_preformatted(lines, &self.body_style),
                Block::PageBreak => paginator.break_page(),
            }
        }

        let pages = paginator.finish();
        debug!("Laid out {} records on {} pages", self.record_count, pages.len());

        LaidOutDocument {
            geometry: self.geometry,
            pages,
            images: self.images,
        }
    }
}

/// Top-to-bottom placement cursor
struct Paginator {
    geometry: PageGeometry,
    pages: Vec<Page>,
    current: Page,
    cursor: f32,
}

impl Paginator {
    fn new(geometry: PageGeometry) -> Self {
        Self {
            geometry,
            pages: Vec::new(),
            current: Page::default(),
            cursor: geometry.content_top(),
        }
    }

    fn at_page_top(&self) -> bool {
        self.current.items.is_empty()
    }

    fn remaining(&self) -> f32 {
        self.cursor - self.geometry.content_bottom()
    }

    fn new_page(&mut self) {
        self.pages.push(std::mem::take(&mut self.current));
        self.cursor = self.geometry.content_top();
    }

    fn break_page(&mut self) {
        if !self.at_page_top() {
            self.new_page();
        }
    }

    /// Start a new page unless `height` still fits (an empty page always takes it)
    fn reserve(&mut self, height: f32) {
        if height > self.remaining() && !self.at_page_top() {
            self.new_page();
        }
    }

    fn place_image(&mut self, image_index: usize, width: f32, height: f32) {
        self.reserve(height);
        let x = self.geometry.content_left() + (self.geometry.content_width() - width) / 2.0;
        let y = self.cursor - height;
        self.current.items.push(PageItem::Image { image_index, x, y, width, height });
        self.cursor -= height;
    }

    fn place_spacer(&mut self, height: f32) {
        if self.at_page_top() {
            return;
        }
        if height > self.remaining() {
            self.new_page();
            return;
        }
        self.cursor -= height;
    }

    fn place_heading(&mut self, text: &str, style: &TextStyle) {
        let mut space_before = if self.at_page_top() { 0.0 } else { style.space_before };
        if space_before + style.leading > self.remaining() && !self.at_page_top() {
            self.new_page();
            space_before = 0.0;
        }

        self.cursor -= space_before;
        self.push_line(text, style);
        self.cursor -= style.space_after;
    }

    fn place_preformatted(&mut self, lines: &[String], style: &TextStyle) {
        for line in lines {
            self.reserve(style.leading);
            self.push_line(line, style);
        }
    }

    fn push_line(&mut self, text: &str, style: &TextStyle) {
        self.current.items.push(PageItem::Text {
            font: style.font,
            size: style.size,
            x: self.geometry.content_left() + style.left_indent,
            y: self.cursor - style.size,
            text: text.to_string(),
        });
        self.cursor -= style.leading;
    }

    fn finish(mut self) -> Vec<Page> {
        if !self.at_page_top() || self.pages.is_empty() {
            self.new_page();
        }
        self.pages
    }
}
