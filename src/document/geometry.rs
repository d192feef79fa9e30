// @module: Page size, margins and text styles of the report

pub const POINTS_PER_INCH: f32 = 72.0;

/// A4 in points (210 x 297 mm)
pub const A4_WIDTH: f32 = 210.0 * POINTS_PER_INCH / 25.4;
pub const A4_HEIGHT: f32 = 297.0 * POINTS_PER_INCH / 25.4;

/// Subtracted from the computed column count to leave room for the hanging indent
const COLUMN_SAFETY_MARGIN: usize = 5;

/// Used when the font metrics give no usable character width
const FALLBACK_COLUMNS: usize = 80;

/// PDF base-14 fonts used by the report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StandardFont {
    HelveticaBold,
    Courier,
}

impl StandardFont {
    pub fn base_font(&self) -> &'static str {
        match self {
            Self::HelveticaBold => "Helvetica-Bold",
            Self::Courier => "Courier",
        }
    }

    /// Name of the font in each page's resource dictionary
    pub fn resource_name(&self) -> &'static str {
        match self {
            Self::HelveticaBold => "F1",
            Self::Courier => "F2",
        }
    }

    /// Width of `M` in points at the given size (AFM units / 1000)
    pub fn em_char_width(&self, size: f32) -> f32 {
        let units = match self {
            Self::HelveticaBold => 833.0,
            Self::Courier => 600.0,
        };
        units * size / 1000.0
    }
}

// @struct: Paragraph style
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub font: StandardFont,
    pub size: f32,
    pub leading: f32,
    pub left_indent: f32,
    pub right_indent: f32,
    pub space_before: f32,
    pub space_after: f32,
}

impl TextStyle {
    /// "Annotation N:" caption
    pub fn heading() -> Self {
        Self {
            font: StandardFont::HelveticaBold,
            size: 14.0,
            leading: 18.0,
            left_indent: 0.0,
            right_indent: 0.0,
            space_before: 12.0,
            space_after: 6.0,
        }
    }

    /// Monospaced annotation JSON
    pub fn annotation_body() -> Self {
        Self {
            font: StandardFont::Courier,
            size: 9.0,
            leading: 12.0,
            left_indent: 0.5 * POINTS_PER_INCH,
            right_indent: 0.5 * POINTS_PER_INCH,
            space_before: 0.0,
            space_after: 0.0,
        }
    }
}

// @struct: Page size and margins, in points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub width: f32,
    pub height: f32,
    pub margin: f32,
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self::a4()
    }
}

impl PageGeometry {
    /// A4 with one-inch margins
    pub fn a4() -> Self {
        Self {
            width: A4_WIDTH,
            height: A4_HEIGHT,
            margin: POINTS_PER_INCH,
        }
    }

    pub fn content_left(&self) -> f32 {
        self.margin
    }

    pub fn content_top(&self) -> f32 {
        self.height - self.margin
    }

    pub fn content_bottom(&self) -> f32 {
        self.margin
    }

    pub fn content_width(&self) -> f32 {
        self.width - 2.0 * self.margin
    }

    pub fn content_height(&self) -> f32 {
        self.height - 2.0 * self.margin
    }

    /// Estimated characters per line for a paragraph in `style`
    pub fn text_columns(&self, style: &TextStyle) -> usize {
        let available = self.content_width() - style.left_indent - style.right_indent;
        let char_width = style.font.em_char_width(style.size);

        if char_width <= 0.0 || available <= 0.0 {
            return FALLBACK_COLUMNS;
        }
        ((available / char_width) as usize).saturating_sub(COLUMN_SAFETY_MARGIN)
    }

    /// Size at which an image of `width` x `height` points fits the content box
    pub fn fit_image(&self, width: f32, height: f32) -> (f32, f32) {
        if width <= 0.0 || height <= 0.0 {
            return (width.max(0.0), height.max(0.0));
        }
        let scale = (self.content_width() / width)
            .min(self.content_height() / height)
            .min(1.0);
        (width * scale, height * scale)
    }
}
