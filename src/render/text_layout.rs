/*!
 * Formatting of annotation records as monospaced, column-wrapped text.
 *
 * Records are printed as 2-space indented JSON. Non-ASCII characters are
 * escaped (`é` becomes `\u00e9`) so that every character maps to one glyph of the
 * document's standard monospaced font.
 */

use serde_json::Value;

/// Prefix added to continuation lines, on top of the original indentation
pub const HANGING_INDENT: &str = "  ";

/// Content width used when a line is indented deeper than the column
const MIN_CONTENT_WIDTH: usize = 10;

/// Serialize a record the way it is shown in the report
pub fn format_record_json(value: &Value) -> String {
    let pretty = serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string());
    escape_non_ascii(&pretty)
}

/// Replace every non-ASCII character with its JSON `\uXXXX` escape (UTF-16 units)
pub fn escape_non_ascii(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    let mut units = [0u16; 2];

    for c in text.chars() {
        if c.is_ascii() {
            escaped.push(c);
            continue;
        }
        for unit in c.encode_utf16(&mut units) {
            escaped.push_str(&format!("\\u{:04x}", unit));
        }
    }

    escaped
}

/// Wrap every line of `text` to at most `columns` characters.
///
/// Indentation is kept; continuation lines additionally get `HANGING_INDENT`.
/// Breaks happen after whitespace, which stays at the end of the broken line
/// (or opens the next one when it would overflow the column), so no character
/// of the input is lost. Lines indented deeper than `columns` are wrapped at
/// a minimum content width instead and may run past the column.
pub fn wrap_text(text: &str, columns: usize) -> Vec<String> {
    let mut wrapped = Vec::new();

    for line in text.lines() {
        let indent_len = line.len() - line.trim_start_matches(' ').len();
        let (indent, content) = line.split_at(indent_len);

        let width = match columns.checked_sub(indent_len) {
            Some(width) if width > 0 => width,
            _ => MIN_CONTENT_WIDTH,
        };

        if content.chars().count() <= width {
            wrapped.push(line.to_string());
            continue;
        }

        for (i, segment) in wrap_segments(content, width).into_iter().enumerate() {
            if i == 0 {
                wrapped.push(format!("{}{}", indent, segment));
            } else {
                wrapped.push(format!("{}{}{}", indent, HANGING_INDENT, segment));
            }
        }
    }

    wrapped
}

/// Greedy word wrap of one unindented line.
///
/// The first segment may use `width` characters; continuation segments lose
/// the width of the hanging indent. No segment is longer than its budget,
/// whitespace included: a space that does not fit opens the next segment.
/// Words longer than a whole line are split.
pub fn wrap_segments(content: &str, width: usize) -> Vec<String> {
    let mut filler = SegmentFiller::new(width);

    for (word, space) in split_words(content) {
        let word_len = word.chars().count();
        // Move a word that fits on a line of its own rather than splitting it
        if filler.current_len > 0 && filler.current_len + word_len > filler.budget() {
            filler.break_segment();
        }
        filler.push_chars(word.chars());
        filler.push_chars(space.chars());
    }

    filler.finish()
}

// @struct: Accumulates characters into segments of bounded length
struct SegmentFiller {
    width: usize,
    continuation_width: usize,
    segments: Vec<String>,
    current: String,
    current_len: usize,
}

impl SegmentFiller {
    fn new(width: usize) -> Self {
        Self {
            width: width.max(1),
            continuation_width: width.saturating_sub(HANGING_INDENT.len()).max(1),
            segments: Vec::new(),
            current: String::new(),
            current_len: 0,
        }
    }

    fn budget(&self) -> usize {
        if self.segments.is_empty() {
            self.width
        } else {
            self.continuation_width
        }
    }

    fn break_segment(&mut self) {
        self.segments.push(std::mem::take(&mut self.current));
        self.current_len = 0;
    }

    /// Append characters, starting a new segment whenever the current one is full
    fn push_chars(&mut self, chars: impl Iterator<Item = char>) {
        for c in chars {
            if self.current_len >= self.budget() {
                self.break_segment();
            }
            self.current.push(c);
            self.current_len += 1;
        }
    }

    fn finish(mut self) -> Vec<String> {
        if !self.current.is_empty() || self.segments.is_empty() {
            self.segments.push(self.current);
        }
        self.segments
    }
}

/// Split into `(word, following whitespace)` pairs covering the whole input
fn split_words(content: &str) -> Vec<(&str, &str)> {
    let mut pairs = Vec::new();
    let mut rest = content;

    while !rest.is_empty() {
        let word_end = rest.find(char::is_whitespace).unwrap_or(rest.len());
        let (word, after) = rest.split_at(word_end);
        let space_end = after.find(|c: char| !c.is_whitespace()).unwrap_or(after.len());
        let (space, next) = after.split_at(space_end);
        pairs.push((word, space));
        rest = next;
    }

    pairs
}
