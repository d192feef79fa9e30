use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::annotations::bbox::BoundingBox;
use crate::errors::BoxError;

// @module: Annotation record model

/// Kind of task an annotation was written for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskType {
    Caption,
    Vqa,
    Instruction,
}

/// Dataset split the record belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Split {
    Train,
    Val,
    Test,
}

/// Annotator-assigned difficulty
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

/// Source and target language tags of the bilingual fields
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LanguagePair {
    #[serde(default)]
    pub source: Vec<String>,
    #[serde(default)]
    pub target: Vec<String>,
}

/// Provenance block attached to every record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnnotationMetadata {
    #[serde(default)]
    pub license: Option<String>,
    #[serde(default)]
    pub annotator_id: Option<String>,
    #[serde(default)]
    pub language_quality_score: Option<f64>,
    /// ISO-8601 timestamp, kept as written
    #[serde(default)]
    pub timestamp: Option<String>,
}

// @struct: One entry of the annotation list
//
// The JSON value is kept exactly as read so that field order and unknown
// fields survive into the report. Typed accessors are lenient: a field with
// an unexpected type reads as absent.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationRecord {
    // @field: 1-based position in the input list
    position: usize,

    // @field: Raw JSON entry
    value: Value,
}

impl AnnotationRecord {
    pub fn new(position: usize, value: Value) -> Self {
        Self { position, value }
    }

    /// 1-based position in the annotation list
    pub fn position(&self) -> usize {
        self.position
    }

    /// The entry as read from disk
    pub fn as_value(&self) -> &Value {
        &self.value
    }

    /// Object fields, or `None` when the entry is not a JSON object
    pub fn fields(&self) -> Option<&Map<String, Value>> {
        self.value.as_object()
    }

    fn str_field(&self, key: &str) -> Option<&str> {
        self.fields()?.get(key)?.as_str()
    }

    fn typed_field<T: for<'de> Deserialize<'de>>(&self, key: &str) -> Option<T> {
        let value = self.fields()?.get(key)?;
        serde_json::from_value(value.clone()).ok()
    }

    pub fn image_id(&self) -> Option<&str> {
        self.str_field("image_id")
    }

    pub fn image_path(&self) -> Option<&str> {
        self.str_field("image_path")
    }

    /// File name component of `image_path`, used to look the image up in a flat folder
    pub fn image_file_name(&self) -> Option<&str> {
        let image_path = self.image_path()?;
        // Annotation files written on Windows use backslashes
        image_path
            .rsplit(['/', '\\'])
            .next()
            .filter(|name| !name.is_empty())
    }

    pub fn task_type(&self) -> Option<TaskType> {
        self.typed_field("task_type")
    }

    pub fn text_ms(&self) -> Option<&str> {
        self.str_field("text_ms")
    }

    pub fn answer_ms(&self) -> Option<&str> {
        self.str_field("answer_ms")
    }

    pub fn text_en(&self) -> Option<&str> {
        self.str_field("text_en")
    }

    pub fn answer_en(&self) -> Option<&str> {
        self.str_field("answer_en")
    }

    pub fn language(&self) -> Option<LanguagePair> {
        self.typed_field("language")
    }

    pub fn source(&self) -> Option<&str> {
        self.str_field("source")
    }

    pub fn split(&self) -> Option<Split> {
        self.typed_field("split")
    }

    pub fn difficulty(&self) -> Option<Difficulty> {
        self.typed_field("difficulty")
    }

    pub fn tags(&self) -> Vec<String> {
        self.typed_field("tags").unwrap_or_default()
    }

    pub fn metadata(&self) -> Option<AnnotationMetadata> {
        self.typed_field("metadata")
    }

    /// Parsed boxes, one result per entry of `bbox`.
    ///
    /// Returns `None` when the record has no `bbox` list at all; a `bbox`
    /// value of any other JSON type is ignored the same way.
    pub fn bounding_boxes(&self) -> Option<Vec<Result<BoundingBox, BoxError>>> {
        let entries = self.fields()?.get("bbox")?.as_array()?;
        Some(entries.iter().map(BoundingBox::from_json).collect())
    }

    /// One-line overview of the known fields, for diagnostics.
    ///
    /// Only fields that are present are listed, e.g.
    /// `task=vqa split=train lang=ms->en text=text_ms,answer_en tags=street`.
    pub fn describe(&self) -> String {
        let mut parts = Vec::new();

        if let Some(task_type) = self.task_type() {
            parts.push(format!("task={}", variant_name(&task_type)));
        }
        if let Some(split) = self.split() {
            parts.push(format!("split={}", variant_name(&split)));
        }
        if let Some(difficulty) = self.difficulty() {
            parts.push(format!("difficulty={}", variant_name(&difficulty)));
        }
        if let Some(language) = self.language() {
            parts.push(format!("lang={}->{}", language.source.join(","), language.target.join(",")));
        }

        let texts: Vec<&str> = [
            ("text_ms", self.text_ms()),
            ("answer_ms", self.answer_ms()),
            ("text_en", self.text_en()),
            ("answer_en", self.answer_en()),
        ]
        .into_iter()
        .filter(|(_, text)| text.is_some_and(|text| !text.trim().is_empty()))
        .map(|(name, _)| name)
        .collect();
        if !texts.is_empty() {
            parts.push(format!("text={}", texts.join(",")));
        }

        if let Some(source) = self.source() {
            parts.push(format!("source={}", source));
        }
        let tags = self.tags();
        if !tags.is_empty() {
            parts.push(format!("tags={}", tags.join(",")));
        }
        if let Some(metadata) = self.metadata() {
            if let Some(annotator_id) = metadata.annotator_id {
                parts.push(format!("annotator={}", annotator_id));
            }
            if let Some(license) = metadata.license {
                parts.push(format!("license={}", license));
            }
            if let Some(score) = metadata.language_quality_score {
                parts.push(format!("quality={}", score));
            }
        }

        parts.join(" ")
    }

    /// Short label for log lines: image id, then image path, then position
    pub fn label(&self) -> String {
        self.image_id()
            .or_else(|| self.image_path())
            .map(str::to_string)
            .unwrap_or_else(|| format!("#{}", self.position))
    }
}

// Serialized name of a lowercase unit variant
fn variant_name<T: Serialize>(value: &T) -> String {
    match serde_json::to_value(value) {
        Ok(Value::String(name)) => name,
        _ => String::new(),
    }
}

impl Serialize for AnnotationRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.value.serialize(serializer)
    }
}
