//! User-supplied answers.

use std::fmt;

/// An uploaded file, held in memory until submission
#[derive(Clone, PartialEq, Eq)]
pub struct FileBlob {
    /// Original file name
    pub name: String,
    /// MIME type reported by the picker
    pub content_type: String,
    /// Raw contents
    pub bytes: Vec<u8>,
}

impl FileBlob {
    /// Create a blob
    #[must_use]
    pub fn new(name: impl Into<String>, content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }
}

impl fmt::Debug for FileBlob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileBlob")
            .field("name", &self.name)
            .field("content_type", &self.content_type)
            .field("size", &self.bytes.len())
            .finish()
    }
}

/// One answer as the renderer holds it
///
/// Number, date, tel and dropdown inputs all arrive as text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FieldValue {
    /// Any text-like input
    Text(String),
    /// Checkbox state
    Bool(bool),
    /// Chosen file
    File(FileBlob),
}

impl FieldValue {
    /// Whether this counts as "no answer"
    ///
    /// Empty text, an unticked box and a nameless file are all empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(text) => text.is_empty(),
            Self::Bool(checked) => !checked,
            Self::File(blob) => blob.name.is_empty(),
        }
    }

    /// Text content, if this is a text answer
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Bool(_) | Self::File(_) => None,
        }
    }

    /// The value placed in a submission entry
    ///
    /// Files are represented by their name; the bytes travel separately.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Text(text) => serde_json::Value::String(text.clone()),
            Self::Bool(checked) => serde_json::Value::Bool(*checked),
            Self::File(blob) => serde_json::Value::String(blob.name.clone()),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<bool> for FieldValue {
    fn from(checked: bool) -> Self {
        Self::Bool(checked)
    }
}

impl From<FileBlob> for FieldValue {
    fn from(blob: FileBlob) -> Self {
        Self::File(blob)
    }
}
